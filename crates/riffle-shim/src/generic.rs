//! Generic formulas, written only in terms of substrate primitives.
//!
//! These are the fallback path of the strategy table and the default bodies
//! of the optimized hooks, so a native hook must agree with its formula here.

use riffle_core::StreamError;

use crate::substrate::{Family, Maybe, Of, Substrate};

/// `compact(map(x -> pred(x) ? Some(x) : None))`
pub fn filter<S, P>(stream: &S, pred: P) -> Maybe<S, S::Item>
where
    S: Substrate,
    P: Fn(&S::Item) -> bool + Send + Sync + 'static,
{
    let tagged = stream.prim_map(move |value| if pred(&value) { Some(value) } else { None });
    <S::Family as Family>::compact(tagged)
}

/// `compact(map(f))`
pub fn filter_map<S, U, F>(stream: &S, f: F) -> Maybe<S, U>
where
    S: Substrate,
    U: Send + 'static,
    F: Fn(S::Item) -> Option<U> + Send + Sync + 'static,
{
    <S::Family as Family>::compact(stream.prim_map(f))
}

/// `map(on_value) ∘ map_err(on_error)`
pub fn bimap<S, U, E, F>(stream: &S, on_error: E, on_value: F) -> Of<S, U>
where
    S: Substrate,
    U: Send + 'static,
    E: Fn(StreamError) -> StreamError + Send + Sync + 'static,
    F: Fn(S::Item) -> U + Send + Sync + 'static,
{
    stream.prim_map_err(on_error).prim_map(on_value)
}

/// Branch on both channels:
/// `map(Ok)`, then `recover(err -> of(Err(err)))`, then `chain` on the
/// result. On a substrate without an error channel this is `chain(on_value)`.
pub fn bichain<S, U, E, F>(stream: &S, on_error: E, on_value: F) -> Of<S, U>
where
    S: Substrate,
    S::Item: Clone + Sync,
    U: Send + 'static,
    E: Fn(StreamError) -> Of<S, U> + Send + Sync + 'static,
    F: Fn(S::Item) -> Of<S, U> + Send + Sync + 'static,
{
    let settled: Of<S, Result<S::Item, StreamError>> = stream.prim_map(Ok);
    settled
        .prim_recover(|err| <S::Family as Family>::of(Err(err)))
        .prim_chain(move |outcome| match outcome {
            Ok(value) => on_value(value),
            Err(err) => on_error(err),
        })
}
