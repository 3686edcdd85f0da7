//! Substrate traits and their implementations for both cores.

use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

use riffle_core::{PurityMarked, StreamError};
use riffle_observable::Stream;
use riffle_stateful::StatefulStream;

use crate::generic;
use crate::strategy::{Op, SubstrateId};

/// Same substrate, different item type.
pub type Of<S, U> = <<S as Substrate>::Family as Family>::Of<U>;

/// What filtering produces on substrate `S`.
pub type Maybe<S, U> = <<S as Substrate>::Family as Family>::Maybe<U>;

/// Type constructor shared by every stream of one substrate.
pub trait Family: Sized + 'static {
    type Of<U: Send + 'static>: Substrate<Family = Self, Item = U>;

    /// Result of dropping absent values. Push streams can drop them; pure
    /// state functions must answer every input, so they keep the `Option`.
    type Maybe<U: Send + 'static>: PurityMarked;

    fn of<U: Clone + Send + Sync + 'static>(value: U) -> Self::Of<U>;

    fn compact<U: Send + 'static>(maybe: Self::Of<Option<U>>) -> Self::Maybe<U>;
}

pub trait Substrate: PurityMarked + Sized {
    type Family: Family;
    type Item: Send + 'static;

    const ID: SubstrateId;

    /// Operators whose hook below is overridden with a dedicated path.
    const NATIVE: &'static [Op] = &[];

    fn prim_map<U, F>(&self, f: F) -> Of<Self, U>
    where
        U: Send + 'static,
        F: Fn(Self::Item) -> U + Send + Sync + 'static;

    fn prim_chain<U, F>(&self, f: F) -> Of<Self, U>
    where
        U: Send + 'static,
        F: Fn(Self::Item) -> Of<Self, U> + Send + Sync + 'static;

    fn prim_recover<F>(&self, handler: F) -> Self
    where
        F: Fn(StreamError) -> Self + Send + Sync + 'static;

    fn prim_map_err<F>(&self, f: F) -> Self
    where
        F: Fn(StreamError) -> StreamError + Send + Sync + 'static;

    fn fused_filter<P>(&self, pred: P) -> Maybe<Self, Self::Item>
    where
        P: Fn(&Self::Item) -> bool + Send + Sync + 'static,
    {
        generic::filter(self, pred)
    }

    fn fused_filter_map<U, F>(&self, f: F) -> Maybe<Self, U>
    where
        U: Send + 'static,
        F: Fn(Self::Item) -> Option<U> + Send + Sync + 'static,
    {
        generic::filter_map(self, f)
    }

    fn fused_bimap<U, E, F>(&self, on_error: E, on_value: F) -> Of<Self, U>
    where
        U: Send + 'static,
        E: Fn(StreamError) -> StreamError + Send + Sync + 'static,
        F: Fn(Self::Item) -> U + Send + Sync + 'static,
    {
        generic::bimap(self, on_error, on_value)
    }

    fn fused_bichain<U, E, F>(&self, on_error: E, on_value: F) -> Of<Self, U>
    where
        Self::Item: Clone + Sync,
        U: Send + 'static,
        E: Fn(StreamError) -> Of<Self, U> + Send + Sync + 'static,
        F: Fn(Self::Item) -> Of<Self, U> + Send + Sync + 'static,
    {
        generic::bichain(self, on_error, on_value)
    }
}

/// Order-dependent operators. Push streams keep their counters inside the
/// run; the stateful core carries them in an extended state tuple, so the
/// output types differ per substrate.
pub trait Sequential: Substrate {
    type Scanned<A: Clone + Send + Sync + 'static>: PurityMarked;
    type Limited: PurityMarked;
    type Deduped: PurityMarked;

    fn prim_scan<A, F>(&self, reducer: F, initial: A) -> Self::Scanned<A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, Self::Item) -> A + Send + Sync + 'static;

    fn prim_take(&self, n: usize) -> Self::Limited;

    fn prim_skip(&self, n: usize) -> Self::Limited;

    fn prim_distinct(&self) -> Self::Deduped
    where
        Self::Item: Eq + Hash + Clone;
}

pub struct ObservableFamily;

impl Family for ObservableFamily {
    type Of<U: Send + 'static> = Stream<U>;
    type Maybe<U: Send + 'static> = Stream<U>;

    fn of<U: Clone + Send + Sync + 'static>(value: U) -> Stream<U> {
        Stream::of(value)
    }

    fn compact<U: Send + 'static>(maybe: Stream<Option<U>>) -> Stream<U> {
        maybe.filter_map(|value| value)
    }
}

impl<T: Send + 'static> Substrate for Stream<T> {
    type Family = ObservableFamily;
    type Item = T;

    const ID: SubstrateId = SubstrateId::Observable;
    const NATIVE: &'static [Op] = &[Op::Filter, Op::FilterMap, Op::Bimap];

    fn prim_map<U, F>(&self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.map(f)
    }

    fn prim_chain<U, F>(&self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Stream<U> + Send + Sync + 'static,
    {
        self.chain(f)
    }

    fn prim_recover<F>(&self, handler: F) -> Self
    where
        F: Fn(StreamError) -> Self + Send + Sync + 'static,
    {
        self.catch_error(handler)
    }

    fn prim_map_err<F>(&self, f: F) -> Self
    where
        F: Fn(StreamError) -> StreamError + Send + Sync + 'static,
    {
        self.map_err(f)
    }

    fn fused_filter<P>(&self, pred: P) -> Stream<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter(pred)
    }

    fn fused_filter_map<U, F>(&self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        self.filter_map(f)
    }

    fn fused_bimap<U, E, F>(&self, on_error: E, on_value: F) -> Stream<U>
    where
        U: Send + 'static,
        E: Fn(StreamError) -> StreamError + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.bimap(on_error, on_value)
    }
}

impl<T: Send + 'static> Sequential for Stream<T> {
    type Scanned<A: Clone + Send + Sync + 'static> = Stream<A>;
    type Limited = Stream<T>;
    type Deduped = Stream<T>;

    fn prim_scan<A, F>(&self, reducer: F, initial: A) -> Stream<A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, T) -> A + Send + Sync + 'static,
    {
        self.scan(reducer, initial)
    }

    fn prim_take(&self, n: usize) -> Stream<T> {
        self.take(n)
    }

    fn prim_skip(&self, n: usize) -> Stream<T> {
        self.skip(n)
    }

    fn prim_distinct(&self) -> Stream<T>
    where
        T: Eq + Hash + Clone,
    {
        self.distinct()
    }
}

/// Family of `StatefulStream<I, S, _>` for a fixed input and state.
pub struct StatefulFamily<I, S>(PhantomData<fn(I, S)>);

impl<I: Clone + 'static, S: 'static> Family for StatefulFamily<I, S> {
    type Of<U: Send + 'static> = StatefulStream<I, S, U>;
    type Maybe<U: Send + 'static> = StatefulStream<I, S, Option<U>>;

    fn of<U: Clone + Send + Sync + 'static>(value: U) -> StatefulStream<I, S, U> {
        StatefulStream::constant(value)
    }

    fn compact<U: Send + 'static>(maybe: StatefulStream<I, S, Option<U>>) -> StatefulStream<I, S, Option<U>> {
        maybe
    }
}

/// The stateful core has no error channel: `recover` and `map_err` return
/// the stream unchanged.
impl<I: Clone + 'static, S: 'static, O: Send + 'static> Substrate for StatefulStream<I, S, O> {
    type Family = StatefulFamily<I, S>;
    type Item = O;

    const ID: SubstrateId = SubstrateId::Stateful;
    const NATIVE: &'static [Op] = &[Op::Bimap];

    fn prim_map<U, F>(&self, f: F) -> StatefulStream<I, S, U>
    where
        U: Send + 'static,
        F: Fn(O) -> U + Send + Sync + 'static,
    {
        self.fmap(f)
    }

    fn prim_chain<U, F>(&self, f: F) -> StatefulStream<I, S, U>
    where
        U: Send + 'static,
        F: Fn(O) -> StatefulStream<I, S, U> + Send + Sync + 'static,
    {
        self.chain(f)
    }

    fn prim_recover<F>(&self, _handler: F) -> Self
    where
        F: Fn(StreamError) -> Self + Send + Sync + 'static,
    {
        self.clone()
    }

    fn prim_map_err<F>(&self, _f: F) -> Self
    where
        F: Fn(StreamError) -> StreamError + Send + Sync + 'static,
    {
        self.clone()
    }

    fn fused_bimap<U, E, F>(&self, _on_error: E, on_value: F) -> StatefulStream<I, S, U>
    where
        U: Send + 'static,
        E: Fn(StreamError) -> StreamError + Send + Sync + 'static,
        F: Fn(O) -> U + Send + Sync + 'static,
    {
        self.fmap(on_value)
    }
}

impl<I: Clone + 'static, S: 'static, O: Send + 'static> Sequential for StatefulStream<I, S, O> {
    type Scanned<A: Clone + Send + Sync + 'static> = StatefulStream<I, (S, Option<A>), A>;
    type Limited = StatefulStream<I, (S, usize), Option<O>>;
    type Deduped = StatefulStream<I, (S, HashSet<O>), Option<O>>;

    fn prim_scan<A, F>(&self, reducer: F, initial: A) -> Self::Scanned<A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, O) -> A + Send + Sync + 'static,
    {
        self.scan(reducer, initial)
    }

    fn prim_take(&self, n: usize) -> Self::Limited {
        self.take(n)
    }

    fn prim_skip(&self, n: usize) -> Self::Limited {
        self.skip(n)
    }

    fn prim_distinct(&self) -> Self::Deduped
    where
        O: Eq + Hash + Clone,
    {
        self.distinct()
    }
}
