//! `StatefulStream<I, S, O>` and its composition operators.

use std::sync::Arc;

use riffle_core::{PurityMarked, PurityTag};

type StepFn<I, S, O> = dyn Fn(I, S) -> (S, O) + Send + Sync;

/// Immutable wrapper around a pure step function.
pub struct StatefulStream<I, S, O> {
    step: Arc<StepFn<I, S, O>>,
    purity: PurityTag,
}

impl<I, S, O> Clone for StatefulStream<I, S, O> {
    fn clone(&self) -> Self {
        Self {
            step: Arc::clone(&self.step),
            purity: self.purity,
        }
    }
}

impl<I, S, O> std::fmt::Debug for StatefulStream<I, S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatefulStream")
            .field("purity", &self.purity)
            .finish_non_exhaustive()
    }
}

impl<I, S, O> PurityMarked for StatefulStream<I, S, O> {
    fn purity(&self) -> PurityTag {
        self.purity
    }

    fn with_purity(mut self, tag: PurityTag) -> Self {
        self.purity = tag;
        self
    }
}

impl<I: 'static, S: 'static, O: 'static> StatefulStream<I, S, O> {
    pub(crate) fn from_step<F>(step: F, purity: PurityTag) -> Self
    where
        F: Fn(I, S) -> (S, O) + Send + Sync + 'static,
    {
        Self {
            step: Arc::new(step),
            purity,
        }
    }

    /// Lift a plain function; the state passes through untouched.
    pub fn lift_stateless<F>(f: F) -> Self
    where
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        Self::from_step(move |input, state| (state, f(input)), PurityTag::Pure)
    }

    /// Lift a function that reads and rewrites the state.
    pub fn lift_stateful<F>(f: F) -> Self
    where
        F: Fn(I, S) -> (S, O) + Send + Sync + 'static,
    {
        Self::from_step(f, PurityTag::State)
    }

    /// Ignore the input and always produce `value`.
    pub fn constant(value: O) -> Self
    where
        O: Clone + Send + Sync,
    {
        Self::from_step(move |_input, state| (state, value.clone()), PurityTag::Pure)
    }

    pub fn run(&self, input: I, state: S) -> (S, O) {
        (self.step)(input, state)
    }

    /// Curried form of `run`: fix the input, leave the state open.
    pub fn apply(&self, input: I) -> impl FnOnce(S) -> (S, O) {
        let step = Arc::clone(&self.step);
        move |state| step(input, state)
    }

    /// Feed `inputs` one after another, threading the state through.
    pub fn run_all<It>(&self, inputs: It, state: S) -> (S, Vec<O>)
    where
        It: IntoIterator<Item = I>,
    {
        let mut state = state;
        let mut outputs = Vec::new();
        for input in inputs {
            let (next, output) = self.run(input, state);
            state = next;
            outputs.push(output);
        }
        (state, outputs)
    }

    /// Sequential composition: `self` first, then `next` on its output.
    pub fn then<P: 'static>(&self, next: &StatefulStream<O, S, P>) -> StatefulStream<I, S, P> {
        let first = Arc::clone(&self.step);
        let second = Arc::clone(&next.step);
        StatefulStream::from_step(
            move |input, state| {
                let (state, mid) = first(input, state);
                second(mid, state)
            },
            self.purity.join(next.purity),
        )
    }

    /// Post-compose a plain function on the output. Keeps the tag.
    pub fn fmap<P: 'static, F>(&self, f: F) -> StatefulStream<I, S, P>
    where
        F: Fn(O) -> P + Send + Sync + 'static,
    {
        let step = Arc::clone(&self.step);
        StatefulStream::from_step(
            move |input, state| {
                let (state, output) = step(input, state);
                (state, f(output))
            },
            self.purity,
        )
    }

    /// Pick the continuation from this stage's output and run it on the same
    /// input with the updated state.
    pub fn chain<P: 'static, F>(&self, f: F) -> StatefulStream<I, S, P>
    where
        I: Clone,
        F: Fn(O) -> StatefulStream<I, S, P> + Send + Sync + 'static,
    {
        let step = Arc::clone(&self.step);
        StatefulStream::from_step(
            move |input: I, state| {
                let (state, output) = step(input.clone(), state);
                f(output).run(input, state)
            },
            PurityTag::State,
        )
    }
}

impl<T: 'static, S: 'static> StatefulStream<T, S, T> {
    pub fn identity() -> Self {
        Self::from_step(|input, state| (state, input), PurityTag::Pure)
    }
}

/// `f` then `g`. Associative, with `identity` as unit on either side. The
/// result carries the less pure of the two tags.
pub fn compose<I, S, M, O>(
    f: &StatefulStream<I, S, M>,
    g: &StatefulStream<M, S, O>,
) -> StatefulStream<I, S, O>
where
    I: 'static,
    S: 'static,
    M: 'static,
    O: 'static,
{
    f.then(g)
}

/// Run two stages side by side on a paired input. The state goes through `f`
/// first, then `g`.
pub fn parallel<I1, I2, S, O1, O2>(
    f: &StatefulStream<I1, S, O1>,
    g: &StatefulStream<I2, S, O2>,
) -> StatefulStream<(I1, I2), S, (O1, O2)>
where
    I1: 'static,
    I2: 'static,
    S: 'static,
    O1: 'static,
    O2: 'static,
{
    let left = Arc::clone(&f.step);
    let right = Arc::clone(&g.step);
    StatefulStream::from_step(
        move |(a, b), state| {
            let (state, out_a) = left(a, state);
            let (state, out_b) = right(b, state);
            (state, (out_a, out_b))
        },
        f.purity.join(g.purity),
    )
}
