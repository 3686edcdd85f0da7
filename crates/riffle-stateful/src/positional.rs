//! Accumulating and positional operators.
//!
//! The caller-owned state is extended into a pair: the original state plus
//! whatever the operator needs to remember between inputs (the running
//! accumulator, a position counter, or the set of outputs already seen).

use std::collections::HashSet;
use std::hash::Hash;

use riffle_core::{get_operation_purity, PurityMarked};

use crate::stream::StatefulStream;

impl<I: 'static, S: 'static, O: 'static> StatefulStream<I, S, O> {
    /// Fold each output into an accumulator carried in the state, emitting
    /// the new accumulator. An empty slot (`None`) starts from `initial`.
    pub fn scan<A, F>(&self, reducer: F, initial: A) -> StatefulStream<I, (S, Option<A>), A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, O) -> A + Send + Sync + 'static,
    {
        let inner = self.clone();
        StatefulStream::from_step(
            move |input, (state, slot): (S, Option<A>)| {
                let (state, output) = inner.run(input, state);
                let acc = reducer(slot.unwrap_or_else(|| initial.clone()), output);
                ((state, Some(acc.clone())), acc)
            },
            self.purity().join(get_operation_purity("scan")),
        )
    }

    /// Keep the first `n` outputs; later ones become `None`. The counter in
    /// the state saturates at `n`.
    pub fn take(&self, n: usize) -> StatefulStream<I, (S, usize), Option<O>> {
        let inner = self.clone();
        StatefulStream::from_step(
            move |input, (state, seen)| {
                let (state, output) = inner.run(input, state);
                if seen < n {
                    ((state, seen + 1), Some(output))
                } else {
                    ((state, seen), None)
                }
            },
            self.purity().join(get_operation_purity("take")),
        )
    }

    /// Drop the first `n` outputs as `None`.
    pub fn skip(&self, n: usize) -> StatefulStream<I, (S, usize), Option<O>> {
        let inner = self.clone();
        StatefulStream::from_step(
            move |input, (state, seen)| {
                let (state, output) = inner.run(input, state);
                if seen < n {
                    ((state, seen + 1), None)
                } else {
                    ((state, seen), Some(output))
                }
            },
            self.purity().join(get_operation_purity("skip")),
        )
    }

    /// Suppress outputs already present in the carried seen-set.
    pub fn distinct(&self) -> StatefulStream<I, (S, HashSet<O>), Option<O>>
    where
        O: Eq + Hash + Clone,
    {
        let inner = self.clone();
        StatefulStream::from_step(
            move |input, (state, mut seen): (S, HashSet<O>)| {
                let (state, output) = inner.run(input, state);
                if seen.insert(output.clone()) {
                    ((state, seen), Some(output))
                } else {
                    ((state, seen), None)
                }
            },
            self.purity().join(get_operation_purity("distinct")),
        )
    }
}
