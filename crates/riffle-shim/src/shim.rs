//! The dispatching surface.

use std::hash::Hash;

use riffle_core::{EngineConfig, PurityMarked, StreamError};

use crate::generic;
use crate::strategy::{Dispatch, Op, StrategyTable, SubstrateId};
use crate::substrate::{Maybe, Of, Sequential, Substrate};

/// Caller-owned operator surface over any `Substrate`.
///
/// The table is read on every call, so replacing it (or registering a native
/// hook) affects the next call and nothing already built.
#[derive(Debug, Clone)]
pub struct Shim {
    table: StrategyTable,
}

impl Default for Shim {
    fn default() -> Self {
        Self::new()
    }
}

impl Shim {
    pub fn new() -> Self {
        Self::with_table(StrategyTable::derive())
    }

    pub fn with_table(table: StrategyTable) -> Self {
        Self { table }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_table(StrategyTable::from_config(config))
    }

    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    pub fn set_table(&mut self, table: StrategyTable) {
        self.table = table;
    }

    /// Route `op` on `substrate` to its native hook from now on.
    pub fn register_native(&mut self, substrate: SubstrateId, op: Op) {
        self.table = self.table.clone().with_native(substrate, op);
    }

    fn dispatch<S: Substrate>(&self, op: Op) -> Dispatch {
        let dispatch = self.table.resolve(S::ID, op);
        #[cfg(feature = "tracing")]
        tracing::trace!(substrate = ?S::ID, op = op.name(), ?dispatch, "shim dispatch");
        dispatch
    }

    pub fn map<S, U, F>(&self, stream: &S, f: F) -> Of<S, U>
    where
        S: Substrate,
        U: Send + 'static,
        F: Fn(S::Item) -> U + Send + Sync + 'static,
    {
        stream.prim_map(f).stamped(Op::Map.name())
    }

    pub fn filter<S, P>(&self, stream: &S, pred: P) -> Maybe<S, S::Item>
    where
        S: Substrate,
        P: Fn(&S::Item) -> bool + Send + Sync + 'static,
    {
        let out = match self.dispatch::<S>(Op::Filter) {
            Dispatch::Native => stream.fused_filter(pred),
            Dispatch::Generic => generic::filter(stream, pred),
        };
        out.stamped(Op::Filter.name())
    }

    pub fn filter_map<S, U, F>(&self, stream: &S, f: F) -> Maybe<S, U>
    where
        S: Substrate,
        U: Send + 'static,
        F: Fn(S::Item) -> Option<U> + Send + Sync + 'static,
    {
        let out = match self.dispatch::<S>(Op::FilterMap) {
            Dispatch::Native => stream.fused_filter_map(f),
            Dispatch::Generic => generic::filter_map(stream, f),
        };
        out.stamped(Op::FilterMap.name())
    }

    pub fn chain<S, U, F>(&self, stream: &S, f: F) -> Of<S, U>
    where
        S: Substrate,
        U: Send + 'static,
        F: Fn(S::Item) -> Of<S, U> + Send + Sync + 'static,
    {
        stream.prim_chain(f).stamped(Op::Chain.name())
    }

    /// `chain` under its other name; tagged as `flatMap`.
    pub fn flat_map<S, U, F>(&self, stream: &S, f: F) -> Of<S, U>
    where
        S: Substrate,
        U: Send + 'static,
        F: Fn(S::Item) -> Of<S, U> + Send + Sync + 'static,
    {
        stream.prim_chain(f).stamped("flatMap")
    }

    pub fn bimap<S, U, E, F>(&self, stream: &S, on_error: E, on_value: F) -> Of<S, U>
    where
        S: Substrate,
        U: Send + 'static,
        E: Fn(StreamError) -> StreamError + Send + Sync + 'static,
        F: Fn(S::Item) -> U + Send + Sync + 'static,
    {
        let out = match self.dispatch::<S>(Op::Bimap) {
            Dispatch::Native => stream.fused_bimap(on_error, on_value),
            Dispatch::Generic => generic::bimap(stream, on_error, on_value),
        };
        out.stamped(Op::Bimap.name())
    }

    pub fn bichain<S, U, E, F>(&self, stream: &S, on_error: E, on_value: F) -> Of<S, U>
    where
        S: Substrate,
        S::Item: Clone + Sync,
        U: Send + 'static,
        E: Fn(StreamError) -> Of<S, U> + Send + Sync + 'static,
        F: Fn(S::Item) -> Of<S, U> + Send + Sync + 'static,
    {
        let out = match self.dispatch::<S>(Op::Bichain) {
            Dispatch::Native => stream.fused_bichain(on_error, on_value),
            Dispatch::Generic => generic::bichain(stream, on_error, on_value),
        };
        out.stamped(Op::Bichain.name())
    }

    /// Identity on substrates without an error channel.
    pub fn recover<S, F>(&self, stream: &S, handler: F) -> S
    where
        S: Substrate,
        F: Fn(StreamError) -> S + Send + Sync + 'static,
    {
        stream.prim_recover(handler).stamped("catchError")
    }

    pub fn map_err<S, F>(&self, stream: &S, f: F) -> S
    where
        S: Substrate,
        F: Fn(StreamError) -> StreamError + Send + Sync + 'static,
    {
        stream.prim_map_err(f).stamped(Op::Bimap.name())
    }

    pub fn scan<S, A, F>(&self, stream: &S, reducer: F, initial: A) -> S::Scanned<A>
    where
        S: Sequential,
        A: Clone + Send + Sync + 'static,
        F: Fn(A, S::Item) -> A + Send + Sync + 'static,
    {
        stream.prim_scan(reducer, initial).stamped(Op::Scan.name())
    }

    pub fn take<S: Sequential>(&self, stream: &S, n: usize) -> S::Limited {
        stream.prim_take(n).stamped(Op::Take.name())
    }

    pub fn skip<S: Sequential>(&self, stream: &S, n: usize) -> S::Limited {
        stream.prim_skip(n).stamped(Op::Skip.name())
    }

    pub fn distinct<S>(&self, stream: &S) -> S::Deduped
    where
        S: Sequential,
        S::Item: Eq + Hash + Clone,
    {
        stream.prim_distinct().stamped(Op::Distinct.name())
    }

    /// Thread `value` through `stage` with this shim in hand; nest calls to
    /// build a left-to-right pipeline.
    pub fn pipe<A, B, F>(&self, value: A, stage: F) -> B
    where
        F: FnOnce(&Self, A) -> B,
    {
        stage(self, value)
    }
}
