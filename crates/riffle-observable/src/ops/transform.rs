//! Per-element transforms: map, filter, filter_map, and the optic operators.

use std::sync::Arc;

use riffle_core::{Optic, PurityMarked};

use crate::stream::Stream;

impl<T: Send + 'static> Stream<T> {
    pub fn map<U, F>(&self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.operate("map", move |sink| {
            let f = Arc::clone(&f);
            sink.relay(move |sink, value| sink.next(f(value)))
        })
    }

    pub fn filter<P>(&self, pred: P) -> Stream<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let pred = Arc::new(pred);
        self.operate("filter", move |sink| {
            let pred = Arc::clone(&pred);
            sink.relay(move |sink, value| {
                if pred(&value) {
                    sink.next(value);
                }
            })
        })
    }

    /// Map and drop `None` in a single pass.
    pub fn filter_map<U, F>(&self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.operate("filterMap", move |sink| {
            let f = Arc::clone(&f);
            sink.relay(move |sink, value| {
                if let Some(mapped) = f(value) {
                    sink.next(mapped);
                }
            })
        })
    }

    /// Emit the optic's focus of each value; values without one are dropped.
    pub fn focus<A>(&self, optic: Optic<T, A>) -> Stream<A>
    where
        A: Send + 'static,
    {
        self.filter_map(move |value| optic.preview(&value))
            .stamped("focus")
    }

    /// Rewrite the optic's focus of each value with `f`.
    pub fn over<A, F>(&self, optic: Optic<T, A>, f: F) -> Stream<T>
    where
        A: 'static,
        F: Fn(A) -> A + Send + Sync + 'static,
    {
        self.map(move |value| optic.modify(value, &f)).stamped("over")
    }
}
