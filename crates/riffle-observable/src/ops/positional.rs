//! Operators whose output depends on what arrived before: scan, take, skip,
//! distinct. Counters and sets are private to each run.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use riffle_core::PurityMarked;

use crate::sink::Sink;
use crate::stream::Stream;
use crate::sync::lock;

impl<T: Send + 'static> Stream<T> {
    /// Emit `initial` on subscription, then the running accumulation after
    /// every upstream value.
    pub fn scan<A, F>(&self, reducer: F, initial: A) -> Stream<A>
    where
        A: Clone + Send + Sync + 'static,
        F: Fn(A, T) -> A + Send + Sync + 'static,
    {
        let reducer = Arc::new(reducer);
        self.operate("scan", move |sink| {
            sink.next(initial.clone());
            let acc = Mutex::new(initial.clone());
            let reducer = Arc::clone(&reducer);
            sink.relay(move |sink, value| {
                let current = {
                    let mut acc = lock(&acc);
                    let next = reducer(acc.clone(), value);
                    *acc = next.clone();
                    next
                };
                sink.next(current);
            })
        })
    }

    /// First `n` values. Completes (and cancels upstream) after the n-th, or
    /// when a shorter source completes. `take(0)` completes on subscription
    /// without subscribing upstream.
    pub fn take(&self, n: usize) -> Stream<T> {
        if n == 0 {
            return Stream::create(|observer| {
                let sink = Sink::new(observer);
                sink.complete();
                sink.subscription()
            })
            .stamped("take");
        }
        self.operate("take", move |sink| {
            let seen = AtomicUsize::new(0);
            sink.relay(move |sink, value| {
                let position = seen.fetch_add(1, Ordering::AcqRel) + 1;
                if position <= n {
                    sink.next(value);
                }
                if position >= n {
                    sink.complete();
                }
            })
        })
    }

    /// Drop the first `n` values.
    pub fn skip(&self, n: usize) -> Stream<T> {
        self.operate("skip", move |sink| {
            let seen = AtomicUsize::new(0);
            sink.relay(move |sink, value| {
                if seen.fetch_add(1, Ordering::AcqRel) >= n {
                    sink.next(value);
                }
            })
        })
    }

    /// Drop values already emitted in this run. The seen-set grows for the
    /// lifetime of the run.
    pub fn distinct(&self) -> Stream<T>
    where
        T: Eq + Hash + Clone,
    {
        self.operate("distinct", |sink| {
            let seen = Mutex::new(HashSet::new());
            sink.relay(move |sink, value: T| {
                let fresh = lock(&seen).insert(value.clone());
                if fresh {
                    sink.next(value);
                }
            })
        })
    }
}
