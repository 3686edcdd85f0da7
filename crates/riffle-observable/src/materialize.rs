//! Terminal materializers: the points where a push stream becomes a single
//! awaited value.
//!
//! Each call subscribes immediately and returns a future that resolves on
//! completion and rejects on error. Dropping the future cancels the
//! subscription. If the producer releases its observer without terminating,
//! the future rejects with `StreamError::Abandoned`.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use riffle_core::{Monoid, StreamError};

use crate::observer::Observer;
use crate::stream::Stream;
use crate::subscription::Unsubscribe;
use crate::sync::lock;

type Outcome<A> = Result<A, StreamError>;

/// One-shot resolution slot shared by a run's callbacks.
struct Settle<A> {
    tx: Mutex<Option<oneshot::Sender<Outcome<A>>>>,
}

impl<A> Settle<A> {
    fn settle(&self, outcome: Outcome<A>) {
        if let Some(tx) = lock(&self.tx).take() {
            // The receiver may already be gone; nothing left to notify.
            let _ = tx.send(outcome);
        }
    }
}

struct CancelOnDrop(Unsubscribe);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Subscribe with the observer built by `make` and await its settlement.
    fn materialize<A, F>(&self, make: F) -> impl Future<Output = Outcome<A>> + Send + 'static
    where
        A: Send + 'static,
        F: FnOnce(Arc<Settle<A>>, Unsubscribe) -> Observer<T> + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let settle = Arc::new(Settle {
            tx: Mutex::new(Some(tx)),
        });
        let run = Unsubscribe::empty();
        let observer = make(settle, run.clone()).bound_to(run.clone());
        run.add(self.subscribe(observer));
        let guard = CancelOnDrop(run);
        async move {
            let _guard = guard;
            match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(StreamError::Abandoned(
                    "producer dropped its observer before completing".into(),
                )),
            }
        }
    }

    /// Every value, in arrival order.
    pub fn to_array(&self) -> impl Future<Output = Outcome<Vec<T>>> + Send + 'static {
        self.reduce(
            |mut acc: Vec<T>, value| {
                acc.push(value);
                acc
            },
            Vec::new(),
        )
    }

    pub fn reduce<A, F>(&self, f: F, init: A) -> impl Future<Output = Outcome<A>> + Send + 'static
    where
        A: Send + 'static,
        F: Fn(A, T) -> A + Send + Sync + 'static,
    {
        self.materialize(move |settle, _run| {
            let acc = Arc::new(Mutex::new(Some(init)));
            let for_next = Arc::clone(&acc);
            let for_error = Arc::clone(&settle);
            Observer::new(move |value| {
                let mut slot = lock(&for_next);
                if let Some(current) = slot.take() {
                    *slot = Some(f(current, value));
                }
            })
            .with_error(move |err| for_error.settle(Err(err)))
            .with_complete(move || {
                let result = lock(&acc).take().ok_or_else(|| {
                    StreamError::Abandoned("accumulator already consumed".into())
                });
                settle.settle(result);
            })
        })
    }

    /// Map every value into `monoid` and combine, starting from its identity.
    pub fn fold_map<M, F>(
        &self,
        monoid: Monoid<M>,
        f: F,
    ) -> impl Future<Output = Outcome<M>> + Send + 'static
    where
        M: Clone + Send + Sync + 'static,
        F: Fn(T) -> M + Send + Sync + 'static,
    {
        let empty = monoid.empty();
        self.reduce(move |acc, value| monoid.combine(acc, f(value)), empty)
    }

    /// `true` unless some value fails `pred`. Resolves `false` on the first
    /// failing value and cancels the subscription.
    pub fn all<P>(&self, pred: P) -> impl Future<Output = Outcome<bool>> + Send + 'static
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.decide(move |value| !pred(value), false, true)
    }

    /// `false` unless some value passes `pred`. Resolves `true` on the first
    /// passing value and cancels the subscription.
    pub fn any<P>(&self, pred: P) -> impl Future<Output = Outcome<bool>> + Send + 'static
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.decide(pred, true, false)
    }

    fn decide<P>(
        &self,
        decisive: P,
        on_hit: bool,
        on_complete: bool,
    ) -> impl Future<Output = Outcome<bool>> + Send + 'static
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.materialize(move |settle, run| {
            let for_next = Arc::clone(&settle);
            let for_error = Arc::clone(&settle);
            Observer::new(move |value| {
                if run.is_closed() {
                    return;
                }
                if decisive(&value) {
                    for_next.settle(Ok(on_hit));
                    run.unsubscribe();
                }
            })
            .with_error(move |err| for_error.settle(Err(err)))
            .with_complete(move || settle.settle(Ok(on_complete)))
        })
    }
}
