//! Per-operator delivery latch.

use std::sync::Arc;

use riffle_core::StreamError;

use crate::observer::Observer;
use crate::subscription::Unsubscribe;

/// Downstream end of one operator run.
///
/// The run's `Unsubscribe` is the latch: the first terminal signal (or the
/// consumer's unsubscribe) closes it, tears down every registered upstream and
/// inner handle, and suppresses any later delivery.
///
/// When `downstream` is bound to a consuming run, this latch is registered
/// with it on construction, so closing downstream closes this run at once,
/// even while a synchronous producer is still inside `subscribe`.
pub(crate) struct Sink<T> {
    downstream: Observer<T>,
    subscription: Unsubscribe,
}

impl<T: Send + 'static> Sink<T> {
    pub(crate) fn new(downstream: Observer<T>) -> Arc<Self> {
        let subscription = Unsubscribe::empty();
        if let Some(consumer) = downstream.run() {
            consumer.add(subscription.clone());
        }
        Arc::new(Self {
            downstream,
            subscription,
        })
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.subscription.is_closed()
    }

    pub(crate) fn next(&self, value: T) {
        if !self.is_closed() {
            self.downstream.next(value);
        }
    }

    pub(crate) fn error(&self, err: StreamError) {
        if self.subscription.close() {
            self.downstream.error(err);
        }
    }

    pub(crate) fn complete(&self) {
        if self.subscription.close() {
            self.downstream.complete();
        }
    }

    /// Handle given back to the consumer of this run.
    pub(crate) fn subscription(&self) -> Unsubscribe {
        self.subscription.clone()
    }

    /// Register a constituent subscription; torn down with this run.
    pub(crate) fn add(&self, handle: Unsubscribe) {
        self.subscription.add(handle);
    }

    pub(crate) fn add_fn<F>(&self, teardown: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.subscription.add_fn(teardown);
    }

    /// Upstream observer with a custom `next`; errors and completion pass
    /// straight through to this sink. `on_next` is skipped once the run is
    /// closed.
    pub(crate) fn relay<U, N>(self: &Arc<Self>, on_next: N) -> Observer<U>
    where
        N: Fn(&Sink<T>, U) + Send + Sync + 'static,
    {
        let for_next = Arc::clone(self);
        let for_error = Arc::clone(self);
        let for_complete = Arc::clone(self);
        Observer::new(move |value| {
            if !for_next.is_closed() {
                on_next(&for_next, value);
            }
        })
        .with_error(move |err| for_error.error(err))
        .with_complete(move || for_complete.complete())
        .bound_to(self.subscription())
    }

    /// Relay that forwards values unchanged.
    pub(crate) fn forward(self: &Arc<Self>) -> Observer<T> {
        self.relay(|sink, value| sink.next(value))
    }
}
