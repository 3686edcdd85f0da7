//! `Stream<T>`: a cold, subscription-based push producer.

use std::sync::Arc;

use riffle_core::{PurityMarked, PurityTag, StreamError};

use crate::observer::Observer;
use crate::sink::Sink;
use crate::subscription::Unsubscribe;

type SubscribeFn<T> = dyn Fn(Observer<T>) -> Unsubscribe + Send + Sync;

/// Immutable wrapper around a subscribe function.
///
/// Lifecycle of one run: Created → Subscribed → Emitting(next*) → one of
/// Completed / Errored / Unsubscribed. Terminal states are final.
pub struct Stream<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
    purity: PurityTag,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
            purity: self.purity,
        }
    }
}

impl<T> std::fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("purity", &self.purity)
            .finish_non_exhaustive()
    }
}

impl<T> PurityMarked for Stream<T> {
    fn purity(&self) -> PurityTag {
        self.purity
    }

    fn with_purity(mut self, tag: PurityTag) -> Self {
        self.purity = tag;
        self
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Wrap a raw producer.
    ///
    /// `subscribe_fn` runs synchronously inside every `subscribe` call and must
    /// return the run's cancellation handle. The observer it receives is not
    /// guarded: honoring "nothing after complete/error" is the producer's job,
    /// and a long synchronous producer should check `observer.is_closed()`.
    /// A panic inside `subscribe_fn` propagates to the caller of `subscribe`;
    /// use `try_create` to turn producer failures into stream errors.
    pub fn create<F>(subscribe_fn: F) -> Self
    where
        F: Fn(Observer<T>) -> Unsubscribe + Send + Sync + 'static,
    {
        Self {
            subscribe_fn: Arc::new(subscribe_fn),
            purity: PurityTag::Async,
        }
    }

    /// Guarded constructor: an `Err` from the producer body is delivered as
    /// `StreamError::Construction` instead of escaping to the subscriber.
    pub fn try_create<F, E>(producer: F) -> Self
    where
        F: Fn(&Observer<T>) -> Result<Unsubscribe, E> + Send + Sync + 'static,
        E: std::fmt::Display,
    {
        Stream::create(move |observer| match producer(&observer) {
            Ok(handle) => handle,
            Err(err) => {
                observer.error(StreamError::Construction(err.to_string()));
                Unsubscribe::empty()
            }
        })
    }

    /// Open an independent run.
    pub fn subscribe(&self, observer: Observer<T>) -> Unsubscribe {
        #[cfg(feature = "tracing")]
        tracing::trace!(purity = %self.purity, "subscribe");
        (self.subscribe_fn)(observer)
    }

    pub fn subscribe_fn<N>(&self, next: N) -> Unsubscribe
    where
        N: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(Observer::new(next))
    }

    pub fn subscribe_all<N, E, C>(&self, next: N, error: E, complete: C) -> Unsubscribe
    where
        N: Fn(T) + Send + Sync + 'static,
        E: Fn(StreamError) + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        self.subscribe(
            Observer::new(next)
                .with_error(error)
                .with_complete(complete),
        )
    }

    /// Build a single-upstream operator.
    ///
    /// `make` runs once per run and returns the observer handed to this
    /// stream; any per-run state it creates is private to that run. That
    /// observer is bound to the run, so upstream stops as soon as it closes.
    /// The result is stamped with the table entry for `op`.
    pub(crate) fn operate<U, F>(&self, op: &'static str, make: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(&Arc<Sink<U>>) -> Observer<T> + Send + Sync + 'static,
    {
        let source = self.clone();
        Stream::create(move |downstream| {
            let sink = Sink::new(downstream);
            let upstream = make(&sink).bound_to(sink.subscription());
            if !sink.is_closed() {
                sink.add(source.subscribe(upstream));
            }
            sink.subscription()
        })
        .stamped(op)
    }
}
