//! The observer capability: the only channel from producer to consumer.

use std::sync::Arc;

use riffle_core::trace;
use riffle_core::StreamError;

use crate::subscription::Unsubscribe;

type NextFn<T> = Arc<dyn Fn(T) + Send + Sync>;
type ErrorFn = Arc<dyn Fn(StreamError) + Send + Sync>;
type CompleteFn = Arc<dyn Fn() + Send + Sync>;

/// `{next, error?, complete?}`.
///
/// Handlers are shared (`Arc`), so cloning an observer is cheap and a clone
/// may be moved into a timer task.
///
/// Observers handed upstream by an operator are bound to that operator's run:
/// once the run closes, `is_closed` reports it, and a producer still emitting
/// should stop.
pub struct Observer<T> {
    next: NextFn<T>,
    error: Option<ErrorFn>,
    complete: Option<CompleteFn>,
    run: Option<Unsubscribe>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            next: Arc::clone(&self.next),
            error: self.error.clone(),
            complete: self.complete.clone(),
            run: self.run.clone(),
        }
    }
}

impl<T> Observer<T> {
    pub fn new<N>(next: N) -> Self
    where
        N: Fn(T) + Send + Sync + 'static,
    {
        Self {
            next: Arc::new(next),
            error: None,
            complete: None,
            run: None,
        }
    }

    /// Tie this observer to the run that consumes it.
    pub(crate) fn bound_to(mut self, run: Unsubscribe) -> Self {
        self.run = Some(run);
        self
    }

    pub(crate) fn run(&self) -> Option<&Unsubscribe> {
        self.run.as_ref()
    }

    /// Whether the consuming run has already ended. Unbound observers are
    /// never closed.
    pub fn is_closed(&self) -> bool {
        self.run.as_ref().is_some_and(Unsubscribe::is_closed)
    }

    pub fn with_error<E>(mut self, error: E) -> Self
    where
        E: Fn(StreamError) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(error));
        self
    }

    pub fn with_complete<C>(mut self, complete: C) -> Self
    where
        C: Fn() + Send + Sync + 'static,
    {
        self.complete = Some(Arc::new(complete));
        self
    }

    pub fn next(&self, value: T) {
        (self.next)(value)
    }

    /// Deliver an error. Without an error handler the error is logged and
    /// dropped.
    pub fn error(&self, err: StreamError) {
        match &self.error {
            Some(on_error) => on_error(err),
            None => trace::unhandled_error(&err),
        }
    }

    pub fn complete(&self) {
        if let Some(on_complete) = &self.complete {
            on_complete()
        }
    }
}
