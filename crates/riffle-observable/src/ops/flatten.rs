//! Switch-latest flattening.

use std::sync::{Arc, Mutex};

use riffle_core::PurityMarked;

use crate::observer::Observer;
use crate::stream::Stream;
use crate::subscription::Unsubscribe;
use crate::sync::lock;

/// Switch state of one run. Owned by that run's closures only.
#[derive(Default)]
struct SwitchState {
    /// Handle of the active inner subscription.
    inner: Option<Unsubscribe>,
    /// Bumped on every outer value; inner callbacks from an older epoch are
    /// ignored even if their cancellation has not landed yet.
    epoch: u64,
}

impl<T: Send + 'static> Stream<T> {
    /// Map each value to a stream and follow only the most recent one.
    ///
    /// - A new outer value cancels the active inner subscription before
    ///   subscribing to `f(value)`.
    /// - An inner error terminates the whole pipeline.
    /// - An inner completion does not end the pipeline.
    /// - Outer completion completes the pipeline immediately, even if the
    ///   latest inner is still running; that inner is cancelled.
    pub fn flat_map<U, F>(&self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Stream<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.operate("flatMap", move |sink| {
            let switch = Arc::new(Mutex::new(SwitchState::default()));
            {
                let switch = Arc::clone(&switch);
                sink.add_fn(move || {
                    let active = lock(&switch).inner.take();
                    if let Some(active) = active {
                        active.unsubscribe();
                    }
                });
            }

            let f = Arc::clone(&f);
            let outer = Arc::clone(sink);
            let for_error = Arc::clone(sink);
            let for_complete = Arc::clone(sink);
            Observer::new(move |value| {
                if outer.is_closed() {
                    return;
                }
                // Registered before subscribing, so a synchronous inner can be
                // cancelled while it is still emitting.
                let inner_run = Unsubscribe::empty();
                let (epoch, previous) = {
                    let mut state = lock(&switch);
                    state.epoch += 1;
                    (state.epoch, state.inner.replace(inner_run.clone()))
                };
                if let Some(previous) = previous {
                    previous.unsubscribe();
                }

                let is_current = {
                    let switch = Arc::clone(&switch);
                    move || lock(&switch).epoch == epoch
                };
                let inner_observer = {
                    let on_next = is_current.clone();
                    let on_error = is_current.clone();
                    let next_sink = Arc::clone(&outer);
                    let error_sink = Arc::clone(&outer);
                    let switch = Arc::clone(&switch);
                    Observer::new(move |inner_value| {
                        if on_next() {
                            next_sink.next(inner_value);
                        }
                    })
                    .with_error(move |err| {
                        if on_error() {
                            error_sink.error(err);
                        }
                    })
                    .with_complete(move || {
                        let mut state = lock(&switch);
                        if state.epoch == epoch {
                            state.inner = None;
                        }
                    })
                    .bound_to(inner_run.clone())
                };

                #[cfg(feature = "tracing")]
                tracing::trace!(epoch, "flat_map switching inner subscription");
                inner_run.add(f(value).subscribe(inner_observer));

                // The outer run may have closed after the swap above; its
                // teardown then missed this inner.
                if outer.is_closed() {
                    inner_run.unsubscribe();
                }
            })
            .with_error(move |err| for_error.error(err))
            .with_complete(move || for_complete.complete())
        })
    }

    /// Alias of `flat_map`.
    pub fn chain<U, F>(&self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Stream<U> + Send + Sync + 'static,
    {
        self.flat_map(f).stamped("chain")
    }
}
