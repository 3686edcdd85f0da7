//! Multi-source operators: concat, merge, combine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use riffle_core::PurityMarked;

use crate::observer::Observer;
use crate::sink::Sink;
use crate::stream::Stream;
use crate::sync::lock;

/// Latest values of a `combine` run. `None` means "not produced yet"; a
/// produced value is stored as `Some` even when it is itself `None`-like.
struct Latest<A, B> {
    left: Option<A>,
    right: Option<B>,
    left_done: bool,
    right_done: bool,
}

impl<T: Send + 'static> Stream<T> {
    /// All of `self`, then all of `other`. `other` is subscribed only once
    /// `self` completes; an error from either ends the run.
    pub fn concat(&self, other: &Stream<T>) -> Stream<T> {
        let other = other.clone();
        self.operate("concat", move |sink| {
            let second = other.clone();
            let for_complete = Arc::clone(sink);
            sink.forward().with_complete(move || {
                if for_complete.is_closed() {
                    return;
                }
                let handle = second.subscribe(for_complete.forward());
                for_complete.add(handle);
            })
        })
    }

    /// Both sources at once; values interleave by arrival. Completes when both
    /// have completed; an error from either ends the run immediately.
    pub fn merge(&self, other: &Stream<T>) -> Stream<T> {
        let sources = [self.clone(), other.clone()];
        Stream::create(move |observer| {
            let sink = Sink::new(observer);
            let completed = Arc::new(AtomicUsize::new(0));
            for source in &sources {
                if sink.is_closed() {
                    break;
                }
                let for_next = Arc::clone(&sink);
                let for_error = Arc::clone(&sink);
                let for_complete = Arc::clone(&sink);
                let completed = Arc::clone(&completed);
                let upstream = Observer::new(move |value| for_next.next(value))
                    .with_error(move |err| for_error.error(err))
                    .with_complete(move || {
                        if completed.fetch_add(1, Ordering::AcqRel) + 1 == 2 {
                            for_complete.complete();
                        }
                    })
                    .bound_to(sink.subscription());
                sink.add(source.subscribe(upstream));
            }
            sink.subscription()
        })
        .stamped("merge")
    }

    /// Latest-value join: once both sources have produced, every arrival on
    /// either side emits `f(latest_left, latest_right)`.
    ///
    /// Completes when both sources complete, or as soon as one completes
    /// without ever producing. An error from either ends the run.
    pub fn combine<A, B, F>(left: &Stream<A>, right: &Stream<B>, f: F) -> Stream<T>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: Fn(&A, &B) -> T + Send + Sync + 'static,
    {
        let left = left.clone();
        let right = right.clone();
        let f = Arc::new(f);
        Stream::create(move |observer| {
            let sink = Sink::new(observer);
            let latest = Arc::new(Mutex::new(Latest::<A, B> {
                left: None,
                right: None,
                left_done: false,
                right_done: false,
            }));

            let emit = {
                let f = Arc::clone(&f);
                let sink = Arc::clone(&sink);
                move |state: &Latest<A, B>| match (&state.left, &state.right) {
                    (Some(a), Some(b)) => Some((Arc::clone(&sink), f(a, b))),
                    _ => None,
                }
            };

            let left_observer = {
                let latest_next = Arc::clone(&latest);
                let latest_done = Arc::clone(&latest);
                let emit = emit.clone();
                let for_error = Arc::clone(&sink);
                let for_complete = Arc::clone(&sink);
                Observer::new(move |value: A| {
                    let ready = {
                        let mut state = lock(&latest_next);
                        state.left = Some(value);
                        emit(&state)
                    };
                    if let Some((sink, combined)) = ready {
                        sink.next(combined);
                    }
                })
                .with_error(move |err| for_error.error(err))
                .with_complete(move || {
                    let finished = {
                        let mut state = lock(&latest_done);
                        state.left_done = true;
                        state.right_done || state.left.is_none()
                    };
                    if finished {
                        for_complete.complete();
                    }
                })
                .bound_to(sink.subscription())
            };

            let right_observer = {
                let latest_next = Arc::clone(&latest);
                let latest_done = Arc::clone(&latest);
                let for_error = Arc::clone(&sink);
                let for_complete = Arc::clone(&sink);
                Observer::new(move |value: B| {
                    let ready = {
                        let mut state = lock(&latest_next);
                        state.right = Some(value);
                        emit(&state)
                    };
                    if let Some((sink, combined)) = ready {
                        sink.next(combined);
                    }
                })
                .with_error(move |err| for_error.error(err))
                .with_complete(move || {
                    let finished = {
                        let mut state = lock(&latest_done);
                        state.right_done = true;
                        state.left_done || state.right.is_none()
                    };
                    if finished {
                        for_complete.complete();
                    }
                })
                .bound_to(sink.subscription())
            };

            sink.add(left.subscribe(left_observer));
            if !sink.is_closed() {
                sink.add(right.subscribe(right_observer));
            }
            sink.subscription()
        })
        .stamped("combine")
    }
}
