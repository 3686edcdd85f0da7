//! Stepper operator: drive a per-run state machine over upstream values.
//!
//! Used to run several per-element stages as one operator; a fused pass is a
//! stepper whose state is the chain of stage states.

use std::sync::{Arc, Mutex};

use crate::stream::Stream;
use crate::sync::lock;

/// What a stepper did with one upstream value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<U> {
    /// Emit the value and keep going.
    Yield(U),
    /// Drop the value and keep going.
    Discard,
    /// Emit the value, then complete.
    Finish(U),
    /// Complete without emitting.
    Stop,
}

impl<T: Send + 'static> Stream<T> {
    /// Run a fresh stepper from `init` for every subscription. The stepper's
    /// lock is released before anything is delivered downstream.
    pub fn step_with<U, M, F>(&self, op: &'static str, init: M) -> Stream<U>
    where
        U: Send + 'static,
        M: Fn() -> F + Send + Sync + 'static,
        F: FnMut(T) -> Step<U> + Send + 'static,
    {
        let init = Arc::new(init);
        self.operate(op, move |sink| {
            let stepper = Mutex::new(init());
            sink.relay(move |sink, value| {
                let outcome = {
                    let mut step = lock(&stepper);
                    (*step)(value)
                };
                match outcome {
                    Step::Yield(out) => sink.next(out),
                    Step::Discard => {}
                    Step::Finish(out) => {
                        sink.next(out);
                        sink.complete();
                    }
                    Step::Stop => sink.complete(),
                }
            })
        })
    }
}
