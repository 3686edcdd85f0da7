//! Asynchronous sources backed by tokio tasks.
//!
//! Each subscription spawns its own task on the ambient runtime and aborts it
//! on unsubscribe. Cancellation is best-effort: a callback that already fired
//! is filtered by the run's latch rather than recalled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

use riffle_core::{MissedTick, PurityMarked, StreamError};

use crate::sink::Sink;
use crate::stream::Stream;

fn current_runtime<T: Send + 'static>(sink: &Sink<T>) -> Option<Handle> {
    match Handle::try_current() {
        Ok(handle) => Some(handle),
        Err(err) => {
            sink.error(StreamError::NoRuntime(err.to_string()));
            None
        }
    }
}

fn tick_behavior(policy: MissedTick) -> MissedTickBehavior {
    match policy {
        MissedTick::Burst => MissedTickBehavior::Burst,
        MissedTick::Delay => MissedTickBehavior::Delay,
        MissedTick::Skip => MissedTickBehavior::Skip,
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Stream of a deferred value.
    ///
    /// `factory` is invoked once per subscription, so every run awaits its own
    /// future. `Ok` becomes next + complete; `Err` becomes error.
    pub fn from_deferred<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, StreamError>> + Send + 'static,
    {
        Stream::create(move |observer| {
            let sink = Sink::new(observer);
            let Some(runtime) = current_runtime(&sink) else {
                return sink.subscription();
            };
            let deferred = factory();
            let task_sink = Arc::clone(&sink);
            let task = runtime.spawn(async move {
                match deferred.await {
                    Ok(value) => {
                        task_sink.next(value);
                        task_sink.complete();
                    }
                    Err(err) => task_sink.error(err),
                }
            });
            sink.add_fn(move || task.abort());
            sink.subscription()
        })
        .stamped("fromPromise")
    }

    /// Emit `value` once after `delay`, then complete.
    pub fn timer(delay: Duration, value: T) -> Self
    where
        T: Clone + Sync,
    {
        Stream::create(move |observer| {
            let sink = Sink::new(observer);
            let Some(runtime) = current_runtime(&sink) else {
                return sink.subscription();
            };
            let value = value.clone();
            let task_sink = Arc::clone(&sink);
            let task = runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                task_sink.next(value);
                task_sink.complete();
            });
            sink.add_fn(move || task.abort());
            sink.subscription()
        })
        .stamped("timer")
    }
}

impl Stream<u64> {
    /// Emit 0, 1, 2, … every `period`, starting one period after subscribe.
    /// Never completes on its own.
    pub fn interval(period: Duration) -> Self {
        Stream::interval_with(period, MissedTick::default())
    }

    pub fn interval_with(period: Duration, missed_tick: MissedTick) -> Self {
        Stream::create(move |observer| {
            let sink = Sink::new(observer);
            if period.is_zero() {
                sink.error(StreamError::Construction(
                    "interval period must be non-zero".into(),
                ));
                return sink.subscription();
            }
            let Some(runtime) = current_runtime(&sink) else {
                return sink.subscription();
            };
            let task_sink = Arc::clone(&sink);
            let task = runtime.spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(tick_behavior(missed_tick));
                let mut count: u64 = 0;
                loop {
                    ticker.tick().await;
                    if task_sink.is_closed() {
                        break;
                    }
                    task_sink.next(count);
                    count += 1;
                }
            });
            sink.add_fn(move || task.abort());
            sink.subscription()
        })
        .stamped("interval")
    }
}
