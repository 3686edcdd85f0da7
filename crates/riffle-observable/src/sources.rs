//! Synchronous sources.

use riffle_core::{PurityMarked, StreamError};

use crate::sink::Sink;
use crate::stream::Stream;
use crate::subscription::Unsubscribe;

impl<T: Send + 'static> Stream<T> {
    /// Emit `value` once, then complete.
    pub fn of(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Stream::from_array(vec![value]).stamped("of")
    }

    /// Emit each element in order, then complete. Stops early if the run is
    /// cancelled while emitting.
    pub fn from_array(values: Vec<T>) -> Self
    where
        T: Clone + Sync,
    {
        Stream::create(move |observer| {
            let sink = Sink::new(observer);
            for value in &values {
                if sink.is_closed() {
                    break;
                }
                sink.next(value.clone());
            }
            sink.complete();
            sink.subscription()
        })
        .stamped("fromArray")
    }

    pub fn from_iter<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        Stream::from_array(values.into_iter().collect())
    }

    /// Complete immediately without emitting.
    pub fn empty() -> Self {
        Stream::create(|observer| {
            let sink = Sink::new(observer);
            sink.complete();
            sink.subscription()
        })
        .stamped("empty")
    }

    /// Never emit and never terminate. The observer is held until the run is
    /// cancelled.
    pub fn never() -> Self {
        Stream::create(|observer| Unsubscribe::new(move || drop(observer))).stamped("never")
    }

    /// Fail immediately with `err`.
    pub fn throw_error(err: StreamError) -> Self {
        Stream::create(move |observer| {
            let sink = Sink::new(observer);
            sink.error(err.clone());
            sink.subscription()
        })
        .stamped("throwError")
    }
}
