//! Error-channel operators. `catch_error` is the only recovery primitive;
//! nothing retries on its own.

use std::sync::Arc;

use riffle_core::StreamError;

use crate::stream::Stream;

impl<T: Send + 'static> Stream<T> {
    /// On a source error, continue with `handler(err)` and forward its
    /// values, error, and completion. Retrying means returning a stream that
    /// re-subscribes the source.
    pub fn catch_error<F>(&self, handler: F) -> Stream<T>
    where
        F: Fn(StreamError) -> Stream<T> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        self.operate("catchError", move |sink| {
            let handler = Arc::clone(&handler);
            let for_error = Arc::clone(sink);
            sink.forward().with_error(move |err| {
                if for_error.is_closed() {
                    return;
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %err, "catch_error switching to replacement stream");
                let replacement = handler(err);
                let handle = replacement.subscribe(for_error.forward());
                for_error.add(handle);
            })
        })
    }

    pub fn map_err<F>(&self, f: F) -> Stream<T>
    where
        F: Fn(StreamError) -> StreamError + Send + Sync + 'static,
    {
        self.bimap(f, |value| value)
    }

    /// Map both channels: errors through `on_error`, values through
    /// `on_value`.
    pub fn bimap<U, E, F>(&self, on_error: E, on_value: F) -> Stream<U>
    where
        U: Send + 'static,
        E: Fn(StreamError) -> StreamError + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let on_error = Arc::new(on_error);
        let on_value = Arc::new(on_value);
        self.operate("bimap", move |sink| {
            let on_error = Arc::clone(&on_error);
            let on_value = Arc::clone(&on_value);
            let for_error = Arc::clone(sink);
            sink.relay(move |sink, value| sink.next(on_value(value)))
                .with_error(move |err| for_error.error(on_error(err)))
        })
    }
}
