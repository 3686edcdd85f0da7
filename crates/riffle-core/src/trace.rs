//! Tracing hooks for stream lifecycle events.
//!
//! Library crates call these instead of `tracing` directly; with the
//! `tracing` feature off each body is empty.

#[cfg(feature = "tracing")]
pub fn emit_event(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::span!(tracing::Level::TRACE, "riffle", event);
    let _entered = span.enter();
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "stream event");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn emit_event(_event: &str, _key_values: &[(&str, String)]) { /* no-op */
}

/// Report an error that reached an observer without an error handler.
#[cfg(feature = "tracing")]
pub fn unhandled_error(err: &crate::error::StreamError) {
    tracing::warn!(error = %err, "stream error dropped: observer has no error handler");
}

#[cfg(not(feature = "tracing"))]
pub fn unhandled_error(_err: &crate::error::StreamError) {}
