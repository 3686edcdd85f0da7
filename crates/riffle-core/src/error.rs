use thiserror::Error;

/// Canonical result for configuration paths.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Error delivered through `Observer::error`.
///
/// Delivery is terminal: once a stream reports one of these, no further
/// `next`/`complete` may follow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Reported by a producer through the observer's error channel.
    #[error("producer error: {0}")]
    Producer(String),

    /// A guarded constructor's body failed before or while producing.
    #[error("construction error: {0}")]
    Construction(String),

    /// A dispatch helper found no matching case and had no fallback.
    #[error("unhandled case: {0}")]
    Unhandled(String),

    /// An async source was subscribed outside of a tokio runtime.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),

    /// The producer released its observer without completing or erroring.
    #[error("stream ended without terminating: {0}")]
    Abandoned(String),
}

impl StreamError {
    pub fn producer(msg: impl Into<String>) -> Self {
        StreamError::Producer(msg.into())
    }
}
