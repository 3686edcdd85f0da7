#![forbid(unsafe_code)]
//! riffle-observable: the cold, callback-driven stream core.
//!
//! Design intent:
//! - A `Stream<T>` is an immutable wrapper around a subscribe function; every
//!   `subscribe` re-runs it (cold semantics), and all per-run state lives in
//!   values created inside that call.
//! - Operators never suspend: each transformation runs inside the callback
//!   that delivered the upstream value. Only sources (timers, deferred values,
//!   event targets) introduce asynchrony, via tokio tasks.
//! - The raw core does not guard observers. Each operator owns a `Sink` that
//!   latches on the first terminal signal and tears down every upstream and
//!   inner subscription it registered.

pub mod event;
pub mod materialize;
pub mod observer;
pub mod ops;
pub mod sources;
pub mod stream;
pub mod subscription;
pub mod timing;

mod sink;
mod sync;

pub use event::{EventEmitter, EventTarget, Listener, ListenerId};
pub use observer::Observer;
pub use ops::step::Step;
pub use riffle_core::{PurityMarked, PurityTag, StreamError};
pub use stream::Stream;
pub use subscription::Unsubscribe;
