#![forbid(unsafe_code)]
//! riffle: a push-based stream engine.
//!
//! Two substrates share one operator surface:
//! - `observable`: cold, callback-driven streams (`Stream<T>`) with
//!   subscription lifecycles and cancellation;
//! - `stateful`: pure state-threading streams (`StatefulStream<I, S, O>`).
//!
//! A static purity classification (`core::purity`) decides which adjacent
//! operators may be swapped or fused; `planner` applies it to stage plans and
//! `shim` dispatches operators over either substrate.

pub use riffle_core as core;
pub use riffle_observable as observable;
pub use riffle_planner as planner;
pub use riffle_shim as shim;
pub use riffle_stateful as stateful;

pub mod prelude {
    pub use riffle_core::prelude::*;
    pub use riffle_observable::{EventEmitter, EventTarget, Observer, Step, Stream, Unsubscribe};
    pub use riffle_planner::{lower, optimize, Plan, Stage};
    pub use riffle_shim::{Shim, StrategyTable};
    pub use riffle_stateful::{can_fuse, compose, fuse_pure_sequence, parallel, StatefulStream};
}
