#![forbid(unsafe_code)]
//! riffle-core: shared vocabulary for the riffle stream engine.
//!
//! Responsibilities:
//! - The static purity table and reordering-legality rule (`purity`).
//! - The marker trait used to stamp and read purity tags on stream values.
//! - Error types shared by both cores (`error`).
//! - Engine configuration (`config`).
//! - Capability records consumed from outside the engine: optics and monoids.
//!
//! **No async, no I/O** here. The observable crate owns the runtime side.

pub mod config;
pub mod error;
pub mod monoid;
pub mod optic;
pub mod prelude;
pub mod purity;
pub mod trace;

pub use config::{EngineConfig, MissedTick};
pub use error::{Error, Result, StreamError};
pub use monoid::Monoid;
pub use optic::Optic;
pub use purity::{can_reorder, get_operation_purity, PurityMarked, PurityTag};
