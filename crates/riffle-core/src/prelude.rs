//! Convenient re-exports for downstream crates.

pub use crate::config::{EngineConfig, MissedTick};
pub use crate::error::{Error, Result, StreamError};
pub use crate::monoid::Monoid;
pub use crate::optic::Optic;
pub use crate::purity::{can_reorder, get_operation_purity, PurityMarked, PurityTag};
