#![forbid(unsafe_code)]
//! riffle-shim: one operator surface over both stream cores.
//!
//! - `Substrate` names the primitives each core provides (`of`, `map`,
//!   `chain`, `recover`, `map_err`, `compact`) plus optional optimized hooks.
//!   Hook defaults are the generic formulas in `generic`.
//! - `StrategyTable` is plain data saying, per substrate and operator,
//!   whether the optimized hook or the generic formula runs.
//! - `Shim` owns a table, resolves it on every call, and stamps each result
//!   with the classifier tag of the requested operator.

pub mod generic;
pub mod shim;
pub mod strategy;
pub mod substrate;

pub use shim::Shim;
pub use strategy::{Dispatch, Op, StrategyTable, SubstrateId};
pub use substrate::{Family, Maybe, ObservableFamily, Of, Sequential, StatefulFamily, Substrate};
