#![forbid(unsafe_code)]
//! riffle-planner: stage plans → purity-driven fusion → lowered streams.
//!
//! Design:
//! - A `Plan<T>` is an ordered list of `Stage<T>` values; each stage knows its
//!   operator name and therefore its purity tag.
//! - `rules::optimize` collapses runs of per-element pure stages into one
//!   `Stage::Fused`. It never reorders; `Plan::hoist` performs explicit swaps
//!   and rejects the ones the classifier forbids.
//! - `lower` turns a plan into a `Stream<T>` over the observable core. A fused
//!   stage becomes a single stepper operator.
//! - A small YAML DSL builds `Plan<i64>` values for the CLI.

pub mod dsl;
pub mod error;
pub mod lower;
pub mod plan;
pub mod rules;
pub mod stage;

pub use dsl::yaml::{parse_yaml_pipeline, parse_yaml_pipeline_with, ParsedPipeline};
pub use error::PlanError;
pub use lower::lower;
pub use plan::{Plan, PlanSummary, StageSummary};
pub use rules::optimize;
pub use stage::{Element, Stage};
