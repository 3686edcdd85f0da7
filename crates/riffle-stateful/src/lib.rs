#![forbid(unsafe_code)]
//! riffle-stateful: the pure state-threading stream core.
//!
//! A `StatefulStream<I, S, O>` wraps a pure step `(input, state) -> (state, output)`.
//! The caller owns the state and threads it from call to call; composition
//! builds new values and never mutates its operands.
//!
//! Sequential composition forms a monoid (`compose` is associative and
//! `identity` is its unit), so runs of pure stages can be folded into one
//! pass with `fuse_pure_sequence` without changing results.

pub mod fuse;
pub mod positional;
pub mod stream;

pub use fuse::{can_fuse, fuse_pure_sequence, FuseError};
pub use riffle_core::{PurityMarked, PurityTag};
pub use stream::{compose, parallel, StatefulStream};
