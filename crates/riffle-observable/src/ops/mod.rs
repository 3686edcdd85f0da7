//! Operator algebra over `Stream<T>`.
//!
//! Every operator is a method returning a new stream stamped with its purity
//! tag. Errors and completion pass through unchanged unless the operator says
//! otherwise.

pub mod buffer;
pub mod flatten;
pub mod join;
pub mod positional;
pub mod recover;
pub mod step;
pub mod transform;
