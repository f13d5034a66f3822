/// Allocation counters (enabled by the `alloc-track` feature).
pub mod alloc_track;
/// Display configuration model.
pub mod config;
/// Geometry primitives.
pub mod core;
/// Crate error type.
pub mod error;
pub(crate) mod math;
