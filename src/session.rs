//! Screen, frame loop and throughput reporting.

/// [`display::DisplaySession`]: screen plus flush pipeline.
pub mod display;
/// Frame rate reporting.
pub mod pacer;
/// Screen with one control and a dirty region.
pub mod screen;
