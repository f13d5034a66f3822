//! The path from painted pixels to the display.
//!
//! A [`flush::FlushPipeline`] splits a dirty region into horizontal bands, paints each into one
//! of two [`transfer::TransferBuffer`]s and hands it to a [`flush::Panel`]. The panel returns
//! the buffer through a [`transfer::FlushCompletion`] once it has read the bytes.

/// Band painting and the panel trait.
pub mod flush;
/// In-memory panel with a simulated DMA engine.
pub mod simulated;
/// Transfer buffers and the completion signal.
pub mod transfer;
