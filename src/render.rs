//! Frame buffers and everything that draws into them.
//!
//! The [`compositor::Compositor`] owns a [`pool::FramePool`] of full-frame buffers, keeps a
//! composed base image current (inline or through [`refresh::BackgroundRefresh`]), and paints
//! base plus moving blocks into whatever [`surface::Canvas`] the flush pipeline hands it.

/// Animated compositor control.
pub mod compositor;
/// All-or-nothing frame buffer pool.
pub mod pool;
/// Background recomposition task.
pub mod refresh;
/// Pixel buffers and clipped drawing.
pub mod surface;
