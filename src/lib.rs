//! Warhol drives an animated composite display: a background image under a slowly shifting
//! tint, with translucent blocks bouncing across it.
//!
//! The pieces, bottom up:
//!
//! - [`FramePool`] holds the full-frame buffers, all or nothing
//! - [`AnimationState`] moves blocks and crossfades colors, one tick per frame
//! - [`Compositor`] keeps a composed base image current and paints base plus blocks
//! - [`FlushPipeline`] paints dirty regions band by band into two transfer buffers
//! - [`DisplaySession`] ties a [`Screen`] to a pipeline and paces frames
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Block motion and color crossfades.
pub mod animation;
/// Colors and the background image.
pub mod assets;
/// Geometry, errors, configuration.
pub mod foundation;
/// Panel transport and band flushing.
pub mod panel;
/// Frame buffers, compositor and background refresh.
pub mod render;
/// Screen and frame loop.
pub mod session;

pub use crate::animation::blend::{BlendFactor, BlendRules, BlendState};
pub use crate::animation::random::{RandomSource, RngSource, ScriptedRandom};
pub use crate::animation::state::{AnimationOpts, AnimationState, MovingBlock};
pub use crate::assets::color::{PALETTE, Rgb565, Rgba32, blend, select_color};
pub use crate::assets::decode::{BackgroundSource, EncodedImage, PopArtBackground};
pub use crate::foundation::config::{DisplayConfig, RefreshVariant};
pub use crate::foundation::core::{PanelArea, Point16, Rect16, Size16};
pub use crate::foundation::error::{WarholError, WarholResult};
pub use crate::panel::flush::{FlushPipeline, FlushStats, Panel};
pub use crate::panel::simulated::{SimulatedPanel, SimulatedPanelOpts};
pub use crate::panel::transfer::{FlushCompletion, TransferBuffer};
pub use crate::render::compositor::{Compositor, CompositorOpts, DrawState, Drawable};
pub use crate::render::pool::{
    BufferId, BulkAllocator, BulkHeap, Frame, FrameLayout, FramePool, FramePoolStats,
};
pub use crate::render::refresh::{RefreshEvent, RefreshObserver, RefreshOpts, RefreshPhase};
pub use crate::render::surface::{Bitmap, Canvas};
pub use crate::session::display::{DisplaySession, SessionStats};
pub use crate::session::pacer::{FramePacer, PacerReport};
pub use crate::session::screen::Screen;
