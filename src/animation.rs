//! Frame-by-frame animation state.

/// Color crossfades.
pub mod blend;
/// Random number sources.
pub mod random;
/// Moving blocks and the background crossfade.
pub mod state;
