//! Colors and the background image.

/// Working and panel color types, blending and the block palette.
pub mod color;
/// Background image decoding into a pristine frame.
pub mod decode;
