use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::assets::color::Rgb565;
use crate::foundation::core::{Point16, Size16};
use crate::foundation::error::{WarholError, WarholResult};
use crate::render::surface::Bitmap;

/// Decoded image in panel format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Dimensions.
    pub size: Size16,
    /// Row-major pixels.
    pub pixels: Vec<Rgb565>,
}

/// Decode PNG or JPEG bytes and quantize them to RGB565.
pub fn decode_image(bytes: &[u8]) -> WarholResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| WarholError::decode(format!("decode image from memory: {e}")))?;
    let rgb = dyn_img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let (Ok(w), Ok(h)) = (i16::try_from(width), i16::try_from(height)) else {
        return Err(WarholError::decode(format!(
            "image {width}x{height} exceeds the 16-bit coordinate space"
        )));
    };
    let size = Size16::new(w as u16, h as u16);
    let pixels = rgb
        .pixels()
        .map(|p| Rgb565::from_rgb8(p[0], p[1], p[2]))
        .collect();
    Ok(DecodedImage { size, pixels })
}

/// Producer of the pristine background image.
pub trait BackgroundSource: Send {
    /// Draw the background into `target`, centered on black, and return the source dimensions.
    fn decode_into(&self, target: &mut Bitmap) -> WarholResult<Size16>;
}

/// Background backed by an encoded PNG or JPEG held in memory.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
}

impl EncodedImage {
    /// Wrap encoded bytes; decoding is deferred to [`BackgroundSource::decode_into`].
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Read an encoded image from disk.
    pub fn from_path(path: impl AsRef<Path>) -> WarholResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read background image '{}'", path.display()))?;
        Ok(Self::from_bytes(bytes))
    }
}

impl BackgroundSource for EncodedImage {
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = self.bytes.len()))]
    fn decode_into(&self, target: &mut Bitmap) -> WarholResult<Size16> {
        let img = decode_image(&self.bytes)?;
        let all = target.bounds();
        let mut canvas = target.canvas();
        canvas.fill(all, Rgb565::BLACK);

        let placed = img.size.bounds()?.center_in(all);
        let Some(visible) = placed.intersection(all) else {
            return Ok(img.size);
        };
        let stride = usize::from(img.size.width);
        for y in visible.y1..=visible.y2 {
            let sy = usize::from((y - placed.y1) as u16);
            for x in visible.x1..=visible.x2 {
                let sx = usize::from((x - placed.x1) as u16);
                let px = img.pixels[sy * stride + sx];
                canvas.put(Point16::new(x, y), px);
            }
        }
        Ok(img.size)
    }
}

/// Built-in procedural background: four tinted quadrants of concentric rings.
#[derive(Clone, Copy, Debug, Default)]
pub struct PopArtBackground;

const QUADRANT_TINTS: [(Rgb565, Rgb565); 4] = [
    (Rgb565::from_rgb8(255, 64, 160), Rgb565::from_rgb8(255, 230, 0)),
    (Rgb565::from_rgb8(0, 170, 255), Rgb565::from_rgb8(255, 120, 0)),
    (Rgb565::from_rgb8(120, 230, 40), Rgb565::from_rgb8(140, 0, 200)),
    (Rgb565::from_rgb8(250, 250, 250), Rgb565::from_rgb8(230, 20, 40)),
];

impl BackgroundSource for PopArtBackground {
    fn decode_into(&self, target: &mut Bitmap) -> WarholResult<Size16> {
        let size = target.size();
        let all = target.bounds();
        let half_w = i32::from(size.width / 2).max(1);
        let half_h = i32::from(size.height / 2).max(1);
        let ring = (half_w.min(half_h) / 6).max(1);

        let mut canvas = target.canvas();
        for y in all.y1..=all.y2 {
            for x in all.x1..=all.x2 {
                let (xi, yi) = (i32::from(x), i32::from(y));
                let q = usize::from(xi >= half_w) + 2 * usize::from(yi >= half_h);
                let cx = (xi % half_w) - half_w / 2;
                let cy = (yi % half_h) - half_h / 2;
                let d = cx.abs().max(cy.abs());
                let (a, b) = QUADRANT_TINTS[q.min(3)];
                let px = if (d / ring) % 2 == 0 { a } else { b };
                canvas.put(Point16::new(x, y), px);
            }
        }
        Ok(size)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
