use crate::assets::color::{Rgb565, Rgba32};
use crate::foundation::core::{Point16, Rect16, Size16};
use crate::foundation::error::{WarholError, WarholResult};

/// Bytes per pixel of the panel format.
pub const BYTES_PER_PIXEL: usize = 2;

/// Owned RGB565 pixel buffer, row-major, panel byte order.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    size: Size16,
    bounds: Rect16,
    data: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("size", &self.size)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Bitmap {
    /// Bytes needed for a bitmap of `size`.
    pub fn byte_len(size: Size16) -> usize {
        size.area() * BYTES_PER_PIXEL
    }

    /// Allocate a zeroed (black) bitmap on the regular heap.
    pub fn new(size: Size16) -> WarholResult<Self> {
        let len = Self::byte_len(size);
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| WarholError::allocation(format!("bitmap of {len} bytes: {e}")))?;
        data.resize(len, 0);
        Self::from_bytes(size, data)
    }

    /// Wrap an existing buffer; its length must match `size` exactly.
    pub fn from_bytes(size: Size16, data: Vec<u8>) -> WarholResult<Self> {
        let bounds = size.bounds()?;
        if data.len() != Self::byte_len(size) {
            return Err(WarholError::validation(format!(
                "bitmap buffer is {} bytes, expected {}",
                data.len(),
                Self::byte_len(size)
            )));
        }
        Ok(Self { size, bounds, data })
    }

    /// Release the underlying buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Dimensions.
    pub fn size(&self) -> Size16 {
        self.size
    }

    /// Rectangle at the origin covering the bitmap.
    pub fn bounds(&self) -> Rect16 {
        self.bounds
    }

    /// Raw pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at bitmap-local coordinates.
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = (usize::from(y) * usize::from(self.size.width) + usize::from(x)) * BYTES_PER_PIXEL;
        Some(Rgb565::from_be_bytes([self.data[i], self.data[i + 1]]))
    }

    /// One scanline of raw bytes.
    pub fn row(&self, y: u16) -> &[u8] {
        let stride = usize::from(self.size.width) * BYTES_PER_PIXEL;
        let start = usize::from(y) * stride;
        &self.data[start..start + stride]
    }

    /// Overwrite this bitmap with the contents of a same-sized one.
    pub fn copy_from(&mut self, other: &Bitmap) -> WarholResult<()> {
        if self.size != other.size {
            return Err(WarholError::validation("bitmap copy requires equal dimensions"));
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Drawing view over the whole bitmap, placed at the origin.
    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas {
            area: self.bounds,
            stride: usize::from(self.size.width) * BYTES_PER_PIXEL,
            data: &mut self.data,
        }
    }
}

/// Mutable drawing view over a pixel buffer that covers `area` of control space.
///
/// A canvas may cover a whole frame or a single flush band; every operation clips to `area`.
#[derive(Debug)]
pub struct Canvas<'a> {
    area: Rect16,
    stride: usize,
    data: &'a mut [u8],
}

impl<'a> Canvas<'a> {
    /// View `data` as the pixels of `area`, row-major with no padding.
    pub fn new(area: Rect16, data: &'a mut [u8]) -> WarholResult<Self> {
        let stride = usize::from(area.width()) * BYTES_PER_PIXEL;
        let needed = stride * usize::from(area.height());
        if data.len() < needed {
            return Err(WarholError::validation(format!(
                "canvas needs {needed} bytes, buffer has {}",
                data.len()
            )));
        }
        Ok(Self {
            area,
            stride,
            data: &mut data[..needed],
        })
    }

    /// Region of control space this canvas covers.
    pub fn area(&self) -> Rect16 {
        self.area
    }

    /// Raw pixel bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.data
    }

    /// Pixel at control-space coordinates.
    pub fn pixel(&self, p: Point16) -> Option<Rgb565> {
        if !self.area.contains(p) {
            return None;
        }
        let i = self.offset(p.x, p.y);
        Some(Rgb565::from_be_bytes([self.data[i], self.data[i + 1]]))
    }

    /// Set one pixel; points outside the canvas are ignored.
    pub fn put(&mut self, p: Point16, color: Rgb565) {
        if self.area.contains(p) {
            let i = self.offset(p.x, p.y);
            self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&color.to_be_bytes());
        }
    }

    /// Fill `rect` with an opaque color.
    pub fn fill(&mut self, rect: Rect16, color: Rgb565) {
        let Some(r) = rect.intersection(self.area) else {
            return;
        };
        let px = color.to_be_bytes();
        for y in r.y1..=r.y2 {
            let start = self.offset(r.x1, y);
            let end = start + usize::from(r.width()) * BYTES_PER_PIXEL;
            for dst in self.data[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
                dst.copy_from_slice(&px);
            }
        }
    }

    /// Composite a translucent color over `rect`.
    pub fn fill_blend(&mut self, rect: Rect16, color: Rgba32) {
        match color.a {
            0 => {}
            255 => self.fill(rect, color.to_rgb565()),
            _ => {
                let Some(r) = rect.intersection(self.area) else {
                    return;
                };
                for y in r.y1..=r.y2 {
                    let start = self.offset(r.x1, y);
                    let end = start + usize::from(r.width()) * BYTES_PER_PIXEL;
                    for dst in self.data[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
                        let under = Rgb565::from_be_bytes([dst[0], dst[1]]);
                        dst.copy_from_slice(&color.over(under).to_be_bytes());
                    }
                }
            }
        }
    }

    /// Blit `src`, whose top-left pixel sits at `origin` in control space, limited to `clip`.
    pub fn copy_from(&mut self, src: &Bitmap, origin: Point16, clip: Rect16) {
        let placed = Rect16::from_size(origin, src.size());
        let Some(r) = placed
            .intersection(clip)
            .and_then(|r| r.intersection(self.area))
        else {
            return;
        };
        let src_x = usize::from((r.x1 - placed.x1) as u16);
        let len = usize::from(r.width()) * BYTES_PER_PIXEL;
        for y in r.y1..=r.y2 {
            let src_row = src.row((y - placed.y1) as u16);
            let from = src_x * BYTES_PER_PIXEL;
            let dst = self.offset(r.x1, y);
            self.data[dst..dst + len].copy_from_slice(&src_row[from..from + len]);
        }
    }

    fn offset(&self, x: i16, y: i16) -> usize {
        let dx = (i32::from(x) - i32::from(self.area.x1)) as usize;
        let dy = (i32::from(y) - i32::from(self.area.y1)) as usize;
        dy * self.stride + dx * BYTES_PER_PIXEL
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
