use crate::foundation::error::{WarholError, WarholResult};

/// Signed pixel coordinate in control space.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point16 {
    /// Horizontal coordinate.
    pub x: i16,
    /// Vertical coordinate.
    pub y: i16,
}

impl Point16 {
    /// Create a point.
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Size16 {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

impl Size16 {
    /// Create a size.
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Rectangle at the origin covering the whole size.
    ///
    /// Zero-sized dimensions are rejected since an inclusive rectangle cannot be empty.
    pub fn bounds(self) -> WarholResult<Rect16> {
        if self.width == 0 || self.height == 0 {
            return Err(WarholError::validation("size must be non-zero"));
        }
        if self.width > i16::MAX as u16 || self.height > i16::MAX as u16 {
            return Err(WarholError::validation("size exceeds i16 coordinate space"));
        }
        Ok(Rect16::new(
            0,
            0,
            self.width as i16 - 1,
            self.height as i16 - 1,
        ))
    }
}

/// Rectangle with inclusive corners: `x2`/`y2` address the last covered pixel.
///
/// All internal geometry uses this convention. The hardware boundary uses [`PanelArea`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rect16 {
    /// Left edge (inclusive).
    pub x1: i16,
    /// Top edge (inclusive).
    pub y1: i16,
    /// Right edge (inclusive).
    pub x2: i16,
    /// Bottom edge (inclusive).
    pub y2: i16,
}

impl Rect16 {
    /// Create a rectangle from inclusive corners, normalizing their order.
    pub fn new(x1: i16, y1: i16, x2: i16, y2: i16) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Rectangle of `size` whose top-left corner is `origin`.
    pub fn from_size(origin: Point16, size: Size16) -> Self {
        let w = i32::from(size.width).max(1);
        let h = i32::from(size.height).max(1);
        Self::new(
            origin.x,
            origin.y,
            clamp_i16(i32::from(origin.x) + w - 1),
            clamp_i16(i32::from(origin.y) + h - 1),
        )
    }

    /// Square centered on `center` extending `half` pixels in every direction.
    pub fn from_center(center: Point16, half: i16) -> Self {
        let h = i32::from(half);
        Self::new(
            clamp_i16(i32::from(center.x) - h),
            clamp_i16(i32::from(center.y) - h),
            clamp_i16(i32::from(center.x) + h),
            clamp_i16(i32::from(center.y) + h),
        )
    }

    /// Width in pixels.
    pub fn width(self) -> u16 {
        (i32::from(self.x2) - i32::from(self.x1) + 1) as u16
    }

    /// Height in pixels.
    pub fn height(self) -> u16 {
        (i32::from(self.y2) - i32::from(self.y1) + 1) as u16
    }

    /// Dimensions of the rectangle.
    pub fn size(self) -> Size16 {
        Size16::new(self.width(), self.height())
    }

    /// Top-left corner.
    pub fn top_left(self) -> Point16 {
        Point16::new(self.x1, self.y1)
    }

    /// Returns `true` when the two rectangles share at least one pixel.
    pub fn intersects(self, other: Rect16) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    /// Overlapping area of both rectangles, if any.
    pub fn intersection(self, other: Rect16) -> Option<Rect16> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect16 {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        })
    }

    /// Smallest rectangle covering both.
    pub fn union(self, other: Rect16) -> Rect16 {
        Rect16 {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Returns `true` when `p` lies inside the rectangle.
    pub fn contains(self, p: Point16) -> bool {
        self.x1 <= p.x && p.x <= self.x2 && self.y1 <= p.y && p.y <= self.y2
    }

    /// Translate by `(dx, dy)`, saturating at the coordinate limits.
    pub fn offset(self, dx: i16, dy: i16) -> Self {
        Self {
            x1: self.x1.saturating_add(dx),
            y1: self.y1.saturating_add(dy),
            x2: self.x2.saturating_add(dx),
            y2: self.y2.saturating_add(dy),
        }
    }

    /// Same-sized rectangle centered over `outer`.
    ///
    /// When `self` is larger than `outer` the result extends past `outer` evenly on both sides.
    pub fn center_in(self, outer: Rect16) -> Self {
        let dx = (i32::from(outer.width()) - i32::from(self.width())) / 2;
        let dy = (i32::from(outer.height()) - i32::from(self.height())) / 2;
        Self::from_size(
            Point16::new(
                clamp_i16(i32::from(outer.x1) + dx),
                clamp_i16(i32::from(outer.y1) + dy),
            ),
            self.size(),
        )
    }

    /// Convert to the hardware's exclusive-end convention.
    pub fn to_panel_area(self) -> PanelArea {
        PanelArea {
            x1: i32::from(self.x1),
            y1: i32::from(self.y1),
            x2: i32::from(self.x2) + 1,
            y2: i32::from(self.y2) + 1,
        }
    }
}

/// Hardware rectangle: `x2`/`y2` are one past the last pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PanelArea {
    /// Left edge (inclusive).
    pub x1: i32,
    /// Top edge (inclusive).
    pub y1: i32,
    /// Right edge (exclusive).
    pub x2: i32,
    /// Bottom edge (exclusive).
    pub y2: i32,
}

impl PanelArea {
    /// Width in pixels.
    pub fn width(self) -> usize {
        (self.x2 - self.x1).max(0) as usize
    }

    /// Height in pixels.
    pub fn height(self) -> usize {
        (self.y2 - self.y1).max(0) as usize
    }

    /// Bytes of RGB565 data needed to cover the area.
    pub fn byte_len(self) -> usize {
        self.width() * self.height() * 2
    }

    /// Returns `true` when the area lies within a panel of `size`.
    pub fn fits(self, size: Size16) -> bool {
        self.x1 >= 0
            && self.y1 >= 0
            && self.x2 > self.x1
            && self.y2 > self.y1
            && self.x2 <= i32::from(size.width)
            && self.y2 <= i32::from(size.height)
    }
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
