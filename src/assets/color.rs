use crate::animation::blend::BlendFactor;
use crate::animation::random::RandomSource;
use crate::foundation::math::{expand5, expand6, lerp_u8};

/// Working color: 8 bits per channel with straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba32 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel, 255 is opaque.
    pub a: u8,
}

impl Rgba32 {
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::opaque(0, 0, 255);
    /// Opaque red.
    pub const RED: Self = Self::opaque(255, 0, 0);
    /// Opaque orange.
    pub const ORANGE: Self = Self::opaque(255, 165, 0);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::opaque(255, 255, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::opaque(0, 128, 0);
    /// Opaque cyan.
    pub const CYAN: Self = Self::opaque(0, 255, 255);
    /// Opaque purple.
    pub const PURPLE: Self = Self::opaque(128, 0, 128);

    /// Create a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Pack as `0xRRGGBBAA` so the color fits in one atomic word.
    pub const fn to_packed(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Inverse of [`Rgba32::to_packed`].
    pub const fn from_packed(v: u32) -> Self {
        let [r, g, b, a] = v.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Convert to the panel format, discarding alpha.
    pub fn to_rgb565(self) -> Rgb565 {
        Rgb565::from_rgb8(self.r, self.g, self.b)
    }

    /// Source-over composition of this color onto an opaque panel pixel.
    pub fn over(self, dst: Rgb565) -> Rgb565 {
        match self.a {
            0 => dst,
            255 => self.to_rgb565(),
            a => {
                let d = dst.to_rgba32();
                Rgb565::from_rgb8(
                    lerp_u8(d.r, self.r, a),
                    lerp_u8(d.g, self.g, a),
                    lerp_u8(d.b, self.b, a),
                )
            }
        }
    }
}

/// Interpolate every channel (alpha included) from `a` towards `b`.
///
/// `t` is clamped to `[0, 1]`; `t == 0` yields `a` and `t >= 1` yields `b` exactly.
pub fn blend(a: Rgba32, b: Rgba32, t: BlendFactor) -> Rgba32 {
    let w = t.to_u8();
    Rgba32 {
        r: lerp_u8(a.r, b.r, w),
        g: lerp_u8(a.g, b.g, w),
        b: lerp_u8(a.b, b.b, w),
        a: lerp_u8(a.a, b.a, w),
    }
}

/// Panel color: 5-6-5 bit RGB, no alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    /// Black.
    pub const BLACK: Self = Self(0);
    /// White.
    pub const WHITE: Self = Self(0xffff);

    /// Quantize 8-bit channels.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3))
    }

    /// Expand to an opaque working color.
    pub fn to_rgba32(self) -> Rgba32 {
        Rgba32::opaque(
            expand5(self.0 >> 11),
            expand6(self.0 >> 5),
            expand5(self.0),
        )
    }

    /// Panel byte order (big-endian).
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Read a pixel stored in panel byte order.
    pub const fn from_be_bytes(b: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(b))
    }
}

/// The seven hues blocks and the background cycle through.
pub const PALETTE: [Rgba32; 7] = [
    Rgba32::BLUE,
    Rgba32::RED,
    Rgba32::ORANGE,
    Rgba32::YELLOW,
    Rgba32::GREEN,
    Rgba32::CYAN,
    Rgba32::PURPLE,
];

/// Lowest alpha handed out by [`select_color`].
pub const MIN_ALPHA: u8 = 32;
/// One past the highest alpha handed out by [`select_color`].
pub const MAX_ALPHA_EXCLUSIVE: u8 = 212;

/// Pick `PALETTE[index % 7]` with a random alpha in `[32, 212)`.
///
/// Called with a loop index for deterministic distinct hues, or with a random value for an
/// unconstrained hue. Exactly one value is drawn from `rng`.
pub fn select_color(index: u32, rng: &mut dyn RandomSource) -> Rgba32 {
    let hue = PALETTE[(index % PALETTE.len() as u32) as usize];
    let span = u32::from(MAX_ALPHA_EXCLUSIVE - MIN_ALPHA);
    hue.with_alpha((rng.next_u32() % span) as u8 + MIN_ALPHA)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
