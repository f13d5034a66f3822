/// `round(x * y / 255)` for 8-bit channel products.
pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Linear interpolation between two 8-bit channels with an 8-bit weight on `b`.
pub(crate) fn lerp_u8(a: u8, b: u8, t: u8) -> u8 {
    let t = u16::from(t);
    let av = mul_div255_u16(u16::from(a), 255 - t);
    let bv = mul_div255_u16(u16::from(b), t);
    (av + bv).min(255) as u8
}

/// Expand a 5-bit channel to 8 bits by bit replication.
pub(crate) fn expand5(v: u16) -> u8 {
    let v = (v & 0x1f) as u8;
    (v << 3) | (v >> 2)
}

/// Expand a 6-bit channel to 8 bits by bit replication.
pub(crate) fn expand6(v: u16) -> u8 {
    let v = (v & 0x3f) as u8;
    (v << 2) | (v >> 4)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
