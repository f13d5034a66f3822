use crate::animation::random::RandomSource;
use crate::assets::color::{Rgba32, blend, select_color};

/// Fixed-point blend factor in milli-units: `1000` is `1.0`.
///
/// Integer accumulation keeps the crossfade cadence exact: ten steps of `0.1` reach `1.0` and
/// the eleventh reaches the `1.1` threshold, with no floating-point drift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlendFactor(pub u16);

impl BlendFactor {
    /// Milli-units per `1.0`.
    pub const SCALE: u16 = 1000;
    /// `0.0`.
    pub const ZERO: Self = Self(0);
    /// `1.0`.
    pub const ONE: Self = Self(Self::SCALE);

    /// Convert from a float, rounding to the nearest milli-unit.
    pub fn from_f32(v: f32) -> Self {
        Self((v * f32::from(Self::SCALE)).round().clamp(0.0, f32::from(u16::MAX)) as u16)
    }

    /// Value as a float, for diagnostics.
    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / f32::from(Self::SCALE)
    }

    /// 8-bit weight for channel interpolation, clamped to `[0, 1]`.
    pub fn to_u8(self) -> u8 {
        let v = u32::from(self.0.min(Self::SCALE));
        ((v * 255 + u32::from(Self::SCALE) / 2) / u32::from(Self::SCALE)) as u8
    }
}

/// Crossfade cadence shared by every blend state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendRules {
    /// Increment per step, in milli-units.
    pub step: u16,
    /// Factor at which the crossfade completes, in milli-units.
    pub threshold: u16,
}

impl Default for BlendRules {
    fn default() -> Self {
        Self {
            step: 100,
            threshold: 1100,
        }
    }
}

impl BlendRules {
    /// Build rules from float step/threshold values.
    pub fn from_f32(step: f32, threshold: f32) -> Self {
        Self {
            step: BlendFactor::from_f32(step).0.max(1),
            threshold: BlendFactor::from_f32(threshold).0.max(BlendFactor::SCALE),
        }
    }
}

/// A running crossfade from `current` to `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendState {
    /// Color the crossfade starts from.
    pub current: Rgba32,
    /// Color the crossfade moves towards.
    pub target: Rgba32,
    /// Progress of the crossfade.
    pub factor: BlendFactor,
}

impl BlendState {
    /// Start a crossfade at factor zero.
    pub fn new(current: Rgba32, target: Rgba32) -> Self {
        Self {
            current,
            target,
            factor: BlendFactor::ZERO,
        }
    }

    /// Color shown for the current factor.
    pub fn displayed(&self) -> Rgba32 {
        blend(self.current, self.target, self.factor)
    }

    /// Advance by one step. Returns `true` when the crossfade completed.
    ///
    /// On completion the target becomes current, a new random target is drawn and the factor
    /// restarts at zero.
    pub fn step(&mut self, rules: &BlendRules, rng: &mut dyn RandomSource) -> bool {
        self.factor = BlendFactor(self.factor.0.saturating_add(rules.step));
        if self.factor.0 < rules.threshold {
            return false;
        }
        self.current = self.target;
        let index = rng.next_u32();
        self.target = select_color(index, rng);
        self.factor = BlendFactor::ZERO;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/blend.rs"]
mod tests;
