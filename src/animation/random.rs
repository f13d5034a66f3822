use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Source of pseudo-random values for the animation.
///
/// Values are non-negative and reduced by callers with `%`, the way a C `rand()` would be.
pub trait RandomSource: Send {
    /// Next value in `[0, 2^31)`.
    fn next_u32(&mut self) -> u32;
}

/// Adapter over any [`rand::RngCore`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: RngCore> RngSource<R> {
    /// Wrap an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Deterministic generator for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system.
    pub fn from_os() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: RngCore + Send> RandomSource for RngSource<R> {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32() >> 1
    }
}

/// Replays a fixed script of values, wrapping around at the end.
///
/// An empty script yields zeros.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: Vec<u32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Create a source that replays `values` in order.
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Number of values drawn so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_u32(&mut self) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/random.rs"]
mod tests;
