use crate::animation::blend::{BlendRules, BlendState};
use crate::animation::random::RandomSource;
use crate::assets::color::select_color;
use crate::foundation::config::DisplayConfig;
use crate::foundation::core::{Point16, Rect16};

/// Shape of the animation: how many blocks, how large, how fast colors fade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationOpts {
    /// Number of moving blocks.
    pub block_count: usize,
    /// Edge length of each block.
    pub block_size: u16,
    /// Crossfade cadence for blocks and background.
    pub rules: BlendRules,
}

impl Default for AnimationOpts {
    fn default() -> Self {
        Self {
            block_count: 3,
            block_size: 60,
            rules: BlendRules::default(),
        }
    }
}

impl AnimationOpts {
    /// Extract the animation parameters from a display configuration.
    pub fn from_config(cfg: &DisplayConfig) -> Self {
        Self {
            block_count: cfg.block_count,
            block_size: cfg.block_size,
            rules: cfg.blend_rules(),
        }
    }
}

/// A translucent square bouncing around the drawable area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovingBlock {
    /// Center of the block.
    pub position: Point16,
    /// Per-tick displacement; neither component is ever zero.
    pub velocity: Point16,
    /// Color crossfade.
    pub color: BlendState,
}

/// Per-frame animation state: the background crossfade plus every moving block.
///
/// Pure in-memory transitions; no I/O and no allocation after [`AnimationState::reset`].
#[derive(Clone, Debug)]
pub struct AnimationState {
    bounds: Rect16,
    half: i16,
    rules: BlendRules,
    background: BlendState,
    blocks: Vec<MovingBlock>,
}

impl AnimationState {
    /// Seed the background crossfade and every block.
    ///
    /// Block centers start inset by half the block size from every edge, velocities are drawn
    /// from `[-2, 2]` and re-rolled until nonzero, and block `i` starts on palette hue `i`.
    pub fn reset(bounds: Rect16, opts: &AnimationOpts, rng: &mut dyn RandomSource) -> Self {
        let size = i32::from(opts.block_size);
        let half = (opts.block_size / 2) as i16;

        let bg_index = rng.next_u32();
        let bg_current = select_color(bg_index, rng);
        let bg_index = rng.next_u32();
        let bg_target = select_color(bg_index, rng);

        let span_x = (i32::from(bounds.width()) - size).max(1) as u32;
        let span_y = (i32::from(bounds.height()) - size).max(1) as u32;

        let mut blocks = Vec::with_capacity(opts.block_count);
        for i in 0..opts.block_count {
            let x = i32::from(bounds.x1) + (rng.next_u32() % span_x) as i32 + size / 2;
            let y = i32::from(bounds.y1) + (rng.next_u32() % span_y) as i32 + size / 2;
            let dx = nonzero_delta(rng);
            let dy = nonzero_delta(rng);
            let current = select_color(i as u32, rng);
            let target_index = rng.next_u32();
            let target = select_color(target_index, rng);

            let mut block = MovingBlock {
                position: Point16::new(x as i16, y as i16),
                velocity: Point16::new(dx, dy),
                color: BlendState::new(current, target),
            };
            reflect(bounds, half, &mut block);
            blocks.push(block);
        }

        Self {
            bounds,
            half,
            rules: opts.rules,
            background: BlendState::new(bg_current, bg_target),
            blocks,
        }
    }

    /// Advance every block by one frame.
    ///
    /// Each block moves by its velocity, then any velocity component whose *next* step would
    /// carry the block past an edge is negated. Block colors step once.
    pub fn advance(&mut self, rng: &mut dyn RandomSource) {
        for block in &mut self.blocks {
            block.position.x = block.position.x.saturating_add(block.velocity.x);
            block.position.y = block.position.y.saturating_add(block.velocity.y);
            reflect(self.bounds, self.half, block);
            block.color.step(&self.rules, rng);
        }
    }

    /// Step the background crossfade once. Returns `true` when it completed.
    pub fn advance_background(&mut self, rng: &mut dyn RandomSource) -> bool {
        self.background.step(&self.rules, rng)
    }

    /// Background crossfade.
    pub fn background(&self) -> &BlendState {
        &self.background
    }

    /// All moving blocks.
    pub fn blocks(&self) -> &[MovingBlock] {
        &self.blocks
    }

    /// Screen rectangle covered by `block`.
    pub fn block_rect(&self, block: &MovingBlock) -> Rect16 {
        Rect16::from_center(block.position, self.half)
    }

    /// Region block centers are confined to.
    pub fn inset_bounds(&self) -> Rect16 {
        Rect16::new(
            self.bounds.x1 + self.half,
            self.bounds.y1 + self.half,
            self.bounds.x2 - self.half,
            self.bounds.y2 - self.half,
        )
    }

    /// Drawable area the state was seeded for.
    pub fn bounds(&self) -> Rect16 {
        self.bounds
    }
}

const MAX_DELTA_DRAWS: usize = 16;

// A source stuck on zero deltas falls back to +1 after MAX_DELTA_DRAWS draws.
fn nonzero_delta(rng: &mut dyn RandomSource) -> i16 {
    for _ in 0..MAX_DELTA_DRAWS {
        let d = (rng.next_u32() % 5) as i16 - 2;
        if d != 0 {
            return d;
        }
    }
    1
}

// Lookahead: test the position one step ahead, not the current one.
fn reflect(bounds: Rect16, half: i16, block: &mut MovingBlock) {
    let half = i32::from(half);
    let nx = i32::from(block.position.x) + i32::from(block.velocity.x);
    if nx - half < i32::from(bounds.x1) || nx + half > i32::from(bounds.x2) {
        block.velocity.x = -block.velocity.x;
    }
    let ny = i32::from(block.position.y) + i32::from(block.velocity.y);
    if ny - half < i32::from(bounds.y1) || ny + half > i32::from(bounds.y2) {
        block.velocity.y = -block.velocity.y;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/state.rs"]
mod tests;
