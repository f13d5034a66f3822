use std::sync::Arc;
use std::time::Duration;

use crate::animation::random::RandomSource;
use crate::animation::state::{AnimationOpts, AnimationState};
use crate::assets::decode::BackgroundSource;
use crate::foundation::config::{DisplayConfig, RefreshVariant};
use crate::foundation::core::{Point16, Rect16};
use crate::foundation::error::{WarholError, WarholResult};
use crate::render::pool::{BufferId, Frame, FrameLayout, FramePool, FramePoolStats};
use crate::render::refresh::{BackgroundRefresh, RefreshObserver, RefreshOpts, recompose};
use crate::render::surface::{Bitmap, Canvas};

/// A screen element that paints itself into clipped canvases.
///
/// The screen calls `on_before_paint`, then `on_paint` once per band, then `on_after_paint`.
pub trait Drawable: Send {
    /// Control-space rectangle this element covers.
    fn bounds(&self) -> Rect16;

    /// Per-frame setup before any band is painted.
    fn on_before_paint(&mut self) {}

    /// Paint the part of the element inside `clip` into `canvas`.
    fn on_paint(&self, canvas: &mut Canvas<'_>, clip: Rect16);

    /// Per-frame bookkeeping after every band is painted.
    fn on_after_paint(&mut self) {}

    /// Touch input. Returns `true` when handled.
    fn on_touch(&mut self, _points: &[Point16]) -> bool {
        false
    }
}

/// Lifecycle of a [`Compositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawState {
    /// No buffers held; the next frame tries to initialize.
    Uninitialized,
    /// Buffers held and animation running.
    Animating,
}

/// Compositor settings.
#[derive(Clone, Debug)]
pub struct CompositorOpts {
    /// Block count, size and crossfade cadence.
    pub animation: AnimationOpts,
    /// How the base image is kept current.
    pub variant: RefreshVariant,
    /// Ticks between inline recompositions.
    pub refresh_period: u32,
    /// Refresh task settings.
    pub refresh: RefreshOpts,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            animation: AnimationOpts::default(),
            variant: RefreshVariant::default(),
            refresh_period: 10,
            refresh: RefreshOpts {
                delay: Duration::from_millis(1),
                observer: None,
            },
        }
    }
}

impl CompositorOpts {
    /// Compositor settings from a display configuration.
    pub fn from_config(cfg: &DisplayConfig) -> Self {
        Self {
            animation: AnimationOpts::from_config(cfg),
            variant: cfg.variant,
            refresh_period: cfg.refresh_period.max(1),
            refresh: RefreshOpts {
                delay: cfg.refresh_delay(),
                observer: None,
            },
        }
    }

    /// Attach a refresh observer.
    pub fn with_observer(mut self, observer: Arc<dyn RefreshObserver>) -> Self {
        self.refresh.observer = Some(observer);
        self
    }
}

enum Refresh {
    Idle,
    Inline { ticks: u32 },
    Background(BackgroundRefresh),
}

/// The animated control: a background image under a slowly shifting tint, with translucent
/// blocks bouncing over it.
///
/// Buffers are acquired lazily on the first frame. Any failure during acquisition releases
/// everything and leaves the compositor [`DrawState::Uninitialized`]. Allocation and task
/// failures are retried on the next frame; any other failure (an undecodable background, for
/// one) is latched in [`Compositor::fault`] and never retried.
pub struct Compositor {
    bounds: Rect16,
    opts: CompositorOpts,
    state: DrawState,
    pool: FramePool,
    source: Box<dyn BackgroundSource>,
    rng: Box<dyn RandomSource>,
    anim: Option<AnimationState>,
    pristine: Option<Arc<Bitmap>>,
    base: Option<Frame>,
    parked: Vec<Frame>,
    refresh: Refresh,
    init_failures: u64,
    fault: Option<WarholError>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("bounds", &self.bounds)
            .field("state", &self.state)
            .field("base", &self.base_id())
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Compositor covering `bounds`. Nothing is allocated until the first frame.
    pub fn new(
        bounds: Rect16,
        opts: CompositorOpts,
        pool: FramePool,
        source: Box<dyn BackgroundSource>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            bounds,
            opts,
            state: DrawState::Uninitialized,
            pool,
            source,
            rng,
            anim: None,
            pristine: None,
            base: None,
            parked: Vec::new(),
            refresh: Refresh::Idle,
            init_failures: 0,
            fault: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DrawState {
        self.state
    }

    /// Animation state while animating.
    pub fn animation(&self) -> Option<&AnimationState> {
        self.anim.as_ref()
    }

    /// Base currently painted under the blocks.
    pub fn base_id(&self) -> Option<BufferId> {
        self.base.as_ref().map(Frame::id)
    }

    /// Pixels of the base currently painted under the blocks.
    pub fn base(&self) -> Option<&Bitmap> {
        self.base.as_ref().map(Frame::bitmap)
    }

    /// Frame pool counters.
    pub fn pool_stats(&self) -> FramePoolStats {
        self.pool.stats()
    }

    /// Initialization attempts that failed and rolled back.
    pub fn init_failures(&self) -> u64 {
        self.init_failures
    }

    /// The permanent initialization failure that stopped retries, if any.
    pub fn fault(&self) -> Option<&WarholError> {
        self.fault.as_ref()
    }

    /// Stop background work and release every buffer.
    ///
    /// The refresh task is joined before any buffer is freed. Safe to call repeatedly; the
    /// compositor returns to [`DrawState::Uninitialized`].
    pub fn teardown(&mut self) {
        if let Refresh::Background(task) = std::mem::replace(&mut self.refresh, Refresh::Idle) {
            for frame in task.stop() {
                self.pool.restore(frame);
            }
        }
        if let Some(base) = self.base.take() {
            self.pool.restore(base);
        }
        for frame in self.parked.drain(..) {
            self.pool.restore(frame);
        }
        if let Some(pristine) = self.pristine.take() {
            match Arc::try_unwrap(pristine) {
                Ok(bitmap) => self.pool.restore(Frame::new(BufferId::Pristine, bitmap)),
                Err(_) => tracing::error!("pristine image still shared at teardown"),
            }
        }
        self.pool.deallocate();
        self.anim = None;
        self.state = DrawState::Uninitialized;
    }

    #[tracing::instrument(level = "debug", skip(self), fields(variant = ?self.opts.variant))]
    fn initialize(&mut self) -> WarholResult<()> {
        let layout = FrameLayout::from(self.opts.variant);
        self.pool.allocate(layout.ids())?;

        let pristine = self
            .pool
            .get_mut(BufferId::Pristine)
            .ok_or_else(|| WarholError::allocation("pristine frame missing after allocate"))?;
        let decoded = self.source.decode_into(pristine.bitmap_mut())?;
        tracing::debug!(width = decoded.width, height = decoded.height, "background decoded");

        let pristine = self
            .pool
            .take(BufferId::Pristine)
            .ok_or_else(|| WarholError::allocation("pristine frame missing after decode"))?;
        let pristine = Arc::new(pristine.into_bitmap());
        self.pristine = Some(pristine.clone());

        let base = self
            .pool
            .take(BufferId::BaseA)
            .ok_or_else(|| WarholError::allocation("base frame missing after allocate"))?;
        self.base.insert(base).bitmap_mut().copy_from(&pristine)?;

        let anim = AnimationState::reset(self.bounds, &self.opts.animation, self.rng.as_mut());
        let overlay = anim.background().displayed();
        self.anim = Some(anim);

        self.refresh = match layout {
            FrameLayout::Synchronous => Refresh::Inline { ticks: 0 },
            FrameLayout::Background => {
                let spare = self
                    .pool
                    .take(BufferId::BaseB)
                    .ok_or_else(|| WarholError::allocation("spare frame missing after allocate"))?;
                match BackgroundRefresh::spawn(
                    pristine,
                    spare,
                    BufferId::BaseA,
                    overlay,
                    self.opts.refresh.clone(),
                ) {
                    Ok(task) => Refresh::Background(task),
                    Err(failure) => {
                        self.pool.restore(failure.spare);
                        return Err(failure.error);
                    }
                }
            }
        };
        Ok(())
    }

    fn refresh_base(&mut self) {
        let Some(anim) = self.anim.as_mut() else {
            return;
        };
        match &mut self.refresh {
            Refresh::Idle => {}
            Refresh::Inline { ticks } => {
                *ticks += 1;
                if *ticks < self.opts.refresh_period {
                    return;
                }
                *ticks = 0;
                if let (Some(pristine), Some(base)) = (&self.pristine, self.base.as_mut()) {
                    let overlay = anim.background().displayed();
                    if let Err(e) = recompose(pristine, base.bitmap_mut(), overlay) {
                        tracing::warn!(error = %e, "inline recompose failed");
                    }
                }
                anim.advance_background(self.rng.as_mut());
            }
            Refresh::Background(task) => {
                task.set_overlay(anim.background().displayed());
                let Some(fresh) = task.poll() else {
                    return;
                };
                task.mark_published(fresh.id());
                if let Some(old) = self.base.replace(fresh) {
                    if let Err(old) = task.retire(old) {
                        tracing::warn!(buffer = old.id().name(), "refresh task refused a retired base");
                        self.parked.push(old);
                    }
                }
                anim.advance_background(self.rng.as_mut());
            }
        }
    }
}

impl Drawable for Compositor {
    fn bounds(&self) -> Rect16 {
        self.bounds
    }

    fn on_before_paint(&mut self) {
        match self.state {
            DrawState::Uninitialized if self.fault.is_some() => {}
            DrawState::Uninitialized => match self.initialize() {
                Ok(()) => {
                    self.state = DrawState::Animating;
                    tracing::info!(
                        variant = ?self.opts.variant,
                        blocks = self.opts.animation.block_count,
                        "compositor animating"
                    );
                }
                Err(e) => {
                    self.init_failures = self.init_failures.saturating_add(1);
                    self.teardown();
                    if e.is_retryable() {
                        tracing::warn!(error = %e, "compositor initialization failed; retrying next frame");
                    } else {
                        tracing::error!(error = %e, "compositor initialization failed permanently");
                        self.fault = Some(e);
                    }
                }
            },
            DrawState::Animating => self.refresh_base(),
        }
    }

    fn on_paint(&self, canvas: &mut Canvas<'_>, clip: Rect16) {
        let Some(base) = &self.base else {
            return;
        };
        let Some(clip) = clip.intersection(self.bounds) else {
            return;
        };
        let placed = base.bitmap().bounds().center_in(self.bounds);
        canvas.copy_from(base.bitmap(), placed.top_left(), clip);

        let Some(anim) = &self.anim else {
            return;
        };
        for block in anim.blocks() {
            if let Some(r) = anim.block_rect(block).intersection(clip) {
                canvas.fill_blend(r, block.color.displayed());
            }
        }
    }

    fn on_after_paint(&mut self) {
        if self.state != DrawState::Animating {
            return;
        }
        if let Some(anim) = self.anim.as_mut() {
            anim.advance(self.rng.as_mut());
        }
    }

    fn on_touch(&mut self, _points: &[Point16]) -> bool {
        true
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
