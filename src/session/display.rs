use std::time::{Duration, Instant};

use crate::animation::random::RandomSource;
use crate::assets::decode::BackgroundSource;
use crate::foundation::config::DisplayConfig;
use crate::foundation::error::{WarholError, WarholResult};
use crate::panel::flush::{FlushPipeline, FlushStats, Panel};
use crate::render::compositor::{Compositor, CompositorOpts, Drawable};
use crate::render::pool::{BulkHeap, FramePool};
use crate::session::pacer::{FramePacer, PacerReport};
use crate::session::screen::Screen;

/// The frame loop gives up the CPU for a moment after running this long without a break.
pub const YIELD_AFTER: Duration = Duration::from_millis(150);

/// Counters for a [`DisplaySession`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames run.
    pub frames: u64,
    /// Band transfer counters.
    pub flush: FlushStats,
}

/// One screen driven through one flush pipeline: invalidate, update, pace.
#[derive(Debug)]
pub struct DisplaySession<P: Panel, D: Drawable = Compositor> {
    screen: Screen<D>,
    flush: FlushPipeline<P>,
    pacer: FramePacer,
    frames: u64,
    since_yield: Instant,
}

impl<P: Panel> DisplaySession<P, Compositor> {
    /// Build the full animated display for `cfg` on `panel`.
    pub fn from_config(
        cfg: &DisplayConfig,
        panel: P,
        source: Box<dyn BackgroundSource>,
        rng: Box<dyn RandomSource>,
    ) -> WarholResult<Self> {
        cfg.validate()?;
        if panel.size() != cfg.size() {
            return Err(WarholError::validation(format!(
                "panel is {}x{} but the display is configured for {}x{}",
                panel.size().width,
                panel.size().height,
                cfg.width,
                cfg.height
            )));
        }
        let pool = FramePool::new(cfg.size(), Box::new(BulkHeap::new(cfg.bulk_pool_bytes)));
        let compositor = Compositor::new(
            cfg.size().bounds()?,
            CompositorOpts::from_config(cfg),
            pool,
            source,
            rng,
        );
        let screen = Screen::new(cfg.size(), cfg.background(), compositor)?;
        let flush = FlushPipeline::new(panel, cfg.transfer_buffer_bytes)?;
        tracing::info!(
            width = cfg.width,
            height = cfg.height,
            variant = ?cfg.variant,
            rows_per_band = flush.rows_per_band(cfg.width),
            "display session ready"
        );
        Ok(Self::new(screen, flush))
    }
}

impl<P: Panel, D: Drawable> DisplaySession<P, D> {
    /// Session over an already assembled screen and pipeline.
    pub fn new(screen: Screen<D>, flush: FlushPipeline<P>) -> Self {
        Self {
            screen,
            flush,
            pacer: FramePacer::default(),
            frames: 0,
            since_yield: Instant::now(),
        }
    }

    /// Replace the pacer.
    pub fn with_pacer(mut self, pacer: FramePacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Invalidate the control and push one frame to the panel.
    ///
    /// Returns the pacer report when a reporting window closed on this frame.
    pub fn run_frame(&mut self) -> WarholResult<Option<PacerReport>> {
        let start = Instant::now();
        self.screen.invalidate();
        self.screen.update(&mut self.flush)?;
        self.frames = self.frames.saturating_add(1);
        let now = Instant::now();
        let report = self.pacer.record(now.saturating_duration_since(start), now);

        if now.saturating_duration_since(self.since_yield) > YIELD_AFTER {
            std::thread::sleep(Duration::from_millis(1));
            self.since_yield = Instant::now();
        }
        Ok(report)
    }

    /// Run `count` frames, then wait for the last transfer.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run(&mut self, count: u64) -> WarholResult<SessionStats> {
        for _ in 0..count {
            self.run_frame()?;
        }
        self.flush.wait_idle()?;
        Ok(self.stats())
    }

    /// Wait until the panel has consumed every band.
    pub fn wait_idle(&mut self) -> WarholResult<()> {
        self.flush.wait_idle()
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frames: self.frames,
            flush: self.flush.stats(),
        }
    }

    /// The screen.
    pub fn screen(&self) -> &Screen<D> {
        &self.screen
    }

    /// The screen, mutably.
    pub fn screen_mut(&mut self) -> &mut Screen<D> {
        &mut self.screen
    }

    /// The panel.
    pub fn panel(&self) -> &P {
        self.flush.panel()
    }

    /// The pacer.
    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/display.rs"]
mod tests;
