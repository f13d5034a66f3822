use std::time::{Duration, Instant};

/// Throughput over one reporting window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacerReport {
    /// Frames completed in the window.
    pub frames: u32,
    /// Time spent inside frames.
    pub busy: Duration,
}

impl PacerReport {
    /// Mean frame time, or `None` for an empty window.
    pub fn average(&self) -> Option<Duration> {
        (self.frames > 0).then(|| self.busy / self.frames)
    }
}

impl std::fmt::Display for PacerReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.average() {
            Some(avg) => write!(f, "{} FPS, avg {}ms", self.frames, avg.as_millis()),
            None => write!(f, "<1 FPS, total {}ms", self.busy.as_millis()),
        }
    }
}

/// Counts frames and reports throughput once per window.
#[derive(Clone, Debug)]
pub struct FramePacer {
    window: Duration,
    window_start: Instant,
    frames: u32,
    busy: Duration,
    total_frames: u64,
    last: Option<PacerReport>,
}

impl FramePacer {
    /// Pacer reporting every `window`, starting now.
    pub fn new(window: Duration) -> Self {
        Self::starting_at(window, Instant::now())
    }

    /// Pacer whose first window opens at `start`.
    pub fn starting_at(window: Duration, start: Instant) -> Self {
        Self {
            window,
            window_start: start,
            frames: 0,
            busy: Duration::ZERO,
            total_frames: 0,
            last: None,
        }
    }

    /// Record a frame that took `elapsed` and finished at `now`.
    ///
    /// Returns a report when the window closed; the next window opens at `now`.
    pub fn record(&mut self, elapsed: Duration, now: Instant) -> Option<PacerReport> {
        self.frames = self.frames.saturating_add(1);
        self.busy = self.busy.saturating_add(elapsed);
        self.total_frames = self.total_frames.saturating_add(1);
        if now.saturating_duration_since(self.window_start) < self.window {
            return None;
        }
        let report = PacerReport {
            frames: self.frames,
            busy: self.busy,
        };
        tracing::info!("{report}");
        self.frames = 0;
        self.busy = Duration::ZERO;
        self.window_start = now;
        self.last = Some(report);
        Some(report)
    }

    /// Frames recorded since creation.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Most recent report.
    pub fn last_report(&self) -> Option<PacerReport> {
        self.last
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/pacer.rs"]
mod tests;
