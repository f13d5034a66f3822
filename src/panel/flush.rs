use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::foundation::core::{PanelArea, Rect16, Size16};
use crate::foundation::error::{WarholError, WarholResult};
use crate::panel::transfer::{FlushCompletion, TRANSFER_BUFFERS, TransferBuffer};
use crate::render::surface::{BYTES_PER_PIXEL, Canvas};

/// How long `present` waits for a transport to hand a buffer back before giving up.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(2);

/// A display transport that accepts RGB565 bands.
pub trait Panel: Send {
    /// Panel resolution.
    fn size(&self) -> Size16;

    /// Start writing `buffer` to `area` (exclusive end).
    ///
    /// Ownership of `buffer` passes to the transport, which must hand it back through
    /// `done.notify` once the bytes are no longer read, including when this returns an error.
    fn flush(
        &mut self,
        area: PanelArea,
        buffer: TransferBuffer,
        done: &FlushCompletion,
    ) -> WarholResult<()>;
}

/// Lifetime counters for a [`FlushPipeline`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
    /// Dirty regions presented.
    pub frames: u64,
    /// Bands transferred.
    pub bands: u64,
    /// Times the painter had to wait for a free buffer.
    pub waits: u64,
}

/// Paints dirty regions band by band into two alternating transfer buffers.
///
/// While the transport moves one band the painter fills the other; it only blocks when both are
/// in flight.
pub struct FlushPipeline<P: Panel> {
    panel: P,
    free: Vec<TransferBuffer>,
    done: FlushCompletion,
    done_rx: Receiver<TransferBuffer>,
    in_flight: usize,
    buffer_bytes: usize,
    stats: FlushStats,
}

impl<P: Panel> std::fmt::Debug for FlushPipeline<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushPipeline")
            .field("buffer_bytes", &self.buffer_bytes)
            .field("in_flight", &self.in_flight)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<P: Panel> FlushPipeline<P> {
    /// Pipeline over `panel` with two transfer buffers of `buffer_bytes` each.
    pub fn new(panel: P, buffer_bytes: usize) -> WarholResult<Self> {
        let row = usize::from(panel.size().width) * BYTES_PER_PIXEL;
        if buffer_bytes < row {
            return Err(WarholError::validation(format!(
                "transfer buffer of {buffer_bytes} bytes cannot hold one {row} byte row"
            )));
        }
        let mut free = Vec::with_capacity(TRANSFER_BUFFERS);
        for i in 0..TRANSFER_BUFFERS {
            free.push(TransferBuffer::allocate(i as u8, buffer_bytes)?);
        }
        let (done, done_rx) = FlushCompletion::channel();
        Ok(Self {
            panel,
            free,
            done,
            done_rx,
            in_flight: 0,
            buffer_bytes,
            stats: FlushStats::default(),
        })
    }

    /// Rows of a `width`-pixel region that fit in one buffer.
    pub fn rows_per_band(&self, width: u16) -> u16 {
        let row = usize::from(width.max(1)) * BYTES_PER_PIXEL;
        (self.buffer_bytes / row).clamp(1, usize::from(u16::MAX)) as u16
    }

    /// Paint `area` band by band and hand each band to the panel.
    ///
    /// `paint` receives a canvas covering exactly one band; it is called top to bottom.
    pub fn present(
        &mut self,
        area: Rect16,
        mut paint: impl FnMut(&mut Canvas<'_>),
    ) -> WarholResult<()> {
        let screen = self.panel.size().bounds()?;
        let Some(area) = area.intersection(screen) else {
            return Ok(());
        };
        let rows = i32::from(self.rows_per_band(area.width()));
        let mut y1 = i32::from(area.y1);
        while y1 <= i32::from(area.y2) {
            let y2 = (y1 + rows - 1).min(i32::from(area.y2));
            let band = Rect16::new(area.x1, y1 as i16, area.x2, y2 as i16);
            let mut buffer = self.acquire()?;
            let len = usize::from(band.width()) * usize::from(band.height()) * BYTES_PER_PIXEL;
            let painted = buffer
                .prepare(len)
                .and_then(|bytes| Canvas::new(band, bytes))
                .map(|mut canvas| paint(&mut canvas));
            if let Err(e) = painted {
                self.free.push(buffer);
                return Err(e);
            }
            self.in_flight += 1;
            self.stats.bands = self.stats.bands.saturating_add(1);
            self.panel.flush(band.to_panel_area(), buffer, &self.done)?;
            y1 = y2 + 1;
        }
        self.stats.frames = self.stats.frames.saturating_add(1);
        Ok(())
    }

    /// Block until every buffer is back from the transport.
    pub fn wait_idle(&mut self) -> WarholResult<()> {
        while self.in_flight > 0 {
            let buffer = self.wait_completion()?;
            self.free.push(buffer);
        }
        Ok(())
    }

    fn acquire(&mut self) -> WarholResult<TransferBuffer> {
        while let Ok(buffer) = self.done_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.free.push(buffer);
        }
        if let Some(buffer) = self.free.pop() {
            return Ok(buffer);
        }
        self.stats.waits = self.stats.waits.saturating_add(1);
        self.wait_completion()
    }

    fn wait_completion(&mut self) -> WarholResult<TransferBuffer> {
        match self.done_rx.recv_timeout(COMPLETION_TIMEOUT) {
            Ok(buffer) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Ok(buffer)
            }
            Err(RecvTimeoutError::Timeout) => Err(WarholError::panel(format!(
                "no transfer completion within {COMPLETION_TIMEOUT:?}"
            ))),
            Err(RecvTimeoutError::Disconnected) => {
                Err(WarholError::panel("transfer completion channel closed"))
            }
        }
    }

    /// Transfers currently owned by the transport.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// The panel.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// The panel, mutably.
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}

#[cfg(test)]
#[path = "../../tests/unit/panel/flush.rs"]
mod tests;
