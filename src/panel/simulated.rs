use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::foundation::core::{PanelArea, Size16};
use crate::foundation::error::{WarholError, WarholResult};
use crate::panel::flush::Panel;
use crate::panel::transfer::{FlushCompletion, TRANSFER_BUFFERS, TransferBuffer};
use crate::render::surface::{BYTES_PER_PIXEL, Bitmap};

/// Simulated panel settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulatedPanelOpts {
    /// Artificial transfer time per band.
    pub latency: Duration,
}

struct Job {
    area: PanelArea,
    buffer: TransferBuffer,
    done: FlushCompletion,
}

/// In-memory panel: a worker thread plays the DMA engine and copies bands into a GRAM image.
pub struct SimulatedPanel {
    size: Size16,
    jobs: Option<SyncSender<Job>>,
    worker: Option<JoinHandle<()>>,
    gram: Arc<Mutex<Vec<u8>>>,
    transfers: Arc<AtomicU64>,
}

impl std::fmt::Debug for SimulatedPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedPanel")
            .field("size", &self.size)
            .field("transfers", &self.transfers())
            .finish_non_exhaustive()
    }
}

impl SimulatedPanel {
    /// Start a simulated panel of `size`.
    pub fn new(size: Size16, opts: SimulatedPanelOpts) -> WarholResult<Self> {
        size.bounds()?;
        let gram = Arc::new(Mutex::new(vec![0u8; Bitmap::byte_len(size)]));
        let transfers = Arc::new(AtomicU64::new(0));
        let (jobs, rx) = mpsc::sync_channel::<Job>(TRANSFER_BUFFERS);

        let worker_gram = gram.clone();
        let worker_transfers = transfers.clone();
        let stride = usize::from(size.width) * BYTES_PER_PIXEL;
        let worker = std::thread::Builder::new()
            .name("panel-dma".to_string())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    if !opts.latency.is_zero() {
                        std::thread::sleep(opts.latency);
                    }
                    match worker_gram.lock() {
                        Ok(mut gram) => blit(&mut gram, stride, job.area, job.buffer.filled()),
                        Err(_) => tracing::error!("panel memory lock poisoned"),
                    }
                    worker_transfers.fetch_add(1, Ordering::Relaxed);
                    job.done.notify(job.buffer);
                }
            })
            .map_err(|e| WarholError::task(format!("spawn panel worker: {e}")))?;

        Ok(Self {
            size,
            jobs: Some(jobs),
            worker: Some(worker),
            gram,
            transfers,
        })
    }

    /// Completed band transfers.
    pub fn transfers(&self) -> u64 {
        self.transfers.load(Ordering::Relaxed)
    }

    /// Copy of the panel memory.
    pub fn snapshot(&self) -> WarholResult<Bitmap> {
        let gram = self
            .gram
            .lock()
            .map_err(|_| WarholError::panel("panel memory lock poisoned"))?;
        Bitmap::from_bytes(self.size, gram.clone())
    }
}

fn blit(gram: &mut [u8], stride: usize, area: PanelArea, src: &[u8]) {
    let row = area.width() * BYTES_PER_PIXEL;
    let x = area.x1 as usize * BYTES_PER_PIXEL;
    for (i, line) in src.chunks_exact(row).enumerate() {
        let start = (area.y1 as usize + i) * stride + x;
        gram[start..start + row].copy_from_slice(line);
    }
}

impl Panel for SimulatedPanel {
    fn size(&self) -> Size16 {
        self.size
    }

    fn flush(
        &mut self,
        area: PanelArea,
        buffer: TransferBuffer,
        done: &FlushCompletion,
    ) -> WarholResult<()> {
        if !area.fits(self.size) || buffer.filled().len() != area.byte_len() {
            let msg = format!(
                "rejected transfer of {} bytes to {area:?}",
                buffer.filled().len()
            );
            done.notify(buffer);
            return Err(WarholError::panel(msg));
        }
        let Some(jobs) = &self.jobs else {
            done.notify(buffer);
            return Err(WarholError::panel("panel worker stopped"));
        };
        let job = Job {
            area,
            buffer,
            done: done.clone(),
        };
        if let Err(mpsc::SendError(job)) = jobs.send(job) {
            job.done.notify(job.buffer);
            return Err(WarholError::panel("panel worker stopped"));
        }
        Ok(())
    }
}

impl Drop for SimulatedPanel {
    fn drop(&mut self) {
        self.jobs = None;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("panel worker panicked");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/panel/simulated.rs"]
mod tests;
