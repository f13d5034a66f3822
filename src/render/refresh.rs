//! Background recomposition of the base image.
//!
//! The task owns at most one spare [`Frame`] at a time. It rebuilds the spare from the pristine
//! image plus the current background overlay, hands it to the foreground over a one-slot
//! channel, and waits for the foreground to send back the base it replaced. Because frames move
//! by value, the task can never touch the base that is currently on screen.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::assets::color::Rgba32;
use crate::foundation::error::{WarholError, WarholResult};
use crate::render::pool::{BufferId, Frame};
use crate::render::surface::Bitmap;

const NO_BUFFER: u8 = u8::MAX;

/// Rebuild `target` as `pristine` with `overlay` composited over every pixel.
pub fn recompose(pristine: &Bitmap, target: &mut Bitmap, overlay: Rgba32) -> WarholResult<()> {
    target.copy_from(pristine)?;
    let all = target.bounds();
    target.canvas().fill_blend(all, overlay);
    Ok(())
}

/// What the refresh task was doing when it reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPhase {
    /// About to write `buffer`.
    WriteStart,
    /// Finished writing `buffer`.
    WriteEnd,
    /// `buffer` was handed to the foreground.
    Handoff,
    /// The task loop exited.
    Stopped,
}

/// One observation from the refresh task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshEvent {
    /// Phase reached.
    pub phase: RefreshPhase,
    /// Buffer involved, if any.
    pub buffer: Option<BufferId>,
    /// Buffer the foreground was displaying at that moment.
    pub published: Option<BufferId>,
}

/// Hook for watching the refresh task from tests or diagnostics.
pub trait RefreshObserver: Send + Sync {
    /// Called on the refresh thread.
    fn on_event(&self, event: RefreshEvent);
}

/// Knobs for [`BackgroundRefresh::spawn`].
#[derive(Clone, Default)]
pub struct RefreshOpts {
    /// Pause between loop iterations.
    pub delay: Duration,
    /// Optional event sink.
    pub observer: Option<Arc<dyn RefreshObserver>>,
}

impl std::fmt::Debug for RefreshOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshOpts")
            .field("delay", &self.delay)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Returned by [`BackgroundRefresh::spawn`] when the thread could not start.
#[derive(Debug)]
pub struct SpawnFailure {
    /// Why.
    pub error: WarholError,
    /// The spare frame, handed back untouched.
    pub spare: Frame,
}

struct Shared {
    overlay: AtomicU32,
    published: AtomicU8,
    stop: AtomicBool,
}

impl Shared {
    fn published(&self) -> Option<BufferId> {
        BufferId::from_u8(self.published.load(Ordering::Acquire))
    }
}

/// Foreground handle to the refresh task.
pub struct BackgroundRefresh {
    shared: Arc<Shared>,
    ready_rx: Receiver<Frame>,
    retire_tx: Option<SyncSender<Frame>>,
    handle: Option<JoinHandle<Vec<Frame>>>,
    adopted: u64,
}

impl std::fmt::Debug for BackgroundRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundRefresh")
            .field("published", &self.shared.published())
            .field("adopted", &self.adopted)
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl BackgroundRefresh {
    /// Start the task with `spare` as its first write target.
    ///
    /// `published` is the base the foreground is displaying; `overlay` is the initial
    /// background color.
    pub fn spawn(
        pristine: Arc<Bitmap>,
        spare: Frame,
        published: BufferId,
        overlay: Rgba32,
        opts: RefreshOpts,
    ) -> Result<Self, SpawnFailure> {
        let shared = Arc::new(Shared {
            overlay: AtomicU32::new(overlay.to_packed()),
            published: AtomicU8::new(published.as_u8()),
            stop: AtomicBool::new(false),
        });
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Frame>(1);
        let (retire_tx, retire_rx) = mpsc::sync_channel::<Frame>(1);

        let task_shared = shared.clone();
        let spawned = std::thread::Builder::new()
            .name("bg-refresh".to_string())
            .spawn(move || run(task_shared, pristine, ready_tx, retire_rx, opts));
        let handle = match spawned {
            Ok(h) => h,
            Err(e) => {
                return Err(SpawnFailure {
                    error: WarholError::task(format!("spawn refresh thread: {e}")),
                    spare,
                });
            }
        };

        // The spare travels the same path as every later retired base.
        if let Err(e) = retire_tx.send(spare) {
            shared.stop.store(true, Ordering::Release);
            let _ = handle.join();
            return Err(SpawnFailure {
                error: WarholError::task("refresh thread exited before start"),
                spare: e.0,
            });
        }

        tracing::debug!(published = published.name(), "background refresh started");
        Ok(Self {
            shared,
            ready_rx,
            retire_tx: Some(retire_tx),
            handle: Some(handle),
            adopted: 0,
        })
    }

    /// Publish the background color the next recomposition should use.
    pub fn set_overlay(&self, overlay: Rgba32) {
        self.shared
            .overlay
            .store(overlay.to_packed(), Ordering::Release);
    }

    /// Non-blocking check for a freshly composed base.
    pub fn poll(&mut self) -> Option<Frame> {
        match self.ready_rx.try_recv() {
            Ok(frame) => {
                self.adopted = self.adopted.saturating_add(1);
                Some(frame)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Record which base is now on screen.
    pub fn mark_published(&self, id: BufferId) {
        self.shared.published.store(id.as_u8(), Ordering::Release);
    }

    /// Base currently on screen, as last recorded.
    pub fn published(&self) -> Option<BufferId> {
        self.shared.published()
    }

    /// Hand a replaced base back as the next write target.
    ///
    /// Returns the frame when the task cannot take it.
    pub fn retire(&self, frame: Frame) -> Result<(), Frame> {
        let Some(tx) = &self.retire_tx else {
            return Err(frame);
        };
        match tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(f) | TrySendError::Disconnected(f)) => Err(f),
        }
    }

    /// Number of bases adopted so far.
    pub fn adopted(&self) -> u64 {
        self.adopted
    }

    /// Stop the task and wait for it. Returns every frame it still owned.
    ///
    /// Nothing is freed here; the caller returns the frames to their pool once this returns,
    /// which is strictly after the task has exited.
    pub fn stop(mut self) -> Vec<Frame> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        let Some(handle) = self.handle.take() else {
            return frames;
        };
        self.shared.stop.store(true, Ordering::Release);
        // Wakes a task blocked on the retire channel.
        self.retire_tx = None;
        match handle.join() {
            Ok(owned) => frames.extend(owned),
            Err(_) => tracing::error!("refresh thread panicked; its spare frame is lost"),
        }
        frames.extend(self.ready_rx.try_iter());
        self.mark_unpublished();
        tracing::debug!(returned = frames.len(), adopted = self.adopted, "background refresh stopped");
        frames
    }

    fn mark_unpublished(&self) {
        self.shared.published.store(NO_BUFFER, Ordering::Release);
    }
}

impl Drop for BackgroundRefresh {
    fn drop(&mut self) {
        let leaked = self.shutdown();
        if !leaked.is_empty() {
            tracing::warn!(frames = leaked.len(), "refresh dropped without stop; frames released to heap");
        }
    }
}

fn run(
    shared: Arc<Shared>,
    pristine: Arc<Bitmap>,
    ready_tx: SyncSender<Frame>,
    retire_rx: Receiver<Frame>,
    opts: RefreshOpts,
) -> Vec<Frame> {
    let emit = |phase: RefreshPhase, buffer: Option<BufferId>| {
        if let Some(obs) = &opts.observer {
            obs.on_event(RefreshEvent {
                phase,
                buffer,
                published: shared.published(),
            });
        }
    };
    let wait = opts.delay.max(Duration::from_millis(1));
    let mut spare: Option<Frame> = None;

    while !shared.stop.load(Ordering::Acquire) {
        let Some(mut frame) = spare.take() else {
            match retire_rx.recv_timeout(wait) {
                Ok(f) => spare = Some(f),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            continue;
        };

        let id = frame.id();
        emit(RefreshPhase::WriteStart, Some(id));
        let overlay = Rgba32::from_packed(shared.overlay.load(Ordering::Acquire));
        if let Err(e) = recompose(&pristine, frame.bitmap_mut(), overlay) {
            tracing::warn!(buffer = id.name(), error = %e, "recompose failed");
        }
        emit(RefreshPhase::WriteEnd, Some(id));

        match ready_tx.try_send(frame) {
            Ok(()) => emit(RefreshPhase::Handoff, Some(id)),
            Err(TrySendError::Full(f)) => spare = Some(f),
            Err(TrySendError::Disconnected(f)) => {
                spare = Some(f);
                break;
            }
        }

        if !opts.delay.is_zero() {
            std::thread::sleep(opts.delay);
        } else {
            std::thread::yield_now();
        }
    }

    emit(RefreshPhase::Stopped, None);
    // A base retired after the last receive is still queued; it goes back with the spare.
    spare.into_iter().chain(retire_rx.try_iter()).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/refresh.rs"]
mod tests;
