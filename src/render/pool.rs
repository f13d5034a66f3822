use crate::foundation::config::RefreshVariant;
use crate::foundation::core::Size16;
use crate::foundation::error::{WarholError, WarholResult};
use crate::render::surface::Bitmap;

/// Identity of a full-frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BufferId {
    /// Decoded background image, never drawn over after decode.
    Pristine = 0,
    /// First composed base.
    BaseA = 1,
    /// Second composed base, background refresh only.
    BaseB = 2,
}

impl BufferId {
    /// Compact encoding for atomics.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`BufferId::as_u8`].
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Pristine),
            1 => Some(Self::BaseA),
            2 => Some(Self::BaseB),
            _ => None,
        }
    }

    /// Short name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pristine => "pristine",
            Self::BaseA => "base-a",
            Self::BaseB => "base-b",
        }
    }
}

/// A pool-owned full-frame buffer tagged with its identity.
///
/// Moving a `Frame` moves exclusive access to its pixels; there is no other handle to them.
#[derive(Debug)]
pub struct Frame {
    id: BufferId,
    bitmap: Bitmap,
}

impl Frame {
    pub(crate) fn new(id: BufferId, bitmap: Bitmap) -> Self {
        Self { id, bitmap }
    }

    /// Which buffer this is.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Pixels.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Mutable pixels.
    pub fn bitmap_mut(&mut self) -> &mut Bitmap {
        &mut self.bitmap
    }

    pub(crate) fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }
}

/// Buffer sets, one per refresh variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameLayout {
    /// Pristine plus one base.
    Synchronous,
    /// Pristine plus two bases.
    Background,
}

impl FrameLayout {
    /// Buffers to allocate, in allocation order.
    pub fn ids(self) -> &'static [BufferId] {
        match self {
            Self::Synchronous => &[BufferId::Pristine, BufferId::BaseA],
            Self::Background => &[BufferId::Pristine, BufferId::BaseA, BufferId::BaseB],
        }
    }
}

impl From<RefreshVariant> for FrameLayout {
    fn from(v: RefreshVariant) -> Self {
        match v {
            RefreshVariant::Synchronous => Self::Synchronous,
            RefreshVariant::Background => Self::Background,
        }
    }
}

/// Source of large zeroed buffers (external RAM on hardware).
pub trait BulkAllocator: Send {
    /// Return a zeroed buffer of exactly `len` bytes.
    fn alloc(&mut self, len: usize) -> WarholResult<Vec<u8>>;
    /// Give a buffer obtained from [`BulkAllocator::alloc`] back.
    fn free(&mut self, buf: Vec<u8>);
}

/// Heap-backed bulk allocator with a fixed byte budget.
#[derive(Debug)]
pub struct BulkHeap {
    capacity: usize,
    in_use: usize,
}

impl BulkHeap {
    /// Allocator that hands out at most `capacity` bytes at once.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: 0,
        }
    }

    /// Bytes currently handed out.
    pub fn in_use(&self) -> usize {
        self.in_use
    }
}

impl BulkAllocator for BulkHeap {
    fn alloc(&mut self, len: usize) -> WarholResult<Vec<u8>> {
        if self.in_use.saturating_add(len) > self.capacity {
            return Err(WarholError::allocation(format!(
                "bulk pool exhausted: {len} bytes requested, {} of {} in use",
                self.in_use, self.capacity
            )));
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|e| WarholError::allocation(format!("bulk buffer of {len} bytes: {e}")))?;
        buf.resize(len, 0);
        self.in_use += len;
        Ok(buf)
    }

    fn free(&mut self, buf: Vec<u8>) {
        self.in_use = self.in_use.saturating_sub(buf.len());
    }
}

/// Lifetime counters for a [`FramePool`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FramePoolStats {
    /// Frames currently parked in the pool.
    pub held_frames: usize,
    /// Frames handed out by the allocator and not yet freed.
    pub live_frames: usize,
    /// Successful frame allocations.
    pub alloc_frames: u64,
    /// Frames given back to the allocator.
    pub freed_frames: u64,
    /// `allocate` calls that failed and rolled back.
    pub failed_sets: u64,
}

/// All-or-nothing owner of the full-frame buffers.
///
/// Frames are lent out with [`FramePool::take`] and must come back through
/// [`FramePool::restore`] before [`FramePool::deallocate`] can free them.
pub struct FramePool {
    size: Size16,
    alloc: Box<dyn BulkAllocator>,
    held: Vec<Frame>,
    stats: FramePoolStats,
}

impl std::fmt::Debug for FramePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePool")
            .field("size", &self.size)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl FramePool {
    /// Pool of `size` frames backed by `alloc`.
    pub fn new(size: Size16, alloc: Box<dyn BulkAllocator>) -> Self {
        Self {
            size,
            alloc,
            held: Vec::with_capacity(FrameLayout::Background.ids().len()),
            stats: FramePoolStats::default(),
        }
    }

    /// Frame dimensions.
    pub fn size(&self) -> Size16 {
        self.size
    }

    /// Bytes per frame.
    pub fn frame_bytes(&self) -> usize {
        Bitmap::byte_len(self.size)
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> FramePoolStats {
        self.stats.clone()
    }

    /// Allocate one frame per id. Either every frame exists afterwards or none does.
    ///
    /// Any frames still held from a previous set are freed first.
    #[tracing::instrument(level = "debug", skip(self), fields(size = ?self.size))]
    pub fn allocate(&mut self, ids: &[BufferId]) -> WarholResult<()> {
        self.deallocate();
        let len = self.frame_bytes();
        for &id in ids {
            if let Err(e) = self.allocate_one(id, len) {
                self.stats.failed_sets = self.stats.failed_sets.saturating_add(1);
                tracing::warn!(buffer = id.name(), error = %e, "frame allocation failed, rolling back");
                self.deallocate();
                return Err(e);
            }
        }
        Ok(())
    }

    fn allocate_one(&mut self, id: BufferId, len: usize) -> WarholResult<()> {
        let bytes = self.alloc.alloc(len)?;
        if bytes.len() != len {
            let got = bytes.len();
            self.alloc.free(bytes);
            return Err(WarholError::allocation(format!(
                "allocator returned {got} bytes for a {len} byte frame"
            )));
        }
        let bitmap = Bitmap::from_bytes(self.size, bytes)?;
        self.stats.alloc_frames = self.stats.alloc_frames.saturating_add(1);
        self.stats.live_frames = self.stats.live_frames.saturating_add(1);
        self.park(Frame::new(id, bitmap));
        Ok(())
    }

    /// Free every held frame. Safe to call repeatedly.
    pub fn deallocate(&mut self) {
        let len = self.frame_bytes();
        while let Some(frame) = self.held.pop() {
            let buffer = frame.id.name();
            let bytes = frame.into_bitmap().into_bytes();
            if bytes.len() != len {
                tracing::error!(
                    buffer,
                    got = bytes.len(),
                    expected = len,
                    "freeing frame of unexpected length"
                );
            }
            self.alloc.free(bytes);
            self.stats.freed_frames = self.stats.freed_frames.saturating_add(1);
            self.stats.live_frames = self.stats.live_frames.saturating_sub(1);
        }
        self.stats.held_frames = 0;
    }

    /// Lend out a held frame.
    pub fn take(&mut self, id: BufferId) -> Option<Frame> {
        let i = self.held.iter().position(|f| f.id == id)?;
        self.stats.held_frames = self.stats.held_frames.saturating_sub(1);
        Some(self.held.swap_remove(i))
    }

    /// Borrow a held frame in place.
    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut Frame> {
        self.held.iter_mut().find(|f| f.id == id)
    }

    /// Borrow a held frame.
    pub fn get(&self, id: BufferId) -> Option<&Frame> {
        self.held.iter().find(|f| f.id == id)
    }

    /// Return a lent frame.
    pub fn restore(&mut self, frame: Frame) {
        if self.holds(frame.id) {
            tracing::error!(buffer = frame.id.name(), "frame restored twice; freeing duplicate");
            self.alloc.free(frame.into_bitmap().into_bytes());
            self.stats.freed_frames = self.stats.freed_frames.saturating_add(1);
            self.stats.live_frames = self.stats.live_frames.saturating_sub(1);
            return;
        }
        self.park(frame);
    }

    /// Returns `true` when `id` is parked in the pool.
    pub fn holds(&self, id: BufferId) -> bool {
        self.held.iter().any(|f| f.id == id)
    }

    fn park(&mut self, frame: Frame) {
        self.held.push(frame);
        self.stats.held_frames = self.stats.held_frames.saturating_add(1);
    }
}

impl Drop for FramePool {
    fn drop(&mut self) {
        if self.stats.live_frames > self.held.len() {
            tracing::warn!(
                live = self.stats.live_frames,
                held = self.held.len(),
                "frame pool dropped while frames are lent out"
            );
        }
        self.deallocate();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pool.rs"]
mod tests;
