use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Allocator that fails on the `fail_at`-th call (1-based) and counts live buffers.
struct FlakyHeap {
    calls: usize,
    fail_at: Option<usize>,
    live: Arc<AtomicUsize>,
}

impl BulkAllocator for FlakyHeap {
    fn alloc(&mut self, len: usize) -> WarholResult<Vec<u8>> {
        self.calls += 1;
        if Some(self.calls) == self.fail_at {
            return Err(WarholError::allocation("injected"));
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0; len])
    }

    fn free(&mut self, _buf: Vec<u8>) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn flaky(fail_at: Option<usize>) -> (FramePool, Arc<AtomicUsize>) {
    let live = Arc::new(AtomicUsize::new(0));
    let heap = FlakyHeap {
        calls: 0,
        fail_at,
        live: live.clone(),
    };
    (FramePool::new(Size16::new(8, 4), Box::new(heap)), live)
}

#[test]
fn allocates_every_requested_frame() {
    let (mut pool, live) = flaky(None);
    pool.allocate(FrameLayout::Background.ids()).unwrap();
    assert_eq!(live.load(Ordering::SeqCst), 3);
    for id in [BufferId::Pristine, BufferId::BaseA, BufferId::BaseB] {
        assert!(pool.holds(id));
        assert_eq!(pool.get(id).unwrap().bitmap().as_bytes().len(), 64);
    }
    pool.deallocate();
    assert_eq!(live.load(Ordering::SeqCst), 0);
    assert_eq!(pool.stats().freed_frames, 3);
}

#[test]
fn failure_at_any_position_frees_everything() {
    for layout in [FrameLayout::Synchronous, FrameLayout::Background] {
        for k in 1..=layout.ids().len() {
            let (mut pool, live) = flaky(Some(k));
            assert!(pool.allocate(layout.ids()).is_err(), "{layout:?} k={k}");
            assert_eq!(live.load(Ordering::SeqCst), 0, "{layout:?} k={k}");
            assert_eq!(pool.stats().held_frames, 0);
            assert_eq!(pool.stats().failed_sets, 1);
            for id in layout.ids() {
                assert!(!pool.holds(*id));
            }
        }
    }
}

#[test]
fn retry_after_failure_succeeds() {
    let (mut pool, live) = flaky(Some(2));
    assert!(pool.allocate(FrameLayout::Synchronous.ids()).is_err());
    pool.allocate(FrameLayout::Synchronous.ids()).unwrap();
    assert_eq!(live.load(Ordering::SeqCst), 2);
}

#[test]
fn reallocate_frees_the_previous_set_first() {
    let (mut pool, live) = flaky(None);
    pool.allocate(FrameLayout::Background.ids()).unwrap();
    pool.allocate(FrameLayout::Synchronous.ids()).unwrap();
    assert_eq!(live.load(Ordering::SeqCst), 2);
    assert!(!pool.holds(BufferId::BaseB));
}

#[test]
fn take_and_restore_round_trip() {
    let (mut pool, live) = flaky(None);
    pool.allocate(FrameLayout::Synchronous.ids()).unwrap();
    let frame = pool.take(BufferId::BaseA).unwrap();
    assert_eq!(frame.id(), BufferId::BaseA);
    assert!(pool.take(BufferId::BaseA).is_none());
    assert_eq!(pool.stats().held_frames, 1);

    pool.restore(frame);
    assert!(pool.holds(BufferId::BaseA));
    drop(pool);
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[test]
fn bulk_heap_enforces_capacity_and_tracks_usage() {
    let mut heap = BulkHeap::new(100);
    let a = heap.alloc(60).unwrap();
    assert!(heap.alloc(60).unwrap_err().is_retryable());
    assert_eq!(heap.in_use(), 60);
    heap.free(a);
    assert_eq!(heap.in_use(), 0);
    assert_eq!(heap.alloc(100).unwrap().len(), 100);
}

#[test]
fn default_heap_budget_fits_the_background_set() {
    let three = Bitmap::byte_len(Size16::new(320, 240)) * 3;
    let mut pool = FramePool::new(Size16::new(320, 240), Box::new(BulkHeap::new(4 << 20)));
    pool.allocate(FrameLayout::Background.ids()).unwrap();
    assert_eq!(pool.stats().live_frames, 3);
    assert!(three < 4 << 20);

    let mut tight = FramePool::new(Size16::new(320, 240), Box::new(BulkHeap::new(three - 1)));
    assert!(tight.allocate(FrameLayout::Background.ids()).is_err());
    assert_eq!(tight.stats().live_frames, 0);
}

#[test]
fn buffer_ids_round_trip_through_u8() {
    for id in [BufferId::Pristine, BufferId::BaseA, BufferId::BaseB] {
        assert_eq!(BufferId::from_u8(id.as_u8()), Some(id));
    }
    assert_eq!(BufferId::from_u8(7), None);
    assert_eq!(
        FrameLayout::from(RefreshVariant::Synchronous).ids().len(),
        2
    );
}

#[test]
fn freeing_a_mismatched_frame_logs_instead_of_panicking() {
    let (mut pool, _live) = flaky(None);
    let stray = Frame::new(BufferId::BaseA, Bitmap::new(Size16::new(3, 3)).unwrap());
    pool.restore(stray);
    pool.deallocate();
    assert_eq!(pool.stats().freed_frames, 1);
    assert!(!pool.holds(BufferId::BaseA));
}
