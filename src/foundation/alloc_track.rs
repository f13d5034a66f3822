//! Heap allocation accounting for the steady-state frame loop.
//!
//! With the `alloc-track` feature the crate installs an instrumented global allocator so tests
//! can assert that presenting a frame performs no heap allocation once the pipeline is warm.
//! Without the feature every region reports zero.

#[cfg(feature = "alloc-track")]
mod imp {
    use stats_alloc::{INSTRUMENTED_SYSTEM, Region, StatsAlloc};
    use std::alloc::System;

    #[global_allocator]
    static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

    /// Allocation counters observed over a region.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AllocStats {
        /// Number of allocations.
        pub allocations: usize,
        /// Number of deallocations.
        pub deallocations: usize,
        /// Number of reallocations.
        pub reallocations: usize,
        /// Bytes allocated.
        pub bytes_allocated: usize,
    }

    impl From<stats_alloc::Stats> for AllocStats {
        fn from(s: stats_alloc::Stats) -> Self {
            Self {
                allocations: s.allocations,
                deallocations: s.deallocations,
                reallocations: s.reallocations,
                bytes_allocated: s.bytes_allocated,
            }
        }
    }

    /// Snapshot of the global allocator counters taken at construction.
    pub struct AllocRegion {
        region: Region<'static, System>,
    }

    impl AllocRegion {
        /// Start measuring.
        pub fn new() -> Self {
            Self {
                region: Region::new(GLOBAL),
            }
        }

        /// Counters accumulated since [`AllocRegion::new`].
        pub fn change(&self) -> AllocStats {
            self.region.change().into()
        }
    }
}

#[cfg(not(feature = "alloc-track"))]
mod imp {
    /// Allocation counters observed over a region.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AllocStats {
        /// Number of allocations.
        pub allocations: usize,
        /// Number of deallocations.
        pub deallocations: usize,
        /// Number of reallocations.
        pub reallocations: usize,
        /// Bytes allocated.
        pub bytes_allocated: usize,
    }

    /// No-op region used when allocation tracking is disabled.
    pub struct AllocRegion;

    impl AllocRegion {
        /// Start measuring.
        pub fn new() -> Self {
            Self
        }

        /// Always zero without the `alloc-track` feature.
        pub fn change(&self) -> AllocStats {
            AllocStats::default()
        }
    }
}

pub use imp::{AllocRegion, AllocStats};
