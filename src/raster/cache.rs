//! Write-once label grid cache, one slot per body side.
//!
//! Rasterizing a side touches every pixel of the canvas, so it is done at
//! most once per side for the lifetime of the cache. Concurrent first
//! accesses block on the same initialization instead of racing to build
//! duplicate grids; every later access is a plain shared read.
//!
//! # Example
//! ```ignore
//! let cache = LabelGridCache::new(GridDims::default());
//! let grid = cache.get_or_build(BodySide::Front, catalog.regions(BodySide::Front));
//! let stats = cache.stats();
//! println!("grids: {}, hits: {}", stats.entries, stats.hits);
//! ```

use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{GridDims, LabelGrid, rasterize};
use crate::catalog::{BodySide, RegionDef};

/// Per-side memo of rasterized catalogs.
#[derive(Debug)]
pub struct LabelGridCache {
    dims: GridDims,
    grids: [OnceLock<LabelGrid>; 2],
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Cache statistics for diagnostics and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelGridCacheStats {
    /// Number of sides with a built grid.
    pub entries: usize,
    /// Lookups served from an existing grid.
    pub hits: usize,
    /// Lookups that rasterized a grid.
    pub misses: usize,
    /// Estimated memory held by built grids in bytes.
    pub estimated_memory_bytes: usize,
}

impl LabelGridCacheStats {
    /// Returns the cache hit rate as a value between 0.0 and 1.0.
    /// Returns 0.0 if no lookups have been made.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl LabelGridCache {
    #[must_use]
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            grids: [OnceLock::new(), OnceLock::new()],
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn dims(&self) -> GridDims {
        self.dims
    }

    /// Returns the grid for `side`, rasterizing `regions` on first use.
    ///
    /// `regions` must be the same table on every call for a given side; the
    /// cache never rebuilds a slot once it is filled.
    pub fn get_or_build(&self, side: BodySide, regions: &[RegionDef]) -> &LabelGrid {
        let slot = &self.grids[side.index()];
        if let Some(grid) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return grid;
        }

        let mut built = false;
        let grid = slot.get_or_init(|| {
            built = true;
            log::debug!("building {side} label grid from {} regions", regions.len());
            rasterize(regions, self.dims)
        });

        // Another thread may have won the initialization while we waited.
        let counter = if built { &self.misses } else { &self.hits };
        counter.fetch_add(1, Ordering::Relaxed);
        grid
    }

    /// Checks if a side's grid exists without building it.
    #[must_use]
    pub fn is_built(&self, side: BodySide) -> bool {
        self.grids[side.index()].get().is_some()
    }

    #[must_use]
    pub fn stats(&self) -> LabelGridCacheStats {
        let built = || self.grids.iter().filter_map(OnceLock::get);
        LabelGridCacheStats {
            entries: built().count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            estimated_memory_bytes: built().map(LabelGrid::memory_bytes).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RegionCatalog;
    use std::sync::Arc;

    const SMALL: GridDims = GridDims::new(40, 60);

    #[test]
    fn second_lookup_is_a_hit() {
        let catalog = RegionCatalog::builtin();
        let cache = LabelGridCache::new(SMALL);
        assert!(!cache.is_built(BodySide::Back));

        let first = cache.get_or_build(BodySide::Back, catalog.regions(BodySide::Back)) as *const _;
        let second = cache.get_or_build(BodySide::Back, catalog.regions(BodySide::Back)) as *const _;
        assert_eq!(first, second);
        assert!(cache.is_built(BodySide::Back));
        assert!(!cache.is_built(BodySide::Front));

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sides_are_cached_independently() {
        let catalog = RegionCatalog::builtin();
        let cache = LabelGridCache::new(SMALL);
        let front = cache.get_or_build(BodySide::Front, catalog.regions(BodySide::Front));
        let back = cache.get_or_build(BodySide::Back, catalog.regions(BodySide::Back));
        assert_ne!(front, back);

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.estimated_memory_bytes, 2 * SMALL.cell_count() * 2);
    }

    #[test]
    fn concurrent_first_access_builds_once() {
        let catalog = RegionCatalog::builtin();
        let cache = Arc::new(LabelGridCache::new(SMALL));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let grid = cache.get_or_build(BodySide::Front, catalog.regions(BodySide::Front));
                    grid.count_label(209)
                })
            })
            .collect();

        let counts: Vec<usize> = handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect();
        assert!(counts.windows(2).all(|pair| pair[0] == pair[1]));

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 7);
    }

    #[test]
    fn empty_cache_reports_zero_hit_rate() {
        let cache = LabelGridCache::new(SMALL);
        let stats = cache.stats();
        assert_eq!(stats, LabelGridCacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }
}
