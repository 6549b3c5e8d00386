use std::sync::Arc;

use parking_lot::RwLock;

use crate::region::Region;
use crate::snapshot::{ScanOutcome, Snapshot};

/// Holds the active [`Snapshot`] and answers point queries against it.
///
/// The only shared mutable state is which snapshot is active. Readers take the
/// lock just long enough to clone the `Arc`, then scan without holding it, so
/// a reload never waits for a long scan and a scan never sees a half-built
/// region set.
///
/// # Examples
///
/// ```rust
/// use geofence::{Region, RegionStore};
///
/// let store = RegionStore::from_regions(vec![Region::new("Home", 48.0, 11.0, 100)], false);
/// assert_eq!(store.find(48.0, 11.0, false).map(|r| r.name().to_string()), Some("Home".into()));
/// assert!(store.find(52.5, 13.4, false).is_none());
/// ```
#[derive(Debug)]
pub struct RegionStore {
    active: RwLock<Arc<Snapshot>>,
}

impl Default for RegionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionStore {
    /// Creates a store with an empty snapshot.
    pub fn new() -> Self {
        RegionStore {
            active: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Creates a store whose initial snapshot is built from `regions`.
    pub fn from_regions(regions: Vec<Region>, racing_mode: bool) -> Self {
        RegionStore {
            active: RwLock::new(Arc::new(Snapshot::new(regions, racing_mode))),
        }
    }

    /// Returns the active snapshot.
    ///
    /// The returned snapshot stays valid and unchanged even if a reload
    /// replaces it afterwards.
    #[inline]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.active.read().clone()
    }

    /// Makes `snapshot` the active one and returns the snapshot it replaced.
    pub fn install(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let replacement = Arc::new(snapshot);
        let previous = std::mem::replace(&mut *self.active.write(), replacement);
        log::debug!(
            "Installed region snapshot: {} regions (previously {})",
            self.len(),
            previous.len()
        );
        previous
    }

    /// Returns the first region containing `(lat, lng)` in the active snapshot.
    ///
    /// `log_distance` only controls diagnostic output.
    pub fn find(&self, lat: f64, lng: f64, log_distance: bool) -> Option<Region> {
        self.snapshot().find(lat, lng, log_distance).cloned()
    }

    /// Runs the raw scan against the active snapshot.
    pub fn scan(&self, lat: f64, lng: f64) -> ScanOutcome {
        self.snapshot().scan(lat, lng)
    }

    pub fn len(&self) -> usize {
        self.active.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.read().is_empty()
    }

    /// Whether the active snapshot came from the racing source.
    pub fn racing_mode(&self) -> bool {
        self.active.read().racing_mode()
    }
}
