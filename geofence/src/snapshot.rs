//! Immutable, latitude-sorted region sets.
//!
//! A [`Snapshot`] is never modified after [`Snapshot::new`] returns. Reloading
//! builds a fresh snapshot and swaps it into the [`RegionStore`], so a scan
//! that already holds a snapshot needs no further synchronization.
//!
//! [`RegionStore`]: crate::store::RegionStore

use crate::bounding_box::BoundingBox;
use crate::geometry::distance_meters;
use crate::region::Region;

/// Half-size in decimal degrees of the box used to prefilter candidates
/// (roughly 10 km at the equator, 20 km in latitude).
pub const SEARCH_RANGE_DEGREES: f64 = 0.2;

/// What a scan found, and how much exact geometry it had to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScanOutcome {
    /// Index into [`Snapshot::regions`] of the first matching region.
    pub matched: Option<usize>,
    /// Distance in meters from the query point to the matched region's center.
    pub distance: Option<f64>,
    /// Number of regions that passed the prefilter and were distance-tested.
    pub distance_evaluations: usize,
    /// Number of regions visited before the scan stopped.
    pub visited: usize,
}

/// Regions sorted ascending by latitude, plus the source mode they came from.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    regions: Vec<Region>,
    racing_mode: bool,
}

impl Snapshot {
    /// Sorts `regions` by latitude and freezes them.
    pub fn new(mut regions: Vec<Region>, racing_mode: bool) -> Self {
        regions.sort_by(|a, b| a.lat().total_cmp(&b.lat()));
        Snapshot {
            regions,
            racing_mode,
        }
    }

    /// An empty snapshot in normal mode.
    pub fn empty() -> Self {
        Snapshot::default()
    }

    /// The regions in ascending latitude order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Whether this snapshot was built from the racing source.
    pub fn racing_mode(&self) -> bool {
        self.racing_mode
    }

    /// Finds the first region containing `(lat, lng)`.
    ///
    /// Regions are visited in ascending latitude. A region is only
    /// distance-tested when the point lies inside the box of
    /// [`SEARCH_RANGE_DEGREES`] around its center, and the scan stops as soon
    /// as a region's box starts north of the point. The first region whose
    /// radius exceeds the distance wins, even if a later one is closer.
    pub fn scan(&self, lat: f64, lng: f64) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for (index, region) in self.regions.iter().enumerate() {
            // sorted by latitude: everything after this is further north
            if region.lat() - SEARCH_RANGE_DEGREES > lat {
                break;
            }
            outcome.visited += 1;

            let window = BoundingBox::around(region.lat(), region.lng(), SEARCH_RANGE_DEGREES);
            if !window.contains_point(lat, lng) {
                continue;
            }

            outcome.distance_evaluations += 1;
            let distance = distance_meters(lng, lat, region.lng(), region.lat());
            if distance < f64::from(region.radius_meters()) {
                outcome.matched = Some(index);
                outcome.distance = Some(distance);
                break;
            }
        }

        outcome
    }

    /// Returns the first region containing `(lat, lng)`, if any.
    ///
    /// When `log_distance` is set a matching query logs the distance, radius
    /// and region name. The flag never changes the result.
    pub fn find(&self, lat: f64, lng: f64, log_distance: bool) -> Option<&Region> {
        let outcome = self.scan(lat, lng);
        let index = outcome.matched?;
        let region = &self.regions[index];
        if log_distance {
            log::info!(
                "Distance: {} - Radius: {} - {}",
                outcome.distance.unwrap_or_default(),
                region.radius_meters(),
                region.name()
            );
        }
        Some(region)
    }
}
