//! # Geofence - Named Region Matching
//!
//! This crate answers "is this position inside one of my named places?" for
//! a small list of circular regions (home, work, known chargers) kept in CSV
//! files, and reloads that list while queries keep running.
//!
//! ## Features
//!
//! - **Latitude-Sorted Scan**: regions are sorted once; a query stops as soon
//!   as the remaining regions are too far north to match
//! - **Two-Phase Test**: a cheap 0.2 degree box prefilter, then an exact
//!   Haversine distance against the region radius
//! - **First Match Wins**: overlapping regions resolve to the first one in
//!   latitude order
//! - **Hot Reload**: snapshots are immutable and swapped atomically; change
//!   signals are debounced and ignored while a reload runs
//! - **Racing Mode**: an alternate region file can replace the normal set
//! - **Forgiving Input**: malformed lines are skipped and logged
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geofence::Geofence;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let geofence = Geofence::builder("/var/lib/tracker").open()?;
//!
//! match geofence.find(48.137, 11.575) {
//!     Some(region) => println!("at {}", region.name()),
//!     None => println!("not at a known place"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Store API
//!
//! ```rust
//! use geofence::{Region, RegionStore, Snapshot};
//!
//! let store = RegionStore::new();
//! store.install(Snapshot::new(vec![Region::new("Home", 48.0, 11.0, 100)], false));
//! assert_eq!(store.find(48.0, 11.0, false).unwrap().name(), "Home");
//! ```

pub mod bounding_box;
pub mod config;
pub mod errors;
pub mod geofence;
pub mod geofence_builder;
pub mod geometry;
pub mod parser;
pub mod region;
pub mod reload;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod watcher;

pub use bounding_box::BoundingBox;
pub use config::GeofenceConfig;
pub use errors::{GeofenceError, GeofenceResult};
pub use geofence::Geofence;
pub use geofence_builder::GeofenceBuilder;
pub use geometry::distance_meters;
pub use parser::{ParsedSource, RecordOutcome};
pub use region::{Region, DEFAULT_RADIUS_METERS};
pub use reload::{ListenerHandle, ReloadCoordinator, SourceChanged};
pub use snapshot::{ScanOutcome, Snapshot, SEARCH_RANGE_DEGREES};
pub use source::{FileRegionSource, LoadedRegions, RegionSource};
pub use store::RegionStore;
pub use watcher::PollingWatcher;
