use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;

use crate::config::GeofenceConfig;
use crate::errors::{GeofenceError, GeofenceResult};
use crate::geofence_builder::GeofenceBuilder;
use crate::region::Region;
use crate::reload::{ListenerHandle, ReloadCoordinator, SourceChanged};
use crate::source::{FileRegionSource, RegionSource};
use crate::store::RegionStore;
use crate::watcher::PollingWatcher;

/// Extension of the files the watcher reacts to.
const WATCHED_EXTENSION: &str = "csv";

/// The entry point: answers "which known region is this position in?" and
/// keeps its regions current as the backing files change.
///
/// `Geofence` wires a [`RegionStore`], a [`ReloadCoordinator`] with its
/// listener thread, and (optionally) a [`PollingWatcher`] together. Clones
/// share the same state.
///
/// # Examples
///
/// ```rust,no_run
/// use geofence::Geofence;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let geofence = Geofence::builder("/var/lib/tracker")
///     .racing_enabled(false)
///     .open()?;
///
/// if let Some(region) = geofence.find(48.137, 11.575) {
///     println!("parked at {}", region.name());
/// }
///
/// geofence.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Geofence {
    inner: Arc<GeofenceInner>,
}

impl Geofence {
    /// Creates a builder for a geofence backed by files in `directory`.
    pub fn builder(directory: impl Into<std::path::PathBuf>) -> GeofenceBuilder {
        GeofenceBuilder::new(directory)
    }

    /// Opens a geofence with the given configuration.
    ///
    /// Performs the initial build synchronously, so the returned geofence
    /// already answers queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the directory does
    /// not exist, or a background thread cannot be started.
    pub fn open(config: GeofenceConfig) -> GeofenceResult<Geofence> {
        config.validate()?;
        if !config.directory().is_dir() {
            log::error!("Geofence directory not found: {}", config.directory().display());
            return Err(GeofenceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("directory not found: {}", config.directory().display()),
            )));
        }

        let source = Arc::new(FileRegionSource::new(config.clone()));
        let geofence = Self::from_source(source, config.debounce())?;

        if config.watch() {
            let sender = geofence.change_sender()?;
            let watcher = PollingWatcher::start(
                config.directory(),
                WATCHED_EXTENSION,
                config.poll_interval(),
                sender,
            )?;
            *geofence.inner.watcher.lock() = Some(watcher);
        }

        Ok(geofence)
    }

    /// Opens a geofence over an arbitrary region source, without file
    /// watching. Change signals can still be injected through
    /// [`change_sender`](Self::change_sender).
    ///
    /// # Errors
    ///
    /// Returns an error if the listener thread cannot be started.
    pub fn from_source(source: Arc<dyn RegionSource>, debounce: Duration) -> GeofenceResult<Geofence> {
        let store = Arc::new(RegionStore::new());
        let coordinator = ReloadCoordinator::new(store, source, debounce);
        coordinator.rebuild();

        let (sender, receiver) = unbounded();
        let listener = coordinator.listen(receiver)?;

        Ok(Geofence {
            inner: Arc::new(GeofenceInner {
                coordinator,
                sender: Mutex::new(Some(sender)),
                listener: Mutex::new(Some(listener)),
                watcher: Mutex::new(None),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Returns the region containing `(lat, lng)`, logging the distance on a
    /// match.
    pub fn find(&self, lat: f64, lng: f64) -> Option<Region> {
        self.store().find(lat, lng, true)
    }

    /// Same as [`find`](Self::find) without the distance log line.
    pub fn find_quiet(&self, lat: f64, lng: f64) -> Option<Region> {
        self.store().find(lat, lng, false)
    }

    /// Whether the active regions came from the racing file.
    pub fn racing_mode(&self) -> bool {
        self.store().racing_mode()
    }

    pub fn region_count(&self) -> usize {
        self.store().len()
    }

    pub fn store(&self) -> &Arc<RegionStore> {
        self.inner.coordinator.store()
    }

    pub fn coordinator(&self) -> &ReloadCoordinator {
        &self.inner.coordinator
    }

    /// Returns a sender for injecting change signals.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::Closed`] after [`close`](Self::close).
    pub fn change_sender(&self) -> GeofenceResult<Sender<SourceChanged>> {
        self.inner
            .sender
            .lock()
            .as_ref()
            .cloned()
            .ok_or(GeofenceError::Closed)
    }

    /// Stops watching and listening. Queries keep answering from the last
    /// installed regions.
    pub fn close(&self) -> GeofenceResult<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner.close();
        log::debug!("Geofence closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

struct GeofenceInner {
    coordinator: ReloadCoordinator,
    sender: Mutex<Option<Sender<SourceChanged>>>,
    listener: Mutex<Option<ListenerHandle>>,
    watcher: Mutex<Option<PollingWatcher>>,
    closed: AtomicBool,
}

impl GeofenceInner {
    fn close(&self) {
        if let Some(watcher) = self.watcher.lock().take() {
            watcher.stop();
        }
        self.sender.lock().take();
        if let Some(mut listener) = self.listener.lock().take() {
            listener.stop();
        }
    }
}

impl Drop for GeofenceInner {
    fn drop(&mut self) {
        self.close();
    }
}
