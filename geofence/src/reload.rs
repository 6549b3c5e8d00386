//! Rebuilding and swapping region snapshots when a source changes.
//!
//! A change signal suspends acceptance of further signals, waits for the
//! debounce interval so the writer can finish, rebuilds the snapshot from the
//! [`RegionSource`] and installs it in the [`RegionStore`]. Signals that
//! arrive while a reload is running are dropped, not queued, so at most one
//! reload runs at a time.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};

use crate::errors::GeofenceResult;
use crate::snapshot::Snapshot;
use crate::source::RegionSource;
use crate::store::RegionStore;

/// Notification that a watched source changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChanged {
    /// File name (or other identity) of the source that changed.
    pub name: String,
}

impl SourceChanged {
    pub fn new(name: impl Into<String>) -> Self {
        SourceChanged { name: name.into() }
    }
}

/// Reacts to [`SourceChanged`] signals by rebuilding the active snapshot.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct ReloadCoordinator {
    inner: Arc<ReloadCoordinatorInner>,
}

impl ReloadCoordinator {
    pub fn new(store: Arc<RegionStore>, source: Arc<dyn RegionSource>, debounce: Duration) -> Self {
        ReloadCoordinator {
            inner: Arc::new(ReloadCoordinatorInner {
                store,
                source,
                debounce,
                accepting: AtomicBool::new(true),
                reloads: AtomicU64::new(0),
            }),
        }
    }

    /// Builds a snapshot from the source right now and installs it.
    ///
    /// Used for the startup build; does not debounce and ignores the
    /// reload-in-progress state. Returns the number of regions installed.
    pub fn rebuild(&self) -> usize {
        self.inner.rebuild()
    }

    /// Handles one change signal without blocking the caller.
    ///
    /// Returns `false` if the signal was ignored because a reload is already
    /// running (or the reload thread could not be started).
    pub fn signal(&self, event: SourceChanged) -> bool {
        if self
            .inner
            .accepting
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("Reload in progress, ignoring change of {}", event.name);
            return false;
        }

        log::info!("CSV File changed: {}", event.name);
        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name("geofence-reload".to_string())
            .spawn(move || inner.debounced_reload());

        if let Err(e) = spawned {
            log::error!("Failed to start reload thread: {}", e);
            self.inner.accepting.store(true, Ordering::Release);
            return false;
        }
        true
    }

    /// Starts a thread that feeds every signal received on `events` into
    /// [`signal`](Self::signal).
    ///
    /// The thread ends when the returned handle is stopped or dropped, or when
    /// every sender of `events` is gone.
    pub fn listen(&self, events: Receiver<SourceChanged>) -> GeofenceResult<ListenerHandle> {
        let (shutdown, shutdown_rx) = bounded::<()>(1);
        let coordinator = self.clone();

        let thread = thread::Builder::new()
            .name("geofence-listener".to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(events) -> msg => match msg {
                            Ok(event) => {
                                coordinator.signal(event);
                            }
                            Err(_) => break,
                        },
                        recv(shutdown_rx) -> _ => break,
                    }
                }
                log::debug!("Geofence change listener stopped");
            })?;

        Ok(ListenerHandle {
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    /// Whether signal acceptance is currently suspended by a running reload.
    pub fn is_reloading(&self) -> bool {
        !self.inner.accepting.load(Ordering::Acquire)
    }

    /// Number of signal-triggered reloads that have completed.
    pub fn reload_count(&self) -> u64 {
        self.inner.reloads.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &Arc<RegionStore> {
        &self.inner.store
    }

    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }
}

struct ReloadCoordinatorInner {
    store: Arc<RegionStore>,
    source: Arc<dyn RegionSource>,
    debounce: Duration,
    accepting: AtomicBool,
    reloads: AtomicU64,
}

impl ReloadCoordinatorInner {
    fn rebuild(&self) -> usize {
        let loaded = self.source.load();
        let snapshot = Snapshot::new(loaded.regions, loaded.racing_mode);
        let count = snapshot.len();
        self.store.install(snapshot);
        count
    }

    fn debounced_reload(&self) {
        if !self.debounce.is_zero() {
            thread::sleep(self.debounce);
        }
        // a panicking source must not leave acceptance suspended
        match panic::catch_unwind(AssertUnwindSafe(|| self.rebuild())) {
            Ok(count) => {
                self.reloads.fetch_add(1, Ordering::AcqRel);
                log::debug!("Reload finished with {} regions", count);
            }
            Err(_) => log::error!("Reload failed, keeping the previous regions"),
        }
        self.accepting.store(true, Ordering::Release);
    }
}

/// Owns the listener thread started by [`ReloadCoordinator::listen`].
pub struct ListenerHandle {
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Stops the listener and waits for its thread to exit.
    ///
    /// A reload that is already running is not interrupted.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Geofence change listener panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|thread| !thread.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
