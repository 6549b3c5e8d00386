//! Polling change detection for region files.
//!
//! [`PollingWatcher`] periodically lists a directory, compares the
//! modification time of every file with the watched extension against the
//! previous listing, and sends a [`SourceChanged`] for each file that changed
//! or appeared. Removed files are not reported.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use timer::{Guard, Timer};

use crate::errors::{GeofenceError, GeofenceResult};
use crate::reload::SourceChanged;

/// Emits [`SourceChanged`] signals for modified files in one directory.
///
/// The first listing happens in [`start`](Self::start) and only records a
/// baseline. Dropping the watcher cancels polling.
pub struct PollingWatcher {
    _timer: Timer,
    guard: Mutex<Option<Guard>>,
    state: Arc<WatchState>,
}

impl PollingWatcher {
    /// Starts polling `directory` for files ending in `.{extension}` every
    /// `interval`.
    ///
    /// # Errors
    ///
    /// Returns an error if `directory` cannot be listed or `interval` is not
    /// representable.
    pub fn start(
        directory: impl Into<PathBuf>,
        extension: &str,
        interval: Duration,
        sender: Sender<SourceChanged>,
    ) -> GeofenceResult<PollingWatcher> {
        let state = Arc::new(WatchState {
            directory: directory.into(),
            extension: extension.to_ascii_lowercase(),
            sender,
            seen: Mutex::new(HashMap::new()),
        });

        let baseline = state.list()?;
        *state.seen.lock() = baseline;

        let period = chrono::Duration::from_std(interval).map_err(|e| {
            GeofenceError::InvalidConfig(format!("poll interval out of range: {}", e))
        })?;

        let timer = Timer::new();
        let polled = Arc::clone(&state);
        let guard = timer.schedule_repeating(period, move || {
            polled.poll();
        });

        log::debug!(
            "Watching *.{} in {} every {:?}",
            state.extension,
            state.directory.display(),
            interval
        );

        Ok(PollingWatcher {
            _timer: timer,
            guard: Mutex::new(Some(guard)),
            state,
        })
    }

    /// Lists the directory once, right now, and sends a signal per changed
    /// file. Returns the signals that were sent.
    pub fn poll(&self) -> Vec<SourceChanged> {
        self.state.poll()
    }

    /// Cancels polling. Calling it twice is harmless.
    pub fn stop(&self) {
        if self.guard.lock().take().is_some() {
            log::debug!("Stopped watching {}", self.state.directory.display());
        }
    }

    pub fn is_running(&self) -> bool {
        self.guard.lock().is_some()
    }

    pub fn directory(&self) -> &Path {
        &self.state.directory
    }
}

struct WatchState {
    directory: PathBuf,
    extension: String,
    sender: Sender<SourceChanged>,
    seen: Mutex<HashMap<PathBuf, SystemTime>>,
}

impl WatchState {
    fn list(&self) -> io::Result<HashMap<PathBuf, SystemTime>> {
        let mut listing = HashMap::new();
        for entry in fs::read_dir(&self.directory)?.flatten() {
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
                .unwrap_or(false);
            if !matches {
                continue;
            }

            match entry.metadata().and_then(|meta| meta.modified()) {
                Ok(modified) => {
                    listing.insert(path, modified);
                }
                Err(e) => log::debug!("Cannot stat {}: {}", path.display(), e),
            }
        }
        Ok(listing)
    }

    fn poll(&self) -> Vec<SourceChanged> {
        let current = match self.list() {
            Ok(current) => current,
            Err(e) => {
                log::warn!("Failed to list {}: {}", self.directory.display(), e);
                return Vec::new();
            }
        };

        let mut seen = self.seen.lock();
        let mut changed = Vec::new();
        for (path, modified) in &current {
            if seen.get(path) == Some(modified) {
                continue;
            }
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            changed.push(SourceChanged::new(name));
        }
        *seen = current;
        drop(seen);

        for event in &changed {
            if self.sender.send(event.clone()).is_err() {
                log::debug!("No listener for change of {}", event.name);
            }
        }
        changed
    }
}
