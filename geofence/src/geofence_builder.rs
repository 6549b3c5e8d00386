use std::path::PathBuf;
use std::time::Duration;

use crate::config::GeofenceConfig;
use crate::errors::GeofenceResult;
use crate::geofence::Geofence;

/// Builder for opening a file-backed [`Geofence`].
///
/// Settings are only checked when [`open`](Self::open) is called.
///
/// # Examples
///
/// ```rust,no_run
/// use geofence::Geofence;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let geofence = Geofence::builder("/var/lib/tracker")
///     .racing_enabled(true)
///     .debounce(Duration::from_secs(5))
///     .poll_interval(Duration::from_secs(2))
///     .open()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GeofenceBuilder {
    config: GeofenceConfig,
}

impl GeofenceBuilder {
    /// Creates a builder with default settings for files in `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        GeofenceBuilder {
            config: GeofenceConfig::new(directory),
        }
    }

    /// Prefer the racing file when it exists.
    pub fn racing_enabled(mut self, racing_enabled: bool) -> Self {
        self.config = self.config.with_racing_enabled(racing_enabled);
        self
    }

    pub fn default_file(mut self, name: &str) -> Self {
        self.config = self.config.with_default_file(name);
        self
    }

    pub fn private_file(mut self, name: &str) -> Self {
        self.config = self.config.with_private_file(name);
        self
    }

    pub fn racing_file(mut self, name: &str) -> Self {
        self.config = self.config.with_racing_file(name);
        self
    }

    /// Field delimiter of the region files.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config = self.config.with_delimiter(delimiter);
        self
    }

    /// Wait between a change signal and the rebuild.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.config = self.config.with_debounce(debounce);
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.config = self.config.with_poll_interval(poll_interval);
        self
    }

    /// Whether to poll the directory for changes. Without it, reloads only
    /// happen on signals sent through [`Geofence::change_sender`].
    pub fn watch(mut self, watch: bool) -> Self {
        self.config = self.config.with_watch(watch);
        self
    }

    pub fn config(&self) -> &GeofenceConfig {
        &self.config
    }

    /// Opens the geofence, performing the initial build.
    ///
    /// # Errors
    ///
    /// See [`Geofence::open`].
    pub fn open(self) -> GeofenceResult<Geofence> {
        Geofence::open(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_builder_collects_settings() {
        let builder = GeofenceBuilder::new("/data")
            .racing_enabled(true)
            .default_file("a.csv")
            .private_file("b.csv")
            .racing_file("c.csv")
            .delimiter(b';')
            .debounce(Duration::from_millis(1))
            .poll_interval(Duration::from_millis(2))
            .watch(false);

        let config = builder.config();
        assert_eq!(config.directory(), Path::new("/data"));
        assert!(config.racing_enabled());
        assert_eq!(config.default_path(), Path::new("/data/a.csv"));
        assert_eq!(config.private_path(), Path::new("/data/b.csv"));
        assert_eq!(config.racing_path(), Path::new("/data/c.csv"));
        assert_eq!(config.delimiter(), b';');
        assert_eq!(config.debounce(), Duration::from_millis(1));
        assert_eq!(config.poll_interval(), Duration::from_millis(2));
        assert!(!config.watch());
    }

    #[test]
    fn test_open_reports_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = GeofenceBuilder::new(dir.path()).racing_file(" ").open();
        assert!(result.is_err());
    }
}
