//! Configuration for a file-backed geofence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{GeofenceError, GeofenceResult};
use crate::parser::DEFAULT_DELIMITER;

/// Default region file, always read in normal mode.
pub const DEFAULT_FILE: &str = "geofence.csv";

/// User-editable overlay, read after the default file in normal mode.
pub const PRIVATE_FILE: &str = "geofence-private.csv";

/// Racing file; when present and racing is enabled it replaces both others.
pub const RACING_FILE: &str = "geofence-racing.csv";

/// Delay between a change signal and the rebuild, so a writer can finish.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

/// How often the polling watcher checks modification times.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Settings for a [`Geofence`](crate::Geofence).
///
/// Usually built through [`GeofenceBuilder`](crate::GeofenceBuilder).
///
/// # Examples
///
/// ```rust
/// use geofence::GeofenceConfig;
/// use std::time::Duration;
///
/// let config = GeofenceConfig::new("/var/lib/tracker")
///     .with_racing_enabled(true)
///     .with_debounce(Duration::from_secs(1));
/// assert!(config.validate().is_ok());
/// assert!(config.racing_path().ends_with("geofence-racing.csv"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceConfig {
    directory: PathBuf,
    default_file: String,
    private_file: String,
    racing_file: String,
    racing_enabled: bool,
    delimiter: u8,
    debounce: Duration,
    poll_interval: Duration,
    watch: bool,
}

impl GeofenceConfig {
    /// Creates a configuration with default file names and timings for
    /// region files in `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        GeofenceConfig {
            directory: directory.into(),
            default_file: DEFAULT_FILE.to_string(),
            private_file: PRIVATE_FILE.to_string(),
            racing_file: RACING_FILE.to_string(),
            racing_enabled: false,
            delimiter: DEFAULT_DELIMITER,
            debounce: DEFAULT_DEBOUNCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            watch: true,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn default_path(&self) -> PathBuf {
        self.directory.join(&self.default_file)
    }

    pub fn private_path(&self) -> PathBuf {
        self.directory.join(&self.private_file)
    }

    pub fn racing_path(&self) -> PathBuf {
        self.directory.join(&self.racing_file)
    }

    pub fn default_file(&self) -> &str {
        &self.default_file
    }

    pub fn racing_enabled(&self) -> bool {
        self.racing_enabled
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn watch(&self) -> bool {
        self.watch
    }

    pub fn with_default_file(mut self, name: &str) -> Self {
        self.default_file = name.to_string();
        self
    }

    pub fn with_private_file(mut self, name: &str) -> Self {
        self.private_file = name.to_string();
        self
    }

    pub fn with_racing_file(mut self, name: &str) -> Self {
        self.racing_file = name.to_string();
        self
    }

    pub fn with_racing_enabled(mut self, racing_enabled: bool) -> Self {
        self.racing_enabled = racing_enabled;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Checks the settings that would otherwise fail later and less clearly.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::InvalidConfig`] for an empty file name, a
    /// non-ASCII or line-breaking delimiter, or a zero poll interval.
    pub fn validate(&self) -> GeofenceResult<()> {
        for (what, name) in [
            ("default file", &self.default_file),
            ("private file", &self.private_file),
            ("racing file", &self.racing_file),
        ] {
            if name.trim().is_empty() {
                log::error!("{} name cannot be empty", what);
                return Err(GeofenceError::InvalidConfig(format!(
                    "{} name cannot be empty",
                    what
                )));
            }
        }

        if !self.delimiter.is_ascii() || matches!(self.delimiter, b'\n' | b'\r') {
            log::error!("Invalid delimiter: {:#04x}", self.delimiter);
            return Err(GeofenceError::InvalidConfig(format!(
                "delimiter must be a single ASCII character other than a line break, got {:#04x}",
                self.delimiter
            )));
        }

        if self.watch && self.poll_interval.is_zero() {
            log::error!("Poll interval must be positive");
            return Err(GeofenceError::InvalidConfig(
                "poll interval must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeofenceConfig::new("/data");
        assert_eq!(config.directory(), Path::new("/data"));
        assert_eq!(config.default_path(), PathBuf::from("/data/geofence.csv"));
        assert_eq!(config.private_path(), PathBuf::from("/data/geofence-private.csv"));
        assert_eq!(config.racing_path(), PathBuf::from("/data/geofence-racing.csv"));
        assert!(!config.racing_enabled());
        assert_eq!(config.delimiter(), b',');
        assert_eq!(config.debounce(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert!(config.watch());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_setters() {
        let config = GeofenceConfig::new("/data")
            .with_default_file("regions.csv")
            .with_private_file("mine.csv")
            .with_racing_file("track.csv")
            .with_racing_enabled(true)
            .with_delimiter(b';')
            .with_debounce(Duration::from_millis(10))
            .with_poll_interval(Duration::from_millis(20))
            .with_watch(false);

        assert_eq!(config.default_path(), PathBuf::from("/data/regions.csv"));
        assert_eq!(config.private_path(), PathBuf::from("/data/mine.csv"));
        assert_eq!(config.racing_path(), PathBuf::from("/data/track.csv"));
        assert!(config.racing_enabled());
        assert_eq!(config.delimiter(), b';');
        assert_eq!(config.debounce(), Duration::from_millis(10));
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert!(!config.watch());
    }

    #[test]
    fn test_validate_rejects_empty_file_name() {
        let config = GeofenceConfig::new("/data").with_private_file("  ");
        assert!(matches!(
            config.validate(),
            Err(GeofenceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_delimiter() {
        assert!(GeofenceConfig::new("/data").with_delimiter(b'\n').validate().is_err());
        assert!(GeofenceConfig::new("/data").with_delimiter(0xE9).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval_only_when_watching() {
        let config = GeofenceConfig::new("/data").with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());
        assert!(config.with_watch(false).validate().is_ok());
    }
}
