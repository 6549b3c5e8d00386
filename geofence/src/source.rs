//! Where region tuples come from.
//!
//! [`RegionSource`] is the seam between the reload machinery and storage.
//! [`FileRegionSource`] is the file-backed implementation that decides between
//! racing and normal mode on every load.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use crate::config::GeofenceConfig;
use crate::errors::GeofenceResult;
use crate::parser::read_region_file;
use crate::region::Region;

/// Regions gathered for one build, in source order (not yet sorted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedRegions {
    pub regions: Vec<Region>,
    pub racing_mode: bool,
}

/// Supplies the regions for a snapshot build.
///
/// Implementations must not fail as a whole: unreadable inputs contribute no
/// regions and are reported through the log.
pub trait RegionSource: Send + Sync {
    fn load(&self) -> LoadedRegions;
}

impl<F> RegionSource for F
where
    F: Fn() -> LoadedRegions + Send + Sync,
{
    fn load(&self) -> LoadedRegions {
        self()
    }
}

/// Reads regions from the files named in a [`GeofenceConfig`].
///
/// If racing is enabled and the racing file exists, only that file is read
/// and the result is flagged as racing mode. Otherwise the default file is
/// read, followed by the private overlay, which is created empty when missing.
#[derive(Debug, Clone)]
pub struct FileRegionSource {
    config: GeofenceConfig,
}

impl FileRegionSource {
    pub fn new(config: GeofenceConfig) -> Self {
        FileRegionSource { config }
    }

    pub fn config(&self) -> &GeofenceConfig {
        &self.config
    }

    fn read_into(&self, regions: &mut Vec<Region>, path: &Path, log_each: bool) {
        if !path.exists() {
            log::warn!("FileNotFound: {}", path.display());
            return;
        }

        log::info!("Read Geofence File: {}", path.display());
        match read_region_file(path, self.config.delimiter()) {
            Ok(parsed) => {
                if log_each {
                    for region in &parsed.regions {
                        log::debug!("Address inserted: {}", region.name());
                    }
                }
                if parsed.skipped > 0 {
                    log::warn!(
                        "{} malformed lines skipped in {}",
                        parsed.skipped,
                        path.display()
                    );
                }
                regions.extend(parsed.regions);
            }
            Err(e) => log::error!("Failed to read {}: {}", path.display(), e),
        }
    }

    fn ensure_private_file(&self) {
        let path = self.config.private_path();
        if !path.exists() {
            log::info!("Create: {}", path.display());
            if let Err(e) = create_empty(&path) {
                log::error!("Failed to create {}: {}", path.display(), e);
                return;
            }
        }

        if let Err(e) = make_world_writable(&path) {
            log::warn!("Failed to set permissions on {}: {}", path.display(), e);
        }
    }
}

impl RegionSource for FileRegionSource {
    fn load(&self) -> LoadedRegions {
        let mut regions = Vec::new();
        let racing_path = self.config.racing_path();

        let racing_mode = self.config.racing_enabled() && racing_path.exists();
        if racing_mode {
            self.read_into(&mut regions, &racing_path, true);
            log::info!("*** RACING MODE ***");
        } else {
            self.read_into(&mut regions, &self.config.default_path(), false);
            self.ensure_private_file();
            self.read_into(&mut regions, &self.config.private_path(), true);
        }

        log::info!("Addresses inserted: {}", regions.len());
        LoadedRegions {
            regions,
            racing_mode,
        }
    }
}

fn create_empty(path: &Path) -> GeofenceResult<()> {
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

#[cfg(unix)]
fn make_world_writable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn make_world_writable(_path: &Path) -> io::Result<()> {
    Ok(())
}
