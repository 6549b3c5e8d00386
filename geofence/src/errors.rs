//! Error and result types for the geofence crate.
//!
//! Most failure paths in this crate degrade instead of failing: a bad record is
//! skipped, a missing file contributes no regions. `GeofenceError` is reserved
//! for the few operations that cannot sensibly continue, such as opening a
//! geofence on a directory that does not exist.

use std::io;
use thiserror::Error;

/// Errors that can occur while configuring or running a geofence
#[derive(Debug, Error)]
pub enum GeofenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Geofence is closed")]
    Closed,
}

/// Result type for geofence operations
pub type GeofenceResult<T> = Result<T, GeofenceError>;
