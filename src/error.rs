use thiserror::Error;

use terremoto_common::ErrWindow;
use terremoto_sources::{FetchError, NotificationError};

use crate::ScheduleError;

/// Startup errors, all fatal.
///
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PUSHOVER_USER_KEY and PUSHOVER_APP_TOKEN must be set")]
    MissingCredentials,
    #[error("Invalid value {value:?} for {key}")]
    BadValue { key: String, value: String },
    #[error("Radius must be > 0, got {0}")]
    BadRadius(f64),
    #[error("Invalid home location {0}, {1}")]
    BadLocation(f64, f64),
    #[error("{0} must be at least 1")]
    TooSmall(String),
    #[error("Invalid alert time: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("Error reading configuration file {0}: {1}")]
    File(String, String),
    #[error("Bad file version {0}")]
    BadFileVersion(usize),
}

/// Everything that can abort one alert cycle.  None of these is fatal.
///
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Bad feed window: {0}")]
    Window(#[from] ErrWindow),
    #[error("Error getting earthquakes: {0}")]
    Fetch(#[from] FetchError),
    #[error("Error sending notification: {0}")]
    Notify(#[from] NotificationError),
    #[error("Cycle timed out after {0}s")]
    Timeout(u64),
}
