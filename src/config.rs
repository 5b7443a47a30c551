//! Configuration module
//!
//! Values come from, in increasing order of priority:
//!
//! - built-in defaults,
//! - an optional HCL file given with `-c`,
//! - the environment (after `.env` has been loaded by `main`).
//!
//! Empty environment variables are the same as unset ones.  Anything present but unparsable is
//! an error, we do not silently fall back to defaults.
//!
//! Version History:
//!
//! - v1 is the initial format
//!

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::trace;

use terremoto_sources::{Credentials, DEF_TIMEOUT};

use crate::{AlertSchedule, ConfigError, HomeLocation};

/// Current configuration file version
const CVERSION: usize = 1;

/// Default radius in km
pub const DEF_RADIUS: f64 = 100.;
/// Default log level
pub const DEF_LEVEL: &str = "INFO";
/// Default log file, relative to the current directory
pub const DEF_LOG_FILE: &str = "earthquake_alerts.log";
/// Default feed
pub const DEF_FEED: &str = "emsc";
/// Default window in hours
pub const DEF_WINDOW: u32 = 24;

// Environment variables
//
pub const ENV_LATITUDE: &str = "LATITUDE";
pub const ENV_LONGITUDE: &str = "LONGITUDE";
pub const ENV_RADIUS: &str = "RADIUS_KM";
pub const ENV_USER_KEY: &str = "PUSHOVER_USER_KEY";
pub const ENV_APP_TOKEN: &str = "PUSHOVER_APP_TOKEN";
pub const ENV_ALERT_TIME: &str = "ALERT_TIME";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_RUN_IMMEDIATELY: &str = "RUN_IMMEDIATELY";
pub const ENV_FEED: &str = "FEED";
pub const ENV_WINDOW: &str = "WINDOW_HOURS";
pub const ENV_MIN_MAG: &str = "MIN_MAGNITUDE";
pub const ENV_LOG_FILE: &str = "LOG_FILE";
pub const ENV_TIMEOUT: &str = "HTTP_TIMEOUT";

/// On-disk configuration, every field is optional.
///
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Version number for safety
    pub version: usize,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub user_key: Option<String>,
    pub app_token: Option<String>,
    /// HH:MM, UTC
    pub alert_time: Option<String>,
    pub log_level: Option<String>,
    /// Empty string disables the log file
    pub log_file: Option<String>,
    pub run_immediately: Option<bool>,
    pub feed: Option<String>,
    pub window_hours: Option<u32>,
    pub min_magnitude: Option<f64>,
    /// Seconds
    pub http_timeout: Option<u64>,
}

impl ConfigFile {
    /// Read and check an HCL configuration file.
    ///
    #[tracing::instrument]
    pub fn read(fname: &Path) -> Result<Self, ConfigError> {
        trace!("Reading {:?}", fname);

        let name = fname.to_string_lossy().to_string();
        let data = fs::read_to_string(fname)
            .map_err(|e| ConfigError::File(name.clone(), e.to_string()))?;
        Self::from_hcl(&name, &data)
    }

    pub fn from_hcl(name: &str, data: &str) -> Result<Self, ConfigError> {
        let cf: ConfigFile =
            hcl::from_str(data).map_err(|e| ConfigError::File(name.to_string(), e.to_string()))?;
        if cf.version != CVERSION {
            return Err(ConfigError::BadFileVersion(cf.version));
        }
        Ok(cf)
    }
}

/// Validated runtime configuration.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub home: HomeLocation,
    pub credentials: Credentials,
    pub schedule: AlertSchedule,
    pub run_immediately: bool,
    pub log_level: String,
    /// `None` means console only
    pub log_file: Option<PathBuf>,
    pub feed: String,
    pub window_hours: u32,
    pub min_magnitude: f64,
    pub timeout: Duration,
}

impl Config {
    /// Load from the optional file then the process environment.
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&Path>) -> Result<Config, ConfigError> {
        let cf = match fname {
            Some(fname) => ConfigFile::read(fname)?,
            None => ConfigFile::default(),
        };
        Self::from_sources(&cf, |key| std::env::var(key).ok())
    }

    /// Merge `file` with whatever `env` returns for each variable and validate the result.
    ///
    pub fn from_sources<F>(file: &ConfigFile, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty means unset
        //
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let lat = value(&env, ENV_LATITUDE, file.latitude, 0.)?;
        let lon = value(&env, ENV_LONGITUDE, file.longitude, 0.)?;
        let radius = value(&env, ENV_RADIUS, file.radius_km, DEF_RADIUS)?;
        let home = HomeLocation::new(lat, lon, radius)?;

        let user_key = env(ENV_USER_KEY).or(file.user_key.clone()).unwrap_or_default();
        let app_token = env(ENV_APP_TOKEN).or(file.app_token.clone()).unwrap_or_default();
        if user_key.is_empty() || app_token.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }

        let schedule = match env(ENV_ALERT_TIME).or(file.alert_time.clone()) {
            Some(s) => s.parse::<AlertSchedule>()?,
            None => AlertSchedule::default(),
        };

        let run_immediately = match env(ENV_RUN_IMMEDIATELY) {
            Some(v) => parse_bool(ENV_RUN_IMMEDIATELY, &v)?,
            None => file.run_immediately.unwrap_or(false),
        };

        let log_level = env(ENV_LOG_LEVEL)
            .or(file.log_level.clone())
            .unwrap_or(DEF_LEVEL.to_string());

        // An explicitly empty file entry disables it
        //
        let log_file = match env(ENV_LOG_FILE) {
            Some(f) => Some(PathBuf::from(f)),
            None => match &file.log_file {
                Some(f) if f.is_empty() => None,
                Some(f) => Some(PathBuf::from(f)),
                None => Some(PathBuf::from(DEF_LOG_FILE)),
            },
        };

        let feed = env(ENV_FEED)
            .or(file.feed.clone())
            .unwrap_or(DEF_FEED.to_string())
            .to_lowercase();

        let window_hours = value(&env, ENV_WINDOW, file.window_hours, DEF_WINDOW)?;
        if window_hours == 0 {
            return Err(ConfigError::TooSmall(ENV_WINDOW.to_string()));
        }

        let min_magnitude = value(&env, ENV_MIN_MAG, file.min_magnitude, 0.)?;

        let timeout = value(&env, ENV_TIMEOUT, file.http_timeout, DEF_TIMEOUT.as_secs())?;
        if timeout == 0 {
            return Err(ConfigError::TooSmall(ENV_TIMEOUT.to_string()));
        }

        Ok(Config {
            home,
            credentials: Credentials {
                app_token,
                user_key,
            },
            schedule,
            run_immediately,
            log_level,
            log_file,
            feed,
            window_hours,
            min_magnitude,
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// Environment first, then file, then default.
///
fn value<T, F>(env: &F, key: &str, file: Option<T>, def: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(v) => v.trim().parse::<T>().map_err(|_| ConfigError::BadValue {
            key: key.to_string(),
            value: v,
        }),
        None => Ok(file.unwrap_or(def)),
    }
}

fn parse_bool(key: &str, v: &str) -> Result<bool, ConfigError> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::BadValue {
            key: key.to_string(),
            value: v.to_string(),
        }),
    }
}
