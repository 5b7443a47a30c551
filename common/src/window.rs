//! Module handling the time window we query the feeds for.
//!

use std::fmt::{Display, Formatter};

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::trace;

/// Format used by FDSN event services for `starttime`/`endtime`: second precision, UTC,
/// no zone suffix.
///
pub const QUERY_FMT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error, PartialEq)]
pub enum ErrWindow {
    #[error("window must be at least one hour, got {0}")]
    TooShort(u32),
}

/// Trailing interval `[begin, end]`, both in UTC.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The `hours` hours leading up to `now`.
    ///
    #[tracing::instrument]
    pub fn last(hours: u32, now: DateTime<Utc>) -> Result<Self, ErrWindow> {
        if hours == 0 {
            return Err(ErrWindow::TooShort(hours));
        }
        let begin = now - TimeDelta::hours(hours as i64);
        trace!("last {} hours gives from {} to {}", hours, begin, now);
        Ok(TimeWindow { begin, end: now })
    }

    #[inline]
    pub fn hours(&self) -> i64 {
        (self.end - self.begin).num_hours()
    }

    pub fn query_begin(&self) -> String {
        self.begin.format(QUERY_FMT).to_string()
    }

    pub fn query_end(&self) -> String {
        self.end.format(QUERY_FMT).to_string()
    }

    /// Header label for messages, e.g. `Last 24 Hours`.
    ///
    pub fn label(&self) -> String {
        match self.hours() {
            1 => "Last Hour".to_string(),
            n => format!("Last {} Hours", n),
        }
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.query_begin(), self.query_end())
    }
}
