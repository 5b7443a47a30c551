//! Our own normalized record for one detected seismic event.
//!

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::Serialize;

use terremoto_common::Location;

/// Format used in messages for a known timestamp
pub const EVENT_TIME_FMT: &str = "%Y-%m-%d %H:%M UTC";

/// What we display when the provider timestamp could not be parsed
pub const UNKNOWN_TIME: &str = "unknown time";

/// Origin time of an event.
///
/// Providers sometimes send timestamps we can not parse; we keep the event and say so
/// instead of inventing a date.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum EventTime {
    Known(DateTime<Utc>),
    #[default]
    Unknown,
}

impl EventTime {
    #[inline]
    pub fn is_known(&self) -> bool {
        matches!(self, EventTime::Known(_))
    }
}

impl From<Option<DateTime<Utc>>> for EventTime {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(tm) => EventTime::Known(tm),
            None => EventTime::Unknown,
        }
    }
}

impl Display for EventTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventTime::Known(tm) => write!(f, "{}", tm.format(EVENT_TIME_FMT)),
            EventTime::Unknown => write!(f, "{}", UNKNOWN_TIME),
        }
    }
}

/// One event as seen by the rest of the system, whatever the provider.
///
/// `distance_km` is only filled in by the proximity filter.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SeismicEvent {
    /// Provider-reported magnitude, no enforced range
    pub magnitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Origin time
    pub time: EventTime,
    /// Free-text region, may be empty
    pub place: String,
    /// Distance to the home location in km
    pub distance_km: Option<f64>,
}

impl SeismicEvent {
    #[inline]
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }

    /// Return the same event with its distance to home filled in.
    ///
    pub fn with_distance(self, distance_km: f64) -> Self {
        SeismicEvent {
            distance_km: Some(distance_km),
            ..self
        }
    }
}
