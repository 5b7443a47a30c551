//! Module to load and normalize the EMSC (seismicportal.eu) FDSN event output in JSON.
//!
//! Only the fields we need are described, serde ignores the rest.
//!
//! ```text
//! {"type": "Feature",
//!  "geometry": {"type": "Point", "coordinates": [26.9, 38.2, -10.0]},
//!  "properties": {"mag": 2.3, "flynn_region": "WESTERN TURKEY",
//!                 "time": "2024-03-01T10:42:13.2Z", ...}}
//! ```
//!

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{EventTime, Normalize, SeismicEvent};

/// Timestamp formats tried in order.  The last one has no zone and is assumed to be UTC.
///
const EMSC_TIME_FMTS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Deserialize, Serialize)]
pub struct Emsc {
    pub properties: EmscProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EmscProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default, rename = "flynn_region")]
    pub place: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// GeoJSON point geometry, `[longitude, latitude, depth]`.
///
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Geometry {
    /// Return `(lat, lon)`, providers send longitude first.
    ///
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lon, lat, ..] => Some((*lat, *lon)),
            _ => None,
        }
    }
}

/// Parse an EMSC timestamp, falling back through the known formats.
///
/// A bad timestamp must never abort the whole ingestion so we log and carry on.
///
pub fn parse_emsc_time(s: &str) -> EventTime {
    let tm = EMSC_TIME_FMTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|tm| tm.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|tm| tm.with_timezone(&Utc))
        });
    if tm.is_none() {
        warn!("failed to parse time {:?}, keeping event with unknown time", s);
    }
    tm.into()
}

impl Normalize for Emsc {
    fn normalize(&self) -> Option<SeismicEvent> {
        let (latitude, longitude) = self.geometry.lat_lon()?;
        let time = match &self.properties.time {
            Some(tm) => parse_emsc_time(tm),
            None => EventTime::Unknown,
        };
        Some(SeismicEvent {
            magnitude: self.properties.mag.unwrap_or_default(),
            latitude,
            longitude,
            time,
            place: self.properties.place.clone().unwrap_or_default(),
            distance_km: None,
        })
    }
}
