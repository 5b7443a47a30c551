//! Module to load and normalize the USGS FDSN event output in GeoJSON.
//!
//! Same `[longitude, latitude, depth]` geometry as EMSC, but `time` is epoch milliseconds and
//! both `mag` and `place` can be `null`.
//!

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{EventTime, Geometry, Normalize, SeismicEvent};

#[derive(Debug, Deserialize, Serialize)]
pub struct Usgs {
    pub properties: UsgsProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UsgsProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    /// Epoch in milliseconds
    #[serde(default)]
    pub time: Option<i64>,
}

impl Normalize for Usgs {
    fn normalize(&self) -> Option<SeismicEvent> {
        let (latitude, longitude) = self.geometry.lat_lon()?;
        let time = match self.properties.time {
            Some(ms) => {
                let tm = DateTime::from_timestamp_millis(ms);
                if tm.is_none() {
                    warn!("timestamp {} out of range, keeping event with unknown time", ms);
                }
                tm.into()
            }
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
