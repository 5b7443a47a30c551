//! Proximity filter: keep only events close enough to home.
//!

use serde::Serialize;
use tracing::trace;

use terremoto_common::Location;
use terremoto_formats::SeismicEvent;

use crate::ConfigError;

/// The fixed point events are measured against, with the alerting radius.
///
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HomeLocation {
    pub location: Location,
    /// Always > 0
    pub radius_km: f64,
}

impl HomeLocation {
    pub fn new(lat: f64, lon: f64, radius_km: f64) -> Result<Self, ConfigError> {
        let location = Location::new(lat, lon);
        if !location.is_valid() {
            return Err(ConfigError::BadLocation(lat, lon));
        }
        if !(radius_km.is_finite() && radius_km > 0.) {
            return Err(ConfigError::BadRadius(radius_km));
        }
        Ok(HomeLocation {
            location,
            radius_km,
        })
    }

    /// Distance in km from home to `ev`.
    ///
    #[inline]
    pub fn distance(&self, ev: &SeismicEvent) -> f64 {
        self.location.distance_to(&ev.location())
    }
}

/// Keep events within `home.radius_km` (boundary included), in input order, with their
/// `distance_km` filled in.
///
#[tracing::instrument(skip(events))]
pub fn filter_by_radius(events: Vec<SeismicEvent>, home: &HomeLocation) -> Vec<SeismicEvent> {
    events
        .into_iter()
        .filter_map(|ev| {
            let d = home.distance(&ev);
            trace!("{} at {:.1}km", ev.place, d);
            (d <= home.radius_km).then(|| ev.with_distance(d))
        })
        .collect()
}
