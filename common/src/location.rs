//! Location related module
//!
//! Everything is in decimal degrees (WGS84) and distances are in kilometres.  The Earth is
//! approximated by a sphere, this is plenty for regional alerting but not for geodesy.
//!
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.;

/// Great-circle distance between two points, using the haversine formula.
///
/// Always returns a finite, non-negative number of kilometres for valid degree inputs.
///
#[inline]
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.).sin().powi(2);

    // Rounding can push `a` a hair over 1 for antipodal points.
    //
    2. * EARTH_RADIUS_KM * a.clamp(0., 1.).sqrt().asin()
}

/// Actual location
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Location {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Location { lat, lon }
    }

    /// Distance in km to another location.
    ///
    #[inline]
    pub fn distance_to(&self, other: &Location) -> f64 {
        haversine(self.lat, self.lon, other.lat, other.lon)
    }

    /// Check both coordinates are within their respective ranges.
    ///
    pub fn is_valid(&self) -> bool {
        (-90. ..=90.).contains(&self.lat) && (-180. ..=180.).contains(&self.lon)
    }
}
