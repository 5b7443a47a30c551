//! Definition of the seismic feed formats
//!
//! This module makes the link between the shared output record `SeismicEvent` and the different
//! provider formats defined in the other modules.
//!
//! To add a new format, insert a variant in `Format`, a `PROVIDER.rs` file defining the provider
//! schema and its `Normalize` implementation, and hook it into `Format::normalize()`.  Nothing
//! downstream (filtering, formatting) has to change.
//!

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace, warn};

// Re-export for convenience
//
pub use emsc::*;
pub use error::*;
pub use event::*;
pub use format::*;
pub use usgs::*;

mod emsc;
mod error;
mod event;
mod format;
mod usgs;

/// Every provider schema knows how to turn one of its features into our own `SeismicEvent`.
///
/// Returning `None` means the feature is unusable (no coordinates, etc.) and will be dropped.
///
pub trait Normalize: DeserializeOwned + Debug {
    fn normalize(&self) -> Option<SeismicEvent>;
}

/// Outer GeoJSON-like envelope shared by all providers.  Features are kept as raw values so
/// they can be decoded one by one.
///
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<serde_json::Value>,
}

/// Decode a provider body into normalized events.
///
/// The envelope itself must be valid, but a malformed feature only costs us that feature.
///
#[tracing::instrument(skip(body))]
pub fn normalize_features<T: Normalize>(body: &str) -> Result<Vec<SeismicEvent>, FormatError> {
    let fc: FeatureCollection = serde_json::from_str(body)?;
    trace!("{} raw features", fc.features.len());

    let res: Vec<_> = fc
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(n, v)| match serde_json::from_value::<T>(v) {
            Ok(feature) => Some((n, feature)),
            Err(e) => {
                warn!("feature #{}: skipping malformed record: {}", n, e);
                None
            }
        })
        .filter_map(|(n, feature)| {
            let ev = feature.normalize();
            if ev.is_none() {
                warn!("feature #{}: skipping record without coordinates", n);
            }
            ev
        })
        .collect();
    debug!("{} events normalized", res.len());
    Ok(res)
}
