use serde::{Deserialize, Serialize};
use strum::{EnumString, VariantNames};

use crate::{normalize_features, Emsc, FormatError, SeismicEvent, Usgs};

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// The `Format` enum represents the feed schemas we know how to normalize.
///
/// ```rust
/// use terremoto_formats::Format;
///
/// let fmt: Format = "USGS".parse().unwrap();
/// assert_eq!(Format::Usgs, fmt);
/// assert_eq!("usgs", fmt.to_string());
/// ```
///
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Deserialize,
    PartialEq,
    Eq,
    strum::Display,
    EnumString,
    Serialize,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Format {
    /// EMSC FDSN event service, JSON output
    #[default]
    Emsc,
    /// USGS FDSN event service, GeoJSON output
    Usgs,
}

impl Format {
    /// Turn a raw provider body into our own events.
    ///
    #[tracing::instrument(skip(body))]
    pub fn normalize(&self, body: &str) -> Result<Vec<SeismicEvent>, FormatError> {
        match self {
            Format::Emsc => normalize_features::<Emsc>(body),
            Format::Usgs => normalize_features::<Usgs>(body),
        }
    }
}
