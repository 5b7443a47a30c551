use thiserror::Error;

use terremoto_formats::FormatError;

/// Custom error type for feeds, allow us to differentiate between errors.
///
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No such site {0}")]
    UnknownSite(String),
    #[error("Bad sites file version {0}")]
    BadFileVersion(usize),
    #[error("Invalid sites catalogue: {0}")]
    Catalogue(String),
    #[error("Timeout after {0}s")]
    Timeout(u64),
    #[error("HTTP Error: {0}")]
    HTTP(#[from] reqwest::Error),
    #[error("Feed returned {code}: {body}")]
    Status { code: u16, body: String },
    #[error("Can not decode feed: {0}")]
    Decoding(#[from] FormatError),
}

/// Custom error type for notification delivery.
///
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Timeout after {0}s")]
    Timeout(u64),
    #[error("HTTP Error: {0}")]
    HTTP(#[from] reqwest::Error),
    #[error("Provider returned {code}: {body}")]
    Status { code: u16, body: String },
    #[error("Can not write message: {0}")]
    Output(#[from] std::io::Error),
}
