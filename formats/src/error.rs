use thiserror::Error;

/// Custom error type for the formats module.
///
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid feed envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}
