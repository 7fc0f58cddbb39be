use thiserror::Error;

/// Failures that stop a batch (or the process) outright.
///
/// Per-record problems are not represented here; see
/// [`crate::types::EnrichmentError`].
#[derive(Error, Debug)]
pub enum EnricherError {
    #[error("input is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EnricherError>;
