use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Terminal failure of a single media file. Never aborts a batch.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Unable to classify input file as movie or episode")]
    UnclassifiableFilename,

    #[error("Failed to login to {provider}")]
    AuthenticationFailure { provider: String },

    #[error("No subtitle found for {context}")]
    NoCandidatesFound { context: String },

    #[error("Unable to pick a subtitle for {context}")]
    SelectionFailure { context: String },

    #[error("Failed downloading subtitle for {context}: {source}")]
    DownloadFailure { context: String, source: Error },

    #[error("Failed writing subtitle to '{}': {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },
}
