//! YouTube Transcript Server - turn a pasted YouTube link into plain text
//!
//! This library extracts a canonical video identifier from the many URL shapes YouTube
//! uses, fetches caption data from the video's caption catalog (with an HTTP proxy as a
//! fallback), and serves the result over a small JSON API.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod server;
pub mod sources;

pub use cli::Cli;
pub use config::Config;
pub use extractors::{extract_video_id, VideoId};
pub use sources::{FetchOutcome, TranscriptDocument, TranscriptSegment, TranscriptSource};

/// Result type used for startup and configuration code
pub type Result<T> = anyhow::Result<T>;

/// Failure classes for a transcript request
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No transcript available: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for TranscriptError {
    fn from(err: reqwest::Error) -> Self {
        TranscriptError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for TranscriptError {
    fn from(err: serde_json::Error) -> Self {
        TranscriptError::Upstream(format!("Malformed upstream response: {}", err))
    }
}
