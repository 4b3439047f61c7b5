//! Error types for playlist resolution extraction
//!
//! Every failure of an extraction call collapses into a single
//! [`ExtractionError`] value. Nothing is retried here; [`ExtractionError::is_retryable`]
//! only tells the caller whether trying again could plausibly help.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of an extraction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Opening or reading the playlist resource failed (DNS, connection, timeout, HTTP status)
    Fetch,
    /// The response body is not a recognizable HLS playlist
    Parse,
    /// The playlist parsed but yielded no mappable resolution
    NoUsableVariant,
    /// Invalid probe configuration
    Config,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ExtractionError {
    #[error("Failed to fetch playlist {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse playlist: {message}")]
    Parse { message: String },

    #[error("Playlist has no usable variant ({variant_count} listed)")]
    NoUsableVariant { variant_count: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractionError {
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::NoUsableVariant { .. } => ErrorKind::NoUsableVariant,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the caller may reasonably try the same URL again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Short text suitable for a toast or status line
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch { message, .. } => format!("Could not load playlist: {}", message),
            Self::Parse { .. } => "The link does not point to a valid HLS playlist".to_string(),
            Self::NoUsableVariant { .. } => {
                "No selectable quality was found in this playlist".to_string()
            }
            Self::Config(message) => format!("Invalid settings: {}", message),
        }
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        Self::Fetch { url, message }
    }
}

/// Result type alias for extraction operations
pub type ExtractionResult<T> = Result<T, ExtractionError>;
