//! Error types shared across Matchlight crates.

use std::path::PathBuf;

/// Top-level error type for Matchlight operations.
#[derive(Debug, thiserror::Error)]
pub enum MatchlightError {
    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Extraction error: {message}")]
    Extraction { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MatchlightError.
pub type MatchlightResult<T> = Result<T, MatchlightError>;

impl MatchlightError {
    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }
}
