//! Port to the upstream catalog service.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::books::BookRecord;

/// Batch lookup against the catalog service.
///
/// Implementations return records for the subset of `ids` the catalog knows.
/// Omitting an id means "not found" and is never an error by itself. Any
/// transport failure or non-success status must surface as an
/// [`UpstreamError`] rather than as an empty result.
#[async_trait]
pub trait BookCatalog: Send + Sync {
    async fn batch_lookup(&self, ids: &[String]) -> Result<Vec<BookRecord>, UpstreamError>;
}

#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("catalog responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// HTTP status reported by the catalog, if it answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}
