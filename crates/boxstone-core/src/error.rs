use thiserror::Error;

use crate::navigation::SectionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiteError {
    #[error("Section not found: {0}")]
    SectionNotFound(SectionId),

    #[error("Incomplete contact record: missing {0}")]
    IncompleteRecord(&'static str),

    #[error("Failed to persist contact record: {0}")]
    Persistence(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by a [`crate::platform::KeyValueStore`] backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,

    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for SiteError {
    fn from(err: serde_json::Error) -> Self {
        SiteError::Serialization(err.to_string())
    }
}
