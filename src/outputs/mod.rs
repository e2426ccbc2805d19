//! Persistence of extracted articles.
//!
//! The extractor itself never stores anything. Callers that want to keep a
//! result hand a [`NewContent`] to a [`ContentStore`] and get back the stored
//! record with its generated id and creation time.
//!
//! # Implementations
//!
//! - [`json::JsonDirStore`]: one JSON document per record on disk

pub mod json;

use crate::models::{NewContent, SavedContent};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid record: {0}")]
    Invalid(String),
}

/// The narrow write contract a persistence backend offers.
pub trait ContentStore {
    async fn save(&self, content: NewContent) -> Result<SavedContent, StoreError>;
}
