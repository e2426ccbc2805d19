//! File-backed [`ContentStore`].
//!
//! # Output Structure
//!
//! ```text
//! root/
//! └── <user_id>/
//!     ├── 3f2a9c0e5b7d41e8a6c2f90d1b3e4a57.json
//!     └── 9b1c...json
//! ```
//!
//! Each file is a pretty-printed [`SavedContent`].

use super::{ContentStore, StoreError};
use crate::models::{NewContent, SavedContent};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the record `id` of `user_id` lives.
    pub fn path_for(&self, user_id: &str, id: &str) -> PathBuf {
        self.root.join(user_id).join(format!("{id}.json"))
    }

    /// Create the root and check that files can be written there, so a bad
    /// output directory fails before any extraction runs.
    #[instrument(level = "info", skip_all, fields(root = %self.root.display()))]
    pub async fn prepare(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await.map_err(io_at(&self.root))?;

        let check = self.root.join(format!(".write-check-{}", new_id()));
        fs::write(&check, b"").await.map_err(io_at(&check))?;
        fs::remove_file(&check).await.map_err(io_at(&check))?;
        info!("Store root is writable");
        Ok(())
    }

    /// Read a stored record back.
    pub async fn load(&self, user_id: &str, id: &str) -> Result<SavedContent, StoreError> {
        validate_user_id(user_id)?;
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StoreError::Invalid(format!("unusable record id '{id}'")));
        }
        let path = self.path_for(user_id, id);
        let raw = fs::read_to_string(&path)
            .await
            .map_err(|source| StoreError::Io { path, source })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + use<> {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// 128 random bits as lowercase hex.
fn new_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// User ids become directory names, so only a conservative alphabet passes.
fn validate_user_id(user_id: &str) -> Result<(), StoreError> {
    let valid = !user_id.is_empty()
        && user_id != "."
        && user_id != ".."
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::Invalid(format!("unusable user id '{user_id}'")))
    }
}

impl ContentStore for JsonDirStore {
    #[instrument(level = "info", skip_all, fields(user_id = %content.user_id, url = %content.url))]
    async fn save(&self, content: NewContent) -> Result<SavedContent, StoreError> {
        validate_user_id(&content.user_id)?;
        if content.content.trim().is_empty() {
            return Err(StoreError::Invalid("content is empty".to_string()));
        }

        let saved = SavedContent {
            id: new_id(),
            created_at: Utc::now(),
            content,
        };
        let json = serde_json::to_string_pretty(&saved)?;

        let dir = self.root.join(&saved.content.user_id);
        if let Err(source) = fs::create_dir_all(&dir).await {
            error!(dir = %dir.display(), error = %source, "Failed to create output dir");
            return Err(StoreError::Io { path: dir, source });
        }

        let path = self.path_for(&saved.content.user_id, &saved.id);
        fs::write(&path, json)
            .await
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;
        info!(path = %path.display(), id = %saved.id, "Saved content");

        Ok(saved)
    }
}
