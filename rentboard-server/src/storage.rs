//! Flat upload directory for proofs and property images

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::models::upload::stored_name;
use crate::models::{UploadRole, UploadedFile};

/// Upload directory handle
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory if it doesn't exist yet.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Write an accepted upload under a freshly generated name and return it.
    pub async fn save(&self, role: UploadRole, file: &UploadedFile) -> io::Result<String> {
        let name = stored_name(role, &file.file_name, Utc::now(), Uuid::new_v4());
        tokio::fs::write(self.root.join(&name), &file.bytes).await?;
        tracing::debug!(file = %name, bytes = file.bytes.len(), role = role.tag(), "upload saved");
        Ok(name)
    }

    /// Remove stored files, ignoring any that are missing or unremovable.
    ///
    /// Names that aren't a bare file name are skipped.
    pub async fn remove_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            if !is_bare_file_name(name) {
                tracing::warn!(file = %name, "refusing to remove non-flat upload path");
                continue;
            }
            if let Err(e) = tokio::fs::remove_file(self.root.join(name)).await {
                tracing::debug!(file = %name, error = %e, "upload removal skipped");
            }
        }
    }
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty() && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}
