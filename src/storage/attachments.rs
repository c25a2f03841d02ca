//! Attachment storage for file-valued employee fields.
//!
//! Files land under `{media_root}/{field_name}s/`; the returned stored
//! path (relative to the media root) is what gets written into the
//! record's column. The store owns the physical files; records only
//! reference them.

use crate::app::error::ServiceError;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// A file part extracted from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct AttachmentStore {
    media_root: PathBuf,
    max_bytes: usize,
}

impl AttachmentStore {
    pub fn new(media_root: impl AsRef<Path>, max_bytes: usize) -> Self {
        Self {
            media_root: media_root.as_ref().to_path_buf(),
            max_bytes,
        }
    }

    /// Writes `payload` under the field's namespace and returns the stored
    /// path. A short random prefix keeps repeated uploads of the same
    /// filename from colliding.
    pub async fn save(
        &self,
        field_name: &str,
        payload: &Bytes,
        original_filename: &str,
    ) -> Result<String, ServiceError> {
        if payload.len() > self.max_bytes {
            return Err(ServiceError::Validation(format!(
                "file '{}' exceeds the {} byte upload limit",
                original_filename, self.max_bytes
            )));
        }

        let dir_name = format!("{}s", field_name);
        let unique = Uuid::new_v4().simple().to_string();
        let file_name = format!("{}_{}", &unique[..8], sanitize_filename(original_filename));
        let stored_path = format!("{}/{}", dir_name, file_name);

        let dir = self.media_root.join(&dir_name);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ServiceError::Storage(format!("failed creating '{}': {}", dir.display(), e))
        })?;

        let full = dir.join(&file_name);
        tokio::fs::write(&full, payload).await.map_err(|e| {
            ServiceError::Storage(format!("failed writing '{}': {}", full.display(), e))
        })?;

        Ok(stored_path)
    }

    /// Removes a stored file. Missing files are not an error.
    pub async fn delete(&self, stored_path: &str) -> Result<(), ServiceError> {
        let full = self.resolve(stored_path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Storage(format!(
                "failed deleting '{}': {}",
                stored_path, e
            ))),
        }
    }

    pub async fn exists(&self, stored_path: &str) -> bool {
        match self.resolve(stored_path) {
            Ok(full) => tokio::fs::try_exists(&full).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Maps a stored path back under the media root, refusing traversal.
    fn resolve(&self, stored_path: &str) -> Result<PathBuf, ServiceError> {
        let path = Path::new(stored_path);
        let escapes = path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir));
        if escapes {
            return Err(ServiceError::Storage(format!(
                "path '{}' escapes the media root",
                stored_path
            )));
        }
        Ok(self.media_root.join(path))
    }
}

/// Keeps the base name only and replaces anything outside
/// `[A-Za-z0-9._-]`.
fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
