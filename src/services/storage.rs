use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Subdirectory of the storage root holding per-project image folders.
pub const IMAGES_DIR: &str = "images";

const DEFAULT_EXTENSION: &str = "bin";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem store for uploaded images.
///
/// Layout: `{root}/images/{project_id}/{uuid}.{ext}`. The root is also what
/// gets served as static content under `url_prefix`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    url_prefix: String,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn project_dir(&self, project_id: Uuid) -> PathBuf {
        self.images_dir().join(project_id.to_string())
    }

    /// Create the storage root and the images directory.
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(self.images_dir()).await?;
        Ok(())
    }

    /// Delete every stored image and recreate an empty images directory.
    pub async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_dir_all(self.images_dir()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.ensure_root().await
    }

    /// Write `data` under a freshly generated name in the project's directory.
    ///
    /// The original name only contributes its extension, so uploads with the
    /// same name never overwrite each other.
    pub async fn save(
        &self,
        project_id: Uuid,
        original_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir = self.project_dir(project_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension_for(original_name)));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        if let Err(e) = file.write_all(data).await {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }
        file.flush().await?;

        tracing::debug!(path = %path.display(), size = data.len(), "stored upload");
        Ok(path)
    }

    /// Remove a stored file. Returns `false` when it was already gone.
    pub async fn remove_file(&self, path: &Path) -> Result<bool, StorageError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Recursively remove a project's directory. Returns `false` when it did not exist.
    pub async fn remove_project_dir(&self, project_id: Uuid) -> Result<bool, StorageError> {
        match fs::remove_dir_all(self.project_dir(project_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Public URL for a stored file, built from the project id and the stored
    /// base name only.
    pub fn public_url(&self, project_id: Uuid, stored_path: &str) -> String {
        let file_name = Path::new(stored_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!(
            "{}/{}/{}/{}",
            self.url_prefix.trim_end_matches('/'),
            IMAGES_DIR,
            project_id,
            file_name
        )
    }
}

/// Lower-cased extension of `filename`, or `bin` when it has none or it is
/// not plain ASCII alphanumerics.
pub fn extension_for(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
