//! Folder-backed image source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::ImageSource;
use crate::error::IoError;

/// Serves source images from a folder on local disk.
///
/// The identifier `photo.jpg` maps to `<folder>/photo.jpg`. Identifiers that
/// could escape the folder are reported as not found.
///
/// # Example
///
/// ```ignore
/// use fly_images::storage::{FsImageSource, ImageSource};
///
/// let source = FsImageSource::new("/srv/images");
/// let bytes = source.read("photo.jpg").await?;
/// ```
#[derive(Debug, Clone)]
pub struct FsImageSource {
    folder: PathBuf,
}

impl FsImageSource {
    /// Create a source rooted at `folder`.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Get the folder images are read from.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Map an identifier to a path inside the folder.
    ///
    /// Returns `None` if the identifier is not a plain file name.
    pub fn resolve(&self, image_id: &str) -> Option<PathBuf> {
        if !is_plain_file_name(image_id) {
            return None;
        }
        Some(self.folder.join(image_id))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[async_trait]
impl ImageSource for FsImageSource {
    async fn read(&self, image_id: &str) -> Result<Bytes, IoError> {
        let path = self.resolve(image_id).ok_or_else(|| {
            debug!(image_id = image_id, "Rejected image identifier");
            IoError::NotFound(image_id.to_string())
        })?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(IoError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(IoError::Read(format!("{}: {}", path.display(), e))),
        }
    }
}
