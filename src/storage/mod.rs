//! Source image storage.
//!
//! The optimizer reads original images through the [`ImageSource`] trait.
//! [`FsImageSource`] serves them from a single folder on local disk, where the
//! image identifier is the file name.

mod fs_source;

pub use fs_source::FsImageSource;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IoError;

/// Read access to stored source images.
///
/// Implementations must return [`IoError::NotFound`] when the identifier does
/// not resolve to a stored file.
#[async_trait]
pub trait ImageSource: Send + Sync + 'static {
    /// Read the raw bytes of the image named `image_id`.
    async fn read(&self, image_id: &str) -> Result<Bytes, IoError>;
}
