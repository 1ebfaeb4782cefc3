use thiserror::Error;

/// I/O errors that can occur when reading source images from storage
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// No stored file backs the identifier
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The file exists but could not be read
    #[error("Read error: {0}")]
    Read(String),
}

/// Errors reported by a cache store
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The store could not be reached or refused the operation
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while producing an optimized image
#[derive(Debug, Clone, Error)]
pub enum OptimizeError {
    /// The requested image identifier has no backing file
    #[error("Image not found: {image_id}")]
    SourceNotFound { image_id: String },

    /// Storage failed for a reason other than a missing file
    #[error("I/O error: {0}")]
    Io(IoError),

    /// A requested crop or resize dimension exceeds the configured maximum
    #[error("Dimension {requested}px exceeds the maximum of {max}px")]
    DimensionTooLarge { requested: u32, max: u32 },

    /// Bytes from the cache or from storage are not a decodable image
    #[error("Failed to decode image: {message}")]
    DecodeFailure { message: String },

    /// The transformed image could not be serialized
    #[error("Failed to encode image: {message}")]
    EncodeFailure { message: String },

    /// The blocking transform task panicked or was cancelled
    #[error("Transform task failed: {0}")]
    Task(String),
}

impl OptimizeError {
    /// Map a storage error for `image_id`, turning a missing file into `SourceNotFound`.
    pub fn from_io(image_id: &str, err: IoError) -> Self {
        match err {
            IoError::NotFound(_) => OptimizeError::SourceNotFound {
                image_id: image_id.to_string(),
            },
            other => OptimizeError::Io(other),
        }
    }
}
