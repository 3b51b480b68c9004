//! Error types for the gallery core crate.

use thiserror::Error;

/// Errors surfaced by reads, uploads, and writes.
///
/// Values are cloneable so a single failed fetch can be delivered to every
/// subscriber of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GalleryError {
    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    /// The server answered with a non-2xx status.
    #[error("{method} {url} returned status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    /// The image host rejected or failed the upload.
    #[error("image upload failed: {0}")]
    Upload(String),
    /// Create was submitted without an image.
    #[error("select an image before uploading")]
    MissingImage,
    /// The selected file cannot be uploaded as an image.
    #[error("invalid image: {0}")]
    InvalidImage(String),
    /// The flow was torn down before it finished.
    #[error("request cancelled")]
    Cancelled,
}

impl GalleryError {
    /// Whether the error came from local validation rather than the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, GalleryError::MissingImage | GalleryError::InvalidImage(_))
    }
}
