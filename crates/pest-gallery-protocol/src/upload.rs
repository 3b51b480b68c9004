//! Types exchanged with the external image host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary image selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name sent in the multipart part.
    pub file_name: String,
    /// MIME type, always `image/*`.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Successful upload response.
///
/// Only `secure_url` is required; the remaining fields are kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}
