//! Upload client for the external image host.

use crate::error::GalleryError;
use async_trait::async_trait;
use log::{debug, info, warn};
use pest_gallery_config::ImageHostConfig;
use pest_gallery_protocol::{ImageFile, UploadedImage};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Destination for image bytes that returns a hosted URL.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload one image and return the hosted location.
    async fn upload(&self, image: ImageFile) -> Result<UploadedImage, GalleryError>;
}

/// Unsigned multipart uploader compatible with Cloudinary's upload API.
#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    client: Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudinaryHost {
    /// Build an uploader for the configured endpoint and preset.
    pub fn new(config: &ImageHostConfig) -> Result<Self, GalleryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| GalleryError::Upload(err.to_string()))?;
        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            upload_preset: config.upload_preset.clone(),
        })
    }
}

/// Pull the host's `error.message` out of a rejection body, falling back to
/// the raw text for non-JSON error pages.
fn rejection_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(message) = value.pointer("/error/message").and_then(Value::as_str)
    {
        return message.to_string();
    }
    let text = body.trim();
    if text.is_empty() {
        "no error message".to_string()
    } else {
        text.chars().take(200).collect()
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: ImageFile) -> Result<UploadedImage, GalleryError> {
        info!(
            "uploading image (file_name={}, bytes={})",
            image.file_name,
            image.bytes.len()
        );
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)
            .map_err(|err| GalleryError::InvalidImage(err.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| GalleryError::Upload(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("image host rejected upload (status={})", status.as_u16());
            return Err(GalleryError::Upload(format!(
                "status {}: {}",
                status.as_u16(),
                rejection_message(&body)
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|err| GalleryError::Upload(format!("unreadable response: {err}")))?;
        if !body.get("secure_url").is_some_and(Value::is_string) {
            return Err(GalleryError::Upload(
                "response missing secure_url".to_string(),
            ));
        }
        let uploaded: UploadedImage = serde_json::from_value(body)
            .map_err(|err| GalleryError::Upload(format!("unexpected response: {err}")))?;
        debug!("image uploaded (public_id={:?})", uploaded.public_id);
        Ok(uploaded)
    }
}

/// MIME type for an image file extension, if it is one we upload.
pub fn image_mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}

/// Read an image from disk for upload.
pub async fn load_image(path: &Path) -> Result<ImageFile, GalleryError> {
    let mime_type = image_mime_for(path).ok_or_else(|| {
        GalleryError::InvalidImage(format!("{} is not an image file", path.display()))
    })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| GalleryError::InvalidImage(format!("{}: {err}", path.display())))?;
    if bytes.is_empty() {
        return Err(GalleryError::InvalidImage(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(ImageFile {
        file_name,
        mime_type: mime_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(image_mime_for(Path::new("a/b.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime_for(Path::new("b.webp")), Some("image/webp"));
        assert_eq!(image_mime_for(Path::new("notes.txt")), None);
        assert_eq!(image_mime_for(Path::new("noext")), None);
    }

    #[test]
    fn rejection_message_prefers_host_error() {
        assert_eq!(
            rejection_message(r#"{"error":{"message":"Upload preset not found"}}"#),
            "Upload preset not found"
        );
        assert_eq!(
            rejection_message("<html>Bad Gateway</html>"),
            "<html>Bad Gateway</html>"
        );
        assert_eq!(rejection_message("  "), "no error message");
    }

    #[tokio::test]
    async fn load_image_reads_bytes() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("aphid.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).expect("write");

        let image = load_image(&path).await.expect("image");
        assert_eq!(image.file_name, "aphid.png");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes.len(), 4);
    }

    #[tokio::test]
    async fn load_image_rejects_missing_and_non_images() {
        let temp = tempdir().expect("tempdir");
        let missing = load_image(&temp.path().join("gone.jpg")).await;
        assert!(matches!(missing, Err(GalleryError::InvalidImage(_))));

        let text = temp.path().join("notes.txt");
        std::fs::write(&text, "hello").expect("write");
        let err = load_image(&text).await.expect_err("not an image");
        assert!(err.is_validation());
    }
}
