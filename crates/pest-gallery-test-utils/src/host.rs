use async_trait::async_trait;
use parking_lot::Mutex;
use pest_gallery_core::{GalleryError, ImageHost};
use pest_gallery_protocol::{ImageFile, UploadedImage};

/// Image host that accepts everything and answers with a fixed URL.
#[derive(Debug)]
pub struct StaticImageHost {
    secure_url: String,
    uploads: Mutex<Vec<ImageFile>>,
}

impl StaticImageHost {
    pub fn new(secure_url: impl Into<String>) -> Self {
        Self {
            secure_url: secure_url.into(),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn uploads(&self) -> Vec<ImageFile> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl ImageHost for StaticImageHost {
    async fn upload(&self, image: ImageFile) -> Result<UploadedImage, GalleryError> {
        self.uploads.lock().push(image);
        Ok(UploadedImage {
            secure_url: self.secure_url.clone(),
            public_id: None,
            format: None,
            bytes: None,
        })
    }
}

/// Image host that rejects every upload.
#[derive(Debug, Default)]
pub struct FailingImageHost {
    attempts: Mutex<usize>,
}

impl FailingImageHost {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl ImageHost for FailingImageHost {
    async fn upload(&self, _image: ImageFile) -> Result<UploadedImage, GalleryError> {
        *self.attempts.lock() += 1;
        Err(GalleryError::Upload("status 400: Upload preset not found".to_string()))
    }
}
