//! Configuration schema for the pest gallery.

use pest_gallery_protocol::CategoryFilter;
use serde::{Deserialize, Serialize};

/// Root config for the pest gallery client.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PestGalleryConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub image_host: ImageHostConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// REST backend location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Collection endpoint, e.g. `http://localhost:8080/api/v1/pest`.
    pub fn collection_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{base}/pest")
        } else {
            format!("{base}/{prefix}/pest")
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Unsigned image upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageHostConfig {
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    #[serde(default = "default_upload_preset")]
    pub upload_preset: String,
    #[serde(default = "default_upload_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageHostConfig {
    fn default() -> Self {
        Self {
            upload_url: default_upload_url(),
            upload_preset: default_upload_preset(),
            timeout_secs: default_upload_timeout_secs(),
        }
    }
}

fn default_upload_url() -> String {
    "https://api.cloudinary.com/v1_1/dtobkagh6/image/upload".to_string()
}

fn default_upload_preset() -> String {
    "gallery".to_string()
}

fn default_upload_timeout_secs() -> u64 {
    120
}

/// Gallery presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GalleryConfig {
    /// Descriptions longer than this many characters are clipped.
    #[serde(default = "default_description_limit")]
    pub description_limit: usize,
    #[serde(default)]
    pub default_filter: CategoryFilter,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            description_limit: default_description_limit(),
            default_filter: CategoryFilter::All,
        }
    }
}

fn default_description_limit() -> usize {
    100
}

/// Revalidating cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Refresh in the background whenever a cached key is read.
    #[serde(default)]
    pub revalidate_on_read: bool,
}
