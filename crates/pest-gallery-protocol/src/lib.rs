//! Wire types shared between the pest gallery backend client and its views.

mod category;
mod upload;

pub use category::{Category, CategoryFilter, ParseCategoryError};
pub use upload::{ImageFile, UploadedImage};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier assigned to a record by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a backend-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single pest entry as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Backend identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    /// Display name.
    pub name: String,
    /// Short description shown in the gallery.
    #[serde(default)]
    pub description: String,
    /// Free-form note shown only on the detail screen.
    #[serde(default)]
    pub text: String,
    /// Hosted image location produced by the image host.
    #[serde(default)]
    pub image_url: String,
    /// Classification of the pest.
    pub category: Category,
}

/// Payload for `POST /api/v1/pest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePestRequest {
    pub name: String,
    pub description: String,
    /// Only sent when the note is non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub image_url: String,
    pub category: Category,
}

/// Payload for `PUT /api/v1/pest/{id}`; replaces every mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePestRequest {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl UpdatePestRequest {
    /// Apply this replacement to a record, keeping its identifier.
    pub fn apply_to(&self, record: &mut Record) {
        record.name.clone_from(&self.name);
        record.description.clone_from(&self.description);
        record.category = self.category;
        record.image_url.clone_from(&self.image_url);
        if let Some(text) = &self.text {
            record.text.clone_from(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn record_decodes_backend_shape() {
        let record: Record = serde_json::from_value(json!({
            "_id": "65f0",
            "name": "Aphid",
            "description": "sap sucker",
            "imageUrl": "https://x/y.jpg",
            "category": "negative",
            "__v": 0
        }))
        .expect("record");

        assert_eq!(record.id, RecordId::new("65f0"));
        assert_eq!(record.text, "");
        assert_eq!(record.category, Category::Negative);
    }

    #[test]
    fn record_rejects_unknown_category() {
        let err = serde_json::from_value::<Record>(json!({
            "_id": "1",
            "name": "Aphid",
            "category": "harmful"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown variant"));
    }

    #[test]
    fn create_request_omits_empty_note() {
        let request = CreatePestRequest {
            name: "Aphid".to_string(),
            description: "d".to_string(),
            text: None,
            image_url: "https://x/y.jpg".to_string(),
            category: Category::Negative,
        };
        assert_eq!(
            serde_json::to_value(&request).expect("encode"),
            json!({
                "name": "Aphid",
                "description": "d",
                "imageUrl": "https://x/y.jpg",
                "category": "negative"
            })
        );
    }

    #[test]
    fn update_request_replaces_mutable_fields() {
        let mut record = Record {
            id: RecordId::new("1"),
            name: "Aphid".to_string(),
            description: "old".to_string(),
            text: "note".to_string(),
            image_url: "https://x/y.jpg".to_string(),
            category: Category::Negative,
        };
        let update = UpdatePestRequest {
            name: "Ladybird".to_string(),
            description: "eats aphids".to_string(),
            category: Category::Positive,
            image_url: record.image_url.clone(),
            text: None,
        };
        update.apply_to(&mut record);

        assert_eq!(record.id, RecordId::new("1"));
        assert_eq!(record.name, "Ladybird");
        assert_eq!(record.category, Category::Positive);
        assert_eq!(record.text, "note");
    }
}
