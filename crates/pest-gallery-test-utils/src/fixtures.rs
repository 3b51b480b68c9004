use pest_gallery_protocol::{Category, Record, RecordId};
use std::path::{Path, PathBuf};

/// A record with predictable name and image URL derived from `id`.
pub fn record(id: &str, category: Category, description: &str) -> Record {
    Record {
        id: RecordId::new(id),
        name: format!("pest {id}"),
        description: description.to_string(),
        text: String::new(),
        image_url: format!("https://img.test/{id}.jpg"),
        category,
    }
}

/// Write a tiny fake image named `file_name` under `dir`.
pub fn write_image(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).expect("write test image");
    path
}
