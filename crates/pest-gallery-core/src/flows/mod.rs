//! Mutation flows. Every successful write refreshes the collection through
//! the store instead of editing cached data in place.

pub mod create;
pub mod delete;
pub mod edit;

pub use create::{CreateDialog, CreateForm, CreateSubmission};
pub use delete::DeletePrompt;
pub use edit::{EditDialog, EditForm, EditSubmission};

use crate::error::GalleryError;
use crate::image_host::{ImageHost, load_image};
use crate::store::RecordStore;
use log::{error, info, warn};
use pest_gallery_protocol::{Record, RecordId};
use std::sync::Arc;

/// Input fields shared by the create and edit forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Description,
    Text,
    Category,
    Image,
}

impl FormField {
    pub const CREATE: [FormField; 5] = [
        FormField::Name,
        FormField::Description,
        FormField::Text,
        FormField::Category,
        FormField::Image,
    ];
    /// The hosted image is carried through edits unchanged.
    pub const EDIT: [FormField; 4] = [
        FormField::Name,
        FormField::Description,
        FormField::Text,
        FormField::Category,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Description => "Description",
            FormField::Text => "Text",
            FormField::Category => "Category",
            FormField::Image => "Image file",
        }
    }

    /// Step through `fields`, wrapping at both ends.
    pub fn step(self, fields: &[FormField], forward: bool) -> FormField {
        let Some(index) = fields.iter().position(|field| *field == self) else {
            return fields.first().copied().unwrap_or(self);
        };
        let len = fields.len();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        fields[next]
    }
}

/// Runs create, update, and delete against the backend and keeps the
/// store's collection in sync afterwards.
#[derive(Clone)]
pub struct GalleryActions {
    store: RecordStore,
    host: Arc<dyn ImageHost>,
}

impl GalleryActions {
    pub fn new(store: RecordStore, host: Arc<dyn ImageHost>) -> Self {
        Self { store, host }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Upload the image, then create the record.
    ///
    /// Nothing is written to the backend unless the upload produced a URL.
    pub async fn create(&self, submission: CreateSubmission) -> Result<Option<Record>, GalleryError> {
        let image = load_image(&submission.image_path).await?;
        let uploaded = self.host.upload(image).await.inspect_err(|err| {
            error!("image upload failed, record not created (error={err})");
        })?;
        let request = submission.into_request(uploaded.secure_url);
        let created = self
            .store
            .api()
            .create(&request)
            .await
            .inspect_err(|err| error!("create failed (error={err})"))?;
        info!(
            "record created (id={})",
            created
                .as_ref()
                .map(|record| record.id.as_str())
                .unwrap_or("unknown")
        );
        self.refresh_collection().await;
        Ok(created)
    }

    /// Replace a record's editable fields.
    pub async fn update(&self, submission: EditSubmission) -> Result<Option<Record>, GalleryError> {
        let EditSubmission { id, request } = submission;
        let updated = self
            .store
            .api()
            .update(&id, &request)
            .await
            .inspect_err(|err| error!("update failed (id={id}, error={err})"))?;
        info!("record updated (id={id})");
        self.store.invalidate_record(&id);
        self.refresh_collection().await;
        Ok(updated)
    }

    /// Delete a record; the caller is responsible for confirmation.
    pub async fn delete(&self, id: &RecordId) -> Result<(), GalleryError> {
        self.store
            .api()
            .delete(id)
            .await
            .inspect_err(|err| error!("delete failed (id={id}, error={err})"))?;
        info!("record deleted (id={id})");
        self.store.forget_record(id);
        self.refresh_collection().await;
        Ok(())
    }

    /// A failed refresh does not undo a successful write; the stored error
    /// surfaces through the collection state instead.
    async fn refresh_collection(&self) {
        if let Err(err) = self.store.revalidate().await {
            warn!("collection refresh after write failed (error={err})");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_steps_wrap() {
        assert_eq!(
            FormField::Image.step(&FormField::CREATE, true),
            FormField::Name
        );
        assert_eq!(
            FormField::Name.step(&FormField::EDIT, false),
            FormField::Category
        );
        assert_eq!(
            FormField::Image.step(&FormField::EDIT, true),
            FormField::Name
        );
    }
}
