//! Edit dialog pre-filled from an existing record.

use super::FormField;
use crate::error::GalleryError;
use pest_gallery_protocol::{Category, Record, RecordId, UpdatePestRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub name: String,
    pub description: String,
    pub text: String,
    pub category: Category,
    /// Not editable; sent back unchanged.
    pub image_url: String,
}

impl EditForm {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            text: record.text.clone(),
            category: record.category,
            image_url: record.image_url.clone(),
        }
    }

    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Text => Some(&mut self.text),
            FormField::Category | FormField::Image => None,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
            FormField::Text => &self.text,
            FormField::Category => self.category.label(),
            FormField::Image => &self.image_url,
        }
    }

    pub fn cycle_category(&mut self, forward: bool) {
        let all = Category::ALL;
        let index = all
            .iter()
            .position(|category| *category == self.category)
            .unwrap_or(0);
        let next = if forward {
            (index + 1) % all.len()
        } else {
            (index + all.len() - 1) % all.len()
        };
        self.category = all[next];
    }

    fn to_request(&self) -> UpdatePestRequest {
        UpdatePestRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category,
            image_url: self.image_url.clone(),
            text: Some(self.text.clone()),
        }
    }
}

/// Full replacement for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSubmission {
    pub id: RecordId,
    pub request: UpdatePestRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditDialog {
    #[default]
    Closed,
    Editing {
        id: RecordId,
        form: EditForm,
        error: Option<GalleryError>,
    },
    Submitting {
        id: RecordId,
        form: EditForm,
    },
}

impl EditDialog {
    pub fn open(&mut self, record: &Record) {
        *self = EditDialog::Editing {
            id: record.id.clone(),
            form: EditForm::from_record(record),
            error: None,
        };
    }

    pub fn close(&mut self) {
        *self = EditDialog::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, EditDialog::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, EditDialog::Submitting { .. })
    }

    pub fn id(&self) -> Option<&RecordId> {
        match self {
            EditDialog::Closed => None,
            EditDialog::Editing { id, .. } | EditDialog::Submitting { id, .. } => Some(id),
        }
    }

    pub fn form(&self) -> Option<&EditForm> {
        match self {
            EditDialog::Closed => None,
            EditDialog::Editing { form, .. } | EditDialog::Submitting { form, .. } => Some(form),
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut EditForm> {
        match self {
            EditDialog::Editing { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GalleryError> {
        match self {
            EditDialog::Editing { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    pub fn begin_submit(&mut self) -> Result<EditSubmission, GalleryError> {
        let EditDialog::Editing { id, form, .. } = self else {
            return Err(GalleryError::Cancelled);
        };
        let submission = EditSubmission {
            id: id.clone(),
            request: form.to_request(),
        };
        *self = EditDialog::Submitting {
            id: submission.id.clone(),
            form: std::mem::take(form),
        };
        Ok(submission)
    }

    /// Close on success; keep the form open with the error for a retry.
    pub fn finish<T>(&mut self, result: &Result<T, GalleryError>) {
        let EditDialog::Submitting { id, form } = self else {
            return;
        };
        match result {
            Ok(_) => *self = EditDialog::Closed,
            Err(err) => {
                *self = EditDialog::Editing {
                    id: id.clone(),
                    form: std::mem::take(form),
                    error: Some(err.clone()),
                };
            }
        }
    }
}
