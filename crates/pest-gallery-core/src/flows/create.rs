//! Create dialog: form state and the `Closed -> Editing -> Submitting` machine.

use super::FormField;
use crate::error::GalleryError;
use pest_gallery_protocol::{Category, CreatePestRequest};
use std::path::PathBuf;

/// Label for the unselected category option.
pub const CATEGORY_PLACEHOLDER: &str = "Select a category";

/// Values typed into the create dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub name: String,
    pub description: String,
    pub text: String,
    /// `None` is the placeholder option; submission resolves it to the default.
    pub category: Option<Category>,
    /// Path to a local image file.
    pub image_path: String,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            text: String::new(),
            category: Some(Category::default()),
            image_path: String::new(),
        }
    }
}

impl CreateForm {
    /// Text buffer behind a field; `Category` has none.
    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Text => Some(&mut self.text),
            FormField::Image => Some(&mut self.image_path),
            FormField::Category => None,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
            FormField::Text => &self.text,
            FormField::Image => &self.image_path,
            FormField::Category => self.category_label(),
        }
    }

    pub fn category_label(&self) -> &'static str {
        self.category.map_or(CATEGORY_PLACEHOLDER, |category| category.label())
    }

    /// Cycle placeholder -> negative -> positive -> neutral -> placeholder.
    pub fn cycle_category(&mut self, forward: bool) {
        let options: Vec<Option<Category>> = std::iter::once(None)
            .chain(Category::ALL.into_iter().map(Some))
            .collect();
        let index = options
            .iter()
            .position(|option| *option == self.category)
            .unwrap_or(0);
        let len = options.len();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        self.category = options[next];
    }
}

/// A validated create request waiting for its image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubmission {
    pub name: String,
    pub description: String,
    pub text: String,
    pub category: Category,
    pub image_path: PathBuf,
}

impl CreateSubmission {
    /// Build the POST body once the image host returned `image_url`.
    pub fn into_request(self, image_url: String) -> CreatePestRequest {
        CreatePestRequest {
            name: self.name,
            description: self.description,
            text: (!self.text.trim().is_empty()).then_some(self.text),
            image_url,
            category: self.category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CreateDialog {
    #[default]
    Closed,
    Editing {
        form: CreateForm,
        error: Option<GalleryError>,
    },
    Submitting {
        form: CreateForm,
    },
}

impl CreateDialog {
    pub fn open(&mut self) {
        *self = CreateDialog::Editing {
            form: CreateForm::default(),
            error: None,
        };
    }

    pub fn close(&mut self) {
        *self = CreateDialog::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, CreateDialog::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, CreateDialog::Submitting { .. })
    }

    pub fn form(&self) -> Option<&CreateForm> {
        match self {
            CreateDialog::Closed => None,
            CreateDialog::Editing { form, .. } | CreateDialog::Submitting { form } => Some(form),
        }
    }

    /// Form is only editable while not submitting.
    pub fn form_mut(&mut self) -> Option<&mut CreateForm> {
        match self {
            CreateDialog::Editing { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GalleryError> {
        match self {
            CreateDialog::Editing { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    /// Validate the form and move to `Submitting`.
    ///
    /// Without an image the dialog stays in `Editing` with
    /// [`GalleryError::MissingImage`] and nothing is sent anywhere.
    pub fn begin_submit(&mut self) -> Result<CreateSubmission, GalleryError> {
        let CreateDialog::Editing { form, error } = self else {
            return Err(GalleryError::Cancelled);
        };
        let image_path = form.image_path.trim();
        if image_path.is_empty() {
            *error = Some(GalleryError::MissingImage);
            return Err(GalleryError::MissingImage);
        }
        let submission = CreateSubmission {
            name: form.name.clone(),
            description: form.description.clone(),
            text: form.text.clone(),
            category: form.category.unwrap_or_default(),
            image_path: PathBuf::from(image_path),
        };
        let form = std::mem::take(form);
        *self = CreateDialog::Submitting { form };
        Ok(submission)
    }

    /// Apply a finished submission. Results for a dialog that was closed in
    /// the meantime are dropped.
    pub fn finish<T>(&mut self, result: &Result<T, GalleryError>) {
        let CreateDialog::Submitting { form } = self else {
            return;
        };
        match result {
            Ok(_) => *self = CreateDialog::Closed,
            Err(err) => {
                let form = std::mem::take(form);
                *self = CreateDialog::Editing {
                    form,
                    error: Some(err.clone()),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled_dialog() -> CreateDialog {
        let mut dialog = CreateDialog::default();
        dialog.open();
        let form = dialog.form_mut().expect("editing");
        form.name = "Aphid".to_string();
        form.description = "d".to_string();
        dialog
    }

    #[test]
    fn new_form_defaults_to_negative() {
        assert_eq!(CreateForm::default().category, Some(Category::Negative));
    }

    #[test]
    fn submit_without_image_stays_editing() {
        let mut dialog = filled_dialog();

        let err = dialog.begin_submit().expect_err("no image");

        assert_eq!(err, GalleryError::MissingImage);
        assert!(!dialog.is_submitting());
        assert_eq!(dialog.error(), Some(&GalleryError::MissingImage));
        assert_eq!(dialog.form().map(|form| form.name.as_str()), Some("Aphid"));
    }

    #[test]
    fn placeholder_category_resolves_to_default() {
        let mut dialog = filled_dialog();
        let form = dialog.form_mut().expect("editing");
        form.image_path = "aphid.jpg".to_string();
        form.category = None;
        assert_eq!(form.category_label(), CATEGORY_PLACEHOLDER);

        let submission = dialog.begin_submit().expect("valid");
        assert_eq!(submission.category, Category::Negative);
        assert!(dialog.is_submitting());
        assert!(dialog.form_mut().is_none());
    }

    #[test]
    fn request_omits_empty_note() {
        let submission = CreateSubmission {
            name: "Aphid".to_string(),
            description: "d".to_string(),
            text: " ".to_string(),
            category: Category::Negative,
            image_path: PathBuf::from("a.jpg"),
        };
        let request = submission.clone().into_request("https://x/y.jpg".to_string());
        assert_eq!(request.text, None);

        let with_note = CreateSubmission {
            text: "seen in May".to_string(),
            ..submission
        }
        .into_request("https://x/y.jpg".to_string());
        assert_eq!(with_note.text.as_deref(), Some("seen in May"));
    }

    #[test]
    fn failure_returns_to_editing_with_error() {
        let mut dialog = filled_dialog();
        dialog.form_mut().expect("editing").image_path = "a.png".to_string();
        dialog.begin_submit().expect("valid");

        let failure: Result<(), GalleryError> = Err(GalleryError::Upload("boom".to_string()));
        dialog.finish(&failure);

        assert_eq!(dialog.error(), Some(&GalleryError::Upload("boom".to_string())));
        assert_eq!(dialog.form().map(|form| form.image_path.as_str()), Some("a.png"));
    }

    #[test]
    fn success_closes_and_late_results_are_ignored() {
        let mut dialog = filled_dialog();
        dialog.form_mut().expect("editing").image_path = "a.png".to_string();
        dialog.begin_submit().expect("valid");
        dialog.finish(&Ok::<(), GalleryError>(()));
        assert!(!dialog.is_open());

        dialog.finish(&Err::<(), _>(GalleryError::Cancelled));
        assert_eq!(dialog, CreateDialog::Closed);
    }

    #[test]
    fn category_cycles_through_placeholder() {
        let mut form = CreateForm::default();
        form.cycle_category(true);
        assert_eq!(form.category, Some(Category::Positive));
        form.cycle_category(true);
        form.cycle_category(true);
        assert_eq!(form.category, None);
        form.cycle_category(false);
        assert_eq!(form.category, Some(Category::Neutral));
    }
}
