//! Delete confirmation prompt.

use crate::error::GalleryError;
use pest_gallery_protocol::{Record, RecordId};

/// Deletion is irreversible, so it always passes through `Confirming`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeletePrompt {
    #[default]
    Idle,
    Confirming {
        id: RecordId,
        name: String,
    },
    Deleting {
        id: RecordId,
        name: String,
    },
}

impl DeletePrompt {
    /// Ask for confirmation before deleting `record`.
    pub fn request(&mut self, record: &Record) {
        if matches!(self, DeletePrompt::Deleting { .. }) {
            return;
        }
        *self = DeletePrompt::Confirming {
            id: record.id.clone(),
            name: record.name.clone(),
        };
    }

    /// Confirm the pending prompt, returning the id to delete.
    pub fn confirm(&mut self) -> Option<RecordId> {
        let DeletePrompt::Confirming { id, name } = self else {
            return None;
        };
        let id = id.clone();
        let name = std::mem::take(name);
        *self = DeletePrompt::Deleting {
            id: id.clone(),
            name,
        };
        Some(id)
    }

    pub fn cancel(&mut self) {
        if matches!(self, DeletePrompt::Confirming { .. }) {
            *self = DeletePrompt::Idle;
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, DeletePrompt::Idle)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            DeletePrompt::Idle => None,
            DeletePrompt::Confirming { name, .. } | DeletePrompt::Deleting { name, .. } => {
                Some(name)
            }
        }
    }

    /// Return to idle; a failure is handed back for display.
    pub fn finish(&mut self, result: Result<(), GalleryError>) -> Option<GalleryError> {
        if !matches!(self, DeletePrompt::Deleting { .. }) {
            return None;
        }
        *self = DeletePrompt::Idle;
        result.err()
    }

    pub fn confirmation_message(&self) -> Option<String> {
        match self {
            DeletePrompt::Confirming { name, .. } => {
                Some(format!("Are you sure you want to delete {name}?"))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pest_gallery_protocol::Category;
    use pretty_assertions::assert_eq;

    fn moth() -> Record {
        Record {
            id: RecordId::new("m1"),
            name: "Moth".to_string(),
            description: String::new(),
            text: String::new(),
            image_url: String::new(),
            category: Category::Neutral,
        }
    }

    #[test]
    fn confirm_yields_id_once() {
        let mut prompt = DeletePrompt::default();
        prompt.request(&moth());
        assert_eq!(
            prompt.confirmation_message().as_deref(),
            Some("Are you sure you want to delete Moth?")
        );

        assert_eq!(prompt.confirm(), Some(RecordId::new("m1")));
        assert_eq!(prompt.confirm(), None);
        assert_eq!(prompt.name(), Some("Moth"));
    }

    #[test]
    fn cancel_sends_nothing() {
        let mut prompt = DeletePrompt::default();
        prompt.request(&moth());
        prompt.cancel();
        assert_eq!(prompt, DeletePrompt::Idle);
        assert_eq!(prompt.confirm(), None);
    }

    #[test]
    fn failure_is_surfaced() {
        let mut prompt = DeletePrompt::default();
        prompt.request(&moth());
        prompt.confirm();

        let err = prompt.finish(Err(GalleryError::Transport {
            url: "http://api/pest/m1".to_string(),
            message: "refused".to_string(),
        }));

        assert!(err.is_some());
        assert!(!prompt.is_active());
    }
}
