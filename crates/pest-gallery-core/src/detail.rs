//! Detail view model for a single record.

use crate::cache::KeyState;
use pest_gallery_protocol::{Record, RecordId};

/// Message shown when the record cannot be loaded.
pub const DETAIL_LOAD_FAILED: &str = "Failed to load pest details";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState<'a> {
    Loading,
    Failed { message: &'static str, cause: String },
    Ready(&'a Record),
}

/// Read-only view over one record's cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    id: RecordId,
}

impl DetailView {
    pub fn new(id: RecordId) -> Self {
        Self { id }
    }

    /// Classify the record entry. Data for any other id is treated as not
    /// yet loaded.
    pub fn state<'a>(&self, state: &'a KeyState<Record>) -> DetailState<'a> {
        let data = state.data.as_ref().filter(|record| record.id == self.id);
        match (data, &state.error) {
            (Some(record), _) => DetailState::Ready(record),
            (None, Some(err)) => DetailState::Failed {
                message: DETAIL_LOAD_FAILED,
                cause: err.to_string(),
            },
            (None, None) => DetailState::Loading,
        }
    }

    /// The note is optional on older records.
    pub fn note(record: &Record) -> Option<&str> {
        let note = record.text.trim();
        (!note.is_empty()).then_some(note)
    }
}
