//! Gallery view model: client-side filtering, selection, and truncation.

use crate::cache::KeyState;
use crate::route::Route;
use pest_gallery_protocol::{CategoryFilter, Record};

/// Default number of description characters shown before clipping.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 100;

/// What the gallery should render for the current collection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<'a> {
    /// No data and no error yet.
    Loading,
    /// The first load failed; nothing cached to show.
    Failed(String),
    /// Loaded, but the filter leaves nothing to show.
    Empty,
    Ready(Vec<&'a Record>),
}

/// A description as it appears in a gallery card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description<'a> {
    Full(&'a str),
    /// Longer than the limit; the full text lives on the detail screen.
    Clipped { preview: String },
}

impl Description<'_> {
    pub fn has_read_more(&self) -> bool {
        matches!(self, Description::Clipped { .. })
    }

    pub fn text(&self) -> &str {
        match self {
            Description::Full(text) => text,
            Description::Clipped { preview } => preview,
        }
    }
}

/// Clip `text` to `limit` characters. Lengths are counted in chars so
/// multi-byte text is never split mid-character.
pub fn truncate_description(text: &str, limit: usize) -> Description<'_> {
    match text.char_indices().nth(limit) {
        None => Description::Full(text),
        Some((cut, _)) => Description::Clipped {
            preview: format!("{}...", text[..cut].trim_end()),
        },
    }
}

/// Filter and selection state for the gallery screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    filter: CategoryFilter,
    selected: usize,
    description_limit: usize,
}

impl Default for GalleryView {
    fn default() -> Self {
        Self::new(CategoryFilter::All, DEFAULT_DESCRIPTION_LIMIT)
    }
}

impl GalleryView {
    pub fn new(filter: CategoryFilter, description_limit: usize) -> Self {
        Self {
            filter,
            selected: 0,
            description_limit: description_limit.max(1),
        }
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    /// Change the filter; selection restarts at the top.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.selected = 0;
        }
    }

    pub fn next_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    pub fn prev_filter(&mut self) {
        self.set_filter(self.filter.prev());
    }

    pub fn description_limit(&self) -> usize {
        self.description_limit
    }

    /// Records matching the active filter, in collection order.
    pub fn displayed<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records
            .iter()
            .filter(|record| self.filter.matches(record.category))
            .collect()
    }

    /// Classify the collection state for rendering.
    ///
    /// Cached data wins over a later refresh error.
    pub fn load_state<'a>(&self, state: &'a KeyState<Vec<Record>>) -> LoadState<'a> {
        match (&state.data, &state.error) {
            (Some(records), _) => {
                let shown = self.displayed(records);
                if shown.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Ready(shown)
                }
            }
            (None, Some(err)) => LoadState::Failed(err.to_string()),
            (None, None) => LoadState::Loading,
        }
    }

    /// Error from a refresh that failed while older data is still shown.
    pub fn refresh_error<'a>(&self, state: &'a KeyState<Vec<Record>>) -> Option<&'a str> {
        match (&state.data, &state.error) {
            (Some(_), Some(_)) => Some("Refresh failed; showing cached pests"),
            _ => None,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn selected_record<'a>(&self, records: &'a [Record]) -> Option<&'a Record> {
        self.displayed(records).get(self.selected).copied()
    }

    pub fn description<'a>(&self, record: &'a Record) -> Description<'a> {
        truncate_description(&record.description, self.description_limit)
    }

    /// Detail route for "read more", offered only when the description is clipped.
    pub fn read_more_target(&self, record: &Record) -> Option<Route> {
        self.description(record)
            .has_read_more()
            .then(|| Route::Detail(record.id.clone()))
    }
}
