//! TUI event types for input, cache updates, and flow results.

use crossterm::event::KeyEvent;
use pest_gallery_core::GalleryError;
use pest_gallery_core::cache::KeyState;
use pest_gallery_protocol::{Record, RecordId};

/// Application event emitted by input handlers, cache watchers, or flows.
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input event.
    Input(KeyEvent),
    /// Periodic tick event.
    Tick,
    /// The collection cache entry changed.
    Collection(KeyState<Vec<Record>>),
    /// A single record cache entry changed.
    Record(RecordId, KeyState<Record>),
    Created(Result<Option<Record>, GalleryError>),
    Updated(Result<Option<Record>, GalleryError>),
    Deleted(Result<(), GalleryError>),
}
