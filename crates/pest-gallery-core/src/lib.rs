//! Data synchronization core for the pest gallery.
//!
//! This crate owns the revalidating record cache, the REST and image host
//! clients, the gallery/detail view models, and the create/edit/delete flows
//! that funnel every write back through cache invalidation.

pub mod api;
pub mod cache;
pub mod detail;
pub mod error;
pub mod flows;
pub mod gallery;
pub mod image_host;
pub mod route;
pub mod store;
pub mod task;

pub use api::{HttpPestApi, PestApi};
pub use cache::{KeyState, SwrCache};
pub use error::GalleryError;
pub use flows::GalleryActions;
pub use image_host::{CloudinaryHost, ImageHost};
pub use route::{Route, Router};
pub use store::{CollectionKey, RecordStore};
pub use task::FlowTask;
