//! Test helpers shared across pest gallery crates.

pub mod api;
pub mod fixtures;
pub mod host;

pub use api::{ApiCalls, InMemoryPestApi};
pub use fixtures::{record, write_image};
pub use host::{FailingImageHost, StaticImageHost};
