//! Debounced autosave: a sans-IO controller plus the task that drives it.

pub mod controller;
pub mod driver;
pub mod metadata;

pub use controller::{AutosaveConfig, AutosaveController, SaveRequest, SaveStatus};
pub use driver::{spawn_autosave, AutosaveEvent, AutosaveHandle};
pub use metadata::MetadataDebouncer;
