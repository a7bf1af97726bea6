//! Static templates and user presets, both inserted through the editor.

pub mod handlers;
pub mod presets;
pub mod templates;

use thiserror::Error;
use uuid::Uuid;

pub use presets::{Preset, PresetLibrary};
pub use templates::{apply_template, find_template, templates, Template};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("선택된 내용이 없습니다.")]
    EmptySelection,

    #[error("template '{0}' does not exist")]
    TemplateNotFound(String),

    #[error("preset {0} does not exist")]
    PresetNotFound(Uuid),

    #[error("preset store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preset store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}
