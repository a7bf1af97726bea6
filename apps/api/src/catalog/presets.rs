//! User presets: raw HTML snapshots of an editor selection, persisted as a
//! JSON file. Presets are never mutated once captured, and each one is only
//! visible to the user who captured it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::CatalogError;
use crate::editor::Editor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub html: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PresetFile {
    presets: Vec<Preset>,
}

#[derive(Debug)]
pub struct PresetLibrary {
    path: PathBuf,
    presets: Vec<Preset>,
}

impl PresetLibrary {
    /// Loads the library at `path`. A missing file is an empty library.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let presets = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<PresetFile>(&bytes)?.presets,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!("Loaded {} presets from {}", presets.len(), path.display());
        Ok(Self { path, presets })
    }

    /// The user's presets in capture order.
    pub fn list_for(&self, user_id: Uuid) -> impl Iterator<Item = &Preset> {
        self.presets.iter().filter(move |p| p.user_id == user_id)
    }

    /// Someone else's preset reads as missing.
    pub fn get(&self, user_id: Uuid, id: Uuid) -> Option<&Preset> {
        self.list_for(user_id).find(|p| p.id == id)
    }

    /// Stores the editor's current selection verbatim. It already lives
    /// inside the sanitized document, so it is not re-sanitized.
    pub fn capture(
        &mut self,
        user_id: Uuid,
        name: &str,
        editor: &Editor,
    ) -> Result<&Preset, CatalogError> {
        let html = editor.selection_html().ok_or(CatalogError::EmptySelection)?;
        let name = match name.trim() {
            "" => format!("프리셋 {}", self.list_for(user_id).count() + 1),
            trimmed => trimmed.to_string(),
        };
        self.presets.push(Preset {
            id: Uuid::new_v4(),
            user_id,
            name,
            html,
            created_at: Utc::now(),
        });
        self.persist()?;
        let index = self.presets.len() - 1;
        Ok(&self.presets[index])
    }

    /// Inserts the preset's raw HTML at the caret. Returns the index of the
    /// first inserted node.
    pub fn insert(&self, user_id: Uuid, id: Uuid, editor: &mut Editor) -> Result<usize, CatalogError> {
        let preset = self
            .get(user_id, id)
            .ok_or(CatalogError::PresetNotFound(id))?;
        Ok(editor.insert_html(&preset.html))
    }

    fn persist(&self) -> Result<(), CatalogError> {
        let file = PresetFile {
            presets: self.presets.clone(),
        };
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&file)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
