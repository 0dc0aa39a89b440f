use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::StyleId;

use super::model::StyleBertVits2Error;

/// Where a caller-facing style lives inside an installed voice model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleReference {
    pub model_id: String,
    /// Speaker index local to the model.
    pub speaker_local_id: u32,
    /// Style index local to the model.
    pub style_local_id: u32,
    pub style_name: String,
}

/// Installed voice models and the styles they provide.
pub trait ModelManager: Send + Sync {
    /// Resolve a caller-facing style ID. Unknown IDs fail with
    /// [`StyleBertVits2Error::StyleNotFound`].
    fn resolve_style(&self, style_id: StyleId) -> Result<StyleReference, StyleBertVits2Error>;

    /// IDs of every installed model.
    fn installed_model_ids(&self) -> Vec<String>;
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    style_id: StyleId,
    #[serde(flatten)]
    reference: StyleReference,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    styles: Vec<CatalogEntry>,
}

/// A fixed style table, typically read from a JSON file:
///
/// ```json
/// { "styles": [
///     { "style_id": 888753760, "model_id": "a59cb814-0083-4369-8542-f51a29e72af7",
///       "speaker_local_id": 0, "style_local_id": 0, "style_name": "ノーマル" }
/// ] }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: HashMap<StyleId, StyleReference>,
}

impl StyleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reference` under `style_id`, replacing any previous entry.
    pub fn insert(&mut self, style_id: StyleId, reference: StyleReference) {
        self.styles.insert(style_id, reference);
    }

    pub fn from_json(json: &str) -> Result<Self, StyleBertVits2Error> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| StyleBertVits2Error::Config(format!("Failed to parse JSON: {e}")))?;

        let mut catalog = Self::new();
        for entry in file.styles {
            if catalog.styles.contains_key(&entry.style_id) {
                return Err(StyleBertVits2Error::Config(format!(
                    "Duplicate style_id {}",
                    entry.style_id
                )));
            }
            catalog.insert(entry.style_id, entry.reference);
        }
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, StyleBertVits2Error> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        log::info!("Loaded {} styles from {}", catalog.styles.len(), path.display());
        Ok(catalog)
    }
}

impl ModelManager for StyleCatalog {
    fn resolve_style(&self, style_id: StyleId) -> Result<StyleReference, StyleBertVits2Error> {
        self.styles
            .get(&style_id)
            .cloned()
            .ok_or(StyleBertVits2Error::StyleNotFound(style_id))
    }

    fn installed_model_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .styles
            .values()
            .map(|reference| reference.model_id.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
