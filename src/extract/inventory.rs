//! Markup inventory extraction
//!
//! Site generators such as Hugo can write a JSON document listing every tag,
//! class and id they emitted while rendering:
//!
//! ```json
//! {
//!   "htmlElements": {
//!     "tags": ["a", "body", "div"],
//!     "classes": ["nav", "post-title"],
//!     "ids": ["main"]
//!   }
//! }
//! ```
//!
//! The inventory is trusted as-is: every listed token is considered used.

use super::{ExtractError, Extraction, Extractor};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tokens emitted by the site generator, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MarkupInventory {
    pub tags: Vec<String>,
    pub classes: Vec<String>,
    pub ids: Vec<String>,
}

#[derive(Deserialize)]
struct InventoryDocument {
    #[serde(rename = "htmlElements")]
    html_elements: MarkupInventory,
}

impl MarkupInventory {
    /// Parse an inventory document
    pub fn from_json(document: &str) -> Result<Self, ExtractError> {
        let parsed: InventoryDocument = serde_json::from_str(document)?;
        Ok(parsed.html_elements)
    }

    /// All tokens: tags, then classes, then ids. Duplicates are kept.
    pub fn tokens(&self) -> Vec<String> {
        self.tags
            .iter()
            .chain(&self.classes)
            .chain(&self.ids)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len() + self.classes.len() + self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extract used tokens straight from an inventory document
pub fn tokens_from_document(document: &str) -> Result<Vec<String>, ExtractError> {
    Ok(MarkupInventory::from_json(document)?.tokens())
}

/// Reads the inventory file written by the site generator
#[derive(Debug, Clone)]
pub struct InventoryExtractor {
    path: PathBuf,
}

impl InventoryExtractor {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Extractor for InventoryExtractor {
    fn extract(&self) -> Result<Extraction, ExtractError> {
        let document = fs::read_to_string(&self.path).map_err(|source| ExtractError::Io {
            path: self.path.clone(),
            source,
        })?;

        let inventory = MarkupInventory::from_json(&document)?;
        debug!(
            "Inventory {}: {} tags, {} classes, {} ids",
            self.path.display(),
            inventory.tags.len(),
            inventory.classes.len(),
            inventory.ids.len()
        );

        Ok(Extraction {
            tokens: inventory.tokens(),
            files_scanned: 1,
        })
    }
}
