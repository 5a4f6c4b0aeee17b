//! Usage extraction
//!
//! Decides which tag, class and id tokens the site actually uses. Two
//! mutually exclusive strategies exist, chosen once from configuration:
//!
//! 1. **Inventory** - trust a manifest of emitted tokens written by the site
//!    generator.
//! 2. **File scan** - tokenize the rendered markup files matched by globs.
//!
//! Extraction never consults the safelist; keeping safelisted rules is the
//! pruner's job.

mod inventory;
mod scan;

pub use inventory::{tokens_from_document, InventoryExtractor, MarkupInventory};
pub use scan::{tokenize, FileScanExtractor};

use crate::config::ContentSource;
use crate::discovery::DiscoveryError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Malformed markup inventory: {source}")]
    MalformedInventory {
        #[from]
        source: serde_json::Error,
    },
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Content(#[from] DiscoveryError),
}

/// Trait for usage extractors
pub trait Extractor {
    /// Collect the tokens considered used, in discovery order
    fn extract(&self) -> Result<Extraction, ExtractError>;
}

/// Output of one extraction run
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Tokens in discovery order, duplicates included
    pub tokens: Vec<String>,

    /// Number of documents or markup files read
    pub files_scanned: usize,
}

impl Extraction {
    pub fn used(&self) -> UsedTokenSet {
        UsedTokenSet::from_tokens(self.tokens.iter().cloned())
    }
}

/// Deduplicated, case-sensitive set of used tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedTokenSet {
    tokens: HashSet<String>,
}

impl UsedTokenSet {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// The extractor selected by the configured content source
#[derive(Debug, Clone)]
pub enum UsageExtractor {
    Inventory(InventoryExtractor),
    FileScan(FileScanExtractor),
}

impl UsageExtractor {
    /// Build the extractor for a content source.
    ///
    /// Inventory paths are relative to `project_root`; globs are resolved
    /// against `project_root/output_dir`.
    pub fn from_source(source: &ContentSource, project_root: &Path, output_dir: &Path) -> Self {
        match source {
            ContentSource::Inventory(path) => {
                UsageExtractor::Inventory(InventoryExtractor::new(project_root.join(path)))
            }
            ContentSource::Globs(patterns) => UsageExtractor::FileScan(FileScanExtractor::new(
                project_root.join(output_dir),
                patterns.clone(),
            )),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UsageExtractor::Inventory(_) => "inventory",
            UsageExtractor::FileScan(_) => "globs",
        }
    }
}

impl Extractor for UsageExtractor {
    fn extract(&self) -> Result<Extraction, ExtractError> {
        match self {
            UsageExtractor::Inventory(extractor) => extractor.extract(),
            UsageExtractor::FileScan(extractor) => extractor.extract(),
        }
    }
}
