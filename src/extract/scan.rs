//! Token scanning over rendered markup
//!
//! Every maximal run of `[A-Za-z0-9_-]` characters in a matched file is
//! treated as a potentially used tag, class or id.

use super::{ExtractError, Extraction, Extractor};
use crate::discovery::ContentFinder;
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z0-9_-]+").expect("token pattern is valid"))
}

/// Split markup (or any text) into candidate selector tokens
pub fn tokenize(content: &str) -> Vec<String> {
    token_pattern()
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Scans files matched by content globs under the rendered output directory
#[derive(Debug, Clone)]
pub struct FileScanExtractor {
    root: PathBuf,
    patterns: Vec<String>,
}

impl FileScanExtractor {
    pub fn new(root: PathBuf, patterns: Vec<String>) -> Self {
        Self { root, patterns }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Extractor for FileScanExtractor {
    fn extract(&self) -> Result<Extraction, ExtractError> {
        let files = ContentFinder::new(&self.patterns).find_files(&self.root)?;

        if files.is_empty() {
            warn!(
                "No content files matched {:?} in {}",
                self.patterns,
                self.root.display()
            );
        }

        let per_file = files
            .par_iter()
            .map(|file| file.read_contents().map(|contents| tokenize(&contents)))
            .collect::<Result<Vec<_>, _>>()?;

        let tokens: Vec<String> = per_file.into_iter().flatten().collect();
        debug!("Scanned {} files, {} tokens", files.len(), tokens.len());

        Ok(Extraction {
            tokens,
            files_scanned: files.len(),
        })
    }
}
