use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Content discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid content glob `{pattern}`: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: ignore::Error,
    },
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A rendered markup file matched by a content glob
#[derive(Debug, Clone)]
pub struct MarkupFile {
    /// Absolute path to the file
    pub path: PathBuf,
}

impl MarkupFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load and return owned contents
    pub fn read_contents(&self) -> Result<String, DiscoveryError> {
        std::fs::read_to_string(&self.path).map_err(|source| DiscoveryError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Finds rendered markup files matching content globs
pub struct ContentFinder<'a> {
    patterns: &'a [String],
}

impl<'a> ContentFinder<'a> {
    pub fn new(patterns: &'a [String]) -> Self {
        Self { patterns }
    }

    /// Find every file under `root` matched by at least one pattern.
    ///
    /// Results are sorted by path.
    pub fn find_files(&self, root: &Path) -> Result<Vec<MarkupFile>, DiscoveryError> {
        debug!("Scanning for content in: {}", root.display());

        if !root.exists() {
            trace!("Directory does not exist: {}", root.display());
            return Ok(Vec::new());
        }

        let mut builder = OverrideBuilder::new(root);
        for pattern in self.patterns {
            let normalized = normalize_pattern(pattern);
            builder
                .add(&normalized)
                .map_err(|source| DiscoveryError::InvalidGlob {
                    pattern: pattern.clone(),
                    source,
                })?;
        }
        let overrides = builder.build().map_err(|source| DiscoveryError::InvalidGlob {
            pattern: self.patterns.join(", "),
            source,
        })?;

        if overrides.is_empty() {
            return Ok(Vec::new());
        }

        // Rendered output is usually git-ignored, so ignore files are not honored here
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .hidden(true)           // Skip hidden files
            .follow_links(false)    // Don't follow symlinks
            .overrides(overrides)
            .build();

        let mut files: Vec<MarkupFile> = walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    // Markup under an unreadable path contributes no tokens
                    warn!("Skipping unreadable content path: {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| {
                trace!("Matched: {}", entry.path().display());
                MarkupFile::new(entry.into_path())
            })
            .collect();

        files.par_sort_by(|a, b| a.path.cmp(&b.path));

        debug!("Found {} content files", files.len());
        Ok(files)
    }
}

/// A leading `./` anchors the glob at the output directory
fn normalize_pattern(pattern: &str) -> Cow<'_, str> {
    match pattern.strip_prefix("./") {
        Some(rest) => Cow::Owned(format!("/{}", rest)),
        None => Cow::Borrowed(pattern),
    }
}
