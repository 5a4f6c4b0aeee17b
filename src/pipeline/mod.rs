//! Style sheet post-processing pipeline
//!
//! Runs the configured plugins, in order, over one style sheet:
//!
//! 1. **purge** - extract used tokens and prune unused rules
//! 2. **prefix** - add vendor prefixes for the configured browsers
//! 3. **minify** - compact the output
//!
//! Parsing, prefixing and printing are delegated to `lightningcss`.

mod prune;

pub use prune::{count_style_rules, PruneOptions, PruneStats, Pruner};

use crate::config::{Config, MinifyPreset, Plugin};
use crate::extract::{ExtractError, Extractor, UsageExtractor};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No input style sheet configured")]
    MissingInput,
    #[error("Failed to parse CSS: {0}")]
    Parse(String),
    #[error("Failed to transform CSS: {0}")]
    Transform(String),
    #[error("Failed to print CSS: {0}")]
    Print(String),
    #[error("Invalid browser query: {0}")]
    Browsers(String),
    #[error("Plugin `{0}` is listed more than once")]
    DuplicatePlugin(Plugin),
    #[error("The purge plugin needs a content source")]
    MissingContentSource,
    #[error("Minify preset `lite` cannot be combined with the prefix plugin, whose transform pass rewrites declarations")]
    LiteWithPrefix,
}

/// Statistics of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Plugins that ran, in order
    pub plugins: Vec<Plugin>,
    /// `inventory` or `globs` when the purge plugin ran
    pub content_source: Option<&'static str>,
    /// Inventory documents or markup files read
    pub files_scanned: usize,
    /// Distinct used tokens
    pub used_tokens: usize,
    pub rules_before: usize,
    pub rules_after: usize,
    pub prune: PruneStats,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

/// Result of processing a style sheet
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub css: String,
    pub stats: PipelineStats,
}

/// Runs the configured plugins over a style sheet
pub struct Pipeline<'a> {
    config: &'a Config,
    project_root: PathBuf,
    extractor: Option<UsageExtractor>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, project_root: &Path) -> Self {
        Self {
            config,
            project_root: project_root.to_path_buf(),
            extractor: None,
        }
    }

    /// Set the extractor the purge plugin reads used tokens from
    pub fn with_extractor(mut self, extractor: UsageExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Read the configured input, process it and write the configured output.
    ///
    /// Nothing is written unless every plugin succeeded.
    pub fn run(&self) -> Result<PipelineOutput, PipelineError> {
        let input = self
            .config
            .input
            .as_ref()
            .map(|p| self.project_root.join(p))
            .ok_or(PipelineError::MissingInput)?;

        info!("Processing {}", input.display());
        let css = fs::read_to_string(&input).map_err(|source| PipelineError::Io {
            path: input.clone(),
            source,
        })?;

        let output = self.process(&css)?;

        if let Some(path) = &self.config.output {
            let path = self.project_root.join(path);
            write_output(&path, &output.css)?;
            info!("Wrote {} ({} bytes)", path.display(), output.css.len());
        }

        Ok(output)
    }

    /// Process style sheet text with the configured plugins
    pub fn process(&self, css: &str) -> Result<PipelineOutput, PipelineError> {
        check_plugins(&self.config.plugins)?;
        check_preset(self.config)?;

        let mut stats = PipelineStats {
            plugins: self.config.plugins.clone(),
            bytes_in: css.len(),
            ..Default::default()
        };

        let mut sheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| PipelineError::Parse(e.to_string()))?;
        stats.rules_before = count_style_rules(&sheet.rules);

        let mut targets = Targets::default();
        let mut minify = false;

        for plugin in &self.config.plugins {
            debug!("Running plugin: {}", plugin);
            match plugin {
                Plugin::Purge => self.purge(&mut sheet, &mut stats)?,
                Plugin::Prefix => {
                    targets = self.targets()?;
                    // lightningcss only adds prefixes in its transform pass, which
                    // also merges shorthands and rewrites values
                    sheet
                        .minify(MinifyOptions {
                            targets: targets.clone(),
                            ..Default::default()
                        })
                        .map_err(|e| PipelineError::Transform(e.to_string()))?;
                }
                Plugin::Minify => {
                    if self.config.minify.preset == MinifyPreset::Default {
                        sheet
                            .minify(MinifyOptions {
                                targets: targets.clone(),
                                ..Default::default()
                            })
                            .map_err(|e| PipelineError::Transform(e.to_string()))?;
                    }
                    minify = true;
                }
            }
        }

        stats.rules_after = count_style_rules(&sheet.rules);

        let printed = sheet
            .to_css(PrinterOptions {
                minify,
                targets,
                ..Default::default()
            })
            .map_err(|e| PipelineError::Print(e.to_string()))?;

        stats.bytes_out = printed.code.len();
        Ok(PipelineOutput {
            css: printed.code,
            stats,
        })
    }

    fn purge(&self, sheet: &mut StyleSheet, stats: &mut PipelineStats) -> Result<(), PipelineError> {
        let extractor = self
            .extractor
            .as_ref()
            .ok_or(PipelineError::MissingContentSource)?;
        let extraction = extractor.extract()?;
        let used = extraction.used();
        info!(
            "Extracted {} used tokens from {} file(s) ({})",
            used.len(),
            extraction.files_scanned,
            extractor.kind()
        );

        let options = PruneOptions {
            font_face: self.config.purge.font_face,
            keyframes: self.config.purge.keyframes,
            variables: self.config.purge.variables,
        };
        let pruner = Pruner::new(&used, &self.config.purge.safelist, options);
        stats.prune = pruner.prune(sheet)?;
        stats.content_source = Some(extractor.kind());
        stats.files_scanned = extraction.files_scanned;
        stats.used_tokens = used.len();
        Ok(())
    }

    fn targets(&self) -> Result<Targets, PipelineError> {
        if self.config.prefix.browsers.is_empty() {
            return Ok(Targets::default());
        }
        let browsers = Browsers::from_browserslist(&self.config.prefix.browsers)
            .map_err(|e| PipelineError::Browsers(e.to_string()))?;
        debug!("Prefix targets: {:?}", browsers);
        Ok(Targets {
            browsers,
            ..Default::default()
        })
    }
}

fn check_plugins(plugins: &[Plugin]) -> Result<(), PipelineError> {
    let mut seen = HashSet::new();
    for plugin in plugins {
        if !seen.insert(*plugin) {
            return Err(PipelineError::DuplicatePlugin(*plugin));
        }
    }
    Ok(())
}

/// The lite preset promises an unrewritten sheet, which a prefix pass rules out
fn check_preset(config: &Config) -> Result<(), PipelineError> {
    if config.minify.preset == MinifyPreset::Lite
        && config.has_plugin(Plugin::Prefix)
        && config.has_plugin(Plugin::Minify)
    {
        return Err(PipelineError::LiteWithPrefix);
    }
    Ok(())
}

fn write_output(path: &Path, css: &str) -> Result<(), PipelineError> {
    let io_err = |source: std::io::Error| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, css).map_err(io_err)
}
