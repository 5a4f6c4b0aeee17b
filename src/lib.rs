//! cssprune - Remove unused CSS from statically generated sites
//!
//! This library decides which selectors a site actually uses and strips the
//! rest from its style sheet before prefixing and minifying it.
//!
//! # Architecture
//!
//! The build pipeline consists of:
//! 1. **Configuration** - Load the plugin list and option values
//! 2. **Usage Extraction** - Read the site generator's markup inventory, or
//!    scan rendered markup files matched by globs
//! 3. **Pruning** - Drop style rules whose selectors are not used
//! 4. **Prefixing** - Add vendor prefixes for the target browsers
//! 5. **Minification** - Compact the result
//! 6. **Reporting** - Summarize what was removed

pub mod config;
pub mod discovery;
pub mod extract;
pub mod pipeline;
pub mod report;

pub use config::{Config, ContentSource, MinifyPreset, Plugin};
pub use discovery::ContentFinder;
pub use extract::{
    tokens_from_document, ExtractError, Extraction, Extractor, MarkupInventory, UsageExtractor,
    UsedTokenSet,
};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput, PipelineStats, Pruner};
pub use report::{ReportFormat, Reporter};
