mod terminal;
mod json;

pub use terminal::TerminalReporter;
pub use json::JsonReporter;

use crate::pipeline::PipelineStats;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Reporter for pipeline run summaries.
///
/// Reports never go to stdout, which carries the style sheet when no
/// output file is configured.
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self { format, output_path }
    }

    /// Report the statistics of a run
    pub fn report(&self, stats: &PipelineStats) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new();
                reporter.report(stats)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.output_path.clone());
                reporter.report(stats)
            }
        }
    }
}
