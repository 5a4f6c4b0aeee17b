use crate::pipeline::PipelineStats;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, stats: &PipelineStats) -> Result<()> {
        let report = JsonReport::from_stats(stats);
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            eprintln!("Report written to: {}", path.display());
        } else {
            eprintln!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: &'static str,
    plugins: Vec<&'static str>,
    content: Option<JsonContent>,
    rules: JsonRules,
    removed: JsonRemoved,
    bytes: JsonBytes,
}

#[derive(Serialize)]
struct JsonContent {
    source: &'static str,
    files_scanned: usize,
    used_tokens: usize,
}

#[derive(Serialize)]
struct JsonRules {
    before: usize,
    after: usize,
}

#[derive(Serialize)]
struct JsonRemoved {
    rules: usize,
    selectors: usize,
    keyframes: usize,
    font_faces: usize,
    variables: usize,
}

#[derive(Serialize)]
struct JsonBytes {
    input: usize,
    output: usize,
}

impl JsonReport {
    fn from_stats(stats: &PipelineStats) -> Self {
        Self {
            version: "1.0",
            plugins: stats.plugins.iter().map(|p| p.as_str()).collect(),
            content: stats.content_source.map(|source| JsonContent {
                source,
                files_scanned: stats.files_scanned,
                used_tokens: stats.used_tokens,
            }),
            rules: JsonRules {
                before: stats.rules_before,
                after: stats.rules_after,
            },
            removed: JsonRemoved {
                rules: stats.prune.removed_rules,
                selectors: stats.prune.removed_selectors,
                keyframes: stats.prune.removed_keyframes,
                font_faces: stats.prune.removed_font_faces,
                variables: stats.prune.removed_variables,
            },
            bytes: JsonBytes {
                input: stats.bytes_in,
                output: stats.bytes_out,
            },
        }
    }
}
