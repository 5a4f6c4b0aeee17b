use crate::pipeline::PipelineStats;
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output, written to stderr
pub struct TerminalReporter {
    /// Show the per-kind breakdown of removals
    show_breakdown: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_breakdown: true,
        }
    }

    pub fn with_breakdown(mut self, show: bool) -> Self {
        self.show_breakdown = show;
        self
    }

    pub fn report(&self, stats: &PipelineStats) -> Result<()> {
        let plugins: Vec<_> = stats.plugins.iter().map(|p| p.as_str()).collect();
        eprintln!();
        eprintln!(
            "{} {}",
            "Plugins:".dimmed(),
            plugins.join(" → ").cyan().bold()
        );

        if let Some(source) = stats.content_source {
            eprintln!(
                "{} {} used tokens from {} file(s) ({})",
                "Content:".dimmed(),
                stats.used_tokens.to_string().white().bold(),
                stats.files_scanned,
                source
            );
            self.print_pruning(stats);
        }

        eprintln!("{}", "─".repeat(60).dimmed());
        eprintln!(
            "Rules: {} → {}   Size: {} → {} ({})",
            stats.rules_before,
            stats.rules_after.to_string().green().bold(),
            format_bytes(stats.bytes_in),
            format_bytes(stats.bytes_out).green().bold(),
            format_saving(stats.bytes_in, stats.bytes_out)
        );
        eprintln!();

        Ok(())
    }

    fn print_pruning(&self, stats: &PipelineStats) {
        let prune = &stats.prune;
        if prune.total() == 0 {
            eprintln!("{}", "No unused CSS found!".green().bold());
            return;
        }

        eprintln!(
            "{}",
            format!("Removed {} unused items:", prune.total()).yellow().bold()
        );

        if !self.show_breakdown {
            return;
        }

        let rows = [
            ("rules", prune.removed_rules),
            ("selectors", prune.removed_selectors),
            ("@keyframes", prune.removed_keyframes),
            ("@font-face", prune.removed_font_faces),
            ("custom properties", prune.removed_variables),
        ];
        for (label, count) in rows {
            if count > 0 {
                eprintln!("  {} {} {}", "○".dimmed(), count, label);
            }
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_bytes(bytes: usize) -> String {
    if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

fn format_saving(before: usize, after: usize) -> String {
    if before == 0 {
        return "0%".to_string();
    }
    let percent = |delta: usize| delta as f64 / before as f64 * 100.0;
    match after.cmp(&before) {
        std::cmp::Ordering::Greater => format!("+{:.1}%", percent(after - before)),
        std::cmp::Ordering::Less => format!("-{:.1}%", percent(before - after)),
        std::cmp::Ordering::Equal => "0%".to_string(),
    }
}
