use clap::Parser;
use colored::Colorize;
use cssprune::config::{Config, Plugin};
use cssprune::extract::{Extractor, UsageExtractor};
use cssprune::pipeline::Pipeline;
use cssprune::report::{self, Reporter};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// cssprune - Remove unused CSS using your site's markup, then prefix and minify
#[derive(Parser, Debug)]
#[command(name = "cssprune")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Style sheet to process
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write the processed style sheet (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rendered site directory that content globs are resolved against
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Markup inventory written by the site generator (e.g. hugo_stats.json)
    #[arg(long, value_name = "FILE", conflicts_with = "content")]
    inventory: Option<PathBuf>,

    /// Globs of rendered markup to scan (can be specified multiple times)
    #[arg(long, value_name = "GLOB")]
    content: Vec<String>,

    /// Tokens to always keep (can be specified multiple times)
    #[arg(short, long, value_name = "TOKEN")]
    safelist: Vec<String>,

    /// Remove @font-face rules whose family is never used
    #[arg(long)]
    font_face: bool,

    /// Remove @keyframes that no animation refers to
    #[arg(long)]
    keyframes: bool,

    /// Remove custom properties never read through var()
    #[arg(long)]
    variables: bool,

    /// Browserslist queries for prefixing (replaces the configured list)
    #[arg(long, value_name = "QUERY")]
    browsers: Vec<String>,

    /// Minify the output
    #[arg(long)]
    minify: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Write the report to a file (json format)
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Print the extracted tokens and exit
    #[arg(long)]
    tokens: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for report::ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => report::ReportFormat::Terminal,
            OutputFormat::Json => report::ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("cssprune v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    if cli.tokens {
        return print_tokens(&build_extractor(&config, &cli)?);
    }

    // Only the purge plugin reads a content source
    let extractor = if config.has_plugin(Plugin::Purge) {
        Some(build_extractor(&config, &cli)?)
    } else {
        None
    };

    run_build(&config, &cli, extractor)
}

/// The usage strategy is fixed here, once per build
fn build_extractor(config: &Config, cli: &Cli) -> Result<UsageExtractor> {
    let source = config.content_source()?;
    Ok(UsageExtractor::from_source(
        &source,
        &cli.path,
        &config.output_dir,
    ))
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if let Some(input) = &cli.input {
        config.input = Some(input.clone());
    }
    if let Some(output) = &cli.output {
        config.output = Some(output.clone());
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(inventory) = &cli.inventory {
        config.purge.inventory = Some(inventory.clone());
        config.purge.content.clear();
    }
    if !cli.content.is_empty() {
        config.purge.content = cli.content.clone();
        config.purge.inventory = None;
    }
    if !cli.safelist.is_empty() {
        config.purge.safelist.extend(cli.safelist.clone());
    }
    config.purge.font_face |= cli.font_face;
    config.purge.keyframes |= cli.keyframes;
    config.purge.variables |= cli.variables;
    if !cli.browsers.is_empty() {
        config.prefix.browsers = cli.browsers.clone();
    }
    if cli.minify && !config.has_plugin(Plugin::Minify) {
        config.plugins.push(Plugin::Minify);
    }

    Ok(config)
}

fn print_tokens(extractor: &UsageExtractor) -> Result<()> {
    let extraction = extractor
        .extract()
        .into_diagnostic()
        .wrap_err("Failed to extract used tokens")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for token in &extraction.tokens {
        writeln!(out, "{}", token).into_diagnostic()?;
    }

    info!(
        "{} tokens ({} distinct) from {} file(s)",
        extraction.tokens.len(),
        extraction.used().len(),
        extraction.files_scanned
    );
    Ok(())
}

fn run_build(config: &Config, cli: &Cli, extractor: Option<UsageExtractor>) -> Result<()> {
    use std::time::Instant;

    let start_time = Instant::now();

    let mut pipeline = Pipeline::new(config, &cli.path);
    if let Some(extractor) = extractor {
        pipeline = pipeline.with_extractor(extractor);
    }
    let output = pipeline
        .run()
        .into_diagnostic()
        .wrap_err("Build step failed")?;

    if config.output.is_none() {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(output.css.as_bytes()).into_diagnostic()?;
        out.flush().into_diagnostic()?;
    }

    if !cli.quiet || cli.report.is_some() {
        let reporter = Reporter::new(cli.format.clone().into(), cli.report.clone());
        reporter.report(&output.stats)?;
    }

    let elapsed = start_time.elapsed();
    if !cli.quiet {
        eprintln!(
            "{}",
            format!("⏱  Processed in {:.2}s", elapsed.as_secs_f64()).dimmed()
        );
    }

    Ok(())
}
