//! Integration tests for the build pipeline
//!
//! These tests run extraction and pruning together against the site fixture.

use cssprune::config::{Config, ContentSource, MinifyPreset, Plugin};
use cssprune::extract::UsageExtractor;
use cssprune::pipeline::{Pipeline, PipelineError, PipelineOutput};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to the site fixture
fn site_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/site")
}

fn fixture_css() -> String {
    fs::read_to_string(site_path().join("assets/main.css")).expect("fixture css")
}

fn purge_config(source: &ContentSource) -> Config {
    let mut config = Config {
        plugins: vec![Plugin::Purge],
        ..Default::default()
    };
    match source {
        ContentSource::Inventory(path) => config.purge.inventory = Some(path.clone()),
        ContentSource::Globs(globs) => config.purge.content = globs.clone(),
    }
    config
}

fn run(config: &Config, root: &Path) -> Result<PipelineOutput, PipelineError> {
    let source = config.content_source().expect("content source");
    let extractor = UsageExtractor::from_source(&source, root, &config.output_dir);
    Pipeline::new(config, root)
        .with_extractor(extractor)
        .process(&fixture_css())
}

fn inventory() -> ContentSource {
    ContentSource::Inventory(PathBuf::from("hugo_stats.json"))
}

fn html_globs() -> ContentSource {
    ContentSource::Globs(vec!["**/*.html".to_string()])
}

// ============================================================================
// Safelist
// ============================================================================

#[test]
fn test_safelisted_rule_survives_without_usage() {
    let mut config = purge_config(&inventory());
    config.purge.safelist = vec!["blockquote".to_string()];

    let output = run(&config, &site_path()).unwrap();
    assert!(output.css.contains("blockquote"));
}

#[test]
fn test_unlisted_rule_is_removed_without_safelist() {
    let config = purge_config(&inventory());

    let output = run(&config, &site_path()).unwrap();
    assert!(!output.css.contains("blockquote"));
}

// ============================================================================
// Content Strategies
// ============================================================================

#[test]
fn test_inventory_mode_prunes_unlisted_classes() {
    let config = purge_config(&inventory());
    let output = run(&config, &site_path()).unwrap();

    assert!(output.css.contains(".nav-link"));
    assert!(output.css.contains(".post-title"));
    assert!(output.css.contains("#content > p"));
    assert!(!output.css.contains(".sidebar"));
    assert!(!output.css.contains("600px"));
    assert_eq!(output.stats.content_source, Some("inventory"));
}

#[test]
fn test_glob_mode_keeps_rendered_classes() {
    let config = purge_config(&html_globs());
    let output = run(&config, &site_path()).unwrap();

    assert!(output.css.contains(".sidebar"));
    assert!(output.css.contains("600px"));
    assert!(!output.css.contains("blockquote"));
    assert_eq!(output.stats.content_source, Some("globs"));
    assert_eq!(output.stats.files_scanned, 2);
}

#[test]
fn test_toggles_off_keep_at_rules() {
    let config = purge_config(&inventory());
    let output = run(&config, &site_path()).unwrap();

    assert!(output.css.contains("lobster.woff2"));
    assert!(output.css.contains("@keyframes pulse"));
    assert!(output.css.contains("--sidebar-width"));
}

#[test]
fn test_toggles_on_remove_unused_at_rules() {
    let mut config = purge_config(&html_globs());
    config.purge.font_face = true;
    config.purge.keyframes = true;
    config.purge.variables = true;

    let output = run(&config, &site_path()).unwrap();

    assert!(output.css.contains("inter.woff2"));
    assert!(!output.css.contains("lobster.woff2"));
    assert!(output.css.contains("@keyframes spin"));
    assert!(!output.css.contains("@keyframes pulse"));
    assert!(output.css.contains("--accent"));
    assert!(!output.css.contains("--sidebar-width"));

    let prune = &output.stats.prune;
    assert_eq!(prune.removed_font_faces, 1);
    assert_eq!(prune.removed_keyframes, 1);
    assert_eq!(prune.removed_variables, 1);
}

// ============================================================================
// Plugins
// ============================================================================

#[test]
fn test_full_plugin_chain() {
    let mut config = purge_config(&inventory());
    config.plugins = vec![Plugin::Purge, Plugin::Prefix, Plugin::Minify];
    config.prefix.browsers = vec!["Safari > 9".to_string()];

    let output = run(&config, &site_path()).unwrap();

    assert!(!output.css.contains('\n'));
    assert!(output.css.contains(".nav-link"));
    assert!(!output.css.contains(".sidebar"));
    assert!(output.stats.bytes_out < output.stats.bytes_in);
    assert!(output.stats.rules_after < output.stats.rules_before);
}

#[test]
fn test_lite_preset_still_compacts() {
    let mut config = purge_config(&inventory());
    config.plugins = vec![Plugin::Purge, Plugin::Minify];
    config.minify.preset = MinifyPreset::Lite;

    let output = run(&config, &site_path()).unwrap();
    assert!(!output.css.contains('\n'));
}

#[test]
fn test_without_purge_nothing_is_extracted() {
    let mut config = purge_config(&inventory());
    config.plugins = vec![Plugin::Minify];

    let temp = TempDir::new().unwrap();
    let output = run(&config, temp.path()).unwrap();

    assert!(output.css.contains(".sidebar"));
    assert_eq!(output.stats.content_source, None);
}

#[test]
fn test_duplicate_plugin_is_error() {
    let mut config = purge_config(&inventory());
    config.plugins = vec![Plugin::Minify, Plugin::Minify];

    let result = run(&config, &site_path());
    assert!(matches!(result, Err(PipelineError::DuplicatePlugin(Plugin::Minify))));
}

#[test]
fn test_invalid_browser_query_is_error() {
    let mut config = purge_config(&inventory());
    config.plugins = vec![Plugin::Prefix];
    config.prefix.browsers = vec!["unknownbrowser > 1".to_string()];

    let result = run(&config, &site_path());
    assert!(matches!(result, Err(PipelineError::Browsers(_))));
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_run_writes_output_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("hugo_stats.json"),
        r#"{"htmlElements": {"tags": ["p"], "classes": [], "ids": []}}"#,
    )
    .unwrap();
    fs::write(temp.path().join("in.css"), "p { margin: 0; } .gone { color: red; }").unwrap();

    let mut config = purge_config(&inventory());
    config.input = Some(PathBuf::from("in.css"));
    config.output = Some(PathBuf::from("dist/css/out.css"));

    let extractor = UsageExtractor::from_source(
        &config.content_source().unwrap(),
        temp.path(),
        &config.output_dir,
    );
    let output = Pipeline::new(&config, temp.path())
        .with_extractor(extractor)
        .run()
        .unwrap();

    let written = fs::read_to_string(temp.path().join("dist/css/out.css")).unwrap();
    assert_eq!(written, output.css);
    assert!(written.contains('p'));
    assert!(!written.contains(".gone"));
}
