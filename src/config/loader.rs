use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default browser query, kept from the site's original prefixer setup
pub const DEFAULT_BROWSERS: [&str; 2] = ["> 0.5% in US", "Safari > 9"];

/// Default glob used when no content source is configured
pub const DEFAULT_CONTENT_GLOB: &str = "**/*.html";

/// Configuration for a cssprune build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Style sheet to process
    pub input: Option<PathBuf>,

    /// Where to write the result; stdout when unset
    pub output: Option<PathBuf>,

    /// Rendered site directory that content globs are resolved against
    pub output_dir: PathBuf,

    /// Plugins to run, in order
    pub plugins: Vec<Plugin>,

    /// Unused rule removal
    pub purge: PurgeConfig,

    /// Vendor prefixing
    pub prefix: PrefixConfig,

    /// Minification
    pub minify: MinifyConfig,
}

/// A post-processing stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plugin {
    Purge,
    Prefix,
    Minify,
}

impl Plugin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plugin::Purge => "purge",
            Plugin::Prefix => "prefix",
            Plugin::Minify => "minify",
        }
    }
}

impl std::fmt::Display for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    /// Markup inventory document written by the site generator
    pub inventory: Option<PathBuf>,

    /// Globs of rendered markup files to scan
    pub content: Vec<String>,

    /// Tokens that are always kept
    #[serde(alias = "whitelist")]
    pub safelist: Vec<String>,

    /// Remove @font-face rules whose family is never used
    pub font_face: bool,

    /// Remove @keyframes that no animation refers to
    pub keyframes: bool,

    /// Remove custom properties that are never read through var()
    pub variables: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixConfig {
    /// Browserslist queries
    #[serde(alias = "override_browserslist", alias = "overrideBrowserslist")]
    pub browsers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifyConfig {
    pub preset: MinifyPreset,
}

/// How aggressively the minify plugin rewrites the sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyPreset {
    /// Merge and shorten rules, then print compactly
    #[default]
    Default,
    /// Only strip whitespace and comments
    Lite,
}

/// Where the set of used tokens comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A JSON inventory of emitted tags, classes and ids
    Inventory(PathBuf),
    /// Rendered markup files matched by these globs
    Globs(Vec<String>),
}

impl ContentSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSource::Inventory(_) => "inventory",
            ContentSource::Globs(_) => "globs",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            output_dir: PathBuf::from("public"),
            plugins: vec![Plugin::Purge, Plugin::Prefix],
            purge: PurgeConfig::default(),
            prefix: PrefixConfig::default(),
            minify: MinifyConfig::default(),
        }
    }
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            inventory: None,
            content: vec![],
            safelist: vec![],
            font_face: false,
            keyframes: false,
            variables: false,
        }
    }
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            browsers: DEFAULT_BROWSERS.iter().map(|q| q.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".cssprune.toml",
            ".cssprune.yml",
            ".cssprune.yaml",
            "cssprune.toml",
            "cssprune.yml",
            "cssprune.yaml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Resolve the configured content source.
    ///
    /// An inventory and content globs are mutually exclusive. With neither,
    /// every HTML file under the output directory is scanned.
    pub fn content_source(&self) -> Result<ContentSource> {
        match (&self.purge.inventory, self.purge.content.is_empty()) {
            (Some(_), false) => Err(miette::miette!(
                "`purge.inventory` and `purge.content` cannot be used together"
            )),
            (Some(path), true) => Ok(ContentSource::Inventory(path.clone())),
            (None, false) => Ok(ContentSource::Globs(self.purge.content.clone())),
            (None, true) => Ok(ContentSource::Globs(vec![DEFAULT_CONTENT_GLOB.to_string()])),
        }
    }

    pub fn has_plugin(&self, plugin: Plugin) -> bool {
        self.plugins.contains(&plugin)
    }
}
