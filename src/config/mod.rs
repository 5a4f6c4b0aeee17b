mod loader;

pub use loader::{
    Config, ContentSource, MinifyConfig, MinifyPreset, Plugin, PrefixConfig, PurgeConfig,
    DEFAULT_BROWSERS, DEFAULT_CONTENT_GLOB,
};
