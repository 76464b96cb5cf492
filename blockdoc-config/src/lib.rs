//! Shared configuration loader for the blockdoc toolchain.
//!
//! `defaults/blockdoc.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`BlockdocConfig`].

use blockdoc_babel::formats::html::ExportOptions;
use blockdoc_babel::formats::{FormatSettings, MarkdownOptions};
use blockdoc_babel::model::IdStrategy;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/blockdoc.default.toml");

/// Top-level configuration consumed by blockdoc applications.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockdocConfig {
    pub export: ExportConfig,
    pub markdown: MarkdownConfig,
    pub ids: IdsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub simplify_blocks: bool,
}

/// Mirrors the knobs exposed by the Markdown writer.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub bullet_marker: char,
    pub list_indent: usize,
    pub emphasis_marker: char,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdsConfig {
    pub strategy: IdStrategy,
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        MarkdownOptions {
            bullet_marker: config.bullet_marker,
            list_indent: config.list_indent,
            emphasis_marker: config.emphasis_marker,
        }
    }
}

impl From<MarkdownConfig> for MarkdownOptions {
    fn from(config: MarkdownConfig) -> Self {
        MarkdownOptions::from(&config)
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        ExportOptions {
            simplify_blocks: config.simplify_blocks,
        }
    }
}

impl From<&BlockdocConfig> for FormatSettings {
    fn from(config: &BlockdocConfig) -> Self {
        FormatSettings {
            ids: config.ids.strategy,
            markdown: (&config.markdown).into(),
            simplify_blocks: config.export.simplify_blocks,
            ..FormatSettings::default()
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<BlockdocConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<BlockdocConfig, ConfigError> {
    Loader::new().build()
}
