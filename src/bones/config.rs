//! Configuration loading
//!
//! `defaults/bonelex.default.toml` is embedded into the crate so that the built-in keyword
//! set and the documented defaults never drift apart. Callers layer their own files and
//! overrides on top of it with [`Loader`] before deserializing into [`BonelexConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/bonelex.default.toml");

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BonelexConfig {
    pub template: TemplateConfig,
    pub treeviz: TreevizConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    /// Tag opened by a line starting with `.` or `#`
    pub shorthand_tag: String,
    #[serde(default)]
    pub keywords: Vec<KeywordSpec>,
}

/// A keyword directive as declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeywordSpec {
    pub name: String,
    pub variants: Vec<String>,
    #[serde(default)]
    pub optional_tail: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreevizConfig {
    pub label_width: usize,
    pub show_line_numbers: bool,
}

/// Helper for layering user overrides over the built-in defaults
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults
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

    /// Layer an optional configuration file (ignored if the file is absent)
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer TOML text, e.g. a configuration embedded by the caller
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration
    pub fn build(self) -> Result<BonelexConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults
pub fn load_defaults() -> Result<BonelexConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.template.shorthand_tag, "div");
        assert_eq!(config.treeviz.label_width, 30);
        assert!(!config.treeviz.show_line_numbers);
        let names: Vec<_> = config.template.keywords.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["if", "else", "for"]);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("template.shorthand_tag", "span")
            .unwrap()
            .set_override("treeviz.show_line_numbers", true)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.template.shorthand_tag, "span");
        assert!(config.treeviz.show_line_numbers);
    }

    #[test]
    fn layered_toml_keeps_unnamed_keys() {
        let config = Loader::new()
            .with_toml(
                r#"
                [treeviz]
                label_width = 12
                "#,
            )
            .build()
            .unwrap();
        assert_eq!(config.treeviz.label_width, 12);
        assert!(!config.treeviz.show_line_numbers);
        assert_eq!(config.template.keywords.len(), 3);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new().with_file("/nonexistent/bonelex.toml").build();
        assert!(result.is_err());
    }
}
