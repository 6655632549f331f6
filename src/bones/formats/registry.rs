//! Format registry for tree serialization
//!
//! Each format implements [`Formatter`] and can be registered with [`FormatRegistry`] under
//! its name.

use crate::bones::ast::Tree;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// The tree holds a node the format has no syntax for
    #[error("Cannot render {node} as {format}")]
    Unsupported { format: &'static str, node: String },
}

pub trait Formatter: Send + Sync {
    /// The name of this format (e.g. "treeviz", "json")
    fn name(&self) -> &str;

    fn serialize(&self, tree: &Tree) -> Result<String, FormatError>;

    fn description(&self) -> &str {
        ""
    }
}

pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter, replacing any formatter of the same name
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    pub fn serialize(&self, tree: &Tree, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.serialize(tree)
    }

    /// All format names, sorted
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    /// treeviz, json, template and markup with their default settings
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::TreevizFormatter::default());
        registry.register(super::JsonFormatter);
        registry.register(super::TemplateFormatter::default());
        registry.register(super::MarkupFormatter);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::grammars::template::parse_template;

    /// Counts tags, to check that custom formats see the whole tree
    struct TagCount;

    impl Formatter for TagCount {
        fn name(&self) -> &str {
            "tags"
        }

        fn serialize(&self, tree: &Tree) -> Result<String, FormatError> {
            let tags = tree
                .descendants(tree.root())
                .into_iter()
                .filter(|id| tree[*id].payload.as_tag().is_some())
                .count();
            Ok(tags.to_string())
        }
    }

    #[test]
    fn test_custom_format() {
        let tree = parse_template("ul\n  li | a\n  li | b\n").unwrap();
        let mut registry = FormatRegistry::new();
        registry.register(TagCount);
        assert!(registry.has("tags"));
        assert_eq!(registry.get("tags").unwrap().description(), "");
        assert_eq!(registry.serialize(&tree, "tags").unwrap(), "3");
    }

    #[test]
    fn test_registering_twice_replaces() {
        let mut registry = FormatRegistry::with_defaults();
        registry.register(TagCount);
        registry.register(TagCount);
        assert_eq!(registry.list_formats().len(), 5);
    }

    #[test]
    fn test_unknown_format() {
        let registry = FormatRegistry::new();
        assert_eq!(
            registry.serialize(&Tree::new(), "html"),
            Err(FormatError::FormatNotFound("html".to_string()))
        );
    }

    #[test]
    fn test_defaults() {
        let registry = FormatRegistry::default();
        assert_eq!(registry.list_formats(), vec!["json", "markup", "template", "treeviz"]);
        assert_eq!(registry.get("treeviz").unwrap().name(), "treeviz");
    }
}
