//! Keyword directives
//!
//! Directives such as `if (…)` or `for (item in items)` are not hard-coded in the template
//! grammar. They are registered here as keywords with one or more *variants*, each variant
//! spelled out in a small pattern language (see [`pattern`]):
//!
//!     for (@as:ident in @data:expr)
//!     for ([@key:ident, @as:ident] in @data:expr)
//!
//! When a line starts with a registered keyword the grammar hands every following character
//! to a [`KeywordMatcher`], which narrows the candidate variants until one completes.
//!
//! The built-in set (`if`, `else`, `for`) comes from the embedded default configuration.

pub mod matcher;
pub mod pattern;

pub use matcher::{KeywordMatcher, MatchStep};
pub use pattern::{parse_variant, Element, Slot, SlotKind};

use crate::bones::ast::Directive;
use crate::bones::config::{load_defaults, KeywordSpec};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

/// Checks a completed directive; the message becomes a keyword error
pub type Validator = fn(&Directive) -> Result<(), String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeywordError {
    #[error("invalid keyword name `{0}`")]
    InvalidName(String),
    #[error("keyword `{0}` has no variants")]
    NoVariants(String),
    #[error("keyword `{name}`: variant `{variant}` must start with the keyword name")]
    MissingName { name: String, variant: String },
    #[error("keyword `{name}`: cannot read `{text}` in variant `{variant}`")]
    InvalidPattern {
        name: String,
        variant: String,
        text: String,
    },
    #[error("keyword `{name}`: unknown slot kind `{kind}` (expected `ident` or `expr`)")]
    UnknownSlotKind { name: String, kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub source: String,
    pub elements: Vec<Element>,
}

#[derive(Clone)]
pub struct KeywordDef {
    name: String,
    variants: Vec<Variant>,
    optional_tail: bool,
    validate: Option<Validator>,
}

impl KeywordDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            optional_tail: false,
            validate: None,
        }
    }

    /// Adds a variant written in the pattern language
    pub fn variant(mut self, source: &str) -> Result<Self, KeywordError> {
        let elements = parse_variant(&self.name, source)?;
        self.variants.push(Variant {
            source: source.to_string(),
            elements,
        });
        Ok(self)
    }

    /// Lets the directive complete at `{` or end of line before its variant is exhausted
    pub fn optional_tail(mut self, optional: bool) -> Self {
        self.optional_tail = optional;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn is_tail_optional(&self) -> bool {
        self.optional_tail
    }

    pub fn validator(&self) -> Option<Validator> {
        self.validate
    }
}

impl fmt::Debug for KeywordDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordDef")
            .field("name", &self.name)
            .field("variants", &self.variants)
            .field("optional_tail", &self.optional_tail)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

static STANDARD: Lazy<KeywordRegistry> = Lazy::new(|| {
    let config = load_defaults().expect("embedded defaults deserialize");
    KeywordRegistry::from_specs(&config.template.keywords).expect("embedded keywords are valid")
});

/// The keywords a template grammar recognises
#[derive(Debug, Clone, Default)]
pub struct KeywordRegistry {
    keywords: IndexMap<String, Arc<KeywordDef>>,
}

impl KeywordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `if`, `else` and `for`, as declared in the embedded defaults
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    pub fn from_specs(specs: &[KeywordSpec]) -> Result<Self, KeywordError> {
        let mut registry = Self::new();
        for spec in specs {
            let mut def = KeywordDef::new(&spec.name).optional_tail(spec.optional_tail);
            for variant in &spec.variants {
                def = def.variant(variant)?;
            }
            registry.register(def)?;
        }
        Ok(registry)
    }

    /// Adds a keyword, replacing any keyword of the same name
    pub fn register(&mut self, def: KeywordDef) -> Result<(), KeywordError> {
        let valid_name = !def.name.is_empty()
            && def
                .name
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !valid_name {
            return Err(KeywordError::InvalidName(def.name.clone()));
        }
        if def.variants.is_empty() {
            return Err(KeywordError::NoVariants(def.name.clone()));
        }
        self.keywords.insert(def.name.clone(), Arc::new(def));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<KeywordDef>> {
        self.keywords.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keywords.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keywords.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_keywords_come_from_defaults() {
        let registry = KeywordRegistry::standard();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["if", "else", "for"]);
        assert_eq!(registry.get("for").unwrap().variants().len(), 2);
        assert_eq!(registry.get("else").unwrap().variants()[0].elements, vec![]);
    }

    #[test]
    fn test_register_validates_definitions() {
        let mut registry = KeywordRegistry::new();
        assert_eq!(
            registry.register(KeywordDef::new("each")),
            Err(KeywordError::NoVariants("each".into()))
        );
        assert_eq!(
            registry.register(KeywordDef::new("a b")),
            Err(KeywordError::InvalidName("a b".into()))
        );

        let each = KeywordDef::new("each").variant("each @item:ident").unwrap();
        registry.register(each).unwrap();
        assert!(registry.contains("each"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_variant_must_start_with_the_name() {
        let err = KeywordDef::new("if").variant("when (@x:expr)").unwrap_err();
        assert!(matches!(err, KeywordError::MissingName { .. }));
        let err = KeywordDef::new("if").variant("iffy").unwrap_err();
        assert!(matches!(err, KeywordError::MissingName { .. }));
    }
}
