//! Attribute values and the fragments they are made of
//!
//! An attribute maps to an ordered list of values, and every value is an ordered list of
//! [`Fragment`]s. `div.a.b` gives `class` two values (`[["a"], ["b"]]`), `div.${x}-item`
//! gives it one value made of an expression and a literal.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Where an inheritance marker takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InheritFrom {
    #[serde(rename = "self")]
    SelfNode,
    #[serde(rename = "parent")]
    Parent,
}

/// One piece of a tag name, attribute value or text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fragment {
    Literal(String),
    /// Opaque source captured from `${…}`
    Expression(String),
    /// Splice in the value of the same attribute from the node itself or its nearest ancestor
    Inherit(InheritFrom),
    /// Implicit value of a bare attribute
    Boolean(bool),
    /// Conditional value (`class.active: isActive`); the fragments apply when `test` holds
    Group { test: String, fragments: Vec<Fragment> },
}

impl Fragment {
    pub fn literal(value: impl Into<String>) -> Self {
        Fragment::Literal(value.into())
    }

    pub fn expression(source: impl Into<String>) -> Self {
        Fragment::Expression(source.into())
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Fragment::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Literal(value) => write!(f, "{}", value),
            Fragment::Expression(source) => write!(f, "${{{}}}", source),
            Fragment::Inherit(_) => write!(f, "&"),
            Fragment::Boolean(value) => write!(f, "{}", value),
            Fragment::Group { test, fragments } => {
                fragments
                    .iter()
                    .try_for_each(|fragment| write!(f, "{}", fragment))?;
                write!(f, ": {}", test)
            }
        }
    }
}

/// Renders a fragment chain the way it reads in a label
pub fn display_chain(fragments: &[Fragment]) -> String {
    fragments.iter().map(|fragment| fragment.to_string()).collect()
}

/// Concatenates a chain made only of literals
pub fn literal_chain(fragments: &[Fragment]) -> Option<String> {
    fragments
        .iter()
        .map(Fragment::as_literal)
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.concat())
}

pub type AttrValue = Vec<Fragment>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("Empty attribute name")]
    EmptyName,
    #[error("Duplicate attribute \"id\" (already set to \"{0}\")")]
    DuplicateId(String),
}

/// Insertion-ordered attribute map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, Vec<AttrValue>>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to `name`, rejecting empty names and a second `id`
    pub fn push(&mut self, name: &str, value: AttrValue) -> Result<(), AttributeError> {
        if name.is_empty() {
            return Err(AttributeError::EmptyName);
        }
        let values = self.0.entry(name.to_string()).or_default();
        if name == "id" {
            if let Some(existing) = values.first() {
                return Err(AttributeError::DuplicateId(display_chain(existing)));
            }
        }
        values.push(value);
        Ok(())
    }

    /// Replaces every value of `name`
    pub fn set(&mut self, name: &str, value: AttrValue) {
        self.0.insert(name.to_string(), vec![value]);
    }

    pub fn get(&self, name: &str) -> Option<&[AttrValue]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The literal text of an attribute, values joined by a space
    ///
    /// Returns `None` when the attribute is missing or carries anything but literals.
    pub fn literal(&self, name: &str) -> Option<String> {
        let values = self.0.get(name)?;
        values
            .iter()
            .map(|value| literal_chain(value))
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(" "))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AttrValue])> {
        self.0
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut attrs = Attributes::new();
        attrs.push("title", vec![Fragment::literal("x")]).unwrap();
        attrs.push("class", vec![Fragment::literal("a")]).unwrap();
        attrs.push("class", vec![Fragment::literal("b")]).unwrap();

        let names: Vec<_> = attrs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["title", "class"]);
        assert_eq!(attrs.literal("class").as_deref(), Some("a b"));
    }

    #[test]
    fn test_second_id_is_rejected() {
        let mut attrs = Attributes::new();
        attrs.push("id", vec![Fragment::literal("a")]).unwrap();
        let err = attrs.push("id", vec![Fragment::literal("b")]).unwrap_err();
        assert_eq!(err, AttributeError::DuplicateId("a".to_string()));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut attrs = Attributes::new();
        assert_eq!(
            attrs.push("", vec![Fragment::Boolean(true)]),
            Err(AttributeError::EmptyName)
        );
    }

    #[test]
    fn test_literal_is_none_with_expressions() {
        let mut attrs = Attributes::new();
        attrs
            .push("class", vec![Fragment::literal("a-"), Fragment::expression("x")])
            .unwrap();
        assert_eq!(attrs.literal("class"), None);
        assert_eq!(display_chain(&attrs.get("class").unwrap()[0]), "a-${x}");
    }
}
