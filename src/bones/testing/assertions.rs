//! Fluent assertions over a parsed tree

use super::matchers::TextMatch;
use crate::bones::ast::{
    display_chain, AttrValue, DefineKind, Directive, Element, Fragment, InheritFrom, NodeId,
    NodeKind, Payload, Text, Tree,
};

/// Entry point: assertions on the children of the root
pub fn assert_tree(tree: &Tree) -> TreeAssertion<'_> {
    TreeAssertion {
        node: NodeAssertion {
            tree,
            id: tree.root(),
            context: "root".to_string(),
        },
    }
}

pub struct TreeAssertion<'a> {
    node: NodeAssertion<'a>,
}

impl<'a> TreeAssertion<'a> {
    pub fn child_count(self, expected: usize) -> Self {
        Self {
            node: self.node.child_count(expected),
        }
    }

    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>) -> NodeAssertion<'a>,
    {
        Self {
            node: self.node.child(index, assertion),
        }
    }

    /// Assertions on the root node itself
    pub fn root(self) -> NodeAssertion<'a> {
        self.node
    }
}

pub struct NodeAssertion<'a> {
    tree: &'a Tree,
    id: NodeId,
    context: String,
}

fn summarize(tree: &Tree, ids: &[NodeId]) -> String {
    ids.iter()
        .map(|id| format!("{} {}", tree[*id].kind(), tree[*id].payload.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> NodeAssertion<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn payload(&self) -> &'a Payload {
        &self.tree[self.id].payload
    }

    fn mismatch(&self, expected: &str) -> ! {
        panic!(
            "{}: Expected {}, found {}",
            self.context,
            expected,
            self.tree[self.id].describe()
        );
    }

    fn element(&self) -> &'a Element {
        match self.payload() {
            Payload::Tag(element) => element,
            _ => self.mismatch("a tag"),
        }
    }

    fn text(&self) -> &'a Text {
        match self.payload() {
            Payload::Text(text) => text,
            _ => self.mismatch("a text"),
        }
    }

    fn directive(&self) -> &'a Directive {
        match self.payload() {
            Payload::Keyword(directive) => directive,
            _ => self.mismatch("a keyword"),
        }
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn kind(self, expected: NodeKind) -> Self {
        let actual = self.tree[self.id].kind();
        assert_eq!(
            actual, expected,
            "{}: Expected a {} node, found a {} node",
            self.context, expected, actual
        );
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        let children = self.tree.children(self.id);
        assert_eq!(
            children.len(),
            expected,
            "{}: Expected {} children, found {} children: [{}]",
            self.context,
            expected,
            children.len(),
            summarize(self.tree, children)
        );
        self
    }

    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>) -> NodeAssertion<'a>,
    {
        let children = self.tree.children(self.id);
        assert!(
            index < children.len(),
            "{}: Child index {} out of bounds (node has {} children)",
            self.context,
            index,
            children.len()
        );
        assertion(NodeAssertion {
            tree: self.tree,
            id: children[index],
            context: format!("{}[{}]", self.context, index),
        });
        self
    }

    pub fn group(self, expected: bool) -> Self {
        let actual = self.tree[self.id].group;
        assert_eq!(actual, expected, "{}: Expected group={}, found group={}", self.context, expected, actual);
        self
    }

    pub fn shorty(self, expected: bool) -> Self {
        let actual = self.tree[self.id].shorty;
        assert_eq!(actual, expected, "{}: Expected shorty={}, found shorty={}", self.context, expected, actual);
        self
    }

    /// 0-based source line the node was opened on
    pub fn line(self, expected: usize) -> Self {
        let actual = self.tree[self.id].position.line;
        assert_eq!(actual, expected, "{}: Expected line {}, found line {}", self.context, expected, actual);
        self
    }

    // ------------------------------------------------------------------
    // Tags and attributes
    // ------------------------------------------------------------------

    /// A tag whose name (rendered with `${…}` for expressions) is `name`
    pub fn assert_tag(self, name: &str) -> Self {
        let actual = match self.payload() {
            Payload::Tag(element) => element.display_name(),
            _ => self.mismatch(&format!("tag `{}`", name)),
        };
        assert_eq!(actual, name, "{}: Expected tag `{}`, found tag `{}`", self.context, name, actual);
        self
    }

    pub fn name_fragments(self, expected: &[Fragment]) -> Self {
        let actual = &self.element().name;
        assert_eq!(actual.as_slice(), expected, "{}: Expected name fragments {:?}, found {:?}", self.context, expected, actual);
        self
    }

    pub fn attr_count(self, expected: usize) -> Self {
        let actual = self.element().attributes.len();
        assert_eq!(actual, expected, "{}: Expected {} attributes, found {}", self.context, expected, actual);
        self
    }

    pub fn has_attr(self, name: &str) -> Self {
        assert!(
            self.attributes_of(name).is_some(),
            "{}: Expected attribute `{}`",
            self.context,
            name
        );
        self
    }

    pub fn no_attr(self, name: &str) -> Self {
        assert!(
            self.attributes_of(name).is_none(),
            "{}: Expected no attribute `{}`",
            self.context,
            name
        );
        self
    }

    fn attributes_of(&self, name: &str) -> Option<&'a [AttrValue]> {
        match self.payload() {
            Payload::Tag(element) => element.attributes.get(name),
            Payload::HiddenClass(attributes) => attributes.get(name),
            _ => self.mismatch("a node with attributes"),
        }
    }

    /// Literal values of `name`, joined with spaces (`class` of `div.a.b` is `"a b"`)
    pub fn attr_literal(self, name: &str, expected: &str) -> Self {
        let values = self
            .attributes_of(name)
            .unwrap_or_else(|| panic!("{}: Expected attribute `{}`", self.context, name));
        let rendered: Vec<String> = values.iter().map(|value| display_chain(value)).collect();
        let actual = rendered.join(" ");
        assert_eq!(actual, expected, "{}: Expected `{}` to be '{}', found '{}'", self.context, name, expected, actual);
        self
    }

    pub fn attr_values(self, name: &str, expected: &[AttrValue]) -> Self {
        let actual = self
            .attributes_of(name)
            .unwrap_or_else(|| panic!("{}: Expected attribute `{}`", self.context, name));
        assert_eq!(actual, expected, "{}: Expected `{}` values {:?}, found {:?}", self.context, name, expected, actual);
        self
    }

    pub fn ws(self, before: bool, after: bool) -> Self {
        let element = self.element();
        assert_eq!(
            (element.ws_before, element.ws_after),
            (before, after),
            "{}: Expected whitespace flags ({}, {}), found ({}, {})",
            self.context,
            before,
            after,
            element.ws_before,
            element.ws_after
        );
        self
    }

    // ------------------------------------------------------------------
    // Text and raw content
    // ------------------------------------------------------------------

    /// A text node reading exactly `expected` (`${…}` for expressions)
    pub fn assert_text(self, expected: &str) -> Self {
        TextMatch::Exact(expected.to_string()).assert(&self.text().value.to_string(), &self.context);
        self
    }

    pub fn text_starts_with(self, prefix: &str) -> Self {
        TextMatch::StartsWith(prefix.to_string()).assert(&self.text().value.to_string(), &self.context);
        self
    }

    pub fn text_contains(self, substring: &str) -> Self {
        TextMatch::Contains(substring.to_string()).assert(&self.text().value.to_string(), &self.context);
        self
    }

    pub fn text_fragments(self, expected: &[Fragment]) -> Self {
        let actual = self.text().value.fragments();
        assert_eq!(actual.as_slice(), expected, "{}: Expected text fragments {:?}, found {:?}", self.context, expected, actual);
        self
    }

    pub fn multiline(self, expected: bool) -> Self {
        let actual = self.text().multiline;
        assert_eq!(actual, expected, "{}: Expected multiline={}, found multiline={}", self.context, expected, actual);
        self
    }

    pub fn assert_comment(self, expected: &str) -> Self {
        match self.payload() {
            Payload::Comment(value) => TextMatch::Exact(expected.to_string()).assert(value, &self.context),
            _ => self.mismatch("a comment"),
        }
        self
    }

    pub fn assert_cdata(self, expected: &str) -> Self {
        match self.payload() {
            Payload::Cdata(value) => TextMatch::Exact(expected.to_string()).assert(value, &self.context),
            _ => self.mismatch("a CDATA section"),
        }
        self
    }

    pub fn assert_dtd(self, expected: &str) -> Self {
        match self.payload() {
            Payload::Dtd(value) => TextMatch::Exact(expected.to_string()).assert(value, &self.context),
            _ => self.mismatch("a declaration"),
        }
        self
    }

    // ------------------------------------------------------------------
    // Template constructs
    // ------------------------------------------------------------------

    pub fn assert_hidden_class(self, name: &str) -> Self {
        let values = match self.payload() {
            Payload::HiddenClass(attributes) => attributes.get("class"),
            _ => self.mismatch("a hidden class"),
        };
        let expected = [vec![
            Fragment::Inherit(InheritFrom::Parent),
            Fragment::literal(name),
        ]];
        assert_eq!(values, Some(&expected[..]), "{}: Expected hidden class `{}`", self.context, name);
        self
    }

    pub fn assert_define(self, name: &str, kind: DefineKind, params: &[&str]) -> Self {
        match self.payload() {
            Payload::Define(define) => {
                assert_eq!(define.name, name, "{}: Expected define `{}`, found `{}`", self.context, name, define.name);
                assert_eq!(define.kind, kind, "{}: Expected {:?} parameters, found {:?}", self.context, kind, define.kind);
                assert_eq!(define.params, params, "{}: Expected parameters {:?}, found {:?}", self.context, params, define.params);
            }
            _ => self.mismatch(&format!("define `{}`", name)),
        }
        self
    }

    pub fn assert_call(self, name: &str, args: &[&str]) -> Self {
        match self.payload() {
            Payload::Call(call) => {
                assert_eq!(call.name, name, "{}: Expected call `{}`, found `{}`", self.context, name, call.name);
                assert_eq!(call.args, args, "{}: Expected arguments {:?}, found {:?}", self.context, args, call.args);
            }
            _ => self.mismatch(&format!("call `{}`", name)),
        }
        self
    }

    pub fn assert_keyword(self, name: &str) -> Self {
        let actual = &self.directive().name;
        assert_eq!(actual, name, "{}: Expected keyword `{}`, found keyword `{}`", self.context, name, actual);
        self
    }

    pub fn variant(self, expected: usize) -> Self {
        let actual = self.directive().variant;
        assert_eq!(actual, Some(expected), "{}: Expected variant {}, found {:?}", self.context, expected, actual);
        self
    }

    pub fn keyword_attr(self, name: &str, expected: &str) -> Self {
        let actual = self.directive().attribute(name);
        assert_eq!(actual, Some(expected), "{}: Expected `@{}` to be '{}', found {:?}", self.context, name, expected, actual);
        self
    }
}
