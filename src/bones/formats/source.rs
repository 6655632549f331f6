//! Source serializers
//!
//! [`to_template`] and [`to_markup`] write a tree back out as text that parses to a tree of
//! the same shape (see [`Tree::same_shape`]). Flags and positions are not preserved: a
//! template is always written with two-space indentation, one entry per line.
//!
//! Template output
//!
//!     tags           name, then `.class`/`#id` shorthand when every value of the attribute
//!                    is shorthand-safe, then one bracket per remaining attribute
//!     conditional    `class.name: test` lines at the top of the tag body
//!     text           `| text`, or a `|>` block for multi-line text
//!     keywords       rebuilt from the variant that matched
//!     CDATA          a `.|` markup fragment line
//!     markup names   a tag whose name only markup allows (`svg:rect`) is written with its
//!                    subtree as a `.|` markup fragment line
//!
//! Markup output has no syntax for keywords, defines, calls, hidden classes or expression
//! fragments; trees holding them are rejected with [`FormatError::Unsupported`].

use super::registry::{FormatError, Formatter};
use crate::bones::ast::{AttrValue, Element, Fragment, InheritFrom, NodeId, Payload, Text, Tree};
use crate::bones::grammars::markup::escape;
use crate::bones::keywords::{Element as PatternElement, KeywordRegistry};
use once_cell::sync::Lazy;
use regex::Regex;

static SHORTHAND_SAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());
static TEMPLATE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

const INDENT: &str = "  ";

fn fragment_source(fragment: &Fragment) -> String {
    match fragment {
        Fragment::Literal(value) => value.clone(),
        Fragment::Expression(source) => format!("${{{}}}", source),
        Fragment::Inherit(_) => "&".to_string(),
        Fragment::Boolean(value) => value.to_string(),
        Fragment::Group { fragments, .. } => chain_source(fragments),
    }
}

fn chain_source(fragments: &[Fragment]) -> String {
    fragments.iter().map(fragment_source).collect()
}

fn is_shorthand_safe(value: &AttrValue) -> bool {
    !value.is_empty()
        && value.iter().all(|fragment| match fragment {
            Fragment::Literal(literal) => SHORTHAND_SAFE.is_match(literal),
            Fragment::Expression(_) | Fragment::Inherit(InheritFrom::Parent) => true,
            _ => false,
        })
}

fn is_conditional(value: &AttrValue) -> bool {
    matches!(value.as_slice(), [Fragment::Group { .. }])
}

/// A quoted attribute value
fn quoted(value: &AttrValue) -> String {
    let inner: String = value
        .iter()
        .map(|fragment| match fragment {
            Fragment::Literal(literal) => escape(literal),
            other => fragment_source(other),
        })
        .collect();
    format!("\"{}\"", inner)
}

// ----------------------------------------------------------------------
// Template
// ----------------------------------------------------------------------

/// Writes `tree` as a template; `keywords` supplies the variants keyword nodes matched
pub fn to_template(tree: &Tree, keywords: &KeywordRegistry) -> Result<String, FormatError> {
    let mut out = String::new();
    for child in tree.children(tree.root()) {
        write_template_node(&mut out, tree, *child, 0, keywords)?;
    }
    Ok(out)
}

fn write_template_node(
    out: &mut String,
    tree: &Tree,
    id: NodeId,
    depth: usize,
    keywords: &KeywordRegistry,
) -> Result<(), FormatError> {
    let indent = INDENT.repeat(depth);
    let node = &tree[id];
    match &node.payload {
        Payload::Root => {}
        Payload::Tag(element) if !has_template_name(element) => {
            let mut markup = String::new();
            write_markup_node(&mut markup, tree, id)?;
            if markup.contains('\n') {
                return Err(FormatError::Unsupported {
                    format: "template",
                    node: format!("multi-line markup under {}", node.describe()),
                });
            }
            out.push_str(&format!("{}.|{}\n", indent, markup));
            return Ok(());
        }
        Payload::Tag(element) => {
            out.push_str(&format!("{}{}\n", indent, tag_line(element)));
            for value in element.attributes.get("class").unwrap_or_default() {
                if let [Fragment::Group { test, fragments }] = value.as_slice() {
                    let body = INDENT.repeat(depth + 1);
                    out.push_str(&format!("{}class.{}: {}\n", body, chain_source(fragments), test));
                }
            }
        }
        Payload::Text(text) => write_template_text(out, &indent, text),
        Payload::Comment(value) if value.contains('\n') => {
            out.push_str(&format!("{}/*{}*/\n", indent, value));
        }
        Payload::Comment(value) => out.push_str(&format!("{}//{}\n", indent, value)),
        Payload::Cdata(value) => out.push_str(&format!("{}.|<![CDATA[{}]]>\n", indent, value)),
        Payload::Dtd(value) => out.push_str(&format!("{}!{}\n", indent, value)),
        Payload::HiddenClass(attributes) => {
            let name = attributes
                .get("class")
                .and_then(|values| values.first())
                .and_then(|value| value.iter().find_map(Fragment::as_literal))
                .unwrap_or_default();
            out.push_str(&format!("{}%{}\n", indent, name));
        }
        Payload::Define(define) => {
            out.push_str(&format!(
                "{}{} = {}{}{}\n",
                indent,
                define.name,
                define.kind.open(),
                define.params.join(", "),
                define.kind.close()
            ));
        }
        Payload::Call(call) => {
            out.push_str(&format!("{}{}({})\n", indent, call.name, call.args.join(", ")));
        }
        Payload::Keyword(directive) => {
            let def = keywords.get(&directive.name).ok_or_else(|| FormatError::Unsupported {
                format: "template",
                node: format!("unknown keyword `{}`", directive.name),
            })?;
            let variant = directive
                .variant
                .and_then(|index| def.variants().get(index))
                .ok_or_else(|| FormatError::Unsupported {
                    format: "template",
                    node: format!("unmatched keyword `{}`", directive.name),
                })?;
            let mut line = directive.name.clone();
            for element in &variant.elements {
                match element {
                    PatternElement::Literal(ch) => line.push(*ch),
                    PatternElement::Space => line.push(' '),
                    PatternElement::Slot(slot) => {
                        line.push_str(directive.attribute(&slot.attribute).unwrap_or_default())
                    }
                }
            }
            out.push_str(&format!("{}{}\n", indent, line));
        }
    }

    for child in node.children() {
        write_template_node(out, tree, *child, depth + 1, keywords)?;
    }
    Ok(())
}

/// Names read back by the template grammar; others (`svg:rect`) only come from markup
fn has_template_name(element: &Element) -> bool {
    match crate::bones::ast::literal_chain(&element.name) {
        Some(name) => TEMPLATE_NAME.is_match(&name),
        None => true,
    }
}

fn tag_line(element: &Element) -> String {
    let mut line = chain_source(&element.name);
    let mut brackets = Vec::new();
    if element.ws_before || element.ws_after {
        let flags = format!(
            "{}{}",
            if element.ws_before { "<" } else { "" },
            if element.ws_after { ">" } else { "" }
        );
        brackets.push(flags);
    }

    for (name, values) in element.attributes.iter() {
        let values: Vec<&AttrValue> = values.iter().filter(|value| !is_conditional(value)).collect();
        let shorthand = match name {
            "class" => Some('.'),
            "id" => Some('#'),
            _ => None,
        };
        match shorthand {
            Some(mark) if values.iter().all(|value| is_shorthand_safe(value)) => {
                for value in values {
                    line.push(mark);
                    line.push_str(&chain_source(value));
                }
            }
            _ => {
                for value in values {
                    match value.as_slice() {
                        [Fragment::Boolean(true)] => brackets.push(name.to_string()),
                        _ => brackets.push(format!("{}={}", name, quoted(value))),
                    }
                }
            }
        }
    }

    for bracket in brackets {
        line.push_str(&format!("[{}]", bracket));
    }
    line
}

fn write_template_text(out: &mut String, indent: &str, text: &Text) {
    let content = chain_source(&text.value.fragments());
    if text.multiline {
        out.push_str(&format!("{}|>\n{}\n{}|\n", indent, content, indent));
    } else {
        out.push_str(&format!("{}| {}\n", indent, content));
    }
}

// ----------------------------------------------------------------------
// Markup
// ----------------------------------------------------------------------

pub fn to_markup(tree: &Tree) -> Result<String, FormatError> {
    let mut out = String::new();
    for child in tree.children(tree.root()) {
        write_markup_node(&mut out, tree, *child)?;
    }
    Ok(out)
}

fn unsupported(tree: &Tree, id: NodeId) -> FormatError {
    FormatError::Unsupported {
        format: "markup",
        node: tree[id].describe(),
    }
}

fn literal_only(tree: &Tree, id: NodeId, fragments: &[Fragment]) -> Result<String, FormatError> {
    crate::bones::ast::literal_chain(fragments).ok_or_else(|| unsupported(tree, id))
}

fn write_markup_node(out: &mut String, tree: &Tree, id: NodeId) -> Result<(), FormatError> {
    let node = &tree[id];
    match &node.payload {
        Payload::Tag(element) => {
            let name = literal_only(tree, id, &element.name)?;
            out.push('<');
            out.push_str(&name);
            for (attribute, values) in element.attributes.iter() {
                for value in values {
                    match value.as_slice() {
                        [Fragment::Boolean(true)] => out.push_str(&format!(" {}", attribute)),
                        _ => {
                            let literal = literal_only(tree, id, value)?;
                            out.push_str(&format!(" {}=\"{}\"", attribute, escape(&literal)));
                        }
                    }
                }
            }
            if node.children().is_empty() {
                out.push_str("/>");
                return Ok(());
            }
            out.push('>');
            for child in node.children() {
                write_markup_node(out, tree, *child)?;
            }
            out.push_str(&format!("</{}>", name));
        }
        Payload::Text(text) => {
            let value = literal_only(tree, id, &text.value.fragments())?;
            out.push_str(&value);
        }
        Payload::Comment(value) => out.push_str(&format!("<!--{}-->", value)),
        Payload::Cdata(value) => out.push_str(&format!("<![CDATA[{}]]>", value)),
        Payload::Dtd(value) => out.push_str(&format!("<!{}>", value)),
        _ => return Err(unsupported(tree, id)),
    }
    Ok(())
}

pub struct TemplateFormatter {
    keywords: KeywordRegistry,
}

impl TemplateFormatter {
    pub fn new(keywords: KeywordRegistry) -> Self {
        Self { keywords }
    }
}

impl Default for TemplateFormatter {
    fn default() -> Self {
        Self::new(KeywordRegistry::standard())
    }
}

impl Formatter for TemplateFormatter {
    fn name(&self) -> &str {
        "template"
    }

    fn serialize(&self, tree: &Tree) -> Result<String, FormatError> {
        to_template(tree, &self.keywords)
    }

    fn description(&self) -> &str {
        "Template source"
    }
}

pub struct MarkupFormatter;

impl Formatter for MarkupFormatter {
    fn name(&self) -> &str {
        "markup"
    }

    fn serialize(&self, tree: &Tree) -> Result<String, FormatError> {
        to_markup(tree)
    }

    fn description(&self) -> &str {
        "Markup source"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::ast::Position;

    #[test]
    fn test_shorthand_needs_every_value_safe() {
        let mut element = Element::named("a");
        element.attributes.push("class", vec![Fragment::literal("x")]).unwrap();
        element.attributes.push("id", vec![Fragment::literal("main")]).unwrap();
        element.attributes.push("href", vec![Fragment::literal("/\"q\"")]).unwrap();
        element.attributes.push("hidden", vec![Fragment::Boolean(true)]).unwrap();
        assert_eq!(tag_line(&element), r#"a.x#main[href="/\"q\""][hidden]"#);

        element.attributes.push("class", vec![Fragment::literal("has space")]).unwrap();
        assert_eq!(
            tag_line(&element),
            r#"a#main[class="x"][class="has space"][href="/\"q\""][hidden]"#
        );
    }

    #[test]
    fn test_markup_rejects_template_only_nodes() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append(
            root,
            Payload::Keyword(crate::bones::ast::Directive::new("if")),
            0,
            Position::default(),
        );
        assert!(matches!(to_markup(&tree), Err(FormatError::Unsupported { .. })));
    }

    #[test]
    fn test_markup_only_names_go_back_as_a_fragment() {
        let source = "div\n  .|<svg:rect x=\"1\"><b>t</b></svg:rect>\n";
        let tree = crate::bones::grammars::template::parse_template(source).unwrap();
        let written = to_template(&tree, &KeywordRegistry::standard()).unwrap();
        assert_eq!(written, source);
        let again = crate::bones::grammars::template::parse_template(&written).unwrap();
        assert!(again.same_shape(&tree));
    }
}
