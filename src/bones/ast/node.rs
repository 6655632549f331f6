//! Nodes and their payloads

use super::fragment::{display_chain, literal_chain, Attributes, Fragment};
use super::range::Position;
use super::tree::NodeId;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Root,
    Tag,
    Text,
    Comment,
    Cdata,
    Dtd,
    HiddenClass,
    Define,
    Call,
    Keyword,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Tag => "tag",
            NodeKind::Text => "text",
            NodeKind::Comment => "comment",
            NodeKind::Cdata => "cdata",
            NodeKind::Dtd => "dtd",
            NodeKind::HiddenClass => "hidden-class",
            NodeKind::Define => "define",
            NodeKind::Call => "call",
            NodeKind::Keyword => "keyword",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag payload: a name chain plus attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub name: Vec<Fragment>,
    pub attributes: Attributes,
    /// `[<]`: keep whitespace before the tag
    pub ws_before: bool,
    /// `[>]`: keep whitespace after the tag
    pub ws_after: bool,
}

impl Element {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: vec![Fragment::literal(name)],
            ..Self::default()
        }
    }

    pub fn with_name(name: Vec<Fragment>) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// The name when it has no expressions in it
    pub fn static_name(&self) -> Option<String> {
        literal_chain(&self.name)
    }

    pub fn display_name(&self) -> String {
        display_chain(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TextValue {
    Plain(String),
    Fragments(Vec<Fragment>),
}

impl TextValue {
    /// Collapses a chain made only of literals into plain text
    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        match literal_chain(&fragments) {
            Some(plain) => TextValue::Plain(plain),
            None => TextValue::Fragments(fragments),
        }
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            TextValue::Plain(text) => Some(text),
            TextValue::Fragments(_) => None,
        }
    }

    pub fn fragments(&self) -> Vec<Fragment> {
        match self {
            TextValue::Plain(text) => vec![Fragment::literal(text.clone())],
            TextValue::Fragments(fragments) => fragments.clone(),
        }
    }
}

impl fmt::Display for TextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextValue::Plain(text) => f.write_str(text),
            TextValue::Fragments(fragments) => f.write_str(&display_chain(fragments)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub value: TextValue,
    pub multiline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefineKind {
    Brace,
    Bracket,
    Parenthesis,
}

impl DefineKind {
    pub fn from_open(ch: char) -> Option<Self> {
        match ch {
            '{' => Some(DefineKind::Brace),
            '[' => Some(DefineKind::Bracket),
            '(' => Some(DefineKind::Parenthesis),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            DefineKind::Brace => '{',
            DefineKind::Bracket => '[',
            DefineKind::Parenthesis => '(',
        }
    }

    pub fn close(self) -> char {
        match self {
            DefineKind::Brace => '}',
            DefineKind::Bracket => ']',
            DefineKind::Parenthesis => ')',
        }
    }
}

/// `name = (a, b)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Define {
    pub name: String,
    pub kind: DefineKind,
    pub params: Vec<String>,
}

/// `name(args…)`; arguments are kept as raw source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    pub name: String,
    pub args: Vec<String>,
}

/// A matched keyword directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: String,
    /// Index of the variant that matched, once matching completed
    pub variant: Option<usize>,
    pub attributes: IndexMap<String, String>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variant: None,
            attributes: IndexMap::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum Payload {
    Root,
    Tag(Element),
    Text(Text),
    Comment(String),
    Cdata(String),
    Dtd(String),
    /// `%name`: a class that only exists to be inherited by the children
    HiddenClass(Attributes),
    Define(Define),
    Call(Call),
    Keyword(Directive),
}

impl Payload {
    pub fn kind(&self) -> NodeKind {
        match self {
            Payload::Root => NodeKind::Root,
            Payload::Tag(_) => NodeKind::Tag,
            Payload::Text(_) => NodeKind::Text,
            Payload::Comment(_) => NodeKind::Comment,
            Payload::Cdata(_) => NodeKind::Cdata,
            Payload::Dtd(_) => NodeKind::Dtd,
            Payload::HiddenClass(_) => NodeKind::HiddenClass,
            Payload::Define(_) => NodeKind::Define,
            Payload::Call(_) => NodeKind::Call,
            Payload::Keyword(_) => NodeKind::Keyword,
        }
    }

    /// One-line summary used by treeviz and error messages
    pub fn label(&self) -> String {
        match self {
            Payload::Root => "root".to_string(),
            Payload::Tag(element) => {
                let mut label = element.display_name();
                for (name, values) in element.attributes.iter() {
                    let rendered: Vec<String> =
                        values.iter().map(|value| display_chain(value)).collect();
                    match name {
                        "id" => label.push_str(&format!("#{}", rendered.join("#"))),
                        "class" => label.push_str(&format!(".{}", rendered.join("."))),
                        _ => label.push_str(&format!("[{}={}]", name, rendered.join(","))),
                    }
                }
                label
            }
            Payload::Text(text) => text.value.to_string(),
            Payload::Comment(value) | Payload::Cdata(value) | Payload::Dtd(value) => {
                value.clone()
            }
            Payload::HiddenClass(attributes) => attributes
                .get("class")
                .and_then(|values| values.first())
                .map(|value| display_chain(value))
                .unwrap_or_default(),
            Payload::Define(define) => format!(
                "{} = {}{}{}",
                define.name,
                define.kind.open(),
                define.params.join(", "),
                define.kind.close()
            ),
            Payload::Call(call) => format!("{}({})", call.name, call.args.join(", ")),
            Payload::Keyword(directive) => {
                let attrs: Vec<String> = directive
                    .attributes
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                format!("{} {}", directive.name, attrs.join(" "))
                    .trim_end()
                    .to_string()
            }
        }
    }

    pub fn as_tag(&self) -> Option<&Element> {
        match self {
            Payload::Tag(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_tag_mut(&mut self) -> Option<&mut Element> {
        match self {
            Payload::Tag(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            Payload::Keyword(directive) => Some(directive),
            _ => None,
        }
    }

    pub fn as_directive_mut(&mut self) -> Option<&mut Directive> {
        match self {
            Payload::Keyword(directive) => Some(directive),
            _ => None,
        }
    }

    /// Attributes of payloads that carry them
    pub fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Payload::Tag(element) => Some(&mut element.attributes),
            Payload::HiddenClass(attributes) => Some(attributes),
            _ => None,
        }
    }
}

/// A node of the tree
///
/// Structure (parent, children) is only changed through [`super::Tree`]; payload and flags
/// are open to the grammar that builds the node.
#[derive(Debug, Clone)]
pub struct Node {
    pub payload: Payload,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Opened with `{` and only closed by the matching `}`
    pub group: bool,
    /// Opened in single-line shorthand (`a > b`); closes after its one unit
    pub shorty: bool,
    /// Char offset where the node was opened
    pub offset: usize,
    pub position: Position,
}

impl Node {
    pub(crate) fn new(payload: Payload, parent: Option<NodeId>, offset: usize, position: Position) -> Self {
        Self {
            payload,
            parent,
            children: Vec::new(),
            group: false,
            shorty: false,
            offset,
            position,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Short human description, e.g. ``tag `div` ``
    pub fn describe(&self) -> String {
        match &self.payload {
            Payload::Root => "root".to_string(),
            Payload::Tag(element) => format!("tag `{}`", element.display_name()),
            Payload::Keyword(directive) => format!("keyword `{}`", directive.name),
            Payload::Define(define) => format!("define `{}`", define.name),
            Payload::Call(call) => format!("call `{}`", call.name),
            other => other.kind().to_string(),
        }
    }
}
