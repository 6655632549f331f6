//! Markup grammar
//!
//! `<name attr attr="value">…</name>`, `<name/>`, `<!-- comment -->`,
//! `<![CDATA[ raw ]]>` and `<!DOCTYPE …>`. Text between tags is kept verbatim, whitespace
//! included. There is no indentation hook: structure comes from the tags alone.
//!
//! Comments and CDATA sections are copied up to their terminator. A `>` that is not
//! preceded by the two terminator characters (`--` or `]]`) is just content, so the scan
//! simply carries on.

use crate::bones::ast::{Element, Fragment, NodeId, Payload, Text, TextValue};
use crate::bones::engine::{Grammar, Lexer, Outcome, Step, Trigger, DEFAULT_STATE};
use crate::bones::error::{ErrorKind, ParseResult};
use once_cell::sync::Lazy;

/// Per-parse state of the markup grammar
#[derive(Debug, Default)]
pub struct MarkupScratch {
    /// Name of the attribute whose value is being read
    attribute: String,
    /// Length of the current run of backslashes inside a value
    slashes: usize,
}

type Lx<'g> = Lexer<'g, MarkupScratch>;

static MARKUP: Lazy<Grammar<MarkupScratch>> =
    Lazy::new(|| build().expect("markup grammar table is well-formed"));

pub fn markup_grammar() -> &'static Grammar<MarkupScratch> {
    &MARKUP
}

/// Parses markup into a tree
pub fn parse_markup(source: &str) -> ParseResult<crate::bones::ast::Tree> {
    MARKUP.parse(source, MarkupScratch::default())
}

fn build() -> Result<Grammar<MarkupScratch>, crate::bones::engine::GrammarError> {
    let ws = Trigger::class("ws");
    let name = Trigger::class("name");

    Grammar::builder("markup")
        .class("ws", &[" ", "\t", "\r", "\n"])
        .class("name", &["a-z", "A-Z", "0-9", "-", "_", ":", "."])
        .class("name_start", &["a-z", "A-Z", "_"])
        .class("attr", &["a-z", "A-Z", "0-9", "-", "_", ":", "@", "."])
        .state(DEFAULT_STATE, |s| {
            s.step('<', Step::to("entry:open"))
                .step(Trigger::Any, Step::begin("text"))
        })
        .state("entry:open", |s| {
            s.step(Trigger::class("name_start"), Step::begin("tag:name"))
                .step('/', Step::to("tag:close"))
                .step('!', Step::to("bang"))
                .fail(Trigger::Any)
        })
        .state("bang", |s| {
            s.step('-', Step::to("comment:await"))
                .step('[', Step::to("cdata:await"))
                .step(Trigger::class("name_start"), Step::begin("dtd"))
                .fail(Trigger::Any)
        })
        .state("comment:await", |s| {
            s.step('-', Step::to("comment:value")).fail(Trigger::Any)
        })
        .state("comment:value", |s| s.call('>', comment_end))
        .state("cdata:await", |s| s.call(Trigger::Any, cdata_open))
        .state("cdata:value", |s| s.call('>', cdata_end))
        .state("dtd", |s| s.call('>', dtd_end))
        .state("text", |s| s.call('<', text_end))
        .state("tag:name", |s| {
            s.step(name, Step::extend())
                .call('/', tag_self_closing)
                .call('>', tag_open)
                .call(ws, tag_attributes)
                .fail(Trigger::Any)
        })
        .state("tag:close", |s| {
            s.step(name, Step::extend())
                .call('>', tag_close)
                .fail(Trigger::Any)
        })
        .state("tag:end", |s| s.step('>', Step::to(DEFAULT_STATE)).fail(Trigger::Any))
        .state("tag:attrs", |s| {
            s.step(Trigger::class("attr"), Step::begin("tag:attr"))
                .step(ws, Step::skip())
                .call('/', attrs_self_closing)
                .step('>', Step::to(DEFAULT_STATE))
                .fail(Trigger::Any)
        })
        .state("tag:attr", |s| {
            s.step(Trigger::class("attr"), Step::extend())
                .call(ws, boolean_attr)
                .call('/', boolean_attr)
                .call('>', boolean_attr)
                .call('=', attr_name)
                .fail(Trigger::Any)
        })
        .state("tag:attr:value:await", |s| {
            s.call('"', value_open).fail(Trigger::Any)
        })
        .state("tag:attr:value:read", |s| {
            s.call('\\', value_backslash)
                .call('"', value_quote)
                .call(Trigger::Any, value_char)
        })
        .on_end(markup_end)
        .build()
}

fn add_text(lx: &mut Lx<'_>, parent: NodeId, value: String) {
    if !value.is_empty() {
        lx.append(
            parent,
            Payload::Text(Text {
                value: TextValue::Plain(value),
                multiline: false,
            }),
        );
    }
}

fn comment_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let token = lx.token();
    match token.strip_suffix("--") {
        Some(value) => {
            let value = value.to_string();
            lx.append(node, Payload::Comment(value));
            Ok(Outcome::to(DEFAULT_STATE))
        }
        None => Ok(Outcome::extend()),
    }
}

const CDATA_OPEN: &str = "CDATA[";

fn cdata_open(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    let token = lx.token();
    if token == CDATA_OPEN {
        return Ok(Outcome::GoTo(Step::begin("cdata:value")));
    }
    let candidate = format!("{}{}", token, lx.ch());
    if CDATA_OPEN.starts_with(&candidate) {
        Ok(Outcome::extend())
    } else {
        Err(lx.error(ErrorKind::Lexical, format!("Invalid section `<![{}`", candidate)))
    }
}

fn cdata_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let token = lx.token();
    match token.strip_suffix("]]") {
        Some(value) => {
            let value = value.to_string();
            lx.append(node, Payload::Cdata(value));
            Ok(Outcome::to(DEFAULT_STATE))
        }
        None => Ok(Outcome::extend()),
    }
}

fn dtd_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let value = lx.take_token();
    lx.append(node, Payload::Dtd(value));
    Ok(Outcome::to(DEFAULT_STATE))
}

fn text_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let value = lx.take_token();
    add_text(lx, node, value);
    Ok(Outcome::to("entry:open"))
}

fn add_tag(lx: &mut Lx<'_>, parent: NodeId) -> NodeId {
    let name = lx.take_token();
    lx.append(parent, Payload::Tag(Element::named(name)))
}

fn tag_self_closing(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    add_tag(lx, node);
    Ok(Outcome::to("tag:end"))
}

fn tag_open(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let tag = add_tag(lx, node);
    Ok(Outcome::Descend(tag))
}

fn tag_attributes(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let tag = add_tag(lx, node);
    Ok(Outcome::DescendAndGoTo(tag, Step::to("tag:attrs")))
}

fn tag_close(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let name = lx.take_token();
    let expected = lx.tree()[node].payload.as_tag().and_then(Element::static_name);
    match (expected, lx.tree().parent(node)) {
        (Some(expected), Some(parent)) if expected == name => Ok(Outcome::Descend(parent)),
        (Some(expected), _) => Err(lx.error(
            ErrorKind::Markup,
            format!("Wrong closing tag \"{}\", must be \"{}\"", name, expected),
        )),
        (None, _) => Err(lx.error(
            ErrorKind::Markup,
            format!("Unexpected closing tag \"{}\"", name),
        )),
    }
}

/// `/` among the attributes: the tag closes itself
fn attrs_self_closing(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    match lx.tree().parent(node) {
        Some(parent) => Ok(Outcome::DescendAndGoTo(parent, Step::to("tag:end"))),
        None => Err(lx.error(ErrorKind::Engine, "Attributes outside of a tag")),
    }
}

fn set_attr(lx: &mut Lx<'_>, node: NodeId, name: &str, value: Fragment) -> ParseResult<()> {
    let result = match lx.tree_mut().node_mut(node).payload.attributes_mut() {
        Some(attributes) => attributes.push(name, vec![value]),
        None => return Err(lx.error(ErrorKind::Engine, "Attributes outside of a tag")),
    };
    result.map_err(|err| lx.error(ErrorKind::Attribute, err.to_string()))
}

fn boolean_attr(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let name = lx.take_token();
    set_attr(lx, node, &name, Fragment::Boolean(true))?;
    attr_done(lx, node)
}

/// Where to go once an attribute is complete, given the character that completed it
fn attr_done(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    match lx.ch() {
        '/' => attrs_self_closing(lx, node),
        '>' => Ok(Outcome::to(DEFAULT_STATE)),
        _ => Ok(Outcome::to("tag:attrs")),
    }
}

fn attr_name(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    lx.scratch.attribute = lx.take_token();
    Ok(Outcome::to("tag:attr:value:await"))
}

fn value_open(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    lx.scratch.slashes = 0;
    Ok(Outcome::to("tag:attr:value:read"))
}

fn value_backslash(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    lx.scratch.slashes += 1;
    Ok(Outcome::extend())
}

fn value_quote(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    if lx.scratch.slashes % 2 == 1 {
        lx.scratch.slashes = 0;
        return Ok(Outcome::extend());
    }
    let raw = lx.take_token();
    let name = std::mem::take(&mut lx.scratch.attribute);
    set_attr(lx, node, &name, Fragment::Literal(unescape(&raw)))?;
    Ok(Outcome::to("tag:attrs"))
}

fn value_char(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    lx.scratch.slashes = 0;
    Ok(Outcome::extend())
}

/// Resolves `\"` and `\\`; other backslashes are kept as written
pub fn unescape(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('\\', Some('"')) | ('\\', Some('\\')) => {
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                }
            }
            _ => value.push(ch),
        }
    }
    value
}

/// Inverse of [`unescape`]
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn markup_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<()> {
    match lx.state() {
        DEFAULT_STATE => {}
        "text" => {
            let value = lx.slice(lx.token_start(), lx.len());
            add_text(lx, node, value);
        }
        state => {
            let what = match state {
                "comment:value" | "comment:await" => "a comment",
                "cdata:value" | "cdata:await" => "a CDATA section",
                "tag:attr:value:read" | "tag:attr:value:await" => "an attribute value",
                "dtd" | "bang" => "a declaration",
                _ => "a tag",
            };
            return Err(lx.error(
                ErrorKind::UnexpectedEnd,
                format!("Input ended inside {}", what),
            ));
        }
    }

    if let Some(element) = lx.tree()[node].payload.as_tag() {
        let message = format!("<{}/> must be closed", element.display_name());
        return Err(lx.error_on(ErrorKind::Unclosed, message, node));
    }
    Ok(())
}
