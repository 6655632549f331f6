//! Entries: tag names, shorthand, attributes, define and call

use super::{structure, Lx};
use crate::bones::ast::{
    display_chain, literal_chain, AttrValue, Attributes, Call, Define, DefineKind, Element, Fragment, InheritFrom,
    NodeId, Payload,
};
use crate::bones::engine::capture::split_arguments;
use crate::bones::engine::{Outcome, Step, DEFAULT_STATE};
use crate::bones::error::{ErrorKind, ParseError, ParseResult};
use crate::bones::grammars::markup::{parse_markup, unescape};

/// Captures `${…}` at the cursor, leaving the cursor on the closing brace
fn expression(lx: &mut Lx<'_>) -> ParseResult<Option<Fragment>> {
    if lx.peek(1) != Some('{') {
        return Ok(None);
    }
    let source = lx.capture_balanced(lx.pos() + 1, '}')?;
    Ok(Some(Fragment::expression(source.trim())))
}

fn invalid_character(lx: &Lx<'_>) -> ParseError {
    let message = format!("Invalid character `{}`", lx.ch().escape_debug());
    lx.error(ErrorKind::Lexical, message)
}

fn push_literal(chain: &mut Vec<Fragment>, value: String) {
    if !value.is_empty() {
        chain.push(Fragment::Literal(value));
    }
}

fn push_attribute(lx: &mut Lx<'_>, node: NodeId, name: &str, value: AttrValue) -> ParseResult<()> {
    let result = match lx.tree_mut().node_mut(node).payload.attributes_mut() {
        Some(attributes) => attributes.push(name, value),
        None => {
            let message = format!("Attribute `{}` outside of a tag", name);
            return Err(lx.error(ErrorKind::Attribute, message));
        }
    };
    result.map_err(|err| lx.error(ErrorKind::Attribute, err.to_string()))
}

// ----------------------------------------------------------------------
// Names
// ----------------------------------------------------------------------

/// `$` at the start of a line: a name that starts with an expression
pub(super) fn name_expression_start(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    match expression(lx)? {
        Some(fragment) => {
            lx.scratch.name_chain.push(fragment);
            Ok(Outcome::to("entry"))
        }
        None => Err(invalid_character(lx)),
    }
}

pub(super) fn name_expression(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    let literal = lx.token();
    match expression(lx)? {
        Some(fragment) => {
            push_literal(&mut lx.scratch.name_chain, literal);
            lx.scratch.name_chain.push(fragment);
            Ok(Outcome::skip())
        }
        None => Err(invalid_character(lx)),
    }
}

/// The name read so far, and whether blanks followed it
fn finish_name(lx: &mut Lx<'_>) -> (Vec<Fragment>, bool) {
    let token = lx.take_token();
    let trimmed = token.trim_end();
    let had_blank = trimmed.len() < token.len();
    let mut name = std::mem::take(&mut lx.scratch.name_chain);
    push_literal(&mut name, trimmed.to_string());
    (name, had_blank)
}

/// The character after a name decides what the entry is
pub(super) fn entry_stopper(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let (name, had_blank) = finish_name(lx);
    if let Some(outcome) = structure::start_keyword(lx, node, &name, had_blank)? {
        return Ok(outcome);
    }

    let ch = lx.ch();
    match ch {
        '.' if literal_chain(&name).as_deref() == Some("class") => {
            lx.scratch.value_chain.clear();
            return Ok(Outcome::to("class_attr"));
        }
        '(' => return call(lx, node, &name),
        '=' => return define(lx, node, &name),
        _ => {}
    }

    let tag = lx.append(node, Payload::Tag(Element::with_name(name)));
    match ch {
        '.' | '#' => {
            lx.scratch.shorthand = ch;
            lx.scratch.value_chain.clear();
            Ok(Outcome::DescendAndGoTo(tag, Step::to("id_or_class")))
        }
        '[' => Ok(Outcome::DescendAndGoTo(tag, Step::to("inline_attr:await"))),
        _ => Ok(Outcome::DescendAndGoTo(tag, Step::reconsume("entry:group"))),
    }
}

/// A character after the name and its blanks that no entry accepts: only a keyword may
/// continue here
pub(super) fn keyword_after_blank(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let (name, had_blank) = finish_name(lx);
    match structure::start_keyword(lx, node, &name, had_blank)? {
        Some(outcome) => Ok(outcome),
        None => Err(invalid_character(lx)),
    }
}

fn static_name(lx: &Lx<'_>, name: &[Fragment], what: &str) -> ParseResult<String> {
    literal_chain(name).ok_or_else(|| {
        lx.error(
            ErrorKind::Lexical,
            format!("The name of a {} cannot contain expressions", what),
        )
    })
}

// ----------------------------------------------------------------------
// Define and call
// ----------------------------------------------------------------------

/// `name(args)`: the arguments are kept as opaque source
fn call(lx: &mut Lx<'_>, node: NodeId, name: &[Fragment]) -> ParseResult<Outcome> {
    let name = static_name(lx, name, "call")?;
    let source = lx.capture_balanced(lx.pos(), ')')?;
    let args = split_arguments(&source);
    let call = lx.append(node, Payload::Call(Call { name, args }));
    Ok(Outcome::DescendAndGoTo(call, Step::to("entry:group")))
}

/// `name = (params)`; the bracket kind is set once the opener is read
fn define(lx: &mut Lx<'_>, node: NodeId, name: &[Fragment]) -> ParseResult<Outcome> {
    let name = static_name(lx, name, "define")?;
    let define = lx.append(
        node,
        Payload::Define(Define {
            name,
            kind: DefineKind::Parenthesis,
            params: Vec::new(),
        }),
    );
    Ok(Outcome::DescendAndGoTo(define, Step::to("define")))
}

fn define_mut<'a>(lx: &'a mut Lx<'_>, node: NodeId) -> ParseResult<&'a mut Define> {
    let error = lx.error(ErrorKind::Engine, "Parameters outside of a define");
    match &mut lx.tree_mut().node_mut(node).payload {
        Payload::Define(define) => Ok(define),
        _ => Err(error),
    }
}

pub(super) fn define_open(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let kind = DefineKind::from_open(lx.ch()).ok_or_else(|| invalid_character(lx))?;
    define_mut(lx, node)?.kind = kind;
    Ok(Outcome::to("define:params"))
}

pub(super) fn define_param(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let param = lx.take_token();
    if !param.is_empty() {
        define_mut(lx, node)?.params.push(param);
    }
    Ok(Outcome::skip())
}

pub(super) fn define_close(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    define_param(lx, node)?;
    let expected = define_mut(lx, node)?.kind.close();
    if lx.ch() != expected {
        let message = format!("Expected `{}`, found `{}`", expected, lx.ch());
        return Err(lx.error(ErrorKind::Lexical, message));
    }
    Ok(Outcome::to("entry:group"))
}

// ----------------------------------------------------------------------
// Shorthand
// ----------------------------------------------------------------------

/// `.` or `#` at the start of a line: the shorthand tag, or a markup fragment for `.|`
/// and `#|`
pub(super) fn shorthand_start(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let ch = lx.ch();
    if lx.peek(1) == Some('|') {
        return markup_fragment(lx, node);
    }
    let name = lx.scratch.settings.shorthand_tag.clone();
    let tag = lx.append(node, Payload::Tag(Element::named(name)));
    lx.scratch.shorthand = ch;
    lx.scratch.value_chain.clear();
    Ok(Outcome::DescendAndGoTo(tag, Step::to("id_or_class")))
}

/// `.|<b>markup</b>`: the rest of the line is parsed as markup and grafted under `node`
fn markup_fragment(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let start = lx.pos() + 2;
    let origin = lx.position(start);
    lx.advance_to(start);
    let source = lx.capture_line();
    let fragment = parse_markup(&source).map_err(|err| err.relocated(start, origin))?;
    lx.tree_mut().graft(node, &fragment, start, origin);
    Ok(Outcome::to(DEFAULT_STATE))
}

/// Adds the shorthand value read so far as a `class` or `id` value
fn flush_shorthand(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<()> {
    let token = lx.take_token();
    let mut value = std::mem::take(&mut lx.scratch.value_chain);
    push_literal(&mut value, token);
    let name = if lx.scratch.shorthand == '#' { "id" } else { "class" };
    if value.is_empty() {
        let message = format!("Empty `{}` shorthand", name);
        return Err(lx.error(ErrorKind::Attribute, message));
    }
    push_attribute(lx, node, name, value)
}

pub(super) fn shorthand_next(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    flush_shorthand(lx, node)?;
    lx.scratch.shorthand = lx.ch();
    Ok(Outcome::skip())
}

pub(super) fn shorthand_attributes(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    flush_shorthand(lx, node)?;
    Ok(Outcome::to("inline_attr:await"))
}

pub(super) fn shorthand_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    flush_shorthand(lx, node)?;
    Ok(Outcome::reconsume("entry:group"))
}

fn inherit(lx: &mut Lx<'_>, from: InheritFrom) -> ParseResult<Outcome> {
    let literal = lx.token();
    push_literal(&mut lx.scratch.value_chain, literal);
    lx.scratch.value_chain.push(Fragment::Inherit(from));
    Ok(Outcome::skip())
}

/// `&` in shorthand: the parent's value
pub(super) fn inherit_parent(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    inherit(lx, InheritFrom::Parent)
}

/// `&` in `class.…`: the node's own value
pub(super) fn inherit_self(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    inherit(lx, InheritFrom::SelfNode)
}

pub(super) fn shorthand_expression(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    let literal = lx.token();
    match expression(lx)? {
        Some(fragment) => {
            push_literal(&mut lx.scratch.value_chain, literal);
            lx.scratch.value_chain.push(fragment);
            Ok(Outcome::skip())
        }
        None => Err(invalid_character(lx)),
    }
}

/// `class.name: test`: a conditional class for the enclosing tag
pub(super) fn class_condition(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let token = lx.take_token();
    let mut fragments = std::mem::take(&mut lx.scratch.value_chain);
    push_literal(&mut fragments, token);
    if fragments.is_empty() {
        return Err(lx.error(ErrorKind::Attribute, "Empty conditional class"));
    }

    lx.advance_to(lx.pos() + 1);
    let test = lx.capture_line().trim().to_string();
    if test.is_empty() {
        let message = format!("Missing condition for `class.{}`", display_chain(&fragments));
        return Err(lx.error(ErrorKind::Attribute, message));
    }
    push_attribute(lx, node, "class", vec![Fragment::Group { test, fragments }])?;
    Ok(Outcome::to(DEFAULT_STATE))
}

/// `%name`: a hidden class inheriting the parent's class
pub(super) fn hidden_class(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let name = lx.take_token();
    if name.is_empty() {
        return Err(lx.error(ErrorKind::Attribute, "Empty hidden class name"));
    }
    let mut attributes = Attributes::new();
    attributes.set(
        "class",
        vec![Fragment::Inherit(InheritFrom::Parent), Fragment::Literal(name)],
    );
    let hidden = lx.append(node, Payload::HiddenClass(attributes));
    Ok(Outcome::DescendAndGoTo(hidden, Step::reconsume("entry:group")))
}

// ----------------------------------------------------------------------
// Inline attributes
// ----------------------------------------------------------------------

/// `[<]`, `[>]`, `[<>]`: whitespace handling around the tag
pub(super) fn whitespace_flag(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    if !matches!(lx.prev(), Some('[' | '<' | '>')) {
        return Err(invalid_character(lx));
    }
    if lx.tree()[node].payload.as_tag().is_none() {
        return Err(lx.error(ErrorKind::Attribute, "Whitespace flags outside of a tag"));
    }
    let ch = lx.ch();
    if let Some(element) = lx.tree_mut().node_mut(node).payload.as_tag_mut() {
        match ch {
            '<' => element.ws_before = true,
            _ => element.ws_after = true,
        }
    }
    Ok(Outcome::to("inline_attr:ws"))
}

pub(super) fn empty_attribute_name(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    Err(lx.error(ErrorKind::Attribute, "Empty attribute name"))
}

pub(super) fn attribute_name(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    lx.scratch.attribute = lx.take_token();
    Ok(Outcome::to("inline_attr:value:await"))
}

pub(super) fn boolean_attribute(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let name = lx.take_token();
    push_attribute(lx, node, &name, vec![Fragment::Boolean(true)])?;
    match lx.ch() {
        ']' => Ok(Outcome::to("inline_attr:next")),
        _ => Ok(Outcome::to("inline_attr:await")),
    }
}

pub(super) fn value_open(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    lx.scratch.slashes = 0;
    lx.scratch.value_chain.clear();
    Ok(Outcome::to("inline_attr:value"))
}

pub(super) fn value_backslash(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    lx.scratch.slashes += 1;
    Ok(Outcome::extend())
}

pub(super) fn value_quote(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    if lx.scratch.slashes % 2 == 1 {
        lx.scratch.slashes = 0;
        return Ok(Outcome::extend());
    }
    let raw = lx.take_token();
    let mut value = std::mem::take(&mut lx.scratch.value_chain);
    if value.is_empty() || !raw.is_empty() {
        value.push(Fragment::Literal(unescape(&raw)));
    }
    let name = std::mem::take(&mut lx.scratch.attribute);
    push_attribute(lx, node, &name, value)?;
    Ok(Outcome::to("inline_attr:after"))
}

/// `${…}` inside a quoted value, unless the `$` is escaped
pub(super) fn value_expression(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    let escaped = lx.scratch.slashes % 2 == 1;
    lx.scratch.slashes = 0;
    if escaped {
        return Ok(Outcome::extend());
    }
    let raw = lx.token();
    match expression(lx)? {
        Some(fragment) => {
            push_literal(&mut lx.scratch.value_chain, unescape(&raw));
            lx.scratch.value_chain.push(fragment);
            Ok(Outcome::skip())
        }
        None => Ok(Outcome::extend()),
    }
}

pub(super) fn value_char(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    lx.scratch.slashes = 0;
    Ok(Outcome::extend())
}
