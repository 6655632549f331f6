//! Structure: line ends, groups, indentation, keyword directives and the end of input

use super::Lx;
use crate::bones::ast::{literal_chain, Directive, Fragment, NodeId, Payload};
use crate::bones::engine::{Outcome, Step, DEFAULT_STATE};
use crate::bones::error::{ErrorKind, ParseError, ParseResult};
use crate::bones::indentation::{ascend, resolve, IndentError};
use crate::bones::keywords::pattern::SlotKind;
use crate::bones::keywords::{KeywordMatcher, MatchStep};
use log::trace;

fn indentation_error(lx: &Lx<'_>, err: IndentError) -> ParseError {
    lx.error(ErrorKind::Indentation, err.to_string())
}

// ----------------------------------------------------------------------
// Hooks
// ----------------------------------------------------------------------

pub(super) fn template_start(lx: &mut Lx<'_>) -> ParseResult<()> {
    lx.scratch.reset();
    Ok(())
}

/// Measures every significant line that starts outside of a construct
///
/// Blank lines never move the current node, and neither do `//` comment lines. A comment
/// line is placed where its indentation points without touching the recorded level, and
/// joins the current node when its indentation fits nowhere. Lines that continue a block
/// comment, a text block or an attribute list are skipped, since the state is not the
/// default one there.
pub(super) fn template_indent(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Option<NodeId>> {
    if lx.state() != DEFAULT_STATE || lx.ch() == '\n' {
        return Ok(None);
    }
    if lx.ch() == '/' && lx.peek(1) == Some('/') {
        let mut trial = lx.scratch.tracker.clone();
        lx.scratch.comment_parent = trial
            .observe(lx.indent())
            .ok()
            .and_then(|change| resolve(lx.tree(), node, change, &lx.scratch.groups).ok());
        return Ok(None);
    }

    let indent = lx.indent();
    let change = match lx.scratch.tracker.observe(indent) {
        Ok(change) => change,
        Err(err) => return Err(indentation_error(lx, err)),
    };
    let target = resolve(lx.tree(), node, change, &lx.scratch.groups)
        .map_err(|err| indentation_error(lx, err))?;
    trace!("level {} -> {}: {} -> {}", change.from, change.to, node, target);
    Ok(Some(target))
}

fn describe_state(state: &str) -> &'static str {
    match state {
        "multi_comment" | "comment" | "comment:await" => "a comment",
        "text" | "text:await" | "text:multiline" | "text:end" => "a text",
        "dtd" => "a declaration",
        state if state.starts_with("inline_attr") => "an attribute list",
        state if state.starts_with("keyword") => "a keyword directive",
        state if state.starts_with("define") => "a define",
        _ => "an entry",
    }
}

/// At the end of input every open node must be closable
///
/// Groups must have seen their `}`. Other nodes close implicitly once the document has
/// used indentation, or when they are shorty.
pub(super) fn template_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<()> {
    let state = lx.state();
    if state != DEFAULT_STATE {
        let message = format!("Input ended inside {}", describe_state(state));
        return Err(lx.error(ErrorKind::UnexpectedEnd, message));
    }

    let tree = lx.tree();
    let indented = lx.scratch.tracker.mode().is_some();
    let open = std::iter::once(node)
        .chain(tree.ancestors(node))
        .take_while(|id| *id != tree.root());
    for id in open {
        if lx.scratch.groups.contains_key(&id) {
            let message = format!("{} is missing its closing `}}`", tree[id].describe());
            return Err(lx.error_on(ErrorKind::Unclosed, message, id));
        }
        if !indented && !tree[id].shorty {
            let message = format!("{} is never closed", tree[id].describe());
            return Err(lx.error_on(ErrorKind::Unclosed, message, id));
        }
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Closing
// ----------------------------------------------------------------------

/// Whether `node` is an entry opened on `line` that a line end should close
pub(super) fn opened_inline(lx: &Lx<'_>, node: NodeId, line: usize) -> bool {
    node != lx.tree().root()
        && !lx.scratch.groups.contains_key(&node)
        && lx.tree()[node].position.line == line
}

/// End of a line that carried text or a comment
///
/// Under an entry opened on the same line, the entry closes with the line. Otherwise the
/// text or comment was a line of its own and nothing closes.
pub(super) fn close_inline(lx: &mut Lx<'_>, node: NodeId, line: usize) -> ParseResult<Outcome> {
    if opened_inline(lx, node, line) {
        line_end(lx, node)
    } else {
        Ok(Outcome::to(DEFAULT_STATE))
    }
}

/// The node an entry closes back to, skipping shorty ancestors
pub(super) fn close_entry(lx: &Lx<'_>, node: NodeId) -> ParseResult<NodeId> {
    ascend(lx.tree(), node).map_err(|err| indentation_error(lx, err))
}

/// End of an entry's line: back to the parent
pub(super) fn line_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    Ok(Outcome::Descend(close_entry(lx, node)?))
}

pub(super) fn open_group(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let level = lx.scratch.tracker.level();
    lx.tree_mut().node_mut(node).group = true;
    lx.scratch.groups.insert(node, level);
    Ok(Outcome::to(DEFAULT_STATE))
}

/// `}` closes the nearest open group, and with it every node opened inside it
pub(super) fn close_group(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let tree = lx.tree();
    let group = std::iter::once(node)
        .chain(tree.ancestors(node))
        .find(|id| lx.scratch.groups.contains_key(id));
    let Some(group) = group else {
        return Err(lx.error(ErrorKind::Lexical, "Unexpected `}`: no group is open"));
    };
    lx.scratch.groups.remove(&group);
    let parent = ascend(lx.tree(), group).map_err(|err| indentation_error(lx, err))?;
    Ok(Outcome::Descend(parent))
}

/// `a > b`: the next entry nests in `a` and both close with the line
pub(super) fn shorty(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    lx.tree_mut().node_mut(node).shorty = true;
    Ok(Outcome::to(DEFAULT_STATE))
}

/// `a + b`: the next entry is a sibling of `a`
pub(super) fn sibling(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    match lx.tree().parent(node) {
        Some(parent) => Ok(Outcome::Descend(parent)),
        None => Err(lx.error(ErrorKind::Lexical, "`+` needs an entry before it")),
    }
}

// ----------------------------------------------------------------------
// Keywords
// ----------------------------------------------------------------------

fn keyword_name(lx: &Lx<'_>, node: NodeId) -> String {
    lx.tree()[node]
        .payload
        .as_directive()
        .map(|directive| directive.name.clone())
        .unwrap_or_default()
}

fn keyword_error(lx: &Lx<'_>, node: NodeId, message: String) -> ParseError {
    lx.error_on(ErrorKind::Keyword, message, node)
}

/// Opens a keyword directive when the entry name is a registered keyword
///
/// `had_blank` tells whether blanks were read after the name; the matcher sees them as a
/// single blank.
pub(super) fn start_keyword(
    lx: &mut Lx<'_>,
    node: NodeId,
    name: &[Fragment],
    had_blank: bool,
) -> ParseResult<Option<Outcome>> {
    let Some(word) = literal_chain(name) else {
        return Ok(None);
    };
    let Some(def) = lx.scratch.settings.keywords.get(&word).cloned() else {
        return Ok(None);
    };

    let keyword = lx.append(node, Payload::Keyword(Directive::new(word)));
    let mut matcher = KeywordMatcher::new(def);
    if had_blank {
        loop {
            match matcher.step(' ') {
                MatchStep::Retry => continue,
                MatchStep::Advance | MatchStep::Absorb => break,
                MatchStep::Complete(variant) => {
                    finish_keyword(lx, keyword, &matcher, variant)?;
                    return Ok(Some(Outcome::DescendAndGoTo(keyword, Step::reconsume("keyword:end"))));
                }
                MatchStep::Capture(_) | MatchStep::Reject => {
                    let message = format!("Unexpected blank after keyword `{}`", matcher.keyword().name());
                    return Err(keyword_error(lx, keyword, message));
                }
            }
        }
    }
    lx.scratch.keyword = Some(matcher);
    Ok(Some(Outcome::DescendAndGoTo(keyword, Step::reconsume("keyword"))))
}

/// Records the matched variant and runs the keyword's validator
fn finish_keyword(lx: &mut Lx<'_>, node: NodeId, matcher: &KeywordMatcher, variant: usize) -> ParseResult<()> {
    if let Some(directive) = lx.tree_mut().node_mut(node).payload.as_directive_mut() {
        directive.variant = Some(variant);
    }
    let Some(validate) = matcher.keyword().validator() else {
        return Ok(());
    };
    let verdict = match lx.tree()[node].payload.as_directive() {
        Some(directive) => validate(directive),
        None => Ok(()),
    };
    verdict.map_err(|message| keyword_error(lx, node, message))
}

pub(super) fn keyword_step(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let ch = lx.ch();
    let Some(matcher) = lx.scratch.keyword.as_mut() else {
        return Err(lx.error(ErrorKind::Engine, "Keyword state without a keyword"));
    };
    match matcher.step(ch) {
        MatchStep::Advance | MatchStep::Absorb => Ok(Outcome::skip()),
        MatchStep::Retry => Ok(Outcome::reconsume("keyword")),
        MatchStep::Capture(slot) => {
            lx.scratch.slot = slot.attribute;
            match slot.kind {
                SlotKind::Identifier => Ok(Outcome::reconsume("keyword:ident")),
                SlotKind::Expression => Ok(Outcome::reconsume("keyword:expr")),
            }
        }
        MatchStep::Complete(variant) => {
            let matcher = lx.scratch.keyword.take();
            if let Some(matcher) = matcher {
                finish_keyword(lx, node, &matcher, variant)?;
            }
            Ok(Outcome::reconsume("keyword:end"))
        }
        MatchStep::Reject => {
            let message = format!(
                "Unexpected `{}` in keyword `{}`",
                ch.escape_debug(),
                keyword_name(lx, node)
            );
            Err(keyword_error(lx, node, message))
        }
    }
}

fn store_slot(lx: &mut Lx<'_>, node: NodeId, value: String) -> ParseResult<()> {
    let slot = std::mem::take(&mut lx.scratch.slot);
    if value.is_empty() {
        let message = format!("Empty `@{}` in keyword `{}`", slot, keyword_name(lx, node));
        return Err(keyword_error(lx, node, message));
    }
    if let Some(directive) = lx.tree_mut().node_mut(node).payload.as_directive_mut() {
        directive.attributes.insert(slot, value);
    }
    Ok(())
}

pub(super) fn keyword_missing_ident(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let message = format!(
        "Expected an identifier for `@{}` in keyword `{}`, found `{}`",
        lx.scratch.slot,
        keyword_name(lx, node),
        lx.ch().escape_debug()
    );
    Err(keyword_error(lx, node, message))
}

pub(super) fn keyword_ident(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let value = lx.take_token();
    store_slot(lx, node, value)?;
    Ok(Outcome::reconsume("keyword"))
}

/// Captures an expression slot up to whatever the pattern expects next
pub(super) fn keyword_expression(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let stops = match &lx.scratch.keyword {
        Some(matcher) => matcher.terminators(),
        None => vec!['\n'],
    };
    let value = lx.capture_until(&stops)?;
    store_slot(lx, node, value.trim().to_string())?;
    Ok(Outcome::reconsume("keyword"))
}

pub(super) fn keyword_trailing(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let message = format!(
        "Unexpected `{}` after keyword `{}`",
        lx.ch().escape_debug(),
        keyword_name(lx, node)
    );
    Err(keyword_error(lx, node, message))
}
