//! Text, comments and declarations

use super::{structure, Lx};
use crate::bones::ast::{Fragment, NodeId, Payload, Text, TextValue};
use crate::bones::engine::{Outcome, Step, TokenAction, Transition, DEFAULT_STATE};
use crate::bones::error::ParseResult;

fn push_literal(chain: &mut Vec<Fragment>, value: &str) {
    if !value.is_empty() {
        chain.push(Fragment::literal(value));
    }
}

/// `>` right after `|` opens a multi-line block; anywhere else it is text
pub(super) fn multiline_open(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    if lx.prev() == Some('|') {
        lx.scratch.text_chain.clear();
        return Ok(Outcome::to("text:multiline"));
    }
    Ok(Outcome::GoTo(Step::new(TokenAction::Begin, Transition::Reconsume("text"))))
}

pub(super) fn text_expression(lx: &mut Lx<'_>, _node: NodeId) -> ParseResult<Outcome> {
    if lx.peek(1) != Some('{') {
        return Ok(Outcome::extend());
    }
    let literal = lx.token();
    let source = lx.capture_balanced(lx.pos() + 1, '}')?;
    push_literal(&mut lx.scratch.text_chain, &literal);
    lx.scratch.text_chain.push(Fragment::expression(source.trim()));
    Ok(Outcome::skip())
}

/// End of a single-line text
pub(super) fn text_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let token = if lx.state() == "text" { lx.take_token() } else { String::new() };
    let mut chain = std::mem::take(&mut lx.scratch.text_chain);
    push_literal(&mut chain, token.trim_end());
    let line = lx.line();
    if !chain.is_empty() {
        lx.append(
            node,
            Payload::Text(Text {
                value: TextValue::from_fragments(chain),
                multiline: false,
            }),
        );
    }
    structure::close_inline(lx, node, line)
}

fn finish_multiline(lx: &mut Lx<'_>, node: NodeId) {
    let token = lx.take_token();
    let mut chain = std::mem::take(&mut lx.scratch.text_chain);
    let token = if chain.is_empty() {
        token.strip_prefix('\n').unwrap_or(&token).to_string()
    } else {
        token
    };
    if let Some(Fragment::Literal(first)) = chain.first_mut() {
        if let Some(rest) = first.strip_prefix('\n') {
            *first = rest.to_string();
        }
    }
    push_literal(&mut chain, &token);
    let value = match chain.is_empty() {
        true => TextValue::Plain(String::new()),
        false => TextValue::from_fragments(chain),
    };
    lx.append(
        node,
        Payload::Text(Text {
            value,
            multiline: true,
        }),
    );
}

/// A newline inside `|> … |`: the block ends when the next line holds only `|`
pub(super) fn multiline_line_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let mut next = lx.pos() + 1;
    while matches!(lx.char_at(next), Some(' ' | '\t')) {
        next += 1;
    }
    let closes = lx.char_at(next) == Some('|') && matches!(lx.char_at(next + 1), None | Some('\n'));
    if !closes {
        return Ok(Outcome::extend());
    }
    finish_multiline(lx, node);
    lx.advance_to(next);
    Ok(Outcome::to("text:end"))
}

/// `<|` closes a block on the line it opened on
pub(super) fn inline_terminator(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    if lx.peek(1) != Some('|') {
        return Ok(Outcome::extend());
    }
    finish_multiline(lx, node);
    lx.advance_to(lx.pos() + 1);
    Ok(Outcome::to("text:end"))
}

/// End of the line a multi-line block closed on
pub(super) fn after_text(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let line = match lx.tree().last_child(node) {
        Some(text) => lx.tree()[text].position.line,
        None => lx.line(),
    };
    structure::close_inline(lx, node, line)
}

/// End of a `//` comment
///
/// After an entry on the same line, the entry closes first and the comment becomes its
/// sibling. A comment on a line of its own goes where its indentation placed it.
pub(super) fn comment_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let value = lx.take_token();
    if structure::opened_inline(lx, node, lx.line()) {
        let parent = structure::close_entry(lx, node)?;
        lx.append(parent, Payload::Comment(value));
        return Ok(Outcome::Descend(parent));
    }
    let parent = lx.scratch.comment_parent.take().unwrap_or(node);
    lx.append(parent, Payload::Comment(value));
    Ok(Outcome::to(DEFAULT_STATE))
}

pub(super) fn multi_comment_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let token = lx.token();
    let Some(value) = token.strip_suffix('*') else {
        return Ok(Outcome::extend());
    };
    let comment = lx.append(node, Payload::Comment(value.to_string()));
    let line = lx.tree()[comment].position.line;
    if structure::opened_inline(lx, node, line) {
        Ok(Outcome::to("entry:group"))
    } else {
        Ok(Outcome::to(DEFAULT_STATE))
    }
}

/// `!doctype html`
pub(super) fn dtd_end(lx: &mut Lx<'_>, node: NodeId) -> ParseResult<Outcome> {
    let value = lx.take_token().trim().to_string();
    lx.append(node, Payload::Dtd(value));
    Ok(Outcome::to(DEFAULT_STATE))
}
