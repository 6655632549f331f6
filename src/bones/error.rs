//! Parse errors
//!
//! Every failure aborts the parse: callers get either a complete tree or exactly one
//! [`ParseError`] describing the first violation in scan order. The error carries the char
//! offset of the offending character, its position, and a description of the node that was
//! current when it happened.

use crate::bones::ast::Position;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A character that is not valid in the current state
    Lexical,
    /// Mismatched closing tag, or a tag left open at the end of markup
    Markup,
    /// Mixed tabs/spaces, a level jump, or a width off the established unit
    Indentation,
    /// Empty attribute name or a duplicate `id`
    Attribute,
    /// No keyword variant accepts the character, or the directive failed validation
    Keyword,
    /// Input ended inside a construct
    UnexpectedEnd,
    /// A node is still open when input ends
    Unclosed,
    /// The grammar itself misbehaved (unknown state, reconsumption loop)
    Engine,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Markup => "markup error",
            ErrorKind::Indentation => "indentation error",
            ErrorKind::Attribute => "attribute error",
            ErrorKind::Keyword => "keyword error",
            ErrorKind::UnexpectedEnd => "unexpected end of input",
            ErrorKind::Unclosed => "unclosed node",
            ErrorKind::Engine => "engine error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {position}: {message}{}", context_suffix(.context))]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    /// Char offset of the offending character
    pub offset: usize,
    pub position: Position,
    /// The node that was current, e.g. ``tag `div` ``
    pub context: Option<String>,
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(node) => format!(" (in {})", node),
        None => String::new(),
    }
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, offset: usize, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            offset,
            position,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Moves an error raised while parsing an embedded source into the embedding source
    pub fn relocated(mut self, offset: usize, origin: Position) -> Self {
        self.offset += offset;
        self.position = self.position.relative_to(origin);
        self
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Format source code context around an error location
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
pub fn format_source_context(source: &str, error: &ParseError) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = error.position.line;

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();
    for (line_num, line) in lines.iter().enumerate().take(end_line).skip(start_line) {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, line));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_position_and_context() {
        let error = ParseError::new(ErrorKind::Lexical, "Invalid character `@`", 7, Position::new(1, 3))
            .with_context("tag `div`");
        assert_eq!(
            error.to_string(),
            "lexical error at 2:4: Invalid character `@` (in tag `div`)"
        );
    }

    #[test]
    fn test_display_without_context() {
        let error = ParseError::new(ErrorKind::UnexpectedEnd, "input ended in `text`", 0, Position::default());
        assert_eq!(error.to_string(), "unexpected end of input at 1:1: input ended in `text`");
    }

    #[test]
    fn test_format_source_context() {
        let source = "line 1\nline 2\nline 3\nerror line\nline 5\nline 6\nline 7";
        let error = ParseError::new(ErrorKind::Lexical, "boom", 21, Position::new(3, 0));

        let context = format_source_context(source, &error);

        assert!(context.contains("line 2"));
        assert!(context.contains(">>   4 | error line"));
        assert!(context.contains("line 6"));
        assert!(!context.contains("line 7"));
    }

    #[test]
    fn test_relocated_shifts_into_host_source() {
        let error = ParseError::new(ErrorKind::Markup, "x", 3, Position::new(0, 3))
            .relocated(20, Position::new(2, 6));
        assert_eq!(error.offset, 23);
        assert_eq!(error.position, Position::new(2, 9));
    }
}
