//! Scanner state and the driver loop
//!
//! A [`Lexer`] is created per parse. It owns the input (as chars), the tree under
//! construction, and the grammar's scratch context, and it borrows the grammar's table.
//!
//! The pending token always spans `token_start..pos`: the current character is never part
//! of it until an action extends past it. Handlers read it with [`Lexer::token`] or
//! [`Lexer::token_between`] and consume it with [`Lexer::take_token`].

use super::capture;
use super::table::{Action, Grammar, Outcome, StateName, Step, TokenAction, Transition, DEFAULT_STATE};
use crate::bones::ast::{NodeId, Payload, Position, SourceLocation, Tree};
use crate::bones::error::{ErrorKind, ParseError, ParseResult};
use log::{debug, trace};

/// How many times the same character may be reconsumed before the grammar is declared stuck
const RECONSUME_LIMIT: usize = 64;

/// Leading whitespace of the current line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indent {
    pub tabs: usize,
    pub spaces: usize,
}

impl Indent {
    pub fn width(&self) -> usize {
        self.tabs + self.spaces
    }

    pub fn is_mixed(&self) -> bool {
        self.tabs > 0 && self.spaces > 0
    }
}

pub struct Lexer<'g, C> {
    grammar: &'g Grammar<C>,
    chars: Vec<char>,
    location: SourceLocation,
    pos: usize,
    token_start: usize,
    state: StateName,
    current: NodeId,
    tree: Tree,
    indent: Indent,
    /// Offset where the indent hook fires for the current line
    indent_at: Option<usize>,
    measured_line: Option<usize>,
    loop_pos: usize,
    reconsumed: usize,
    /// Per-parse context of the grammar
    pub scratch: C,
}

impl<'g, C> Lexer<'g, C> {
    pub fn new(grammar: &'g Grammar<C>, source: &str, scratch: C) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let location = SourceLocation::new(&chars);
        let tree = Tree::new();
        let current = tree.root();
        Self {
            grammar,
            chars,
            location,
            pos: 0,
            token_start: 0,
            state: DEFAULT_STATE,
            current,
            tree,
            indent: Indent::default(),
            indent_at: None,
            measured_line: None,
            loop_pos: 0,
            reconsumed: 0,
            scratch,
        }
    }

    /// Parses the whole input and hands back the tree
    pub fn run(mut self) -> ParseResult<Tree> {
        self.run_to_end()?;
        Ok(self.tree)
    }

    /// Parses the whole input, keeping the lexer (and its scratch) around
    pub fn run_to_end(&mut self) -> ParseResult<()> {
        let grammar = self.grammar;
        debug!("{}: parsing {} chars", grammar.name(), self.chars.len());

        if let Some(hook) = grammar.on_start {
            hook(self)?;
        }

        while self.pos < self.chars.len() {
            self.measure_line();
            if self.indent_at == Some(self.pos) {
                self.indent_at = None;
                if let Some(hook) = grammar.on_indent {
                    let current = self.current;
                    if let Some(node) = hook(self, current)? {
                        self.current = node;
                    }
                }
            }

            let ch = self.chars[self.pos];
            let current = self.current;
            let outcome = match grammar.lookup(self.state, ch) {
                None => {
                    let message = format!("Unknown state `{}`", self.state);
                    return Err(self.error(ErrorKind::Engine, message));
                }
                Some(None) => Outcome::Stay(TokenAction::Extend),
                Some(Some(Action::Step(step))) => Outcome::GoTo(*step),
                Some(Some(Action::Handle(handler))) => handler(self, current)?,
                Some(Some(Action::Fail)) => {
                    let message = format!("Invalid character `{}`", ch.escape_debug());
                    return Err(self.error(ErrorKind::Lexical, message));
                }
            };
            trace!("{:?} {:?} -> {:?}", self.state, ch, outcome);

            let (node, step) = outcome.into_parts();
            if let Some(node) = node {
                self.current = node;
            }
            self.apply(step)?;
        }

        if let Some(hook) = grammar.on_end {
            let current = self.current;
            hook(self, current)?;
        }

        debug!("{}: built {} nodes", grammar.name(), self.tree.len());
        Ok(())
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    fn apply(&mut self, step: Step) -> ParseResult<()> {
        match step.token {
            TokenAction::Extend | TokenAction::Keep => {}
            TokenAction::Reset => self.token_start = self.pos + 1,
            TokenAction::Begin => self.token_start = self.pos,
        }
        match step.transition {
            Transition::Stay => self.pos += 1,
            Transition::Goto(state) => {
                self.state = state;
                self.pos += 1;
            }
            Transition::Reconsume(state) => {
                self.state = state;
                if self.loop_pos == self.pos {
                    self.reconsumed += 1;
                } else {
                    self.loop_pos = self.pos;
                    self.reconsumed = 1;
                }
                if self.reconsumed > RECONSUME_LIMIT {
                    let message = format!("State `{}` keeps reconsuming the same character", state);
                    return Err(self.error(ErrorKind::Engine, message));
                }
            }
        }
        Ok(())
    }

    /// Measures leading whitespace when the cursor sits at the start of a line
    fn measure_line(&mut self) {
        let at_line_start = self.pos == 0 || self.chars[self.pos - 1] == '\n';
        if !at_line_start || self.measured_line == Some(self.pos) {
            return;
        }
        self.measured_line = Some(self.pos);

        let mut indent = Indent::default();
        let mut end = self.pos;
        while let Some(ch) = self.chars.get(end) {
            match ch {
                ' ' => indent.spaces += 1,
                '\t' => indent.tabs += 1,
                _ => break,
            }
            end += 1;
        }
        self.indent = indent;
        self.indent_at = (end < self.chars.len()).then_some(end);
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// The character being dispatched (`'\0'` past the end)
    pub fn ch(&self) -> char {
        self.chars.get(self.pos).copied().unwrap_or('\0')
    }

    pub fn prev(&self) -> Option<char> {
        self.pos.checked_sub(1).and_then(|i| self.chars.get(i).copied())
    }

    /// The character `ahead` positions after the current one
    pub fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Moves the cursor forward; the character at `pos` is dispatched next
    pub fn advance_to(&mut self, pos: usize) {
        self.pos = pos.clamp(self.pos, self.chars.len());
    }

    pub fn state(&self) -> StateName {
        self.state
    }

    pub fn indent(&self) -> Indent {
        self.indent
    }

    /// 0-based line of the cursor
    pub fn line(&self) -> usize {
        self.location.position(self.pos).line
    }

    pub fn position(&self, offset: usize) -> Position {
        self.location.position(offset)
    }

    // ------------------------------------------------------------------
    // Token
    // ------------------------------------------------------------------

    /// The pending token, without the current character
    pub fn token(&self) -> String {
        self.slice(self.token_start, self.pos)
    }

    /// The pending token with its bounds shifted: `token_start + lo .. pos + hi`
    pub fn token_between(&self, lo: isize, hi: isize) -> String {
        let start = self.token_start.saturating_add_signed(lo);
        let end = self.pos.saturating_add_signed(hi);
        self.slice(start, end)
    }

    /// Returns the pending token
    ///
    /// The token's start is left alone, so a node appended right after still sits where the
    /// token began; the step the handler returns decides where the next token starts.
    pub fn take_token(&mut self) -> String {
        self.token()
    }

    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Text of `start..end`, clamped to the input
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }
        self.chars[start..end].iter().collect()
    }

    // ------------------------------------------------------------------
    // Captures: all of them leave the cursor on the terminating character
    // ------------------------------------------------------------------

    /// Content between the opener at `open` and its balanced `close`
    pub fn capture_balanced(&mut self, open: usize, close: char) -> ParseResult<String> {
        match capture::balanced(&self.chars, open + 1, close) {
            Some(end) => {
                let content = self.slice(open + 1, end);
                self.pos = end;
                Ok(content)
            }
            None => {
                let opener = self.chars.get(open).copied().unwrap_or(' ');
                let message = format!("Unterminated `{}`, expected `{}`", opener, close);
                Err(self.error_at(ErrorKind::UnexpectedEnd, message, open))
            }
        }
    }

    /// Content from the current character up to the first top-level `stops` character
    pub fn capture_until(&mut self, stops: &[char]) -> ParseResult<String> {
        match capture::until_top_level(&self.chars, self.pos, stops) {
            Some(end) => {
                let content = self.slice(self.pos, end);
                self.pos = end;
                Ok(content)
            }
            None => {
                let expected: String = stops.iter().map(|ch| ch.escape_debug().to_string()).collect();
                let message = format!("Input ended while looking for one of `{}`", expected);
                Err(self.error(ErrorKind::UnexpectedEnd, message))
            }
        }
    }

    /// Content from the current character to the end of the line
    pub fn capture_line(&mut self) -> String {
        let end = self.chars[self.pos.min(self.chars.len())..]
            .iter()
            .position(|ch| *ch == '\n')
            .map_or(self.chars.len(), |i| self.pos + i);
        let content = self.slice(self.pos, end);
        self.pos = end;
        content
    }

    // ------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Appends a node under `parent`, located at the start of the pending token
    pub fn append(&mut self, parent: NodeId, payload: Payload) -> NodeId {
        let offset = self.token_start.min(self.pos);
        let position = self.location.position(offset);
        self.tree.append(parent, payload, offset, position)
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    /// An error at the cursor, described against the current node
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        self.error_at(kind, message, self.pos)
    }

    pub fn error_at(&self, kind: ErrorKind, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::new(kind, message, offset, self.location.position(offset))
            .with_context(self.tree.node(self.current).describe())
    }

    /// An error described against a specific node instead of the current one
    pub fn error_on(&self, kind: ErrorKind, message: impl Into<String>, node: NodeId) -> ParseError {
        ParseError::new(kind, message, self.pos, self.location.position(self.pos))
            .with_context(self.tree.node(node).describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::ast::{NodeKind, Text, TextValue};
    use crate::bones::engine::Trigger;

    /// Words become text nodes; `(` opens a node that `)` closes
    fn words() -> Grammar<Vec<Indent>> {
        fn word(lx: &mut Lexer<'_, Vec<Indent>>, node: NodeId) -> ParseResult<Outcome> {
            let value = lx.take_token();
            if !value.is_empty() {
                lx.append(
                    node,
                    Payload::Text(Text {
                        value: TextValue::Plain(value),
                        multiline: false,
                    }),
                );
            }
            Ok(Outcome::skip())
        }
        fn open(lx: &mut Lexer<'_, Vec<Indent>>, node: NodeId) -> ParseResult<Outcome> {
            word(lx, node)?;
            let group = lx.append(node, Payload::Comment(String::new()));
            Ok(Outcome::Descend(group))
        }
        fn close(lx: &mut Lexer<'_, Vec<Indent>>, node: NodeId) -> ParseResult<Outcome> {
            word(lx, node)?;
            match lx.tree().parent(node) {
                Some(parent) => Ok(Outcome::Descend(parent)),
                None => Err(lx.error(ErrorKind::Markup, "Unbalanced `)`")),
            }
        }
        fn indent(lx: &mut Lexer<'_, Vec<Indent>>, _node: NodeId) -> ParseResult<Option<NodeId>> {
            let indent = lx.indent();
            lx.scratch.push(indent);
            Ok(None)
        }

        Grammar::builder("words")
            .class("blank", &[" ", "\t", "\n"])
            .state(DEFAULT_STATE, |s| {
                s.call(Trigger::class("blank"), word)
                    .call('(', open)
                    .call(')', close)
                    .fail('!')
            })
            .on_indent(indent)
            .build()
            .unwrap()
    }

    fn texts(tree: &Tree, node: NodeId) -> Vec<String> {
        tree.children(node)
            .iter()
            .filter_map(|child| tree[*child].payload.as_text().map(|t| t.value.to_string()))
            .collect()
    }

    #[test]
    fn test_tokens_exclude_the_current_character() {
        let tree = words().parse("ab cd\n", Vec::new()).unwrap();
        assert_eq!(texts(&tree, tree.root()), vec!["ab", "cd"]);
    }

    #[test]
    fn test_descend_and_ascend() {
        let tree = words().parse("a (b c) d\n", Vec::new()).unwrap();
        let root = tree.root();
        assert_eq!(texts(&tree, root), vec!["a", "d"]);
        let group = tree.children(root)[1];
        assert_eq!(tree[group].kind(), NodeKind::Comment);
        assert_eq!(texts(&tree, group), vec!["b", "c"]);
    }

    #[test]
    fn test_fail_reports_character_and_position() {
        let err = words().parse("ab\n c!\n", Vec::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.message, "Invalid character `!`");
        assert_eq!(err.offset, 5);
        assert_eq!(err.position, Position::new(1, 2));
        assert_eq!(err.context.as_deref(), Some("root"));
    }

    #[test]
    fn test_indent_hook_fires_once_per_line() {
        let grammar = words();
        let mut lx = Lexer::new(&grammar, "a\n  b\n\tc\n\nd", Vec::new());
        lx.run_to_end().unwrap();
        let widths: Vec<_> = lx.scratch.iter().map(|i| (i.spaces, i.tabs)).collect();
        assert_eq!(widths, vec![(0, 0), (2, 0), (0, 1), (0, 0), (0, 0)]);
    }

    #[test]
    fn test_reconsume_loop_is_bounded() {
        let grammar: Grammar<()> = Grammar::builder("loop")
            .state(DEFAULT_STATE, |s| s.step('a', Step::reconsume("b")))
            .state("b", |s| s.step('a', Step::reconsume(DEFAULT_STATE)))
            .build()
            .unwrap();
        let err = grammar.parse("a", ()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Engine);
    }

    #[test]
    fn test_unknown_state_from_handler() {
        fn lost(_lx: &mut Lexer<'_, ()>, _node: NodeId) -> ParseResult<Outcome> {
            Ok(Outcome::to("lost"))
        }
        let grammar: Grammar<()> = Grammar::builder("lost")
            .state(DEFAULT_STATE, |s| s.call('a', lost))
            .build()
            .unwrap();
        let err = grammar.parse("ab", ()).unwrap_err();
        assert_eq!(err.message, "Unknown state `lost`");
    }

    #[test]
    fn test_captures_leave_cursor_on_terminator() {
        let grammar: Grammar<()> = Grammar::builder("capture")
            .state(DEFAULT_STATE, |s| s)
            .build()
            .unwrap();
        let mut lx = Lexer::new(&grammar, "{a {b} \"}\"} x, y\nz", ());
        assert_eq!(lx.capture_balanced(0, '}').unwrap(), "a {b} \"}\"");
        assert_eq!(lx.ch(), '}');
        lx.advance_to(lx.pos() + 2);
        assert_eq!(lx.capture_until(&[',']).unwrap(), "x");
        lx.advance_to(lx.pos() + 1);
        assert_eq!(lx.capture_line(), " y");
        assert_eq!(lx.ch(), '\n');
    }

    #[test]
    fn test_token_between_clamps() {
        let grammar: Grammar<()> = Grammar::builder("t").state(DEFAULT_STATE, |s| s).build().unwrap();
        let mut lx = Lexer::new(&grammar, "abcdef", ());
        lx.advance_to(4);
        assert_eq!(lx.token(), "abcd");
        assert_eq!(lx.token_between(1, -1), "bc");
        assert_eq!(lx.token_between(-3, 10), "abcdef");
        assert_eq!(lx.take_token(), "abcd");
        assert_eq!(lx.token_start(), 0);
    }
}
