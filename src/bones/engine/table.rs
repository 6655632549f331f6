//! Grammar tables: states, triggers, actions, and the builder that assembles them

use super::classes::{CharClasses, ClassId};
use super::lexer::Lexer;
use crate::bones::ast::{NodeId, Tree};
use crate::bones::error::ParseResult;
use std::collections::HashMap;
use std::fmt;

pub type StateName = &'static str;

/// The state every grammar starts in and returns to after descending
pub const DEFAULT_STATE: StateName = "";

/// What happens to the pending token when an action runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// The current character joins the token
    Extend,
    /// The token is discarded; the next one starts after the current character
    Reset,
    /// The token is discarded; the next one starts at the current character
    Begin,
    /// The token is left as it is
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Consume the character, keep the state
    Stay,
    /// Consume the character, switch state
    Goto(StateName),
    /// Switch state and dispatch the same character again
    Reconsume(StateName),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub token: TokenAction,
    pub transition: Transition,
}

impl Step {
    pub const fn new(token: TokenAction, transition: Transition) -> Self {
        Self { token, transition }
    }

    pub const fn extend() -> Self {
        Self::new(TokenAction::Extend, Transition::Stay)
    }

    pub const fn skip() -> Self {
        Self::new(TokenAction::Reset, Transition::Stay)
    }

    pub const fn to(state: StateName) -> Self {
        Self::new(TokenAction::Reset, Transition::Goto(state))
    }

    pub const fn begin(state: StateName) -> Self {
        Self::new(TokenAction::Begin, Transition::Goto(state))
    }

    pub const fn reconsume(state: StateName) -> Self {
        Self::new(TokenAction::Keep, Transition::Reconsume(state))
    }

    fn target(&self) -> Option<StateName> {
        match self.transition {
            Transition::Stay => None,
            Transition::Goto(state) | Transition::Reconsume(state) => Some(state),
        }
    }
}

/// What a handler asks the engine to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep state and node; apply the token action and consume the character
    Stay(TokenAction),
    /// Keep the node; follow the step
    GoTo(Step),
    /// Make `node` current, return to the default state, consume the character
    Descend(NodeId),
    /// Make `node` current and follow the step
    DescendAndGoTo(NodeId, Step),
}

impl Outcome {
    pub fn extend() -> Self {
        Outcome::Stay(TokenAction::Extend)
    }

    pub fn skip() -> Self {
        Outcome::Stay(TokenAction::Reset)
    }

    pub fn to(state: StateName) -> Self {
        Outcome::GoTo(Step::to(state))
    }

    pub fn reconsume(state: StateName) -> Self {
        Outcome::GoTo(Step::reconsume(state))
    }

    pub(crate) fn into_parts(self) -> (Option<NodeId>, Step) {
        match self {
            Outcome::Stay(token) => (None, Step::new(token, Transition::Stay)),
            Outcome::GoTo(step) => (None, step),
            Outcome::Descend(node) => (Some(node), Step::to(DEFAULT_STATE)),
            Outcome::DescendAndGoTo(node, step) => (Some(node), step),
        }
    }
}

pub type Handler<C> = fn(&mut Lexer<'_, C>, NodeId) -> ParseResult<Outcome>;
pub type StartHook<C> = fn(&mut Lexer<'_, C>) -> ParseResult<()>;
/// Returns the node the line's content should nest under, if it changes
pub type IndentHook<C> = fn(&mut Lexer<'_, C>, NodeId) -> ParseResult<Option<NodeId>>;
pub type EndHook<C> = fn(&mut Lexer<'_, C>, NodeId) -> ParseResult<()>;

pub enum Action<C> {
    Step(Step),
    Handle(Handler<C>),
    Fail,
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Action<C> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Char(char),
    Class(&'static str),
    /// Matches when nothing more specific does
    Any,
}

impl Trigger {
    pub const fn class(name: &'static str) -> Self {
        Trigger::Class(name)
    }
}

impl From<char> for Trigger {
    fn from(ch: char) -> Self {
        Trigger::Char(ch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("class `{class}`: invalid member `{member}`")]
    InvalidClassMember { class: String, member: String },
    #[error("state `{state}` refers to unknown class `{class}`")]
    UnknownClass { state: String, class: String },
    #[error("state `{from}` moves to unknown state `{to}`")]
    UnknownState { from: String, to: String },
    #[error("state `{0}` is declared twice")]
    DuplicateState(String),
    #[error("grammar has no default state")]
    MissingDefaultState,
}

struct StateTable<C> {
    literals: HashMap<char, Action<C>>,
    classes: Vec<(ClassId, Action<C>)>,
    wildcard: Option<Action<C>>,
}

/// An immutable, shareable grammar
pub struct Grammar<C> {
    name: &'static str,
    classes: CharClasses,
    states: HashMap<StateName, StateTable<C>>,
    pub(crate) on_start: Option<StartHook<C>>,
    pub(crate) on_indent: Option<IndentHook<C>>,
    pub(crate) on_end: Option<EndHook<C>>,
}

impl<C> Grammar<C> {
    pub fn builder(name: &'static str) -> GrammarBuilder<C> {
        GrammarBuilder {
            name,
            classes: Vec::new(),
            states: Vec::new(),
            on_start: None,
            on_indent: None,
            on_end: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn classes(&self) -> &CharClasses {
        &self.classes
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains_key(state)
    }

    /// Runs the grammar over `source` with a fresh scratch context
    pub fn parse(&self, source: &str, scratch: C) -> ParseResult<Tree> {
        Lexer::new(self, source, scratch).run()
    }

    /// Resolves the action for `ch` in `state`: literal, then class, then wildcard
    ///
    /// `None` means the state is unknown; `Some(None)` means no rule matched.
    pub(crate) fn lookup(&self, state: StateName, ch: char) -> Option<Option<&Action<C>>> {
        let table = self.states.get(state)?;
        let action = table
            .literals
            .get(&ch)
            .or_else(|| {
                table
                    .classes
                    .iter()
                    .find(|(id, _)| self.classes.contains(*id, ch))
                    .map(|(_, action)| action)
            })
            .or(table.wildcard.as_ref());
        Some(action)
    }
}

impl<C> fmt::Debug for Grammar<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut states: Vec<_> = self.states.keys().collect();
        states.sort();
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("states", &states)
            .finish()
    }
}

pub struct GrammarBuilder<C> {
    name: &'static str,
    classes: Vec<(&'static str, Vec<&'static str>)>,
    states: Vec<(StateName, StateBuilder<C>)>,
    on_start: Option<StartHook<C>>,
    on_indent: Option<IndentHook<C>>,
    on_end: Option<EndHook<C>>,
}

impl<C> GrammarBuilder<C> {
    pub fn class(mut self, name: &'static str, members: &[&'static str]) -> Self {
        self.classes.push((name, members.to_vec()));
        self
    }

    pub fn state(
        mut self,
        name: StateName,
        rules: impl FnOnce(StateBuilder<C>) -> StateBuilder<C>,
    ) -> Self {
        self.states.push((name, rules(StateBuilder { rules: Vec::new() })));
        self
    }

    pub fn on_start(mut self, hook: StartHook<C>) -> Self {
        self.on_start = Some(hook);
        self
    }

    pub fn on_indent(mut self, hook: IndentHook<C>) -> Self {
        self.on_indent = Some(hook);
        self
    }

    pub fn on_end(mut self, hook: EndHook<C>) -> Self {
        self.on_end = Some(hook);
        self
    }

    /// Resolves class names and checks every step lands on a declared state
    pub fn build(self) -> Result<Grammar<C>, GrammarError> {
        let mut classes = CharClasses::new();
        for (name, members) in &self.classes {
            classes.define(name, members)?;
        }

        let declared: Vec<StateName> = self.states.iter().map(|(name, _)| *name).collect();
        if !declared.contains(&DEFAULT_STATE) {
            return Err(GrammarError::MissingDefaultState);
        }

        let mut states = HashMap::new();
        for (name, builder) in self.states {
            let mut table = StateTable {
                literals: HashMap::new(),
                classes: Vec::new(),
                wildcard: None,
            };
            for (trigger, action) in builder.rules {
                if let Action::Step(step) = &action {
                    if let Some(target) = step.target() {
                        if !declared.contains(&target) {
                            return Err(GrammarError::UnknownState {
                                from: name.to_string(),
                                to: target.to_string(),
                            });
                        }
                    }
                }
                match trigger {
                    Trigger::Char(ch) => {
                        table.literals.insert(ch, action);
                    }
                    Trigger::Class(class) => {
                        let id = classes.id(class).ok_or_else(|| GrammarError::UnknownClass {
                            state: name.to_string(),
                            class: class.to_string(),
                        })?;
                        table.classes.push((id, action));
                    }
                    Trigger::Any => table.wildcard = Some(action),
                }
            }
            if states.insert(name, table).is_some() {
                return Err(GrammarError::DuplicateState(name.to_string()));
            }
        }

        Ok(Grammar {
            name: self.name,
            classes,
            states,
            on_start: self.on_start,
            on_indent: self.on_indent,
            on_end: self.on_end,
        })
    }
}

/// Rules of a single state, in declaration order
pub struct StateBuilder<C> {
    rules: Vec<(Trigger, Action<C>)>,
}

impl<C> StateBuilder<C> {
    pub fn step(mut self, trigger: impl Into<Trigger>, step: Step) -> Self {
        self.rules.push((trigger.into(), Action::Step(step)));
        self
    }

    /// The same step for every character of `chars`
    pub fn step_each(mut self, chars: &str, step: Step) -> Self {
        for ch in chars.chars() {
            self.rules.push((Trigger::Char(ch), Action::Step(step)));
        }
        self
    }

    pub fn call(mut self, trigger: impl Into<Trigger>, handler: Handler<C>) -> Self {
        self.rules.push((trigger.into(), Action::Handle(handler)));
        self
    }

    pub fn call_each(mut self, chars: &str, handler: Handler<C>) -> Self {
        for ch in chars.chars() {
            self.rules.push((Trigger::Char(ch), Action::Handle(handler)));
        }
        self
    }

    pub fn fail(mut self, trigger: impl Into<Trigger>) -> Self {
        self.rules.push((trigger.into(), Action::Fail));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_words(lx: &mut Lexer<'_, usize>, _node: NodeId) -> ParseResult<Outcome> {
        lx.scratch += 1;
        Ok(Outcome::to(DEFAULT_STATE))
    }

    #[test]
    fn test_lookup_prefers_literal_then_class_then_wildcard() {
        let grammar: Grammar<usize> = Grammar::builder("lookup")
            .class("letter", &["a-z"])
            .state(DEFAULT_STATE, |s| {
                s.step('x', Step::to("x"))
                    .step(Trigger::class("letter"), Step::to("letter"))
                    .step(Trigger::Any, Step::to("any"))
            })
            .state("x", |s| s)
            .state("letter", |s| s)
            .state("any", |s| s)
            .build()
            .unwrap();

        let target = |ch| match grammar.lookup(DEFAULT_STATE, ch) {
            Some(Some(Action::Step(step))) => step.target(),
            _ => None,
        };
        assert_eq!(target('x'), Some("x"));
        assert_eq!(target('q'), Some("letter"));
        assert_eq!(target('7'), Some("any"));
        assert!(grammar.lookup("missing", 'x').is_none());
    }

    #[test]
    fn test_build_rejects_unknown_targets_and_classes() {
        let unknown_state = Grammar::<()>::builder("bad")
            .state(DEFAULT_STATE, |s| s.step('a', Step::to("nowhere")))
            .build()
            .unwrap_err();
        assert_eq!(
            unknown_state,
            GrammarError::UnknownState {
                from: "".into(),
                to: "nowhere".into()
            }
        );

        let unknown_class = Grammar::<()>::builder("bad")
            .state(DEFAULT_STATE, |s| s.step(Trigger::class("nope"), Step::skip()))
            .build()
            .unwrap_err();
        assert!(matches!(unknown_class, GrammarError::UnknownClass { .. }));

        let missing_default = Grammar::<()>::builder("bad").state("a", |s| s).build().unwrap_err();
        assert_eq!(missing_default, GrammarError::MissingDefaultState);
    }

    #[test]
    fn test_handlers_see_the_scratch_context() {
        let grammar: Grammar<usize> = Grammar::builder("words")
            .state(DEFAULT_STATE, |s| s.call(' ', count_words))
            .build()
            .unwrap();

        let mut lx = Lexer::new(&grammar, "a b c ", 0);
        lx.run_to_end().unwrap();
        assert_eq!(lx.scratch, 3);
    }
}
