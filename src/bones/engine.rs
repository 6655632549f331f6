//! The transition engine
//!
//! A grammar is a table `state -> (trigger -> action)` interpreted one character at a time.
//!
//! Dispatch
//!
//!     For the current character, the active state's rules are checked literal-first, then
//!     character class (in the order the state declares them), then the wildcard. A
//!     character that matches nothing joins the pending token and the state stays put.
//!
//! Actions
//!
//!     An action is a [`Step`], a handler function, or a plain failure.
//!
//!     A [`Step`] pairs a [`TokenAction`] (what happens to the pending token) with a
//!     [`Transition`] (whether the character is consumed and which state comes next):
//!
//!         Step::extend()        character joins the token, stay
//!         Step::skip()          token restarts after the character, stay
//!         Step::to(s)           token restarts after the character, move to `s`
//!         Step::begin(s)        token starts at the character, move to `s`
//!         Step::reconsume(s)    move to `s` and dispatch the same character again
//!
//!     A handler receives the [`Lexer`] and the current node. It may read the pending token,
//!     capture ahead, and append nodes, and it answers with an [`Outcome`]: stay, follow a
//!     step, or make another node current (optionally following a step as well).
//!
//! Hooks
//!
//!     `on_start` runs before the first character, `on_indent` once per physical line right
//!     before the line's first significant character is dispatched, and `on_end` once the
//!     input is exhausted. `on_end` validates the tree is closed.
//!
//! Scratch
//!
//!     Everything a grammar needs to remember between characters (attribute being read,
//!     pending value fragments, indentation state) lives in the grammar's scratch type `C`,
//!     created fresh for every parse and reachable as [`Lexer::scratch`]. Tables are
//!     immutable and can be shared by any number of parses.

pub mod capture;
pub mod classes;
pub mod lexer;
pub mod table;

pub use classes::{CharClasses, ClassId};
pub use lexer::{Indent, Lexer};
pub use table::{
    Action, Grammar, GrammarBuilder, GrammarError, Handler, Outcome, StateBuilder, StateName,
    Step, TokenAction, Transition, Trigger, DEFAULT_STATE,
};
