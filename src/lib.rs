//! # bonelex
//!
//! A table-driven lexer engine that turns a flat character stream into a typed tree,
//! plus two grammars written against it:
//!
//! - the template grammar, an indentation-sensitive markup templating language
//!   (tags, shorthand id/class, bracketed attributes, text blocks, groups, keyword
//!   directives);
//! - the markup grammar, conventional `<tag attr="v">…</tag>` markup with comments
//!   and CDATA sections.
//!
//! The engine is not a fixed-grammar parser. A grammar is a table of states, each state
//! mapping characters (literal, class, wildcard) to actions that control the pending token,
//! the active state and the tree being built. See [`bones::engine`] for the contract.
//!
//! ```text
//! ul.menu
//!   li > a[href="/"] | Home
//!   for (item in items)
//!     li | ${item.title}
//! ```
//!
//! ## Entry points
//!
//! - [`parse_template`] / [`TemplateParser`] for templates
//! - [`parse_markup`] for markup
//! - [`bones::engine::Grammar::parse`] for grammars of your own
//!
//! ## Testing
//!
//! The [testing module](bones::testing) carries the fluent tree assertions used throughout
//! the crate's tests.

pub mod bones;

pub use bones::ast::{Fragment, Node, NodeId, NodeKind, Payload, Tree};
pub use bones::error::{ErrorKind, ParseError, ParseResult};
pub use bones::grammars::markup::parse_markup;
pub use bones::grammars::template::{parse_template, TemplateParser};
pub use bones::keywords::KeywordRegistry;
