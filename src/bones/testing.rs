//! Testing utilities for tree assertions
//!
//! Two tools, meant to be used together:
//!
//! 1. [`samples`] - curated template and markup sources. Test content lives there rather
//!    than inline in every test, so a syntax change only has to be fixed in one place.
//! 2. [`assert_tree`] - a fluent API that checks a whole subtree per call.
//!
//! ```rust-example
//! use bonelex::bones::testing::{assert_tree, samples};
//! use bonelex::parse_template;
//!
//! let tree = parse_template(samples::template("nav")).unwrap();
//! assert_tree(&tree).child(0, |nav| {
//!     nav.assert_tag("nav")
//!         .child_count(1)
//!         .child(0, |ul| ul.assert_tag("ul").attr_literal("class", "menu"))
//! });
//! ```
//!
//! Without it, the same check is a ladder of `match` arms on payloads; with it, each level
//! is one closure and every failure message carries the path to the node, e.g.
//! `root[0][1]: Expected tag `li`, found text`.

mod assertions;
mod matchers;
pub mod samples;

pub use assertions::{assert_tree, NodeAssertion, TreeAssertion};
pub use matchers::TextMatch;
