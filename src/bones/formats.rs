//! Output formats for parsed trees
//!
//! This module contains the formats a [`Tree`](crate::bones::ast::Tree) can be rendered to:
//! - `treeviz`, a one-line-per-node view for humans and snapshot tests
//! - `json`, the serde view of the tree snapshot
//! - `source`, template and markup text that parses back to the same tree

pub mod json;
pub mod registry;
pub mod source;
pub mod treeviz;

pub use json::{to_json, JsonFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use source::{to_markup, to_template, MarkupFormatter, TemplateFormatter};
pub use treeviz::{to_treeviz_str, to_treeviz_with, TreevizFormatter};
