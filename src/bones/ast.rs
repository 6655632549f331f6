//! Tree model shared by every grammar
//!
//! A parse produces a [`Tree`]: an arena of [`Node`]s addressed by [`NodeId`]. The arena
//! owns every node; parent links are plain ids, never ownership edges. Nodes are only ever
//! appended while a parse runs and the tree is handed to the caller once the parse returns.
//!
//! Node payloads live in [`node`], attribute values and their fragments in [`fragment`].

pub mod fragment;
pub mod node;
pub mod range;
pub mod snapshot;
pub mod tree;

pub use fragment::{
    display_chain, literal_chain, AttrValue, AttributeError, Attributes, Fragment, InheritFrom,
};
pub use node::{Call, Define, DefineKind, Directive, Element, Node, NodeKind, Payload, Text, TextValue};
pub use range::{Position, SourceLocation};
pub use snapshot::{snapshot_from_tree, snapshot_node, NodeSnapshot};
pub use tree::{NodeId, Tree};
