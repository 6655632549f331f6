//! Tree snapshot: a normalized, owned view of a tree
//!
//! A [`NodeSnapshot`] nests children inline, the shape serde wants; JSON output is built
//! from it. Treeviz and the source serializers walk the arena directly.

use super::node::{NodeKind, Payload};
use super::tree::{NodeId, Tree};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// Serialized by the flattened payload's tag
    #[serde(skip)]
    pub kind: NodeKind,
    /// One-line summary of the payload
    pub label: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub group: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub shorty: bool,
    /// 0-based line the node was opened on
    pub line: usize,
    #[serde(flatten)]
    pub payload: Payload,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

/// Snapshot of the whole tree, starting at the root
pub fn snapshot_from_tree(tree: &Tree) -> NodeSnapshot {
    snapshot_node(tree, tree.root())
}

/// Snapshot of `id` and all of its descendants
pub fn snapshot_node(tree: &Tree, id: NodeId) -> NodeSnapshot {
    let node = tree.node(id);
    NodeSnapshot {
        kind: node.kind(),
        label: node.payload.label(),
        group: node.group,
        shorty: node.shorty,
        line: node.position.line,
        payload: node.payload.clone(),
        children: node
            .children()
            .iter()
            .map(|child| snapshot_node(tree, *child))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::ast::{Element, Position};

    #[test]
    fn test_snapshot_mirrors_tree() {
        let mut tree = Tree::new();
        let root = tree.root();
        let ul = tree.append(root, Payload::Tag(Element::named("ul")), 0, Position::default());
        tree.node_mut(ul).group = true;
        tree.append(ul, Payload::Comment(" x ".into()), 5, Position::new(1, 2));

        let snapshot = snapshot_from_tree(&tree);
        assert_eq!(snapshot.kind, NodeKind::Root);
        assert_eq!(snapshot.children.len(), 1);
        let ul = &snapshot.children[0];
        assert_eq!(ul.label, "ul");
        assert!(ul.group);
        assert_eq!(ul.children[0].kind, NodeKind::Comment);
        assert_eq!(ul.children[0].line, 1);
    }
}
