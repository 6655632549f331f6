//! The node arena
//!
//! Grammars build trees through three primitives: [`Tree::append`] creates a typed child
//! and returns it, [`Tree::parent`] ascends, and [`Tree::graft`] copies the nodes of another
//! tree (used to splice in embedded markup). There is no removal.

use super::node::{Node, Payload};
use super::range::Position;
use serde::Serialize;
use std::fmt;
use std::ops::Index;

/// Index of a node in its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(Payload::Root, None, 0, Position::default())],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing was appended under the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Creates a node as the last child of `parent`
    pub fn append(
        &mut self,
        parent: NodeId,
        payload: Payload,
        offset: usize,
        position: Position,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new(payload, Some(parent), offset, position));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.last().copied()
    }

    /// Strict ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// `id` and everything below it, in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        order
    }

    /// Copies every child of `other`'s root (with their subtrees) under `parent`
    ///
    /// `offset` and `origin` locate `other`'s source inside this tree's source; copied nodes
    /// get their offsets and positions shifted accordingly. Returns the new top-level ids.
    pub fn graft(
        &mut self,
        parent: NodeId,
        other: &Tree,
        offset: usize,
        origin: Position,
    ) -> Vec<NodeId> {
        let mut grafted = Vec::new();
        let mut pending: Vec<(NodeId, NodeId)> = other
            .children(other.root())
            .iter()
            .rev()
            .map(|child| (*child, parent))
            .collect();

        while let Some((source, target_parent)) = pending.pop() {
            let node = other.node(source);
            let id = self.append(
                target_parent,
                node.payload.clone(),
                node.offset + offset,
                node.position.relative_to(origin),
            );
            let copy = self.node_mut(id);
            copy.group = node.group;
            copy.shorty = node.shorty;
            if target_parent == parent {
                grafted.push(id);
            }
            pending.extend(node.children.iter().rev().map(|child| (*child, id)));
        }
        grafted
    }

    /// Structural equality: same kinds, payloads and child order; positions and flags ignored
    pub fn same_shape(&self, other: &Tree) -> bool {
        let mut pending = vec![(self.root(), other.root())];
        while let Some((left, right)) = pending.pop() {
            let (a, b) = (self.node(left), other.node(right));
            if a.payload != b.payload || a.children.len() != b.children.len() {
                return false;
            }
            pending.extend(a.children.iter().copied().zip(b.children.iter().copied()));
        }
        true
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.node(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::ast::{Element, NodeKind, Text, TextValue};

    fn text(value: &str) -> Payload {
        Payload::Text(Text {
            value: TextValue::Plain(value.to_string()),
            multiline: false,
        })
    }

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let div = tree.append(root, Payload::Tag(Element::named("div")), 0, Position::default());
        tree.append(div, text("a"), 4, Position::new(0, 4));
        let span = tree.append(div, Payload::Tag(Element::named("span")), 6, Position::new(1, 2));
        tree.append(span, text("b"), 12, Position::new(1, 8));
        tree
    }

    #[test]
    fn test_append_links_both_ways() {
        let tree = sample();
        let div = tree.children(tree.root())[0];
        assert_eq!(tree[div].kind(), NodeKind::Tag);
        assert_eq!(tree.parent(div), Some(tree.root()));
        assert_eq!(tree.children(div).len(), 2);
        assert_eq!(tree.len(), 5);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_ancestors_and_depth() {
        let tree = sample();
        let deepest = NodeId(4);
        let ancestors: Vec<_> = tree.ancestors(deepest).collect();
        assert_eq!(ancestors, vec![NodeId(3), NodeId(1), NodeId(0)]);
        assert_eq!(tree.depth(deepest), 3);
        assert_eq!(tree.depth(tree.root()), 0);
    }

    #[test]
    fn test_descendants_are_in_document_order() {
        let tree = sample();
        let order: Vec<_> = tree.descendants(tree.root()).into_iter().map(NodeId::index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_graft_copies_subtrees_and_shifts_positions() {
        let fragment = sample();
        let mut tree = Tree::new();
        let root = tree.root();
        let host = tree.append(root, Payload::Tag(Element::named("p")), 0, Position::default());

        let grafted = tree.graft(host, &fragment, 10, Position::new(3, 5));

        assert_eq!(grafted.len(), 1);
        assert_eq!(tree.children(host), grafted.as_slice());
        let div = grafted[0];
        assert_eq!(tree[div].offset, 10);
        assert_eq!(tree[div].position, Position::new(3, 5));
        let span = tree.children(div)[1];
        assert_eq!(tree[span].position, Position::new(4, 2));
        assert_eq!(tree.children(span).len(), 1);
    }

    #[test]
    fn test_same_shape_ignores_positions() {
        let mut other = Tree::new();
        let root = other.root();
        let div = other.append(root, Payload::Tag(Element::named("div")), 9, Position::new(7, 7));
        other.append(div, text("a"), 0, Position::default());
        let span = other.append(div, Payload::Tag(Element::named("span")), 0, Position::default());
        other.append(span, text("b"), 0, Position::default());

        assert!(sample().same_shape(&other));

        other.append(span, text("c"), 0, Position::default());
        assert!(!sample().same_shape(&other));
    }
}
