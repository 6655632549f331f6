//! Treeviz formatter
//!
//! One line per node, which makes a tree quick to scan and easy to snapshot. Nesting is
//! drawn with box connectors, two columns per level:
//!
//!     <prefix><connector> <icon> <label>
//!
//! Labels are cut at the configured width (30 characters by default) and newlines in them
//! are shown as `↵`. A node opened with `{` gets a trailing ` {}`, a shorty node a trailing
//! ` >`. With line numbers on, every line starts with the node's 1-based source line.
//!
//! Example
//!
//!     ├─ ◇ ul.menu >
//!     │ └─ ◇ li
//!     │   └─ ◦ Home
//!     └─ ⚑ for as=item data=items
//!       └─ ◇ li
//!
//! Icons
//!     Root: ⧉
//!     Tag: ◇
//!     Text: ◦
//!     Comment: ※
//!     Cdata: ▤
//!     Dtd: !
//!     HiddenClass: %
//!     Define: ≔
//!     Call: ƒ
//!     Keyword: ⚑

use super::registry::{FormatError, Formatter};
use crate::bones::ast::{NodeId, NodeKind, Tree};
use crate::bones::config::TreevizConfig;

pub fn icon(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Root => "⧉",
        NodeKind::Tag => "◇",
        NodeKind::Text => "◦",
        NodeKind::Comment => "※",
        NodeKind::Cdata => "▤",
        NodeKind::Dtd => "!",
        NodeKind::HiddenClass => "%",
        NodeKind::Define => "≔",
        NodeKind::Call => "ƒ",
        NodeKind::Keyword => "⚑",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

/// Treeviz with the default settings
pub fn to_treeviz_str(tree: &Tree) -> String {
    to_treeviz_with(
        tree,
        &TreevizConfig {
            label_width: 30,
            show_line_numbers: false,
        },
    )
}

pub fn to_treeviz_with(tree: &Tree, config: &TreevizConfig) -> String {
    let mut result = String::new();
    append_children(&mut result, tree, tree.root(), "", config);
    result
}

fn append_node(
    result: &mut String,
    tree: &Tree,
    id: NodeId,
    prefix: &str,
    is_last: bool,
    config: &TreevizConfig,
) {
    let node = &tree[id];
    let connector = if is_last { "└─" } else { "├─" };

    let mut label = truncate(&node.payload.label().replace('\n', "↵"), config.label_width);
    if node.group {
        label.push_str(" {}");
    }
    if node.shorty {
        label.push_str(" >");
    }

    if config.show_line_numbers {
        result.push_str(&format!("{:02} ", node.position.line + 1));
    }
    result.push_str(&format!("{}{} {} {}\n", prefix, connector, icon(node.kind()), label));

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    append_children(result, tree, id, &new_prefix, config);
}

fn append_children(result: &mut String, tree: &Tree, id: NodeId, prefix: &str, config: &TreevizConfig) {
    let children = tree.children(id);
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        append_node(result, tree, *child, prefix, is_last, config);
    }
}

pub struct TreevizFormatter {
    config: TreevizConfig,
}

impl TreevizFormatter {
    pub fn new(config: TreevizConfig) -> Self {
        Self { config }
    }
}

impl Default for TreevizFormatter {
    fn default() -> Self {
        Self::new(TreevizConfig {
            label_width: 30,
            show_line_numbers: false,
        })
    }
}

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, tree: &Tree) -> Result<String, FormatError> {
        Ok(to_treeviz_with(tree, &self.config))
    }

    fn description(&self) -> &str {
        "One line per node, with box-drawing nesting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::ast::{Element, Payload, Position, Text, TextValue};

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        let ul = tree.append(root, Payload::Tag(Element::named("ul")), 0, Position::new(0, 0));
        tree.node_mut(ul).shorty = true;
        let li = tree.append(ul, Payload::Tag(Element::named("li")), 5, Position::new(0, 5));
        tree.append(
            li,
            Payload::Text(Text {
                value: TextValue::Plain("a fairly long line of text\nand more".to_string()),
                multiline: true,
            }),
            10,
            Position::new(1, 2),
        );
        tree.append(root, Payload::Comment(" end".to_string()), 40, Position::new(3, 0));
        tree
    }

    #[test]
    fn test_connectors_and_prefixes() {
        let output = to_treeviz_str(&sample());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "├─ ◇ ul >");
        assert_eq!(lines[1], "│ └─ ◇ li");
        assert_eq!(lines[2], "│   └─ ◦ a fairly long line of text↵and...");
        assert_eq!(lines[3], "└─ ※  end");
    }

    #[test]
    fn test_line_numbers_and_width() {
        let config = TreevizConfig {
            label_width: 5,
            show_line_numbers: true,
        };
        let output = to_treeviz_with(&sample(), &config);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[2], "02 │   └─ ◦ a fai...");
        assert_eq!(lines[3], "04 └─ ※  end");
    }
}
