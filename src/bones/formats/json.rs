//! JSON output of the tree snapshot

use super::registry::{FormatError, Formatter};
use crate::bones::ast::{snapshot_from_tree, Tree};

/// Pretty-printed JSON of the whole tree
pub fn to_json(tree: &Tree) -> Result<String, FormatError> {
    serde_json::to_string_pretty(&snapshot_from_tree(tree))
        .map_err(|err| FormatError::SerializationError(err.to_string()))
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, tree: &Tree) -> Result<String, FormatError> {
        to_json(tree)
    }

    fn description(&self) -> &str {
        "Tree snapshot as JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bones::ast::{Element, Fragment, Payload, Position};
    use serde_json::{json, Value};

    #[test]
    fn test_json_shape() {
        let mut tree = Tree::new();
        let root = tree.root();
        let mut element = Element::named("a");
        element
            .attributes
            .push("href", vec![Fragment::expression("url")])
            .unwrap();
        let a = tree.append(root, Payload::Tag(element), 0, Position::default());
        tree.node_mut(a).group = true;

        let value: Value = serde_json::from_str(&to_json(&tree).unwrap()).unwrap();
        assert_eq!(value["kind"], "root");
        let child = &value["children"][0];
        assert_eq!(child["kind"], "tag");
        assert_eq!(child["group"], true);
        assert!(child.get("shorty").is_none());
        assert_eq!(child["payload"]["name"], json!([{ "literal": "a" }]));
        assert_eq!(
            child["payload"]["attributes"]["href"],
            json!([[{ "expression": "url" }]])
        );
    }
}
