//! Indentation tracking
//!
//! Indentation-sensitive grammars call into this module once per line, before the line's
//! first significant character is dispatched.
//!
//! Mode and unit
//!
//!     The first line indented at all fixes the mode (tabs or spaces) and its width becomes
//!     the unit. Afterwards every indented line must use the same character and a width that
//!     is a multiple of the unit; a line mixing both characters is rejected outright.
//!
//! Levels
//!
//!     `level = width / unit`. A line may go at most one level deeper than the previous one,
//!     and any number of levels shallower.
//!
//! Structure
//!
//!     [`resolve`] turns a level change into the node the line's content nests under:
//!
//!         +1   descend into the most recent child that is not a comment (and through a
//!              trailing shorty chain), unless the current node is a group whose body
//!              this line starts
//!         -n   ascend n times, skipping shorty ancestors; a group absorbs the single step
//!              that leads from its body back to its brace line
//!          0   unchanged

use crate::bones::ast::{NodeId, NodeKind, Tree};
use crate::bones::engine::Indent;
use log::debug;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentMode {
    Tabs,
    Spaces,
}

impl fmt::Display for IndentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndentMode::Tabs => f.write_str("tabs"),
            IndentMode::Spaces => f.write_str("spaces"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndentError {
    #[error("Mixed tabs and spaces in indentation")]
    Mixed,
    #[error("Indented with {found}, but the document is indented with {mode}")]
    WrongCharacter { mode: IndentMode, found: IndentMode },
    #[error("Indentation mismatch: width {width} is not a multiple of {unit}")]
    NotMultiple { width: usize, unit: usize },
    #[error("Indentation mismatch: level {to} follows level {from}")]
    Jump { from: usize, to: usize },
    #[error("Unexpected indentation: nothing to nest under")]
    NothingToNest,
    #[error("Dedent goes past the root")]
    PastRoot,
    #[error("Dedent leaves a group before its closing `}}`")]
    LeavesGroup,
}

/// A validated move from one nesting level to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub from: usize,
    pub to: usize,
}

impl LevelChange {
    pub fn is_deeper(&self) -> bool {
        self.to == self.from + 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndentationTracker {
    mode: Option<IndentMode>,
    unit: usize,
    level: usize,
}

impl IndentationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<IndentMode> {
        self.mode
    }

    pub fn unit(&self) -> usize {
        self.unit
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Validates a line's indentation and records its level
    pub fn observe(&mut self, indent: Indent) -> Result<LevelChange, IndentError> {
        if indent.is_mixed() {
            return Err(IndentError::Mixed);
        }

        let width = indent.width();
        let level = if width == 0 {
            0
        } else {
            let found = if indent.tabs > 0 {
                IndentMode::Tabs
            } else {
                IndentMode::Spaces
            };
            match self.mode {
                None => {
                    debug!("indentation: {} with a unit of {}", found, width);
                    self.mode = Some(found);
                    self.unit = width;
                }
                Some(mode) if mode != found => {
                    return Err(IndentError::WrongCharacter { mode, found });
                }
                Some(_) => {}
            }
            if width % self.unit != 0 {
                return Err(IndentError::NotMultiple {
                    width,
                    unit: self.unit,
                });
            }
            width / self.unit
        };

        if level > self.level + 1 {
            return Err(IndentError::Jump {
                from: self.level,
                to: level,
            });
        }
        let change = LevelChange {
            from: self.level,
            to: level,
        };
        self.level = level;
        Ok(change)
    }
}

/// The node a line nests under after `change`, starting from `current`
///
/// `groups` maps every open group to the level of the line that opened it.
pub fn resolve(
    tree: &Tree,
    current: NodeId,
    change: LevelChange,
    groups: &HashMap<NodeId, usize>,
) -> Result<NodeId, IndentError> {
    if change.is_deeper() {
        if groups.get(&current) == Some(&change.from) {
            return Ok(current);
        }
        let mut target = last_nestable(tree, current).ok_or(IndentError::NothingToNest)?;
        while tree.node(target).shorty {
            match last_nestable(tree, target) {
                Some(child) => target = child,
                None => break,
            }
        }
        return Ok(target);
    }

    let mut node = current;
    let mut left = change.from;
    let mut inside_group = false;
    while left > change.to {
        if inside_group {
            return Err(IndentError::LeavesGroup);
        }
        if let Some(level) = groups.get(&node) {
            if level + 1 == left {
                inside_group = true;
                left -= 1;
                continue;
            }
            return Err(IndentError::LeavesGroup);
        }
        node = ascend(tree, node)?;
        left -= 1;
    }
    Ok(node)
}

/// The most recent child that content can nest under; comments never take children
fn last_nestable(tree: &Tree, id: NodeId) -> Option<NodeId> {
    tree.children(id)
        .iter()
        .rev()
        .copied()
        .find(|child| tree.node(*child).kind() != NodeKind::Comment)
}

/// Parent of `node`, skipping shorty ancestors
pub fn ascend(tree: &Tree, node: NodeId) -> Result<NodeId, IndentError> {
    let mut parent = tree.parent(node).ok_or(IndentError::PastRoot)?;
    while tree.node(parent).shorty {
        parent = tree.parent(parent).ok_or(IndentError::PastRoot)?;
    }
    Ok(parent)
}
