//! Persistent expand/collapse.
//!
//! A toggle rebuilds only the sibling lists on the way from the root to the
//! target. Every other list is the same `Arc` in both forests, so the old
//! forest stays valid and callers can compare subtrees by pointer.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::node::{ExpandedState, Forest, NodePath, TreeNode};

/// Flip the expand state of the node at `path`.
///
/// Unknown paths and nodes without children leave the forest unchanged and
/// return a clone of the same `Arc`.
#[must_use]
pub fn toggle_expand_state(forest: &Forest, path: &NodePath) -> Forest {
    toggle_in(forest, path).unwrap_or_else(|| {
        debug!(?path, "toggle ignored: no toggleable node at path");
        Arc::clone(forest)
    })
}

fn toggle_in(forest: &Forest, path: &NodePath) -> Option<Forest> {
    let idx = forest.iter().position(|n| n.path().is_prefix_of(path))?;
    let node = &forest[idx];

    let replacement = if node.path() == path {
        if node.expanded_state() == ExpandedState::NoChildren {
            return None;
        }
        node.toggled()
    } else {
        let children = toggle_in(node.children(), path)?;
        node.with_children(children)
    };

    let mut siblings = forest.to_vec();
    siblings[idx] = replacement;
    Some(Forest::from(siblings))
}

/// Paths of every expanded node, for rebuilding with
/// [`HierarchyBuilder::remembering`](super::HierarchyBuilder::remembering).
#[must_use]
pub fn expanded_paths(forest: &[TreeNode]) -> HashSet<NodePath> {
    let mut out = HashSet::new();
    let mut stack: Vec<&TreeNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        if node.expanded_state() == ExpandedState::Expanded {
            out.insert(node.path().clone());
        }
        stack.extend(node.children().iter());
    }
    out
}
