//! Parent/child hierarchy trees for one root work item.
//!
//! Children of an item are grouped first by work item type and then by
//! environment; the environment level is skipped when no child of that type
//! names one. Every node is addressed by a [`NodePath`] that is unique within
//! its view.
//!
//! Forests are immutable. [`toggle_expand_state`] returns a new forest that
//! shares every untouched sibling list with the old one.

mod build;
mod node;
mod rows;
mod toggle;

pub use build::{HierarchyBuilder, HierarchyViews, prune_to_project};
pub use node::{
    EnvironmentGroupNode, EnvironmentKey, ExpandedState, Forest, NodeBase, NodePath, PathSegment,
    ProjectNode, ProjectScope, TreeNode, TypeGroupNode, WorkItemNode, find_node,
};
pub use rows::{Row, RowKind, rows_to_render};
pub use toggle::{expanded_paths, toggle_expand_state};
