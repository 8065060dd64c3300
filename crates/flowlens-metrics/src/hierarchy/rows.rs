use serde::Serialize;

use flowlens_core::model::WorkItemId;

use super::node::{EnvironmentKey, ExpandedState, NodePath, ProjectScope, TreeNode};

/// What a row stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RowKind {
    Project {
        scope: ProjectScope,
    },
    TypeGroup {
        type_id: String,
    },
    EnvironmentGroup {
        type_id: String,
        environment: EnvironmentKey,
    },
    WorkItem {
        work_item_id: WorkItemId,
    },
}

impl RowKind {
    fn of(node: &TreeNode) -> Self {
        match node {
            TreeNode::Project(n) => Self::Project {
                scope: n.scope.clone(),
            },
            TreeNode::TypeGroup(n) => Self::TypeGroup {
                type_id: n.type_id.clone(),
            },
            TreeNode::EnvironmentGroup(n) => Self::EnvironmentGroup {
                type_id: n.type_id.clone(),
                environment: n.environment.clone(),
            },
            TreeNode::WorkItem(n) => Self::WorkItem {
                work_item_id: n.work_item_id,
            },
        }
    }
}

/// One visible line of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub path: NodePath,
    pub depth: usize,
    pub expanded_state: ExpandedState,
    pub child_count: usize,
    #[serde(flatten)]
    pub kind: RowKind,
}

/// Visible rows in pre-order. Children of collapsed nodes are skipped.
#[must_use]
pub fn rows_to_render(forest: &[TreeNode]) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();

    while let Some(node) = stack.pop() {
        rows.push(Row {
            path: node.path().clone(),
            depth: node.base().depth,
            expanded_state: node.expanded_state(),
            child_count: node.children().len(),
            kind: RowKind::of(node),
        });
        if node.expanded_state() == ExpandedState::Expanded {
            stack.extend(node.children().iter().rev());
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::node::{Forest, NodeBase, PathSegment, ProjectNode, WorkItemNode};

    fn item(parent: &NodePath, id: u64, depth: usize, children: Vec<TreeNode>) -> TreeNode {
        let state = if children.is_empty() {
            ExpandedState::NoChildren
        } else {
            ExpandedState::Collapsed
        };
        TreeNode::WorkItem(WorkItemNode {
            base: NodeBase {
                path: parent.child(PathSegment::Item(id)),
                depth,
                expanded_state: state,
            },
            work_item_id: id,
            children: Forest::from(children),
        })
    }

    fn forest() -> Forest {
        let root = NodePath::root(PathSegment::Project(ProjectScope::All));
        let p1 = root.child(PathSegment::Item(1));
        let grandchild = item(&p1.child(PathSegment::Item(2)), 3, 3, vec![]);
        let child = item(&p1, 2, 2, vec![grandchild]);
        let sibling = item(&p1, 4, 2, vec![]);
        let top =
            item(&root, 1, 1, vec![child, sibling]).with_expanded_state(ExpandedState::Expanded);
        Forest::from(vec![TreeNode::Project(ProjectNode {
            base: NodeBase {
                path: root,
                depth: 0,
                expanded_state: ExpandedState::Expanded,
            },
            scope: ProjectScope::All,
            children: Forest::from(vec![top]),
        })])
    }

    #[test]
    fn collapsed_children_are_hidden() {
        let rows = rows_to_render(&forest());
        let ids: Vec<_> = rows
            .iter()
            .filter_map(|r| match r.kind {
                RowKind::WorkItem { work_item_id } => Some(work_item_id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(rows.iter().map(|r| r.depth).collect::<Vec<_>>(), vec![0, 1, 2, 2]);
        assert_eq!(rows[2].child_count, 1);
        assert_eq!(rows[2].expanded_state, ExpandedState::Collapsed);
    }

    #[test]
    fn row_json_is_flat() {
        let rows = rows_to_render(&forest());
        let json = serde_json::to_value(&rows[1]).expect("json");
        assert_eq!(json["kind"], "work_item");
        assert_eq!(json["workItemId"], 1);
        assert_eq!(json["expandedState"], "expanded");
        assert_eq!(json["childCount"], 2);
    }
}
