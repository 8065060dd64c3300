//! Tree construction from the snapshot's parent/child relations.
//!
//! ```text
//! Project (own | all)
//!   └── root item
//!         ├── Type: Bug
//!         │     ├── Env: Production
//!         │     │     └── item 12 ── (recurses into 12's children)
//!         │     └── Env: (none)
//!         │           └── item 13
//!         └── Type: Task            (only "no environment": items sit here)
//!               └── item 14
//! ```
//!
//! # Cycle defense
//!
//! Relations are expected to form a forest but are not trusted to. The ids
//! on the current root-to-node chain are threaded through the recursion and
//! any child already on that chain is skipped, so an id never becomes its
//! own descendant.

use std::collections::{BTreeMap, HashSet};

use flowlens_core::EngineError;
use flowlens_core::config::TreeConfig;
use flowlens_core::model::{Overview, WorkItem, WorkItemId};
use tracing::{debug, instrument};

use super::node::{
    EnvironmentGroupNode, EnvironmentKey, ExpandedState, Forest, NodeBase, NodePath, PathSegment,
    ProjectNode, ProjectScope, TreeNode, TypeGroupNode, WorkItemNode,
};

/// The two views rendered for one root item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyViews {
    /// Pruned to items of the current project.
    pub own: Forest,
    /// Every reachable item, whatever its project.
    pub all: Forest,
}

/// Builds hierarchy forests from one snapshot.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder<'a> {
    overview: &'a Overview,
    expand_depth: usize,
    remembered: Option<&'a HashSet<NodePath>>,
}

impl<'a> HierarchyBuilder<'a> {
    #[must_use]
    pub const fn new(overview: &'a Overview, config: &TreeConfig) -> Self {
        Self {
            overview,
            expand_depth: config.expand_depth,
            remembered: None,
        }
    }

    /// Restore expand state from a previous forest instead of using the
    /// depth default. Paths not in `expanded` start collapsed.
    #[must_use]
    pub const fn remembering(mut self, expanded: &'a HashSet<NodePath>) -> Self {
        self.remembered = Some(expanded);
        self
    }

    /// Build the unpruned tree for `root` under `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownWorkItem`] when the root or any related
    /// child is missing from the snapshot.
    #[instrument(skip(self))]
    pub fn build(&self, root: WorkItemId, scope: ProjectScope) -> Result<Forest, EngineError> {
        let root_item = self.overview.item(root, root)?;
        let project_path = NodePath::root(PathSegment::Project(scope.clone()));

        let mut ancestors = vec![root];
        let root_path = project_path.child(PathSegment::Item(root));
        let root_node = self.item_node(root_item, root_path, 1, &mut ancestors)?;

        let project = TreeNode::Project(ProjectNode {
            base: NodeBase {
                expanded_state: self.initial_state(&project_path, 0, true),
                path: project_path,
                depth: 0,
            },
            scope,
            children: Forest::from(vec![root_node]),
        });
        Ok(Forest::from(vec![project]))
    }

    /// Build both views: the full tree and its pruning to `project`.
    ///
    /// # Errors
    ///
    /// See [`HierarchyBuilder::build`].
    pub fn build_views(
        &self,
        root: WorkItemId,
        project: &str,
    ) -> Result<HierarchyViews, EngineError> {
        let all = self.build(root, ProjectScope::All)?;
        let own_root = PathSegment::Project(ProjectScope::Own(project.to_string()));
        let own: Forest = all
            .iter()
            .map(|node| {
                let pruned = prune_to_project(node, self.overview, project);
                let mut rerooted = pruned.rerooted(&own_root);
                if let TreeNode::Project(p) = &mut rerooted {
                    p.scope = ProjectScope::Own(project.to_string());
                }
                self.restore_state(&rerooted)
            })
            .collect();
        Ok(HierarchyViews { own, all })
    }

    fn item_node(
        &self,
        item: &WorkItem,
        path: NodePath,
        depth: usize,
        ancestors: &mut Vec<WorkItemId>,
    ) -> Result<TreeNode, EngineError> {
        let children = self.child_groups(item.id, &path, depth, ancestors)?;
        Ok(TreeNode::WorkItem(WorkItemNode {
            base: NodeBase {
                expanded_state: self.initial_state(&path, depth, !children.is_empty()),
                path,
                depth,
            },
            work_item_id: item.id,
            children,
        }))
    }

    /// Children of `parent`, grouped by type and then by environment.
    fn child_groups(
        &self,
        parent: WorkItemId,
        parent_path: &NodePath,
        parent_depth: usize,
        ancestors: &mut Vec<WorkItemId>,
    ) -> Result<Forest, EngineError> {
        let mut seen: HashSet<WorkItemId> = HashSet::new();
        let mut by_type: BTreeMap<&str, BTreeMap<EnvironmentKey, Vec<&WorkItem>>> = BTreeMap::new();

        for &child_id in self.overview.children_of(parent) {
            if ancestors.contains(&child_id) {
                debug!(parent, child = child_id, "skipping relation that closes a cycle");
                continue;
            }
            if !seen.insert(child_id) {
                continue;
            }
            let child = self.overview.item(child_id, parent)?;
            by_type
                .entry(child.type_id.as_str())
                .or_default()
                .entry(EnvironmentKey::from_env(child.env.as_deref()))
                .or_default()
                .push(child);
        }

        let type_depth = parent_depth + 1;
        let mut type_nodes = Vec::with_capacity(by_type.len());

        for (type_id, envs) in by_type {
            let type_path = parent_path.child(PathSegment::Type(type_id.to_string()));
            let only_unspecified =
                envs.len() == 1 && envs.contains_key(&EnvironmentKey::Unspecified);

            let children: Vec<TreeNode> = if only_unspecified {
                let items = envs.into_values().flatten();
                self.item_nodes(items, &type_path, type_depth + 1, ancestors)?
            } else {
                let mut env_nodes = Vec::with_capacity(envs.len());
                for (environment, items) in envs {
                    let env_path = type_path.child(PathSegment::Environment(environment.clone()));
                    let env_depth = type_depth + 1;
                    let items = self.item_nodes(items, &env_path, env_depth + 1, ancestors)?;
                    env_nodes.push(TreeNode::EnvironmentGroup(EnvironmentGroupNode {
                        base: NodeBase {
                            expanded_state: self.initial_state(&env_path, env_depth, true),
                            path: env_path,
                            depth: env_depth,
                        },
                        type_id: type_id.to_string(),
                        environment,
                        children: Forest::from(items),
                    }));
                }
                env_nodes
            };

            type_nodes.push(TreeNode::TypeGroup(TypeGroupNode {
                base: NodeBase {
                    expanded_state: self.initial_state(&type_path, type_depth, true),
                    path: type_path,
                    depth: type_depth,
                },
                type_id: type_id.to_string(),
                children: Forest::from(children),
            }));
        }

        Ok(Forest::from(type_nodes))
    }

    fn item_nodes<'i>(
        &self,
        items: impl IntoIterator<Item = &'i WorkItem>,
        parent_path: &NodePath,
        depth: usize,
        ancestors: &mut Vec<WorkItemId>,
    ) -> Result<Vec<TreeNode>, EngineError> {
        items
            .into_iter()
            .map(|child| {
                ancestors.push(child.id);
                let node = self.item_node(
                    child,
                    parent_path.child(PathSegment::Item(child.id)),
                    depth,
                    ancestors,
                );
                ancestors.pop();
                node
            })
            .collect()
    }

    fn initial_state(&self, path: &NodePath, depth: usize, has_children: bool) -> ExpandedState {
        if !has_children {
            return ExpandedState::NoChildren;
        }
        let expanded = self
            .remembered
            .map_or(depth < self.expand_depth, |paths| paths.contains(path));
        if expanded {
            ExpandedState::Expanded
        } else {
            ExpandedState::Collapsed
        }
    }

    /// Re-apply remembered expand state after rerooting into another view.
    fn restore_state(&self, node: &TreeNode) -> TreeNode {
        let children: Forest = node
            .children()
            .iter()
            .map(|child| self.restore_state(child))
            .collect();
        let next = node.with_children(children);
        if self.remembered.is_none() {
            return next;
        }
        let state = self.initial_state(next.path(), next.base().depth, !next.children().is_empty());
        next.with_expanded_state(state)
    }
}

/// Keep only the part of `node`'s subtree reachable through items of
/// `project`.
///
/// Item nodes of another project are dropped with their whole subtree.
/// Group nodes survive only while at least one child survives. The project
/// node itself is always kept.
#[must_use]
pub fn prune_to_project(node: &TreeNode, overview: &Overview, project: &str) -> TreeNode {
    let children: Forest = node
        .children()
        .iter()
        .filter(|child| {
            child.work_item_id().is_none_or(|id| {
                overview
                    .by_id
                    .get(&id)
                    .is_some_and(|item| item.project == project)
            })
        })
        .map(|child| prune_to_project(child, overview, project))
        .filter(|child| child.work_item_id().is_some() || !child.children().is_empty())
        .collect();
    node.with_children(children)
}
