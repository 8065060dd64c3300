use std::fmt;
use std::sync::Arc;

use flowlens_core::model::WorkItemId;
use serde::Serialize;

/// Shared, immutable list of sibling nodes.
///
/// Toggling rebuilds only the lists along the toggled path; every other list
/// is shared between the old and the new forest.
pub type Forest = Arc<[TreeNode]>;

/// Which view a tree belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectScope {
    Own(String),
    All,
}

/// Environment a child is deployed to, with a distinct variant for "none".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentKey {
    Named(String),
    Unspecified,
}

impl EnvironmentKey {
    #[must_use]
    pub fn from_env(env: Option<&str>) -> Self {
        env.map_or(Self::Unspecified, |e| Self::Named(e.to_string()))
    }
}

impl fmt::Display for EnvironmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(env) => write!(f, "{env}"),
            Self::Unspecified => write!(f, "(no environment)"),
        }
    }
}

/// One step of a node's address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    Project(ProjectScope),
    Type(String),
    Environment(EnvironmentKey),
    Item(WorkItemId),
}

/// Ordered chain of segments from the view root down to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    #[must_use]
    pub fn root(segment: PathSegment) -> Self {
        Self(vec![segment])
    }

    /// This path extended by one segment.
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        Self(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` is `other` or one of its ancestors.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Same path under a different first segment.
    #[must_use]
    pub fn with_root(&self, root: PathSegment) -> Self {
        let mut segments = self.0.clone();
        if let Some(first) = segments.first_mut() {
            *first = root;
        }
        Self(segments)
    }
}

impl From<Vec<PathSegment>> for NodePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpandedState {
    Collapsed,
    Expanded,
    NoChildren,
}

impl ExpandedState {
    /// `Expanded` ↔ `Collapsed`; `NoChildren` never changes.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
            Self::NoChildren => Self::NoChildren,
        }
    }
}

/// Fields every node kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBase {
    pub path: NodePath,
    pub depth: usize,
    pub expanded_state: ExpandedState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNode {
    pub base: NodeBase,
    pub scope: ProjectScope,
    pub children: Forest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGroupNode {
    pub base: NodeBase,
    pub type_id: String,
    pub children: Forest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentGroupNode {
    pub base: NodeBase,
    pub type_id: String,
    pub environment: EnvironmentKey,
    pub children: Forest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemNode {
    pub base: NodeBase,
    pub work_item_id: WorkItemId,
    pub children: Forest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Project(ProjectNode),
    TypeGroup(TypeGroupNode),
    EnvironmentGroup(EnvironmentGroupNode),
    WorkItem(WorkItemNode),
}

impl TreeNode {
    #[must_use]
    pub const fn base(&self) -> &NodeBase {
        match self {
            Self::Project(n) => &n.base,
            Self::TypeGroup(n) => &n.base,
            Self::EnvironmentGroup(n) => &n.base,
            Self::WorkItem(n) => &n.base,
        }
    }

    const fn base_mut(&mut self) -> &mut NodeBase {
        match self {
            Self::Project(n) => &mut n.base,
            Self::TypeGroup(n) => &mut n.base,
            Self::EnvironmentGroup(n) => &mut n.base,
            Self::WorkItem(n) => &mut n.base,
        }
    }

    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.base().path
    }

    #[must_use]
    pub const fn expanded_state(&self) -> ExpandedState {
        self.base().expanded_state
    }

    #[must_use]
    pub const fn children(&self) -> &Forest {
        match self {
            Self::Project(n) => &n.children,
            Self::TypeGroup(n) => &n.children,
            Self::EnvironmentGroup(n) => &n.children,
            Self::WorkItem(n) => &n.children,
        }
    }

    /// The work item id for item nodes.
    #[must_use]
    pub const fn work_item_id(&self) -> Option<WorkItemId> {
        match self {
            Self::WorkItem(n) => Some(n.work_item_id),
            _ => None,
        }
    }

    /// Same node with its expand state flipped.
    #[must_use]
    pub fn toggled(&self) -> Self {
        let mut next = self.clone();
        let base = next.base_mut();
        base.expanded_state = base.expanded_state.toggled();
        next
    }

    /// Same node in `state`. A childless node stays `NoChildren`.
    #[must_use]
    pub fn with_expanded_state(&self, state: ExpandedState) -> Self {
        let mut next = self.clone();
        if next.children().is_empty() {
            next.base_mut().expanded_state = ExpandedState::NoChildren;
        } else if state != ExpandedState::NoChildren {
            next.base_mut().expanded_state = state;
        }
        next
    }

    /// Same node over a new child list.
    ///
    /// An empty list forces `NoChildren`; a non-empty list under a
    /// `NoChildren` node starts collapsed.
    #[must_use]
    pub fn with_children(&self, children: Forest) -> Self {
        let mut next = self.clone();
        let state = match (children.is_empty(), next.expanded_state()) {
            (true, _) => ExpandedState::NoChildren,
            (false, ExpandedState::NoChildren) => ExpandedState::Collapsed,
            (false, state) => state,
        };
        match &mut next {
            Self::Project(n) => n.children = children,
            Self::TypeGroup(n) => n.children = children,
            Self::EnvironmentGroup(n) => n.children = children,
            Self::WorkItem(n) => n.children = children,
        }
        next.base_mut().expanded_state = state;
        next
    }

    /// Same subtree with every path rooted at `root`.
    #[must_use]
    pub fn rerooted(&self, root: &PathSegment) -> Self {
        let children: Forest = self
            .children()
            .iter()
            .map(|child| child.rerooted(root))
            .collect();
        let mut next = self.with_children(children);
        let base = next.base_mut();
        base.path = base.path.with_root(root.clone());
        next
    }
}

/// Find the node at `path`.
#[must_use]
pub fn find_node<'a>(forest: &'a [TreeNode], path: &NodePath) -> Option<&'a TreeNode> {
    let node = forest.iter().find(|n| n.path().is_prefix_of(path))?;
    if node.path() == path {
        Some(node)
    } else {
        find_node(node.children(), path)
    }
}
