//! Partition work items into `type → group → ids` buckets.
//!
//! The bucket skeleton always covers every `(type, group)` pair present in
//! the input, whether or not the predicate keeps any item in it. Renderers
//! rely on this to draw empty states for filtered-out groups.

use std::collections::BTreeMap;
use std::fmt;

use flowlens_core::model::{Overview, WorkItem, WorkItemId};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::instrument;

/// Group an item is bucketed under.
///
/// `Ungrouped` is a distinct variant, so a real group that happens to be
/// named like the sentinel can never collide with it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Named(String),
    Ungrouped,
}

impl GroupKey {
    /// Group key for `item`, treating orphan group ids as ungrouped.
    #[must_use]
    pub fn of(overview: &Overview, item: &WorkItem) -> Self {
        overview
            .group_name(item)
            .map_or(Self::Ungrouped, |name| Self::Named(name.to_string()))
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Ungrouped => None,
        }
    }

    /// Collision-free composite key for caches.
    #[must_use]
    pub fn cache_key(&self, type_id: &str) -> String {
        match self {
            Self::Named(name) => format!("{}:{type_id}:n:{name}", type_id.len()),
            Self::Ungrouped => format!("{}:{type_id}:u", type_id.len()),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Ungrouped => write!(f, "(no group)"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Named(name) => serializer.serialize_some(name),
            Self::Ungrouped => serializer.serialize_none(),
        }
    }
}

/// Work item ids bucketed by type id, then by group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizedWorkItems {
    by_type: BTreeMap<String, BTreeMap<GroupKey, Vec<WorkItemId>>>,
}

impl OrganizedWorkItems {
    /// Ids in one bucket, or `None` if the pair is not in the skeleton.
    #[must_use]
    pub fn get(&self, type_id: &str, group: &GroupKey) -> Option<&[WorkItemId]> {
        self.by_type
            .get(type_id)
            .and_then(|groups| groups.get(group))
            .map(Vec::as_slice)
    }

    /// Buckets of a single type.
    #[must_use]
    pub fn groups_of(&self, type_id: &str) -> Option<&BTreeMap<GroupKey, Vec<WorkItemId>>> {
        self.by_type.get(type_id)
    }

    /// Every bucket in `(type id, group)` order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupKey, &[WorkItemId])> {
        self.by_type.iter().flat_map(|(type_id, groups)| {
            groups
                .iter()
                .map(move |(group, ids)| (type_id.as_str(), group, ids.as_slice()))
        })
    }

    /// The `(type id, group)` pairs, independent of which items were kept.
    #[must_use]
    pub fn skeleton(&self) -> Vec<(String, GroupKey)> {
        self.iter()
            .map(|(type_id, group, _)| (type_id.to_string(), group.clone()))
            .collect()
    }

    /// All kept ids in bucket order.
    #[must_use]
    pub fn flatten(&self) -> Vec<WorkItemId> {
        self.iter().flat_map(|(_, _, ids)| ids.iter().copied()).collect()
    }

    /// Number of kept ids across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().map(|(_, _, ids)| ids.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `(type id, group)` buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.by_type.values().map(BTreeMap::len).sum()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketRef<'a> {
    type_id: &'a str,
    group: &'a GroupKey,
    work_item_ids: &'a [WorkItemId],
}

impl Serialize for OrganizedWorkItems {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.bucket_count()))?;
        for (type_id, group, work_item_ids) in self.iter() {
            seq.serialize_element(&BucketRef {
                type_id,
                group,
                work_item_ids,
            })?;
        }
        seq.end()
    }
}

/// Organize every item in the snapshot.
#[must_use]
pub fn organize_by_work_item_type(
    overview: &Overview,
    predicate: impl Fn(&WorkItem) -> bool,
) -> OrganizedWorkItems {
    organize_work_items(overview, overview.by_id.values(), predicate)
}

/// Organize `items` in a single pass.
///
/// Every item contributes its `(type, group)` pair to the skeleton; only
/// items accepted by `predicate` are placed in their bucket.
#[must_use]
#[instrument(skip_all)]
pub fn organize_work_items<'a>(
    overview: &Overview,
    items: impl IntoIterator<Item = &'a WorkItem>,
    predicate: impl Fn(&WorkItem) -> bool,
) -> OrganizedWorkItems {
    let mut by_type: BTreeMap<String, BTreeMap<GroupKey, Vec<WorkItemId>>> = BTreeMap::new();

    for item in items {
        let bucket = by_type
            .entry(item.type_id.clone())
            .or_default()
            .entry(GroupKey::of(overview, item))
            .or_default();
        if predicate(item) {
            bucket.push(item.id);
        }
    }

    OrganizedWorkItems { by_type }
}
