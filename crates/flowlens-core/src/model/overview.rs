//! The external snapshot contract.
//!
//! An [`Overview`] arrives wholesale on every refresh and is never mutated.
//! Every map is a `BTreeMap` so anything derived from it iterates in a
//! stable order.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::item::{Group, WorkItem, WorkItemId, WorkItemType};
use super::times::WorkItemTimes;
use crate::error::{EngineError, ErrorCode};

/// Every item, type, group, timeline and parent/child link in one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub by_id: BTreeMap<WorkItemId, WorkItem>,
    #[serde(default)]
    pub types: BTreeMap<String, WorkItemType>,
    #[serde(default)]
    pub groups: BTreeMap<String, Group>,
    #[serde(default)]
    pub times: BTreeMap<WorkItemId, WorkItemTimes>,
    #[serde(default)]
    pub relations: BTreeMap<WorkItemId, Vec<WorkItemId>>,
}

impl Overview {
    /// Parse a snapshot from the scraper's JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Json`] if the payload does not match the contract.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up an item, failing when the id is not part of the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownWorkItem`] with `referenced_by` set to
    /// the caller-supplied referrer.
    pub fn item(
        &self,
        id: WorkItemId,
        referenced_by: WorkItemId,
    ) -> Result<&WorkItem, EngineError> {
        self.by_id
            .get(&id)
            .ok_or(EngineError::UnknownWorkItem { id, referenced_by })
    }

    /// Times for an item. Items without an entry have an empty history.
    #[must_use]
    pub fn times_of(&self, id: WorkItemId) -> Option<&WorkItemTimes> {
        self.times.get(&id)
    }

    /// Direct children of `id` as recorded in `relations`.
    #[must_use]
    pub fn children_of(&self, id: WorkItemId) -> &[WorkItemId] {
        self.relations.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Resolve the group name an item belongs to.
    ///
    /// Returns `None` when the item has no group or references a group
    /// missing from `groups`.
    #[must_use]
    pub fn group_name(&self, item: &WorkItem) -> Option<&str> {
        let group_id = item.group_id.as_deref()?;
        match self.groups.get(group_id) {
            Some(group) => Some(group.name.as_str()),
            None => {
                tracing::debug!(item = item.id, group_id, "orphan group, treating as ungrouped");
                None
            }
        }
    }

    /// Check the snapshot for upstream contract violations.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, scanning relations first, then
    /// item types, then timelines.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (&parent, children) in &self.relations {
            for &id in std::iter::once(&parent).chain(children) {
                if !self.by_id.contains_key(&id) {
                    return Err(EngineError::UnknownWorkItem {
                        id,
                        referenced_by: parent,
                    });
                }
                if !self.times.contains_key(&id) {
                    return Err(EngineError::MissingTimes { id });
                }
            }
        }

        for item in self.by_id.values() {
            if !self.types.contains_key(&item.type_id) {
                return Err(EngineError::UnknownType {
                    id: item.id,
                    type_id: item.type_id.clone(),
                });
            }
        }

        if let Some((&id, _)) = self.times.iter().find(|(_, times)| times.is_inverted()) {
            return Err(EngineError::InvalidTimeline { id });
        }

        Ok(())
    }

    /// BLAKE3 content hash of the canonical JSON encoding.
    ///
    /// Two snapshots with the same fingerprint produce identical derived
    /// output for the same reference time.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        // BTreeMap-backed maps serialize in key order. Every map key is a
        // string or an integer, so encoding cannot fail.
        if let Ok(bytes) = serde_json::to_vec(self) {
            hasher.update(&bytes);
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}

/// Read and parse a snapshot file written by the scraper.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_overview(path: &Path) -> anyhow::Result<Overview> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str::<Overview>(&content).with_context(|| {
        format!(
            "{}: failed to parse {}",
            ErrorCode::SnapshotParseError,
            path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::Created;
    use crate::model::times::WorkCenterTime;
    use chrono::{TimeZone, Utc};

    fn item(id: WorkItemId, type_id: &str, group_id: Option<&str>) -> WorkItem {
        WorkItem {
            id,
            type_id: type_id.into(),
            group_id: group_id.map(Into::into),
            env: None,
            priority: None,
            effort: None,
            project: "web".into(),
            created: Created {
                on: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("date"),
            },
            state: "Active".into(),
            url: String::new(),
            title: format!("Item {id}"),
            filter_by: vec![],
            rca: vec![],
        }
    }

    fn overview(ids: &[WorkItemId]) -> Overview {
        let mut ov = Overview::default();
        ov.types.insert(
            "story".into(),
            WorkItemType {
                name: "User Story".into(),
                plural_name: None,
                icon: String::new(),
                color: None,
                work_centers: vec![],
            },
        );
        for &id in ids {
            ov.by_id.insert(id, item(id, "story", None));
            ov.times.insert(id, WorkItemTimes::default());
        }
        ov
    }

    #[test]
    fn valid_snapshot_passes() {
        let mut ov = overview(&[1, 2]);
        ov.relations.insert(1, vec![2]);
        assert!(ov.validate().is_ok());
    }

    #[test]
    fn relation_to_unknown_item_is_a_violation() {
        let mut ov = overview(&[1]);
        ov.relations.insert(1, vec![9]);
        let err = ov.validate().expect_err("must fail");
        assert!(matches!(
            err,
            EngineError::UnknownWorkItem {
                id: 9,
                referenced_by: 1
            }
        ));
    }

    #[test]
    fn relation_to_item_without_times_is_a_violation() {
        let mut ov = overview(&[1, 2]);
        ov.times.remove(&2);
        ov.relations.insert(1, vec![2]);
        assert!(matches!(
            ov.validate(),
            Err(EngineError::MissingTimes { id: 2 })
        ));
    }

    #[test]
    fn unknown_type_is_a_violation() {
        let mut ov = overview(&[1]);
        ov.by_id.insert(5, item(5, "epic", None));
        assert!(matches!(
            ov.validate(),
            Err(EngineError::UnknownType { id: 5, .. })
        ));
    }

    #[test]
    fn inverted_timeline_is_a_violation() {
        let at = |day| Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).single().expect("date");
        let mut ov = overview(&[1, 2]);
        ov.relations.insert(1, vec![2]);
        ov.times.insert(
            2,
            WorkItemTimes {
                start: Some(at(10)),
                end: Some(at(3)),
                ..WorkItemTimes::default()
            },
        );
        assert!(matches!(
            ov.validate(),
            Err(EngineError::InvalidTimeline { id: 2 })
        ));
    }

    #[test]
    fn inverted_work_center_stay_is_a_violation() {
        let at = |day| Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).single().expect("date");
        let mut ov = overview(&[1]);
        ov.times.insert(
            1,
            WorkItemTimes {
                start: Some(at(1)),
                end: Some(at(20)),
                work_centers: vec![WorkCenterTime {
                    label: "Review".into(),
                    start: at(8),
                    end: Some(at(5)),
                }],
                clt: None,
            },
        );
        assert!(matches!(
            ov.validate(),
            Err(EngineError::InvalidTimeline { id: 1 })
        ));
    }

    #[test]
    fn orphan_group_resolves_to_none() {
        let mut ov = overview(&[]);
        ov.groups.insert(
            "g1".into(),
            Group {
                wit_id: "story".into(),
                name: "Payments".into(),
            },
        );
        assert_eq!(ov.group_name(&item(1, "story", Some("g1"))), Some("Payments"));
        assert_eq!(ov.group_name(&item(2, "story", Some("missing"))), None);
        assert_eq!(ov.group_name(&item(3, "story", None)), None);
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = overview(&[1, 2]);
        let b = overview(&[1, 2]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert!(a.fingerprint().starts_with("blake3:"));

        let c = overview(&[1, 2, 3]);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn children_of_missing_parent_is_empty() {
        let ov = overview(&[1]);
        assert!(ov.children_of(1).is_empty());
    }
}
