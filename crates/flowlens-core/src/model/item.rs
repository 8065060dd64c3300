use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracker-assigned work item identifier.
pub type WorkItemId = u64;

/// Creation metadata for a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub on: DateTime<Utc>,
}

/// A named facet the scraper attaches to an item (e.g. "Release" → tags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterByField {
    pub label: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One work item as supplied by the scraper. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: WorkItemId,
    pub type_id: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub env: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    /// Numeric size estimate (story points or similar).
    #[serde(default)]
    pub effort: Option<f64>,
    #[serde(default)]
    pub project: String,
    pub created: Created,
    pub state: String,
    #[serde(default)]
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub filter_by: Vec<FilterByField>,
    #[serde(default)]
    pub rca: Vec<String>,
}

/// Display and workflow metadata for one work item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemType {
    pub name: String,
    #[serde(default)]
    pub plural_name: Option<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Configured work centers in workflow order.
    #[serde(default)]
    pub work_centers: Vec<String>,
}

impl WorkItemType {
    /// True when the type name contains `pattern`, ignoring ASCII case.
    #[must_use]
    pub fn name_matches(&self, pattern: &str) -> bool {
        self.name
            .to_ascii_lowercase()
            .contains(&pattern.to_ascii_lowercase())
    }

    /// Plural display name, falling back to `"<name>s"`.
    #[must_use]
    pub fn display_plural(&self) -> String {
        self.plural_name
            .clone()
            .unwrap_or_else(|| format!("{}s", self.name))
    }
}

/// A custom grouping (area, team, release) scoped to one work item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub wit_id: String,
    pub name: String,
}
