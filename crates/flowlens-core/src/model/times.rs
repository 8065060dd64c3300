use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One stay in a work center. `end` is absent while the item is still there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCenterTime {
    pub label: String,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl WorkCenterTime {
    /// Elapsed time for a closed stay; `None` while the stay is open.
    #[must_use]
    pub fn closed_duration(&self) -> Option<TimeDelta> {
        self.end.map(|end| end - self.start)
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// Development-complete and deployed-to-production timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLeadTimes {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

/// State history for one work item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemTimes {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub work_centers: Vec<WorkCenterTime>,
    #[serde(default)]
    pub clt: Option<ChangeLeadTimes>,
}

impl WorkItemTimes {
    /// Started and not yet finished.
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    /// True when both endpoints exist and are out of order.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if end < start)
            || self
                .work_centers
                .iter()
                .any(|wc| wc.end.is_some_and(|end| end < wc.start))
    }
}
