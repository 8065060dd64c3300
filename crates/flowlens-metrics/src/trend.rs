//! Day-bucketed trend lines over the trailing window.
//!
//! For each `(type, group)` bucket and each day of the window, the items
//! satisfying a point-in-time predicate are collected into one point. Days
//! are walked newest-first and the points are reversed before returning, so
//! every line is ordered oldest-to-newest.

use chrono::{DateTime, Utc};
use flowlens_core::model::{Overview, WorkItemId, WorkItemTimes};
use serde::Serialize;
use tracing::instrument;

use crate::metrics::TrailingWindow;
use crate::organize::{GroupKey, OrganizedWorkItems};

/// Which point-in-time question a line answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPredicate {
    /// Finished during the day: `end ∈ [day start, day end)`.
    ClosedOnDay,
    /// In progress at some point during the day.
    WipOnDay,
}

impl DayPredicate {
    #[must_use]
    pub fn holds(self, times: &WorkItemTimes, day: &TrailingWindow) -> bool {
        match self {
            Self::ClosedOnDay => times.end.is_some_and(|end| day.contains(end)),
            Self::WipOnDay => {
                times.start.is_some_and(|start| start <= day.end)
                    && times.end.is_none_or(|end| end > day.start)
            }
        }
    }
}

/// Items satisfying the predicate on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemPoint {
    /// Start of the day slice.
    pub date: DateTime<Utc>,
    pub work_item_ids: Vec<WorkItemId>,
}

/// One series per `(type, group)` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemLine {
    pub type_id: String,
    pub group: GroupKey,
    /// Filled in by the dashboard from its palette.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub points: Vec<WorkItemPoint>,
}

impl WorkItemLine {
    /// Every distinct id that appears on any day.
    #[must_use]
    pub fn all_ids(&self) -> Vec<WorkItemId> {
        let mut ids: Vec<WorkItemId> = self
            .points
            .iter()
            .flat_map(|p| p.work_item_ids.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Build one line per bucket of `organized` over `days` days ending at
/// `reference`.
///
/// Items without an entry in `times` never satisfy either predicate.
#[must_use]
#[instrument(skip(overview, organized), fields(buckets = organized.bucket_count()))]
pub fn reconstruct_lines(
    overview: &Overview,
    organized: &OrganizedWorkItems,
    predicate: DayPredicate,
    reference: DateTime<Utc>,
    days: u32,
) -> Vec<WorkItemLine> {
    let window = TrailingWindow::ending_at(reference, days);

    organized
        .iter()
        .map(|(type_id, group, ids)| {
            let bucket: Vec<(WorkItemId, &WorkItemTimes)> = ids
                .iter()
                .filter_map(|&id| overview.times_of(id).map(|t| (id, t)))
                .collect();

            let mut points: Vec<WorkItemPoint> = window
                .days_newest_first()
                .map(|day| {
                    let mut work_item_ids: Vec<WorkItemId> = bucket
                        .iter()
                        .filter(|(_, times)| predicate.holds(times, &day))
                        .map(|(id, _)| *id)
                        .collect();
                    work_item_ids.sort_unstable();
                    WorkItemPoint {
                        date: day.start,
                        work_item_ids,
                    }
                })
                .collect();
            points.reverse();

            WorkItemLine {
                type_id: type_id.to_string(),
                group: group.clone(),
                color: None,
                points,
            }
        })
        .collect()
}
