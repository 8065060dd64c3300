//! Per-item durations.
//!
//! Every function here is total and returns `None` for "no data". Zero is a
//! real duration and is never used as a stand-in for a missing timestamp.

use chrono::{DateTime, TimeDelta, Utc};
use flowlens_core::model::{WorkItem, WorkItemTimes};

/// `end - start` when both are recorded and in order.
#[must_use]
pub fn cycle_time(times: &WorkItemTimes) -> Option<TimeDelta> {
    span(times.start, times.end)
}

/// Time from development complete to deployed in production.
#[must_use]
pub fn change_lead_time(times: &WorkItemTimes) -> Option<TimeDelta> {
    times.clt.as_ref().and_then(|clt| span(clt.start, clt.end))
}

/// Total time spent in work centers that have an exit.
///
/// Open stays are left out entirely rather than measured up to "now".
#[must_use]
pub fn work_center_time(times: &WorkItemTimes) -> TimeDelta {
    times
        .work_centers
        .iter()
        .filter_map(|wc| wc.closed_duration())
        .filter(|d| *d > TimeDelta::zero())
        .fold(TimeDelta::zero(), |acc, d| acc + d)
}

/// Age of an in-progress item, measured from creation.
///
/// `None` unless the item has started and not finished.
#[must_use]
pub fn wip_age(item: &WorkItem, times: &WorkItemTimes, now: DateTime<Utc>) -> Option<TimeDelta> {
    times.is_in_progress().then(|| now - item.created.on)
}

/// Mean of the given durations; `None` for an empty input.
#[must_use]
pub fn average(durations: impl IntoIterator<Item = TimeDelta>) -> Option<TimeDelta> {
    let (total, count) = durations
        .into_iter()
        .fold((TimeDelta::zero(), 0i32), |(total, count), d| {
            (total + d, count.saturating_add(1))
        });
    (count > 0).then(|| total / count)
}

fn span(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<TimeDelta> {
    match (start, end) {
        (Some(start), Some(end)) if end >= start => Some(end - start),
        _ => None,
    }
}
