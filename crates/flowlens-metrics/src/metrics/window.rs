//! Trailing-window counts: velocity, leakage, WIP and trailing effort.
//!
//! The window always ends at an injected reference time ("last updated"),
//! never at the wall clock, so the same snapshot always yields the same
//! numbers.

use chrono::{DateTime, TimeDelta, Utc};
use flowlens_core::config::LeakageConfig;
use flowlens_core::model::{Overview, WorkItemTimes};
use serde::Serialize;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrailingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TrailingWindow {
    /// The `days`-day window ending at `end`.
    ///
    /// The start saturates at the earliest representable instant.
    #[must_use]
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Self {
        let start = end
            .checked_sub_signed(TimeDelta::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    /// Overlap between `[start, end)` and this window.
    #[must_use]
    pub fn overlap(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> TimeDelta {
        let from = start.max(self.start);
        let to = end.min(self.end);
        (to - from).max(TimeDelta::zero())
    }

    /// One-day slices from newest to oldest.
    pub fn days_newest_first(&self) -> impl Iterator<Item = Self> + '_ {
        let mut day_end = self.end;
        std::iter::from_fn(move || {
            if day_end <= self.start {
                return None;
            }
            let day_start = day_end
                .checked_sub_signed(TimeDelta::days(1))
                .map_or(self.start, |t| t.max(self.start));
            let slice = Self {
                start: day_start,
                end: day_end,
            };
            day_end = day_start;
            Some(slice)
        })
    }
}

/// Items whose end falls inside the window.
#[must_use]
pub fn velocity<'a>(
    times: impl IntoIterator<Item = &'a WorkItemTimes>,
    window: &TrailingWindow,
) -> usize {
    times
        .into_iter()
        .filter(|t| t.end.is_some_and(|end| window.contains(end)))
        .count()
}

/// Items started and not finished.
#[must_use]
pub fn wip_count<'a>(times: impl IntoIterator<Item = &'a WorkItemTimes>) -> usize {
    times.into_iter().filter(|t| t.is_in_progress()).count()
}

/// True when the type's name contains the configured bug pattern.
///
/// Unknown type ids are never bug-like.
#[must_use]
pub fn is_bug_type(overview: &Overview, type_id: &str, pattern: &str) -> bool {
    overview
        .types
        .get(type_id)
        .is_some_and(|ty| ty.name_matches(pattern))
}

/// Bug-like items created inside the window, excluding withdrawn ones.
///
/// `is_bug` classifies a type id; callers pass a memoized lookup.
#[must_use]
pub fn leakage(
    overview: &Overview,
    window: &TrailingWindow,
    config: &LeakageConfig,
    mut is_bug: impl FnMut(&str) -> bool,
) -> usize {
    overview
        .by_id
        .values()
        .filter(|item| window.contains(item.created.on))
        .filter(|item| !config.is_excluded_state(&item.state))
        .filter(|item| is_bug(&item.type_id))
        .count()
}

/// Work-center time that falls inside the window.
///
/// Open stays are skipped unless `count_open` is set, in which case they are
/// measured up to the window end.
#[must_use]
pub fn trailing_work_center_time(
    times: &WorkItemTimes,
    window: &TrailingWindow,
    count_open: bool,
) -> TimeDelta {
    times
        .work_centers
        .iter()
        .filter_map(|wc| match wc.end {
            Some(end) => Some(window.overlap(wc.start, end)),
            None if count_open => Some(window.overlap(wc.start, window.end)),
            None => None,
        })
        .fold(TimeDelta::zero(), |acc, d| acc + d)
}
