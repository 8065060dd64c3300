//! Classified timelines for a single work item.
//!
//! The work-center list is walked pairwise and turned into an ordered
//! sequence of segments:
//!
//! ```text
//! start ── Before ──┬─ In Dev ─┬─ Between Dev→Test ─┬─ In Test ─┬─ After Test ── end (Done)
//! ```
//!
//! The same sequence drives both the status label and the working/waiting
//! split. Working time only counts closed stays; waiting time counts the gaps
//! between consecutive centers plus the gap between the last center and the
//! overall end.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use flowlens_core::model::WorkItemTimes;
use serde::Serialize;

/// What an item was doing during one segment of its timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentKind {
    BeforeFirstCenter,
    InCenter { label: String },
    Between { from: String, to: String },
    AfterLastCenter { label: String },
    Done,
}

/// One interval of a timeline. `end` is `None` while the interval is ongoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    #[serde(flatten)]
    pub kind: SegmentKind,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl Segment {
    /// Length of the segment, measuring open segments up to `now`.
    #[must_use]
    pub fn duration(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.end.unwrap_or(now) - self.start).max(TimeDelta::zero())
    }
}

/// Current status of a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    /// No work center entered yet; carries the first configured center.
    Before { center: Option<String> },
    In { center: String },
    Waiting { after: String, before: Option<String> },
    Done,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before { center: Some(center) } => write!(f, "Before {center}"),
            Self::Before { center: None } => write!(f, "Not started"),
            Self::In { center } => write!(f, "In {center}"),
            Self::Waiting {
                before: Some(next), ..
            } => write!(f, "Waiting for {next}"),
            Self::Waiting { after, before: None } => write!(f, "Waiting after {after}"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// An item's classified timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub segments: Vec<Segment>,
    pub status: Status,
}

impl Timeline {
    /// Time spent inside work centers with a recorded exit.
    #[must_use]
    pub fn working_time(&self) -> TimeDelta {
        self.segments
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::InCenter { .. }))
            .filter_map(|s| s.end.map(|end| (end - s.start).max(TimeDelta::zero())))
            .fold(TimeDelta::zero(), |acc, d| acc + d)
    }

    /// Time spent between work centers, plus the closed tail after the last one.
    #[must_use]
    pub fn waiting_time(&self) -> TimeDelta {
        self.segments
            .iter()
            .filter(|s| {
                matches!(
                    s.kind,
                    SegmentKind::Between { .. } | SegmentKind::AfterLastCenter { .. }
                )
            })
            .filter_map(|s| s.end.map(|end| (end - s.start).max(TimeDelta::zero())))
            .fold(TimeDelta::zero(), |acc, d| acc + d)
    }
}

/// Build the classified timeline for one item.
///
/// `configured` is the type's work-center list in workflow order; it only
/// names statuses and never changes the recorded intervals. `now` stands in
/// for the missing exit of an open center when measuring the gap to the next
/// one.
#[must_use]
pub fn extract_timeline(
    times: &WorkItemTimes,
    configured: &[String],
    now: DateTime<Utc>,
) -> Timeline {
    let centers = &times.work_centers;
    let mut segments = Vec::with_capacity(centers.len() * 2 + 2);

    match (times.start, centers.first()) {
        (Some(start), Some(first)) if first.start > start => segments.push(Segment {
            kind: SegmentKind::BeforeFirstCenter,
            start,
            end: Some(first.start),
        }),
        (Some(start), None) => segments.push(Segment {
            kind: SegmentKind::BeforeFirstCenter,
            start,
            end: times.end,
        }),
        _ => {}
    }

    for (index, wc) in centers.iter().enumerate() {
        segments.push(Segment {
            kind: SegmentKind::InCenter {
                label: wc.label.clone(),
            },
            start: wc.start,
            end: wc.end,
        });

        if let Some(next) = centers.get(index + 1) {
            let gap_start = wc.end.unwrap_or(now);
            if next.start > gap_start {
                segments.push(Segment {
                    kind: SegmentKind::Between {
                        from: wc.label.clone(),
                        to: next.label.clone(),
                    },
                    start: gap_start,
                    end: Some(next.start),
                });
            }
        }
    }

    if let Some((last, last_end)) = centers
        .last()
        .and_then(|last| last.end.map(|end| (last, end)))
    {
        match times.end {
            Some(end) if end != last_end => segments.push(Segment {
                kind: SegmentKind::AfterLastCenter {
                    label: last.label.clone(),
                },
                start: last_end,
                end: Some(end),
            }),
            None => segments.push(Segment {
                kind: SegmentKind::AfterLastCenter {
                    label: last.label.clone(),
                },
                start: last_end,
                end: None,
            }),
            Some(_) => {}
        }
    }

    if let Some(end) = times.end {
        segments.push(Segment {
            kind: SegmentKind::Done,
            start: end,
            end: Some(end),
        });
    }

    Timeline {
        segments,
        status: current_status(times, configured),
    }
}

/// Status label for an item without building the full timeline.
///
/// An open center always wins over anything else that is not `Done`.
#[must_use]
pub fn current_status(times: &WorkItemTimes, configured: &[String]) -> Status {
    if times.end.is_some() {
        return Status::Done;
    }

    if let Some(open) = times.work_centers.iter().rev().find(|wc| wc.is_open()) {
        return Status::In {
            center: open.label.clone(),
        };
    }

    let Some(last) = times.work_centers.last() else {
        return Status::Before {
            center: configured.first().cloned(),
        };
    };

    let before = configured
        .iter()
        .position(|label| *label == last.label)
        .and_then(|idx| configured.get(idx + 1))
        .cloned();

    Status::Waiting {
        after: last.label.clone(),
        before,
    }
}
