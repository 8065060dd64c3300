#![forbid(unsafe_code)]
//! flowlens-metrics: everything derived from an [`Overview`] snapshot.
//!
//! # Conventions
//!
//! - Every function is pure over its inputs. The reference time is always a
//!   parameter; nothing here reads the clock.
//! - Missing data stays visible: durations are `Option`, ratios use
//!   [`metrics::Percentage::Undefined`].
//! - Iteration order follows the snapshot's ordered maps, so identical inputs
//!   produce identical output.
//!
//! [`Overview`]: flowlens_core::model::Overview

pub mod dashboard;
pub mod filter;
pub mod hierarchy;
pub mod metrics;
pub mod organize;
pub mod relations;
pub mod time_in_state;
pub mod trend;

pub use dashboard::{Dashboard, DashboardSnapshot};
pub use filter::{CompiledFilter, FilterSelection, SizeBucket};
pub use organize::{GroupKey, OrganizedWorkItems, organize_by_work_item_type, organize_work_items};
pub use relations::find_relation_cycles;
pub use time_in_state::{Segment, SegmentKind, Status, Timeline, current_status, extract_timeline};
pub use trend::{DayPredicate, WorkItemLine, WorkItemPoint, reconstruct_lines};
