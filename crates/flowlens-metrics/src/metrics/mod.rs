//! Flow metrics over work item timelines.
//!
//! # Overview
//!
//! All calculators are pure and total. Missing timestamps propagate as
//! `None` (or [`flow::Percentage::Undefined`] for ratios) instead of being
//! replaced by zero:
//!
//! - **Durations** (`duration`): cycle time, change lead time, work-center
//!   time, WIP age.
//! - **Ratios** (`flow`): flow efficiency.
//! - **Window counts** (`window`): velocity, leakage, WIP count and trailing
//!   effort over the window ending at the snapshot's reference time.
//! - **Bundle** (`summary`): everything above in one serializable struct.

pub mod duration;
pub mod flow;
pub mod summary;
pub mod window;

pub use duration::{average, change_lead_time, cycle_time, wip_age, work_center_time};
pub use flow::{Percentage, flow_efficiency};
pub use summary::{FlowMetrics, compute_flow_metrics};
pub use window::{
    TrailingWindow, is_bug_type, leakage, trailing_work_center_time, velocity, wip_count,
};
