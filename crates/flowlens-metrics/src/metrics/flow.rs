//! Flow efficiency: share of cycle time spent actively inside work centers.

use std::fmt;

use chrono::TimeDelta;
use flowlens_core::model::WorkItemTimes;
use serde::{Serialize, Serializer};

use super::duration::{cycle_time, work_center_time};

/// A ratio in percent, or the `-` sentinel when the denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percentage {
    Value(f64),
    Undefined,
}

impl Percentage {
    /// `numerator / denominator * 100`, guarding the zero denominator.
    #[must_use]
    pub fn of(numerator: TimeDelta, denominator: TimeDelta) -> Self {
        if denominator <= TimeDelta::zero() {
            return Self::Undefined;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = numerator.num_milliseconds() as f64 / denominator.num_milliseconds() as f64;
        Self::Value(ratio * 100.0)
    }

    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.0}%"),
            Self::Undefined => write!(f, "-"),
        }
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::Undefined => serializer.serialize_str("-"),
        }
    }
}

/// `Σ work-center time / Σ cycle time` over items with a known cycle time.
///
/// Each item's work-center time is capped at its own cycle time so that
/// overlapping or out-of-range stays cannot push the ratio above 100.
#[must_use]
pub fn flow_efficiency<'a>(times: impl IntoIterator<Item = &'a WorkItemTimes>) -> Percentage {
    let (working, total) = times
        .into_iter()
        .filter_map(|t| cycle_time(t).map(|ct| (work_center_time(t).min(ct), ct)))
        .fold(
            (TimeDelta::zero(), TimeDelta::zero()),
            |(working, total), (w, ct)| (working + w, total + ct),
        );
    Percentage::of(working, total)
}
