//! The raw metric bundle computed over the unfiltered snapshot.

use chrono::{DateTime, TimeDelta, Utc};
use flowlens_core::config::EngineConfig;
use flowlens_core::model::Overview;
use serde::{Serialize, Serializer};
use tracing::instrument;

use super::duration::{average, change_lead_time, cycle_time, wip_age};
use super::flow::{Percentage, flow_efficiency};
use super::window::{TrailingWindow, leakage, trailing_work_center_time, velocity, wip_count};

/// Every headline metric a dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetrics {
    pub window: TrailingWindow,
    pub velocity: usize,
    pub leakage: usize,
    pub wip_count: usize,
    #[serde(serialize_with = "millis")]
    pub average_cycle_time: Option<TimeDelta>,
    #[serde(serialize_with = "millis")]
    pub average_change_lead_time: Option<TimeDelta>,
    #[serde(serialize_with = "millis")]
    pub average_wip_age: Option<TimeDelta>,
    pub flow_efficiency: Percentage,
    #[serde(serialize_with = "millis_total")]
    pub trailing_effort: TimeDelta,
}

/// Compute [`FlowMetrics`] for the window ending at `now`.
///
/// `is_bug` classifies type ids for leakage.
#[must_use]
#[instrument(skip_all, fields(items = overview.by_id.len()))]
pub fn compute_flow_metrics(
    overview: &Overview,
    now: DateTime<Utc>,
    config: &EngineConfig,
    is_bug: impl FnMut(&str) -> bool,
) -> FlowMetrics {
    let window = TrailingWindow::ending_at(now, config.window.days);
    let times = || overview.times.values();

    let average_wip_age = average(overview.by_id.values().filter_map(|item| {
        overview
            .times_of(item.id)
            .and_then(|t| wip_age(item, t, now))
    }));

    let trailing_effort = times()
        .map(|t| trailing_work_center_time(t, &window, config.effort.count_open_work_centers))
        .fold(TimeDelta::zero(), |acc, d| acc + d);

    FlowMetrics {
        window,
        velocity: velocity(times(), &window),
        leakage: leakage(overview, &window, &config.leakage, is_bug),
        wip_count: wip_count(times()),
        average_cycle_time: average(times().filter_map(cycle_time)),
        average_change_lead_time: average(times().filter_map(change_lead_time)),
        average_wip_age,
        flow_efficiency: flow_efficiency(times()),
        trailing_effort,
    }
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn millis<S: Serializer>(value: &Option<TimeDelta>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&d.num_milliseconds()),
        None => serializer.serialize_none(),
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn millis_total<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_milliseconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flowlens_core::model::{Created, WorkItem, WorkItemTimes, WorkItemType};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).single().expect("date") + TimeDelta::days(n)
    }

    fn add(ov: &mut Overview, id: u64, created: i64, times: WorkItemTimes) {
        ov.by_id.insert(
            id,
            WorkItem {
                id,
                type_id: "story".into(),
                group_id: None,
                env: None,
                priority: None,
                effort: None,
                project: String::new(),
                created: Created { on: day(created) },
                state: "Active".into(),
                url: String::new(),
                title: String::new(),
                filter_by: vec![],
                rca: vec![],
            },
        );
        ov.times.insert(id, times);
    }

    #[test]
    fn bundle_over_small_snapshot() {
        let mut ov = Overview::default();
        ov.types.insert(
            "story".into(),
            WorkItemType {
                name: "Story".into(),
                plural_name: None,
                icon: String::new(),
                color: None,
                work_centers: vec![],
            },
        );
        add(
            &mut ov,
            1,
            0,
            WorkItemTimes {
                start: Some(day(1)),
                end: Some(day(5)),
                ..WorkItemTimes::default()
            },
        );
        add(
            &mut ov,
            2,
            2,
            WorkItemTimes {
                start: Some(day(3)),
                ..WorkItemTimes::default()
            },
        );
        add(&mut ov, 3, 4, WorkItemTimes::default());

        let metrics = compute_flow_metrics(&ov, day(10), &EngineConfig::default(), |_| false);
        assert_eq!(metrics.velocity, 1);
        assert_eq!(metrics.wip_count, 1);
        assert_eq!(metrics.leakage, 0);
        assert_eq!(metrics.average_cycle_time, Some(TimeDelta::days(4)));
        assert_eq!(metrics.average_change_lead_time, None);
        assert_eq!(metrics.average_wip_age, Some(TimeDelta::days(8)));
        assert_eq!(metrics.flow_efficiency.value(), Some(0.0));

        let json = serde_json::to_value(&metrics).expect("json");
        assert_eq!(json["averageCycleTime"], 4 * 86_400_000);
        assert!(json["averageChangeLeadTime"].is_null());
    }
}
