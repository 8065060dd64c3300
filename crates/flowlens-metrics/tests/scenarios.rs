//! Hand-computed regression scenarios.
//!
//! Every expected value below is worked out by hand from the fixture dates,
//! so a change in any calculator's semantics shows up here first.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use flowlens_core::config::{SizeConfig, TreeConfig};
use flowlens_core::model::{Created, Overview, WorkCenterTime, WorkItem, WorkItemId, WorkItemTimes};
use flowlens_metrics::filter::FilterSelection;
use flowlens_metrics::hierarchy::{HierarchyBuilder, ProjectScope, TreeNode};
use flowlens_metrics::metrics::{TrailingWindow, cycle_time, velocity, work_center_time};
use flowlens_metrics::organize::{GroupKey, organize_by_work_item_type};
use flowlens_metrics::time_in_state::extract_timeline;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single().expect("date")
}

fn day(n: i64) -> DateTime<Utc> {
    at(2024, 5, 1) + TimeDelta::days(n)
}

fn item(id: WorkItemId, type_id: &str, priority: Option<u8>) -> WorkItem {
    WorkItem {
        id,
        type_id: type_id.into(),
        group_id: None,
        env: None,
        priority,
        effort: None,
        project: "web".into(),
        created: Created { on: day(0) },
        state: "Active".into(),
        url: String::new(),
        title: format!("item {id}"),
        filter_by: vec![],
        rca: vec![],
    }
}

fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> WorkItemTimes {
    WorkItemTimes {
        start: Some(start),
        end: Some(end),
        ..WorkItemTimes::default()
    }
}

fn center(label: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> WorkCenterTime {
    WorkCenterTime {
        label: label.into(),
        start,
        end,
    }
}

/// Highest number of times any id occurs on one root-to-leaf chain.
fn max_repeats(node: &TreeNode, chain: &mut Vec<WorkItemId>) -> usize {
    if let Some(id) = node.work_item_id() {
        chain.push(id);
    }
    let here = chain
        .iter()
        .map(|id| chain.iter().filter(|other| *other == id).count())
        .max()
        .unwrap_or(0);
    let below = node
        .children()
        .iter()
        .map(|child| max_repeats(child, chain))
        .max()
        .unwrap_or(0);
    if node.work_item_id().is_some() {
        chain.pop();
    }
    here.max(below)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn cycle_time_of_eight_days() {
    let times = closed(at(2024, 1, 2), at(2024, 1, 10));
    assert_eq!(cycle_time(&times), Some(TimeDelta::days(8)));
}

#[test]
fn velocity_depends_on_reference_time() {
    let times = [
        closed(day(0), day(5)),
        closed(day(1), day(5)),
        closed(day(2), day(20)),
    ];

    let window = TrailingWindow::ending_at(day(30), 30);
    assert_eq!(velocity(times.iter(), &window), 3);

    let earlier = TrailingWindow::ending_at(day(10), 30);
    assert_eq!(velocity(times.iter(), &earlier), 2);
}

#[test]
fn work_center_and_waiting_time() {
    let times = WorkItemTimes {
        start: Some(day(0)),
        end: Some(day(6)),
        work_centers: vec![
            center("Dev", day(0), Some(day(2))),
            center("Test", day(3), Some(day(4))),
        ],
        clt: None,
    };

    assert_eq!(work_center_time(&times), TimeDelta::days(3));

    let configured = vec!["Dev".to_string(), "Test".to_string()];
    let timeline = extract_timeline(&times, &configured, day(10));
    assert_eq!(timeline.working_time(), TimeDelta::days(3));
    assert_eq!(timeline.waiting_time(), TimeDelta::days(3));
}

#[test]
fn cyclic_relations_terminate() {
    let mut ov = Overview::default();
    for id in [1, 2] {
        ov.by_id.insert(id, item(id, "task", None));
        ov.times.insert(id, WorkItemTimes::default());
    }
    ov.relations.insert(1, vec![2]);
    ov.relations.insert(2, vec![1]);

    let forest = HierarchyBuilder::new(&ov, &TreeConfig::default())
        .build(1, ProjectScope::All)
        .expect("build");

    assert_eq!(max_repeats(&forest[0], &mut Vec::new()), 1);
}

#[test]
fn priority_filter_keeps_skeleton() {
    let mut ov = Overview::default();
    for (id, priority) in [(1, Some(1)), (2, Some(2)), (3, Some(3)), (4, None)] {
        ov.by_id.insert(id, item(id, "bug", priority));
    }
    ov.by_id.insert(5, item(5, "story", Some(3)));

    let selection = FilterSelection {
        priorities: [1, 2].into_iter().collect(),
        ..FilterSelection::default()
    };
    let filter = selection.compile(&SizeConfig::default());

    let unfiltered = organize_by_work_item_type(&ov, |_| true);
    let filtered = organize_by_work_item_type(&ov, |i| filter.matches(i));

    assert_eq!(filtered.get("bug", &GroupKey::Ungrouped), Some(&[1, 2][..]));
    assert_eq!(filtered.get("story", &GroupKey::Ungrouped), Some(&[][..]));
    assert_eq!(filtered.skeleton(), unfiltered.skeleton());
}
