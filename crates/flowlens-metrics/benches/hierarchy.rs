use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use flowlens_core::config::TreeConfig;
use flowlens_core::model::{Created, Overview, WorkItem, WorkItemId, WorkItemTimes};
use flowlens_metrics::hierarchy::{
    HierarchyBuilder, NodePath, PathSegment, ProjectScope, rows_to_render, toggle_expand_state,
};

struct Tier {
    name: &'static str,
    fan_out: u64,
    depth: u32,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "small",
        fan_out: 4,
        depth: 3,
    },
    Tier {
        name: "medium",
        fan_out: 6,
        depth: 4,
    },
    Tier {
        name: "large",
        fan_out: 8,
        depth: 5,
    },
];

const TYPES: [&str; 3] = ["bug", "story", "task"];
const ENVS: [Option<&str>; 3] = [Some("prod"), Some("staging"), None];

/// A complete tree of `fan_out` children per item, `depth` levels deep.
fn synthetic_overview(tier: &Tier) -> Overview {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("date");
    let mut ov = Overview::default();
    let mut next: WorkItemId = 1;
    let mut level = vec![next];

    let mut insert = |ov: &mut Overview, id: WorkItemId| {
        let slot = usize::try_from(id).unwrap_or(0);
        ov.by_id.insert(
            id,
            WorkItem {
                id,
                type_id: TYPES[slot % TYPES.len()].into(),
                group_id: None,
                env: ENVS[slot % ENVS.len()].map(Into::into),
                priority: None,
                effort: None,
                project: if id % 5 == 0 { "mobile" } else { "web" }.into(),
                created: Created { on: created },
                state: "Active".into(),
                url: String::new(),
                title: String::new(),
                filter_by: vec![],
                rca: vec![],
            },
        );
        ov.times.insert(id, WorkItemTimes::default());
    };

    insert(&mut ov, next);
    for _ in 0..tier.depth {
        let mut below = Vec::new();
        for &parent in &level {
            let children: Vec<WorkItemId> = (0..tier.fan_out)
                .map(|_| {
                    next += 1;
                    next
                })
                .collect();
            for &child in &children {
                insert(&mut ov, child);
            }
            below.extend(&children);
            ov.relations.insert(parent, children);
        }
        level = below;
    }
    ov
}

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy");

    for tier in &TIERS {
        let ov = synthetic_overview(tier);
        group.throughput(Throughput::Elements(ov.by_id.len() as u64));
        let expanded = TreeConfig { expand_depth: 64 };

        group.bench_with_input(BenchmarkId::new("build_views", tier.name), &ov, |b, ov| {
            b.iter(|| {
                black_box(
                    HierarchyBuilder::new(ov, &expanded)
                        .build_views(1, "web")
                        .expect("build"),
                )
            });
        });

        let forest = HierarchyBuilder::new(&ov, &expanded)
            .build(1, ProjectScope::All)
            .expect("build");
        let target = NodePath::root(PathSegment::Project(ProjectScope::All))
            .child(PathSegment::Item(1))
            .child(PathSegment::Type("bug".into()));

        group.bench_with_input(BenchmarkId::new("toggle", tier.name), &forest, |b, forest| {
            b.iter(|| black_box(toggle_expand_state(forest, &target)));
        });

        group.bench_with_input(BenchmarkId::new("rows", tier.name), &forest, |b, forest| {
            b.iter(|| black_box(rows_to_render(forest)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hierarchy);
criterion_main!(benches);
