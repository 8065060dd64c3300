//! Recompute orchestration for one dashboard.
//!
//! | Trigger             | Recomputed                                   |
//! |---------------------|----------------------------------------------|
//! | new snapshot        | everything                                   |
//! | filter change       | filtered buckets, closed and WIP lines       |
//! | tree toggle         | nothing here; see [`crate::hierarchy`]       |
//!
//! Raw metrics always cover the unfiltered snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use flowlens_core::EngineError;
use flowlens_core::cache::{ColorPalette, MemoCache};
use flowlens_core::config::EngineConfig;
use flowlens_core::model::{Overview, WorkItemId};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::filter::FilterSelection;
use crate::hierarchy::{HierarchyBuilder, HierarchyViews, NodePath};
use crate::metrics::{FlowMetrics, compute_flow_metrics, is_bug_type};
use crate::organize::{OrganizedWorkItems, organize_by_work_item_type};
use crate::relations::find_relation_cycles;
use crate::trend::{DayPredicate, WorkItemLine, reconstruct_lines};

/// Derived state for one snapshot, one reference time and one filter
/// selection.
#[derive(Debug)]
pub struct Dashboard {
    overview: Arc<Overview>,
    now: DateTime<Utc>,
    config: EngineConfig,
    filters: FilterSelection,
    palette: ColorPalette,
    bug_types: MemoCache<bool>,
    fingerprint: String,
    metrics: FlowMetrics,
    organized: OrganizedWorkItems,
    filtered: OrganizedWorkItems,
    closed_lines: Vec<WorkItemLine>,
    wip_lines: Vec<WorkItemLine>,
}

/// Borrowed, serializable view of everything a renderer needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot<'a> {
    pub fingerprint: &'a str,
    pub now: DateTime<Utc>,
    pub filters: &'a FilterSelection,
    pub metrics: &'a FlowMetrics,
    pub organized: &'a OrganizedWorkItems,
    pub filtered: &'a OrganizedWorkItems,
    pub closed_lines: &'a [WorkItemLine],
    pub wip_lines: &'a [WorkItemLine],
}

impl Dashboard {
    /// Validate `config` and `overview`, then compute everything.
    ///
    /// # Errors
    ///
    /// Returns the first configuration or snapshot contract violation.
    pub fn new(
        overview: Arc<Overview>,
        now: DateTime<Utc>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        overview.validate()?;
        report_cycles(&overview);

        let mut bug_types = MemoCache::new();
        let metrics = raw_metrics(&overview, now, &config, &mut bug_types);
        let organized = organize_by_work_item_type(&overview, |_| true);

        let mut dashboard = Self {
            fingerprint: overview.fingerprint(),
            overview,
            now,
            config,
            filters: FilterSelection::default(),
            palette: ColorPalette::default(),
            bug_types,
            metrics,
            filtered: organized.clone(),
            organized,
            closed_lines: Vec::new(),
            wip_lines: Vec::new(),
        };
        dashboard.recompute_filtered();
        Ok(dashboard)
    }

    /// Swap in a new snapshot and reference time.
    ///
    /// Returns `Ok(false)` without touching anything when both the snapshot
    /// fingerprint and `now` are unchanged.
    ///
    /// # Errors
    ///
    /// Returns the snapshot's contract violation; the previous state is kept.
    pub fn replace_overview(
        &mut self,
        overview: Arc<Overview>,
        now: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        let fingerprint = overview.fingerprint();
        if fingerprint == self.fingerprint && now == self.now {
            debug!(%fingerprint, "snapshot unchanged, skipping recompute");
            return Ok(false);
        }
        overview.validate()?;
        report_cycles(&overview);

        self.overview = overview;
        self.now = now;
        self.fingerprint = fingerprint;
        self.bug_types.clear();
        self.recompute_all();
        Ok(true)
    }

    /// Change the facet selection and recompute the filter-dependent parts.
    pub fn set_filters(&mut self, filters: FilterSelection) {
        if filters == self.filters {
            return;
        }
        self.filters = filters;
        self.recompute_filtered();
    }

    /// Build both hierarchy views for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownWorkItem`] when a relation points at a
    /// missing item.
    pub fn hierarchy(
        &self,
        root: WorkItemId,
        project: &str,
        remembered: Option<&HashSet<NodePath>>,
    ) -> Result<HierarchyViews, EngineError> {
        let builder = HierarchyBuilder::new(&self.overview, &self.config.tree);
        match remembered {
            Some(paths) => builder.remembering(paths).build_views(root, project),
            None => builder.build_views(root, project),
        }
    }

    #[must_use]
    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    #[must_use]
    pub const fn metrics(&self) -> &FlowMetrics {
        &self.metrics
    }

    /// Unfiltered buckets.
    #[must_use]
    pub const fn organized(&self) -> &OrganizedWorkItems {
        &self.organized
    }

    /// Buckets after the facet filters; same skeleton as [`Self::organized`].
    #[must_use]
    pub const fn filtered(&self) -> &OrganizedWorkItems {
        &self.filtered
    }

    #[must_use]
    pub fn closed_lines(&self) -> &[WorkItemLine] {
        &self.closed_lines
    }

    #[must_use]
    pub fn wip_lines(&self) -> &[WorkItemLine] {
        &self.wip_lines
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot<'_> {
        DashboardSnapshot {
            fingerprint: &self.fingerprint,
            now: self.now,
            filters: &self.filters,
            metrics: &self.metrics,
            organized: &self.organized,
            filtered: &self.filtered,
            closed_lines: &self.closed_lines,
            wip_lines: &self.wip_lines,
        }
    }

    #[instrument(skip(self), fields(fingerprint = %self.fingerprint))]
    fn recompute_all(&mut self) {
        self.metrics = raw_metrics(&self.overview, self.now, &self.config, &mut self.bug_types);
        self.organized = organize_by_work_item_type(&self.overview, |_| true);
        self.recompute_filtered();
        info!(
            items = self.overview.by_id.len(),
            buckets = self.organized.bucket_count(),
            "dashboard recomputed"
        );
    }

    fn recompute_filtered(&mut self) {
        let filter = self.filters.compile(&self.config.sizes);
        self.filtered = organize_by_work_item_type(&self.overview, |item| filter.matches(item));

        let days = self.config.window.days;
        let mut closed = reconstruct_lines(
            &self.overview,
            &self.filtered,
            DayPredicate::ClosedOnDay,
            self.now,
            days,
        );
        let mut wip = reconstruct_lines(
            &self.overview,
            &self.filtered,
            DayPredicate::WipOnDay,
            self.now,
            days,
        );
        for line in closed.iter_mut().chain(wip.iter_mut()) {
            let key = line.group.cache_key(&line.type_id);
            line.color = Some(self.palette.color_for(&key).to_string());
        }
        self.closed_lines = closed;
        self.wip_lines = wip;
    }
}

/// Metrics over the unfiltered snapshot, classifying bug types through `bug_types`.
fn raw_metrics(
    overview: &Overview,
    now: DateTime<Utc>,
    config: &EngineConfig,
    bug_types: &mut MemoCache<bool>,
) -> FlowMetrics {
    let pattern = config.leakage.bug_type_pattern.as_str();
    compute_flow_metrics(overview, now, config, |type_id| {
        *bug_types.get_or_insert_with(type_id, || is_bug_type(overview, type_id, pattern))
    })
}

fn report_cycles(overview: &Overview) {
    let cycles = find_relation_cycles(overview);
    if !cycles.is_empty() {
        warn!(?cycles, "relation cycles in snapshot; tree expansion will skip them");
    }
}
