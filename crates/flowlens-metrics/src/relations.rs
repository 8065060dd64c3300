//! Cycle detection over the snapshot's parent → child relations.
//!
//! The hierarchy builder already refuses to recurse into a cycle. This
//! module lets callers report the offending components once per snapshot
//! instead of discovering them node by node.

use std::collections::HashMap;

use flowlens_core::model::{Overview, WorkItemId};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Build the relation graph with one node per id that appears anywhere in
/// `relations`, as parent or child.
#[must_use]
pub fn relation_graph(overview: &Overview) -> DiGraph<WorkItemId, ()> {
    let mut graph = DiGraph::new();
    let mut index: HashMap<WorkItemId, NodeIndex> = HashMap::new();
    let mut node = |graph: &mut DiGraph<WorkItemId, ()>, id: WorkItemId| {
        *index.entry(id).or_insert_with(|| graph.add_node(id))
    };

    for (&parent, children) in &overview.relations {
        let from = node(&mut graph, parent);
        for &child in children {
            let to = node(&mut graph, child);
            if !graph.contains_edge(from, to) {
                graph.add_edge(from, to, ());
            }
        }
    }

    graph
}

/// Every strongly connected component that forms a cycle.
///
/// Each entry is sorted; self-relations are one-element cycles. The outer
/// list is sorted too, so the output is stable for a given snapshot.
#[must_use]
pub fn find_relation_cycles(overview: &Overview) -> Vec<Vec<WorkItemId>> {
    let graph = relation_graph(overview);
    let mut cycles: Vec<Vec<WorkItemId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| graph.find_edge(idx, idx).is_some())
        })
        .map(|component| {
            let mut ids: Vec<WorkItemId> = component.into_iter().map(|idx| graph[idx]).collect();
            ids.sort_unstable();
            ids
        })
        .collect();

    cycles.sort_unstable();
    cycles
}
