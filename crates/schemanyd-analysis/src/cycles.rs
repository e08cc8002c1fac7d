//! Circular dependency detection.
//!
//! # Edge Direction
//!
//! Cycles are found over dependency arcs, `dependent → dependency` (a table
//! points at the tables whose rows must exist before its own). See
//! [`SchemaGraph::dependencies`].
//!
//! # Hard vs. soft
//!
//! - A **hard** cycle consists only of NOT NULL references. No insertion
//!   order can satisfy it.
//! - A **soft** cycle contains at least one nullable reference. It can be
//!   populated by inserting with that key NULL and updating it afterwards.
//!
//! # Algorithm
//!
//! Two iterative depth-first searches, each starting from every unvisited
//! table in declaration order and expanding arcs in edge order:
//!
//! 1. Over hard arcs only. Every back-edge yields one hard cycle.
//! 2. Over all arcs. Every back-edge whose cycle contains a nullable arc
//!    yields one soft cycle; all-hard back-edge cycles are skipped since pass
//!    1 already reports the hard structure.
//!
//! Each pass visits every node and arc at most once, so detection is
//! O(V + E) and deterministic. The hard pass runs on its own so a hard cycle
//! is never hidden behind a nullable edge that the combined search happened
//! to take first.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use fixedbitset::FixedBitSet;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use schemanyd_core::{Dependency, EdgeId, SchemaGraph, TableId};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleKind {
    Hard,
    Soft,
}

/// A closed walk of dependency arcs.
///
/// `tables[i]` depends on `tables[i + 1]` through `edges[i]`, and the last
/// table depends on the first. A self-referencing table yields a cycle of
/// length 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub kind: CycleKind,
    pub tables: Vec<String>,
    /// Edge labels (`posts.author_id -> users.id`) in walk order.
    pub references: Vec<String>,
    #[serde(skip)]
    pub edges: Vec<EdgeId>,
}

impl Cycle {
    /// Number of edges in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t == name)
    }

    #[must_use]
    pub fn is_self_reference(&self) -> bool {
        self.edges.len() == 1
    }

    pub(crate) fn from_arcs(graph: &SchemaGraph, kind: CycleKind, arcs: &[Dependency]) -> Self {
        Self {
            kind,
            tables: arcs.iter().map(|arc| graph.table_name(arc.dependent)).collect(),
            references: arcs
                .iter()
                .map(|arc| {
                    graph
                        .edge(arc.edge)
                        .map_or_else(|| format!("#{}", arc.edge.index()), |edge| edge.label())
                })
                .collect(),
            edges: arcs.iter().map(|arc| arc.edge).collect(),
        }
    }
}

impl fmt::Display for Cycle {
    /// `a -> b -> a`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            write!(f, "{table} -> ")?;
        }
        match self.tables.first() {
            Some(first) => write!(f, "{first}"),
            None => Ok(()),
        }
    }
}

/// Find every hard cycle, then every soft cycle.
#[must_use]
pub fn find_cycles(graph: &SchemaGraph) -> Vec<Cycle> {
    let mut cycles = hard_cycles(graph);
    cycles.extend(soft_cycles(graph));
    debug!(count = cycles.len(), "cycle detection complete");
    cycles
}

/// Cycles made only of NOT NULL references.
#[must_use]
pub fn hard_cycles(graph: &SchemaGraph) -> Vec<Cycle> {
    let outgoing = outgoing_arcs(graph, Dependency::is_hard);
    back_edge_cycles(graph, &outgoing)
        .into_iter()
        .map(|arcs| Cycle::from_arcs(graph, CycleKind::Hard, &arcs))
        .collect()
}

/// Cycles containing at least one nullable reference.
#[must_use]
pub fn soft_cycles(graph: &SchemaGraph) -> Vec<Cycle> {
    let outgoing = outgoing_arcs(graph, |_| true);
    back_edge_cycles(graph, &outgoing)
        .into_iter()
        .filter(|arcs| arcs.iter().any(|arc| arc.nullable))
        .map(|arcs| Cycle::from_arcs(graph, CycleKind::Soft, &arcs))
        .collect()
}

/// Groups of tables that are mutually hard-dependent (Tarjan SCC over hard
/// arcs), including singleton tables with a hard self-reference.
///
/// Members are listed in declaration order; groups are ordered by their first
/// member.
#[must_use]
pub fn cyclic_components(graph: &SchemaGraph) -> Vec<Vec<String>> {
    let mut hard: DiGraph<(), ()> = DiGraph::with_capacity(graph.node_count(), 0);
    for _ in graph.table_ids() {
        hard.add_node(());
    }
    for arc in graph.dependencies().iter().filter(|arc| arc.is_hard()) {
        hard.add_edge(
            NodeIndex::new(arc.dependent.index()),
            NodeIndex::new(arc.dependency.index()),
            (),
        );
    }

    let mut components: Vec<Vec<TableId>> = tarjan_scc(&hard)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| hard.find_edge(node, node).is_some())
        })
        .map(|mut component| {
            component.sort_unstable();
            component
        })
        .collect();
    components.sort_unstable();

    components
        .into_iter()
        .map(|component| component.into_iter().map(|id| graph.table_name(id)).collect())
        .collect()
}

// ---------------------------------------------------------------------------
// DFS core
// ---------------------------------------------------------------------------

fn outgoing_arcs(graph: &SchemaGraph, keep: impl Fn(&Dependency) -> bool) -> Vec<Vec<Dependency>> {
    let mut outgoing: Vec<Vec<Dependency>> = vec![Vec::new(); graph.node_count()];
    for arc in graph.dependencies().iter().filter(|arc| keep(arc)) {
        outgoing[arc.dependent.index()].push(*arc);
    }
    outgoing
}

/// Iterative DFS collecting the arc sequence closed by every back-edge.
fn back_edge_cycles(graph: &SchemaGraph, outgoing: &[Vec<Dependency>]) -> Vec<Vec<Dependency>> {
    let node_count = graph.node_count();
    let mut visited = FixedBitSet::with_capacity(node_count);
    // Position of a node on the current DFS path, if it is on it.
    let mut on_path: Vec<Option<usize>> = vec![None; node_count];
    // path_arcs[i] leads from call_stack[i] to call_stack[i + 1].
    let mut path_arcs: Vec<Dependency> = Vec::new();
    // (node, index of the next arc to expand)
    let mut call_stack: Vec<(TableId, usize)> = Vec::new();
    let mut cycles: Vec<Vec<Dependency>> = Vec::new();

    for start in graph.table_ids() {
        if visited.put(start.index()) {
            continue;
        }
        on_path[start.index()] = Some(0);
        call_stack.push((start, 0));

        while let Some(&(node, next)) = call_stack.last() {
            let arc = outgoing
                .get(node.index())
                .and_then(|arcs| arcs.get(next))
                .copied();

            let Some(arc) = arc else {
                // Fully explored.
                call_stack.pop();
                path_arcs.pop();
                on_path[node.index()] = None;
                continue;
            };

            if let Some(frame) = call_stack.last_mut() {
                frame.1 += 1;
            }

            let target = arc.dependency;
            if let Some(position) = on_path[target.index()] {
                let mut cycle = path_arcs[position..].to_vec();
                cycle.push(arc);
                cycles.push(cycle);
            } else if !visited.put(target.index()) {
                on_path[target.index()] = Some(call_stack.len());
                path_arcs.push(arc);
                call_stack.push((target, 0));
            }
        }
    }

    cycles
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
