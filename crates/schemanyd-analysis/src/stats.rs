//! Structural statistics for a schema graph.
//!
//! # Statistics Provided
//!
//! - **table_count** / **relationship_count**: nodes and edges of the graph.
//!   Collapsed junction tables count as tables; their foreign keys count as
//!   the single many-to-many relationship they were folded into.
//! - **density**: `relationship_count / (table_count * (table_count - 1))`,
//!   zero for graphs with fewer than two tables.
//! - **component_count**: weakly connected components, where a collapsed
//!   junction is connected to both of its endpoints. More than one means the
//!   schema splits into groups that never reference each other.
//! - **isolated_table_count**: tables with no relationships at all.
//! - **max_in_degree** / **max_out_degree**: most references to / from a
//!   single table. A self-reference counts as outbound only.
//! - **hard_cycle_count** / **soft_cycle_count**: see [`crate::cycles`].

#![allow(clippy::module_name_repetitions)]

use petgraph::unionfind::UnionFind;
use schemanyd_core::{Cardinality, SchemaGraph};
use serde::Serialize;

use crate::cycles::{CycleKind, find_cycles};

/// Summary statistics for a schema graph.
///
/// Computed by [`GraphStats::from_graph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub table_count: usize,
    pub relationship_count: usize,
    /// Tables flagged as junctions, collapsed or not.
    pub junction_count: usize,
    pub one_to_one_count: usize,
    pub one_to_many_count: usize,
    pub many_to_many_count: usize,
    pub nullable_count: usize,
    pub self_reference_count: usize,
    pub density: f64,
    pub component_count: usize,
    pub isolated_table_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub hard_cycle_count: usize,
    pub soft_cycle_count: usize,
}

impl GraphStats {
    #[must_use]
    pub fn from_graph(graph: &SchemaGraph) -> Self {
        let table_count = graph.node_count();
        let relationship_count = graph.edge_count();

        let mut one_to_one_count = 0;
        let mut one_to_many_count = 0;
        let mut many_to_many_count = 0;
        let mut nullable_count = 0;
        let mut self_reference_count = 0;
        for edge in graph.edges() {
            match edge.cardinality() {
                Cardinality::OneToOne => one_to_one_count += 1,
                Cardinality::OneToMany => one_to_many_count += 1,
                Cardinality::ManyToMany => many_to_many_count += 1,
            }
            if edge.is_nullable() {
                nullable_count += 1;
            }
            if edge.is_self_referencing() {
                self_reference_count += 1;
            }
        }

        // Union over edges and dependency arcs so a collapsed junction joins
        // the component of the tables it links.
        let mut components = UnionFind::<usize>::new(table_count);
        for edge in graph.inner().edge_indices() {
            if let Some((source, target)) = graph.inner().edge_endpoints(edge) {
                components.union(source.index(), target.index());
            }
        }
        for arc in graph.dependencies() {
            components.union(arc.dependent.index(), arc.dependency.index());
        }
        let mut labels = components.into_labeling();
        labels.sort_unstable();
        labels.dedup();
        let component_count = labels.len();

        let mut isolated_table_count = 0;
        let mut max_in_degree = 0;
        let mut max_out_degree = 0;
        let mut has_arc = vec![false; table_count];
        for arc in graph.dependencies() {
            has_arc[arc.dependent.index()] = true;
            has_arc[arc.dependency.index()] = true;
        }
        for id in graph.table_ids() {
            let incident = graph.incident(id);
            let counted = incident.iter().filter(|i| i.counts_toward_degree());
            let (degree, outbound) = counted.fold((0, 0), |(degree, outbound), i| {
                (degree + 1, outbound + usize::from(i.forward))
            });
            max_out_degree = max_out_degree.max(outbound);
            max_in_degree = max_in_degree.max(degree - outbound);
            if incident.is_empty() && !has_arc[id.index()] {
                isolated_table_count += 1;
            }
        }

        let cycles = find_cycles(graph);
        let hard_cycle_count = cycles.iter().filter(|c| c.kind == CycleKind::Hard).count();

        Self {
            table_count,
            relationship_count,
            junction_count: graph.tables().filter(|t| t.junction).count(),
            one_to_one_count,
            one_to_many_count,
            many_to_many_count,
            nullable_count,
            self_reference_count,
            density: compute_density(table_count, relationship_count),
            component_count,
            isolated_table_count,
            max_in_degree,
            max_out_degree,
            hard_cycle_count,
            soft_cycle_count: cycles.len() - hard_cycle_count,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(tables: usize, relationships: usize) -> f64 {
    if tables < 2 {
        return 0.0;
    }
    relationships as f64 / (tables * (tables - 1)) as f64
}
