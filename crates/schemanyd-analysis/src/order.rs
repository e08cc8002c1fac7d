//! Topological insertion ordering.
//!
//! A table may be populated once every table it references through a NOT NULL
//! foreign key has been populated. Nullable references never constrain the
//! order: if their target comes later they are deferred and filled by an
//! update once the target rows exist.
//!
//! Ordering is Kahn's algorithm over the hard dependency arcs with a min-heap
//! keyed on declaration position, so among tables that are ready at the same
//! time the one declared first is placed first.

#![allow(clippy::module_name_repetitions)]

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use schemanyd_core::{Dependency, EdgeId, ErrorCode, SchemaGraph, TableId, TableNode};
use serde::Serialize;
use tracing::debug;

use crate::cycles::{Cycle, CycleKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    #[error("hard dependency cycle blocks insertion ordering: {cycle}")]
    CyclicDependency { cycle: Cycle },
}

impl OrderingError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CyclicDependency { .. } => ErrorCode::CyclicDependency,
        }
    }

    /// The cycle that blocked ordering.
    #[must_use]
    pub const fn cycle(&self) -> &Cycle {
        match self {
            Self::CyclicDependency { cycle } => cycle,
        }
    }
}

/// A nullable reference whose target is not inserted before its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredReference {
    #[serde(skip)]
    pub edge: EdgeId,
    pub table: String,
    pub column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Insertion order plus the references that must be filled afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionPlan {
    pub order: Vec<String>,
    pub deferred: Vec<DeferredReference>,
}

/// Tables in an order that never violates a NOT NULL foreign key.
///
/// # Errors
///
/// Returns [`OrderingError::CyclicDependency`] when a hard cycle exists.
pub fn insertion_order(graph: &SchemaGraph) -> Result<Vec<&TableNode>, OrderingError> {
    let order = kahn_order(graph)?;
    Ok(order.into_iter().filter_map(|id| graph.node(id)).collect())
}

/// [`insertion_order`] by name, with the deferred nullable references.
///
/// # Errors
///
/// Returns [`OrderingError::CyclicDependency`] when a hard cycle exists.
pub fn insertion_plan(graph: &SchemaGraph) -> Result<InsertionPlan, OrderingError> {
    let order = kahn_order(graph)?;

    let mut position = vec![usize::MAX; graph.node_count()];
    for (slot, id) in order.iter().enumerate() {
        position[id.index()] = slot;
    }

    let deferred = graph
        .dependencies()
        .iter()
        .filter(|arc| {
            arc.nullable && position[arc.dependency.index()] >= position[arc.dependent.index()]
        })
        .filter_map(|arc| {
            let edge = graph.edge(arc.edge)?;
            Some(DeferredReference {
                edge: arc.edge,
                table: edge.source.name.clone(),
                column: edge.relationship.source_column.clone(),
                target_table: edge.target.name.clone(),
                target_column: edge.relationship.target_column.clone(),
            })
        })
        .collect::<Vec<_>>();

    debug!(tables = order.len(), deferred = deferred.len(), "insertion plan computed");

    Ok(InsertionPlan {
        order: order.into_iter().map(|id| graph.table_name(id)).collect(),
        deferred,
    })
}

/// Groups of tables that can be populated in parallel.
///
/// Every table's hard dependencies lie in earlier layers. Tables within a
/// layer keep declaration order.
///
/// # Errors
///
/// Returns [`OrderingError::CyclicDependency`] when a hard cycle exists.
pub fn insertion_layers(graph: &SchemaGraph) -> Result<Vec<Vec<String>>, OrderingError> {
    let (dependents, mut pending) = hard_adjacency(graph);

    let mut ready: Vec<TableId> = graph
        .table_ids()
        .filter(|id| pending[id.index()] == 0)
        .collect();
    let mut placed = FixedBitSet::with_capacity(graph.node_count());
    let mut layers: Vec<Vec<TableId>> = Vec::new();

    while !ready.is_empty() {
        let mut next: Vec<TableId> = Vec::new();
        for &id in &ready {
            placed.insert(id.index());
            for &dependent in &dependents[id.index()] {
                pending[dependent.index()] -= 1;
                if pending[dependent.index()] == 0 {
                    next.push(dependent);
                }
            }
        }
        next.sort_unstable();
        layers.push(std::mem::replace(&mut ready, next));
    }

    if placed.count_ones(..) < graph.node_count() {
        return Err(blocking_cycle(graph, &placed));
    }

    debug!(layers = layers.len(), "insertion layers computed");
    Ok(layers
        .into_iter()
        .map(|layer| layer.into_iter().map(|id| graph.table_name(id)).collect())
        .collect())
}

// ---------------------------------------------------------------------------
// Kahn's algorithm
// ---------------------------------------------------------------------------

/// For each table, the tables that hard-depend on it (one entry per arc), and
/// each table's count of unsatisfied hard arcs.
fn hard_adjacency(graph: &SchemaGraph) -> (Vec<Vec<TableId>>, Vec<usize>) {
    let mut dependents: Vec<Vec<TableId>> = vec![Vec::new(); graph.node_count()];
    let mut pending = vec![0usize; graph.node_count()];
    for arc in graph.dependencies().iter().filter(|arc| arc.is_hard()) {
        dependents[arc.dependency.index()].push(arc.dependent);
        pending[arc.dependent.index()] += 1;
    }
    (dependents, pending)
}

fn kahn_order(graph: &SchemaGraph) -> Result<Vec<TableId>, OrderingError> {
    let (dependents, mut pending) = hard_adjacency(graph);

    let mut ready: BinaryHeap<Reverse<TableId>> = graph
        .table_ids()
        .filter(|id| pending[id.index()] == 0)
        .map(Reverse)
        .collect();
    let mut placed = FixedBitSet::with_capacity(graph.node_count());
    let mut order = Vec::with_capacity(graph.node_count());

    while let Some(Reverse(id)) = ready.pop() {
        placed.insert(id.index());
        order.push(id);
        for &dependent in &dependents[id.index()] {
            pending[dependent.index()] -= 1;
            if pending[dependent.index()] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    if order.len() < graph.node_count() {
        return Err(blocking_cycle(graph, &placed));
    }
    debug!(tables = order.len(), "insertion order computed");
    Ok(order)
}

/// Extract one hard cycle from the tables Kahn's algorithm could not place.
///
/// Every unplaced table has at least one hard arc to another unplaced table,
/// so following the first such arc from the earliest unplaced table must
/// eventually revisit a table.
fn blocking_cycle(graph: &SchemaGraph, placed: &FixedBitSet) -> OrderingError {
    let mut first_arc: Vec<Option<Dependency>> = vec![None; graph.node_count()];
    for arc in graph.dependencies().iter().filter(|arc| arc.is_hard()) {
        let slot = &mut first_arc[arc.dependent.index()];
        if slot.is_none() && !placed.contains(arc.dependency.index()) {
            *slot = Some(*arc);
        }
    }

    let start = graph.table_ids().find(|id| !placed.contains(id.index()));
    let mut seen_at: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut walk: Vec<Dependency> = Vec::new();
    let mut current = start;

    while let Some(node) = current {
        if let Some(at) = seen_at[node.index()] {
            let cycle = Cycle::from_arcs(graph, CycleKind::Hard, &walk[at..]);
            debug!(%cycle, "insertion ordering blocked");
            return OrderingError::CyclicDependency { cycle };
        }
        seen_at[node.index()] = Some(walk.len());
        current = first_arc[node.index()].map(|arc| {
            walk.push(arc);
            arc.dependency
        });
    }

    // Unreachable for a consistent graph; still name the stuck tables.
    OrderingError::CyclicDependency {
        cycle: Cycle {
            kind: CycleKind::Hard,
            tables: graph
                .table_ids()
                .filter(|id| !placed.contains(id.index()))
                .map(|id| graph.table_name(id))
                .collect(),
            references: Vec::new(),
            edges: Vec::new(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
