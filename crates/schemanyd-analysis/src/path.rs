//! Shortest and multi-table join paths.
//!
//! # Connectivity
//!
//! JOIN generation is direction-agnostic, so paths treat the schema graph as
//! undirected: an edge may be walked from its referenced table back to the
//! referencing one. Each [`PathStep`] records whether it follows the foreign
//! key's declared direction so callers can emit correct JOIN conditions.
//!
//! # Determinism
//!
//! Paths come from an unweighted BFS (length = edge count). A node's edges
//! are expanded in edge sequence order and a node keeps the first parent that
//! discovered it, so among equal-length paths the one found first in that
//! order wins. Repeated queries on the same graph return identical paths.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use schemanyd_core::{
    EdgeId, ErrorCode, Incidence, JunctionEnd, RelationshipEdge, SchemaGraph, TableId, TableNode,
};

/// Per-call path failures. They never affect the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("table `{table}` is not in the schema graph")]
    NoSuchTable { table: String },

    #[error("no relationship path connects `{from}` and `{to}`")]
    Unreachable { from: String, to: String },
}

impl PathError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoSuchTable { .. } => ErrorCode::NoSuchTable,
            Self::Unreachable { .. } => ErrorCode::Unreachable,
        }
    }
}

/// One hop of a path: an edge plus the direction it was walked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep<'g> {
    pub edge: RelationshipEdge<'g>,
    /// `true` when walked source → target (along the foreign key). For a
    /// junction hop, `true` when walked junction → endpoint.
    pub forward: bool,
    /// Set when the hop joins a collapsed junction table to one endpoint of
    /// its many-to-many `edge`.
    pub junction: Option<JunctionHop<'g>>,
}

/// A collapsed junction table and the endpoint of its edge a hop reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JunctionHop<'g> {
    pub table: &'g TableNode,
    pub end: JunctionEnd,
}

impl<'g> PathStep<'g> {
    #[must_use]
    pub const fn from_table(&self) -> &'g TableNode {
        let (near, far) = self.ends();
        if self.forward { near } else { far }
    }

    #[must_use]
    pub const fn to_table(&self) -> &'g TableNode {
        let (near, far) = self.ends();
        if self.forward { far } else { near }
    }

    #[must_use]
    pub const fn is_junction_hop(&self) -> bool {
        self.junction.is_some()
    }

    /// `(start, end)` of the hop in its forward direction.
    const fn ends(&self) -> (&'g TableNode, &'g TableNode) {
        match self.junction {
            Some(JunctionHop {
                table,
                end: JunctionEnd::Source,
            }) => (table, self.edge.source),
            Some(JunctionHop {
                table,
                end: JunctionEnd::Target,
            }) => (table, self.edge.target),
            None => (self.edge.source, self.edge.target),
        }
    }

    /// SQL join condition for this hop, written from the walked-from side.
    ///
    /// Plain foreign keys give `posts.author_id = users.id`. A collapsed
    /// many-to-many edge joins through its junction table:
    /// `students.id = enrollments.student_id AND enrollments.course_id = courses.id`.
    ///
    /// A junction hop joins the junction column to the endpoint column:
    /// `enrollments.student_id = students.id`.
    #[must_use]
    pub fn join_condition(&self) -> String {
        let rel = self.edge.relationship;
        let (source, target) = (&self.edge.source.name, &self.edge.target.name);
        let (source_col, target_col) = (&rel.source_column, &rel.target_column);

        if let (Some(hop), Some(link)) = (self.junction, &rel.junction) {
            let (junction_col, table, col) = match hop.end {
                JunctionEnd::Source => (&link.source_column, source, source_col),
                JunctionEnd::Target => (&link.target_column, target, target_col),
            };
            let j = &hop.table.name;
            return if self.forward {
                format!("{j}.{junction_col} = {table}.{col}")
            } else {
                format!("{table}.{col} = {j}.{junction_col}")
            };
        }

        match (&rel.junction, self.forward) {
            (Some(link), true) => format!(
                "{source}.{source_col} = {j}.{} AND {j}.{} = {target}.{target_col}",
                link.source_column,
                link.target_column,
                j = link.table
            ),
            (Some(link), false) => format!(
                "{target}.{target_col} = {j}.{} AND {j}.{} = {source}.{source_col}",
                link.target_column,
                link.source_column,
                j = link.table
            ),
            (None, true) => format!("{source}.{source_col} = {target}.{target_col}"),
            (None, false) => format!("{target}.{target_col} = {source}.{source_col}"),
        }
    }
}

/// Shortest undirected path from `from` to `to`, as an ordered edge list.
///
/// `from == to` yields an empty path.
///
/// # Errors
///
/// - [`PathError::NoSuchTable`] if either name is absent from the graph.
/// - [`PathError::Unreachable`] if the two tables lie in disconnected parts
///   of the schema.
pub fn shortest_path<'g>(
    graph: &'g SchemaGraph,
    from: &str,
    to: &str,
) -> Result<Vec<PathStep<'g>>, PathError> {
    let start = lookup(graph, from)?;
    let goal = lookup(graph, to)?;

    if start == goal {
        return Ok(Vec::new());
    }

    let hops = bfs_from_set(graph, &[start], goal).ok_or_else(|| PathError::Unreachable {
        from: from.to_string(),
        to: to.to_string(),
    })?;

    Ok(resolve_hops(graph, &hops))
}

/// Edges connecting every table in `tables`, for multi-table JOIN generation.
///
/// The first table seeds the connected set; each later table is attached by
/// the shortest path from *any* table already connected (multi-source BFS,
/// same tie-breaking as [`shortest_path`]). Edges appear in the order they
/// were added; tables already connected add nothing.
///
/// # Errors
///
/// - [`PathError::NoSuchTable`] for the first unknown name.
/// - [`PathError::Unreachable`] (from the first table) for the first table
///   that cannot be connected.
pub fn join_path<'g, S: AsRef<str>>(
    graph: &'g SchemaGraph,
    tables: &[S],
) -> Result<Vec<PathStep<'g>>, PathError> {
    let ids = tables
        .iter()
        .map(|name| lookup(graph, name.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let Some((&first, rest)) = ids.split_first() else {
        return Ok(Vec::new());
    };

    let mut connected: Vec<TableId> = vec![first];
    let mut hops: Vec<Hop> = Vec::new();

    for (offset, &goal) in rest.iter().enumerate() {
        if connected.contains(&goal) {
            continue;
        }
        let Some(branch) = bfs_from_set(graph, &connected, goal) else {
            return Err(PathError::Unreachable {
                from: tables[0].as_ref().to_string(),
                to: tables[offset + 1].as_ref().to_string(),
            });
        };
        for hop in &branch {
            if !connected.contains(&hop.reached) {
                connected.push(hop.reached);
            }
        }
        hops.extend(branch);
    }

    Ok(resolve_hops(graph, &hops))
}

// ---------------------------------------------------------------------------
// BFS core
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Hop {
    edge: EdgeId,
    forward: bool,
    junction_end: Option<JunctionEnd>,
    reached: TableId,
}

fn lookup(graph: &SchemaGraph, name: &str) -> Result<TableId, PathError> {
    graph.table_id(name).ok_or_else(|| PathError::NoSuchTable {
        table: name.to_string(),
    })
}

/// BFS from every node in `sources` (seeded in slice order) until `goal` is
/// dequeued. Returns the hops from the source set to `goal`.
fn bfs_from_set(graph: &SchemaGraph, sources: &[TableId], goal: TableId) -> Option<Vec<Hop>> {
    let node_count = graph.node_count();
    let mut visited = FixedBitSet::with_capacity(node_count);
    let mut parent: Vec<Option<(TableId, Incidence)>> = vec![None; node_count];
    let mut queue: VecDeque<TableId> = VecDeque::with_capacity(node_count);

    for &source in sources {
        if !visited.put(source.index()) {
            queue.push_back(source);
        }
    }

    while let Some(current) = queue.pop_front() {
        if current == goal {
            return Some(reconstruct(&parent, goal));
        }
        for incidence in graph.incident(current) {
            let next = incidence.neighbor;
            if !visited.put(next.index()) {
                parent[next.index()] = Some((current, *incidence));
                queue.push_back(next);
            }
        }
    }

    None
}

fn reconstruct(parent: &[Option<(TableId, Incidence)>], goal: TableId) -> Vec<Hop> {
    let mut hops = Vec::new();
    let mut cursor = goal;
    while let Some((prev, incidence)) = parent.get(cursor.index()).copied().flatten() {
        hops.push(Hop {
            edge: incidence.edge,
            forward: incidence.forward,
            junction_end: incidence.junction_end,
            reached: cursor,
        });
        cursor = prev;
    }
    hops.reverse();
    hops
}

fn resolve_hops<'g>(graph: &'g SchemaGraph, hops: &[Hop]) -> Vec<PathStep<'g>> {
    hops.iter()
        .filter_map(|hop| {
            let edge = graph.edge(hop.edge)?;
            let junction = match hop.junction_end {
                Some(end) => {
                    let link = edge.relationship.junction.as_ref()?;
                    Some(JunctionHop {
                        table: graph.table(&link.table)?,
                        end,
                    })
                }
                None => None,
            };
            Some(PathStep {
                edge,
                forward: hop.forward,
                junction,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
