//! The immutable schema graph and its lookups.
//!
//! A [`SchemaGraph`] is produced only by [`SchemaGraph::build`] (see
//! [`crate::build`]) and offers no mutation API. Share it by reference or
//! `Arc` across threads; every accessor takes `&self`.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::graph::DiGraph;

use crate::model::{
    Dependency, EdgeId, Incidence, Relationship, RelationshipEdge, TableId, TableNode,
};

/// Tables as nodes, foreign-key relationships as directed edges.
///
/// Node indices follow declaration order and edge indices follow the edge
/// sequence (tables in declaration order, each table's foreign keys in
/// declaration order). Both orders are what the traversal engine uses for
/// deterministic tie-breaking.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    pub(crate) graph: DiGraph<TableNode, Relationship>,
    pub(crate) node_map: HashMap<String, TableId>,
    /// Per-node incident edges, sorted by edge id.
    pub(crate) incidence: Vec<Vec<Incidence>>,
    /// Dependency arcs in edge order.
    pub(crate) dependencies: Vec<Dependency>,
    pub(crate) content_hash: String,
}

impl SchemaGraph {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableNode> {
        self.table_id(name).and_then(|id| self.node(id))
    }

    #[must_use]
    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.node_map.get(name).copied()
    }

    #[must_use]
    pub fn node(&self, id: TableId) -> Option<&TableNode> {
        self.graph.node_weight(id)
    }

    /// Name of a table, or `#<index>` for an id from another graph.
    #[must_use]
    pub fn table_name(&self, id: TableId) -> String {
        self.node(id)
            .map_or_else(|| format!("#{}", id.index()), |node| node.name.clone())
    }

    /// All tables in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableNode> {
        self.graph.node_weights()
    }

    pub fn table_ids(&self) -> impl Iterator<Item = TableId> {
        self.graph.node_indices()
    }

    /// Resolve an edge id against this graph.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<RelationshipEdge<'_>> {
        let (source, target) = self.graph.edge_endpoints(id)?;
        Some(RelationshipEdge {
            id,
            source: self.graph.node_weight(source)?,
            target: self.graph.node_weight(target)?,
            relationship: self.graph.edge_weight(id)?,
        })
    }

    /// All relationship edges in edge sequence order.
    pub fn edges(&self) -> impl Iterator<Item = RelationshipEdge<'_>> {
        self.graph.edge_indices().filter_map(|id| self.edge(id))
    }

    /// Find the edge produced by the foreign key `table.column`.
    ///
    /// For a collapsed junction, either junction column finds the
    /// many-to-many edge it was folded into.
    #[must_use]
    pub fn find_edge(&self, table: &str, column: &str) -> Option<RelationshipEdge<'_>> {
        self.edges().find(|edge| match &edge.relationship.junction {
            Some(link) => {
                link.table == table
                    && (link.source_column == column || link.target_column == column)
            }
            None => edge.source.name == table && edge.relationship.source_column == column,
        })
    }

    /// Edges whose source is `table` (its outgoing foreign keys).
    pub fn edges_from<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = RelationshipEdge<'a>> + 'a {
        self.edges().filter(move |edge| edge.source.name == table)
    }

    /// Edges whose target is `table` (foreign keys referencing it).
    pub fn edges_to<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = RelationshipEdge<'a>> + 'a {
        self.edges().filter(move |edge| edge.target.name == table)
    }

    /// Edges touching `id` in either direction, ordered by edge id.
    ///
    /// A self-referencing edge appears once, marked forward. A collapsed
    /// junction lists its many-to-many edge once per endpoint, and each
    /// endpoint lists the same edge again as a hop back to the junction.
    #[must_use]
    pub fn incident(&self, id: TableId) -> &[Incidence] {
        self.incidence.get(id.index()).map_or(&[], Vec::as_slice)
    }

    /// Dependency arcs ("dependent must be inserted after dependency") in
    /// edge order.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Look up a table the adapter flagged as a junction.
    #[must_use]
    pub fn junction(&self, name: &str) -> Option<&TableNode> {
        self.table(name).filter(|node| node.junction)
    }

    pub fn junctions(&self) -> impl Iterator<Item = &TableNode> {
        self.tables().filter(|node| node.junction)
    }

    /// BLAKE3 digest of tables, columns, and edges (`blake3:<hex>`).
    ///
    /// Compare against a stored value to decide whether a cached graph is
    /// still current.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Read-only access to the underlying petgraph structure.
    #[must_use]
    pub const fn inner(&self) -> &DiGraph<TableNode, Relationship> {
        &self.graph
    }
}
