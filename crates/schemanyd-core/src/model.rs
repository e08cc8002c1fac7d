//! Schema graph data model: table nodes, relationship edges, dependency arcs.
//!
//! Nodes live in a petgraph arena and edges refer to their endpoints by
//! [`TableId`], so self-references and many-to-many back-edges never create
//! ownership cycles.

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::Serialize;

/// Dense identifier of a table node. Index order equals declaration order.
pub type TableId = NodeIndex;

/// Dense identifier of a relationship edge. Index order equals the graph's
/// edge sequence order.
pub type EdgeId = EdgeIndex;

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

/// One relational table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableNode {
    pub name: String,
    /// Columns in declaration order. Never empty.
    pub columns: Vec<Column>,
    /// Position of the table in the input description.
    pub position: usize,
    /// The adapter flagged this table as a junction (association) table.
    pub junction: bool,
}

impl TableNode {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// Whether values of `column` are unique per row on their own: either a
    /// single-column UNIQUE constraint or the table's only primary key column.
    #[must_use]
    pub fn is_unique_column(&self, column: &str) -> bool {
        let Some(col) = self.column(column) else {
            return false;
        };
        col.unique || (col.primary_key && self.primary_key().count() == 1)
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "one_to_one",
            Self::OneToMany => "one_to_many",
            Self::ManyToMany => "many_to_many",
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The junction table a collapsed many-to-many edge was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JunctionLink {
    pub table: String,
    /// Junction column referencing the edge's source table.
    pub source_column: String,
    /// Junction column referencing the edge's target table.
    pub target_column: String,
}

/// Edge weight stored in the graph.
///
/// For a plain foreign key the edge runs from the referencing table (source)
/// to the referenced table (target), and `source_column`/`target_column` are
/// the foreign key pair. For a collapsed many-to-many edge the endpoints are
/// the two tables the junction references, and the columns are the
/// referenced columns on each of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub source_column: String,
    pub target_column: String,
    pub cardinality: Cardinality,
    /// Optional relationship: rows may be inserted with the key left NULL.
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub junction: Option<JunctionLink>,
}

/// A relationship edge resolved against its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipEdge<'g> {
    pub id: EdgeId,
    pub source: &'g TableNode,
    pub target: &'g TableNode,
    pub relationship: &'g Relationship,
}

impl RelationshipEdge<'_> {
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.relationship.cardinality
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.relationship.nullable
    }

    #[must_use]
    pub fn is_self_referencing(&self) -> bool {
        self.source.position == self.target.position
    }

    /// Human-readable `source.column -> target.column` label.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.relationship.junction {
            Some(link) => format!(
                "{}.{} <-> {}.{} (via {})",
                self.source.name,
                self.relationship.source_column,
                self.target.name,
                self.relationship.target_column,
                link.table
            ),
            None => format!(
                "{}.{} -> {}.{}",
                self.source.name,
                self.relationship.source_column,
                self.target.name,
                self.relationship.target_column
            ),
        }
    }
}

impl std::fmt::Display for RelationshipEdge<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

// ---------------------------------------------------------------------------
// Derived adjacency
// ---------------------------------------------------------------------------

/// Which endpoint of a collapsed many-to-many edge a junction hop reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionEnd {
    /// The edge's source, joined on the junction's first foreign key.
    Source,
    /// The edge's target, joined on the junction's second foreign key.
    Target,
}

/// One edge as seen from one of its endpoints, used for undirected walks.
///
/// A collapsed junction table has no edges of its own, but it still joins
/// to both tables it links. Those hops reuse the many-to-many edge id and
/// carry `junction_end`; `forward` then means junction to endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incidence {
    pub edge: EdgeId,
    pub neighbor: TableId,
    /// `true` when the walk follows the edge's declared direction
    /// (source to target).
    pub forward: bool,
    pub junction_end: Option<JunctionEnd>,
}

impl Incidence {
    #[must_use]
    pub const fn is_junction_hop(&self) -> bool {
        self.junction_end.is_some()
    }

    /// Whether this entry is one of the node's own relationships, as opposed
    /// to a junction joining back onto one of its endpoints.
    #[must_use]
    pub const fn counts_toward_degree(&self) -> bool {
        self.junction_end.is_none() || self.forward
    }
}

/// A "must exist before" arc: `dependent` holds a reference to `dependency`.
///
/// Plain edges contribute one arc (source depends on target). A collapsed
/// many-to-many edge contributes two hard arcs, junction to each endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub dependent: TableId,
    pub dependency: TableId,
    pub edge: EdgeId,
    pub nullable: bool,
}

impl Dependency {
    #[must_use]
    pub const fn is_hard(&self) -> bool {
        !self.nullable
    }
}
