//! Graph construction from a normalized schema description.
//!
//! # Overview
//!
//! [`SchemaGraph::build`] turns a [`SchemaDescription`] into a frozen
//! [`SchemaGraph`] in four steps:
//!
//! 1. One [`TableNode`] per table record, indexed by name. Duplicate table
//!    names, duplicate column names and column-less tables are rejected.
//! 2. Every foreign key is resolved: the referenced table must exist, the
//!    referencing column must be declared on the owning table, and the
//!    referenced column on the target.
//! 3. Edges are emitted and classified. A foreign key whose column is unique
//!    on its own table (single-column UNIQUE or sole primary key) is
//!    one-to-one; anything else is one-to-many. An adapter hint overrides the
//!    inference. A member of a composite primary key is not unique on its
//!    own, so it stays one-to-many. A flagged junction table is folded into
//!    a single many-to-many edge under [`JunctionPolicy::Collapse`].
//! 4. Derived indexes (incidence lists, dependency arcs, content hash) are
//!    computed and the graph is returned. A collapsed junction gets
//!    incidence entries to both tables it links, so paths can still reach
//!    it and any table that references it.
//!
//! ## Edge Direction
//!
//! A plain edge `A → B` means "A holds a foreign key into B", i.e. A depends
//! on B and B's rows must exist first.
//!
//! ## All-or-nothing
//!
//! The graph under construction is a local value; it escapes only through
//! the final `Ok`. Any error drops it, so no partially built graph is ever
//! observable.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, info, instrument};

use crate::config::{BuildConfig, JunctionPolicy};
use crate::description::{ForeignKeyRecord, SchemaDescription, TableRecord};
use crate::error::SchemaGraphError;
use crate::graph::SchemaGraph;
use crate::model::{
    Cardinality, Column, Dependency, Incidence, JunctionEnd, JunctionLink, Relationship, TableId,
    TableNode,
};

type Graph = DiGraph<TableNode, Relationship>;

/// A foreign key whose endpoints have been resolved.
struct ResolvedKey<'d> {
    record: &'d ForeignKeyRecord,
    target: TableId,
    nullable: bool,
}

impl SchemaGraph {
    /// Build a graph with the default [`BuildConfig`].
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaGraphError`] encountered; no graph is
    /// produced in that case.
    pub fn build(description: &SchemaDescription) -> Result<Self, SchemaGraphError> {
        Self::build_with(description, &BuildConfig::default())
    }

    /// Build a graph using an explicit build configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaGraphError`] encountered; no graph is
    /// produced in that case.
    #[instrument(
        skip_all,
        fields(tables = description.tables.len(), policy = ?config.junction_policy)
    )]
    pub fn build_with(
        description: &SchemaDescription,
        config: &BuildConfig,
    ) -> Result<Self, SchemaGraphError> {
        if description.tables.is_empty() {
            return Err(SchemaGraphError::EmptySchema);
        }

        // Step 1: nodes.
        let table_count = description.tables.len();
        let mut graph = Graph::with_capacity(table_count, description.foreign_key_count());
        let mut node_map: HashMap<String, TableId> = HashMap::with_capacity(table_count);

        for (position, record) in description.tables.iter().enumerate() {
            if node_map.contains_key(&record.name) {
                return Err(SchemaGraphError::DuplicateTable {
                    table: record.name.clone(),
                });
            }
            let node = table_node(position, record)?;
            let idx = graph.add_node(node);
            node_map.insert(record.name.clone(), idx);
        }

        // Step 2: resolve every foreign key before emitting any edge.
        let mut resolved: Vec<Vec<ResolvedKey<'_>>> = Vec::with_capacity(table_count);
        for (position, record) in description.tables.iter().enumerate() {
            let owner = &graph[NodeIndex::new(position)];
            let keys = record
                .foreign_keys
                .iter()
                .map(|fk| resolve_foreign_key(&graph, &node_map, owner, fk))
                .collect::<Result<Vec<_>, _>>()?;
            resolved.push(keys);
        }

        // Step 3: edges in table order, then foreign key order.
        for (position, (record, keys)) in description.tables.iter().zip(&resolved).enumerate() {
            let source = NodeIndex::new(position);

            if record.junction && config.junction_policy == JunctionPolicy::Collapse {
                let (from, to, relationship) = collapse_junction(&graph, source, keys)?;
                debug!(
                    junction = %record.name,
                    from = %graph[from].name,
                    to = %graph[to].name,
                    "collapsed junction into many-to-many edge"
                );
                graph.add_edge(from, to, relationship);
                continue;
            }

            for key in keys {
                let cardinality = classify(&graph[source], key);
                debug!(
                    table = %record.name,
                    column = %key.record.column,
                    target = %key.record.target_table,
                    %cardinality,
                    nullable = key.nullable,
                    "resolved foreign key"
                );
                graph.add_edge(
                    source,
                    key.target,
                    Relationship {
                        source_column: key.record.column.clone(),
                        target_column: key.record.target_column.clone(),
                        cardinality,
                        nullable: key.nullable,
                        junction: None,
                    },
                );
            }
        }

        // Step 4: freeze.
        let incidence = index_incidence(&graph, &node_map);
        let dependencies = collect_dependencies(&graph, &node_map);
        let content_hash = compute_content_hash(&graph);

        info!(
            tables = graph.node_count(),
            relationships = graph.edge_count(),
            "schema graph built"
        );

        Ok(Self {
            graph,
            node_map,
            incidence,
            dependencies,
            content_hash,
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn table_node(position: usize, record: &TableRecord) -> Result<TableNode, SchemaGraphError> {
    if record.columns.is_empty() {
        return Err(SchemaGraphError::EmptyTable {
            table: record.name.clone(),
        });
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(record.columns.len());
    let mut columns = Vec::with_capacity(record.columns.len());
    for col in &record.columns {
        if !seen.insert(col.name.as_str()) {
            return Err(SchemaGraphError::DuplicateColumn {
                table: record.name.clone(),
                column: col.name.clone(),
            });
        }
        columns.push(Column {
            name: col.name.clone(),
            nullable: col.nullable,
            primary_key: col.is_primary_key,
            unique: col.unique,
            data_type: col.data_type.clone(),
        });
    }

    Ok(TableNode {
        name: record.name.clone(),
        columns,
        position,
        junction: record.junction,
    })
}

fn resolve_foreign_key<'d>(
    graph: &Graph,
    node_map: &HashMap<String, TableId>,
    owner: &TableNode,
    fk: &'d ForeignKeyRecord,
) -> Result<ResolvedKey<'d>, SchemaGraphError> {
    let Some(&target) = node_map.get(&fk.target_table) else {
        return Err(SchemaGraphError::UnresolvedReference {
            table: owner.name.clone(),
            column: fk.column.clone(),
            target_table: fk.target_table.clone(),
        });
    };

    let Some(column) = owner.column(&fk.column) else {
        return Err(SchemaGraphError::UnresolvedColumn {
            table: owner.name.clone(),
            owner: owner.name.clone(),
            column: fk.column.clone(),
        });
    };

    if !graph[target].has_column(&fk.target_column) {
        return Err(SchemaGraphError::UnresolvedColumn {
            table: owner.name.clone(),
            owner: fk.target_table.clone(),
            column: fk.target_column.clone(),
        });
    }

    Ok(ResolvedKey {
        record: fk,
        target,
        nullable: fk.nullable.unwrap_or(column.nullable),
    })
}

fn classify(source: &TableNode, key: &ResolvedKey<'_>) -> Cardinality {
    if let Some(hint) = key.record.cardinality {
        return hint.into();
    }
    if source.is_unique_column(&key.record.column) {
        Cardinality::OneToOne
    } else {
        Cardinality::OneToMany
    }
}

/// Fold a junction's two foreign keys into one many-to-many edge running
/// from the first referenced table to the second.
fn collapse_junction(
    graph: &Graph,
    junction: TableId,
    keys: &[ResolvedKey<'_>],
) -> Result<(TableId, TableId, Relationship), SchemaGraphError> {
    let name = &graph[junction].name;
    let invalid = |reason: String| SchemaGraphError::InvalidJunction {
        table: name.clone(),
        reason,
    };

    let [first, second] = keys else {
        return Err(invalid(format!(
            "expected exactly 2 foreign keys, found {}",
            keys.len()
        )));
    };

    if let Some(optional) = [first, second].into_iter().find(|key| key.nullable) {
        return Err(invalid(format!(
            "foreign key `{}` is nullable; both must be NOT NULL",
            optional.record.column
        )));
    }
    if first.target == junction || second.target == junction {
        return Err(invalid("a junction cannot reference itself".to_string()));
    }
    if first.target == second.target {
        return Err(invalid(format!(
            "both foreign keys reference `{}`",
            graph[first.target].name
        )));
    }

    Ok((
        first.target,
        second.target,
        Relationship {
            source_column: first.record.target_column.clone(),
            target_column: second.record.target_column.clone(),
            cardinality: Cardinality::ManyToMany,
            nullable: false,
            junction: Some(JunctionLink {
                table: name.clone(),
                source_column: first.record.column.clone(),
                target_column: second.record.column.clone(),
            }),
        },
    ))
}

fn index_incidence(graph: &Graph, node_map: &HashMap<String, TableId>) -> Vec<Vec<Incidence>> {
    let mut incidence: Vec<Vec<Incidence>> = vec![Vec::new(); graph.node_count()];

    // edge_references() walks edges in index order, so every list ends up
    // sorted by edge id.
    for edge in graph.edge_references() {
        let (source, target) = (edge.source(), edge.target());
        incidence[source.index()].push(Incidence {
            edge: edge.id(),
            neighbor: target,
            forward: true,
            junction_end: None,
        });
        if source != target {
            incidence[target.index()].push(Incidence {
                edge: edge.id(),
                neighbor: source,
                forward: false,
                junction_end: None,
            });
        }

        let junction = edge
            .weight()
            .junction
            .as_ref()
            .and_then(|link| node_map.get(&link.table).copied());
        if let Some(junction) = junction {
            for (endpoint, end) in [(source, JunctionEnd::Source), (target, JunctionEnd::Target)] {
                incidence[junction.index()].push(Incidence {
                    edge: edge.id(),
                    neighbor: endpoint,
                    forward: true,
                    junction_end: Some(end),
                });
                incidence[endpoint.index()].push(Incidence {
                    edge: edge.id(),
                    neighbor: junction,
                    forward: false,
                    junction_end: Some(end),
                });
            }
        }
    }

    incidence
}

fn collect_dependencies(graph: &Graph, node_map: &HashMap<String, TableId>) -> Vec<Dependency> {
    let mut dependencies = Vec::with_capacity(graph.edge_count());

    for edge in graph.edge_references() {
        let relationship = edge.weight();
        match &relationship.junction {
            Some(link) => {
                // The junction row needs both endpoint rows.
                let Some(&junction) = node_map.get(&link.table) else {
                    continue;
                };
                for endpoint in [edge.source(), edge.target()] {
                    dependencies.push(Dependency {
                        dependent: junction,
                        dependency: endpoint,
                        edge: edge.id(),
                        nullable: false,
                    });
                }
            }
            None => dependencies.push(Dependency {
                dependent: edge.source(),
                dependency: edge.target(),
                edge: edge.id(),
                nullable: relationship.nullable,
            }),
        }
    }

    dependencies
}

/// BLAKE3 over a canonical rendering of nodes then edges.
fn compute_content_hash(graph: &Graph) -> String {
    let mut hasher = blake3::Hasher::new();

    for node in graph.node_weights() {
        hasher.update(b"T\x00");
        hasher.update(node.name.as_bytes());
        hasher.update(if node.junction { b"\x01" } else { b"\x00" });
        for col in &node.columns {
            hasher.update(b"C\x00");
            hasher.update(col.name.as_bytes());
            hasher.update(&[
                u8::from(col.nullable),
                u8::from(col.primary_key),
                u8::from(col.unique),
            ]);
            if let Some(data_type) = &col.data_type {
                hasher.update(data_type.as_bytes());
            }
            hasher.update(b"\x00");
        }
    }

    for edge in graph.edge_references() {
        let rel = edge.weight();
        hasher.update(b"E\x00");
        hasher.update(graph[edge.source()].name.as_bytes());
        hasher.update(b"\x00");
        hasher.update(rel.source_column.as_bytes());
        hasher.update(b"\x00");
        hasher.update(graph[edge.target()].name.as_bytes());
        hasher.update(b"\x00");
        hasher.update(rel.target_column.as_bytes());
        hasher.update(b"\x00");
        hasher.update(rel.cardinality.as_str().as_bytes());
        hasher.update(&[u8::from(rel.nullable)]);
        if let Some(link) = &rel.junction {
            hasher.update(link.table.as_bytes());
        }
        hasher.update(b"\x00");
    }

    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{CardinalityHint, ColumnRecord};

    fn blog() -> SchemaDescription {
        [
            TableRecord::new("users").primary_key("id"),
            TableRecord::new("posts")
                .primary_key("id")
                .column("author_id", false)
                .foreign_key("author_id", "users", "id"),
            TableRecord::new("comments")
                .primary_key("id")
                .column("post_id", false)
                .column("author_id", false)
                .foreign_key("post_id", "posts", "id")
                .foreign_key("author_id", "users", "id"),
        ]
        .into_iter()
        .collect()
    }

    fn store(policy: JunctionPolicy) -> Result<SchemaGraph, SchemaGraphError> {
        let desc: SchemaDescription = [
            TableRecord::new("students").primary_key("id"),
            TableRecord::new("courses").primary_key("id"),
            TableRecord::new("enrollments")
                .column("student_id", false)
                .column("course_id", false)
                .foreign_key("student_id", "students", "id")
                .foreign_key("course_id", "courses", "id")
                .as_junction(),
        ]
        .into_iter()
        .collect();
        SchemaGraph::build_with(
            &desc,
            &BuildConfig {
                junction_policy: policy,
            },
        )
    }

    #[test]
    fn blog_builds_one_node_per_table() {
        let graph = SchemaGraph::build(&blog()).expect("build");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn edge_sequence_follows_declaration_order() {
        let graph = SchemaGraph::build(&blog()).expect("build");
        let labels: Vec<String> = graph.edges().map(|e| e.label()).collect();
        assert_eq!(
            labels,
            vec![
                "posts.author_id -> users.id",
                "comments.post_id -> posts.id",
                "comments.author_id -> users.id",
            ]
        );
    }

    #[test]
    fn empty_description_is_rejected() {
        assert_eq!(
            SchemaGraph::build(&SchemaDescription::default()).expect_err("empty"),
            SchemaGraphError::EmptySchema
        );
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let mut desc = blog();
        desc.tables.push(TableRecord::new("posts").primary_key("id"));
        assert_eq!(
            SchemaGraph::build(&desc).expect_err("duplicate"),
            SchemaGraphError::DuplicateTable {
                table: "posts".to_string()
            }
        );
    }

    #[test]
    fn table_without_columns_is_rejected() {
        let desc: SchemaDescription = [TableRecord::new("ghost")].into_iter().collect();
        assert_eq!(
            SchemaGraph::build(&desc).expect_err("no columns"),
            SchemaGraphError::EmptyTable {
                table: "ghost".to_string()
            }
        );
    }

    #[test]
    fn duplicate_column_is_rejected() {
        let desc: SchemaDescription = [TableRecord::new("t").primary_key("id").column("id", true)]
            .into_iter()
            .collect();
        assert_eq!(
            SchemaGraph::build(&desc).expect_err("duplicate column"),
            SchemaGraphError::DuplicateColumn {
                table: "t".to_string(),
                column: "id".to_string()
            }
        );
    }

    #[test]
    fn unknown_target_table_is_unresolved_reference() {
        let mut desc = blog();
        desc.tables[1].foreign_keys[0].target_table = "people".to_string();
        assert_eq!(
            SchemaGraph::build(&desc).expect_err("dangling"),
            SchemaGraphError::UnresolvedReference {
                table: "posts".to_string(),
                column: "author_id".to_string(),
                target_table: "people".to_string(),
            }
        );
    }

    #[test]
    fn undeclared_source_column_is_unresolved_column() {
        let mut desc = blog();
        desc.tables[1].foreign_keys[0].column = "writer_id".to_string();
        assert_eq!(
            SchemaGraph::build(&desc).expect_err("bad source column"),
            SchemaGraphError::UnresolvedColumn {
                table: "posts".to_string(),
                owner: "posts".to_string(),
                column: "writer_id".to_string(),
            }
        );
    }

    #[test]
    fn undeclared_target_column_is_unresolved_column() {
        let mut desc = blog();
        desc.tables[2].foreign_keys[1].target_column = "uuid".to_string();
        assert_eq!(
            SchemaGraph::build(&desc).expect_err("bad target column"),
            SchemaGraphError::UnresolvedColumn {
                table: "comments".to_string(),
                owner: "users".to_string(),
                column: "uuid".to_string(),
            }
        );
    }

    #[test]
    fn forward_references_resolve() {
        // posts is declared before users.
        let desc: SchemaDescription = [
            TableRecord::new("posts")
                .primary_key("id")
                .column("author_id", false)
                .foreign_key("author_id", "users", "id"),
            TableRecord::new("users").primary_key("id"),
        ]
        .into_iter()
        .collect();
        let graph = SchemaGraph::build(&desc).expect("build");
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn unique_or_sole_pk_foreign_key_is_one_to_one() {
        let desc: SchemaDescription = [
            TableRecord::new("users").primary_key("id"),
            TableRecord::new("profiles")
                .primary_key("user_id")
                .foreign_key("user_id", "users", "id"),
            TableRecord::new("passports")
                .primary_key("id")
                .unique_column("holder_id", false)
                .foreign_key("holder_id", "users", "id"),
            TableRecord::new("logins")
                .primary_key("id")
                .column("user_id", false)
                .foreign_key("user_id", "users", "id"),
        ]
        .into_iter()
        .collect();
        let graph = SchemaGraph::build(&desc).expect("build");

        let card = |table: &str, column: &str| {
            graph
                .find_edge(table, column)
                .map(|e| e.cardinality())
                .expect("edge exists")
        };
        assert_eq!(card("profiles", "user_id"), Cardinality::OneToOne);
        assert_eq!(card("passports", "holder_id"), Cardinality::OneToOne);
        assert_eq!(card("logins", "user_id"), Cardinality::OneToMany);
    }

    #[test]
    fn adapter_hint_overrides_inference() {
        let mut desc = blog();
        desc.tables[1].foreign_keys[0].cardinality = Some(CardinalityHint::OneToOne);
        let graph = SchemaGraph::build(&desc).expect("build");
        assert_eq!(
            graph.find_edge("posts", "author_id").map(|e| e.cardinality()),
            Some(Cardinality::OneToOne)
        );
    }

    #[test]
    fn nullability_defaults_to_column_and_can_be_overridden() {
        let desc: SchemaDescription = [
            TableRecord::new("users").primary_key("id"),
            TableRecord::new("tickets")
                .primary_key("id")
                .column("assignee_id", true)
                .column("reporter_id", true)
                .foreign_key("assignee_id", "users", "id")
                .foreign_key("reporter_id", "users", "id"),
        ]
        .into_iter()
        .collect();
        let mut desc = desc;
        desc.tables[1].foreign_keys[1].nullable = Some(false);

        let graph = SchemaGraph::build(&desc).expect("build");
        assert!(graph.find_edge("tickets", "assignee_id").expect("edge").is_nullable());
        assert!(!graph.find_edge("tickets", "reporter_id").expect("edge").is_nullable());
    }

    #[test]
    fn self_reference_is_permitted() {
        let desc: SchemaDescription = [TableRecord::new("employees")
            .primary_key("id")
            .column("manager_id", true)
            .foreign_key("manager_id", "employees", "id")]
        .into_iter()
        .collect();
        let graph = SchemaGraph::build(&desc).expect("build");
        let edge = graph.edges().next().expect("self edge");
        assert!(edge.is_self_referencing());

        let id = graph.table_id("employees").expect("node");
        assert_eq!(graph.incident(id).len(), 1);
    }

    #[test]
    fn collapse_policy_emits_single_many_to_many_edge() {
        let graph = store(JunctionPolicy::Collapse).expect("build");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);

        let edge = graph.edges().next().expect("m:n edge");
        assert_eq!(edge.cardinality(), Cardinality::ManyToMany);
        assert_eq!(edge.source.name, "students");
        assert_eq!(edge.target.name, "courses");
        let link = edge.relationship.junction.as_ref().expect("junction link");
        assert_eq!(link.table, "enrollments");
        assert_eq!(link.source_column, "student_id");
        assert_eq!(link.target_column, "course_id");

        assert!(graph.junction("enrollments").is_some());

        // Junction depends on both endpoints.
        let junction = graph.table_id("enrollments").expect("junction");
        let deps: Vec<_> = graph
            .dependencies()
            .iter()
            .map(|d| (d.dependent, d.dependency))
            .collect();
        assert_eq!(
            deps,
            vec![
                (junction, graph.table_id("students").expect("students")),
                (junction, graph.table_id("courses").expect("courses")),
            ]
        );
    }

    #[test]
    fn expose_policy_keeps_junction_foreign_keys() {
        let graph = store(JunctionPolicy::Expose).expect("build");
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges().all(|e| e.cardinality() == Cardinality::OneToMany));
        assert!(graph.junction("enrollments").is_some());
    }

    #[test]
    fn junction_with_nullable_key_is_invalid() {
        let desc: SchemaDescription = [
            TableRecord::new("a").primary_key("id"),
            TableRecord::new("b").primary_key("id"),
            TableRecord::new("a_b")
                .column("a_id", false)
                .column("b_id", true)
                .foreign_key("a_id", "a", "id")
                .foreign_key("b_id", "b", "id")
                .as_junction(),
        ]
        .into_iter()
        .collect();
        let err = SchemaGraph::build(&desc).expect_err("nullable junction key");
        assert!(matches!(
            err,
            SchemaGraphError::InvalidJunction { ref table, .. } if table == "a_b"
        ));
    }

    #[test]
    fn junction_with_wrong_key_count_is_invalid() {
        let desc: SchemaDescription = [
            TableRecord::new("a").primary_key("id"),
            TableRecord::new("lonely")
                .column("a_id", false)
                .foreign_key("a_id", "a", "id")
                .as_junction(),
        ]
        .into_iter()
        .collect();
        let err = SchemaGraph::build(&desc).expect_err("one key");
        assert_eq!(
            err.to_string(),
            "junction table `lonely` is invalid: expected exactly 2 foreign keys, found 1"
        );
    }

    #[test]
    fn junction_referencing_one_table_twice_is_invalid() {
        let desc: SchemaDescription = [
            TableRecord::new("users").primary_key("id"),
            TableRecord::new("friendships")
                .column("left_id", false)
                .column("right_id", false)
                .foreign_key("left_id", "users", "id")
                .foreign_key("right_id", "users", "id")
                .as_junction(),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            SchemaGraph::build(&desc),
            Err(SchemaGraphError::InvalidJunction { .. })
        ));
        // Exposing it is fine.
        let graph = SchemaGraph::build_with(
            &desc,
            &BuildConfig {
                junction_policy: JunctionPolicy::Expose,
            },
        )
        .expect("expose");
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn resolution_errors_win_over_junction_shape() {
        let desc: SchemaDescription = [
            TableRecord::new("a").primary_key("id"),
            TableRecord::new("a_x")
                .column("a_id", false)
                .foreign_key("a_id", "a", "id")
                .as_junction(),
            TableRecord::new("later")
                .column("x_id", false)
                .foreign_key("x_id", "missing", "id"),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            SchemaGraph::build(&desc),
            Err(SchemaGraphError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn content_hash_is_stable_and_tracks_changes() {
        let a = SchemaGraph::build(&blog()).expect("build");
        let b = SchemaGraph::build(&blog()).expect("build");
        assert_eq!(a.content_hash(), b.content_hash());

        let mut changed = blog();
        changed.tables[0].columns.push(ColumnRecord {
            name: "email".to_string(),
            nullable: false,
            is_primary_key: false,
            unique: true,
            data_type: Some("TEXT".to_string()),
        });
        let c = SchemaGraph::build(&changed).expect("build");
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
