//! Hub identification: the tables most other tables hang off.
//!
//! Degree counts relationship edges, not distinct neighbours, so a table
//! referenced twice by the same table (author and editor, say) scores two.
//! A collapsed junction counts its two links as outbound. The tables it
//! links see only the many-to-many edge, not a second edge back to it.

use schemanyd_core::{AnalysisConfig, SchemaGraph};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hub {
    pub table: String,
    /// Edges referencing this table.
    pub inbound: usize,
    /// Edges this table declares. A self-reference counts here only.
    pub outbound: usize,
    pub degree: usize,
}

/// Tables with degree ≥ `hub_min_degree`, by degree descending then
/// declaration order, at most `hub_limit` of them.
#[must_use]
pub fn identify_hubs(graph: &SchemaGraph, config: &AnalysisConfig) -> Vec<Hub> {
    let mut hubs: Vec<(usize, Hub)> = graph
        .table_ids()
        .filter_map(|id| {
            let (degree, outbound) = graph
                .incident(id)
                .iter()
                .filter(|i| i.counts_toward_degree())
                .fold((0, 0), |(degree, outbound), i| {
                    (degree + 1, outbound + usize::from(i.forward))
                });
            if degree < config.hub_min_degree {
                return None;
            }
            Some((
                id.index(),
                Hub {
                    table: graph.table_name(id),
                    inbound: degree - outbound,
                    outbound,
                    degree,
                },
            ))
        })
        .collect();

    hubs.sort_by(|(pos_a, a), (pos_b, b)| b.degree.cmp(&a.degree).then(pos_a.cmp(pos_b)));
    hubs.truncate(config.hub_limit);

    debug!(hubs = hubs.len(), min_degree = config.hub_min_degree, "hubs identified");
    hubs.into_iter().map(|(_, hub)| hub).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemanyd_core::{SchemaDescription, TableRecord};

    fn graph() -> SchemaGraph {
        let desc: SchemaDescription = [
            TableRecord::new("users").primary_key("id"),
            TableRecord::new("orgs").primary_key("id"),
            TableRecord::new("posts")
                .primary_key("id")
                .column("author_id", false)
                .column("org_id", false)
                .foreign_key("author_id", "users", "id")
                .foreign_key("org_id", "orgs", "id"),
            TableRecord::new("comments")
                .primary_key("id")
                .column("post_id", false)
                .column("author_id", false)
                .column("org_id", false)
                .foreign_key("post_id", "posts", "id")
                .foreign_key("author_id", "users", "id")
                .foreign_key("org_id", "orgs", "id"),
            TableRecord::new("likes")
                .primary_key("id")
                .column("user_id", false)
                .column("post_id", false)
                .foreign_key("user_id", "users", "id")
                .foreign_key("post_id", "posts", "id"),
        ]
        .into_iter()
        .collect();
        SchemaGraph::build(&desc).expect("valid schema")
    }

    #[test]
    fn hubs_ranked_by_degree_then_declaration() {
        let hubs = identify_hubs(&graph(), &AnalysisConfig::default());
        let ranked: Vec<(&str, usize)> =
            hubs.iter().map(|h| (h.table.as_str(), h.degree)).collect();
        // users 3 in; posts 2 out + 2 in; comments 3 out; orgs 2 in.
        assert_eq!(ranked, vec![("posts", 4), ("users", 3), ("comments", 3)]);
        assert_eq!(hubs[0].inbound, 2);
        assert_eq!(hubs[0].outbound, 2);
    }

    #[test]
    fn limit_and_threshold_apply() {
        let config = AnalysisConfig {
            hub_min_degree: 2,
            hub_limit: 4,
        };
        let hubs = identify_hubs(&graph(), &config);
        let names: Vec<&str> = hubs.iter().map(|h| h.table.as_str()).collect();
        assert_eq!(names, vec!["posts", "users", "comments", "orgs"]);

        let none = identify_hubs(
            &graph(),
            &AnalysisConfig {
                hub_min_degree: 10,
                hub_limit: 10,
            },
        );
        assert!(none.is_empty());
    }

    #[test]
    fn collapsed_junction_counts_its_links() {
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
        let graph = SchemaGraph::build(&desc).expect("valid schema");
        let config = AnalysisConfig {
            hub_min_degree: 1,
            hub_limit: 10,
        };

        let hubs = identify_hubs(&graph, &config);
        let enrollments = hubs
            .iter()
            .find(|h| h.table == "enrollments")
            .expect("junction");
        assert_eq!((enrollments.outbound, enrollments.inbound), (2, 0));
        // Each endpoint has only the many-to-many edge.
        let students = hubs
            .iter()
            .find(|h| h.table == "students")
            .expect("students");
        assert_eq!(students.degree, 1);
        assert_eq!(students.outbound, 1);
    }
}
