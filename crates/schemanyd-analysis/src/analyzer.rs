//! Query façade: one built graph plus its configuration behind a stable API.
//!
//! A [`SchemaAnalyzer`] is cheap to clone; clones share the same immutable
//! graph, so population and reporting workers can query it concurrently.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use schemanyd_core::config::resolve_config;
use schemanyd_core::{GraphConfig, SchemaDescription, SchemaGraph, SchemaGraphError, TableNode};
use serde::Serialize;
use tracing::{info, instrument};

use crate::cycles::{self, Cycle, CycleKind};
use crate::hubs::{Hub, identify_hubs};
use crate::order::{self, InsertionPlan, OrderingError};
use crate::path::{self, PathError, PathStep};
use crate::stats::GraphStats;

#[derive(Debug, Clone)]
pub struct SchemaAnalyzer {
    graph: Arc<SchemaGraph>,
    config: GraphConfig,
}

/// Whether the schema can be populated, and how.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsertionOutcome {
    Ordered { plan: InsertionPlan },
    Blocked { cycle: Cycle },
}

/// Everything a reporting collaborator shows about one schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaReport {
    pub content_hash: String,
    pub stats: GraphStats,
    pub cycles: Vec<Cycle>,
    pub cyclic_components: Vec<Vec<String>>,
    pub insertion: InsertionOutcome,
    pub hubs: Vec<Hub>,
}

impl SchemaReport {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub const fn is_populatable(&self) -> bool {
        matches!(self.insertion, InsertionOutcome::Ordered { .. })
    }
}

impl SchemaAnalyzer {
    /// Build the graph from `desc` under `config`.
    ///
    /// # Errors
    ///
    /// Returns the first construction error; no analyzer is produced.
    #[instrument(skip_all, fields(tables = desc.tables.len()))]
    pub fn new(desc: &SchemaDescription, config: GraphConfig) -> Result<Self, SchemaGraphError> {
        let graph = SchemaGraph::build_with(desc, &config.build)?;
        Ok(Self {
            graph: Arc::new(graph),
            config,
        })
    }

    /// [`SchemaAnalyzer::new`] with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns the first construction error.
    pub fn from_description(desc: &SchemaDescription) -> Result<Self, SchemaGraphError> {
        Self::new(desc, GraphConfig::default())
    }

    /// Load a description file (JSON or YAML) and build it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the schema
    /// is invalid.
    pub fn from_file(path: &Path, config: GraphConfig) -> Result<Self> {
        let desc = SchemaDescription::load(path)?;
        Self::new(&desc, config)
            .with_context(|| format!("failed to build schema graph from {}", path.display()))
    }

    /// Resolve `schemanyd.toml` (plus environment overrides) in
    /// `project_root`, then load `description` with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the description is invalid.
    pub fn open(project_root: &Path, description: &Path) -> Result<Self> {
        let config = resolve_config(project_root)?;
        Self::from_file(description, config)
    }

    /// Wrap an already built graph.
    #[must_use]
    pub fn from_graph(graph: impl Into<Arc<SchemaGraph>>, config: GraphConfig) -> Self {
        Self {
            graph: graph.into(),
            config,
        }
    }

    #[must_use]
    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// A shared handle to the graph.
    #[must_use]
    pub fn shared_graph(&self) -> Arc<SchemaGraph> {
        Arc::clone(&self.graph)
    }

    #[must_use]
    pub const fn config(&self) -> &GraphConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableNode> {
        self.graph.table(name)
    }

    /// # Errors
    ///
    /// See [`path::shortest_path`].
    pub fn shortest_path(&self, from: &str, to: &str) -> Result<Vec<PathStep<'_>>, PathError> {
        path::shortest_path(&self.graph, from, to)
    }

    /// # Errors
    ///
    /// See [`path::join_path`].
    pub fn join_path<S: AsRef<str>>(&self, tables: &[S]) -> Result<Vec<PathStep<'_>>, PathError> {
        path::join_path(&self.graph, tables)
    }

    #[must_use]
    pub fn find_cycles(&self) -> Vec<Cycle> {
        cycles::find_cycles(&self.graph)
    }

    #[must_use]
    pub fn cyclic_components(&self) -> Vec<Vec<String>> {
        cycles::cyclic_components(&self.graph)
    }

    /// # Errors
    ///
    /// See [`order::insertion_order`].
    pub fn insertion_order(&self) -> Result<Vec<&TableNode>, OrderingError> {
        order::insertion_order(&self.graph)
    }

    /// # Errors
    ///
    /// See [`order::insertion_plan`].
    pub fn insertion_plan(&self) -> Result<InsertionPlan, OrderingError> {
        order::insertion_plan(&self.graph)
    }

    /// # Errors
    ///
    /// See [`order::insertion_layers`].
    pub fn insertion_layers(&self) -> Result<Vec<Vec<String>>, OrderingError> {
        order::insertion_layers(&self.graph)
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats::from_graph(&self.graph)
    }

    /// Hubs under the configured thresholds.
    #[must_use]
    pub fn hubs(&self) -> Vec<Hub> {
        identify_hubs(&self.graph, &self.config.analysis)
    }

    #[must_use]
    #[instrument(skip_all, fields(hash = %self.graph.content_hash()))]
    pub fn report(&self) -> SchemaReport {
        let insertion = match order::insertion_plan(&self.graph) {
            Ok(plan) => InsertionOutcome::Ordered { plan },
            Err(OrderingError::CyclicDependency { cycle }) => InsertionOutcome::Blocked { cycle },
        };
        let cycles = self.find_cycles();
        info!(
            cycles = cycles.len(),
            hard = cycles.iter().filter(|c| c.kind == CycleKind::Hard).count(),
            populatable = matches!(insertion, InsertionOutcome::Ordered { .. }),
            "schema report generated"
        );

        SchemaReport {
            content_hash: self.graph.content_hash().to_string(),
            stats: self.stats(),
            cycles,
            cyclic_components: self.cyclic_components(),
            insertion,
            hubs: self.hubs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemanyd_core::{AnalysisConfig, JunctionPolicy, TableRecord};

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

    #[test]
    fn analyzer_answers_every_query() {
        let analyzer = SchemaAnalyzer::from_description(&blog()).expect("valid");
        assert_eq!(analyzer.graph().node_count(), 3);
        assert!(analyzer.table("posts").is_some());

        let path = analyzer.shortest_path("comments", "users").expect("connected");
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].join_condition(), "comments.author_id = users.id");

        let order: Vec<&str> = analyzer
            .insertion_order()
            .expect("acyclic")
            .into_iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(order, vec!["users", "posts", "comments"]);
        assert!(analyzer.find_cycles().is_empty());
        assert_eq!(analyzer.insertion_layers().expect("acyclic").len(), 3);
        assert_eq!(analyzer.stats().relationship_count, 3);
    }

    #[test]
    fn construction_errors_surface_unchanged() {
        let mut desc = blog();
        desc.tables[1] = desc.tables[1]
            .clone()
            .column("team_id", true)
            .foreign_key("team_id", "teams", "id");
        let err = SchemaAnalyzer::from_description(&desc).expect_err("unknown table");
        assert!(matches!(
            err,
            SchemaGraphError::UnresolvedReference { ref target_table, .. }
                if target_table == "teams"
        ));
    }

    #[test]
    fn hubs_follow_configured_thresholds() {
        let config = GraphConfig {
            analysis: AnalysisConfig {
                hub_min_degree: 2,
                hub_limit: 1,
            },
            ..GraphConfig::default()
        };
        let analyzer = SchemaAnalyzer::new(&blog(), config).expect("valid");
        let hubs = analyzer.hubs();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0].table, "users");
    }

    #[test]
    fn junction_policy_comes_from_config() {
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

        let collapsed = SchemaAnalyzer::from_description(&desc).expect("valid");
        assert_eq!(collapsed.graph().edge_count(), 1);

        let mut config = GraphConfig::default();
        config.build.junction_policy = JunctionPolicy::Expose;
        let exposed = SchemaAnalyzer::new(&desc, config).expect("valid");
        assert_eq!(exposed.graph().edge_count(), 2);
    }

    #[test]
    fn report_marks_blocking_cycle() {
        let desc: SchemaDescription = [
            TableRecord::new("a")
                .primary_key("id")
                .column("b_id", false)
                .foreign_key("b_id", "b", "id"),
            TableRecord::new("b")
                .primary_key("id")
                .column("a_id", false)
                .foreign_key("a_id", "a", "id"),
        ]
        .into_iter()
        .collect();
        let report = SchemaAnalyzer::from_description(&desc).expect("valid").report();

        assert!(!report.is_populatable());
        assert_eq!(report.stats.hard_cycle_count, 1);
        assert_eq!(
            report.cyclic_components,
            vec![vec!["a".to_string(), "b".to_string()]],
        );
        match &report.insertion {
            InsertionOutcome::Blocked { cycle } => assert_eq!(cycle.tables, vec!["a", "b"]),
            InsertionOutcome::Ordered { .. } => panic!("hard cycle must block ordering"),
        }

        let rendered = report.to_json_pretty().expect("serializes");
        let json: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(json["insertion"]["status"], "blocked");
        assert_eq!(json["cycles"][0]["kind"], "hard");
        assert!(json["content_hash"].as_str().is_some_and(|h| h.starts_with("blake3:")));
    }

    #[test]
    fn report_of_populatable_schema() {
        let report = SchemaAnalyzer::from_description(&blog()).expect("valid").report();
        assert!(report.is_populatable());
        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(json["insertion"]["status"], "ordered");
        assert_eq!(
            json["insertion"]["plan"]["order"],
            serde_json::json!(["users", "posts", "comments"])
        );
    }

    #[test]
    fn clones_share_the_graph_across_threads() {
        let analyzer = SchemaAnalyzer::from_description(&blog()).expect("valid");
        let expected: Vec<String> = analyzer
            .shortest_path("comments", "users")
            .expect("connected")
            .iter()
            .map(|step| step.edge.label())
            .collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let worker = analyzer.clone();
                let expected = &expected;
                scope.spawn(move || {
                    let labels: Vec<String> = worker
                        .shortest_path("comments", "users")
                        .expect("connected")
                        .iter()
                        .map(|step| step.edge.label())
                        .collect();
                    assert_eq!(&labels, expected);
                    assert!(worker.insertion_order().is_ok());
                });
            }
        });
        assert_eq!(Arc::strong_count(&analyzer.shared_graph()), 2);
    }

    #[test]
    fn open_reads_config_and_description() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("schemanyd.toml"),
            "[analysis]\nhub_min_degree = 1\nhub_limit = 2\n",
        )
        .expect("write config");
        let schema = dir.path().join("schema.json");
        let text = blog().to_json_pretty().expect("serializes");
        std::fs::write(&schema, text).expect("write schema");

        let analyzer = SchemaAnalyzer::open(dir.path(), &schema).expect("loads");
        assert_eq!(analyzer.config().analysis.hub_limit, 2);
        assert_eq!(analyzer.hubs().len(), 2);
    }

    #[test]
    fn from_file_reports_the_path_on_invalid_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        let schema = dir.path().join("broken.json");
        std::fs::write(&schema, r#"{"tables": []}"#).expect("write schema");
        let err =
            SchemaAnalyzer::from_file(&schema, GraphConfig::default()).expect_err("empty schema");
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
