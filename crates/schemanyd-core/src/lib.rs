#![forbid(unsafe_code)]
//! schemanyd-core library.
//!
//! Builds the immutable schema graph from a normalized schema description.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums for graph operations; `anyhow::Result`
//!   for file loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod build;
pub mod config;
pub mod description;
pub mod error;
pub mod graph;
pub mod model;

pub use config::{AnalysisConfig, BuildConfig, GraphConfig, JunctionPolicy};
pub use description::{
    CardinalityHint, ColumnRecord, ForeignKeyRecord, SchemaDescription, TableRecord,
};
pub use error::{ErrorCode, SchemaGraphError};
pub use graph::SchemaGraph;
pub use model::{
    Cardinality, Column, Dependency, EdgeId, Incidence, JunctionEnd, JunctionLink, Relationship,
    RelationshipEdge, TableId, TableNode,
};
