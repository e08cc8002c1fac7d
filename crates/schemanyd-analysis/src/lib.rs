#![forbid(unsafe_code)]
//! schemanyd-analysis library.
//!
//! Traversal engine over an immutable [`schemanyd_core::SchemaGraph`]:
//! shortest and join paths, circular dependency detection, insertion
//! ordering, structural statistics and hubs, plus the [`SchemaAnalyzer`]
//! façade that bundles them.
//!
//! Every query borrows the graph read-only. Query errors are returned per
//! call and never affect the graph.

pub mod analyzer;
pub mod cycles;
pub mod hubs;
pub mod order;
pub mod path;
pub mod stats;

pub use analyzer::{InsertionOutcome, SchemaAnalyzer, SchemaReport};
pub use cycles::{Cycle, CycleKind, cyclic_components, find_cycles, hard_cycles, soft_cycles};
pub use hubs::{Hub, identify_hubs};
pub use order::{
    DeferredReference, InsertionPlan, OrderingError, insertion_layers, insertion_order,
    insertion_plan,
};
pub use path::{JunctionHop, PathError, PathStep, join_path, shortest_path};
pub use stats::GraphStats;
