//! Project configuration (`schemanyd.toml`).
//!
//! ```toml
//! [build]
//! junction_policy = "collapse"   # or "expose"
//!
//! [analysis]
//! hub_min_degree = 3
//! hub_limit = 10
//! ```
//!
//! Every key is optional. `SCHEMANYD_JUNCTION_POLICY` overrides the file's
//! junction policy when set.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::ErrorCode;

pub const CONFIG_FILE_NAME: &str = "schemanyd.toml";
pub const JUNCTION_POLICY_ENV: &str = "SCHEMANYD_JUNCTION_POLICY";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub junction_policy: JunctionPolicy,
}

/// How a flagged junction table shows up in the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionPolicy {
    /// One many-to-many edge between the two referenced tables; the junction
    /// stays a node reachable only by direct lookup.
    #[default]
    Collapse,
    /// The junction's foreign keys become ordinary one-to-many edges.
    Expose,
}

impl JunctionPolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "collapse" | "collapsed" => Some(Self::Collapse),
            "expose" | "exposed" => Some(Self::Expose),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum number of incident relationships for a table to count as a hub.
    #[serde(default = "default_hub_min_degree")]
    pub hub_min_degree: usize,
    /// Maximum number of hubs reported.
    #[serde(default = "default_hub_limit")]
    pub hub_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hub_min_degree: default_hub_min_degree(),
            hub_limit: default_hub_limit(),
        }
    }
}

const fn default_hub_min_degree() -> usize {
    3
}

const fn default_hub_limit() -> usize {
    10
}

/// Load `schemanyd.toml` from `project_root`, or defaults if it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(project_root: &Path) -> Result<GraphConfig> {
    let path = project_root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(GraphConfig::default());
    }
    load_config_file(&path)
}

/// Load an explicit config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<GraphConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<GraphConfig>(&content).with_context(|| {
        format!("{}: failed to parse {}", ErrorCode::ConfigParseError, path.display())
    })
}

/// Load the project config and apply environment overrides.
///
/// # Errors
///
/// Returns an error if the config file is malformed or
/// `SCHEMANYD_JUNCTION_POLICY` holds an unknown value.
pub fn resolve_config(project_root: &Path) -> Result<GraphConfig> {
    let mut config = load_config(project_root)?;
    config.build.junction_policy =
        resolve_junction_policy(config.build.junction_policy, env::var(JUNCTION_POLICY_ENV).ok())?;
    Ok(config)
}

fn resolve_junction_policy(
    from_file: JunctionPolicy,
    env_value: Option<String>,
) -> Result<JunctionPolicy> {
    let Some(raw) = env_value else {
        return Ok(from_file);
    };
    if raw.trim().is_empty() {
        return Ok(from_file);
    }
    match JunctionPolicy::parse(&raw) {
        Some(policy) => Ok(policy),
        None => bail!(
            "Invalid {JUNCTION_POLICY_ENV} value `{raw}` (expected `collapse` or `expose`)"
        ),
    }
}
