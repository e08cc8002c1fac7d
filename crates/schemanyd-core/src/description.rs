//! Normalized schema description: the contract between ingestion adapters and
//! the graph builder.
//!
//! An adapter (SQLAlchemy metadata, Diesel schema, a live `information_schema`
//! scrape, ...) flattens whatever it reads into a [`SchemaDescription`]. The
//! builder never sees the source ORM or database.
//!
//! ## Wire shape
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "users",
//!       "columns": [{ "name": "id", "nullable": false, "is_primary_key": true }]
//!     },
//!     {
//!       "name": "posts",
//!       "columns": [
//!         { "name": "id", "nullable": false, "is_primary_key": true },
//!         { "name": "author_id", "nullable": false }
//!       ],
//!       "foreign_keys": [
//!         { "column": "author_id", "target_table": "users", "target_column": "id" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! The same structure loads from YAML. Field names also accept the camelCase
//! spelling (`isPrimaryKey`, `foreignKeys`, `targetTable`, `targetColumn`)
//! so JavaScript-side adapters can emit their native casing.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::model::Cardinality;

/// Complete, ORM-agnostic description of a relational schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    /// Tables in declaration order. Order is significant: it drives every
    /// deterministic tie-break in the traversal engine.
    #[serde(default)]
    pub tables: Vec<TableRecord>,
}

/// One table as reported by the ingestion adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnRecord>,
    #[serde(default, alias = "foreignKeys")]
    pub foreign_keys: Vec<ForeignKeyRecord>,
    /// Set by adapters that recognize an association (junction) table.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub junction: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
    pub name: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default, alias = "isPrimaryKey")]
    pub is_primary_key: bool,
    /// Column carries a single-column UNIQUE constraint.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    #[serde(default, alias = "dataType", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

/// A single-column foreign key declared on the enclosing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRecord {
    /// Referencing column on the enclosing table.
    pub column: String,
    #[serde(alias = "targetTable")]
    pub target_table: String,
    #[serde(alias = "targetColumn")]
    pub target_column: String,
    /// Whether the relationship is optional. Falls back to the referencing
    /// column's nullability when the adapter does not say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Cardinality hint from the adapter; overrides inference when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<CardinalityHint>,
}

/// Cardinality an adapter may assert for a plain foreign key.
///
/// Many-to-many is never a property of a single foreign key; it is declared
/// by flagging the junction table instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardinalityHint {
    OneToOne,
    OneToMany,
}

impl From<CardinalityHint> for Cardinality {
    fn from(hint: CardinalityHint) -> Self {
        match hint {
            CardinalityHint::OneToOne => Self::OneToOne,
            CardinalityHint::OneToMany => Self::OneToMany,
        }
    }
}

const fn default_true() -> bool {
    true
}

impl SchemaDescription {
    /// Parse a description from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error for malformed input.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Parse a description from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_yaml` error for malformed input.
    pub fn from_yaml(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    /// Load a description file. `.yaml`/`.yml` files are read as YAML,
    /// everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
            });

        let code = ErrorCode::DescriptionParseError;
        let context = || format!("{code}: failed to parse {}", path.display());
        if is_yaml {
            Self::from_yaml(&content).with_context(context)
        } else {
            Self::from_json(&content).with_context(context)
        }
    }

    /// Serialize the description as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Serialization of this type cannot fail in practice; the error is
    /// propagated from `serde_json` for completeness.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Total number of foreign-key declarations across all tables.
    #[must_use]
    pub fn foreign_key_count(&self) -> usize {
        self.tables.iter().map(|t| t.foreign_keys.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

impl TableRecord {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            junction: false,
        }
    }

    /// Add a non-nullable primary key column.
    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.columns.push(ColumnRecord {
            name: name.into(),
            nullable: false,
            is_primary_key: true,
            unique: false,
            data_type: None,
        });
        self
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>, nullable: bool) -> Self {
        self.columns.push(ColumnRecord {
            name: name.into(),
            nullable,
            is_primary_key: false,
            unique: false,
            data_type: None,
        });
        self
    }

    #[must_use]
    pub fn unique_column(mut self, name: impl Into<String>, nullable: bool) -> Self {
        self.columns.push(ColumnRecord {
            name: name.into(),
            nullable,
            is_primary_key: false,
            unique: true,
            data_type: None,
        });
        self
    }

    /// Declare `column -> target_table.target_column`, inheriting nullability
    /// from the column.
    #[must_use]
    pub fn foreign_key(
        mut self,
        column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKeyRecord {
            column: column.into(),
            target_table: target_table.into(),
            target_column: target_column.into(),
            nullable: None,
            cardinality: None,
        });
        self
    }

    #[must_use]
    pub const fn as_junction(mut self) -> Self {
        self.junction = true;
        self
    }
}

impl FromIterator<TableRecord> for SchemaDescription {
    fn from_iter<I: IntoIterator<Item = TableRecord>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
