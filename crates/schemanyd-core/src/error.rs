use std::fmt;

/// Machine-readable error codes shared by every schemanyd failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DescriptionParseError,
    EmptySchema,
    EmptyTable,
    DuplicateTable,
    DuplicateColumn,
    UnresolvedReference,
    UnresolvedColumn,
    InvalidJunction,
    NoSuchTable,
    Unreachable,
    CyclicDependency,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::DescriptionParseError => "E1002",
            Self::EmptySchema => "E2001",
            Self::EmptyTable => "E2002",
            Self::DuplicateTable => "E2003",
            Self::DuplicateColumn => "E2004",
            Self::UnresolvedReference => "E2005",
            Self::UnresolvedColumn => "E2006",
            Self::InvalidJunction => "E2007",
            Self::NoSuchTable => "E3001",
            Self::Unreachable => "E3002",
            Self::CyclicDependency => "E3003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DescriptionParseError => "Schema description parse error",
            Self::EmptySchema => "Schema lists no tables",
            Self::EmptyTable => "Table declares no columns",
            Self::DuplicateTable => "Duplicate table name",
            Self::DuplicateColumn => "Duplicate column name",
            Self::UnresolvedReference => "Foreign key references unknown table",
            Self::UnresolvedColumn => "Foreign key references unknown column",
            Self::InvalidJunction => "Flagged junction table has the wrong shape",
            Self::NoSuchTable => "Table not found",
            Self::Unreachable => "Tables are not connected",
            Self::CyclicDependency => "Hard dependency cycle",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in schemanyd.toml and retry."),
            Self::DescriptionParseError => {
                Some("Check the adapter output against the schema description format.")
            }
            Self::EmptySchema => {
                Some("Point the adapter at a database or metadata object with tables.")
            }
            Self::EmptyTable => Some("Every table must declare at least one column."),
            Self::DuplicateTable | Self::DuplicateColumn => {
                Some("Names must be unique; qualify them with a schema prefix if needed.")
            }
            Self::UnresolvedReference | Self::UnresolvedColumn => {
                Some("Include the referenced table and column in the same description.")
            }
            Self::InvalidJunction => Some(
                "A junction needs exactly two NOT NULL foreign keys to two different tables, \
                 or set junction_policy = \"expose\".",
            ),
            Self::NoSuchTable | Self::Unreachable => None,
            Self::CyclicDependency => {
                Some(
                    "Make one foreign key in the cycle nullable so it can be filled by a later \
                     update.",
                )
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Construction-time failures. Any of these aborts [`SchemaGraph::build`]
/// without producing a graph.
///
/// [`SchemaGraph::build`]: crate::graph::SchemaGraph::build
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaGraphError {
    #[error("schema description lists no tables")]
    EmptySchema,

    #[error("table `{table}` declares no columns")]
    EmptyTable { table: String },

    #[error("table `{table}` is declared more than once")]
    DuplicateTable { table: String },

    #[error("column `{table}.{column}` is declared more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("foreign key `{table}.{column}` references unknown table `{target_table}`")]
    UnresolvedReference {
        table: String,
        column: String,
        target_table: String,
    },

    /// `owner` is the table the missing column was looked up on; it is
    /// `table` for the referencing side and the target for the referenced side.
    #[error("foreign key on `{table}` names column `{owner}.{column}`, which is not declared")]
    UnresolvedColumn {
        table: String,
        owner: String,
        column: String,
    },

    #[error("junction table `{table}` is invalid: {reason}")]
    InvalidJunction { table: String, reason: String },
}

impl SchemaGraphError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptySchema => ErrorCode::EmptySchema,
            Self::EmptyTable { .. } => ErrorCode::EmptyTable,
            Self::DuplicateTable { .. } => ErrorCode::DuplicateTable,
            Self::DuplicateColumn { .. } => ErrorCode::DuplicateColumn,
            Self::UnresolvedReference { .. } => ErrorCode::UnresolvedReference,
            Self::UnresolvedColumn { .. } => ErrorCode::UnresolvedColumn,
            Self::InvalidJunction { .. } => ErrorCode::InvalidJunction,
        }
    }
}
