//! Model error types.

use thiserror::Error;

/// Violations of catalog object invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormationError {
    /// A table or struct declares the same column/member twice.
    #[error("duplicate column `{column}` in `{object}`")]
    DuplicateColumn {
        /// Owning table or struct.
        object: String,
        /// The repeated column name.
        column: String,
    },

    /// A table has no primary key columns.
    #[error("table `{table}` has an empty primary key")]
    EmptyPrimaryKey {
        /// Table name.
        table: String,
    },

    /// A primary key refers to a column the table does not have.
    #[error("primary key column `{column}` not found in table `{table}`")]
    MissingPrimaryKeyColumn {
        /// Table name.
        table: String,
        /// The missing column.
        column: String,
    },

    /// Two constraints of a table share a name.
    #[error("duplicate constraint `{constraint}` in table `{table}`")]
    DuplicateConstraint {
        /// Table name.
        table: String,
        /// The repeated constraint name.
        constraint: String,
    },

    /// A set of data types has no common representation.
    #[error("no common type for: {types}")]
    Incompatible {
        /// The offending types, comma separated.
        types: String,
    },

    /// Catalog (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FormationError {
    fn from(err: serde_json::Error) -> Self {
        FormationError::Serialization(err.to_string())
    }
}
