//! Table columns.

use crate::data_type::DataType;
use serde::{Deserialize, Serialize};

/// A column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (unique within its table).
    pub name: String,
    /// Column data type.
    pub data_type: DataType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default value expression, already rendered as SQL.
    pub default: Option<String>,
    /// Whether the value is generated by the database.
    pub identity: bool,
    /// Free-text documentation.
    pub description: Option<String>,
}

impl Column {
    /// Create a column. Identity columns are never nullable.
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
            default: None,
            identity: false,
            description: None,
        }
    }

    /// Mark as an identity column, which also clears nullability and default.
    pub fn with_identity(mut self) -> Self {
        self.identity = true;
        self.nullable = false;
        self.default = None;
        self
    }

    /// Set the default value expression (ignored for identity columns).
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        if !self.identity {
            self.default = Some(default.into());
        }
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
