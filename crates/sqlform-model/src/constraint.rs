//! Table constraints.

use crate::name::QualifiedName;
use serde::{Deserialize, Serialize};

/// Target of a foreign key: a table and the referenced columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintReference {
    /// Referenced table.
    pub table: QualifiedName,
    /// Referenced columns (usually the primary key).
    pub columns: Vec<String>,
}

impl ConstraintReference {
    /// Reference a single column of a table.
    pub fn new(table: QualifiedName, column: impl Into<String>) -> Self {
        Self {
            table,
            columns: vec![column.into()],
        }
    }
}

/// A table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// Uniqueness constraint.
    Unique {
        /// Constraint name.
        name: String,
        /// Columns that must be unique together.
        columns: Vec<String>,
    },
    /// Check constraint.
    Check {
        /// Constraint name.
        name: String,
        /// Boolean SQL predicate.
        predicate: String,
    },
    /// Foreign key constraint.
    ForeignKey {
        /// Constraint name.
        name: String,
        /// Local columns holding the key.
        columns: Vec<String>,
        /// Referenced table and columns.
        reference: ConstraintReference,
    },
    /// Foreign key whose target is one of several tables.
    DiscriminatedForeignKey {
        /// Constraint name.
        name: String,
        /// Local columns holding the key.
        columns: Vec<String>,
        /// Alternative targets, one per union member.
        references: Vec<ConstraintReference>,
    },
}

impl Constraint {
    /// Create a unique constraint on a single column.
    pub fn unique(name: impl Into<String>, column: impl Into<String>) -> Self {
        Constraint::Unique {
            name: name.into(),
            columns: vec![column.into()],
        }
    }

    /// Create a check constraint.
    pub fn check(name: impl Into<String>, predicate: impl Into<String>) -> Self {
        Constraint::Check {
            name: name.into(),
            predicate: predicate.into(),
        }
    }

    /// Create a single-column foreign key.
    pub fn foreign_key(
        name: impl Into<String>,
        column: impl Into<String>,
        reference: ConstraintReference,
    ) -> Self {
        Constraint::ForeignKey {
            name: name.into(),
            columns: vec![column.into()],
            reference,
        }
    }

    /// Create a single-column discriminated foreign key.
    pub fn discriminated(
        name: impl Into<String>,
        column: impl Into<String>,
        references: Vec<ConstraintReference>,
    ) -> Self {
        Constraint::DiscriminatedForeignKey {
            name: name.into(),
            columns: vec![column.into()],
            references,
        }
    }

    /// Get the constraint name.
    pub fn name(&self) -> &str {
        match self {
            Constraint::Unique { name, .. } => name,
            Constraint::Check { name, .. } => name,
            Constraint::ForeignKey { name, .. } => name,
            Constraint::DiscriminatedForeignKey { name, .. } => name,
        }
    }

    /// Check if this is a unique constraint.
    pub fn is_unique(&self) -> bool {
        matches!(self, Constraint::Unique { .. })
    }

    /// Check if this is a check constraint.
    pub fn is_check(&self) -> bool {
        matches!(self, Constraint::Check { .. })
    }

    /// Check if this is a plain foreign key.
    pub fn is_foreign_key(&self) -> bool {
        matches!(self, Constraint::ForeignKey { .. })
    }

    /// Tables this constraint points at.
    pub fn referenced_tables(&self) -> Vec<&QualifiedName> {
        match self {
            Constraint::ForeignKey { reference, .. } => vec![&reference.table],
            Constraint::DiscriminatedForeignKey { references, .. } => {
                references.iter().map(|r| &r.table).collect()
            }
            _ => Vec::new(),
        }
    }
}
