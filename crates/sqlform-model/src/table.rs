//! Tables.

use crate::column::Column;
use crate::constraint::Constraint;
use crate::error::FormationError;
use crate::name::QualifiedName;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A table with an identity (primary key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: QualifiedName,
    /// Columns keyed by name, in declaration order.
    pub columns: IndexMap<String, Column>,
    /// Primary key column names.
    pub primary_key: Vec<String>,
    /// Constraints other than the primary key.
    pub constraints: Vec<Constraint>,
    /// Free-text documentation.
    pub description: Option<String>,
}

impl Table {
    /// Create a table, validating column, key and constraint invariants.
    pub fn new(
        name: QualifiedName,
        columns: Vec<Column>,
        primary_key: Vec<String>,
        constraints: Vec<Constraint>,
        description: Option<String>,
    ) -> Result<Self, FormationError> {
        let mut by_name = IndexMap::with_capacity(columns.len());
        for column in columns {
            if by_name.contains_key(&column.name) {
                return Err(FormationError::DuplicateColumn {
                    object: name.compact(),
                    column: column.name,
                });
            }
            by_name.insert(column.name.clone(), column);
        }

        if primary_key.is_empty() {
            return Err(FormationError::EmptyPrimaryKey {
                table: name.compact(),
            });
        }
        for key in &primary_key {
            if !by_name.contains_key(key) {
                return Err(FormationError::MissingPrimaryKeyColumn {
                    table: name.compact(),
                    column: key.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for constraint in &constraints {
            if !seen.insert(constraint.name()) {
                return Err(FormationError::DuplicateConstraint {
                    table: name.compact(),
                    constraint: constraint.name().to_string(),
                });
            }
        }

        Ok(Self {
            name,
            columns: by_name,
            primary_key,
            constraints,
            description,
        })
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Columns that are not part of the primary key.
    pub fn value_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .values()
            .filter(|c| !self.primary_key.contains(&c.name))
    }

    /// Get a constraint by name.
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name() == name)
    }

    /// All foreign-key style constraints (plain and discriminated).
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.referenced_tables().is_empty())
    }
}
