//! Composite and enumeration types.

use crate::data_type::DataType;
use crate::error::FormationError;
use crate::name::QualifiedName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A member of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMember {
    /// Member name.
    pub name: String,
    /// Member data type.
    pub data_type: DataType,
    /// Free-text documentation.
    pub description: Option<String>,
}

impl StructMember {
    /// Create a struct member.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A composite type without identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructType {
    /// Type name.
    pub name: QualifiedName,
    /// Members in declaration order.
    pub members: Vec<StructMember>,
    /// Free-text documentation.
    pub description: Option<String>,
}

impl StructType {
    /// Create a struct type, rejecting repeated member names.
    pub fn new(
        name: QualifiedName,
        members: Vec<StructMember>,
        description: Option<String>,
    ) -> Result<Self, FormationError> {
        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.name.as_str()) {
                return Err(FormationError::DuplicateColumn {
                    object: name.compact(),
                    column: member.name.clone(),
                });
            }
        }

        Ok(Self {
            name,
            members,
            description,
        })
    }

    /// Get a member by name.
    pub fn member(&self, name: &str) -> Option<&StructMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A native SQL enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Type name.
    pub name: QualifiedName,
    /// Labels in declaration order.
    pub values: Vec<String>,
}

impl EnumType {
    /// Create an enumeration type.
    pub fn new(name: QualifiedName, values: Vec<String>) -> Self {
        Self { name, values }
    }
}
