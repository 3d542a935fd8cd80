//! Namespaces and the catalog.

use crate::error::FormationError;
use crate::name::QualifiedName;
use crate::structure::{EnumType, StructType};
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// A named grouping of enums, structs and tables (a schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace name; empty is the default namespace.
    pub name: String,
    /// Native enumeration types.
    pub enums: Vec<EnumType>,
    /// Composite types, dependencies first.
    pub structs: Vec<StructType>,
    /// Tables.
    pub tables: Vec<Table>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enums: Vec::new(),
            structs: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Check if this is the default namespace.
    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }

    /// Check if the namespace holds no objects.
    pub fn is_empty(&self) -> bool {
        self.enums.is_empty() && self.structs.is_empty() && self.tables.is_empty()
    }

    /// Get a table by local name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.name == name)
    }

    /// Get a struct type by local name.
    pub fn struct_type(&self, name: &str) -> Option<&StructType> {
        self.structs.iter().find(|s| s.name.name == name)
    }

    /// Get an enum type by local name.
    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.iter().find(|e| e.name.name == name)
    }
}

/// The full set of namespaces produced by one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Namespaces in first-seen order.
    pub namespaces: Vec<Namespace>,
}

impl Catalog {
    /// Create a catalog from namespaces.
    pub fn new(namespaces: Vec<Namespace>) -> Self {
        Self { namespaces }
    }

    /// Get a namespace by name.
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|n| n.name == name)
    }

    /// Iterate over all tables in catalog order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.namespaces.iter().flat_map(|n| n.tables.iter())
    }

    /// Iterate over all struct types in catalog order.
    pub fn structs(&self) -> impl Iterator<Item = &StructType> {
        self.namespaces.iter().flat_map(|n| n.structs.iter())
    }

    /// Iterate over all enum types in catalog order.
    pub fn enums(&self) -> impl Iterator<Item = &EnumType> {
        self.namespaces.iter().flat_map(|n| n.enums.iter())
    }

    /// Find a table by its qualified name.
    pub fn table(&self, name: &QualifiedName) -> Option<&Table> {
        self.tables().find(|t| &t.name == name)
    }

    /// Find a table by its unqualified object name.
    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables().find(|t| t.name.name == name)
    }

    /// Serialize to the canonical JSON form.
    pub fn to_json(&self) -> Result<String, FormationError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, FormationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Hex-encoded BLAKE3 digest of the canonical JSON form.
    ///
    /// Two catalogs with identical structure and ordering share a fingerprint.
    pub fn fingerprint(&self) -> Result<String, FormationError> {
        let json = self.to_json()?;
        Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
    }
}
