//! Entity, struct and enum definitions.
//!
//! These are what the converter consumes: an explicit description of each
//! user type with its fields, defaults, flags and documentation.

use crate::native::{LiteralValue, NativeType};
use sqlform_model::Constant;

/// Default value declared for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Explicit null; produces no default clause.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
}

impl DefaultValue {
    /// SQL constant for the default clause, if any.
    pub fn to_constant(&self) -> Option<Constant> {
        match self {
            DefaultValue::Null => None,
            DefaultValue::Bool(b) => Some(Constant::Bool(*b)),
            DefaultValue::Int(i) => Some(Constant::Int(*i)),
            DefaultValue::Float(v) => Some(Constant::Float(*v)),
            DefaultValue::String(s) => Some(Constant::String(s.clone())),
        }
    }
}

/// A field definition within an entity or struct.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Declared type, without the optional wrapper.
    pub field_type: NativeType,
    /// Whether the field may be absent.
    pub nullable: bool,
    /// Default value if not provided.
    pub default: Option<DefaultValue>,
    /// Whether the value is generated by the database.
    pub identity: bool,
    /// Whether values must be unique across rows.
    pub unique: bool,
    /// Free-text documentation.
    pub description: Option<String>,
}

impl FieldDef {
    /// Create a new required field.
    pub fn new(name: impl Into<String>, field_type: NativeType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            default: None,
            identity: false,
            unique: false,
            description: None,
        }
    }

    /// Create an optional (nullable) field.
    pub fn optional(name: impl Into<String>, field_type: NativeType) -> Self {
        Self {
            nullable: true,
            ..Self::new(name, field_type)
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Mark as an identity (auto-generated) field.
    pub fn with_identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Mark as unique.
    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this field has a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// An entity: a record type with a primary key; becomes a table.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDef {
    /// Entity name (unique within a registry).
    pub name: String,
    /// Defining module.
    pub module: String,
    /// Name of the primary key field.
    pub primary_key: String,
    /// Field definitions in declaration order.
    pub fields: Vec<FieldDef>,
    /// Free-text documentation.
    pub description: Option<String>,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(
        module: impl Into<String>,
        name: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            primary_key: primary_key.into(),
            fields: Vec::new(),
            description: None,
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get the primary key field definition.
    pub fn get_primary_key_field(&self) -> Option<&FieldDef> {
        self.get_field(&self.primary_key)
    }
}

/// A composite record type without a primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    /// Struct name (unique within a registry).
    pub name: String,
    /// Defining module.
    pub module: String,
    /// Field definitions in declaration order.
    pub fields: Vec<FieldDef>,
    /// Free-text documentation.
    pub description: Option<String>,
}

impl StructDef {
    /// Create a new struct definition.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            fields: Vec::new(),
            description: None,
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An enumeration with labelled values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Enum name (unique within a registry).
    pub name: String,
    /// Defining module.
    pub module: String,
    /// Members as `(label, value)` in declaration order.
    pub members: Vec<(String, LiteralValue)>,
    /// Documentation.
    pub description: Option<String>,
}

impl EnumDef {
    /// Create an enumeration whose values equal their labels.
    pub fn new<S: Into<String>>(
        module: impl Into<String>,
        name: impl Into<String>,
        labels: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            members: labels
                .into_iter()
                .map(|label| {
                    let label = label.into();
                    (label.clone(), LiteralValue::Str(label))
                })
                .collect(),
            description: None,
        }
    }

    /// Create an enumeration with explicit member values.
    pub fn with_values(
        module: impl Into<String>,
        name: impl Into<String>,
        members: Vec<(String, LiteralValue)>,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            members,
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Member values rendered as strings.
    pub fn value_labels(&self) -> Vec<String> {
        self.members.iter().map(|(_, v)| v.label()).collect()
    }

    /// Number of distinct values.
    pub fn distinct_value_count(&self) -> usize {
        let mut labels = self.value_labels();
        labels.sort();
        labels.dedup();
        labels.len()
    }
}

/// Any registered user type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    /// A type with a primary key.
    Entity(EntityDef),
    /// A composite type without a primary key.
    Struct(StructDef),
    /// An enumeration.
    Enum(EnumDef),
}

impl TypeDef {
    /// Type name.
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Entity(e) => &e.name,
            TypeDef::Struct(s) => &s.name,
            TypeDef::Enum(e) => &e.name,
        }
    }

    /// Defining module.
    pub fn module(&self) -> &str {
        match self {
            TypeDef::Entity(e) => &e.module,
            TypeDef::Struct(s) => &s.module,
            TypeDef::Enum(e) => &e.module,
        }
    }

    /// Fields of an entity or struct; enums have none.
    pub fn fields(&self) -> &[FieldDef] {
        match self {
            TypeDef::Entity(e) => &e.fields,
            TypeDef::Struct(s) => &s.fields,
            TypeDef::Enum(_) => &[],
        }
    }

    /// Documentation of the type.
    pub fn description(&self) -> Option<&str> {
        match self {
            TypeDef::Entity(e) => e.description.as_deref(),
            TypeDef::Struct(s) => s.description.as_deref(),
            TypeDef::Enum(e) => e.description.as_deref(),
        }
    }
}

impl From<EntityDef> for TypeDef {
    fn from(def: EntityDef) -> Self {
        TypeDef::Entity(def)
    }
}

impl From<StructDef> for TypeDef {
    fn from(def: StructDef) -> Self {
        TypeDef::Struct(def)
    }
}

impl From<EnumDef> for TypeDef {
    fn from(def: EnumDef) -> Self {
        TypeDef::Enum(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_builder() {
        let entity = EntityDef::new("app", "User", "id")
            .with_field(FieldDef::new("id", NativeType::Int64).with_identity())
            .with_field(FieldDef::new("name", NativeType::String))
            .with_field(FieldDef::optional("email", NativeType::String).with_unique())
            .with_description("A user.");

        assert_eq!(entity.fields.len(), 3);
        assert!(entity.get_primary_key_field().unwrap().identity);
        assert!(entity.get_field("email").unwrap().nullable);
        assert!(entity.get_field("email").unwrap().unique);
        assert!(entity.get_field("nonexistent").is_none());
    }

    #[test]
    fn test_default_value_constant() {
        assert_eq!(DefaultValue::Null.to_constant(), None);
        assert_eq!(
            DefaultValue::String("x".into()).to_constant(),
            Some(Constant::String("x".into()))
        );
    }

    #[test]
    fn test_enum_distinct_values() {
        let state = EnumDef::new("app", "WorkflowState", ["active", "inactive", "deleted"]);
        assert_eq!(state.distinct_value_count(), 3);
        assert_eq!(state.value_labels(), ["active", "inactive", "deleted"]);

        let single = EnumDef::new("app", "Only", ["one"]);
        assert_eq!(single.distinct_value_count(), 1);
    }

    #[test]
    fn test_enum_description() {
        let plain: TypeDef = EnumDef::new("app", "Color", ["red", "green"]).into();
        assert_eq!(plain.description(), None);

        let documented: TypeDef = EnumDef::new("app", "Color", ["red", "green"])
            .with_description("Paint colors.")
            .into();
        assert_eq!(documented.description(), Some("Paint colors."));
    }
}
