//! Relationship resolution.
//!
//! Decides what role each field plays in its owning table: a plain value
//! column, a reference to another entity, an enum that needs a lookup table,
//! or a relationship that becomes a join table.

use crate::converter::Converter;
use crate::entity::{EntityDef, EnumDef, FieldDef};
use crate::error::Result;
use crate::native::NativeType;
use crate::options::EnumMode;
use sqlform_model::DataType;

/// Far side of a relationship field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelatedItem<'r> {
    /// List of entities.
    Entity(&'r EntityDef),
    /// List of enum values stored in a lookup table.
    Enum(&'r EnumDef),
}

impl RelatedItem<'_> {
    /// Name of the related type.
    pub fn name(&self) -> &str {
        match self {
            RelatedItem::Entity(e) => &e.name,
            RelatedItem::Enum(e) => &e.name,
        }
    }

    /// Defining module of the related type.
    pub fn module(&self) -> &str {
        match self {
            RelatedItem::Entity(e) => &e.module,
            RelatedItem::Enum(e) => &e.module,
        }
    }
}

/// Role of a field within its owning entity.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRole<'r> {
    /// Excluded from the table; becomes a join table.
    Relationship(RelatedItem<'r>),
    /// Holds the primary key of another entity.
    Entity(&'r EntityDef),
    /// Holds the primary key of one of several entities.
    Discriminated(Vec<&'r EntityDef>),
    /// An enum represented per the enum mode.
    Enum(&'r EnumDef),
    /// Key into an enum lookup table that may grow.
    ExtensibleEnum(&'r EnumDef),
    /// Anything else.
    Value,
}

impl<'a> Converter<'a> {
    /// Classify a field.
    pub fn field_role(&self, field: &FieldDef) -> FieldRole<'a> {
        let registry = self.registry;
        let typ = field.field_type.unadorned();

        if let Some(item) = self.relationship_item(typ) {
            return FieldRole::Relationship(item);
        }
        if let Some(entity) = registry.as_entity(typ) {
            return FieldRole::Entity(entity);
        }
        if let Some(enum_def) = registry.as_enum(typ) {
            if self.is_small_enum(enum_def) {
                return FieldRole::ExtensibleEnum(enum_def);
            }
            return FieldRole::Enum(enum_def);
        }
        if let Some(enum_def) = registry.as_extensible_enum(typ) {
            return FieldRole::ExtensibleEnum(enum_def);
        }
        if let NativeType::Union(members) = typ {
            let entities: Vec<&EntityDef> =
                members.iter().filter_map(|m| registry.as_entity(m)).collect();
            if !entities.is_empty() && entities.len() == members.len() {
                return FieldRole::Discriminated(entities);
            }
        }
        FieldRole::Value
    }

    /// Check if a field type expands into a separate join table.
    pub fn is_relationship(&self, typ: &NativeType) -> bool {
        self.relationship_item(typ.unadorned()).is_some()
    }

    /// Key type of enum lookup tables.
    pub fn enum_key_type(&self) -> Result<DataType> {
        let native = match self.options.enum_key_width {
            1 => NativeType::Int8,
            2 => NativeType::Int16,
            8 => NativeType::Int64,
            _ => NativeType::Int32,
        };
        self.map_simple(&native)
    }

    /// Enums with fewer than two distinct values never become native or
    /// inline enumerations; they are stored like extensible enums.
    pub fn is_small_enum(&self, enum_def: &EnumDef) -> bool {
        matches!(self.options.enum_mode, EnumMode::Type | EnumMode::Inline)
            && enum_def.distinct_value_count() < 2
    }

    fn relationship_item(&self, typ: &NativeType) -> Option<RelatedItem<'a>> {
        let NativeType::List(item) = typ else {
            return None;
        };
        let item = item.unadorned();
        if let Some(entity) = self.registry.as_entity(item) {
            return Some(RelatedItem::Entity(entity));
        }
        match self.registry.as_enum(item) {
            Some(enum_def) if self.options.enum_mode == EnumMode::Relation => {
                Some(RelatedItem::Enum(enum_def))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConverterOptions;
    use crate::registry::TypeRegistry;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_type(EnumDef::new("app", "Status", ["open", "closed"]))
            .and_then(|r| r.with_type(EnumDef::new("app", "Kind", ["only"])))
            .and_then(|r| {
                r.with_type(
                    EntityDef::new("app", "Tag", "id")
                        .with_field(FieldDef::new("id", NativeType::Int32)),
                )
            })
            .and_then(|r| {
                r.with_type(
                    EntityDef::new("app", "Label", "id")
                        .with_field(FieldDef::new("id", NativeType::Int32)),
                )
            })
            .unwrap()
    }

    #[test]
    fn test_relationships() {
        let registry = registry();
        let converter = Converter::new(&registry, ConverterOptions::default()).unwrap();

        let tags = NativeType::list(NativeType::reference("Tag"));
        let statuses = NativeType::list(NativeType::reference("Status"));
        assert!(converter.is_relationship(&tags));
        assert!(!converter.is_relationship(&statuses));
        assert!(!converter.is_relationship(&NativeType::list(NativeType::String)));

        let converter = Converter::new(
            &registry,
            ConverterOptions::default().with_enum_mode(EnumMode::Relation),
        )
        .unwrap();
        assert!(converter.is_relationship(&statuses));
        match converter.field_role(&FieldDef::new("statuses", statuses)) {
            FieldRole::Relationship(item) => assert_eq!(item.name(), "Status"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_field_roles() {
        let registry = registry();
        let converter = Converter::new(&registry, ConverterOptions::default()).unwrap();

        let role = |typ: NativeType| converter.field_role(&FieldDef::new("f", typ));

        assert!(matches!(role(NativeType::reference("Tag")), FieldRole::Entity(_)));
        assert!(matches!(role(NativeType::reference("Status")), FieldRole::Enum(_)));
        assert!(matches!(
            role(NativeType::reference("Kind")),
            FieldRole::ExtensibleEnum(_)
        ));
        assert!(matches!(
            role(NativeType::union([
                NativeType::reference("Status"),
                NativeType::String
            ])),
            FieldRole::ExtensibleEnum(_)
        ));
        match role(NativeType::union([
            NativeType::reference("Tag"),
            NativeType::reference("Label"),
        ])) {
            FieldRole::Discriminated(entities) => assert_eq!(entities.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(role(NativeType::Int), FieldRole::Value);
    }

    #[test]
    fn test_enum_key_type() {
        let registry = registry();
        let converter = Converter::new(&registry, ConverterOptions::default()).unwrap();
        assert_eq!(
            converter.enum_key_type().unwrap(),
            DataType::Integer { width: 4 }
        );

        let converter = Converter::new(
            &registry,
            ConverterOptions::default().with_enum_key_width(8),
        )
        .unwrap();
        assert_eq!(
            converter.enum_key_type().unwrap(),
            DataType::Integer { width: 8 }
        );
    }
}
