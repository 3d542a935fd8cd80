//! Type registry.
//!
//! Holds every user type the converter may encounter, keyed by name, and
//! answers the classification questions the mapper asks.

use crate::entity::{EntityDef, EnumDef, FieldDef, StructDef, TypeDef};
use crate::error::{ConvertError, Result};
use crate::native::NativeType;
use indexmap::{IndexMap, IndexSet};

/// A Rust type that can describe itself for registration.
pub trait Reflect {
    /// The definition to register.
    fn type_def() -> TypeDef;
}

/// Name to definition lookup for entity, struct and enum types.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDef>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type definition.
    ///
    /// Registering an identical definition again is a no-op.
    pub fn add(&mut self, def: impl Into<TypeDef>) -> Result<()> {
        let def = def.into();
        match self.types.get(def.name()) {
            Some(existing) if existing == &def => Ok(()),
            Some(_) => Err(ConvertError::DuplicateType(def.name().to_string())),
            None => {
                self.types.insert(def.name().to_string(), def);
                Ok(())
            }
        }
    }

    /// Register a type definition, builder style.
    pub fn with_type(mut self, def: impl Into<TypeDef>) -> Result<Self> {
        self.add(def)?;
        Ok(self)
    }

    /// Register a type that describes itself.
    pub fn register<T: Reflect>(&mut self) -> Result<()> {
        self.add(T::type_def())
    }

    /// Get a type by name.
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Get a type by name, failing if it is not registered.
    pub fn resolve(&self, name: &str) -> Result<&TypeDef> {
        self.get(name)
            .ok_or_else(|| ConvertError::UnknownType(name.to_string()))
    }

    /// Iterate over all registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of all registered entities, in registration order.
    pub fn entity_names(&self) -> Vec<&str> {
        self.types
            .values()
            .filter(|t| matches!(t, TypeDef::Entity(_)))
            .map(TypeDef::name)
            .collect()
    }

    /// The entity a type refers to, if it is a reference to an entity.
    pub fn as_entity(&self, typ: &NativeType) -> Option<&EntityDef> {
        match self.lookup(typ) {
            Some(TypeDef::Entity(e)) => Some(e),
            _ => None,
        }
    }

    /// The struct a type refers to, if it is a reference to a struct.
    pub fn as_struct(&self, typ: &NativeType) -> Option<&StructDef> {
        match self.lookup(typ) {
            Some(TypeDef::Struct(s)) => Some(s),
            _ => None,
        }
    }

    /// The enum a type refers to, if it is a reference to an enum.
    pub fn as_enum(&self, typ: &NativeType) -> Option<&EnumDef> {
        match self.lookup(typ) {
            Some(TypeDef::Enum(e)) => Some(e),
            _ => None,
        }
    }

    /// Check if a type refers to an entity.
    pub fn is_entity(&self, typ: &NativeType) -> bool {
        self.as_entity(typ).is_some()
    }

    /// Check if a type refers to a struct.
    pub fn is_struct(&self, typ: &NativeType) -> bool {
        self.as_struct(typ).is_some()
    }

    /// Check if a type refers to an enum.
    pub fn is_enum(&self, typ: &NativeType) -> bool {
        self.as_enum(typ).is_some()
    }

    /// Check if a type maps without context: a primitive, an annotated
    /// simple type, or an enum.
    pub fn is_simple(&self, typ: &NativeType) -> bool {
        match typ {
            NativeType::Annotated { base, .. } => self.is_simple(base),
            NativeType::Ref(_) | NativeType::Forward(_) => self.is_enum(typ),
            other => other.is_primitive(),
        }
    }

    /// The enum of an extensible enumeration: a union of exactly one enum
    /// with plain (possibly annotated) strings.
    pub fn as_extensible_enum(&self, typ: &NativeType) -> Option<&EnumDef> {
        let NativeType::Union(members) = typ else {
            return None;
        };

        let mut found = None;
        for member in members {
            if member.unadorned() == &NativeType::String {
                continue;
            }
            match self.as_enum(member) {
                Some(e) if found.is_none() => found = Some(e),
                _ => return None,
            }
        }
        found
    }

    /// The primary key field of `entity`.
    pub fn primary_key_field<'a>(&self, entity: &'a EntityDef) -> Result<&'a FieldDef> {
        entity.get_primary_key_field().ok_or_else(|| {
            ConvertError::unsupported(
                &entity.name,
                format!("primary key field `{}` is not declared", entity.primary_key),
            )
        })
    }

    /// Transitive closure of types referenced from `roots`, roots included,
    /// in discovery order.
    pub fn referenced_types(&self, roots: &[&str]) -> Result<IndexSet<String>> {
        let mut seen = IndexSet::new();
        let mut stack: Vec<String> = roots.iter().rev().map(|r| r.to_string()).collect();

        while let Some(name) = stack.pop() {
            if seen.contains(&name) {
                continue;
            }
            let def = self.resolve(&name)?;
            seen.insert(name);

            let mut names = Vec::new();
            for field in def.fields() {
                collect_names(&field.field_type, &mut names);
            }
            stack.extend(names.into_iter().rev());
        }

        Ok(seen)
    }

    fn lookup(&self, typ: &NativeType) -> Option<&TypeDef> {
        typ.referenced_name().and_then(|name| self.get(name))
    }
}

/// Names of all registered types a native type mentions.
pub(crate) fn collect_names(typ: &NativeType, out: &mut Vec<String>) {
    match typ {
        NativeType::Ref(name) | NativeType::Forward(name) => out.push(name.clone()),
        NativeType::Annotated { base, .. } => collect_names(base, out),
        NativeType::List(item) => collect_names(item, out),
        NativeType::Union(members) => {
            for member in members {
                collect_names(member, out);
            }
        }
        _ => {}
    }
}
