//! sqlform core - entity types to SQL schema catalogs.
//!
//! This crate turns explicitly described entity, struct and enum types into a
//! [`Catalog`](sqlform_model::Catalog) of tables, composite types, enum types
//! and constraints:
//!
//! - [`native`], [`entity`], [`registry`] - The native-side type vocabulary
//! - [`options`], [`factory`], [`dialect`] - Conversion policy
//! - [`mapper`] - Native types to SQL data types
//! - [`relation`] - Field roles and relationships
//! - [`compiler`], [`enums`] - Tables, structs and enum lookup tables
//! - [`assembler`] - Whole-catalog assembly
//! - [`record`] - Entity values to insertion tuples
//! - [`generator`] - Random records for extraction and load tests
//!
//! # Usage
//!
//! ```rust
//! use sqlform_core::{
//!     to_catalog, ConverterOptions, EntityDef, FieldDef, NativeType, TypeRegistry,
//! };
//!
//! let registry = TypeRegistry::new()
//!     .with_type(
//!         EntityDef::new("app", "Address", "id").with_fields([
//!             FieldDef::new("id", NativeType::Int64),
//!             FieldDef::new("city", NativeType::String),
//!         ]),
//!     )
//!     .unwrap();
//!
//! let catalog = to_catalog(&registry, &["Address"], ConverterOptions::default()).unwrap();
//! assert_eq!(catalog.tables().count(), 1);
//! ```

pub mod assembler;
pub mod compiler;
pub mod converter;
pub mod dialect;
pub mod entity;
pub mod enums;
pub mod error;
pub mod factory;
pub mod generator;
pub mod mapper;
pub mod native;
pub mod options;
pub mod record;
pub mod registry;
pub mod relation;

pub use converter::Converter;
pub use dialect::{Dialect, GeneratorConfig, GeneratorOptions, UpsertSyntax};
pub use entity::{DefaultValue, EntityDef, EnumDef, FieldDef, StructDef, TypeDef};
pub use error::{ConvertError, ErrorKind, ExtractError, Result};
pub use factory::{DefaultObjectFactory, ObjectFactory};
pub use generator::{random_records, RandomGenerator};
pub use native::{Annotation, AnnotationKind, LiteralValue, NativeType};
pub use options::{ArrayMode, ConverterOptions, EnumMode, NamespaceMapping, StructMode};
pub use record::{Record, RecordExtractor, Value, ValueEncoding};
pub use registry::{Reflect, TypeRegistry};
pub use relation::{FieldRole, RelatedItem};

use sqlform_model::{Catalog, StructType, Table};

/// Convert the given entities, and every type they reach, into a catalog.
pub fn to_catalog(
    registry: &TypeRegistry,
    roots: &[&str],
    options: ConverterOptions,
) -> Result<Catalog> {
    Converter::new(registry, options)?.assemble(roots)
}

/// Compile a single registered entity into its table.
pub fn entity_to_table(
    registry: &TypeRegistry,
    entity: &str,
    options: ConverterOptions,
) -> Result<Table> {
    let converter = Converter::new(registry, options)?;
    match registry.resolve(entity)? {
        TypeDef::Entity(def) => converter.compile_table(def),
        other => Err(ConvertError::unsupported(
            other.name(),
            "not an entity type; it has no primary key",
        )),
    }
}

/// Compile a single registered entity or struct into a composite type.
pub fn struct_to_type(
    registry: &TypeRegistry,
    name: &str,
    options: ConverterOptions,
) -> Result<StructType> {
    Converter::new(registry, options)?.compile_struct(registry.resolve(name)?)
}
