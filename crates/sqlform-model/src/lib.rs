//! sqlform model - portable SQL schema objects.
//!
//! This crate defines the catalog that schema formation produces and that
//! dialect renderers and schema diff tooling consume:
//!
//! - [`data_type`] - Dialect-agnostic data types and the compatibility combinator
//! - [`name`] - Namespace-scoped object names
//! - [`column`], [`constraint`], [`table`] - Table structure
//! - [`structure`] - Composite and enumeration types
//! - [`catalog`] - Namespaces and the catalog root
//! - [`literal`] - SQL literal rendering
//!
//! All objects are plain values: built once and never mutated afterwards.

pub mod catalog;
pub mod column;
pub mod constraint;
pub mod data_type;
pub mod error;
pub mod literal;
pub mod name;
pub mod structure;
pub mod table;

pub use catalog::{Catalog, Namespace};
pub use column::Column;
pub use constraint::{Constraint, ConstraintReference};
pub use data_type::{compatible_type, DataType};
pub use error::FormationError;
pub use literal::{quote, Constant};
pub use name::{NameStyle, QualifiedName};
pub use structure::{EnumType, StructMember, StructType};
pub use table::Table;
