//! The converter: entity types plus options in, catalog out.
//!
//! The work is split across modules, each adding methods to [`Converter`]:
//!
//! - [`crate::mapper`] - native types to SQL data types
//! - [`crate::relation`] - relationship detection and enum key types
//! - [`crate::compiler`] - entities to tables, structs to struct types
//! - [`crate::enums`] - enum lookup tables
//! - [`crate::assembler`] - the whole catalog

use crate::error::Result;
use crate::options::ConverterOptions;
use crate::registry::TypeRegistry;
use sqlform_model::{NameStyle, QualifiedName};

/// Converts registered entity types into catalog objects.
///
/// A converter borrows its registry and owns its options; it holds no other
/// state, so one instance can serve any number of conversions.
#[derive(Debug, Clone)]
pub struct Converter<'a> {
    pub(crate) registry: &'a TypeRegistry,
    pub(crate) options: ConverterOptions,
}

impl<'a> Converter<'a> {
    /// Create a converter, validating the options.
    pub fn new(registry: &'a TypeRegistry, options: ConverterOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { registry, options })
    }

    /// The registry types are looked up in.
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// The active options.
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Name of an object defined in `module`, styled per the options.
    pub fn qualified_id(&self, module: &str, name: &str) -> Result<QualifiedName> {
        let namespace = self.options.namespaces.get(module)?;
        let style = if self.options.qualified_names {
            NameStyle::Qualified
        } else {
            NameStyle::Prefixed
        };
        Ok(QualifiedName::with_style(style, namespace, name))
    }

    /// Prefix for constraint and join table names derived from a type.
    pub fn qualified_prefix(&self, module: &str, name: &str) -> Result<String> {
        Ok(self.qualified_id(module, name)?.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::NamespaceMapping;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_qualified_id() {
        let registry = TypeRegistry::new();
        let namespaces = NamespaceMapping::new([("app.sales", Some("sales"))]).unwrap();

        let converter = Converter::new(
            &registry,
            ConverterOptions::new().with_namespaces(namespaces.clone()),
        )
        .unwrap();
        let id = converter.qualified_id("app.sales", "Order").unwrap();
        assert_eq!(id.compact(), "sales.Order");
        assert_eq!(converter.qualified_prefix("app.sales", "Order").unwrap(), "sales_Order");
        assert!(converter.qualified_id("app.hr", "Person").is_err());

        let converter = Converter::new(
            &registry,
            ConverterOptions::new()
                .with_namespaces(namespaces)
                .with_qualified_names(false),
        )
        .unwrap();
        let id = converter.qualified_id("app.sales", "Order").unwrap();
        assert_eq!(id.compact(), "sales__Order");
        assert_eq!(id.schema(), None);
    }

    #[test]
    fn test_rejects_invalid_options() {
        let registry = TypeRegistry::new();
        let options = ConverterOptions::new().with_enum_key_width(16);
        assert!(Converter::new(&registry, options).is_err());
    }
}
