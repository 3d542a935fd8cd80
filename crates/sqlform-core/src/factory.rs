//! Object factory.
//!
//! The converter never constructs catalog objects directly; it goes through
//! an [`ObjectFactory`] so that an embedding dialect can adjust columns,
//! tables, structs and namespaces as they are created.

use sqlform_model::{
    Column, Constraint, DataType, FormationError, Namespace, QualifiedName, StructMember,
    StructType, Table,
};
use std::fmt;

/// Constructs catalog objects on behalf of the converter.
///
/// Every method has a default that builds the plain model object.
pub trait ObjectFactory: fmt::Debug + Send + Sync {
    /// Create a column.
    fn column(
        &self,
        name: &str,
        data_type: DataType,
        nullable: bool,
        default: Option<String>,
        identity: bool,
        description: Option<String>,
    ) -> Column {
        let mut column = Column::new(name, data_type, nullable);
        if identity {
            column = column.with_identity();
        }
        if let Some(default) = default {
            column = column.with_default(default);
        }
        if let Some(description) = description {
            column = column.with_description(description);
        }
        column
    }

    /// Create a table.
    fn table(
        &self,
        name: QualifiedName,
        columns: Vec<Column>,
        primary_key: Vec<String>,
        constraints: Vec<Constraint>,
        description: Option<String>,
    ) -> Result<Table, FormationError> {
        Table::new(name, columns, primary_key, constraints, description)
    }

    /// Create a struct type.
    fn struct_type(
        &self,
        name: QualifiedName,
        members: Vec<StructMember>,
        description: Option<String>,
    ) -> Result<StructType, FormationError> {
        StructType::new(name, members, description)
    }

    /// Create an empty namespace.
    fn namespace(&self, name: &str) -> Namespace {
        Namespace::new(name)
    }
}

/// Builds the plain model objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjectFactory;

impl ObjectFactory for DefaultObjectFactory {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct DescribedColumns;

    impl ObjectFactory for DescribedColumns {
        fn column(
            &self,
            name: &str,
            data_type: DataType,
            nullable: bool,
            default: Option<String>,
            identity: bool,
            description: Option<String>,
        ) -> Column {
            let description = description.unwrap_or_else(|| format!("column {}", name));
            DefaultObjectFactory.column(
                name,
                data_type,
                nullable,
                default,
                identity,
                Some(description),
            )
        }
    }

    #[test]
    fn test_default_factory() {
        let column = DefaultObjectFactory.column(
            "id",
            DataType::Integer { width: 4 },
            true,
            Some("0".into()),
            true,
            None,
        );
        assert!(column.identity);
        assert!(!column.nullable);
        assert_eq!(column.default, None);
    }

    #[test]
    fn test_custom_factory() {
        let column = DescribedColumns.column("name", DataType::text(), false, None, false, None);
        assert_eq!(column.description.as_deref(), Some("column name"));

        let table = DescribedColumns
            .table(
                QualifiedName::global("T"),
                vec![column],
                vec!["name".into()],
                Vec::new(),
                None,
            )
            .unwrap();
        assert_eq!(table.columns.len(), 1);
    }
}
