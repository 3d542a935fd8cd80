//! Enum lookup tables.

use crate::compiler::ENUM_KEY_COLUMN;
use crate::converter::Converter;
use crate::entity::EnumDef;
use crate::error::Result;
use crate::mapper::enum_label_type;
use sqlform_model::{Constraint, Table};
use tracing::debug;

/// Name of the label column of enum lookup tables.
pub const ENUM_VALUE_COLUMN: &str = "value";

impl Converter<'_> {
    /// Build the lookup table of an enum: a generated integer key and a
    /// unique label.
    pub fn materialize_enum_table(&self, enum_def: &EnumDef) -> Result<Table> {
        let factory = &self.options.factory;
        let key_type = self.enum_key_type()?;
        let label_type = self.map_simple(&enum_label_type())?;

        let columns = vec![
            factory.column(ENUM_KEY_COLUMN, key_type, false, None, true, None),
            factory.column(ENUM_VALUE_COLUMN, label_type, false, None, false, None),
        ];
        let constraints = vec![Constraint::unique(
            format!("uq_{}", enum_def.name),
            ENUM_VALUE_COLUMN,
        )];

        let table = factory.table(
            self.qualified_id(&enum_def.module, &enum_def.name)?,
            columns,
            vec![ENUM_KEY_COLUMN.to_string()],
            constraints,
            enum_def.description.clone(),
        )?;

        debug!(
            table = %table.name,
            values = enum_def.members.len(),
            "Materialized enum lookup table"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeType;
    use crate::options::ConverterOptions;
    use crate::registry::TypeRegistry;
    use pretty_assertions::assert_eq;
    use sqlform_model::DataType;

    #[test]
    fn test_enum_table_shape() {
        let registry = TypeRegistry::new();
        let converter = Converter::new(&registry, ConverterOptions::default()).unwrap();
        let state = EnumDef::new("app", "WorkflowState", ["active", "inactive", "deleted"]);

        let table = converter.materialize_enum_table(&state).unwrap();
        let names: Vec<&str> = table.columns.keys().map(String::as_str).collect();
        assert_eq!(names, ["id", "value"]);
        assert_eq!(table.primary_key, vec!["id".to_string()]);

        let id = table.column("id").unwrap();
        assert!(id.identity);
        assert_eq!(id.data_type, DataType::Integer { width: 4 });

        let value = table.column("value").unwrap();
        assert!(!value.nullable);
        assert_eq!(value.data_type, DataType::varchar(64));

        assert_eq!(
            table.constraints,
            vec![Constraint::unique("uq_WorkflowState", "value")]
        );
        assert_eq!(table.description, None);

        let documented = converter
            .materialize_enum_table(&state.with_description("Lifecycle of a record."))
            .unwrap();
        assert_eq!(
            documented.description.as_deref(),
            Some("Lifecycle of a record.")
        );
    }

    #[test]
    fn test_enum_table_follows_substitutions() {
        let registry = TypeRegistry::new();
        let converter = Converter::new(
            &registry,
            ConverterOptions::default()
                .with_substitution(NativeType::String, DataType::varchar(16_777_215)),
        )
        .unwrap();
        let table = converter
            .materialize_enum_table(&EnumDef::new("app", "Tag", ["a", "b"]))
            .unwrap();
        assert_eq!(
            table.column("value").unwrap().data_type,
            DataType::varchar(64)
        );
    }
}
