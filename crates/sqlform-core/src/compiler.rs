//! Entity to table and struct compilation.

use crate::converter::Converter;
use crate::entity::{EntityDef, FieldDef, TypeDef};
use crate::error::{ConvertError, Result};
use crate::native::LiteralValue;
use crate::options::EnumMode;
use crate::relation::FieldRole;
use sqlform_model::{
    Column, Constant, Constraint, ConstraintReference, StructMember, StructType, Table,
};
use tracing::{debug, trace};

/// Name of the key column of enum lookup tables.
pub const ENUM_KEY_COLUMN: &str = "id";

impl Converter<'_> {
    /// Compile an entity into a table.
    ///
    /// Relationship fields are left out; they become join tables. Any
    /// failure is reported against the entity.
    pub fn compile_table(&self, entity: &EntityDef) -> Result<Table> {
        self.build_table(entity)
            .map_err(|err| err.in_entity(&entity.name))
    }

    /// Unique and optional foreign key constraints of an entity.
    pub fn compile_constraints(&self, entity: &EntityDef) -> Result<Vec<Constraint>> {
        let table_name = self.qualified_prefix(&entity.module, &entity.name)?;
        let mut constraints = Vec::new();

        for field in entity.fields.iter().filter(|f| f.unique) {
            constraints.push(Constraint::unique(
                format!("uq_{}_{}", table_name, field.name),
                field.name.clone(),
            ));
        }

        if !self.options.foreign_constraints {
            return Ok(constraints);
        }

        for field in &entity.fields {
            match self.field_role(field) {
                FieldRole::Entity(target) => {
                    let key = self.registry.primary_key_field(target)?;
                    constraints.push(Constraint::foreign_key(
                        format!("fk_{}_{}", table_name, field.name),
                        field.name.clone(),
                        ConstraintReference::new(
                            self.qualified_id(&target.module, &target.name)?,
                            key.name.clone(),
                        ),
                    ));
                }
                FieldRole::Discriminated(targets) => {
                    let references = targets
                        .iter()
                        .map(|target| {
                            let key = self.registry.primary_key_field(target)?;
                            Ok(ConstraintReference::new(
                                self.qualified_id(&target.module, &target.name)?,
                                key.name.clone(),
                            ))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    constraints.push(Constraint::discriminated(
                        format!("dk_{}_{}", table_name, field.name),
                        field.name.clone(),
                        references,
                    ));
                }
                _ => {}
            }
        }

        Ok(constraints)
    }

    /// Compile an entity or struct into a composite type.
    pub fn compile_struct(&self, def: &TypeDef) -> Result<StructType> {
        if let TypeDef::Enum(e) = def {
            return Err(ConvertError::unsupported(
                &e.name,
                "expected a struct or entity type",
            ));
        }

        let members = def
            .fields()
            .iter()
            .map(|field| {
                let data_type = self.map_member(&field.field_type, def.name())?;
                let member = StructMember::new(field.name.clone(), data_type);
                Ok(match &field.description {
                    Some(description) => member.with_description(description.clone()),
                    None => member,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|err| err.in_entity(def.name()))?;

        let name = self.qualified_id(def.module(), def.name())?;
        let struct_type = self.options.factory.struct_type(
            name,
            members,
            def.description().map(str::to_string),
        )?;

        debug!(
            name = %struct_type.name,
            members = struct_type.members.len(),
            "Compiled struct type"
        );
        Ok(struct_type)
    }

    fn build_table(&self, entity: &EntityDef) -> Result<Table> {
        let columns = entity
            .fields
            .iter()
            .filter(|f| !self.is_relationship(&f.field_type))
            .map(|f| self.compile_column(f, &entity.name))
            .collect::<Result<Vec<_>>>()?;

        let mut constraints = self.compile_constraints(entity)?;
        let table_name = self.qualified_prefix(&entity.module, &entity.name)?;

        // lookup table keys are mandatory regardless of the foreign key option
        for field in &entity.fields {
            let enum_def = match self.field_role(field) {
                FieldRole::ExtensibleEnum(enum_def) => enum_def,
                FieldRole::Enum(enum_def) if self.options.enum_mode == EnumMode::Relation => {
                    enum_def
                }
                _ => continue,
            };
            constraints.push(Constraint::foreign_key(
                format!("fk_{}_{}", table_name, field.name),
                field.name.clone(),
                ConstraintReference::new(
                    self.qualified_id(&enum_def.module, &enum_def.name)?,
                    ENUM_KEY_COLUMN,
                ),
            ));
        }

        if self.options.enum_mode == EnumMode::Check {
            for field in &entity.fields {
                let FieldRole::Enum(enum_def) = self.field_role(field) else {
                    continue;
                };
                let values: Vec<String> = enum_def
                    .members
                    .iter()
                    .map(|(_, value)| literal_constant(value).to_sql())
                    .collect();
                constraints.push(Constraint::check(
                    format!("ch_{}_{}", table_name, field.name),
                    format!("{} IN ({})", field.name, values.join(", ")),
                ));
            }
        }

        let table = self.options.factory.table(
            self.qualified_id(&entity.module, &entity.name)?,
            columns,
            vec![entity.primary_key.clone()],
            constraints,
            entity.description.clone(),
        )?;

        debug!(
            table = %table.name,
            columns = table.columns.len(),
            constraints = table.constraints.len(),
            "Compiled table"
        );
        Ok(table)
    }

    fn compile_column(&self, field: &FieldDef, owner: &str) -> Result<Column> {
        let data_type = self.map_member(&field.field_type, owner)?;
        trace!(owner, field = %field.name, data_type = %data_type, "Compiled column");

        let default = field
            .default
            .as_ref()
            .and_then(|d| d.to_constant())
            .map(|c| c.to_sql());

        Ok(self.options.factory.column(
            &field.name,
            data_type,
            field.nullable,
            default,
            field.identity,
            field.description.clone(),
        ))
    }
}

fn literal_constant(value: &LiteralValue) -> Constant {
    match value {
        LiteralValue::Str(s) => Constant::String(s.clone()),
        LiteralValue::Int(i) => Constant::Int(*i),
        LiteralValue::Bool(b) => Constant::Bool(*b),
    }
}
