//! Catalog assembly.
//!
//! Assembly walks the types reachable from a set of entities and produces
//! every catalog object they need, in a fixed order:
//!
//! 1. native enum types (enum mode `TYPE`)
//! 2. struct types, dependencies first (struct mode `TYPE`)
//! 3. entity tables
//! 4. enum lookup tables (enum mode `RELATION`, and extensible enums)
//! 5. join tables for one-to-many relationships
//!
//! Each group is sorted by type name, so repeated runs over the same input
//! produce identical catalogs.

use crate::compiler::ENUM_KEY_COLUMN;
use crate::converter::Converter;
use crate::entity::{EntityDef, EnumDef, StructDef, TypeDef};
use crate::error::{ConvertError, Result};
use crate::native::NativeType;
use crate::options::{EnumMode, StructMode};
use crate::registry::collect_names;
use crate::relation::{FieldRole, RelatedItem};
use indexmap::IndexMap;
use sqlform_model::{
    Catalog, Constraint, ConstraintReference, EnumType, Namespace, StructType, Table,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument};

/// Catalog objects keyed by target namespace, in first-seen order.
#[derive(Default)]
struct Groups {
    enums: IndexMap<String, Vec<EnumType>>,
    structs: IndexMap<String, Vec<StructType>>,
    tables: IndexMap<String, Vec<Table>>,
}

impl<'a> Converter<'a> {
    /// Convert every registered entity into a catalog.
    pub fn assemble_all(&self) -> Result<Catalog> {
        self.assemble(&self.registry.entity_names())
    }

    /// Convert the given entities, and every type they reach, into a catalog.
    #[instrument(skip_all, fields(roots = roots.len()))]
    pub fn assemble(&self, roots: &[&str]) -> Result<Catalog> {
        let closure = self.registry.referenced_types(roots)?;
        let mut types = closure
            .iter()
            .map(|name| self.registry.resolve(name))
            .collect::<Result<Vec<_>>>()?;
        types.sort_by(|a, b| a.name().cmp(b.name()));

        let mut groups = Groups::default();
        let mut native_enums: HashSet<&str> = HashSet::new();

        if self.options.enum_mode == EnumMode::Type {
            let plain = self.plain_enum_uses(&types);
            for enum_def in types.iter().filter_map(|t| as_enum(t)) {
                if self.is_small_enum(enum_def) || !plain.contains(enum_def.name.as_str()) {
                    continue;
                }
                native_enums.insert(&enum_def.name);
                let name = self.qualified_id(&enum_def.module, &enum_def.name)?;
                groups
                    .enums
                    .entry(self.namespace_of(&enum_def.module)?)
                    .or_default()
                    .push(EnumType::new(name, enum_def.value_labels()));
            }
        }

        if self.options.struct_mode == StructMode::Type {
            let structs: Vec<&StructDef> = types.iter().filter_map(|t| as_struct(t)).collect();
            for def in topological_sort(&structs)? {
                let struct_type = self.compile_struct(self.registry.resolve(&def.name)?)?;
                groups
                    .structs
                    .entry(self.namespace_of(&def.module)?)
                    .or_default()
                    .push(struct_type);
            }
        }

        let entities: Vec<&EntityDef> = types.iter().filter_map(|t| as_entity(t)).collect();
        for entity in &entities {
            let table = self.compile_table(entity)?;
            self.push_table(&mut groups, &entity.module, table)?;
        }

        for enum_def in self.lookup_enums(&entities) {
            if native_enums.contains(enum_def.name.as_str()) {
                return Err(ConvertError::unsupported(
                    &enum_def.name,
                    "enumeration is used both as a native enum type and as an extensible enumeration",
                ));
            }
            let table = self.materialize_enum_table(enum_def)?;
            self.push_table(&mut groups, &enum_def.module, table)?;
        }

        for entity in &entities {
            for field in &entity.fields {
                if let FieldRole::Relationship(item) = self.field_role(field) {
                    let table = self
                        .join_table(entity, &field.name, item)
                        .map_err(|err| err.in_entity(&entity.name))?;
                    self.push_table(&mut groups, &entity.module, table)?;
                }
            }
        }

        let catalog = self.group_namespaces(groups);
        info!(
            namespaces = catalog.namespaces.len(),
            tables = catalog.tables().count(),
            structs = catalog.structs().count(),
            enums = catalog.enums().count(),
            "Assembled catalog"
        );
        Ok(catalog)
    }

    /// Build the join table of a one-to-many relationship field.
    pub fn join_table(
        &self,
        entity: &EntityDef,
        field_name: &str,
        item: RelatedItem<'_>,
    ) -> Result<Table> {
        let factory = &self.options.factory;
        let left_key = self.registry.primary_key_field(entity)?;

        let (right_key_name, right_key_type) = match item {
            RelatedItem::Entity(target) => {
                let key = self.registry.primary_key_field(target)?;
                (
                    key.name.clone(),
                    self.map_member(&key.field_type, &target.name)?,
                )
            }
            RelatedItem::Enum(_) => (ENUM_KEY_COLUMN.to_string(), self.enum_key_type()?),
        };

        let left_name = format!(
            "{}_{}",
            self.qualified_prefix(&entity.module, &entity.name)?,
            field_name
        );
        let right_name = format!(
            "{}_{}",
            self.qualified_prefix(item.module(), item.name())?,
            right_key_name
        );

        let columns = vec![
            factory.column(
                "uuid",
                self.map_member(&NativeType::Uuid, &entity.name)?,
                false,
                None,
                false,
                None,
            ),
            factory.column(
                &left_name,
                self.map_member(&left_key.field_type, &entity.name)?,
                false,
                None,
                false,
                None,
            ),
            factory.column(&right_name, right_key_type, false, None, false, None),
        ];

        let constraints = vec![
            Constraint::foreign_key(
                format!("jk_{}", left_name),
                left_name.clone(),
                ConstraintReference::new(
                    self.qualified_id(&entity.module, &entity.name)?,
                    left_key.name.clone(),
                ),
            ),
            Constraint::foreign_key(
                format!("jk_{}", right_name),
                right_name.clone(),
                ConstraintReference::new(
                    self.qualified_id(item.module(), item.name())?,
                    right_key_name,
                ),
            ),
        ];

        let table = factory.table(
            self.qualified_id(&entity.module, &format!("{}_{}", left_name, item.name()))?,
            columns,
            vec!["uuid".to_string()],
            constraints,
            None,
        )?;

        debug!(
            table = %table.name,
            columns = table.columns.len(),
            constraints = table.constraints.len(),
            "Synthesized join table"
        );
        Ok(table)
    }

    /// Enums that need a lookup table: plain and listed enums under
    /// `RELATION`, then extensible enums. Each enum appears once.
    fn lookup_enums(&self, entities: &[&EntityDef]) -> Vec<&'a EnumDef> {
        let mut regular: BTreeMap<&'a str, &'a EnumDef> = BTreeMap::new();
        let mut extensible: BTreeMap<&'a str, &'a EnumDef> = BTreeMap::new();

        for entity in entities {
            for field in &entity.fields {
                match self.field_role(field) {
                    FieldRole::Enum(e) if self.options.enum_mode == EnumMode::Relation => {
                        regular.insert(&e.name, e);
                    }
                    FieldRole::Relationship(RelatedItem::Enum(e)) => {
                        regular.insert(&e.name, e);
                    }
                    FieldRole::ExtensibleEnum(e) => {
                        extensible.insert(&e.name, e);
                    }
                    _ => {}
                }
            }
        }

        let mut result: Vec<&'a EnumDef> = regular.values().copied().collect();
        result.extend(
            extensible
                .into_iter()
                .filter(|(name, _)| !regular.contains_key(name))
                .map(|(_, e)| e),
        );
        result
    }

    /// Enums referenced by an entity or struct field other than through an
    /// extensible enumeration. Only these need a native enum type.
    fn plain_enum_uses(&self, types: &[&TypeDef]) -> HashSet<&'a str> {
        let mut used = HashSet::new();
        for def in types {
            for field in def.fields() {
                self.collect_plain_enums(&field.field_type, &mut used);
            }
        }
        used
    }

    fn collect_plain_enums(&self, typ: &NativeType, used: &mut HashSet<&'a str>) {
        let registry = self.registry;
        let typ = typ.unadorned();
        if registry.as_extensible_enum(typ).is_some() {
            return;
        }
        match typ {
            NativeType::List(item) => self.collect_plain_enums(item, used),
            NativeType::Union(members) => {
                for member in members {
                    self.collect_plain_enums(member, used);
                }
            }
            _ => {
                if let Some(enum_def) = registry.as_enum(typ) {
                    used.insert(enum_def.name.as_str());
                }
            }
        }
    }

    fn namespace_of(&self, module: &str) -> Result<String> {
        Ok(self
            .options
            .namespaces
            .get(module)?
            .unwrap_or_default()
            .to_string())
    }

    fn push_table(&self, groups: &mut Groups, module: &str, table: Table) -> Result<()> {
        groups
            .tables
            .entry(self.namespace_of(module)?)
            .or_default()
            .push(table);
        Ok(())
    }

    fn group_namespaces(&self, mut groups: Groups) -> Catalog {
        let factory = &self.options.factory;

        if !self.options.qualified_names {
            let mut namespace = factory.namespace("");
            namespace.enums = groups.enums.into_values().flatten().collect();
            namespace.structs = groups.structs.into_values().flatten().collect();
            namespace.tables = groups.tables.into_values().flatten().collect();
            return Catalog::new(vec![namespace]);
        }

        let mut names: Vec<String> = groups.tables.keys().cloned().collect();
        for name in groups.enums.keys().chain(groups.structs.keys()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }

        let namespaces: Vec<Namespace> = names
            .into_iter()
            .map(|name| {
                let mut namespace = factory.namespace(&name);
                namespace.enums = groups.enums.shift_remove(&name).unwrap_or_default();
                namespace.structs = groups.structs.shift_remove(&name).unwrap_or_default();
                namespace.tables = groups.tables.shift_remove(&name).unwrap_or_default();
                namespace
            })
            .collect();
        Catalog::new(namespaces)
    }
}

fn as_enum<'r>(def: &&'r TypeDef) -> Option<&'r EnumDef> {
    match *def {
        TypeDef::Enum(e) => Some(e),
        _ => None,
    }
}

fn as_struct<'r>(def: &&'r TypeDef) -> Option<&'r StructDef> {
    match *def {
        TypeDef::Struct(s) => Some(s),
        _ => None,
    }
}

fn as_entity<'r>(def: &&'r TypeDef) -> Option<&'r EntityDef> {
    match *def {
        TypeDef::Entity(e) => Some(e),
        _ => None,
    }
}

/// Order structs so that every struct follows the structs it embeds.
///
/// Input order is kept among independent structs.
fn topological_sort<'r>(structs: &[&'r StructDef]) -> Result<Vec<&'r StructDef>> {
    let by_name: IndexMap<&str, &StructDef> =
        structs.iter().map(|s| (s.name.as_str(), *s)).collect();
    let mut result = Vec::with_capacity(structs.len());
    let mut visited: HashSet<&str> = HashSet::new();
    let mut temp_visited: HashSet<&str> = HashSet::new();

    for &def in structs {
        visit(def, &by_name, &mut visited, &mut temp_visited, &mut result)?;
    }
    Ok(result)
}

fn visit<'r>(
    def: &'r StructDef,
    by_name: &IndexMap<&str, &'r StructDef>,
    visited: &mut HashSet<&'r str>,
    temp_visited: &mut HashSet<&'r str>,
    result: &mut Vec<&'r StructDef>,
) -> Result<()> {
    let name = def.name.as_str();
    if visited.contains(name) {
        return Ok(());
    }
    if temp_visited.contains(name) {
        return Err(ConvertError::CircularDependency(name.to_string()));
    }
    temp_visited.insert(name);

    let mut deps = Vec::new();
    for field in &def.fields {
        collect_names(&field.field_type, &mut deps);
    }
    for dep in &deps {
        // self-references do not constrain the order
        if dep == name {
            continue;
        }
        if let Some(&dep_def) = by_name.get(dep.as_str()) {
            visit(dep_def, by_name, visited, temp_visited, result)?;
        }
    }

    temp_visited.remove(name);
    visited.insert(name);
    result.push(def);
    Ok(())
}
