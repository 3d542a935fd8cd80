//! Integration tests for catalog assembly.

use pretty_assertions::assert_eq;
use sqlform_core::{
    to_catalog, struct_to_type, ArrayMode, Converter, ConverterOptions, EntityDef, EnumDef,
    EnumMode, ErrorKind, FieldDef, NamespaceMapping, NativeType, StructDef, StructMode, TypeDef,
    TypeRegistry,
};
use sqlform_model::{Catalog, Constraint, DataType, Table};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn build_registry(defs: Vec<TypeDef>) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    for def in defs {
        registry.add(def).unwrap();
    }
    registry
}

fn assemble(registry: &TypeRegistry, options: ConverterOptions) -> Catalog {
    init_tracing();
    Converter::new(registry, options)
        .unwrap()
        .assemble_all()
        .unwrap()
}

fn table<'c>(catalog: &'c Catalog, name: &str) -> &'c Table {
    catalog
        .table_by_name(name)
        .unwrap_or_else(|| panic!("missing table {name}"))
}

fn table_names(catalog: &Catalog) -> Vec<String> {
    catalog.tables().map(|t| t.name.local_name()).collect()
}

/// Foreign keys of a table as (name, local column, referenced table, referenced column).
fn foreign_keys(table: &Table) -> Vec<(String, String, String, String)> {
    table
        .foreign_keys()
        .filter_map(|c| match c {
            Constraint::ForeignKey {
                name,
                columns,
                reference,
            } => Some((
                name.clone(),
                columns.join(","),
                reference.table.local_name(),
                reference.columns.join(","),
            )),
            _ => None,
        })
        .collect()
}

fn workflow_state() -> EnumDef {
    EnumDef::new("app", "WorkflowState", ["active", "inactive", "deleted"])
}

fn entity(name: &str, key_type: NativeType) -> EntityDef {
    EntityDef::new("app", name, "id").with_field(FieldDef::new("id", key_type))
}

#[test]
fn test_address_and_person() {
    let registry = build_registry(vec![
        EntityDef::new("app", "Address", "id")
            .with_fields([
                FieldDef::new("id", NativeType::Int),
                FieldDef::new("city", NativeType::String),
                FieldDef::optional("state", NativeType::String),
            ])
            .into(),
        EntityDef::new("app", "Person", "id")
            .with_fields([
                FieldDef::new("id", NativeType::Int),
                FieldDef::new("address", NativeType::reference("Address")),
            ])
            .into(),
    ]);

    let catalog = to_catalog(&registry, &["Person"], ConverterOptions::default()).unwrap();
    assert_eq!(table_names(&catalog), ["Address", "Person"]);

    let address = table(&catalog, "Address");
    let nullability: Vec<(&str, bool)> = address
        .columns
        .values()
        .map(|c| (c.name.as_str(), c.nullable))
        .collect();
    assert_eq!(nullability, [("id", false), ("city", false), ("state", true)]);
    assert_eq!(address.primary_key, ["id"]);
    assert!(address.constraints.is_empty());

    let person = table(&catalog, "Person");
    let column = person.column("address").unwrap();
    assert!(!column.nullable);
    assert_eq!(column.data_type, DataType::Integer { width: 8 });
    assert_eq!(person.primary_key, ["id"]);
    assert_eq!(
        foreign_keys(person),
        [(
            "fk_Person_address".to_string(),
            "address".to_string(),
            "Address".to_string(),
            "id".to_string()
        )]
    );
}

#[test]
fn test_enum_as_check_constraint() {
    let registry = build_registry(vec![
        workflow_state().into(),
        entity("EnumTable", NativeType::Int)
            .with_field(FieldDef::new("state", NativeType::reference("WorkflowState")))
            .into(),
    ]);

    let catalog = assemble(
        &registry,
        ConverterOptions::default().with_enum_mode(EnumMode::Check),
    );
    assert_eq!(table_names(&catalog), ["EnumTable"]);
    assert_eq!(catalog.enums().count(), 0);

    let table = table(&catalog, "EnumTable");
    assert_eq!(
        table.column("state").unwrap().data_type,
        DataType::varchar(64)
    );
    assert_eq!(
        table.constraints,
        vec![Constraint::check(
            "ch_EnumTable_state",
            "state IN ('active', 'inactive', 'deleted')"
        )]
    );
}

#[test]
fn test_enum_as_relation() {
    let registry = build_registry(vec![
        workflow_state().into(),
        entity("EnumTable", NativeType::Int)
            .with_field(FieldDef::new("state", NativeType::reference("WorkflowState")))
            .into(),
    ]);

    let catalog = assemble(
        &registry,
        ConverterOptions::default().with_enum_mode(EnumMode::Relation),
    );
    assert_eq!(table_names(&catalog), ["EnumTable", "WorkflowState"]);

    let table = table(&catalog, "EnumTable");
    assert_eq!(
        table.column("state").unwrap().data_type,
        DataType::Integer { width: 4 }
    );
    assert_eq!(
        foreign_keys(table),
        [(
            "fk_EnumTable_state".to_string(),
            "state".to_string(),
            "WorkflowState".to_string(),
            "id".to_string()
        )]
    );

    let lookup = catalog.table_by_name("WorkflowState").unwrap();
    let columns: Vec<&str> = lookup.columns.keys().map(String::as_str).collect();
    assert_eq!(columns, ["id", "value"]);
    assert!(lookup.column("id").unwrap().identity);
}

#[test]
fn test_enum_as_native_type() {
    let registry = build_registry(vec![
        workflow_state().into(),
        entity("EnumTable", NativeType::Int)
            .with_field(FieldDef::new("state", NativeType::reference("WorkflowState")))
            .into(),
    ]);

    let catalog = assemble(&registry, ConverterOptions::default());
    let enums: Vec<_> = catalog.enums().collect();
    assert_eq!(enums.len(), 1);
    assert_eq!(enums[0].name.local_name(), "WorkflowState");
    assert_eq!(enums[0].values, ["active", "inactive", "deleted"]);
    assert_eq!(table_names(&catalog), ["EnumTable"]);
    assert_eq!(
        table(&catalog, "EnumTable").column("state").unwrap().data_type,
        DataType::UserDefined(enums[0].name.clone())
    );
}

#[test]
fn test_list_of_strings() {
    let registry = build_registry(vec![entity("Tagged", NativeType::Int)
        .with_field(FieldDef::new("tags", NativeType::list(NativeType::String)))
        .into()]);

    let catalog = assemble(&registry, ConverterOptions::default());
    assert_eq!(
        table(&catalog, "Tagged").column("tags").unwrap().data_type,
        DataType::array(DataType::text())
    );

    let catalog = assemble(
        &registry,
        ConverterOptions::default().with_array_mode(ArrayMode::Json),
    );
    assert_eq!(
        table(&catalog, "Tagged").column("tags").unwrap().data_type,
        DataType::Json
    );
}

#[test]
fn test_enum_lookup_table_is_shared() {
    let registry = build_registry(vec![
        workflow_state().into(),
        entity("Order", NativeType::Int)
            .with_field(FieldDef::new("state", NativeType::reference("WorkflowState")))
            .into(),
        entity("Ticket", NativeType::Int)
            .with_field(FieldDef::new("state", NativeType::reference("WorkflowState")))
            .with_field(FieldDef::new(
                "history",
                NativeType::list(NativeType::reference("WorkflowState")),
            ))
            .into(),
    ]);

    let catalog = assemble(
        &registry,
        ConverterOptions::default().with_enum_mode(EnumMode::Relation),
    );
    assert_eq!(
        table_names(&catalog),
        ["Order", "Ticket", "WorkflowState", "Ticket_history_WorkflowState"]
    );
    assert_eq!(
        catalog
            .tables()
            .filter(|t| t.name.name == "WorkflowState")
            .count(),
        1
    );

    for name in ["Order", "Ticket"] {
        let keys = foreign_keys(table(&catalog, name));
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].2, "WorkflowState");
    }
    assert!(table(&catalog, "Ticket").column("history").is_none());
}

#[test]
fn test_small_enum_is_extensible() {
    for mode in [EnumMode::Type, EnumMode::Inline] {
        let registry = build_registry(vec![
            EnumDef::new("app", "Singleton", ["only"]).into(),
            entity("Holder", NativeType::Int)
                .with_field(FieldDef::new("kind", NativeType::reference("Singleton")))
                .into(),
        ]);

        let catalog = assemble(&registry, ConverterOptions::default().with_enum_mode(mode));
        assert_eq!(catalog.enums().count(), 0);
        assert_eq!(table_names(&catalog), ["Holder", "Singleton"]);

        let holder = table(&catalog, "Holder");
        assert_eq!(
            holder.column("kind").unwrap().data_type,
            DataType::Integer { width: 4 }
        );
        assert_eq!(foreign_keys(holder)[0].2, "Singleton");
    }
}

#[test]
fn test_extensible_enum_ignores_foreign_key_option() {
    let registry = build_registry(vec![
        workflow_state().into(),
        entity("Task", NativeType::Int)
            .with_field(FieldDef::new(
                "state",
                NativeType::union([NativeType::reference("WorkflowState"), NativeType::String]),
            ))
            .into(),
    ]);

    let catalog = assemble(
        &registry,
        ConverterOptions::default().with_foreign_constraints(false),
    );
    assert_eq!(table_names(&catalog), ["Task", "WorkflowState"]);
    assert_eq!(
        foreign_keys(table(&catalog, "Task")),
        [(
            "fk_Task_state".to_string(),
            "state".to_string(),
            "WorkflowState".to_string(),
            "id".to_string()
        )]
    );
}

#[test]
fn test_extensible_only_enum_has_no_native_type() {
    let registry = build_registry(vec![
        workflow_state().into(),
        entity("Task", NativeType::Int)
            .with_field(FieldDef::new(
                "state",
                NativeType::union([NativeType::reference("WorkflowState"), NativeType::String]),
            ))
            .into(),
    ]);

    let catalog = assemble(&registry, ConverterOptions::default());
    assert_eq!(catalog.enums().count(), 0);
    assert_eq!(table_names(&catalog), ["Task", "WorkflowState"]);

    let mut names: Vec<String> = catalog
        .enums()
        .map(|e| e.name.to_string())
        .chain(catalog.tables().map(|t| t.name.to_string()))
        .collect();
    let count = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), count);
}

#[test]
fn test_enum_used_plainly_and_as_extensible_is_rejected() {
    let registry = build_registry(vec![
        workflow_state().into(),
        entity("Task", NativeType::Int)
            .with_fields([
                FieldDef::new("state", NativeType::reference("WorkflowState")),
                FieldDef::new(
                    "previous",
                    NativeType::union([
                        NativeType::reference("WorkflowState"),
                        NativeType::String,
                    ]),
                ),
            ])
            .into(),
    ]);

    let err = Converter::new(&registry, ConverterOptions::default())
        .unwrap()
        .assemble_all()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);

    // lookup tables only, no native type to clash with
    let catalog = assemble(
        &registry,
        ConverterOptions::default().with_enum_mode(EnumMode::Relation),
    );
    assert_eq!(catalog.enums().count(), 0);
    assert_eq!(table_names(&catalog), ["Task", "WorkflowState"]);
}

#[test]
fn test_join_table_shape() {
    let registry = build_registry(vec![
        entity("A", NativeType::Int)
            .with_field(FieldDef::new(
                "items",
                NativeType::list(NativeType::reference("B")),
            ))
            .into(),
        entity("B", NativeType::Int32).into(),
    ]);

    let catalog = assemble(&registry, ConverterOptions::default());
    assert_eq!(table_names(&catalog), ["A", "B", "A_items_B"]);
    assert!(table(&catalog, "A").column("items").is_none());

    let join = table(&catalog, "A_items_B");
    let columns: Vec<(&str, &DataType)> = join
        .columns
        .values()
        .map(|c| (c.name.as_str(), &c.data_type))
        .collect();
    assert_eq!(
        columns,
        [
            ("uuid", &DataType::Uuid),
            ("A_items", &DataType::Integer { width: 8 }),
            ("B_id", &DataType::Integer { width: 4 }),
        ]
    );
    assert_eq!(join.primary_key, ["uuid"]);
    assert_eq!(
        foreign_keys(join),
        [
            (
                "jk_A_items".to_string(),
                "A_items".to_string(),
                "A".to_string(),
                "id".to_string()
            ),
            (
                "jk_B_id".to_string(),
                "B_id".to_string(),
                "B".to_string(),
                "id".to_string()
            ),
        ]
    );
}

#[test]
fn test_list_of_entities_is_never_an_array() {
    let registry = build_registry(vec![
        entity("B", NativeType::Int).into(),
        StructDef::new("app", "Bundle")
            .with_field(FieldDef::new(
                "items",
                NativeType::list(NativeType::reference("B")),
            ))
            .into(),
    ]);

    for mode in [ArrayMode::Array, ArrayMode::Json] {
        let converter =
            Converter::new(&registry, ConverterOptions::default().with_array_mode(mode)).unwrap();
        let err = converter
            .map_member(&NativeType::list(NativeType::reference("B")), "A")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert!(err.to_string().contains("use a join table"));
    }

    let err = struct_to_type(&registry, "Bundle", ConverterOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    assert_eq!(err.entity(), Some("Bundle"));
}

#[test]
fn test_discriminated_union() {
    let pet = NativeType::union([NativeType::reference("Cat"), NativeType::reference("Dog")]);

    let registry = build_registry(vec![
        entity("Cat", NativeType::Int64).into(),
        entity("Dog", NativeType::Int64).into(),
        entity("Owner", NativeType::Int)
            .with_field(FieldDef::new("pet", pet.clone()))
            .into(),
    ]);
    let catalog = assemble(&registry, ConverterOptions::default());
    let owner = table(&catalog, "Owner");
    assert_eq!(
        owner.column("pet").unwrap().data_type,
        DataType::Integer { width: 8 }
    );
    match owner.constraint("dk_Owner_pet") {
        Some(Constraint::DiscriminatedForeignKey { references, .. }) => {
            let targets: Vec<String> = references.iter().map(|r| r.table.local_name()).collect();
            assert_eq!(targets, ["Cat", "Dog"]);
        }
        other => panic!("unexpected {other:?}"),
    }

    let registry = build_registry(vec![
        entity("Cat", NativeType::Int32).into(),
        entity("Dog", NativeType::Int64).into(),
        entity("Owner", NativeType::Int)
            .with_field(FieldDef::new("pet", pet))
            .into(),
    ]);
    let err = Converter::new(&registry, ConverterOptions::default())
        .unwrap()
        .assemble_all()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InconsistentKeyTypes);
    assert_eq!(err.entity(), Some("Owner"));
}

#[test]
fn test_assembly_is_deterministic() {
    fn defs() -> Vec<TypeDef> {
        vec![
            workflow_state().into(),
            StructDef::new("app", "Point")
                .with_fields([
                    FieldDef::new("x", NativeType::Float),
                    FieldDef::new("y", NativeType::Float),
                ])
                .into(),
            entity("Shape", NativeType::Uuid)
                .with_field(FieldDef::new("origin", NativeType::reference("Point")))
                .with_field(FieldDef::new("state", NativeType::reference("WorkflowState")))
                .with_field(FieldDef::new(
                    "children",
                    NativeType::list(NativeType::reference("Layer")),
                ))
                .into(),
            entity("Layer", NativeType::Int)
                .with_field(FieldDef::new("name", NativeType::String).with_unique())
                .into(),
        ]
    }

    let forward = build_registry(defs());
    let reverse = build_registry(defs().into_iter().rev().collect());

    for mode in [EnumMode::Type, EnumMode::Relation, EnumMode::Check] {
        let options = ConverterOptions::default().with_enum_mode(mode);
        let first = assemble(&forward, options.clone());
        let second = assemble(&forward, options.clone());
        let reordered = assemble(&reverse, options);

        assert_eq!(first, second);
        assert_eq!(
            first.fingerprint().unwrap(),
            reordered.fingerprint().unwrap()
        );
    }
}

#[test]
fn test_structs_follow_their_dependencies() {
    let registry = build_registry(vec![
        StructDef::new("app", "Line")
            .with_fields([
                FieldDef::new("start", NativeType::reference("Vertex")),
                FieldDef::new("end", NativeType::reference("Vertex")),
            ])
            .into(),
        StructDef::new("app", "Vertex")
            .with_fields([
                FieldDef::new("x", NativeType::Float64),
                FieldDef::new("y", NativeType::Float64),
            ])
            .into(),
        StructDef::new("app", "Tree")
            .with_field(FieldDef::optional("parent", NativeType::reference("Tree")))
            .into(),
        entity("Drawing", NativeType::Int)
            .with_field(FieldDef::new("line", NativeType::reference("Line")))
            .with_field(FieldDef::new("tree", NativeType::reference("Tree")))
            .into(),
    ]);

    let catalog = assemble(&registry, ConverterOptions::default());
    let structs: Vec<String> = catalog.structs().map(|s| s.name.local_name()).collect();
    assert_eq!(structs, ["Vertex", "Line", "Tree"]);
    assert_eq!(
        table(&catalog, "Drawing").column("line").unwrap().data_type,
        DataType::UserDefined(catalog.structs().nth(1).unwrap().name.clone())
    );

    let catalog = assemble(
        &registry,
        ConverterOptions::default().with_struct_mode(StructMode::Json),
    );
    assert_eq!(catalog.structs().count(), 0);
    assert_eq!(
        table(&catalog, "Drawing").column("line").unwrap().data_type,
        DataType::Json
    );
}

#[test]
fn test_struct_cycle_is_rejected() {
    let registry = build_registry(vec![
        StructDef::new("app", "Left")
            .with_field(FieldDef::new("right", NativeType::reference("Right")))
            .into(),
        StructDef::new("app", "Right")
            .with_field(FieldDef::optional("left", NativeType::forward("Left")))
            .into(),
        entity("Holder", NativeType::Int)
            .with_field(FieldDef::new("left", NativeType::reference("Left")))
            .into(),
    ]);

    let err = Converter::new(&registry, ConverterOptions::default())
        .unwrap()
        .assemble_all()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CircularDependency);
}

#[test]
fn test_namespace_grouping() {
    let registry = build_registry(vec![
        EntityDef::new("app.hr", "Employee", "id")
            .with_field(FieldDef::new("id", NativeType::Int))
            .into(),
        EnumDef::new("app.sales", "Status", ["open", "closed"]).into(),
        EntityDef::new("app.sales", "Order", "id")
            .with_fields([
                FieldDef::new("id", NativeType::Int),
                FieldDef::new("owner", NativeType::reference("Employee")),
                FieldDef::new("status", NativeType::reference("Status")),
            ])
            .into(),
    ]);
    let namespaces =
        NamespaceMapping::new([("app.hr", Some("hr")), ("app.sales", Some("sales"))]).unwrap();

    let catalog = assemble(
        &registry,
        ConverterOptions::default().with_namespaces(namespaces.clone()),
    );
    let names: Vec<&str> = catalog.namespaces.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["hr", "sales"]);

    let sales = catalog.namespace("sales").unwrap();
    assert_eq!(sales.enums.len(), 1);
    assert_eq!(sales.enums[0].name.compact(), "sales.Status");
    let order = sales.table("Order").unwrap();
    assert_eq!(order.name.compact(), "sales.Order");
    match order.constraint("fk_sales_Order_owner") {
        Some(Constraint::ForeignKey { reference, .. }) => {
            assert_eq!(reference.table.compact(), "hr.Employee")
        }
        other => panic!("unexpected {other:?}"),
    }

    let catalog = assemble(
        &registry,
        ConverterOptions::default()
            .with_namespaces(namespaces)
            .with_qualified_names(false),
    );
    assert_eq!(catalog.namespaces.len(), 1);
    assert!(catalog.namespaces[0].is_default());
    assert_eq!(table_names(&catalog), ["hr__Employee", "sales__Order"]);
    assert_eq!(
        catalog.enums().map(|e| e.name.local_name()).collect::<Vec<_>>(),
        ["sales__Status"]
    );
    assert!(table(&catalog, "Order")
        .constraint("fk_sales__Order_owner")
        .is_some());
}

#[test]
fn test_unmapped_module() {
    let registry = build_registry(vec![entity("Orphan", NativeType::Int).into()]);
    let namespaces = NamespaceMapping::new([("other", Some("other"))]).unwrap();

    let err = to_catalog(
        &registry,
        &["Orphan"],
        ConverterOptions::default().with_namespaces(namespaces),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnmappedModule);
}

#[test]
fn test_unknown_root() {
    let registry = build_registry(vec![entity("Known", NativeType::Int).into()]);
    let err = to_catalog(&registry, &["Unknown"], ConverterOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownType);
}
