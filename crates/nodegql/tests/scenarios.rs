//! End-to-end builds of small, complete type definitions.

use nodegql::schema::TypeDef;
use nodegql::{build_schema, codes, BuildError, BuiltSchema, OperationKind, SchemaConfig};

fn build_with(type_defs: &str, config: &SchemaConfig) -> BuiltSchema {
    match build_schema(type_defs, config) {
        Ok(schema) => schema,
        Err(err) => panic!("build failed: {err} {:?}", err.diagnostics()),
    }
}

fn keys(schema: &BuiltSchema, name: &str) -> Vec<String> {
    match schema.graph.get(name) {
        Some(TypeDef::InputObject(input)) => input.fields.keys().cloned().collect(),
        Some(TypeDef::Object(object)) => object.fields.keys().cloned().collect(),
        Some(TypeDef::Enum(def)) => def.values.iter().map(|v| v.name.clone()).collect(),
        other => panic!("unexpected {name}: {other:?}"),
    }
}

#[test]
fn test_relationship_without_aggregation() {
    let schema = build_with(
        r#"
        type Movie {
            title: String
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, aggregate: false)
        }
        type Actor { name: String }
        "#,
        &SchemaConfig::default(),
    );

    assert!(!schema.graph.contains("MovieActorActorsAggregationSelection"));
    assert!(!schema.sdl.contains("MovieActorActorsAggregationSelection"));
    let movie = keys(&schema, "Movie");
    assert!(!movie.contains(&"actorsAggregate".to_string()));
    assert!(movie.contains(&"actors".to_string()));
    assert!(movie.contains(&"actorsConnection".to_string()));
}

#[test]
fn test_unsettable_field_stays_in_event_payload() {
    let schema = build_with(
        r#"
        type Movie {
            title: String
            description: String @settable(onCreate: false, onUpdate: false)
        }
        "#,
        &SchemaConfig::default().with_subscriptions(true),
    );

    for input in ["MovieCreateInput", "MovieUpdateInput"] {
        let fields = keys(&schema, input);
        assert!(!fields.iter().any(|f| f.starts_with("description")), "{input}");
        assert!(fields.contains(&"title".to_string()), "{input}");
    }
    assert!(keys(&schema, "MovieEventPayload").contains(&"description".to_string()));
    assert!(schema.graph.roots.subscription.is_some());
}

#[test]
fn test_interface_filter_discriminates_by_implementation() {
    let schema = build_with(
        r#"
        interface Person { name: String! }
        type Actor implements Person { name: String! }
        "#,
        &SchemaConfig::default(),
    );

    let filter = keys(&schema, "PersonWhere");
    assert!(filter.contains(&"typename".to_string()));
    assert!(filter.contains(&"typename_IN".to_string()));
    assert_eq!(keys(&schema, "PersonImplementation"), vec!["Actor"]);
    assert!(schema.sdl.contains("typename: [PersonImplementation!]"));

    let strict = build_with(
        "interface Person { name: String! }\ntype Actor implements Person { name: String! }",
        &SchemaConfig::default().with_legacy_filters(false),
    );
    let filter = keys(&strict, "PersonWhere");
    assert!(filter.contains(&"typename".to_string()));
    assert!(!filter.contains(&"typename_IN".to_string()));
}

#[test]
fn test_validation_errors_are_collected() {
    let err = build_schema(
        r#"
        type Query { x: Int }
        type Movie {
            title: Missing
            actors: [Actor!]!
        }
        type Actor { name: String }
        type Actor { age: Int }
        "#,
        &SchemaConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::Validation(_)));
    let diagnostics = err.diagnostics().unwrap();
    for code in [
        codes::RESERVED_TYPE_NAME,
        codes::UNDEFINED_TYPE,
        codes::MISSING_RELATIONSHIP_DIRECTIVE,
        codes::DUPLICATE_TYPE,
    ] {
        assert!(diagnostics.contains_code(code), "missing {code}");
    }
    assert!(diagnostics.error_count() >= 4);
}

#[test]
fn test_unused_properties_type_is_a_warning() {
    let schema = build_with(
        r#"
        type Movie { title: String }
        type Unused @relationshipProperties { since: Int }
        "#,
        &SchemaConfig::default(),
    );
    assert!(schema.warnings.contains_code(codes::UNUSED_PROPERTIES_TYPE));
    assert!(!schema.warnings.has_errors());
}

#[test]
fn test_mutation_directive_limits_root_mutations() {
    let schema = build_with(
        r#"
        type Movie @mutation(operations: [CREATE]) { title: String }
        type Log @mutation(operations: []) @query(read: false, aggregate: false) { line: String }
        "#,
        &SchemaConfig::default(),
    );

    let ops = &schema.operations;
    assert_eq!(ops.field("createMovies").unwrap().operation, OperationKind::Create);
    assert!(ops.field("updateMovies").is_none());
    assert!(ops.field("deleteMovies").is_none());
    assert!(ops.field("logs").is_none());
    assert!(ops.field("createLogs").is_none());
    assert!(schema.graph.object("Log").is_some());
}

#[test]
fn test_minimal_schema_snapshot() {
    let schema = build_with(
        "type Tag { name: String }",
        &SchemaConfig::default().with_legacy_filters(false),
    );
    let query = schema.graph.object("Query").unwrap();
    let fields: Vec<String> = query
        .fields
        .values()
        .map(|f| format!("{}: {}", f.name, f.ty))
        .collect();
    insta::assert_debug_snapshot!(fields, @r###"
    [
        "tags: [Tag!]!",
        "tagsConnection: TagsConnection!",
        "tagsAggregate: TagAggregateSelection!",
    ]
    "###);
}
