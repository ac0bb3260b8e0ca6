//! Root operation assembly.
//!
//! Lists the `Query`, `Mutation` and `Subscription` fields of an augmented
//! schema and attaches them as root types. [`RootOperations`] doubles as the
//! resolver-binding manifest: serialized, every root field carries its
//! operation kind, entity, arguments and return type.

use crate::augment::AugmentedSchema;
use crate::naming::{self, derived, shared as shared_names, suffix};
use crate::plan::{EntityPlan, EntityType, UnionPlan};
use indexmap::IndexMap;
use nodegql_schema::{FieldDef, ObjectDef, SchemaBuildError, TypeDef, TypeGraph, TypeRef};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// What a root field does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Read,
    Connection,
    Aggregate,
    Create,
    Update,
    Delete,
    Created,
    Updated,
    Deleted,
}

/// One root field and the entity it operates on.
#[derive(Debug, Clone, PartialEq)]
pub struct RootField {
    pub operation: OperationKind,
    pub entity: String,
    pub field: FieldDef,
}

impl Serialize for RootField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let arguments: IndexMap<&str, String> = self
            .field
            .arguments
            .values()
            .map(|arg| (arg.name.as_str(), arg.ty.to_string()))
            .collect();

        let mut state = serializer.serialize_struct("RootField", 5)?;
        state.serialize_field("name", &self.field.name)?;
        state.serialize_field("operation", &self.operation)?;
        state.serialize_field("entity", &self.entity)?;
        state.serialize_field("arguments", &arguments)?;
        state.serialize_field("returnType", &self.field.ty.to_string())?;
        state.end()
    }
}

/// Root fields of one schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootOperations {
    pub query: Vec<RootField>,
    pub mutation: Vec<RootField>,
    /// `None` when subscriptions are disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Vec<RootField>>,
}

impl RootOperations {
    /// Total number of root fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.query.len() + self.mutation.len() + self.subscription.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds a root field by name across all roots.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&RootField> {
        self.query
            .iter()
            .chain(&self.mutation)
            .chain(self.subscription.iter().flatten())
            .find(|f| f.field.name == name)
    }
}

/// Lists the root fields of an augmented schema.
#[must_use]
pub fn assemble(schema: &AugmentedSchema) -> RootOperations {
    let mut operations = RootOperations {
        subscription: schema.options.subscriptions.then(Vec::new),
        ..RootOperations::default()
    };

    for entity in schema.plan.entities.values() {
        query_fields(entity, &mut operations.query);
        mutation_fields(entity, &mut operations.mutation);
        if let Some(subscription) = &mut operations.subscription {
            subscription_fields(entity, subscription);
        }
    }
    for union in schema.plan.unions.values() {
        if union.read {
            operations.query.push(union_query(union));
        }
    }
    operations
}

fn root_field(operation: OperationKind, entity: &str, field: FieldDef) -> RootField {
    RootField {
        operation,
        entity: entity.to_string(),
        field,
    }
}

fn query_fields(entity: &EntityPlan, out: &mut Vec<RootField>) {
    let name = entity.name.as_str();
    let filter = TypeRef::named(derived(name, suffix::WHERE));
    let sort = entity
        .has(EntityType::Sort)
        .then(|| TypeRef::list_of(derived(name, suffix::SORT)));

    if entity.operations.read {
        let mut list = FieldDef::new(&entity.root, TypeRef::required_list_of(name))
            .argument("where", filter.clone())
            .argument("limit", TypeRef::named("Int"))
            .argument("offset", TypeRef::named("Int"));
        if let Some(sort) = &sort {
            list = list.argument("sort", sort.clone());
        }
        out.push(root_field(OperationKind::Read, name, list));

        let mut connection = FieldDef::new(
            naming::connection_field(&entity.root),
            TypeRef::required(naming::root_connection(&entity.plural)),
        )
        .argument("where", filter.clone())
        .argument("first", TypeRef::named("Int"))
        .argument("after", TypeRef::named("String"));
        if let Some(sort) = sort {
            connection = connection.argument("sort", sort);
        }
        out.push(root_field(OperationKind::Connection, name, connection));
    }

    if entity.has(EntityType::AggregateSelection) {
        let aggregate = FieldDef::new(
            naming::aggregate_field(&entity.root),
            TypeRef::required(derived(name, suffix::AGGREGATE_SELECTION)),
        )
        .argument("where", filter);
        out.push(root_field(OperationKind::Aggregate, name, aggregate));
    }
}

fn mutation_fields(entity: &EntityPlan, out: &mut Vec<RootField>) {
    let name = entity.name.as_str();
    let filter = TypeRef::named(derived(name, suffix::WHERE));

    if entity.operations.create {
        let create = FieldDef::new(
            naming::mutation_field("create", &entity.plural),
            TypeRef::required(naming::mutation_response("Create", &entity.plural)),
        )
        .argument(
            "input",
            TypeRef::required_list_of(derived(name, suffix::CREATE_INPUT)),
        );
        out.push(root_field(OperationKind::Create, name, create));
    }

    if entity.operations.update {
        let mut update = FieldDef::new(
            naming::mutation_field("update", &entity.plural),
            TypeRef::required(naming::mutation_response("Update", &entity.plural)),
        )
        .argument("where", filter.clone());
        let nested = [
            ("update", EntityType::UpdateInput, suffix::UPDATE_INPUT),
            ("connect", EntityType::ConnectInput, suffix::CONNECT_INPUT),
            (
                "disconnect",
                EntityType::DisconnectInput,
                suffix::DISCONNECT_INPUT,
            ),
            ("create", EntityType::RelationInput, suffix::RELATION_INPUT),
            ("delete", EntityType::DeleteInput, suffix::DELETE_INPUT),
        ];
        for (argument, ty, tail) in nested {
            if entity.has(ty) {
                update = update.argument(argument, TypeRef::named(derived(name, tail)));
            }
        }
        out.push(root_field(OperationKind::Update, name, update));
    }

    if entity.operations.delete {
        let mut delete = FieldDef::new(
            naming::mutation_field("delete", &entity.plural),
            TypeRef::required(shared_names::DELETE_INFO),
        )
        .argument("where", filter);
        if entity.has(EntityType::DeleteInput) {
            delete = delete.argument(
                "delete",
                TypeRef::named(derived(name, suffix::DELETE_INPUT)),
            );
        }
        out.push(root_field(OperationKind::Delete, name, delete));
    }
}

fn subscription_fields(entity: &EntityPlan, out: &mut Vec<RootField>) {
    if !entity.has(EntityType::Events) {
        return;
    }
    let name = entity.name.as_str();
    let events = [
        (OperationKind::Created, "Created", suffix::CREATED_EVENT),
        (OperationKind::Updated, "Updated", suffix::UPDATED_EVENT),
        (OperationKind::Deleted, "Deleted", suffix::DELETED_EVENT),
    ];
    for (operation, event, tail) in events {
        let field = FieldDef::new(
            naming::subscription_field(name, event),
            TypeRef::required(derived(name, tail)),
        )
        .argument(
            "where",
            TypeRef::named(derived(name, suffix::SUBSCRIPTION_WHERE)),
        );
        out.push(root_field(operation, name, field));
    }
}

fn union_query(union: &UnionPlan) -> RootField {
    let field = FieldDef::new(&union.root, TypeRef::required_list_of(&union.name))
        .argument("where", TypeRef::named(derived(&union.name, suffix::WHERE)))
        .argument("limit", TypeRef::named("Int"))
        .argument("offset", TypeRef::named("Int"));
    root_field(OperationKind::Read, &union.name, field)
}

/// Attaches the root types to the augmented graph and validates it.
///
/// Root types without fields are left out.
///
/// # Errors
///
/// Returns a [`SchemaBuildError`] if a root type name collides with a
/// generated type, or if the final graph has dangling references or empty
/// types.
pub fn link(
    schema: AugmentedSchema,
    operations: &RootOperations,
) -> Result<TypeGraph, SchemaBuildError> {
    let mut types = schema.types;

    let roots = [
        ("Query", Some(&operations.query)),
        ("Mutation", Some(&operations.mutation)),
        ("Subscription", operations.subscription.as_ref()),
    ];
    for (name, fields) in roots {
        let Some(fields) = fields.filter(|f| !f.is_empty()) else {
            continue;
        };
        let mut root = ObjectDef::new(name);
        for field in fields {
            root.add_field(field.field.clone());
        }
        types.insert(TypeDef::Object(root))?;
        let slot = match name {
            "Query" => &mut types.roots.query,
            "Mutation" => &mut types.roots.mutation,
            _ => &mut types.roots.subscription,
        };
        *slot = Some(name.to_string());
    }

    types.validate()?;
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::augmented;
    use crate::AugmentOptions;

    const MOVIES: &str = r#"
        type Movie {
            title: String!
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN)
        }
        type Actor {
            name: String!
        }
    "#;

    fn names(fields: &[RootField]) -> Vec<&str> {
        fields.iter().map(|f| f.field.name.as_str()).collect()
    }

    #[test]
    fn test_query_and_mutation_fields() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        let operations = assemble(&schema);
        assert_eq!(
            names(&operations.query),
            vec![
                "movies",
                "moviesConnection",
                "moviesAggregate",
                "actors",
                "actorsConnection",
                "actorsAggregate"
            ]
        );
        assert_eq!(
            names(&operations.mutation),
            vec![
                "createMovies",
                "updateMovies",
                "deleteMovies",
                "createActors",
                "updateActors",
                "deleteActors"
            ]
        );
        assert!(operations.subscription.is_none());
    }

    #[test]
    fn test_root_field_arguments() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        let operations = assemble(&schema);

        let movies = &operations.field("movies").unwrap().field;
        let args: Vec<&str> = movies.arguments.keys().map(String::as_str).collect();
        assert_eq!(args, vec!["where", "limit", "offset", "sort"]);
        assert_eq!(movies.ty.to_string(), "[Movie!]!");

        let connection = &operations.field("moviesConnection").unwrap().field;
        let args: Vec<&str> = connection.arguments.keys().map(String::as_str).collect();
        assert_eq!(args, vec!["where", "first", "after", "sort"]);

        let update = &operations.field("updateMovies").unwrap().field;
        let args: Vec<&str> = update.arguments.keys().map(String::as_str).collect();
        assert_eq!(
            args,
            vec!["where", "update", "connect", "disconnect", "create", "delete"]
        );

        let delete = &operations.field("deleteMovies").unwrap().field;
        assert_eq!(delete.ty.to_string(), "DeleteInfo!");
        let update_actors = &operations.field("updateActors").unwrap().field;
        assert!(!update_actors.arguments.contains_key("connect"));
    }

    #[test]
    fn test_query_flags_are_independent() {
        let schema = augmented(
            r#"
            type Movie @query(read: false, aggregate: true) { title: String }
            type Actor @query(read: true, aggregate: false) { name: String }
            "#,
            &AugmentOptions::default(),
        );
        let operations = assemble(&schema);
        assert_eq!(
            names(&operations.query),
            vec!["moviesAggregate", "actors", "actorsConnection"]
        );
    }

    #[test]
    fn test_subscription_fields() {
        let options = AugmentOptions {
            subscriptions: true,
            ..AugmentOptions::default()
        };
        let schema = augmented(MOVIES, &options);
        let operations = assemble(&schema);
        let subscription = operations.subscription.as_deref().unwrap();
        assert_eq!(
            names(subscription),
            vec![
                "movieCreated",
                "movieUpdated",
                "movieDeleted",
                "actorCreated",
                "actorUpdated",
                "actorDeleted"
            ]
        );
        assert_eq!(subscription[0].field.ty.to_string(), "MovieCreatedEvent!");
    }

    #[test]
    fn test_union_root_query() {
        let schema = augmented(
            r#"
            union Production = Movie | Series
            type Movie { title: String }
            type Series { title: String }
            "#,
            &AugmentOptions::default(),
        );
        let operations = assemble(&schema);
        let productions = operations.field("productions").unwrap();
        assert_eq!(productions.field.ty.to_string(), "[Production!]!");
        assert!(operations.field("productionsConnection").is_none());
    }

    #[test]
    fn test_link_sets_roots() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        let operations = assemble(&schema);
        let graph = link(schema, &operations).unwrap();
        assert_eq!(graph.roots.query.as_deref(), Some("Query"));
        assert_eq!(graph.roots.mutation.as_deref(), Some("Mutation"));
        assert!(graph.roots.subscription.is_none());
        assert!(graph.object("Query").unwrap().fields.contains_key("movies"));
    }

    #[test]
    fn test_manifest_serialization() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        let operations = assemble(&schema);
        let manifest = serde_json::to_value(&operations).unwrap();
        let first = &manifest["query"][0];
        assert_eq!(first["name"], "movies");
        assert_eq!(first["operation"], "read");
        assert_eq!(first["entity"], "Movie");
        assert_eq!(first["arguments"]["where"], "MovieWhere");
        assert_eq!(first["returnType"], "[Movie!]!");
        assert!(manifest.get("subscription").is_none());
    }
}
