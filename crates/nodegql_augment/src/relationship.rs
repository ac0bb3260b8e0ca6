//! Relationship-level generation.
//!
//! Runs after every entity-level type exists. Each relationship appends
//! output fields to its owner, filter fields to the owner's `Where`, and
//! fields to the owner's mutation inputs, and builds its own connection
//! and nested mutation types.

use crate::augment::Augmenter;
use crate::naming::{self, derived, shared as shared_names, suffix};
use crate::plan::{EntityType, MemberPlan, MemberType, RelationshipPlan, RelationshipType};
use crate::shared;
use indexmap::IndexMap;
use nodegql_model::{Edge, Entity, Relationship};
use nodegql_schema::{
    FieldDef, InputFieldDef, InputObjectDef, ObjectDef, SchemaBuildError, TypeDef, TypeRef,
    UnionDef,
};

const QUANTIFIERS: &[&str] = &["ALL", "NONE", "SINGLE", "SOME"];

/// `[T!]` for list relationships, `T` otherwise.
fn many(rel: &Relationship, name: impl Into<String>) -> TypeRef {
    if rel.is_list() {
        TypeRef::list_of(name)
    } else {
        TypeRef::named(name)
    }
}

impl Augmenter<'_> {
    pub(crate) fn relationships(&mut self, entity: &Entity) -> Result<(), SchemaBuildError> {
        let plans = self.plan;
        let Some(entity_plan) = plans.entity(&entity.name) else {
            return Ok(());
        };

        // Connect, disconnect, delete and relation inputs only exist when a
        // relationship contributes to them.
        let mut pending: IndexMap<EntityType, InputObjectDef> = IndexMap::new();

        for rel in &entity.relationships {
            let Some(rel_plan) = entity_plan.relationships.get(&rel.field_name) else {
                continue;
            };
            tracing::debug!(
                entity = %entity.name,
                relationship = %rel.field_name,
                target = rel.target.name(),
                "augmenting relationship"
            );

            self.relationship_output(entity, rel, rel_plan);
            if rel_plan.has(RelationshipType::Connection) {
                self.connection_types(rel, rel_plan)?;
            }
            self.connection_where(entity, rel, rel_plan)?;
            if rel_plan.has(RelationshipType::ConnectionSort) {
                self.connection_sort(entity, rel, rel_plan)?;
            }
            self.relationship_aggregation(entity, rel, rel_plan)?;

            for member in &rel_plan.members {
                self.member_inputs(rel, member)?;
            }
            if rel_plan.keyed {
                self.keyed_inputs(rel, rel_plan)?;
            }

            self.relationship_filters(entity, rel, rel_plan);
            self.entity_input_fields(entity, rel, rel_plan, &mut pending);
        }

        for (_, input) in pending {
            self.types.insert(TypeDef::InputObject(input))?;
        }
        Ok(())
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Adds `f`, `fConnection` and `fAggregate` to the owner.
    ///
    /// A relationship implementing an interface's declared relationship
    /// takes its connection and aggregation signature from the interface.
    fn relationship_output(
        &mut self,
        entity: &Entity,
        rel: &Relationship,
        rel_plan: &RelationshipPlan,
    ) {
        let graph = self.graph;
        let plans = self.plan;

        let mirrored = rel_plan.mirror.as_deref().and_then(|root| {
            let root_rel = graph.entity(root)?.relationship(&rel.field_name)?;
            let root_plan = plans.relationship(root, &rel.field_name)?;
            Some((root, root_rel, root_plan))
        });
        let (source_owner, source_rel, source_plan) =
            mirrored.unwrap_or((entity.name.as_str(), rel, rel_plan));

        if !source_rel.selectable.on_read {
            return;
        }

        let target = rel.target.name();
        let target_where = derived(target, suffix::WHERE);

        let mut list = FieldDef::new(&rel.field_name, rel.ty.clone())
            .with_description(rel.description.clone())
            .deprecated_if(rel.deprecation.as_ref())
            .with_directives(rel.directives.clone())
            .argument("where", TypeRef::named(&target_where))
            .argument("limit", TypeRef::named("Int"))
            .argument("offset", TypeRef::named("Int"));
        if plans.entity_has(target, EntityType::Sort) {
            list = list.argument("sort", TypeRef::list_of(derived(target, suffix::SORT)));
        }
        self.add_output_field(&entity.name, list);

        let prefix = naming::relationship_prefix(source_owner, &rel.field_name);
        let mut connection = FieldDef::new(
            naming::connection_field(&rel.field_name),
            TypeRef::required(derived(&prefix, suffix::CONNECTION)),
        )
        .deprecated_if(rel.deprecation.as_ref())
        .argument(
            "where",
            TypeRef::named(derived(&prefix, suffix::CONNECTION_WHERE)),
        )
        .argument("first", TypeRef::named("Int"))
        .argument("after", TypeRef::named("String"));
        if source_plan.has(RelationshipType::ConnectionSort) {
            connection = connection.argument(
                "sort",
                TypeRef::list_of(derived(&prefix, suffix::CONNECTION_SORT)),
            );
        }
        self.add_output_field(&entity.name, connection);

        if source_plan.has(RelationshipType::AggregationSelection) {
            let base = naming::aggregation_base(source_owner, target, &rel.field_name);
            let aggregate = FieldDef::new(
                naming::aggregate_field(&rel.field_name),
                TypeRef::named(derived(&base, suffix::AGGREGATION_SELECTION)),
            )
            .deprecated_if(rel.deprecation.as_ref())
            .argument("where", TypeRef::named(target_where));
            self.add_output_field(&entity.name, aggregate);
        }
    }

    /// `PConnection` and `PRelationship`.
    fn connection_types(
        &mut self,
        rel: &Relationship,
        rel_plan: &RelationshipPlan,
    ) -> Result<(), SchemaBuildError> {
        let prefix = rel_plan.prefix.as_str();
        let relationship_name = derived(prefix, suffix::RELATIONSHIP);
        self.types.insert_shared(shared::page_info())?;

        let connection = ObjectDef::new(derived(prefix, suffix::CONNECTION))
            .field(FieldDef::new(
                "edges",
                TypeRef::required_list_of(&relationship_name),
            ))
            .field(FieldDef::new("totalCount", TypeRef::required("Int")))
            .field(FieldDef::new(
                "pageInfo",
                TypeRef::required(shared_names::PAGE_INFO),
            ));
        self.types.insert(TypeDef::Object(connection))?;

        let mut relationship = ObjectDef::new(relationship_name)
            .field(FieldDef::new("cursor", TypeRef::required("String")))
            .field(FieldDef::new("node", TypeRef::required(rel.target.name())));
        match &rel.edge {
            Edge::Concrete {
                properties: Some(props),
                ..
            } => {
                relationship.add_field(FieldDef::new("properties", TypeRef::required(props)));
            }
            Edge::Declared { properties } if !properties.is_empty() => {
                let union_name = derived(prefix, suffix::RELATIONSHIP_PROPERTIES);
                self.types.insert(TypeDef::Union(UnionDef::new(
                    &union_name,
                    properties.clone(),
                )))?;
                relationship.add_field(FieldDef::new("properties", TypeRef::required(union_name)));
            }
            _ => {}
        }
        self.types.insert(TypeDef::Object(relationship))
    }

    // =========================================================================
    // Connection filters and sorting
    // =========================================================================

    fn connection_where(
        &mut self,
        entity: &Entity,
        rel: &Relationship,
        rel_plan: &RelationshipPlan,
    ) -> Result<(), SchemaBuildError> {
        let name = derived(&rel_plan.prefix, suffix::CONNECTION_WHERE);

        if rel_plan.keyed {
            let mut keyed = InputObjectDef::new(&name);
            for member in &rel_plan.members {
                keyed.add_field(InputFieldDef::new(
                    &member.name,
                    TypeRef::named(derived(&member.prefix, suffix::CONNECTION_WHERE)),
                ));
                let input = self.node_connection_where(rel, &member.prefix, &member.name);
                self.types.insert(TypeDef::InputObject(input))?;
            }
            // An interface without implementers has no members.
            shared::fill_empty_input(&mut keyed);
            return self.types.insert(TypeDef::InputObject(keyed));
        }

        if entity.is_interface() {
            let mut input = shared::logical_input(&name);
            input.add_field(InputFieldDef::new(
                "node",
                TypeRef::named(derived(rel.target.name(), suffix::WHERE)),
            ));
            if let Edge::Declared { properties } = &rel.edge {
                if !properties.is_empty() {
                    let edge_where = derived(&rel_plan.prefix, suffix::EDGE_WHERE);
                    let mut keyed = InputObjectDef::new(&edge_where);
                    for props in properties {
                        keyed.add_field(InputFieldDef::new(
                            props,
                            TypeRef::named(derived(props, suffix::WHERE)),
                        ));
                    }
                    self.types.insert(TypeDef::InputObject(keyed))?;
                    input.add_field(InputFieldDef::new("edge", TypeRef::named(edge_where)));
                }
            }
            return self.types.insert(TypeDef::InputObject(input));
        }

        let input = self.node_connection_where(rel, &rel_plan.prefix, rel.target.name());
        self.types.insert(TypeDef::InputObject(input))
    }

    /// `{AND, OR, NOT, node: <node>Where, edge: <Props>Where}`.
    fn node_connection_where(
        &self,
        rel: &Relationship,
        prefix: &str,
        node: &str,
    ) -> InputObjectDef {
        let mut input = shared::logical_input(derived(prefix, suffix::CONNECTION_WHERE));
        input.add_field(InputFieldDef::new(
            "node",
            TypeRef::named(derived(node, suffix::WHERE)),
        ));
        if let Some(props) = rel.properties() {
            input.add_field(InputFieldDef::new(
                "edge",
                TypeRef::named(derived(props, suffix::WHERE)),
            ));
        }
        input
    }

    fn connection_sort(
        &mut self,
        entity: &Entity,
        rel: &Relationship,
        rel_plan: &RelationshipPlan,
    ) -> Result<(), SchemaBuildError> {
        let graph = self.graph;
        let plans = self.plan;
        let mut input = InputObjectDef::new(derived(&rel_plan.prefix, suffix::CONNECTION_SORT));

        let target = rel.target.name();
        if plans.entity_has(target, EntityType::Sort) {
            input.add_field(InputFieldDef::new(
                "node",
                TypeRef::named(derived(target, suffix::SORT)),
            ));
        }
        if !entity.is_interface() {
            let sortable_props = rel
                .properties()
                .and_then(|p| graph.properties.get(p))
                .filter(|p| crate::plan::has_sortable_fields(&p.fields));
            if let Some(props) = sortable_props {
                input.add_field(InputFieldDef::new(
                    "edge",
                    TypeRef::named(derived(&props.name, suffix::SORT)),
                ));
            }
        }
        self.types.insert(TypeDef::InputObject(input))
    }

    // =========================================================================
    // Nested mutation inputs
    // =========================================================================

    /// Returns true if creating an edge of this type requires properties.
    fn edge_required(&self, props: &str) -> bool {
        self.graph.properties.get(props).is_some_and(|p| {
            p.fields
                .iter()
                .any(|f| f.settable.on_create && f.ty.is_non_null())
        })
    }

    fn member_inputs(
        &mut self,
        rel: &Relationship,
        member: &MemberPlan,
    ) -> Result<(), SchemaBuildError> {
        let plans = self.plan;
        let prefix = member.prefix.as_str();
        let name = member.name.as_str();
        let props = rel.properties();
        let connection_where = derived(prefix, suffix::CONNECTION_WHERE);

        let create_edge = props.map(|props| {
            let input = derived(props, suffix::CREATE_INPUT);
            let ty = if self.edge_required(props) {
                TypeRef::required(input)
            } else {
                TypeRef::named(input)
            };
            InputFieldDef::new("edge", ty)
        });

        if member.has(MemberType::CreateFieldInput) {
            let mut input = InputObjectDef::new(derived(prefix, suffix::CREATE_FIELD_INPUT)).field(
                InputFieldDef::new("node", TypeRef::required(derived(name, suffix::CREATE_INPUT))),
            );
            if let Some(edge) = &create_edge {
                input.add_field(edge.clone());
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }

        if member.has(MemberType::ConnectFieldInput) {
            let mut input = InputObjectDef::new(derived(prefix, suffix::CONNECT_FIELD_INPUT)).field(
                InputFieldDef::new("where", TypeRef::named(derived(name, suffix::CONNECT_WHERE))),
            );
            if plans.entity_has(name, EntityType::ConnectInput) {
                input.add_field(InputFieldDef::new(
                    "connect",
                    TypeRef::list_of(derived(name, suffix::CONNECT_INPUT)),
                ));
            }
            if let Some(edge) = create_edge {
                input.add_field(edge);
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }

        if member.has(MemberType::DisconnectFieldInput) {
            let mut input = InputObjectDef::new(derived(prefix, suffix::DISCONNECT_FIELD_INPUT))
                .field(InputFieldDef::new("where", TypeRef::named(&connection_where)));
            if plans.entity_has(name, EntityType::DisconnectInput) {
                input.add_field(InputFieldDef::new(
                    "disconnect",
                    TypeRef::named(derived(name, suffix::DISCONNECT_INPUT)),
                ));
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }

        if member.has(MemberType::DeleteFieldInput) {
            let mut input = InputObjectDef::new(derived(prefix, suffix::DELETE_FIELD_INPUT))
                .field(InputFieldDef::new("where", TypeRef::named(&connection_where)));
            if plans.entity_has(name, EntityType::DeleteInput) {
                input.add_field(InputFieldDef::new(
                    "delete",
                    TypeRef::named(derived(name, suffix::DELETE_INPUT)),
                ));
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }

        if member.has(MemberType::UpdateConnectionInput) {
            let mut input = InputObjectDef::new(derived(prefix, suffix::UPDATE_CONNECTION_INPUT))
                .field(InputFieldDef::new(
                    "node",
                    TypeRef::named(derived(name, suffix::UPDATE_INPUT)),
                ));
            if let Some(props) = props {
                input.add_field(InputFieldDef::new(
                    "edge",
                    TypeRef::named(derived(props, suffix::UPDATE_INPUT)),
                ));
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }

        if member.has(MemberType::UpdateFieldInput) {
            let mut input = InputObjectDef::new(derived(prefix, suffix::UPDATE_FIELD_INPUT))
                .field(InputFieldDef::new("where", TypeRef::named(&connection_where)));
            let verbs = [
                ("update", member.verbs.update, MemberType::UpdateConnectionInput),
                ("connect", member.verbs.connect, MemberType::ConnectFieldInput),
                ("disconnect", member.verbs.disconnect, MemberType::DisconnectFieldInput),
                ("create", member.verbs.create, MemberType::CreateFieldInput),
                ("delete", member.verbs.delete, MemberType::DeleteFieldInput),
            ];
            for (field, enabled, ty) in verbs {
                if !enabled || !member.has(ty) {
                    continue;
                }
                let name = derived(prefix, member_suffix(ty));
                let ty = if ty == MemberType::UpdateConnectionInput {
                    TypeRef::named(name)
                } else {
                    many(rel, name)
                };
                input.add_field(InputFieldDef::new(field, ty));
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }

        if member.has(MemberType::FieldInput) {
            let mut input = InputObjectDef::new(derived(prefix, suffix::FIELD_INPUT));
            if member.verbs.create && member.has(MemberType::CreateFieldInput) {
                input.add_field(InputFieldDef::new(
                    "create",
                    many(rel, derived(prefix, suffix::CREATE_FIELD_INPUT)),
                ));
            }
            if member.verbs.connect && member.has(MemberType::ConnectFieldInput) {
                input.add_field(InputFieldDef::new(
                    "connect",
                    many(rel, derived(prefix, suffix::CONNECT_FIELD_INPUT)),
                ));
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }

        Ok(())
    }

    /// Member-keyed dictionaries of an abstract-target relationship.
    fn keyed_inputs(
        &mut self,
        rel: &Relationship,
        rel_plan: &RelationshipPlan,
    ) -> Result<(), SchemaBuildError> {
        let prefix = rel_plan.prefix.as_str();
        for (rel_type, dictionary, member_type) in DICTIONARIES {
            if !rel_plan.has(*rel_type) {
                continue;
            }
            let member_type = *member_type;
            let mut input = InputObjectDef::new(derived(prefix, dictionary));
            for member in rel_plan.members.iter().filter(|m| m.has(member_type)) {
                let name = derived(&member.prefix, member_suffix(member_type));
                let ty = if member_type == MemberType::FieldInput {
                    TypeRef::named(name)
                } else {
                    many(rel, name)
                };
                input.add_field(InputFieldDef::new(&member.name, ty));
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }
        Ok(())
    }

    // =========================================================================
    // Owner inputs
    // =========================================================================

    fn relationship_filters(
        &mut self,
        entity: &Entity,
        rel: &Relationship,
        rel_plan: &RelationshipPlan,
    ) {
        let owner_where = derived(&entity.name, suffix::WHERE);
        let field = rel.field_name.as_str();
        let connection = naming::connection_field(field);
        let target_where = derived(rel.target.name(), suffix::WHERE);
        let connection_where = derived(&rel_plan.prefix, suffix::CONNECTION_WHERE);
        let deprecation = rel.deprecation.as_ref();
        let mut filters: Vec<InputFieldDef> = Vec::new();

        if rel.filterable.by_value {
            if rel.is_list() {
                if self.options.legacy_filters {
                    let reason = |replacement: String| match deprecation {
                        Some(d) => d.reason.clone(),
                        None => Some(format!("Use `{replacement}` instead.")),
                    };
                    filters.push(
                        InputFieldDef::new(field, TypeRef::named(&target_where))
                            .deprecated(reason(format!("{field}_SOME"))),
                    );
                    filters.push(
                        InputFieldDef::new(&connection, TypeRef::named(&connection_where))
                            .deprecated(reason(format!("{connection}_SOME"))),
                    );
                }
                for quantifier in QUANTIFIERS {
                    filters.push(
                        InputFieldDef::new(
                            format!("{field}_{quantifier}"),
                            TypeRef::named(&target_where),
                        )
                        .deprecated_if(deprecation),
                    );
                }
                for quantifier in QUANTIFIERS {
                    filters.push(
                        InputFieldDef::new(
                            format!("{connection}_{quantifier}"),
                            TypeRef::named(&connection_where),
                        )
                        .deprecated_if(deprecation),
                    );
                }
            } else {
                for (name, ty) in [
                    (field.to_string(), &target_where),
                    (format!("{field}_NOT"), &target_where),
                    (connection.clone(), &connection_where),
                    (format!("{connection}_NOT"), &connection_where),
                ] {
                    filters.push(
                        InputFieldDef::new(name, TypeRef::named(ty)).deprecated_if(deprecation),
                    );
                }
            }
        }

        if rel_plan.has(RelationshipType::AggregateInput) {
            filters.push(
                InputFieldDef::new(
                    naming::aggregate_field(field),
                    TypeRef::named(derived(&rel_plan.prefix, suffix::AGGREGATE_INPUT)),
                )
                .deprecated_if(deprecation),
            );
        }

        for filter in filters {
            self.add_input_field(&owner_where, filter);
        }
    }

    /// Adds the relationship to the owner's create and update inputs and
    /// collects its connect, disconnect, delete and relation fields.
    fn entity_input_fields(
        &mut self,
        entity: &Entity,
        rel: &Relationship,
        rel_plan: &RelationshipPlan,
        pending: &mut IndexMap<EntityType, InputObjectDef>,
    ) {
        let prefix = rel_plan.prefix.as_str();
        let field = rel.field_name.as_str();
        let deprecation = rel.deprecation.as_ref();

        for (rel_type, dictionary, member_type) in DICTIONARIES {
            if !rel_plan.has(*rel_type) {
                continue;
            }
            let ty = if rel_plan.keyed {
                TypeRef::named(derived(prefix, dictionary))
            } else if *member_type == MemberType::FieldInput {
                TypeRef::named(derived(prefix, member_suffix(*member_type)))
            } else {
                many(rel, derived(prefix, member_suffix(*member_type)))
            };
            let input_field = InputFieldDef::new(field, ty).deprecated_if(deprecation);

            let (collected, owner_suffix) = match rel_type {
                RelationshipType::ConnectInputField => {
                    (Some(EntityType::ConnectInput), suffix::CONNECT_INPUT)
                }
                RelationshipType::DisconnectInputField => {
                    (Some(EntityType::DisconnectInput), suffix::DISCONNECT_INPUT)
                }
                RelationshipType::DeleteInputField => {
                    (Some(EntityType::DeleteInput), suffix::DELETE_INPUT)
                }
                RelationshipType::RelationInputField => {
                    (Some(EntityType::RelationInput), suffix::RELATION_INPUT)
                }
                RelationshipType::UpdateInputField => (None, suffix::UPDATE_INPUT),
                _ => (None, suffix::CREATE_INPUT),
            };
            let owner_input = derived(&entity.name, owner_suffix);
            match collected {
                // Create and update inputs exist from the entity phase.
                None => self.add_input_field(&owner_input, input_field),
                Some(entity_type) => pending
                    .entry(entity_type)
                    .or_insert_with(|| InputObjectDef::new(owner_input))
                    .add_field(input_field),
            }
        }
    }
}

/// Owner-level dictionary suffix and member input of each keyed input.
const DICTIONARIES: &[(RelationshipType, &str, MemberType)] = &[
    (
        RelationshipType::CreateInputField,
        suffix::CREATE_INPUT,
        MemberType::FieldInput,
    ),
    (
        RelationshipType::UpdateInputField,
        suffix::UPDATE_INPUT,
        MemberType::UpdateFieldInput,
    ),
    (
        RelationshipType::ConnectInputField,
        suffix::CONNECT_INPUT,
        MemberType::ConnectFieldInput,
    ),
    (
        RelationshipType::DisconnectInputField,
        suffix::DISCONNECT_INPUT,
        MemberType::DisconnectFieldInput,
    ),
    (
        RelationshipType::DeleteInputField,
        suffix::DELETE_INPUT,
        MemberType::DeleteFieldInput,
    ),
    (
        RelationshipType::RelationInputField,
        suffix::CREATE_FIELD_INPUT,
        MemberType::CreateFieldInput,
    ),
];

const fn member_suffix(ty: MemberType) -> &'static str {
    match ty {
        MemberType::FieldInput => suffix::FIELD_INPUT,
        MemberType::CreateFieldInput => suffix::CREATE_FIELD_INPUT,
        MemberType::ConnectFieldInput => suffix::CONNECT_FIELD_INPUT,
        MemberType::UpdateFieldInput => suffix::UPDATE_FIELD_INPUT,
        MemberType::UpdateConnectionInput => suffix::UPDATE_CONNECTION_INPUT,
        MemberType::DisconnectFieldInput => suffix::DISCONNECT_FIELD_INPUT,
        MemberType::DeleteFieldInput => suffix::DELETE_FIELD_INPUT,
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{augmented, field_names};
    use crate::AugmentOptions;

    const MOVIES: &str = r#"
        type Movie {
            title: String!
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
            director: Director @relationship(type: "DIRECTED", direction: IN)
        }

        type Actor {
            name: String!
            movies: [Movie!]! @relationship(type: "ACTED_IN", direction: OUT, properties: "ActedIn")
        }

        type Director {
            name: String!
        }

        type ActedIn @relationshipProperties {
            role: String!
        }
    "#;

    fn ty(schema: &crate::AugmentedSchema, input: &str, field: &str) -> String {
        schema.types.input(input).unwrap().fields[field].ty.to_string()
    }

    #[test]
    fn test_relationship_output_fields() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        let movie = schema.types.object("Movie").unwrap();
        let actors = &movie.fields["actors"];
        assert_eq!(actors.ty.to_string(), "[Actor!]!");
        let args: Vec<&str> = actors.arguments.keys().map(String::as_str).collect();
        assert_eq!(args, vec!["where", "limit", "offset", "sort"]);

        let connection = &movie.fields["actorsConnection"];
        assert_eq!(connection.ty.to_string(), "MovieActorsConnection!");
        assert_eq!(
            connection.arguments["sort"].ty.to_string(),
            "[MovieActorsConnectionSort!]"
        );
        assert_eq!(
            movie.fields["actorsAggregate"].ty.to_string(),
            "MovieActorActorsAggregationSelection"
        );
    }

    #[test]
    fn test_connection_types() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        let relationship = schema.types.object("MovieActorsRelationship").unwrap();
        assert_eq!(relationship.fields["node"].ty.to_string(), "Actor!");
        assert_eq!(relationship.fields["properties"].ty.to_string(), "ActedIn!");
        assert_eq!(
            field_names(&schema, "MovieActorsConnectionWhere"),
            vec!["AND", "OR", "NOT", "node", "edge"]
        );
        assert_eq!(
            field_names(&schema, "MovieActorsConnectionSort"),
            vec!["node", "edge"]
        );
    }

    #[test]
    fn test_nested_inputs() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        assert_eq!(ty(&schema, "MovieCreateInput", "actors"), "MovieActorsFieldInput");
        assert_eq!(ty(&schema, "MovieCreateInput", "director"), "MovieDirectorFieldInput");
        assert_eq!(
            ty(&schema, "MovieUpdateInput", "actors"),
            "[MovieActorsUpdateFieldInput!]"
        );
        assert_eq!(
            ty(&schema, "MovieUpdateInput", "director"),
            "MovieDirectorUpdateFieldInput"
        );
        assert_eq!(
            ty(&schema, "MovieActorsFieldInput", "create"),
            "[MovieActorsCreateFieldInput!]"
        );
        assert_eq!(ty(&schema, "MovieActorsCreateFieldInput", "edge"), "ActedInCreateInput!");
        assert_eq!(ty(&schema, "MovieActorsCreateFieldInput", "node"), "ActorCreateInput!");
        assert_eq!(
            ty(&schema, "MovieActorsConnectFieldInput", "connect"),
            "[ActorConnectInput!]"
        );
        assert_eq!(
            field_names(&schema, "MovieActorsUpdateFieldInput"),
            vec!["where", "update", "connect", "disconnect", "create", "delete"]
        );
        assert_eq!(
            ty(&schema, "MovieConnectInput", "actors"),
            "[MovieActorsConnectFieldInput!]"
        );
        assert_eq!(
            ty(&schema, "MovieRelationInput", "director"),
            "MovieDirectorCreateFieldInput"
        );
    }

    #[test]
    fn test_where_relationship_filters() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        let filter = schema.types.input("MovieWhere").unwrap();
        for name in [
            "actors_ALL",
            "actors_NONE",
            "actors_SINGLE",
            "actors_SOME",
            "actorsConnection_SOME",
            "director",
            "director_NOT",
            "directorConnection",
            "directorConnection_NOT",
            "actorsAggregate",
        ] {
            assert!(filter.fields.contains_key(name), "missing {name}");
        }
        assert_eq!(
            filter.fields["actors"].deprecation_reason.as_deref(),
            Some("Use `actors_SOME` instead.")
        );
        assert_eq!(
            filter.fields["actorsConnection"].deprecation_reason.as_deref(),
            Some("Use `actorsConnection_SOME` instead.")
        );
    }

    #[test]
    fn test_union_relationship_is_keyed() {
        let schema = augmented(
            r#"
            union Production = Movie | Series
            type Movie { title: String }
            type Series { title: String }
            type Actor {
                name: String
                actedIn: [Production!]! @relationship(type: "ACTED_IN", direction: OUT)
            }
            "#,
            &AugmentOptions::default(),
        );
        assert_eq!(
            field_names(&schema, "ActorActedInCreateInput"),
            vec!["Movie", "Series"]
        );
        assert_eq!(
            ty(&schema, "ActorActedInCreateInput", "Movie"),
            "ActorActedInMovieFieldInput"
        );
        assert_eq!(
            ty(&schema, "ActorActedInConnectionWhere", "Series"),
            "ActorActedInSeriesConnectionWhere"
        );
        assert_eq!(ty(&schema, "ActorCreateInput", "actedIn"), "ActorActedInCreateInput");
        assert_eq!(ty(&schema, "ActorUpdateInput", "actedIn"), "ActorActedInUpdateInput");
        assert!(!schema.types.contains("ActorActedInAggregateInput"));
        let actor = schema.types.object("Actor").unwrap();
        assert!(!actor.fields.contains_key("actedInAggregate"));
    }

    #[test]
    fn test_interface_relationship_mirrors_root() {
        let schema = augmented(
            r#"
            interface Production {
                title: String!
                actors: [Actor!]! @declareRelationship
            }
            type Movie implements Production {
                title: String!
                actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
            }
            type Series implements Production {
                title: String!
                actors: [Actor!]! @relationship(type: "STARRED_IN", direction: IN, properties: "StarredIn")
            }
            type Actor { name: String! }
            type ActedIn @relationshipProperties { role: String }
            type StarredIn @relationshipProperties { episodes: Int }
            "#,
            &AugmentOptions::default(),
        );
        let movie = schema.types.object("Movie").unwrap();
        assert_eq!(
            movie.fields["actorsConnection"].ty.to_string(),
            "ProductionActorsConnection!"
        );
        assert!(!schema.types.contains("MovieActorsConnection"));

        match schema.types.get("ProductionActorsRelationshipProperties") {
            Some(nodegql_schema::TypeDef::Union(def)) => {
                assert_eq!(def.members, vec!["ActedIn", "StarredIn"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            field_names(&schema, "ProductionActorsEdgeWhere"),
            vec!["ActedIn", "StarredIn"]
        );
        assert_eq!(ty(&schema, "MovieActorsConnectionWhere", "edge"), "ActedInWhere");
        assert!(schema.types.contains("MovieActorsUpdateFieldInput"));
        assert!(!schema.types.contains("ProductionActorsUpdateFieldInput"));
    }

    #[test]
    fn test_settable_relationship_asymmetry() {
        let schema = augmented(
            r#"
            type Movie {
                title: String
                actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN) @settable(onCreate: false)
            }
            type Actor { name: String }
            "#,
            &AugmentOptions::default(),
        );
        let create = schema.types.input("MovieCreateInput").unwrap();
        assert!(!create.fields.contains_key("actors"));
        assert!(!schema.types.contains("MovieActorsFieldInput"));
        assert!(schema.types.contains("MovieActorsCreateFieldInput"));
        assert!(schema.types.input("MovieUpdateInput").unwrap().fields.contains_key("actors"));
    }
}
