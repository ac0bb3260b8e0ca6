//! The augmentation engine.
//!
//! Entity-level types are built for every entity before any relationship
//! is visited, so relationship generation only ever appends fields to
//! types that already exist. Names referenced across entities are checked
//! against the [`Plan`], never against the partially built graph.

use crate::naming::{self, derived, shared as shared_names, suffix};
use crate::plan::{self, EntityPlan, EntityType, Plan};
use crate::scalars;
use crate::shared;
use nodegql_model::{Entity, EntityGraph, Field, PropertiesType, UnionEntity};
use nodegql_schema::{
    is_builtin_scalar, EnumDef, FieldDef, InputFieldDef, InputObjectDef, InterfaceDef, ObjectDef,
    SchemaBuildError, TypeDef, TypeGraph, TypeRef, UnionDef,
};

/// Deprecation reason of the `typename_IN` interface filter.
const TYPENAME_IN_REASON: &str = "Use `typename` instead.";

/// Options that change the generated surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AugmentOptions {
    /// Generate event types and the `Subscription` root.
    pub subscriptions: bool,
    /// Emit the deprecated bare filter and update fields next to the
    /// explicit `_EQ` and `_SET` forms.
    pub legacy_filters: bool,
}

impl Default for AugmentOptions {
    fn default() -> Self {
        Self {
            subscriptions: false,
            legacy_filters: true,
        }
    }
}

/// The augmented type graph, before root types are attached.
#[derive(Debug, Clone)]
pub struct AugmentedSchema {
    pub types: TypeGraph,
    pub plan: Plan,
    pub options: AugmentOptions,
}

/// Builds every derived type of `graph`.
///
/// # Errors
///
/// Returns a [`SchemaBuildError`] if two generators produce the same type
/// name.
pub fn augment(
    graph: &EntityGraph,
    options: &AugmentOptions,
) -> Result<AugmentedSchema, SchemaBuildError> {
    let plan = plan::plan(graph, options);

    let mut augmenter = Augmenter {
        graph,
        plan: &plan,
        options: *options,
        types: TypeGraph::new(),
    };

    augmenter.passthrough()?;
    for props in graph.properties.values() {
        augmenter.properties(props)?;
    }
    for entity in graph.entities.values() {
        augmenter.entity(entity)?;
    }
    for union in graph.unions.values() {
        augmenter.union(union)?;
    }
    for entity in graph.entities.values() {
        augmenter.relationships(entity)?;
    }
    augmenter.fill_empty_inputs();

    let types = augmenter.types;
    tracing::debug!(types = types.len(), "augmentation finished");

    Ok(AugmentedSchema {
        types,
        plan,
        options: *options,
    })
}

/// Shared state of one augmentation run.
pub(crate) struct Augmenter<'a> {
    pub(crate) graph: &'a EntityGraph,
    pub(crate) plan: &'a Plan,
    pub(crate) options: AugmentOptions,
    pub(crate) types: TypeGraph,
}

/// Output field mirroring a source field.
pub(crate) fn output_field(field: &Field) -> FieldDef {
    let mut def = FieldDef::new(&field.name, field.ty.clone())
        .with_description(field.description.clone())
        .deprecated_if(field.deprecation.as_ref())
        .with_directives(field.directives.clone());
    def.arguments = field.arguments.clone();
    def
}

impl Augmenter<'_> {
    // =========================================================================
    // Passthrough
    // =========================================================================

    fn passthrough(&mut self) -> Result<(), SchemaBuildError> {
        let graph = self.graph;
        for def in graph.enums.values() {
            self.types.insert(TypeDef::Enum(def.clone()))?;
        }
        for scalar in graph.scalars.values() {
            if !is_builtin_scalar(&scalar.name) {
                self.types.insert(TypeDef::Scalar(scalar.clone()))?;
            }
        }
        for input in graph.inputs.values() {
            self.types.insert(TypeDef::InputObject(input.clone()))?;
        }
        for directive in &graph.directive_definitions {
            self.types.add_directive(directive.clone());
        }
        Ok(())
    }

    // =========================================================================
    // Field-list inputs
    // =========================================================================

    /// `<name>Where` over the filterable fields.
    fn filter_input(&self, name: String, fields: &[Field]) -> InputObjectDef {
        let mut input = shared::logical_input(name);
        for field in fields.iter().filter(|f| f.filterable.by_value) {
            for filter in scalars::filter_fields(field, self.options.legacy_filters) {
                input.add_field(filter);
            }
        }
        input
    }

    fn sort_input(&mut self, name: String, fields: &[Field]) -> Result<(), SchemaBuildError> {
        self.types.insert_shared(shared::sort_direction())?;
        let mut input = InputObjectDef::new(name);
        for field in fields
            .iter()
            .filter(|f| !f.is_list() && f.sortable.by_value)
        {
            input.add_field(
                InputFieldDef::new(&field.name, TypeRef::named(shared_names::SORT_DIRECTION))
                    .deprecated_if(field.deprecation.as_ref()),
            );
        }
        self.types.insert(TypeDef::InputObject(input))
    }

    fn create_input(&mut self, name: String, fields: &[Field]) -> Result<(), SchemaBuildError> {
        let mut input = InputObjectDef::new(name);
        for field in fields.iter().filter(|f| f.settable.on_create) {
            input.add_field(scalars::create_field(field));
        }
        self.types.insert(TypeDef::InputObject(input))
    }

    fn update_input(&mut self, name: String, fields: &[Field]) -> Result<(), SchemaBuildError> {
        let mut input = InputObjectDef::new(name);
        for field in fields.iter().filter(|f| f.settable.on_update) {
            for update in scalars::update_fields(field, self.options.legacy_filters) {
                input.add_field(update);
            }
        }
        self.types.insert(TypeDef::InputObject(input))
    }

    // =========================================================================
    // Relationship properties
    // =========================================================================

    fn properties(&mut self, props: &PropertiesType) -> Result<(), SchemaBuildError> {
        let mut object = ObjectDef::new(&props.name).with_description(props.description.clone());
        object.directives = props.directives.clone();
        for field in props.fields.iter().filter(|f| f.selectable.on_read) {
            object.add_field(output_field(field));
        }
        self.types.insert(TypeDef::Object(object))?;

        let filter = self.filter_input(derived(&props.name, suffix::WHERE), &props.fields);
        self.types.insert(TypeDef::InputObject(filter))?;
        if plan::has_sortable_fields(&props.fields) {
            self.sort_input(derived(&props.name, suffix::SORT), &props.fields)?;
        }
        self.create_input(derived(&props.name, suffix::CREATE_INPUT), &props.fields)?;
        self.update_input(derived(&props.name, suffix::UPDATE_INPUT), &props.fields)
    }

    // =========================================================================
    // Entities
    // =========================================================================

    fn entity(&mut self, entity: &Entity) -> Result<(), SchemaBuildError> {
        let plans = self.plan;
        let Some(entity_plan) = plans.entity(&entity.name) else {
            return Ok(());
        };
        tracing::debug!(
            entity = %entity.name,
            types = entity_plan.types.len(),
            "augmenting entity"
        );

        let name = entity.name.as_str();
        self.object_type(entity)?;

        let mut filter = self.filter_input(derived(name, suffix::WHERE), &entity.fields);
        if entity_plan.has(EntityType::Implementation) {
            let implementation = derived(name, suffix::IMPLEMENTATION);
            filter.add_field(InputFieldDef::new(
                "typename",
                TypeRef::list_of(&implementation),
            ));
            if self.options.legacy_filters {
                filter.add_field(
                    InputFieldDef::new("typename_IN", TypeRef::list_of(&implementation))
                        .deprecated(Some(TYPENAME_IN_REASON.into())),
                );
            }
            self.types.insert(TypeDef::Enum(EnumDef::new(
                implementation,
                entity.implementers.iter(),
            )))?;
        }
        self.types.insert(TypeDef::InputObject(filter))?;

        if entity_plan.has(EntityType::Sort) {
            self.sort_input(derived(name, suffix::SORT), &entity.fields)?;
        }
        if entity_plan.has(EntityType::CreateInput) {
            self.create_input(derived(name, suffix::CREATE_INPUT), &entity.fields)?;
        }
        if entity_plan.has(EntityType::UpdateInput) {
            self.update_input(derived(name, suffix::UPDATE_INPUT), &entity.fields)?;
        }
        if entity_plan.has(EntityType::ConnectWhere) {
            let input = InputObjectDef::new(derived(name, suffix::CONNECT_WHERE)).field(
                InputFieldDef::new("node", TypeRef::required(derived(name, suffix::WHERE))),
            );
            self.types.insert(TypeDef::InputObject(input))?;
        }
        if entity_plan.has(EntityType::AggregateSelection) {
            self.entity_aggregate_selection(entity)?;
        }
        if entity_plan.has(EntityType::Connection) {
            self.root_connection(entity_plan)?;
        }
        self.mutation_responses(entity_plan)?;
        if entity_plan.has(EntityType::Events) {
            self.entity_events(entity)?;
        }
        Ok(())
    }

    fn object_type(&mut self, entity: &Entity) -> Result<(), SchemaBuildError> {
        let fields = entity.fields.iter().filter(|f| f.selectable.on_read);
        let def = if entity.is_interface() {
            let mut def = InterfaceDef::new(&entity.name);
            def.description = entity.description.clone();
            def.implements = entity.interfaces.clone();
            def.directives = entity.directives.clone();
            for field in fields {
                def.add_field(output_field(field));
            }
            TypeDef::Interface(def)
        } else {
            let mut def =
                ObjectDef::new(&entity.name).with_description(entity.description.clone());
            def.implements = entity.interfaces.clone();
            def.directives = entity.directives.clone();
            for field in fields {
                def.add_field(output_field(field));
            }
            TypeDef::Object(def)
        };
        self.types.insert(def)
    }

    /// `<Plural>Connection` and `<E>Edge` of the root connection field.
    fn root_connection(&mut self, entity_plan: &EntityPlan) -> Result<(), SchemaBuildError> {
        let edge = derived(&entity_plan.name, suffix::EDGE);
        self.types.insert_shared(shared::page_info())?;

        let connection = ObjectDef::new(naming::root_connection(&entity_plan.plural))
            .field(FieldDef::new("edges", TypeRef::required_list_of(&edge)))
            .field(FieldDef::new("totalCount", TypeRef::required("Int")))
            .field(FieldDef::new(
                "pageInfo",
                TypeRef::required(shared_names::PAGE_INFO),
            ));
        self.types.insert(TypeDef::Object(connection))?;

        let edge = ObjectDef::new(edge)
            .field(FieldDef::new("cursor", TypeRef::required("String")))
            .field(FieldDef::new("node", TypeRef::required(&entity_plan.name)));
        self.types.insert(TypeDef::Object(edge))
    }

    fn mutation_responses(&mut self, entity_plan: &EntityPlan) -> Result<(), SchemaBuildError> {
        let responses = [
            (EntityType::CreateResponse, "Create", shared::create_info()),
            (EntityType::UpdateResponse, "Update", shared::update_info()),
        ];
        for (ty, verb, info) in responses {
            if !entity_plan.has(ty) {
                continue;
            }
            let info_name = info.name().to_string();
            self.types.insert_shared(info)?;
            let response = ObjectDef::new(naming::mutation_response(verb, &entity_plan.plural))
                .field(FieldDef::new("info", TypeRef::required(info_name)))
                .field(FieldDef::new(
                    &entity_plan.root,
                    TypeRef::required_list_of(&entity_plan.name),
                ));
            self.types.insert(TypeDef::Object(response))?;
        }
        if entity_plan.operations.delete {
            self.types.insert_shared(shared::delete_info())?;
        }
        Ok(())
    }

    // =========================================================================
    // Unions
    // =========================================================================

    fn union(&mut self, union: &UnionEntity) -> Result<(), SchemaBuildError> {
        let mut def = UnionDef::new(&union.name, union.members.clone());
        def.description = union.description.clone();
        def.directives = union.directives.clone();
        self.types.insert(TypeDef::Union(def))?;

        let mut filter = InputObjectDef::new(derived(&union.name, suffix::WHERE));
        for member in &union.members {
            filter.add_field(InputFieldDef::new(
                member,
                TypeRef::named(derived(member, suffix::WHERE)),
            ));
        }
        self.types.insert(TypeDef::InputObject(filter))
    }

    // =========================================================================
    // Shared helpers for relationship generation
    // =========================================================================

    /// Appends a field to an existing object or interface type.
    pub(crate) fn add_output_field(&mut self, owner: &str, field: FieldDef) {
        match self.types.get_mut(owner) {
            Some(TypeDef::Object(def)) => def.add_field(field),
            Some(TypeDef::Interface(def)) => def.add_field(field),
            _ => {}
        }
    }

    /// Appends a field to an existing input type.
    pub(crate) fn add_input_field(&mut self, input: &str, field: InputFieldDef) {
        if let Some(def) = self.types.input_mut(input) {
            def.add_field(field);
        }
    }

    /// Entity and edge-property inputs may end up without fields; they keep a
    /// placeholder so they stay referencable.
    fn fill_empty_inputs(&mut self) {
        let plans = self.plan;
        let mut names: Vec<String> = Vec::new();
        for entity_plan in plans.entities.values() {
            for (ty, tail) in [
                (EntityType::CreateInput, suffix::CREATE_INPUT),
                (EntityType::UpdateInput, suffix::UPDATE_INPUT),
            ] {
                if entity_plan.has(ty) {
                    names.push(derived(&entity_plan.name, tail));
                }
            }
        }
        for props in self.graph.properties.keys() {
            names.push(derived(props, suffix::CREATE_INPUT));
            names.push(derived(props, suffix::UPDATE_INPUT));
        }
        for name in names {
            if let Some(input) = self.types.input_mut(&name) {
                shared::fill_empty_input(input);
            }
        }
    }
}
