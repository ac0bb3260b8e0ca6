//! Generation plan.
//!
//! A pure pass over the entity graph that decides, for every entity,
//! relationship and relationship target member, which derived types
//! exist. The augmentation engine only builds what the plan lists, and
//! cross-references between derived types are resolved against the plan
//! rather than against the partially built output.

use crate::naming;
use crate::pluralize::{plural_field_name, plural_type_name};
use crate::AugmentOptions;
use indexmap::IndexMap;
use nodegql_model::{
    Entity, EntityGraph, Field, NestedOperations, Relationship, RelationshipTarget,
};
use std::collections::BTreeSet;

/// Entity-level derived types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    Object,
    Where,
    Sort,
    CreateInput,
    UpdateInput,
    ConnectWhere,
    ConnectInput,
    DisconnectInput,
    DeleteInput,
    RelationInput,
    AggregateSelection,
    Connection,
    Implementation,
    CreateResponse,
    UpdateResponse,
    Events,
}

/// Relationship-level derived types and entity-input participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationshipType {
    /// Field of the owner's `CreateInput`.
    CreateInputField,
    /// Field of the owner's `UpdateInput`.
    UpdateInputField,
    ConnectInputField,
    DisconnectInputField,
    DeleteInputField,
    RelationInputField,
    /// `PConnection` and `PRelationship`.
    Connection,
    ConnectionSort,
    AggregateInput,
    AggregationSelection,
}

/// Per-target-member nested mutation inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberType {
    FieldInput,
    CreateFieldInput,
    ConnectFieldInput,
    UpdateFieldInput,
    UpdateConnectionInput,
    DisconnectFieldInput,
    DeleteFieldInput,
}

/// Root operations an entity permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Operations {
    pub read: bool,
    pub aggregate: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

#[derive(Debug, Clone)]
pub struct EntityPlan {
    pub name: String,
    /// Plural used in type names, e.g. `Movies`.
    pub plural: String,
    /// Plural used in root field names, e.g. `movies`.
    pub root: String,
    pub concrete: bool,
    pub operations: Operations,
    pub types: BTreeSet<EntityType>,
    pub relationships: IndexMap<String, RelationshipPlan>,
}

impl EntityPlan {
    #[must_use]
    pub fn has(&self, ty: EntityType) -> bool {
        self.types.contains(&ty)
    }
}

#[derive(Debug, Clone)]
pub struct RelationshipPlan {
    pub field: String,
    /// `<Owner><Field>`.
    pub prefix: String,
    /// Root interface whose output signature this relationship reuses.
    pub mirror: Option<String>,
    /// Nested inputs are keyed by target member.
    pub keyed: bool,
    pub members: Vec<MemberPlan>,
    pub types: BTreeSet<RelationshipType>,
}

impl RelationshipPlan {
    #[must_use]
    pub fn has(&self, ty: RelationshipType) -> bool {
        self.types.contains(&ty)
    }

    /// Owner of the output types (`fConnection`, `fAggregate`).
    #[must_use]
    pub fn output_owner<'a>(&'a self, owner: &'a str) -> &'a str {
        self.mirror.as_deref().unwrap_or(owner)
    }
}

#[derive(Debug, Clone)]
pub struct MemberPlan {
    pub name: String,
    /// `<Owner><Field>` for concrete targets, `<Owner><Field><Member>` otherwise.
    pub prefix: String,
    pub verbs: NestedOperations,
    pub types: BTreeSet<MemberType>,
}

impl MemberPlan {
    #[must_use]
    pub fn has(&self, ty: MemberType) -> bool {
        self.types.contains(&ty)
    }
}

#[derive(Debug, Clone)]
pub struct UnionPlan {
    pub name: String,
    pub plural: String,
    pub root: String,
    pub read: bool,
}

/// The complete generation plan of one build.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub entities: IndexMap<String, EntityPlan>,
    pub unions: IndexMap<String, UnionPlan>,
}

impl Plan {
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityPlan> {
        self.entities.get(name)
    }

    /// Returns true if `entity` has the derived type `ty`.
    #[must_use]
    pub fn entity_has(&self, entity: &str, ty: EntityType) -> bool {
        self.entities.get(entity).is_some_and(|p| p.has(ty))
    }

    #[must_use]
    pub fn relationship(&self, entity: &str, field: &str) -> Option<&RelationshipPlan> {
        self.entities.get(entity)?.relationships.get(field)
    }
}

/// Computes the generation plan.
#[must_use]
pub fn plan(graph: &EntityGraph, options: &AugmentOptions) -> Plan {
    let operations: IndexMap<&str, Operations> = graph
        .entities
        .values()
        .map(|e| (e.name.as_str(), entity_operations(e)))
        .collect();

    let mut plan = Plan::default();

    for entity in graph.entities.values() {
        let ops = operations[entity.name.as_str()];
        let relationships: IndexMap<String, RelationshipPlan> = entity
            .relationships
            .iter()
            .map(|rel| {
                let rel_plan = plan_relationship(graph, entity, ops, rel, &operations);
                (rel.field_name.clone(), rel_plan)
            })
            .collect();

        let types = entity_types(entity, ops, &relationships, options);
        plan.entities.insert(
            entity.name.clone(),
            EntityPlan {
                name: entity.name.clone(),
                plural: plural_type_name(&entity.name, entity.plural.as_deref()),
                root: plural_field_name(&entity.name, entity.plural.as_deref()),
                concrete: !entity.is_interface(),
                operations: ops,
                types,
                relationships,
            },
        );
    }

    for union in graph.unions.values() {
        plan.unions.insert(
            union.name.clone(),
            UnionPlan {
                name: union.name.clone(),
                plural: plural_type_name(&union.name, union.plural.as_deref()),
                root: plural_field_name(&union.name, union.plural.as_deref()),
                read: union.query.read,
            },
        );
    }

    plan
}

fn entity_operations(entity: &Entity) -> Operations {
    let concrete = !entity.is_interface();
    Operations {
        read: entity.query.read,
        aggregate: concrete && entity.query.aggregate,
        create: concrete && entity.mutation.create(),
        update: concrete && entity.mutation.update(),
        delete: concrete && entity.mutation.delete(),
    }
}

fn entity_types(
    entity: &Entity,
    ops: Operations,
    relationships: &IndexMap<String, RelationshipPlan>,
    options: &AugmentOptions,
) -> BTreeSet<EntityType> {
    let concrete = !entity.is_interface();
    let any_rel = |ty| relationships.values().any(|r| r.has(ty));

    let mut types = BTreeSet::new();
    types.insert(EntityType::Object);
    types.insert(EntityType::Where);

    let conditions = [
        (EntityType::Sort, has_sortable_fields(&entity.fields)),
        (EntityType::CreateInput, ops.create),
        (EntityType::UpdateInput, ops.update),
        (EntityType::ConnectWhere, concrete),
        (
            EntityType::ConnectInput,
            any_rel(RelationshipType::ConnectInputField),
        ),
        (
            EntityType::DisconnectInput,
            any_rel(RelationshipType::DisconnectInputField),
        ),
        (
            EntityType::DeleteInput,
            any_rel(RelationshipType::DeleteInputField),
        ),
        (
            EntityType::RelationInput,
            any_rel(RelationshipType::RelationInputField),
        ),
        (EntityType::AggregateSelection, ops.aggregate),
        (EntityType::Connection, ops.read),
        (
            EntityType::Implementation,
            entity.is_interface() && !entity.implementers.is_empty(),
        ),
        (EntityType::CreateResponse, ops.create),
        (EntityType::UpdateResponse, ops.update),
        // Event payloads and subscription filters list scalar fields only,
        // so an entity made of relationship fields alone gets no
        // Created/Updated/Deleted events rather than empty types.
        (
            EntityType::Events,
            options.subscriptions && concrete && !entity.fields.is_empty(),
        ),
    ];
    for (ty, enabled) in conditions {
        if enabled {
            types.insert(ty);
        }
    }
    types
}

/// Returns true if any non-list field can be sorted.
#[must_use]
pub fn has_sortable_fields(fields: &[Field]) -> bool {
    fields.iter().any(|f| !f.is_list() && f.sortable.by_value)
}

fn plan_relationship(
    graph: &EntityGraph,
    owner: &Entity,
    ops: Operations,
    rel: &Relationship,
    operations: &IndexMap<&str, Operations>,
) -> RelationshipPlan {
    let concrete = !owner.is_interface();
    let prefix = naming::relationship_prefix(&owner.name, &rel.field_name);
    let keyed = concrete && rel.target.is_abstract();

    let base_create = concrete && rel.settable.on_create && ops.create;
    let base_update = concrete && rel.settable.on_update && ops.update;
    let on_update = concrete && rel.settable.on_update;
    let owner_delete = concrete && ops.delete;

    let members: Vec<MemberPlan> = if concrete {
        rel.target
            .concrete_members()
            .into_iter()
            .map(|member| {
                let target = operations.get(member).copied().unwrap_or_default();
                let verbs = rel.nested_operations.intersect(NestedOperations {
                    create: target.create,
                    update: target.update,
                    delete: target.delete,
                    connect: true,
                    disconnect: true,
                });
                let prefix = if keyed {
                    naming::member_prefix(&prefix, member)
                } else {
                    prefix.clone()
                };
                let types = member_types(verbs, base_create, base_update, on_update, owner_delete);
                MemberPlan {
                    name: member.to_string(),
                    prefix,
                    verbs,
                    types,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let any_member = |ty| members.iter().any(|m| m.has(ty));
    let any_verb = |f: fn(&NestedOperations) -> bool| members.iter().any(|m| f(&m.verbs));

    let aggregation = rel.aggregate && !rel.target.is_abstract();
    let target_aggregates = operations
        .get(rel.target.name())
        .is_some_and(|ops| ops.aggregate);
    let mirror = rel.declared_by.clone();

    let conditions = [
        (
            RelationshipType::CreateInputField,
            any_member(MemberType::FieldInput),
        ),
        (
            RelationshipType::UpdateInputField,
            any_member(MemberType::UpdateFieldInput),
        ),
        (
            RelationshipType::ConnectInputField,
            on_update && any_verb(|v| v.connect),
        ),
        (
            RelationshipType::DisconnectInputField,
            on_update && any_verb(|v| v.disconnect),
        ),
        (
            RelationshipType::DeleteInputField,
            owner_delete && any_verb(|v| v.delete),
        ),
        (
            RelationshipType::RelationInputField,
            base_update && any_verb(|v| v.create),
        ),
        (RelationshipType::Connection, mirror.is_none()),
        (
            RelationshipType::ConnectionSort,
            mirror.is_none() && has_connection_sort(graph, owner, rel),
        ),
        (
            RelationshipType::AggregateInput,
            aggregation && rel.filterable.by_aggregate,
        ),
        (
            RelationshipType::AggregationSelection,
            aggregation && target_aggregates && rel.selectable.on_aggregate && mirror.is_none(),
        ),
    ];

    let types = conditions
        .into_iter()
        .filter_map(|(ty, enabled)| enabled.then_some(ty))
        .collect();

    RelationshipPlan {
        field: rel.field_name.clone(),
        prefix,
        mirror,
        keyed,
        members,
        types,
    }
}

fn member_types(
    verbs: NestedOperations,
    base_create: bool,
    base_update: bool,
    on_update: bool,
    owner_delete: bool,
) -> BTreeSet<MemberType> {
    let field_input = base_create && (verbs.create || verbs.connect);
    let update_field_input = base_update && !verbs.is_empty();

    let conditions = [
        (MemberType::FieldInput, field_input),
        (MemberType::UpdateFieldInput, update_field_input),
        (
            MemberType::CreateFieldInput,
            verbs.create && (base_create || base_update),
        ),
        (
            MemberType::ConnectFieldInput,
            verbs.connect && (field_input || on_update),
        ),
        (MemberType::DisconnectFieldInput, verbs.disconnect && on_update),
        (
            MemberType::DeleteFieldInput,
            verbs.delete && (update_field_input || owner_delete),
        ),
        (
            MemberType::UpdateConnectionInput,
            update_field_input && verbs.update,
        ),
    ];

    conditions
        .into_iter()
        .filter_map(|(ty, enabled)| enabled.then_some(ty))
        .collect()
}

/// A connection sort needs a sortable target or sortable edge properties.
fn has_connection_sort(graph: &EntityGraph, owner: &Entity, rel: &Relationship) -> bool {
    let target_sort = match &rel.target {
        RelationshipTarget::Concrete(name) | RelationshipTarget::Interface { name, .. } => {
            graph.entity(name).is_some_and(|e| has_sortable_fields(&e.fields))
        }
        RelationshipTarget::Union { .. } => false,
    };
    let edge_sort = !owner.is_interface()
        && rel
            .properties()
            .and_then(|p| graph.properties.get(p))
            .is_some_and(|p| has_sortable_fields(&p.fields));
    target_sort || edge_sort
}
