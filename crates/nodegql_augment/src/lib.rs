//! Schema augmentation for nodegql.
//!
//! Turns a validated [`EntityGraph`](nodegql_model::EntityGraph) into the
//! full output type graph: filter, sort and mutation inputs, connection and
//! aggregation types, subscription events and the root operation types.
//!
//! The work is split in three steps:
//!
//! 1. [`plan()`] decides which derived types exist.
//! 2. [`augment()`] builds them, entity-level types first and relationship
//!    types second.
//! 3. [`assemble()`] lists the root fields and [`link()`] attaches them to
//!    the graph and validates it.

mod aggregation;
pub mod assemble;
pub mod augment;
pub mod naming;
pub mod plan;
pub mod pluralize;
mod relationship;
pub mod scalars;
pub mod shared;
mod subscriptions;

pub use assemble::{assemble, link, OperationKind, RootField, RootOperations};
pub use augment::{augment, AugmentOptions, AugmentedSchema};
pub use plan::{plan, EntityPlan, EntityType, MemberType, Plan, RelationshipPlan, RelationshipType};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{augment, AugmentOptions, AugmentedSchema};
    use nodegql_core::Interner;

    /// Augments `source`, panicking on any error.
    pub fn augmented(source: &str, options: &AugmentOptions) -> AugmentedSchema {
        let interner = Interner::new();
        let parsed = nodegql_syntax::parse(source, &interner);
        assert!(
            !parsed.diagnostics.has_errors(),
            "parse errors: {:?}",
            parsed.diagnostics
        );
        let graph = nodegql_model::build_entity_model(&parsed.document, &interner)
            .expect("entity model");
        augment(&graph, options).expect("augmentation")
    }

    /// Field names of an input or output type, in order.
    pub fn field_names(schema: &AugmentedSchema, name: &str) -> Vec<String> {
        if let Some(input) = schema.types.input(name) {
            return input.fields.keys().cloned().collect();
        }
        match schema.types.get(name) {
            Some(nodegql_schema::TypeDef::Object(def)) => def.fields.keys().cloned().collect(),
            Some(nodegql_schema::TypeDef::Interface(def)) => def.fields.keys().cloned().collect(),
            other => panic!("`{name}` has no fields: {other:?}"),
        }
    }
}
