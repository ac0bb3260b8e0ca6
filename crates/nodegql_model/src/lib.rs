//! Entity model for nodegql.
//!
//! This crate provides:
//! - `directives`: Typed arguments of the recognized directive vocabulary
//! - `entity`: The normalized entity graph
//! - `builder`: Validation and construction of the entity graph from a parsed document

pub mod builder;
pub mod directives;
pub mod entity;

pub use builder::{build_entity_model, ValidationError, RESERVED_TYPE_NAMES};
pub use directives::{
    Direction, FilterableDirective, MutationDirective, MutationOperation, NestedOperation,
    NestedOperations, QueryDirective, SelectableDirective, SettableDirective, SortableDirective,
};
pub use entity::{
    Edge, Entity, EntityGraph, EntityKind, Field, PropertiesType, Relationship, RelationshipTarget,
    UnionEntity, ValueKind, LIBRARY_SCALARS, TEMPORAL_SCALARS,
};
