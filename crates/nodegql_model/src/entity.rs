//! The normalized entity graph.
//!
//! Built once per schema build by [`crate::build_entity_model`] and never
//! mutated afterwards. Interface fields are already flattened into their
//! implementers, so consumers never walk inheritance chains.

use crate::directives::{
    Direction, FilterableDirective, MutationDirective, NestedOperations, QueryDirective,
    SelectableDirective, SettableDirective, SortableDirective,
};
use indexmap::IndexMap;
use nodegql_core::{DiagnosticBag, Span};
use nodegql_schema::{
    Deprecation, DirectiveDefinition, DirectiveUse, EnumDef, InputFieldDef, InputObjectDef,
    ScalarDef, TypeRef,
};

/// Temporal scalars provided by the engine without a declaration.
pub const TEMPORAL_SCALARS: &[&str] = &[
    "Date",
    "DateTime",
    "Duration",
    "LocalDateTime",
    "LocalTime",
    "Time",
];

/// Scalars provided by the engine on top of the GraphQL built-ins.
pub const LIBRARY_SCALARS: &[&str] = &[
    "BigInt",
    "Date",
    "DateTime",
    "Duration",
    "LocalDateTime",
    "LocalTime",
    "Time",
];

/// Category of a scalar or enum value, which selects its filter, update
/// and aggregation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Id,
    Int,
    Float,
    BigInt,
    Boolean,
    Temporal,
    Enum,
    Custom,
}

impl ValueKind {
    /// Classifies a named leaf type.
    #[must_use]
    pub fn classify(name: &str, is_enum: bool) -> Self {
        if is_enum {
            return Self::Enum;
        }
        match name {
            "String" => Self::String,
            "ID" => Self::Id,
            "Int" => Self::Int,
            "Float" => Self::Float,
            "BigInt" => Self::BigInt,
            "Boolean" => Self::Boolean,
            _ if TEMPORAL_SCALARS.contains(&name) => Self::Temporal,
            _ => Self::Custom,
        }
    }

    /// Returns true for Int, Float and BigInt.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::BigInt)
    }
}

/// Whether an entity is a concrete node type or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Concrete,
    Interface,
}

/// A concrete node type or an interface.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub description: Option<String>,
    /// Node labels (concrete entities only).
    pub labels: Vec<String>,
    /// Every interface this entity implements, transitively.
    pub interfaces: Vec<String>,
    /// Concrete implementers (interfaces only).
    pub implementers: Vec<String>,
    /// Unions this entity is a member of.
    pub unions: Vec<String>,
    /// Scalar and enum fields, inherited ones included.
    pub fields: Vec<Field>,
    pub relationships: Vec<Relationship>,
    pub query: QueryDirective,
    pub mutation: MutationDirective,
    pub plural: Option<String>,
    /// Pass-through directives applied to the type.
    pub directives: Vec<DirectiveUse>,
    pub span: Span,
}

impl Entity {
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == EntityKind::Interface
    }

    /// Looks up a scalar field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a relationship by field name.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.field_name == name)
    }
}

/// A scalar or enum attribute.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub kind: ValueKind,
    /// Arguments declared on the source field, passed through.
    pub arguments: IndexMap<String, InputFieldDef>,
    pub settable: SettableDirective,
    pub filterable: FilterableDirective,
    pub selectable: SelectableDirective,
    pub sortable: SortableDirective,
    pub deprecation: Option<Deprecation>,
    pub directives: Vec<DirectiveUse>,
    /// Interface the field was inherited from, if it was not redeclared.
    pub inherited_from: Option<String>,
    pub span: Span,
}

impl Field {
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.ty.is_list()
    }
}

/// The target of a relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipTarget {
    Concrete(String),
    Interface {
        name: String,
        implementers: Vec<String>,
    },
    Union {
        name: String,
        members: Vec<String>,
    },
}

impl RelationshipTarget {
    /// Name of the target type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Concrete(name)
            | Self::Interface { name, .. }
            | Self::Union { name, .. } => name,
        }
    }

    /// Concrete types a value of the target can be.
    #[must_use]
    pub fn concrete_members(&self) -> Vec<&str> {
        match self {
            Self::Concrete(name) => vec![name.as_str()],
            Self::Interface { implementers, .. } => {
                implementers.iter().map(String::as_str).collect()
            }
            Self::Union { members, .. } => members.iter().map(String::as_str).collect(),
        }
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        !matches!(self, Self::Concrete(_))
    }
}

/// How a relationship maps onto graph edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    /// A `@relationship` on a concrete entity.
    Concrete {
        edge_type: String,
        direction: Direction,
        properties: Option<String>,
    },
    /// A `@declareRelationship` on an interface; `properties` collects the
    /// distinct property types of the implementing relationships.
    Declared { properties: Vec<String> },
}

/// A relationship field.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub field_name: String,
    pub description: Option<String>,
    /// Declared output type of the field.
    pub ty: TypeRef,
    pub target: RelationshipTarget,
    pub edge: Edge,
    pub aggregate: bool,
    pub nested_operations: NestedOperations,
    pub settable: SettableDirective,
    pub filterable: FilterableDirective,
    pub selectable: SelectableDirective,
    pub deprecation: Option<Deprecation>,
    pub directives: Vec<DirectiveUse>,
    /// Root interface whose `@declareRelationship` this field implements.
    pub declared_by: Option<String>,
    pub span: Span,
}

impl Relationship {
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.ty.is_list()
    }

    /// Edge-property type of a concrete relationship.
    #[must_use]
    pub fn properties(&self) -> Option<&str> {
        match &self.edge {
            Edge::Concrete { properties, .. } => properties.as_deref(),
            Edge::Declared { .. } => None,
        }
    }
}

/// A union of concrete entities.
#[derive(Debug, Clone)]
pub struct UnionEntity {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
    pub query: QueryDirective,
    pub plural: Option<String>,
    pub directives: Vec<DirectiveUse>,
}

/// A `@relationshipProperties` type.
#[derive(Debug, Clone)]
pub struct PropertiesType {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub directives: Vec<DirectiveUse>,
    pub span: Span,
}

/// The normalized entity graph.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    /// Concrete entities and interfaces.
    pub entities: IndexMap<String, Entity>,
    pub unions: IndexMap<String, UnionEntity>,
    pub properties: IndexMap<String, PropertiesType>,
    /// User enums, passed through.
    pub enums: IndexMap<String, EnumDef>,
    /// User scalars plus engine scalars in use, passed through.
    pub scalars: IndexMap<String, ScalarDef>,
    /// User input types, passed through.
    pub inputs: IndexMap<String, InputObjectDef>,
    /// User directive definitions, echoed.
    pub directive_definitions: Vec<DirectiveDefinition>,
    /// Tolerated problems.
    pub warnings: DiagnosticBag,
}

impl EntityGraph {
    /// Looks up an entity by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Iterates over concrete entities.
    pub fn concrete(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Concrete)
    }

    /// Iterates over interface entities.
    pub fn interfaces(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind_classify() {
        assert_eq!(ValueKind::classify("String", false), ValueKind::String);
        assert_eq!(ValueKind::classify("DateTime", false), ValueKind::Temporal);
        assert_eq!(ValueKind::classify("Genre", true), ValueKind::Enum);
        assert_eq!(ValueKind::classify("Point", false), ValueKind::Custom);
        assert!(ValueKind::BigInt.is_numeric());
        assert!(!ValueKind::Temporal.is_numeric());
    }

    #[test]
    fn test_target_members() {
        let target = RelationshipTarget::Union {
            name: "Search".into(),
            members: vec!["Movie".into(), "Series".into()],
        };
        assert!(target.is_abstract());
        assert_eq!(target.name(), "Search");
        assert_eq!(target.concrete_members(), vec!["Movie", "Series"]);
        assert!(!RelationshipTarget::Concrete("Actor".into()).is_abstract());
    }
}
