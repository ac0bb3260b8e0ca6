//! Typed annotation model.
//!
//! Each recognized directive deserializes from its source arguments into a
//! struct with serde defaults, so omitted arguments take their documented
//! values and unknown or mistyped ones surface as validation errors.

use indexmap::IndexMap;
use nodegql_core::Interner;
use nodegql_schema::ConstValue;
use nodegql_syntax::{Directive, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Names of the directives the entity model interprets.
pub mod names {
    pub const NODE: &str = "node";
    pub const RELATIONSHIP: &str = "relationship";
    pub const RELATIONSHIP_PROPERTIES: &str = "relationshipProperties";
    pub const DECLARE_RELATIONSHIP: &str = "declareRelationship";
    pub const QUERY: &str = "query";
    pub const MUTATION: &str = "mutation";
    pub const SETTABLE: &str = "settable";
    pub const FILTERABLE: &str = "filterable";
    pub const SELECTABLE: &str = "selectable";
    pub const SORTABLE: &str = "sortable";
    pub const PLURAL: &str = "plural";
    pub const DEPRECATED: &str = "deprecated";

    /// Every interpreted directive. Anything else is passed through.
    pub const ALL: &[&str] = &[
        NODE,
        RELATIONSHIP,
        RELATIONSHIP_PROPERTIES,
        DECLARE_RELATIONSHIP,
        QUERY,
        MUTATION,
        SETTABLE,
        FILTERABLE,
        SELECTABLE,
        SORTABLE,
        PLURAL,
        DEPRECATED,
    ];
}

/// Returns true if the directive is interpreted by the entity model.
#[must_use]
pub fn is_recognized(name: &str) -> bool {
    names::ALL.contains(&name)
}

/// A directive with a typed argument struct.
pub trait TypedDirective: DeserializeOwned {
    /// Directive name without the `@`.
    const NAME: &'static str;
    /// Arguments that must be present.
    const REQUIRED: &'static [&'static str] = &[];
}

fn default_true() -> bool {
    true
}

// =============================================================================
// @node
// =============================================================================

/// Arguments for @node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDirective {
    /// Labels of the underlying node. Empty means the type name.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl TypedDirective for NodeDirective {
    const NAME: &'static str = names::NODE;
}

// =============================================================================
// @relationship / @declareRelationship
// =============================================================================

/// Direction of a relationship relative to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    In,
    Out,
    Undirected,
}

/// A nested operation that a relationship field may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NestedOperation {
    Create,
    Update,
    Delete,
    Connect,
    Disconnect,
}

fn all_nested_operations() -> Vec<NestedOperation> {
    vec![
        NestedOperation::Create,
        NestedOperation::Update,
        NestedOperation::Delete,
        NestedOperation::Connect,
        NestedOperation::Disconnect,
    ]
}

/// Set of nested mutation verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NestedOperations {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    pub connect: bool,
    pub disconnect: bool,
}

impl NestedOperations {
    /// Every verb enabled.
    pub const ALL: Self = Self {
        create: true,
        update: true,
        delete: true,
        connect: true,
        disconnect: true,
    };

    /// Builds the set from a directive argument list.
    #[must_use]
    pub fn from_list(operations: &[NestedOperation]) -> Self {
        let mut set = Self::default();
        for op in operations {
            match op {
                NestedOperation::Create => set.create = true,
                NestedOperation::Update => set.update = true,
                NestedOperation::Delete => set.delete = true,
                NestedOperation::Connect => set.connect = true,
                NestedOperation::Disconnect => set.disconnect = true,
            }
        }
        set
    }

    /// Verbs present in both sets.
    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        Self {
            create: self.create && other.create,
            update: self.update && other.update,
            delete: self.delete && other.delete,
            connect: self.connect && other.connect,
            disconnect: self.disconnect && other.disconnect,
        }
    }

    /// Verbs present in either set.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            create: self.create || other.create,
            update: self.update || other.update,
            delete: self.delete || other.delete,
            connect: self.connect || other.connect,
            disconnect: self.disconnect || other.disconnect,
        }
    }

    /// Returns true if no verb is enabled.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.create || self.update || self.delete || self.connect || self.disconnect)
    }
}

/// Arguments for @relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelationshipDirective {
    /// Edge label in the graph.
    #[serde(rename = "type")]
    pub edge_type: String,
    pub direction: Direction,
    /// Name of the @relationshipProperties type carried on the edge.
    #[serde(default)]
    pub properties: Option<String>,
    #[serde(default = "default_true")]
    pub aggregate: bool,
    #[serde(default = "all_nested_operations")]
    pub nested_operations: Vec<NestedOperation>,
}

impl TypedDirective for RelationshipDirective {
    const NAME: &'static str = names::RELATIONSHIP;
    const REQUIRED: &'static [&'static str] = &["type", "direction"];
}

/// Arguments for @declareRelationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeclareRelationshipDirective {
    #[serde(default = "default_true")]
    pub aggregate: bool,
    #[serde(default = "all_nested_operations")]
    pub nested_operations: Vec<NestedOperation>,
}

impl Default for DeclareRelationshipDirective {
    fn default() -> Self {
        Self {
            aggregate: true,
            nested_operations: all_nested_operations(),
        }
    }
}

impl TypedDirective for DeclareRelationshipDirective {
    const NAME: &'static str = names::DECLARE_RELATIONSHIP;
}

/// Marker for edge-property types. Takes no arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipPropertiesDirective {}

impl TypedDirective for RelationshipPropertiesDirective {
    const NAME: &'static str = names::RELATIONSHIP_PROPERTIES;
}

// =============================================================================
// Type-level toggles
// =============================================================================

/// Arguments for @query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDirective {
    #[serde(default = "default_true")]
    pub read: bool,
    #[serde(default = "default_true")]
    pub aggregate: bool,
}

impl Default for QueryDirective {
    fn default() -> Self {
        Self {
            read: true,
            aggregate: true,
        }
    }
}

impl TypedDirective for QueryDirective {
    const NAME: &'static str = names::QUERY;
}

/// A root mutation that @mutation can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationOperation {
    Create,
    Update,
    Delete,
}

fn all_mutation_operations() -> Vec<MutationOperation> {
    vec![
        MutationOperation::Create,
        MutationOperation::Update,
        MutationOperation::Delete,
    ]
}

/// Arguments for @mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MutationDirective {
    #[serde(default = "all_mutation_operations")]
    pub operations: Vec<MutationOperation>,
}

impl Default for MutationDirective {
    fn default() -> Self {
        Self {
            operations: all_mutation_operations(),
        }
    }
}

impl MutationDirective {
    pub fn create(&self) -> bool {
        self.operations.contains(&MutationOperation::Create)
    }

    pub fn update(&self) -> bool {
        self.operations.contains(&MutationOperation::Update)
    }

    pub fn delete(&self) -> bool {
        self.operations.contains(&MutationOperation::Delete)
    }
}

impl TypedDirective for MutationDirective {
    const NAME: &'static str = names::MUTATION;
}

/// Arguments for @plural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluralDirective {
    pub value: String,
}

impl TypedDirective for PluralDirective {
    const NAME: &'static str = names::PLURAL;
    const REQUIRED: &'static [&'static str] = &["value"];
}

// =============================================================================
// Field-level toggles
// =============================================================================

/// Arguments for @settable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettableDirective {
    #[serde(default = "default_true")]
    pub on_create: bool,
    #[serde(default = "default_true")]
    pub on_update: bool,
}

impl Default for SettableDirective {
    fn default() -> Self {
        Self {
            on_create: true,
            on_update: true,
        }
    }
}

impl TypedDirective for SettableDirective {
    const NAME: &'static str = names::SETTABLE;
}

/// Arguments for @filterable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterableDirective {
    #[serde(default = "default_true")]
    pub by_value: bool,
    #[serde(default = "default_true")]
    pub by_aggregate: bool,
}

impl Default for FilterableDirective {
    fn default() -> Self {
        Self {
            by_value: true,
            by_aggregate: true,
        }
    }
}

impl TypedDirective for FilterableDirective {
    const NAME: &'static str = names::FILTERABLE;
}

/// Arguments for @selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectableDirective {
    #[serde(default = "default_true")]
    pub on_read: bool,
    #[serde(default = "default_true")]
    pub on_aggregate: bool,
}

impl Default for SelectableDirective {
    fn default() -> Self {
        Self {
            on_read: true,
            on_aggregate: true,
        }
    }
}

impl TypedDirective for SelectableDirective {
    const NAME: &'static str = names::SELECTABLE;
}

/// Arguments for @sortable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SortableDirective {
    #[serde(default = "default_true")]
    pub by_value: bool,
}

impl Default for SortableDirective {
    fn default() -> Self {
        Self { by_value: true }
    }
}

impl TypedDirective for SortableDirective {
    const NAME: &'static str = names::SORTABLE;
}

impl TypedDirective for nodegql_schema::Deprecation {
    const NAME: &'static str = names::DEPRECATED;
}

// =============================================================================
// Argument conversion
// =============================================================================

/// Deserializes a directive's arguments into its typed struct.
pub fn parse_arguments<T: TypedDirective>(
    directive: &Directive,
    interner: &Interner,
) -> Result<T, serde_json::Error> {
    let mut object = serde_json::Map::new();
    for arg in &directive.arguments {
        object.insert(interner.get(arg.name.value), to_json(&arg.value, interner));
    }
    serde_json::from_value(serde_json::Value::Object(object))
}

/// Returns the required arguments missing from a directive application.
pub fn missing_arguments<T: TypedDirective>(
    directive: &Directive,
    interner: &Interner,
) -> Vec<&'static str> {
    T::REQUIRED
        .iter()
        .copied()
        .filter(|required| {
            !directive
                .arguments
                .iter()
                .any(|arg| interner.is(arg.name.value, required))
        })
        .collect()
}

fn to_json(value: &Value, interner: &Interner) -> serde_json::Value {
    match value {
        Value::Int(v, _) => serde_json::Value::from(*v),
        Value::Float(v, _) => serde_json::Value::from(*v),
        Value::String(v, _) => serde_json::Value::String(v.clone()),
        Value::Boolean(v, _) => serde_json::Value::Bool(*v),
        Value::Null(_) => serde_json::Value::Null,
        Value::Enum(name) => serde_json::Value::String(interner.get(name.value)),
        Value::List(items, _) => {
            serde_json::Value::Array(items.iter().map(|v| to_json(v, interner)).collect())
        }
        Value::Object(entries, _) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(name, v)| (interner.get(name.value), to_json(v, interner)))
                .collect(),
        ),
    }
}

/// Converts a source constant into an output constant.
pub fn const_value(value: &Value, interner: &Interner) -> ConstValue {
    match value {
        Value::Int(v, _) => ConstValue::Int(*v),
        Value::Float(v, _) => ConstValue::Float(*v),
        Value::String(v, _) => ConstValue::String(v.clone()),
        Value::Boolean(v, _) => ConstValue::Boolean(*v),
        Value::Null(_) => ConstValue::Null,
        Value::Enum(name) => ConstValue::Enum(interner.get(name.value)),
        Value::List(items, _) => {
            ConstValue::List(items.iter().map(|v| const_value(v, interner)).collect())
        }
        Value::Object(entries, _) => ConstValue::Object(
            entries
                .iter()
                .map(|(name, v)| (interner.get(name.value), const_value(v, interner)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegql_syntax::{parse, TypeDefinition};

    fn first_field_directives(source: &str, interner: &Interner) -> Vec<Directive> {
        let result = parse(source, interner);
        assert!(!result.diagnostics.has_errors());
        let directives = match result.document.types().next() {
            Some(TypeDefinition::Object(obj)) => obj.fields[0].directives.clone(),
            _ => panic!("expected an object type"),
        };
        directives
    }

    #[test]
    fn test_relationship_defaults() {
        let interner = Interner::new();
        let directives = first_field_directives(
            r#"type Movie { actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN) }"#,
            &interner,
        );
        let rel: RelationshipDirective = parse_arguments(&directives[0], &interner).unwrap();
        assert_eq!(rel.edge_type, "ACTED_IN");
        assert_eq!(rel.direction, Direction::In);
        assert!(rel.aggregate);
        assert_eq!(
            NestedOperations::from_list(&rel.nested_operations),
            NestedOperations::ALL
        );
    }

    #[test]
    fn test_relationship_missing_direction() {
        let interner = Interner::new();
        let directives = first_field_directives(
            r#"type Movie { actors: [Actor!]! @relationship(type: "ACTED_IN") }"#,
            &interner,
        );
        assert_eq!(
            missing_arguments::<RelationshipDirective>(&directives[0], &interner),
            vec!["direction"]
        );
    }

    #[test]
    fn test_settable_partial_arguments() {
        let interner = Interner::new();
        let directives = first_field_directives(
            "type Movie { title: String @settable(onCreate: false) }",
            &interner,
        );
        let settable: SettableDirective = parse_arguments(&directives[0], &interner).unwrap();
        assert!(!settable.on_create);
        assert!(settable.on_update);
    }

    #[test]
    fn test_unknown_and_mistyped_arguments_fail() {
        let interner = Interner::new();
        let directives = first_field_directives(
            r#"type Movie { title: String @settable(onCreate: "no") @filterable(byNothing: true) }"#,
            &interner,
        );
        assert!(parse_arguments::<SettableDirective>(&directives[0], &interner).is_err());
        assert!(parse_arguments::<FilterableDirective>(&directives[1], &interner).is_err());
    }

    #[test]
    fn test_nested_operations_set_algebra() {
        let only_connect = NestedOperations::from_list(&[NestedOperation::Connect]);
        assert!(only_connect.connect && !only_connect.create);
        assert_eq!(NestedOperations::ALL.intersect(only_connect), only_connect);
        assert!(NestedOperations::default().is_empty());
        assert_eq!(
            only_connect.union(NestedOperations::ALL),
            NestedOperations::ALL
        );
    }

    #[test]
    fn test_recognized_names() {
        assert!(is_recognized("relationship"));
        assert!(!is_recognized("customDirectiveField"));
    }
}
