//! Scalar rule tables.
//!
//! Maps a scalar or enum field to its filter, update and aggregation
//! fields. The value kind decides which operators apply; list fields get
//! their own small operator set.

use nodegql_model::{Field, ValueKind};
use nodegql_schema::{FieldDef, InputFieldDef, ObjectDef, TypeRef};

/// Deprecation reason of the bare filter field emitted next to `_EQ`.
pub const LEGACY_FILTER_REASON: &str = "Please use the explicit _EQ version";

/// Deprecation reason of the bare update field emitted next to `_SET`.
pub const LEGACY_UPDATE_REASON: &str = "Please use the explicit _SET field";

const COMPARATORS: &[&str] = &["EQUAL", "GT", "GTE", "LT", "LTE"];

/// Value type of one operator, relative to the field type.
#[derive(Debug, Clone, Copy)]
enum Operand {
    /// The field's named type.
    Same,
    /// `[T!]`
    List,
    /// `String`, or `ID` for ID fields.
    Text,
    Named(&'static str),
}

fn filter_operators(field: &Field) -> &'static [(&'static str, Operand)] {
    if field.is_list() {
        return &[("_EQ", Operand::List), ("_INCLUDES", Operand::Same)];
    }
    match field.kind {
        ValueKind::String | ValueKind::Id => &[
            ("_EQ", Operand::Same),
            ("_IN", Operand::List),
            ("_CONTAINS", Operand::Text),
            ("_STARTS_WITH", Operand::Text),
            ("_ENDS_WITH", Operand::Text),
        ],
        ValueKind::Int | ValueKind::Float | ValueKind::BigInt | ValueKind::Temporal => &[
            ("_EQ", Operand::Same),
            ("_IN", Operand::List),
            ("_LT", Operand::Same),
            ("_LTE", Operand::Same),
            ("_GT", Operand::Same),
            ("_GTE", Operand::Same),
        ],
        ValueKind::Boolean => &[("_EQ", Operand::Same)],
        ValueKind::Enum | ValueKind::Custom => &[("_EQ", Operand::Same), ("_IN", Operand::List)],
    }
}

fn update_operators(field: &Field) -> &'static [(&'static str, Operand)] {
    if field.is_list() {
        return &[("_PUSH", Operand::List), ("_POP", Operand::Named("Int"))];
    }
    match field.kind {
        ValueKind::Int | ValueKind::BigInt => {
            &[("_INCREMENT", Operand::Same), ("_DECREMENT", Operand::Same)]
        }
        ValueKind::Float => &[
            ("_ADD", Operand::Named("Float")),
            ("_SUBTRACT", Operand::Named("Float")),
            ("_MULTIPLY", Operand::Named("Float")),
            ("_DIVIDE", Operand::Named("Float")),
        ],
        _ => &[],
    }
}

fn operand_type(field: &Field, operand: Operand) -> TypeRef {
    let base = field.ty.name();
    match operand {
        Operand::Same => TypeRef::named(base),
        Operand::List => TypeRef::list_of(base),
        Operand::Text if field.kind == ValueKind::Id => TypeRef::named("ID"),
        Operand::Text => TypeRef::named("String"),
        Operand::Named(name) => TypeRef::named(name),
    }
}

fn legacy_reason(field: &Field, fallback: &str) -> Option<String> {
    match &field.deprecation {
        Some(deprecation) => deprecation.reason.clone(),
        None => Some(fallback.to_string()),
    }
}

/// Filter fields of `<E>Where` for one field.
#[must_use]
pub fn filter_fields(field: &Field, legacy: bool) -> Vec<InputFieldDef> {
    let mut out = Vec::new();

    if legacy {
        let ty = if field.is_list() {
            TypeRef::list_of(field.ty.name())
        } else {
            TypeRef::named(field.ty.name())
        };
        out.push(
            InputFieldDef::new(&field.name, ty)
                .deprecated(legacy_reason(field, LEGACY_FILTER_REASON)),
        );
    }

    for (op, operand) in filter_operators(field) {
        out.push(
            InputFieldDef::new(format!("{}{op}", field.name), operand_type(field, *operand))
                .deprecated_if(field.deprecation.as_ref()),
        );
    }
    out
}

/// Field of `<E>CreateInput`, keeping the declared type.
#[must_use]
pub fn create_field(field: &Field) -> InputFieldDef {
    InputFieldDef::new(&field.name, field.ty.clone()).deprecated_if(field.deprecation.as_ref())
}

/// Fields of `<E>UpdateInput` for one field.
#[must_use]
pub fn update_fields(field: &Field, legacy: bool) -> Vec<InputFieldDef> {
    let ty = field.ty.nullable();
    let mut out = Vec::new();

    if legacy {
        out.push(
            InputFieldDef::new(&field.name, ty.clone())
                .deprecated(legacy_reason(field, LEGACY_UPDATE_REASON)),
        );
    }
    out.push(
        InputFieldDef::new(format!("{}_SET", field.name), ty)
            .deprecated_if(field.deprecation.as_ref()),
    );
    for (op, operand) in update_operators(field) {
        out.push(
            InputFieldDef::new(format!("{}{op}", field.name), operand_type(field, *operand))
                .deprecated_if(field.deprecation.as_ref()),
        );
    }
    out
}

/// Returns true if the field contributes to aggregate selections.
#[must_use]
pub fn is_aggregatable(field: &Field) -> bool {
    !field.is_list()
        && matches!(
            field.kind,
            ValueKind::String
                | ValueKind::Id
                | ValueKind::Int
                | ValueKind::Float
                | ValueKind::BigInt
                | ValueKind::Temporal
        )
}

/// Name of the shared `<Scalar>AggregateSelection` type of a field.
#[must_use]
pub fn aggregate_selection_name(field: &Field) -> Option<String> {
    is_aggregatable(field).then(|| format!("{}AggregateSelection", field.ty.name()))
}

/// The shared `<Scalar>AggregateSelection` type of a field.
#[must_use]
pub fn aggregate_selection_type(field: &Field) -> Option<ObjectDef> {
    let name = aggregate_selection_name(field)?;
    let base = field.ty.name();

    let fields: Vec<(&str, &str)> = match field.kind {
        ValueKind::String | ValueKind::Id => vec![("shortest", base), ("longest", base)],
        ValueKind::Int => vec![
            ("min", "Int"),
            ("max", "Int"),
            ("average", "Float"),
            ("sum", "Int"),
        ],
        ValueKind::Float => vec![
            ("min", "Float"),
            ("max", "Float"),
            ("average", "Float"),
            ("sum", "Float"),
        ],
        ValueKind::BigInt => vec![
            ("min", "BigInt"),
            ("max", "BigInt"),
            ("average", "BigInt"),
            ("sum", "BigInt"),
        ],
        ValueKind::Temporal => vec![("min", base), ("max", base)],
        ValueKind::Boolean | ValueKind::Enum | ValueKind::Custom => return None,
    };

    let mut def = ObjectDef::new(name);
    for (field_name, ty) in fields {
        def.add_field(FieldDef::new(field_name, TypeRef::named(ty)));
    }
    Some(def)
}

/// Aggregation filter fields of `...AggregationWhereInput` for one field.
#[must_use]
pub fn aggregation_filters(field: &Field) -> Vec<InputFieldDef> {
    if field.is_list() {
        return Vec::new();
    }
    let base = field.ty.name();

    let functions: Vec<(&str, &str)> = match field.kind {
        ValueKind::String => vec![
            ("SHORTEST_LENGTH", "Int"),
            ("LONGEST_LENGTH", "Int"),
            ("AVERAGE_LENGTH", "Float"),
        ],
        ValueKind::Int => vec![
            ("MIN", "Int"),
            ("MAX", "Int"),
            ("SUM", "Int"),
            ("AVERAGE", "Float"),
        ],
        ValueKind::Float => vec![
            ("MIN", "Float"),
            ("MAX", "Float"),
            ("SUM", "Float"),
            ("AVERAGE", "Float"),
        ],
        ValueKind::BigInt => vec![
            ("MIN", "BigInt"),
            ("MAX", "BigInt"),
            ("SUM", "BigInt"),
            ("AVERAGE", "BigInt"),
        ],
        ValueKind::Temporal => vec![("MIN", base), ("MAX", base)],
        _ => Vec::new(),
    };

    let mut out = Vec::new();
    for (function, ty) in functions {
        for comparator in COMPARATORS {
            out.push(
                InputFieldDef::new(
                    format!("{}_{function}_{comparator}", field.name),
                    TypeRef::named(ty),
                )
                .deprecated_if(field.deprecation.as_ref()),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use nodegql_core::Span;
    use nodegql_model::{
        FilterableDirective, SelectableDirective, SettableDirective, SortableDirective,
    };
    use nodegql_schema::Deprecation;

    fn field(name: &str, ty: TypeRef, kind: ValueKind) -> Field {
        Field {
            name: name.into(),
            description: None,
            ty,
            kind,
            arguments: IndexMap::new(),
            settable: SettableDirective::default(),
            filterable: FilterableDirective::default(),
            selectable: SelectableDirective::default(),
            sortable: SortableDirective::default(),
            deprecation: None,
            directives: Vec::new(),
            inherited_from: None,
            span: Span::default(),
        }
    }

    fn names(fields: &[InputFieldDef]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_string_filters() {
        let title = field("title", TypeRef::required("String"), ValueKind::String);
        let filters = filter_fields(&title, true);
        assert_eq!(
            names(&filters),
            vec![
                "title",
                "title_EQ",
                "title_IN",
                "title_CONTAINS",
                "title_STARTS_WITH",
                "title_ENDS_WITH"
            ]
        );
        assert!(filters[0].deprecated);
        assert_eq!(filters[2].ty.to_string(), "[String!]");
        assert!(!filters[1].ty.is_non_null());
    }

    #[test]
    fn test_id_text_operators_use_id() {
        let id = field("id", TypeRef::required("ID"), ValueKind::Id);
        let filters = filter_fields(&id, false);
        let contains = filters.iter().find(|f| f.name == "id_CONTAINS").unwrap();
        assert_eq!(contains.ty, TypeRef::named("ID"));
    }

    #[test]
    fn test_list_filters_and_updates() {
        let tags = field("tags", TypeRef::list_of("String"), ValueKind::String);
        assert_eq!(
            names(&filter_fields(&tags, false)),
            vec!["tags_EQ", "tags_INCLUDES"]
        );
        let updates = update_fields(&tags, false);
        assert_eq!(names(&updates), vec!["tags_SET", "tags_PUSH", "tags_POP"]);
        assert_eq!(updates[2].ty, TypeRef::named("Int"));
    }

    #[test]
    fn test_numeric_updates() {
        let runtime = field("runtime", TypeRef::named("Int"), ValueKind::Int);
        assert_eq!(
            names(&update_fields(&runtime, true)),
            vec![
                "runtime",
                "runtime_SET",
                "runtime_INCREMENT",
                "runtime_DECREMENT"
            ]
        );
        let rating = field("rating", TypeRef::named("Float"), ValueKind::Float);
        assert_eq!(update_fields(&rating, false).len(), 5);
    }

    #[test]
    fn test_deprecation_propagates() {
        let mut old = field("old", TypeRef::named("Boolean"), ValueKind::Boolean);
        old.deprecation = Some(Deprecation {
            reason: Some("gone".into()),
        });
        for input in filter_fields(&old, true)
            .iter()
            .chain(&update_fields(&old, true))
        {
            assert!(input.deprecated);
            assert_eq!(input.deprecation_reason.as_deref(), Some("gone"));
        }
    }

    #[test]
    fn test_aggregate_selections() {
        let runtime = field("runtime", TypeRef::named("Int"), ValueKind::Int);
        let selection = aggregate_selection_type(&runtime).unwrap();
        assert_eq!(selection.name, "IntAggregateSelection");
        assert_eq!(selection.fields["average"].ty, TypeRef::named("Float"));

        let released = field("released", TypeRef::named("DateTime"), ValueKind::Temporal);
        assert_eq!(
            aggregate_selection_name(&released).as_deref(),
            Some("DateTimeAggregateSelection")
        );

        let flag = field("flag", TypeRef::named("Boolean"), ValueKind::Boolean);
        assert!(aggregate_selection_type(&flag).is_none());
    }

    #[test]
    fn test_aggregation_filters() {
        let title = field("title", TypeRef::named("String"), ValueKind::String);
        let filters = aggregation_filters(&title);
        assert_eq!(filters.len(), 15);
        let average = filters
            .iter()
            .find(|f| f.name == "title_AVERAGE_LENGTH_EQUAL")
            .unwrap();
        assert_eq!(average.ty, TypeRef::named("Float"));

        let id = field("id", TypeRef::named("ID"), ValueKind::Id);
        assert!(aggregation_filters(&id).is_empty());
    }
}
