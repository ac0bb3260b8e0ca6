//! Types shared by every entity, emitted on first use.

use crate::naming::shared;
use nodegql_schema::{EnumDef, FieldDef, InputFieldDef, InputObjectDef, ObjectDef, TypeDef, TypeRef};

pub fn sort_direction() -> TypeDef {
    let mut def = EnumDef::new(shared::SORT_DIRECTION, ["ASC", "DESC"]);
    def.values[0].description = Some("Sort by field values in ascending order.".into());
    def.values[1].description = Some("Sort by field values in descending order.".into());
    TypeDef::Enum(def)
}

pub fn page_info() -> TypeDef {
    TypeDef::Object(
        ObjectDef::new(shared::PAGE_INFO)
            .with_description(Some("Pagination information (Relay)".into()))
            .field(FieldDef::new("hasNextPage", TypeRef::required("Boolean")))
            .field(FieldDef::new("hasPreviousPage", TypeRef::required("Boolean")))
            .field(FieldDef::new("startCursor", TypeRef::named("String")))
            .field(FieldDef::new("endCursor", TypeRef::named("String"))),
    )
}

pub fn create_info() -> TypeDef {
    counts(shared::CREATE_INFO, &["nodesCreated", "relationshipsCreated"])
}

pub fn update_info() -> TypeDef {
    counts(
        shared::UPDATE_INFO,
        &[
            "nodesCreated",
            "nodesDeleted",
            "relationshipsCreated",
            "relationshipsDeleted",
        ],
    )
}

pub fn delete_info() -> TypeDef {
    counts(shared::DELETE_INFO, &["nodesDeleted", "relationshipsDeleted"])
}

pub fn event_type() -> TypeDef {
    TypeDef::Enum(EnumDef::new(
        shared::EVENT_TYPE,
        ["CREATE", "DELETE", "UPDATE"],
    ))
}

fn counts(name: &str, fields: &[&str]) -> TypeDef {
    let mut def = ObjectDef::new(name);
    for field in fields {
        def.add_field(FieldDef::new(*field, TypeRef::required("Int")));
    }
    TypeDef::Object(def)
}

/// Adds `AND`, `OR` and `NOT` combinators referencing the input itself.
pub fn add_logical_operators(input: &mut InputObjectDef) {
    let name = input.name.clone();
    input.add_field(InputFieldDef::new("AND", TypeRef::list_of(&name)));
    input.add_field(InputFieldDef::new("OR", TypeRef::list_of(&name)));
    input.add_field(InputFieldDef::new("NOT", TypeRef::named(name)));
}

/// Creates an input with `AND`, `OR` and `NOT` combinators.
#[must_use]
pub fn logical_input(name: impl Into<String>) -> InputObjectDef {
    let mut input = InputObjectDef::new(name);
    add_logical_operators(&mut input);
    input
}

/// Input types without fields are not valid GraphQL; this placeholder keeps
/// them addressable.
pub fn fill_empty_input(input: &mut InputObjectDef) {
    if input.is_empty() {
        input.add_field(InputFieldDef::new("_emptyInput", TypeRef::named("Boolean")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_input() {
        let input = logical_input("MovieWhere");
        assert_eq!(input.fields["AND"].ty.to_string(), "[MovieWhere!]");
        assert_eq!(input.fields["NOT"].ty.to_string(), "MovieWhere");
    }

    #[test]
    fn test_fill_empty_input() {
        let mut input = InputObjectDef::new("MovieCreateInput");
        fill_empty_input(&mut input);
        assert!(input.fields.contains_key("_emptyInput"));
        fill_empty_input(&mut input);
        assert_eq!(input.fields.len(), 1);
    }
}
