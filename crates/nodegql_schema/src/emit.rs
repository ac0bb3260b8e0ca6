//! SDL emitter.
//!
//! Output is fully sorted (types, fields, arguments, enum values, union
//! members and implemented interfaces) so that the same graph always
//! serializes to the same bytes. Applied directives keep their source order.

use crate::graph::TypeGraph;
use crate::types::{
    is_builtin_scalar, ConstValue, DirectiveDefinition, DirectiveUse, EnumDef, FieldDef,
    InputFieldDef, InputObjectDef, ObjectDef, TypeDef, UnionDef,
};
use indexmap::IndexMap;

const INDENT: &str = "  ";

/// Serializes the type graph as GraphQL SDL.
pub fn emit(graph: &TypeGraph) -> String {
    let mut output = String::new();

    emit_schema_block(graph, &mut output);

    let mut directives: Vec<&DirectiveDefinition> = graph.directives().collect();
    directives.sort_by(|a, b| a.name.cmp(&b.name));
    for directive in directives {
        emit_directive_definition(directive, &mut output);
    }

    let mut types: Vec<&TypeDef> = graph
        .types()
        .filter(|def| !matches!(def, TypeDef::Scalar(s) if is_builtin_scalar(&s.name)))
        .collect();
    types.sort_by(|a, b| a.name().cmp(b.name()));

    for def in types {
        match def {
            TypeDef::Scalar(scalar) => {
                emit_description(scalar.description.as_deref(), "", &mut output);
                output.push_str(&format!("scalar {}", scalar.name));
                emit_directive_uses(&scalar.directives, &mut output);
                output.push('\n');
            }
            TypeDef::Object(obj) => emit_object("type", obj, &mut output),
            TypeDef::Interface(iface) => {
                let as_object = ObjectDef {
                    name: iface.name.clone(),
                    description: iface.description.clone(),
                    fields: iface.fields.clone(),
                    implements: iface.implements.clone(),
                    directives: iface.directives.clone(),
                };
                emit_object("interface", &as_object, &mut output);
            }
            TypeDef::Union(union) => emit_union(union, &mut output),
            TypeDef::Enum(def) => emit_enum(def, &mut output),
            TypeDef::InputObject(input) => emit_input(input, &mut output),
        }
        output.push('\n');
    }

    while output.ends_with("\n\n") {
        output.pop();
    }
    output
}

fn emit_schema_block(graph: &TypeGraph, output: &mut String) {
    let roots = [
        ("query", &graph.roots.query),
        ("mutation", &graph.roots.mutation),
        ("subscription", &graph.roots.subscription),
    ];
    if roots.iter().all(|(_, name)| name.is_none()) {
        return;
    }

    output.push_str("schema {\n");
    for (operation, name) in roots {
        if let Some(name) = name {
            output.push_str(&format!("{INDENT}{operation}: {name}\n"));
        }
    }
    output.push_str("}\n\n");
}

fn emit_directive_definition(directive: &DirectiveDefinition, output: &mut String) {
    emit_description(directive.description.as_deref(), "", output);
    output.push_str(&format!("directive @{}", directive.name));
    emit_arguments(&directive.arguments, output);
    if directive.repeatable {
        output.push_str(" repeatable");
    }
    output.push_str(&format!(" on {}\n\n", directive.locations.join(" | ")));
}

fn emit_object(keyword: &str, obj: &ObjectDef, output: &mut String) {
    emit_description(obj.description.as_deref(), "", output);
    output.push_str(&format!("{keyword} {}", obj.name));

    if !obj.implements.is_empty() {
        let mut implements: Vec<&str> = obj.implements.iter().map(String::as_str).collect();
        implements.sort_unstable();
        output.push_str(&format!(" implements {}", implements.join(" & ")));
    }
    emit_directive_uses(&obj.directives, output);
    output.push_str(" {\n");

    let mut fields: Vec<&FieldDef> = obj.fields.values().collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    for field in fields {
        emit_description(field.description.as_deref(), INDENT, output);
        output.push_str(&format!("{INDENT}{}", field.name));
        emit_arguments(&field.arguments, output);
        output.push_str(&format!(": {}", field.ty));
        emit_deprecation(field.deprecated, field.deprecation_reason.as_deref(), output);
        emit_directive_uses(&field.directives, output);
        output.push('\n');
    }

    output.push_str("}\n");
}

fn emit_union(union: &UnionDef, output: &mut String) {
    emit_description(union.description.as_deref(), "", output);
    output.push_str(&format!("union {}", union.name));
    emit_directive_uses(&union.directives, output);

    let mut members: Vec<&str> = union.members.iter().map(String::as_str).collect();
    members.sort_unstable();
    output.push_str(&format!(" = {}\n", members.join(" | ")));
}

fn emit_enum(def: &EnumDef, output: &mut String) {
    emit_description(def.description.as_deref(), "", output);
    output.push_str(&format!("enum {}", def.name));
    emit_directive_uses(&def.directives, output);
    output.push_str(" {\n");

    let mut values: Vec<_> = def.values.iter().collect();
    values.sort_by(|a, b| a.name.cmp(&b.name));
    for value in values {
        emit_description(value.description.as_deref(), INDENT, output);
        output.push_str(&format!("{INDENT}{}", value.name));
        emit_deprecation(value.deprecated, value.deprecation_reason.as_deref(), output);
        emit_directive_uses(&value.directives, output);
        output.push('\n');
    }

    output.push_str("}\n");
}

fn emit_input(input: &InputObjectDef, output: &mut String) {
    emit_description(input.description.as_deref(), "", output);
    output.push_str(&format!("input {}", input.name));
    emit_directive_uses(&input.directives, output);
    output.push_str(" {\n");

    let mut fields: Vec<&InputFieldDef> = input.fields.values().collect();
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    for field in fields {
        emit_description(field.description.as_deref(), INDENT, output);
        output.push_str(INDENT);
        emit_input_value(field, output);
        output.push('\n');
    }

    output.push_str("}\n");
}

fn emit_arguments(arguments: &IndexMap<String, InputFieldDef>, output: &mut String) {
    if arguments.is_empty() {
        return;
    }

    let mut args: Vec<&InputFieldDef> = arguments.values().collect();
    args.sort_by(|a, b| a.name.cmp(&b.name));

    output.push('(');
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        emit_input_value(arg, output);
    }
    output.push(')');
}

fn emit_input_value(value: &InputFieldDef, output: &mut String) {
    output.push_str(&format!("{}: {}", value.name, value.ty));
    if let Some(default) = &value.default_value {
        output.push_str(&format!(" = {default}"));
    }
    emit_deprecation(value.deprecated, value.deprecation_reason.as_deref(), output);
    emit_directive_uses(&value.directives, output);
}

fn emit_deprecation(deprecated: bool, reason: Option<&str>, output: &mut String) {
    if !deprecated {
        return;
    }
    let directive = match reason {
        Some(reason) => DirectiveUse::new("deprecated")
            .argument("reason", ConstValue::String(reason.to_string())),
        None => DirectiveUse::new("deprecated"),
    };
    output.push_str(&format!(" {directive}"));
}

fn emit_directive_uses(directives: &[DirectiveUse], output: &mut String) {
    for directive in directives {
        output.push_str(&format!(" {directive}"));
    }
}

fn emit_description(description: Option<&str>, indent: &str, output: &mut String) {
    let Some(description) = description else {
        return;
    };

    output.push_str(&format!("{indent}\"\"\"\n"));
    for line in description.replace("\"\"\"", "\\\"\"\"").lines() {
        if line.is_empty() {
            output.push('\n');
        } else {
            output.push_str(&format!("{indent}{line}\n"));
        }
    }
    output.push_str(&format!("{indent}\"\"\"\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumValueDef, ScalarDef, TypeRef};

    fn sample_graph() -> TypeGraph {
        let mut graph = TypeGraph::new();
        graph
            .insert(TypeDef::Object(
                ObjectDef::new("Movie")
                    .with_description(Some("A film.".into()))
                    .field(FieldDef::new("title", TypeRef::required("String")))
                    .field(
                        FieldDef::new("actors", TypeRef::required_list_of("Actor"))
                            .argument("where", TypeRef::named("ActorWhere"))
                            .argument("limit", TypeRef::named("Int")),
                    ),
            ))
            .unwrap();
        graph
            .insert(TypeDef::Object(
                ObjectDef::new("Actor").field(
                    FieldDef::new("name", TypeRef::named("String"))
                        .deprecated(Some("Use fullName".into()))
                        .with_directives(vec![DirectiveUse::new("custom")
                            .argument("level", ConstValue::Int(1))]),
                ),
            ))
            .unwrap();
        graph
            .insert(TypeDef::InputObject(
                InputObjectDef::new("ActorWhere")
                    .field(InputFieldDef::new("name_EQ", TypeRef::named("String")))
                    .field(
                        InputFieldDef::new("name", TypeRef::named("String"))
                            .deprecated(Some("Please use the explicit _EQ version".into())),
                    ),
            ))
            .unwrap();
        graph
            .insert(TypeDef::Enum(EnumDef::new("SortDirection", ["DESC", "ASC"])))
            .unwrap();
        graph.insert(TypeDef::Scalar(ScalarDef::new("String"))).unwrap();
        graph.roots.query = Some("Movie".into());
        graph
    }

    #[test]
    fn test_emit_sorted_sdl() {
        insta::assert_snapshot!(emit(&sample_graph()), @r#"
        schema {
          query: Movie
        }

        type Actor {
          name: String @deprecated(reason: "Use fullName") @custom(level: 1)
        }

        input ActorWhere {
          name: String @deprecated(reason: "Please use the explicit _EQ version")
          name_EQ: String
        }

        """
        A film.
        """
        type Movie {
          actors(limit: Int, where: ActorWhere): [Actor!]!
          title: String!
        }

        enum SortDirection {
          ASC
          DESC
        }
        "#);
    }

    #[test]
    fn test_emit_is_deterministic() {
        let graph = sample_graph();
        assert_eq!(emit(&graph), emit(&graph.clone()));
    }

    #[test]
    fn test_emit_union_and_directive_definition() {
        let mut graph = TypeGraph::new();
        graph
            .insert(TypeDef::Union(UnionDef::new(
                "Search",
                vec!["Series".into(), "Movie".into()],
            )))
            .unwrap();
        let mut level = InputFieldDef::new("level", TypeRef::named("Int"));
        level.default_value = Some(ConstValue::Int(1));
        graph.add_directive(DirectiveDefinition {
            name: "customDirectiveField".into(),
            description: None,
            arguments: [("level".to_string(), level)].into_iter().collect(),
            locations: vec!["FIELD_DEFINITION".into(), "OBJECT".into()],
            repeatable: false,
        });

        assert_eq!(
            emit(&graph),
            "directive @customDirectiveField(level: Int = 1) on FIELD_DEFINITION | OBJECT\n\n\
             union Search = Movie | Series\n"
        );
    }

    #[test]
    fn test_emit_deprecated_enum_value() {
        let mut graph = TypeGraph::new();
        let mut old = EnumValueDef::new("OLD");
        old.deprecated = true;
        let mut def = EnumDef::new("Genre", ["NEW"]);
        def.values.push(old);
        graph.insert(TypeDef::Enum(def)).unwrap();

        assert_eq!(emit(&graph), "enum Genre {\n  NEW\n  OLD @deprecated\n}\n");
    }
}
