//! Entity model builder.
//!
//! Walks the parsed document once, interprets the directive vocabulary and
//! produces an [`EntityGraph`]. Every problem is collected; the build only
//! fails after the whole document has been checked.

use crate::directives::{
    self, names, DeclareRelationshipDirective, FilterableDirective, MutationDirective,
    NestedOperations, NodeDirective, PluralDirective, QueryDirective, RelationshipDirective,
    SelectableDirective, SettableDirective, SortableDirective, TypedDirective,
};
use crate::entity::{
    Edge, Entity, EntityGraph, EntityKind, Field, PropertiesType, Relationship, RelationshipTarget,
    UnionEntity, ValueKind, LIBRARY_SCALARS,
};
use indexmap::IndexMap;
use nodegql_core::{diagnostics::codes, DiagnosticBag, Interner, Span};
use nodegql_schema::{
    is_builtin_scalar, BUILTIN_SCALARS, Deprecation, DirectiveUse, EnumDef, EnumValueDef,
    InputFieldDef, InputObjectDef, ScalarDef, TypeRef,
};
use nodegql_syntax as syntax;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Type names reserved for the generated root operation types.
pub const RESERVED_TYPE_NAMES: &[&str] = &["Query", "Mutation", "Subscription"];

/// The document failed validation. Carries every problem found.
#[derive(Debug, Clone, Error)]
#[error("schema validation failed with {} error(s)", .diagnostics.error_count())]
pub struct ValidationError {
    pub diagnostics: DiagnosticBag,
}

/// Builds the entity graph from a parsed document.
pub fn build_entity_model(
    document: &syntax::Document,
    interner: &Interner,
) -> Result<EntityGraph, ValidationError> {
    let mut builder = Builder::new(interner);
    let mut graph = builder.build(document);

    if builder.diagnostics.has_errors() {
        let mut diagnostics = builder.diagnostics;
        diagnostics.extend(builder.warnings);
        diagnostics.sort();
        return Err(ValidationError { diagnostics });
    }

    graph.warnings = builder.warnings;
    Ok(graph)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Entity,
    Interface,
    Union,
    Properties,
    Enum,
    Scalar,
    Input,
}

/// Outcome of reading one typed directive.
enum Parsed<T> {
    Absent,
    Invalid,
    Valid(T),
}

impl<T> Parsed<T> {
    fn valid(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Absent | Self::Invalid => None,
        }
    }
}

enum Member {
    Field(Field),
    Relationship(Relationship),
}

struct Builder<'a> {
    interner: &'a Interner,
    diagnostics: DiagnosticBag,
    warnings: DiagnosticBag,
    kinds: FxHashMap<String, Kind>,
}

impl<'a> Builder<'a> {
    fn new(interner: &'a Interner) -> Self {
        let kinds = BUILTIN_SCALARS
            .iter()
            .chain(LIBRARY_SCALARS)
            .map(|name| ((*name).to_string(), Kind::Scalar))
            .collect();
        Self {
            interner,
            diagnostics: DiagnosticBag::new(),
            warnings: DiagnosticBag::new(),
            kinds,
        }
    }

    fn text(&self, name: syntax::Name) -> String {
        self.interner.get(name.value)
    }

    fn build(&mut self, document: &syntax::Document) -> EntityGraph {
        let definitions = self.collect_types(document);
        let mut graph = EntityGraph::default();

        for def in definitions {
            match def {
                syntax::TypeDefinition::Object(obj) => {
                    if self.has_directive(&obj.directives, names::RELATIONSHIP_PROPERTIES) {
                        let props = self.build_properties(obj);
                        graph.properties.insert(props.name.clone(), props);
                    } else {
                        let entity = self.build_entity(
                            EntityKind::Concrete,
                            obj.name,
                            obj.description.as_ref(),
                            &obj.implements,
                            &obj.directives,
                            &obj.fields,
                            obj.span,
                        );
                        graph.entities.insert(entity.name.clone(), entity);
                    }
                }
                syntax::TypeDefinition::Interface(iface) => {
                    let entity = self.build_entity(
                        EntityKind::Interface,
                        iface.name,
                        iface.description.as_ref(),
                        &iface.implements,
                        &iface.directives,
                        &iface.fields,
                        iface.span,
                    );
                    graph.entities.insert(entity.name.clone(), entity);
                }
                syntax::TypeDefinition::Union(union) => {
                    let union = self.build_union(union);
                    graph.unions.insert(union.name.clone(), union);
                }
                syntax::TypeDefinition::Enum(def) => {
                    let def = self.build_enum(def);
                    graph.enums.insert(def.name.clone(), def);
                }
                syntax::TypeDefinition::Scalar(def) => {
                    let mut scalar = ScalarDef::new(self.text(def.name));
                    scalar.description = def.description.as_ref().map(|d| d.value.clone());
                    scalar.directives = self.passthrough(&def.directives);
                    graph.scalars.insert(scalar.name.clone(), scalar);
                }
                syntax::TypeDefinition::Input(def) => {
                    let input = self.build_input(def);
                    graph.inputs.insert(input.name.clone(), input);
                }
            }
        }

        for def in document.directive_definitions() {
            let definition = self.build_directive_definition(def);
            graph.directive_definitions.push(definition);
        }

        self.flatten(&mut graph.entities);
        self.resolve_targets(&mut graph);
        collect_declared_properties(&mut graph.entities);
        self.check_unused_properties(&graph);
        register_library_scalars(&mut graph);

        graph
    }

    // =========================================================================
    // Type collection
    // =========================================================================

    fn collect_types<'d>(
        &mut self,
        document: &'d syntax::Document,
    ) -> Vec<&'d syntax::TypeDefinition> {
        let mut accepted = Vec::new();

        for def in document.types() {
            let name = self.text(def.name());

            if RESERVED_TYPE_NAMES.contains(&name.as_str()) {
                self.diagnostics.error(
                    codes::RESERVED_TYPE_NAME,
                    "reserved type name",
                    def.name().span,
                    format!("`{name}` is generated by the schema engine and cannot be declared"),
                );
                continue;
            }

            let kind = match def {
                syntax::TypeDefinition::Object(obj) => {
                    if self.has_directive(&obj.directives, names::RELATIONSHIP_PROPERTIES) {
                        Kind::Properties
                    } else {
                        Kind::Entity
                    }
                }
                syntax::TypeDefinition::Interface(_) => Kind::Interface,
                syntax::TypeDefinition::Union(_) => Kind::Union,
                syntax::TypeDefinition::Enum(_) => Kind::Enum,
                syntax::TypeDefinition::Scalar(_) => Kind::Scalar,
                syntax::TypeDefinition::Input(_) => Kind::Input,
            };

            let redeclares_library_scalar =
                kind == Kind::Scalar && LIBRARY_SCALARS.contains(&name.as_str());
            if is_builtin_scalar(&name)
                || (self.kinds.contains_key(&name) && !redeclares_library_scalar)
            {
                self.diagnostics.error(
                    codes::DUPLICATE_TYPE,
                    "duplicate type",
                    def.name().span,
                    format!("type `{name}` is defined more than once"),
                );
                continue;
            }

            self.kinds.insert(name, kind);
            accepted.push(def);
        }

        accepted
    }

    // =========================================================================
    // Directive reading
    // =========================================================================

    fn find_directive<'d>(
        &self,
        directives: &'d [syntax::Directive],
        name: &str,
    ) -> Option<&'d syntax::Directive> {
        directives
            .iter()
            .find(|d| self.interner.is(d.name.value, name))
    }

    fn has_directive(&self, directives: &[syntax::Directive], name: &str) -> bool {
        self.find_directive(directives, name).is_some()
    }

    fn read<T: TypedDirective>(&mut self, directives: &[syntax::Directive]) -> Parsed<T> {
        let Some(directive) = self.find_directive(directives, T::NAME) else {
            return Parsed::Absent;
        };

        let missing = directives::missing_arguments::<T>(directive, self.interner);
        if !missing.is_empty() {
            for arg in missing {
                self.diagnostics.error(
                    codes::MISSING_ARGUMENT,
                    "missing directive argument",
                    directive.span,
                    format!("@{} requires argument `{arg}`", T::NAME),
                );
            }
            return Parsed::Invalid;
        }

        match directives::parse_arguments::<T>(directive, self.interner) {
            Ok(value) => Parsed::Valid(value),
            Err(err) => {
                self.diagnostics.error(
                    codes::INVALID_ARGUMENT,
                    "invalid directive argument",
                    directive.span,
                    format!("@{}: {err}", T::NAME),
                );
                Parsed::Invalid
            }
        }
    }

    fn read_or_default<T: TypedDirective + Default>(
        &mut self,
        directives: &[syntax::Directive],
    ) -> T {
        self.read(directives).valid().unwrap_or_default()
    }

    fn passthrough(&self, directives: &[syntax::Directive]) -> Vec<DirectiveUse> {
        directives
            .iter()
            .filter(|d| !directives::is_recognized(&self.text(d.name)))
            .map(|d| DirectiveUse {
                name: self.text(d.name),
                arguments: d
                    .arguments
                    .iter()
                    .map(|arg| {
                        (
                            self.text(arg.name),
                            directives::const_value(&arg.value, self.interner),
                        )
                    })
                    .collect(),
            })
            .collect()
    }

    fn convert_type(&self, ty: &syntax::Type) -> TypeRef {
        match ty {
            syntax::Type::Named(named) => TypeRef::Named(self.interner.get(named.name)),
            syntax::Type::List(inner, _) => TypeRef::List(Box::new(self.convert_type(inner))),
            syntax::Type::NonNull(inner, _) => {
                TypeRef::NonNull(Box::new(self.convert_type(inner)))
            }
        }
    }

    fn convert_input_value(&mut self, value: &syntax::InputValueDefinition) -> InputFieldDef {
        let ty = self.convert_type(&value.ty);
        if !self.kinds.contains_key(ty.name()) {
            self.report_unknown_type(ty.name(), value.ty.span());
        }

        let mut def = InputFieldDef::new(self.text(value.name), ty);
        def.description = value.description.as_ref().map(|d| d.value.clone());
        def.default_value = value
            .default_value
            .as_ref()
            .map(|v| directives::const_value(v, self.interner));
        def.directives = self.passthrough(&value.directives);
        if let Some(deprecation) = self.read::<Deprecation>(&value.directives).valid() {
            def = def.deprecated(deprecation.reason);
        }
        def
    }

    fn report_unknown_type(&mut self, name: &str, span: Span) {
        self.diagnostics.error(
            codes::UNDEFINED_TYPE,
            "unknown type",
            span,
            format!("type `{name}` is not defined"),
        );
    }

    // =========================================================================
    // Entities
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    fn build_entity(
        &mut self,
        kind: EntityKind,
        name: syntax::Name,
        description: Option<&syntax::Description>,
        implements: &[syntax::Name],
        directives: &[syntax::Directive],
        fields: &[syntax::FieldDefinition],
        span: Span,
    ) -> Entity {
        let name_text = self.text(name);

        let labels = if kind == EntityKind::Concrete {
            match self.read::<NodeDirective>(directives).valid() {
                Some(node) if !node.labels.is_empty() => node.labels,
                _ => vec![name_text.clone()],
            }
        } else {
            Vec::new()
        };
        let query = self.read_or_default::<QueryDirective>(directives);
        let mutation = self.read_or_default::<MutationDirective>(directives);
        let plural = self
            .read::<PluralDirective>(directives)
            .valid()
            .map(|p| p.value);

        let mut interfaces = Vec::new();
        for iface in implements {
            let iface_name = self.text(*iface);
            match self.kinds.get(&iface_name) {
                Some(Kind::Interface) => interfaces.push(iface_name),
                Some(_) => self.diagnostics.error(
                    codes::NOT_AN_INTERFACE,
                    "not an interface",
                    iface.span,
                    format!("`{name_text}` implements `{iface_name}`, which is not an interface"),
                ),
                None => self.report_unknown_type(&iface_name, iface.span),
            }
        }

        let mut entity_fields = Vec::new();
        let mut relationships = Vec::new();
        let mut seen = FxHashSet::default();
        for field in fields {
            let field_name = self.text(field.name);
            if !seen.insert(field_name.clone()) {
                self.diagnostics.error(
                    codes::DUPLICATE_FIELD,
                    "duplicate field",
                    field.name.span,
                    format!("field `{name_text}.{field_name}` is declared more than once"),
                );
                continue;
            }
            match self.build_member(&name_text, kind, field) {
                Some(Member::Field(f)) => entity_fields.push(f),
                Some(Member::Relationship(r)) => relationships.push(r),
                None => {}
            }
        }

        tracing::debug!(
            entity = %name_text,
            fields = entity_fields.len(),
            relationships = relationships.len(),
            "built entity"
        );

        Entity {
            name: name_text,
            kind,
            description: description.map(|d| d.value.clone()),
            labels,
            interfaces,
            implementers: Vec::new(),
            unions: Vec::new(),
            fields: entity_fields,
            relationships,
            query,
            mutation,
            plural,
            directives: self.passthrough(directives),
            span,
        }
    }

    fn build_member(
        &mut self,
        owner: &str,
        owner_kind: EntityKind,
        field: &syntax::FieldDefinition,
    ) -> Option<Member> {
        let name = self.text(field.name);
        let ty = self.convert_type(&field.ty);
        let target = ty.name().to_string();
        let relationship = self.find_directive(&field.directives, names::RELATIONSHIP);
        let declared = self.find_directive(&field.directives, names::DECLARE_RELATIONSHIP);

        let Some(kind) = self.kinds.get(&target).copied() else {
            self.report_unknown_type(&target, field.ty.span());
            return None;
        };

        match kind {
            Kind::Scalar | Kind::Enum => {
                if let Some(directive) = relationship.or(declared) {
                    self.diagnostics.error(
                        codes::INVALID_RELATIONSHIP_TARGET,
                        "invalid relationship target",
                        directive.span,
                        format!("`{owner}.{name}` targets `{target}`, which is not an entity"),
                    );
                    return None;
                }
                let field = self.build_field(field, name, ty, kind == Kind::Enum);
                Some(Member::Field(field))
            }
            Kind::Input | Kind::Properties => {
                let (code, message) = if relationship.is_some() {
                    (
                        codes::INVALID_RELATIONSHIP_TARGET,
                        format!("`{owner}.{name}` targets `{target}`, which is not an entity"),
                    )
                } else {
                    (
                        codes::INVALID_FIELD_TYPE,
                        format!("`{target}` cannot be used as the type of `{owner}.{name}`"),
                    )
                };
                self.diagnostics
                    .error(code, "invalid field type", field.ty.span(), message);
                None
            }
            Kind::Entity | Kind::Interface | Kind::Union => match owner_kind {
                EntityKind::Concrete => {
                    if relationship.is_some() {
                        self.build_relationship(field, name, ty)
                            .map(Member::Relationship)
                    } else if let Some(directive) = declared {
                        self.diagnostics.error(
                            codes::INVALID_ARGUMENT,
                            "misplaced directive",
                            directive.span,
                            format!(
                                "@declareRelationship on `{owner}.{name}` is only valid on interface fields"
                            ),
                        );
                        None
                    } else {
                        self.report_missing_relationship(owner, &name, &target, field.span);
                        None
                    }
                }
                EntityKind::Interface => {
                    if let Some(directive) = relationship {
                        self.diagnostics.error(
                            codes::RELATIONSHIP_ON_INTERFACE,
                            "relationship on interface",
                            directive.span,
                            format!(
                                "interface field `{owner}.{name}` must use @declareRelationship instead of @relationship"
                            ),
                        );
                        None
                    } else if declared.is_some() {
                        self.build_declared_relationship(field, name, ty)
                            .map(Member::Relationship)
                    } else {
                        self.report_missing_relationship(owner, &name, &target, field.span);
                        None
                    }
                }
            },
        }
    }

    fn report_missing_relationship(&mut self, owner: &str, field: &str, target: &str, span: Span) {
        self.diagnostics.error(
            codes::MISSING_RELATIONSHIP_DIRECTIVE,
            "missing relationship directive",
            span,
            format!("`{owner}.{field}` references entity `{target}` without a relationship directive"),
        );
    }

    fn build_field(
        &mut self,
        field: &syntax::FieldDefinition,
        name: String,
        ty: TypeRef,
        is_enum: bool,
    ) -> Field {
        let arguments = field
            .arguments
            .iter()
            .map(|arg| {
                let def = self.convert_input_value(arg);
                (def.name.clone(), def)
            })
            .collect();

        Field {
            kind: ValueKind::classify(ty.name(), is_enum),
            name,
            description: field.description.as_ref().map(|d| d.value.clone()),
            ty,
            arguments,
            settable: self.read_or_default::<SettableDirective>(&field.directives),
            filterable: self.read_or_default::<FilterableDirective>(&field.directives),
            selectable: self.read_or_default::<SelectableDirective>(&field.directives),
            sortable: self.read_or_default::<SortableDirective>(&field.directives),
            deprecation: self.read::<Deprecation>(&field.directives).valid(),
            directives: self.passthrough(&field.directives),
            inherited_from: None,
            span: field.span,
        }
    }

    fn build_relationship(
        &mut self,
        field: &syntax::FieldDefinition,
        name: String,
        ty: TypeRef,
    ) -> Option<Relationship> {
        let directive = self.read::<RelationshipDirective>(&field.directives).valid()?;

        if let Some(props) = &directive.properties {
            if self.kinds.get(props) != Some(&Kind::Properties) {
                self.diagnostics.error(
                    codes::INVALID_PROPERTIES_TYPE,
                    "invalid properties type",
                    field.span,
                    format!("`{props}` is not a type annotated with @relationshipProperties"),
                );
                return None;
            }
        }

        let target = RelationshipTarget::Concrete(ty.name().to_string());
        Some(Relationship {
            field_name: name,
            description: field.description.as_ref().map(|d| d.value.clone()),
            ty,
            target,
            edge: Edge::Concrete {
                edge_type: directive.edge_type,
                direction: directive.direction,
                properties: directive.properties,
            },
            aggregate: directive.aggregate,
            nested_operations: NestedOperations::from_list(&directive.nested_operations),
            settable: self.read_or_default::<SettableDirective>(&field.directives),
            filterable: self.read_or_default::<FilterableDirective>(&field.directives),
            selectable: self.read_or_default::<SelectableDirective>(&field.directives),
            deprecation: self.read::<Deprecation>(&field.directives).valid(),
            directives: self.passthrough(&field.directives),
            declared_by: None,
            span: field.span,
        })
    }

    fn build_declared_relationship(
        &mut self,
        field: &syntax::FieldDefinition,
        name: String,
        ty: TypeRef,
    ) -> Option<Relationship> {
        let directive = match self.read::<DeclareRelationshipDirective>(&field.directives) {
            Parsed::Valid(directive) => directive,
            Parsed::Absent => DeclareRelationshipDirective::default(),
            Parsed::Invalid => return None,
        };

        let target = RelationshipTarget::Concrete(ty.name().to_string());
        Some(Relationship {
            field_name: name,
            description: field.description.as_ref().map(|d| d.value.clone()),
            ty,
            target,
            edge: Edge::Declared {
                properties: Vec::new(),
            },
            aggregate: directive.aggregate,
            nested_operations: NestedOperations::from_list(&directive.nested_operations),
            settable: self.read_or_default::<SettableDirective>(&field.directives),
            filterable: self.read_or_default::<FilterableDirective>(&field.directives),
            selectable: self.read_or_default::<SelectableDirective>(&field.directives),
            deprecation: self.read::<Deprecation>(&field.directives).valid(),
            directives: self.passthrough(&field.directives),
            declared_by: None,
            span: field.span,
        })
    }

    // =========================================================================
    // Other type kinds
    // =========================================================================

    fn build_properties(&mut self, obj: &syntax::ObjectTypeDefinition) -> PropertiesType {
        let name = self.text(obj.name);
        let mut fields = Vec::new();

        for field in &obj.fields {
            let field_name = self.text(field.name);
            let ty = self.convert_type(&field.ty);
            match self.kinds.get(ty.name()).copied() {
                None => self.report_unknown_type(ty.name(), field.ty.span()),
                Some(kind @ (Kind::Scalar | Kind::Enum))
                    if !self.has_directive(&field.directives, names::RELATIONSHIP) =>
                {
                    let field = self.build_field(field, field_name, ty, kind == Kind::Enum);
                    fields.push(field);
                }
                Some(_) => self.diagnostics.error(
                    codes::INVALID_PROPERTIES_FIELD,
                    "invalid relationship property",
                    field.span,
                    format!("property `{name}.{field_name}` must be a scalar or enum"),
                ),
            }
        }

        PropertiesType {
            description: obj.description.as_ref().map(|d| d.value.clone()),
            directives: self.passthrough(&obj.directives),
            name,
            fields,
            span: obj.name.span,
        }
    }

    fn build_union(&mut self, union: &syntax::UnionTypeDefinition) -> UnionEntity {
        let name = self.text(union.name);
        let mut members = Vec::new();

        for member in &union.members {
            let member_name = self.text(*member);
            match self.kinds.get(&member_name) {
                Some(Kind::Entity) => members.push(member_name),
                Some(_) => self.diagnostics.error(
                    codes::INVALID_UNION_MEMBER,
                    "invalid union member",
                    member.span,
                    format!("union `{name}` member `{member_name}` is not a concrete entity"),
                ),
                None => self.report_unknown_type(&member_name, member.span),
            }
        }

        UnionEntity {
            description: union.description.as_ref().map(|d| d.value.clone()),
            query: self.read_or_default::<QueryDirective>(&union.directives),
            plural: self
                .read::<PluralDirective>(&union.directives)
                .valid()
                .map(|p| p.value),
            directives: self.passthrough(&union.directives),
            name,
            members,
        }
    }

    fn build_enum(&mut self, def: &syntax::EnumTypeDefinition) -> EnumDef {
        let values = def
            .values
            .iter()
            .map(|value| {
                let mut out = EnumValueDef::new(self.text(value.name));
                out.description = value.description.as_ref().map(|d| d.value.clone());
                out.directives = self.passthrough(&value.directives);
                if let Some(deprecation) = self.read::<Deprecation>(&value.directives).valid() {
                    out.deprecated = true;
                    out.deprecation_reason = deprecation.reason;
                }
                out
            })
            .collect();

        EnumDef {
            name: self.text(def.name),
            description: def.description.as_ref().map(|d| d.value.clone()),
            values,
            directives: self.passthrough(&def.directives),
        }
    }

    fn build_input(&mut self, def: &syntax::InputObjectTypeDefinition) -> InputObjectDef {
        let mut input = InputObjectDef::new(self.text(def.name));
        input.description = def.description.as_ref().map(|d| d.value.clone());
        input.directives = self.passthrough(&def.directives);
        for field in &def.fields {
            let field = self.convert_input_value(field);
            input.add_field(field);
        }
        input
    }

    fn build_directive_definition(
        &mut self,
        def: &syntax::DirectiveDefinition,
    ) -> nodegql_schema::DirectiveDefinition {
        let arguments = def
            .arguments
            .iter()
            .map(|arg| {
                let arg = self.convert_input_value(arg);
                (arg.name.clone(), arg)
            })
            .collect();

        nodegql_schema::DirectiveDefinition {
            name: self.text(def.name),
            description: def.description.as_ref().map(|d| d.value.clone()),
            arguments,
            locations: def
                .locations
                .iter()
                .map(|loc| loc.as_str().to_string())
                .collect(),
            repeatable: def.repeatable,
        }
    }

    // =========================================================================
    // Inheritance flattening
    // =========================================================================

    /// Orders entities so that every interface comes before its implementers.
    fn inheritance_order(&mut self, entities: &IndexMap<String, Entity>) -> Vec<String> {
        fn visit(
            name: &str,
            entities: &IndexMap<String, Entity>,
            visiting: &mut FxHashSet<String>,
            done: &mut FxHashSet<String>,
            order: &mut Vec<String>,
            cycles: &mut Vec<(String, Span)>,
        ) {
            if done.contains(name) {
                return;
            }
            let Some(entity) = entities.get(name) else {
                return;
            };
            if !visiting.insert(name.to_string()) {
                cycles.push((name.to_string(), entity.span));
                return;
            }
            for iface in &entity.interfaces {
                visit(iface, entities, visiting, done, order, cycles);
            }
            visiting.remove(name);
            done.insert(name.to_string());
            order.push(name.to_string());
        }

        let mut visiting = FxHashSet::default();
        let mut done = FxHashSet::default();
        let mut order = Vec::new();
        let mut cycles = Vec::new();
        for name in entities.keys() {
            visit(name, entities, &mut visiting, &mut done, &mut order, &mut cycles);
        }

        for (name, span) in cycles {
            self.diagnostics.error(
                codes::NOT_AN_INTERFACE,
                "cyclic interface implementation",
                span,
                format!("interface `{name}` implements itself"),
            );
        }
        order
    }

    fn flatten(&mut self, entities: &mut IndexMap<String, Entity>) {
        for name in self.inheritance_order(entities) {
            let direct = entities[&name].interfaces.clone();

            let mut transitive: Vec<String> = Vec::new();
            let mut parents = Vec::new();
            for iface_name in &direct {
                let Some(iface) = entities.get(iface_name) else {
                    continue;
                };
                for t in std::iter::once(iface_name).chain(&iface.interfaces) {
                    if *t != name && !transitive.contains(t) {
                        transitive.push(t.clone());
                    }
                }
                parents.push((
                    iface_name.clone(),
                    iface.fields.clone(),
                    iface.relationships.clone(),
                ));
            }

            let Some(entity) = entities.get_mut(&name) else {
                continue;
            };
            for (iface_name, fields, relationships) in parents {
                self.inherit(entity, &iface_name, fields, relationships);
            }
            entity.interfaces = transitive;
        }
    }

    fn inherit(
        &mut self,
        entity: &mut Entity,
        iface: &str,
        fields: Vec<Field>,
        relationships: Vec<Relationship>,
    ) {
        for field in fields {
            if let Some(own) = entity.fields.iter().find(|f| f.name == field.name) {
                if own.inherited_from.is_none() && !is_covariant(&field.ty, &own.ty) {
                    self.diagnostics.error(
                        codes::INCOMPATIBLE_OVERRIDE,
                        "incompatible field override",
                        own.span,
                        format!(
                            "`{}.{}: {}` is not compatible with `{iface}.{}: {}`",
                            entity.name, own.name, own.ty, field.name, field.ty
                        ),
                    );
                }
                continue;
            }
            if let Some(rel) = entity.relationship(&field.name) {
                self.diagnostics.error(
                    codes::INCOMPATIBLE_OVERRIDE,
                    "incompatible field override",
                    rel.span,
                    format!(
                        "`{}.{}` is a relationship but `{iface}.{}` is a scalar field",
                        entity.name, rel.field_name, field.name
                    ),
                );
                continue;
            }
            let inherited_from = field.inherited_from.clone().or_else(|| Some(iface.to_string()));
            entity.fields.push(Field {
                inherited_from,
                ..field
            });
        }

        for rel in relationships {
            let root = rel.declared_by.clone().unwrap_or_else(|| iface.to_string());

            if let Some(own) = entity.field(&rel.field_name) {
                self.diagnostics.error(
                    codes::INCOMPATIBLE_OVERRIDE,
                    "incompatible field override",
                    own.span,
                    format!(
                        "`{}.{}` is a scalar field but `{iface}.{}` is a relationship",
                        entity.name, own.name, rel.field_name
                    ),
                );
                continue;
            }

            let entity_name = entity.name.clone();
            let is_interface = entity.is_interface();
            if let Some(own) = entity
                .relationships
                .iter_mut()
                .find(|r| r.field_name == rel.field_name)
            {
                if own.declared_by.is_none() {
                    own.declared_by = Some(root);
                }
                if own.target.name() != rel.target.name() || own.is_list() != rel.is_list() {
                    self.diagnostics.error(
                        codes::INCOMPATIBLE_OVERRIDE,
                        "incompatible relationship override",
                        own.span,
                        format!(
                            "`{entity_name}.{}: {}` must match `{iface}.{}: {}`",
                            own.field_name, own.ty, rel.field_name, rel.ty
                        ),
                    );
                }
            } else if is_interface {
                entity.relationships.push(Relationship {
                    declared_by: Some(root),
                    ..rel
                });
            } else {
                self.diagnostics.error(
                    codes::MISSING_RELATIONSHIP_IMPLEMENTATION,
                    "missing relationship implementation",
                    entity.span,
                    format!(
                        "`{entity_name}` implements `{iface}` but does not implement relationship `{}` with @relationship",
                        rel.field_name
                    ),
                );
            }
        }
    }

    // =========================================================================
    // Cross-references
    // =========================================================================

    fn resolve_targets(&mut self, graph: &mut EntityGraph) {
        let mut implementers: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for entity in graph.concrete() {
            for iface in &entity.interfaces {
                implementers
                    .entry(iface.clone())
                    .or_default()
                    .push(entity.name.clone());
            }
        }

        let mut memberships: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for union in graph.unions.values() {
            for member in &union.members {
                memberships
                    .entry(member.clone())
                    .or_default()
                    .push(union.name.clone());
            }
        }

        for entity in graph.entities.values_mut() {
            if entity.is_interface() {
                entity.implementers = implementers.remove(&entity.name).unwrap_or_default();
            } else {
                entity.unions = memberships.remove(&entity.name).unwrap_or_default();
            }
        }

        let kinds = &self.kinds;
        let resolve = |name: &str, entities: &IndexMap<String, Entity>| match kinds.get(name) {
            Some(Kind::Interface) => RelationshipTarget::Interface {
                name: name.to_string(),
                implementers: entities
                    .get(name)
                    .map(|e| e.implementers.clone())
                    .unwrap_or_default(),
            },
            Some(Kind::Union) => RelationshipTarget::Union {
                name: name.to_string(),
                members: graph
                    .unions
                    .get(name)
                    .map(|u| u.members.clone())
                    .unwrap_or_default(),
            },
            _ => RelationshipTarget::Concrete(name.to_string()),
        };

        let resolved: Vec<Vec<RelationshipTarget>> = graph
            .entities
            .values()
            .map(|entity| {
                entity
                    .relationships
                    .iter()
                    .map(|rel| resolve(rel.target.name(), &graph.entities))
                    .collect()
            })
            .collect();

        for (entity, targets) in graph.entities.values_mut().zip(resolved) {
            for (rel, target) in entity.relationships.iter_mut().zip(targets) {
                rel.target = target;
            }
        }
    }

    fn check_unused_properties(&mut self, graph: &EntityGraph) {
        let used: FxHashSet<&str> = graph
            .concrete()
            .flat_map(|e| e.relationships.iter())
            .filter_map(Relationship::properties)
            .collect();

        for props in graph.properties.values() {
            if !used.contains(props.name.as_str()) {
                tracing::warn!(properties = %props.name, "relationship properties type is never used");
                self.warnings.warning(
                    codes::UNUSED_PROPERTIES_TYPE,
                    "unused relationship properties",
                    props.span,
                    format!("`{}` is not referenced by any @relationship", props.name),
                );
            }
        }
    }
}

/// Fills the property types of every interface-declared relationship from
/// the concrete relationships implementing it.
fn collect_declared_properties(entities: &mut IndexMap<String, Entity>) {
    let mut properties: FxHashMap<(String, String), Vec<String>> = FxHashMap::default();
    for entity in entities.values().filter(|e| !e.is_interface()) {
        for rel in &entity.relationships {
            if let (Some(root), Some(props)) = (&rel.declared_by, rel.properties()) {
                let entry = properties
                    .entry((root.clone(), rel.field_name.clone()))
                    .or_default();
                if !entry.iter().any(|p| p == props) {
                    entry.push(props.to_string());
                }
            }
        }
    }

    for entity in entities.values_mut().filter(|e| e.is_interface()) {
        for rel in &mut entity.relationships {
            let root = rel.declared_by.clone().unwrap_or_else(|| entity.name.clone());
            if let Edge::Declared { properties: props } = &mut rel.edge {
                *props = properties
                    .get(&(root, rel.field_name.clone()))
                    .cloned()
                    .unwrap_or_default();
            }
        }
    }
}

/// Adds declarations for engine scalars that are used but not declared.
fn register_library_scalars(graph: &mut EntityGraph) {
    let mut used: Vec<String> = Vec::new();
    let field_types = graph
        .entities
        .values()
        .flat_map(|e| e.fields.iter())
        .chain(graph.properties.values().flat_map(|p| p.fields.iter()))
        .map(|f| f.ty.name().to_string());
    let input_types = graph
        .inputs
        .values()
        .flat_map(|i| i.fields.values())
        .map(|f| f.ty.name().to_string());

    for name in field_types.chain(input_types) {
        if LIBRARY_SCALARS.contains(&name.as_str()) && !used.contains(&name) {
            used.push(name);
        }
    }

    for name in used {
        graph
            .scalars
            .entry(name.clone())
            .or_insert_with(|| ScalarDef::new(name));
    }
}

/// Returns true if `implementation` may stand in for `declared`: the same
/// named type, with equal or stricter nullability.
fn is_covariant(declared: &TypeRef, implementation: &TypeRef) -> bool {
    match (declared, implementation) {
        (TypeRef::NonNull(d), TypeRef::NonNull(i)) => is_covariant(d, i),
        (_, TypeRef::NonNull(i)) => is_covariant(declared, i),
        (TypeRef::List(d), TypeRef::List(i)) => is_covariant(d, i),
        (TypeRef::Named(d), TypeRef::Named(i)) => d == i,
        _ => false,
    }
}
