//! Abstract Syntax Tree for type-definition documents.
//!
//! This is the input contract of the schema engine: the parser produces it,
//! the entity model builder consumes it. Names are interned [`Text`] values.

use crate::token::DirectiveLocation;
use nodegql_core::{Span, Text};

/// A complete document.
#[derive(Debug, Clone)]
pub struct Document {
    pub definitions: Vec<Definition>,
    pub span: Span,
}

impl Document {
    /// Iterates over the type definitions of the document.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Type(ty) => Some(ty),
            Definition::Directive(_) => None,
        })
    }

    /// Iterates over the directive definitions of the document.
    pub fn directive_definitions(&self) -> impl Iterator<Item = &DirectiveDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Directive(d) => Some(d),
            Definition::Type(_) => None,
        })
    }
}

/// A top-level definition.
#[derive(Debug, Clone)]
pub enum Definition {
    Type(TypeDefinition),
    Directive(DirectiveDefinition),
}

/// Type definitions.
#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Object(ObjectTypeDefinition),
    Interface(InterfaceTypeDefinition),
    Union(UnionTypeDefinition),
    Enum(EnumTypeDefinition),
    Input(InputObjectTypeDefinition),
    Scalar(ScalarTypeDefinition),
}

impl TypeDefinition {
    /// Returns the name of the defined type.
    #[must_use]
    pub fn name(&self) -> Name {
        match self {
            Self::Object(def) => def.name,
            Self::Interface(def) => def.name,
            Self::Union(def) => def.name,
            Self::Enum(def) => def.name,
            Self::Input(def) => def.name,
            Self::Scalar(def) => def.name,
        }
    }

    /// Returns the directives applied to the type.
    #[must_use]
    pub fn directives(&self) -> &[Directive] {
        match self {
            Self::Object(def) => &def.directives,
            Self::Interface(def) => &def.directives,
            Self::Union(def) => &def.directives,
            Self::Enum(def) => &def.directives,
            Self::Input(def) => &def.directives,
            Self::Scalar(def) => &def.directives,
        }
    }

    /// Returns the span of the definition.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Object(def) => def.span,
            Self::Interface(def) => def.span,
            Self::Union(def) => def.span,
            Self::Enum(def) => def.span,
            Self::Input(def) => def.span,
            Self::Scalar(def) => def.span,
        }
    }
}

/// Object type definition.
#[derive(Debug, Clone)]
pub struct ObjectTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub implements: Vec<Name>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition>,
    pub span: Span,
}

/// Interface type definition.
#[derive(Debug, Clone)]
pub struct InterfaceTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub implements: Vec<Name>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition>,
    pub span: Span,
}

/// Union type definition.
#[derive(Debug, Clone)]
pub struct UnionTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub members: Vec<Name>,
    pub span: Span,
}

/// Enum type definition.
#[derive(Debug, Clone)]
pub struct EnumTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub values: Vec<EnumValueDefinition>,
    pub span: Span,
}

/// Enum value definition.
#[derive(Debug, Clone)]
pub struct EnumValueDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Input object type definition.
#[derive(Debug, Clone)]
pub struct InputObjectTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub fields: Vec<InputValueDefinition>,
    pub span: Span,
}

/// Scalar type definition.
#[derive(Debug, Clone)]
pub struct ScalarTypeDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Field definition.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition>,
    pub ty: Type,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Input value definition (arguments, input fields).
#[derive(Debug, Clone)]
pub struct InputValueDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub span: Span,
}

/// Type reference.
#[derive(Debug, Clone)]
pub enum Type {
    /// Named type: `Movie`
    Named(NamedType),
    /// List type: `[Movie]`
    List(Box<Type>, Span),
    /// Non-null type: `Movie!`
    NonNull(Box<Type>, Span),
}

impl Type {
    /// Returns the innermost named type.
    #[must_use]
    pub fn named(&self) -> &NamedType {
        match self {
            Self::Named(named) => named,
            Self::List(inner, _) | Self::NonNull(inner, _) => inner.named(),
        }
    }

    /// Returns the span of the whole type reference.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Named(named) => named.span,
            Self::List(_, span) | Self::NonNull(_, span) => *span,
        }
    }
}

/// Named type.
#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: Text,
    pub span: Span,
}

/// Directive definition.
#[derive(Debug, Clone)]
pub struct DirectiveDefinition {
    pub description: Option<Description>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition>,
    pub repeatable: bool,
    pub locations: Vec<DirectiveLocation>,
    pub span: Span,
}

/// Directive usage.
#[derive(Debug, Clone)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

/// Argument.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Name,
    pub value: Value,
    pub span: Span,
}

/// Constant value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64, Span),
    Float(f64, Span),
    String(String, Span),
    Boolean(bool, Span),
    Null(Span),
    Enum(Name),
    List(Vec<Value>, Span),
    Object(Vec<(Name, Value)>, Span),
}

impl Value {
    /// Returns the span of the value.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Int(_, span)
            | Self::Float(_, span)
            | Self::String(_, span)
            | Self::Boolean(_, span)
            | Self::Null(span)
            | Self::List(_, span)
            | Self::Object(_, span) => *span,
            Self::Enum(name) => name.span,
        }
    }
}

/// Name with span.
#[derive(Debug, Clone, Copy)]
pub struct Name {
    pub value: Text,
    pub span: Span,
}

impl Name {
    pub fn new(value: Text, span: Span) -> Self {
        Self { value, span }
    }
}

/// Description (documentation string), already unescaped.
#[derive(Debug, Clone)]
pub struct Description {
    pub value: String,
    pub span: Span,
}

impl Description {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }
}
