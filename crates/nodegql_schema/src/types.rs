//! Output type definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalars every GraphQL schema provides without declaring them.
pub const BUILTIN_SCALARS: &[&str] = &["Boolean", "Float", "ID", "Int", "String"];

/// Returns true if `name` is a built-in GraphQL scalar.
#[must_use]
pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// A type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDef {
    Scalar(ScalarDef),
    Object(ObjectDef),
    Interface(InterfaceDef),
    Union(UnionDef),
    Enum(EnumDef),
    InputObject(InputObjectDef),
}

impl TypeDef {
    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
        }
    }

    /// Returns a short name for the kind of definition.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Object(_) => "type",
            Self::Interface(_) => "interface",
            Self::Union(_) => "union",
            Self::Enum(_) => "enum",
            Self::InputObject(_) => "input",
        }
    }

    /// Returns true for types that can appear in input positions.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }
}

/// Scalar type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarDef {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<DirectiveUse>,
}

impl ScalarDef {
    /// Creates a new scalar definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            directives: Vec::new(),
        }
    }
}

/// Object type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    pub implements: Vec<String>,
    pub directives: Vec<DirectiveUse>,
}

impl ObjectDef {
    /// Creates a new object definition without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            implements: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.add_field(field);
        self
    }

    /// Adds a field in place.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields.insert(field.name.clone(), field);
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Interface type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    pub implements: Vec<String>,
    pub directives: Vec<DirectiveUse>,
}

impl InterfaceDef {
    /// Creates a new interface definition without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            implements: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// Adds a field in place.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields.insert(field.name.clone(), field);
    }
}

/// Union type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionDef {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
    pub directives: Vec<DirectiveUse>,
}

impl UnionDef {
    /// Creates a new union definition.
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            members,
            directives: Vec::new(),
        }
    }
}

/// Enum type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValueDef>,
    pub directives: Vec<DirectiveUse>,
}

impl EnumDef {
    /// Creates an enum from plain value names.
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(EnumValueDef::new).collect(),
            directives: Vec::new(),
        }
    }
}

/// Enum value definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDef {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: bool,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<DirectiveUse>,
}

impl EnumValueDef {
    /// Creates a new enum value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecated: false,
            deprecation_reason: None,
            directives: Vec::new(),
        }
    }
}

/// Input object type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputObjectDef {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputFieldDef>,
    pub directives: Vec<DirectiveUse>,
}

impl InputObjectDef {
    /// Creates a new input object definition without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            directives: Vec::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: InputFieldDef) -> Self {
        self.add_field(field);
        self
    }

    /// Adds a field in place.
    pub fn add_field(&mut self, field: InputFieldDef) {
        self.fields.insert(field.name.clone(), field);
    }

    /// Returns true if the input has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub arguments: IndexMap<String, InputFieldDef>,
    pub deprecated: bool,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<DirectiveUse>,
}

impl FieldDef {
    /// Creates a new field definition.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            arguments: IndexMap::new(),
            deprecated: false,
            deprecation_reason: None,
            directives: Vec::new(),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        let arg = InputFieldDef::new(name, ty);
        self.arguments.insert(arg.name.clone(), arg);
        self
    }

    /// Adds an argument with a default value.
    #[must_use]
    pub fn argument_with_default(
        mut self,
        name: impl Into<String>,
        ty: TypeRef,
        default: ConstValue,
    ) -> Self {
        let mut arg = InputFieldDef::new(name, ty);
        arg.default_value = Some(default);
        self.arguments.insert(arg.name.clone(), arg);
        self
    }

    /// Marks the field as deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<String>) -> Self {
        self.deprecated = true;
        self.deprecation_reason = reason;
        self
    }

    /// Copies a source field's deprecation, if any.
    #[must_use]
    pub fn deprecated_if(self, deprecation: Option<&Deprecation>) -> Self {
        match deprecation {
            Some(d) => self.deprecated(d.reason.clone()),
            None => self,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Sets the directives applied to the field.
    #[must_use]
    pub fn with_directives(mut self, directives: Vec<DirectiveUse>) -> Self {
        self.directives = directives;
        self
    }
}

/// Input field (or argument) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFieldDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub default_value: Option<ConstValue>,
    pub deprecated: bool,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<DirectiveUse>,
}

impl InputFieldDef {
    /// Creates a new input field definition.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
            deprecated: false,
            deprecation_reason: None,
            directives: Vec::new(),
        }
    }

    /// Marks the field as deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<String>) -> Self {
        self.deprecated = true;
        self.deprecation_reason = reason;
        self
    }

    /// Copies a source field's deprecation, if any.
    #[must_use]
    pub fn deprecated_if(self, deprecation: Option<&Deprecation>) -> Self {
        match deprecation {
            Some(d) => self.deprecated(d.reason.clone()),
            None => self,
        }
    }
}

/// A `@deprecated` marker on a source field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Deprecation {
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// Type references
// =============================================================================

/// Type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// `Name!`
    pub fn required(name: impl Into<String>) -> Self {
        Self::named(name).non_null()
    }

    /// `[Name!]`
    pub fn list_of(name: impl Into<String>) -> Self {
        Self::List(Box::new(Self::required(name)))
    }

    /// `[Name!]!`
    pub fn required_list_of(name: impl Into<String>) -> Self {
        Self::list_of(name).non_null()
    }

    /// Wraps the type in a non-null marker unless it already has one.
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            Self::NonNull(_) => self,
            other => Self::NonNull(Box::new(other)),
        }
    }

    /// Wraps the type in a list.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Strips the outer non-null marker.
    #[must_use]
    pub fn nullable(&self) -> Self {
        match self {
            Self::NonNull(inner) => (**inner).clone(),
            other => other.clone(),
        }
    }

    /// Returns the innermost type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::NonNull(inner) | Self::List(inner) => inner.name(),
        }
    }

    /// Returns true if the outer type is non-null.
    #[must_use]
    pub const fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// Returns true if the type is a list, ignoring the outer non-null marker.
    #[must_use]
    pub fn is_list(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::NonNull(inner) => matches!(**inner, Self::List(_)),
            Self::Named(_) => false,
        }
    }

    /// Returns a copy with the innermost name replaced.
    #[must_use]
    pub fn rename(&self, name: &str) -> Self {
        match self {
            Self::Named(_) => Self::named(name),
            Self::NonNull(inner) => Self::NonNull(Box::new(inner.rename(name))),
            Self::List(inner) => Self::List(Box::new(inner.rename(name))),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

// =============================================================================
// Values and directives
// =============================================================================

/// A constant value in directive arguments and defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    List(Vec<ConstValue>),
    Object(IndexMap<String, ConstValue>),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::String(value) => write_string(f, value),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Enum(value) => f.write_str(value),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04X}", u32::from(c))?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// An applied directive carried through to the output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveUse {
    pub name: String,
    pub arguments: IndexMap<String, ConstValue>,
}

impl DirectiveUse {
    /// Creates a directive application without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: IndexMap::new(),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: ConstValue) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }
}

impl fmt::Display for DirectiveUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("(")?;
            for (i, (name, value)) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}: {value}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Directive definition echoed from the input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, InputFieldDef>,
    pub locations: Vec<String>,
    pub repeatable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        assert_eq!(TypeRef::required_list_of("Actor").to_string(), "[Actor!]!");
        assert_eq!(TypeRef::list_of("Int").to_string(), "[Int!]");
        assert_eq!(TypeRef::named("String").non_null().non_null().to_string(), "String!");
    }

    #[test]
    fn test_type_ref_shape() {
        let ty = TypeRef::required_list_of("Actor");
        assert!(ty.is_list());
        assert!(ty.is_non_null());
        assert_eq!(ty.name(), "Actor");
        assert_eq!(ty.nullable().to_string(), "[Actor!]");
        assert_eq!(ty.rename("Movie").to_string(), "[Movie!]!");
        assert!(!TypeRef::required("ID").is_list());
    }

    #[test]
    fn test_const_value_display() {
        let value = ConstValue::List(vec![
            ConstValue::String("say \"hi\"".into()),
            ConstValue::Enum("IN".into()),
            ConstValue::Float(1.0),
            ConstValue::Null,
        ]);
        assert_eq!(value.to_string(), r#"["say \"hi\"", IN, 1.0, null]"#);
    }

    #[test]
    fn test_directive_use_display() {
        let directive = DirectiveUse::new("customDirectiveField")
            .argument("level", ConstValue::Int(2))
            .argument("tag", ConstValue::String("x".into()));
        assert_eq!(directive.to_string(), r#"@customDirectiveField(level: 2, tag: "x")"#);
        assert_eq!(DirectiveUse::new("shareable").to_string(), "@shareable");
    }
}
