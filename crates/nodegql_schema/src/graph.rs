//! The output type graph.

use crate::types::{
    is_builtin_scalar, DirectiveDefinition, InputObjectDef, ObjectDef, TypeDef, TypeRef,
};
use indexmap::IndexMap;
use thiserror::Error;

/// Internal invariant violations found while building the output graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaBuildError {
    #[error("naming collision: type `{name}` was generated twice with different shapes")]
    NamingCollision { name: String },

    #[error("`{owner}` references undefined type `{target}`")]
    DanglingReference { owner: String, target: String },

    #[error("type `{name}` has no fields")]
    EmptyType { name: String },
}

/// Names of the root operation types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootTypes {
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

/// The complete output type graph of one schema build.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    types: IndexMap<String, TypeDef>,
    directives: IndexMap<String, DirectiveDefinition>,
    pub roots: RootTypes,
}

impl TypeGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a type owned by a single generator.
    ///
    /// Fails if any type with the same name already exists.
    pub fn insert(&mut self, def: TypeDef) -> Result<(), SchemaBuildError> {
        let name = def.name().to_string();
        if self.types.contains_key(&name) {
            return Err(SchemaBuildError::NamingCollision { name });
        }
        self.types.insert(name, def);
        Ok(())
    }

    /// Inserts a type that several generators may produce.
    ///
    /// Re-inserting an identical definition is a no-op; a different
    /// definition under the same name is a collision.
    pub fn insert_shared(&mut self, def: TypeDef) -> Result<(), SchemaBuildError> {
        match self.types.get(def.name()) {
            Some(existing) if *existing == def => Ok(()),
            Some(_) => Err(SchemaBuildError::NamingCollision {
                name: def.name().to_string(),
            }),
            None => {
                self.types.insert(def.name().to_string(), def);
                Ok(())
            }
        }
    }

    /// Adds a directive definition.
    pub fn add_directive(&mut self, directive: DirectiveDefinition) {
        self.directives.insert(directive.name.clone(), directive);
    }

    /// Gets a type by name.
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Returns true if a type with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Gets an object type by name.
    pub fn object(&self, name: &str) -> Option<&ObjectDef> {
        match self.types.get(name) {
            Some(TypeDef::Object(def)) => Some(def),
            _ => None,
        }
    }

    /// Gets a mutable object type by name.
    pub fn object_mut(&mut self, name: &str) -> Option<&mut ObjectDef> {
        match self.types.get_mut(name) {
            Some(TypeDef::Object(def)) => Some(def),
            _ => None,
        }
    }

    /// Gets an input object type by name.
    pub fn input(&self, name: &str) -> Option<&InputObjectDef> {
        match self.types.get(name) {
            Some(TypeDef::InputObject(def)) => Some(def),
            _ => None,
        }
    }

    /// Gets a mutable input object type by name.
    pub fn input_mut(&mut self, name: &str) -> Option<&mut InputObjectDef> {
        match self.types.get_mut(name) {
            Some(TypeDef::InputObject(def)) => Some(def),
            _ => None,
        }
    }

    /// Gets a mutable type by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeDef> {
        self.types.get_mut(name)
    }

    /// Iterates over all types in insertion order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Iterates over all directive definitions.
    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDefinition> {
        self.directives.values()
    }

    /// Returns the number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the graph has no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Checks that every reference resolves and no composite type is empty.
    pub fn validate(&self) -> Result<(), SchemaBuildError> {
        for def in self.types.values() {
            let owner = def.name();
            match def {
                TypeDef::Scalar(_) => {}
                TypeDef::Object(obj) => {
                    check_not_empty(owner, obj.fields.is_empty())?;
                    for field in obj.fields.values() {
                        self.check_ref(owner, &field.ty)?;
                        for arg in field.arguments.values() {
                            self.check_ref(owner, &arg.ty)?;
                        }
                    }
                    for iface in &obj.implements {
                        self.check_name(owner, iface)?;
                    }
                }
                TypeDef::Interface(iface) => {
                    check_not_empty(owner, iface.fields.is_empty())?;
                    for field in iface.fields.values() {
                        self.check_ref(owner, &field.ty)?;
                        for arg in field.arguments.values() {
                            self.check_ref(owner, &arg.ty)?;
                        }
                    }
                }
                TypeDef::Union(union) => {
                    check_not_empty(owner, union.members.is_empty())?;
                    for member in &union.members {
                        self.check_name(owner, member)?;
                    }
                }
                TypeDef::Enum(def) => check_not_empty(owner, def.values.is_empty())?,
                TypeDef::InputObject(input) => {
                    check_not_empty(owner, input.fields.is_empty())?;
                    for field in input.fields.values() {
                        self.check_ref(owner, &field.ty)?;
                    }
                }
            }
        }

        for directive in self.directives.values() {
            for arg in directive.arguments.values() {
                self.check_ref(&directive.name, &arg.ty)?;
            }
        }

        let roots = [
            &self.roots.query,
            &self.roots.mutation,
            &self.roots.subscription,
        ];
        for root in roots.into_iter().flatten() {
            self.check_name("schema", root)?;
        }

        Ok(())
    }

    fn check_ref(&self, owner: &str, ty: &TypeRef) -> Result<(), SchemaBuildError> {
        self.check_name(owner, ty.name())
    }

    fn check_name(&self, owner: &str, name: &str) -> Result<(), SchemaBuildError> {
        if is_builtin_scalar(name) || self.types.contains_key(name) {
            Ok(())
        } else {
            Err(SchemaBuildError::DanglingReference {
                owner: owner.to_string(),
                target: name.to_string(),
            })
        }
    }
}

fn check_not_empty(name: &str, empty: bool) -> Result<(), SchemaBuildError> {
    if empty {
        Err(SchemaBuildError::EmptyType {
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDef, InputFieldDef, UnionDef};

    fn movie() -> TypeDef {
        TypeDef::Object(
            ObjectDef::new("Movie").field(FieldDef::new("title", TypeRef::named("String"))),
        )
    }

    #[test]
    fn test_insert_collision() {
        let mut graph = TypeGraph::new();
        graph.insert(movie()).unwrap();
        let err = graph.insert(movie()).unwrap_err();
        assert_eq!(
            err,
            SchemaBuildError::NamingCollision {
                name: "Movie".into()
            }
        );
    }

    #[test]
    fn test_insert_shared_dedupes_identical() {
        let mut graph = TypeGraph::new();
        graph.insert_shared(movie()).unwrap();
        graph.insert_shared(movie()).unwrap();
        assert_eq!(graph.len(), 1);

        let other = TypeDef::Object(
            ObjectDef::new("Movie").field(FieldDef::new("id", TypeRef::required("ID"))),
        );
        assert!(graph.insert_shared(other).is_err());
    }

    #[test]
    fn test_validate_dangling_reference() {
        let mut graph = TypeGraph::new();
        graph
            .insert(TypeDef::InputObject(
                InputObjectDef::new("MovieWhere")
                    .field(InputFieldDef::new("actors_SOME", TypeRef::named("ActorWhere"))),
            ))
            .unwrap();

        assert_eq!(
            graph.validate(),
            Err(SchemaBuildError::DanglingReference {
                owner: "MovieWhere".into(),
                target: "ActorWhere".into(),
            })
        );
    }

    #[test]
    fn test_validate_empty_type() {
        let mut graph = TypeGraph::new();
        graph
            .insert(TypeDef::Union(UnionDef::new("Search", Vec::new())))
            .unwrap();
        assert_eq!(
            graph.validate(),
            Err(SchemaBuildError::EmptyType {
                name: "Search".into()
            })
        );
    }

    #[test]
    fn test_validate_root_reference() {
        let mut graph = TypeGraph::new();
        graph.insert(movie()).unwrap();
        graph.roots.query = Some("Query".into());
        assert!(graph.validate().is_err());
        assert!(graph.object_mut("Movie").is_some());
        assert!(graph.input("Movie").is_none());
    }
}
