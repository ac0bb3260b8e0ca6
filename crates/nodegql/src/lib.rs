//! GraphQL schema augmentation for graph databases.
//!
//! Takes type definitions annotated with graph directives and produces the
//! complete client-facing schema: filter and sort inputs, nested mutation
//! inputs, connections, aggregations, subscription events and the root
//! operation types.
//!
//! ```
//! use nodegql::{build_schema, SchemaConfig};
//!
//! let schema = build_schema(
//!     r#"
//!     type Movie {
//!         title: String!
//!         actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN)
//!     }
//!     type Actor { name: String! }
//!     "#,
//!     &SchemaConfig::default(),
//! )
//! .unwrap();
//!
//! assert!(schema.sdl.contains("input MovieWhere {"));
//! assert!(schema.operations.field("createMovies").is_some());
//! ```
//!
//! The stages are also available on their own:
//! - [`syntax`]: parser for the type-definition language
//! - [`model`]: directive validation and the entity graph
//! - [`augment`]: derived type generation and root operation assembly
//! - [`schema`]: the output type graph and SDL emitter

pub mod cache;
pub mod config;
pub mod error;

pub use cache::SchemaCache;
pub use config::SchemaConfig;
pub use error::BuildError;

pub use nodegql_augment as augment;
pub use nodegql_model as model;
pub use nodegql_schema as schema;
pub use nodegql_syntax as syntax;

pub use nodegql_augment::{OperationKind, RootField, RootOperations};
pub use nodegql_core::diagnostics::codes;
pub use nodegql_core::{Diagnostic, DiagnosticBag, DiagnosticSeverity};
pub use nodegql_schema::TypeGraph;

use nodegql_core::Interner;

/// The result of one schema build.
#[derive(Debug, Clone)]
pub struct BuiltSchema {
    /// Sorted SDL of the complete schema.
    pub sdl: String,
    pub graph: TypeGraph,
    /// Root fields, serializable as the resolver-binding manifest.
    pub operations: RootOperations,
    /// Warnings raised while validating the type definitions.
    pub warnings: DiagnosticBag,
}

/// Builds the complete schema for `type_defs`.
///
/// # Errors
///
/// Returns [`BuildError::Parse`] or [`BuildError::Validation`] with every
/// problem found in the input, or [`BuildError::Schema`] if augmentation
/// produced an inconsistent graph.
pub fn build_schema(type_defs: &str, config: &SchemaConfig) -> Result<BuiltSchema, BuildError> {
    let interner = Interner::new();
    let parsed = nodegql_syntax::parse(type_defs, &interner);
    if parsed.diagnostics.has_errors() {
        return Err(BuildError::Parse(parsed.diagnostics));
    }

    let entities = nodegql_model::build_entity_model(&parsed.document, &interner)?;
    let augmented = nodegql_augment::augment(&entities, &config.augment_options())?;
    let operations = nodegql_augment::assemble(&augmented);
    let graph = nodegql_augment::link(augmented, &operations)?;
    let sdl = nodegql_schema::emit(&graph);

    tracing::info!(
        types = graph.len(),
        query = operations.query.len(),
        mutation = operations.mutation.len(),
        subscription = operations.subscription.as_ref().map_or(0, Vec::len),
        "schema built"
    );

    Ok(BuiltSchema {
        sdl,
        graph,
        operations,
        warnings: entities.warnings,
    })
}

/// Builds several independent schemas.
///
/// Each build runs in isolation; with the `parallel` feature they run on
/// the rayon thread pool.
pub fn build_schemas(
    documents: &[&str],
    config: &SchemaConfig,
) -> Vec<Result<BuiltSchema, BuildError>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        documents
            .par_iter()
            .map(|type_defs| build_schema(type_defs, config))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        documents
            .iter()
            .map(|type_defs| build_schema(type_defs, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_minimal_schema() {
        let schema = build_schema("type Movie { title: String }", &SchemaConfig::default())
            .unwrap();
        assert_eq!(schema.graph.roots.query.as_deref(), Some("Query"));
        assert!(schema.sdl.starts_with("schema {\n  query: Query\n  mutation: Mutation\n}"));
        assert!(schema.warnings.is_empty());
    }

    #[test]
    fn test_parse_errors_are_reported() {
        let err = build_schema("type Movie {", &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, BuildError::Parse(_)));
        assert!(err.diagnostics().unwrap().has_errors());
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = build_schema(
            "type Movie { actor: Actor }\ntype Actor { name: String }",
            &SchemaConfig::default(),
        )
        .unwrap_err();
        let diagnostics = err.diagnostics().unwrap();
        assert!(diagnostics.contains_code(codes::MISSING_RELATIONSHIP_DIRECTIVE));
    }

    #[test]
    fn test_build_schemas() {
        let results = build_schemas(
            &["type Movie { title: String }", "type Movie {"],
            &SchemaConfig::default(),
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
