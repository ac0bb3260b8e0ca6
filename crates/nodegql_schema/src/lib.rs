//! Output schema layer for nodegql.
//!
//! This crate provides:
//! - `types`: Type definitions, type references and constant values
//! - `graph`: The output type graph with collision and reference checks
//! - `emit`: Deterministic SDL serialization

pub mod emit;
pub mod graph;
pub mod types;

pub use emit::emit;
pub use graph::{RootTypes, SchemaBuildError, TypeGraph};
pub use types::*;
