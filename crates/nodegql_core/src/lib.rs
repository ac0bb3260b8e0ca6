//! Core utilities for nodegql.
//!
//! This crate provides foundational types shared by every pipeline stage:
//! - `span`: Byte-offset source spans
//! - `text`: String interning for the parsed AST
//! - `diagnostics`: Collected error reporting with stable codes

pub mod diagnostics;
pub mod span;
pub mod text;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity, Label};
pub use span::Span;
pub use text::{Interner, Text};
