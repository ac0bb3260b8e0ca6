//! Diagnostic reporting for nodegql.
//!
//! Every stage that can fail on user input collects problems into a
//! [`DiagnosticBag`] instead of stopping at the first one, so a single run
//! reports everything that is wrong with a type-definition document.

use crate::span::Span;
use std::fmt;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// An error that aborts the schema build.
    Error,
    /// A warning that doesn't abort the build.
    Warning,
}

/// A label attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// The span this label points to.
    pub span: Span,
    /// The label message.
    pub message: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Stable error code, see [`codes`].
    pub code: &'static str,
    /// Short title.
    pub title: String,
    /// Detailed message.
    pub message: Option<String>,
    /// Labels pointing to source locations.
    pub labels: Vec<Label>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: &'static str, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            title: title.into(),
            message: None,
            labels: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: &'static str, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            ..Self::error(code, title)
        }
    }

    /// Adds a message to the diagnostic.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a labelled span.
    #[must_use]
    pub fn with_span(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    /// Returns the primary span, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.first().map(|l| l.span)
    }

    /// Returns true for error-severity diagnostics.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.title)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// A collection of diagnostics.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error diagnostic with a single labelled span.
    pub fn error(
        &mut self,
        code: &'static str,
        title: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) {
        let message = message.into();
        self.add(
            Diagnostic::error(code, title)
                .with_span(span, message.clone())
                .with_message(message),
        );
    }

    /// Adds a warning diagnostic with a single labelled span.
    pub fn warning(
        &mut self,
        code: &'static str,
        title: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) {
        let message = message.into();
        self.add(
            Diagnostic::warning(code, title)
                .with_span(span, message.clone())
                .with_message(message),
        );
    }

    /// Moves every diagnostic of `other` into this bag.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Returns an iterator over warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Returns true if the bag holds a diagnostic with the given code.
    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Orders diagnostics by source position so reports read top to bottom.
    pub fn sort(&mut self) {
        self.diagnostics
            .sort_by_key(|d| (d.primary_span().unwrap_or_default(), d.code));
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

/// Diagnostic codes.
pub mod codes {
    // Syntax
    pub const UNEXPECTED_TOKEN: &str = "E0001";
    pub const UNEXPECTED_EOF: &str = "E0002";
    pub const INVALID_SYNTAX: &str = "E0003";

    // Entity model
    pub const UNDEFINED_TYPE: &str = "E0101";
    pub const DUPLICATE_TYPE: &str = "E0102";
    pub const MISSING_ARGUMENT: &str = "E0103";
    pub const INVALID_ARGUMENT: &str = "E0104";
    pub const MISSING_RELATIONSHIP_IMPLEMENTATION: &str = "E0105";
    pub const INCOMPATIBLE_OVERRIDE: &str = "E0106";
    pub const MISSING_RELATIONSHIP_DIRECTIVE: &str = "E0107";
    pub const INVALID_RELATIONSHIP_TARGET: &str = "E0108";
    pub const INVALID_UNION_MEMBER: &str = "E0109";
    pub const INVALID_PROPERTIES_TYPE: &str = "E0110";
    pub const INVALID_PROPERTIES_FIELD: &str = "E0111";
    pub const RELATIONSHIP_ON_INTERFACE: &str = "E0112";
    pub const RESERVED_TYPE_NAME: &str = "E0113";
    pub const NOT_AN_INTERFACE: &str = "E0114";
    pub const DUPLICATE_FIELD: &str = "E0115";
    pub const INVALID_FIELD_TYPE: &str = "E0116";

    // Warnings
    pub const UNUSED_PROPERTIES_TYPE: &str = "W0101";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bag() {
        let mut bag = DiagnosticBag::new();
        bag.error(codes::UNDEFINED_TYPE, "unknown type", Span::new(0, 10), "details");
        bag.warning(codes::UNUSED_PROPERTIES_TYPE, "unused", Span::new(2, 3), "x");

        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.warnings().count(), 1);
        assert!(bag.contains_code("E0101"));
    }

    #[test]
    fn test_sort_by_position() {
        let mut bag = DiagnosticBag::new();
        bag.error(codes::DUPLICATE_TYPE, "b", Span::new(40, 45), "b");
        bag.error(codes::UNDEFINED_TYPE, "a", Span::new(3, 8), "a");
        bag.sort();

        let titles: Vec<_> = bag.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::error(codes::MISSING_ARGUMENT, "missing argument")
            .with_message("`direction` is required");
        assert_eq!(
            diag.to_string(),
            "[E0103] missing argument: `direction` is required"
        );
        assert!(diag.primary_span().is_none());
    }
}
