//! Diagnostic reporting for the Weave gateway.

use crate::coordinates::FieldCoordinates;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagnosticSeverity {
    /// An error that fails the schema build.
    Error,
    /// A warning that doesn't fail the schema build.
    Warning,
}

/// A label attached to a diagnostic, pointing at a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Label {
    /// The field this label points to.
    pub coordinates: FieldCoordinates,
    /// The label message.
    pub message: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(coordinates: FieldCoordinates, message: impl Into<String>) -> Self {
        Self {
            coordinates,
            message: message.into(),
        }
    }
}

/// A diagnostic message.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Diagnostic code.
    pub code: String,
    /// Short title.
    pub title: String,
    /// Detailed message.
    pub message: Option<String>,
    /// Labels pointing to schema fields.
    pub labels: Vec<Label>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code: code.into(),
            title: title.into(),
            message: None,
            labels: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code: code.into(),
            title: title.into(),
            message: None,
            labels: Vec::new(),
        }
    }

    /// Adds a message to the diagnostic.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a primary label at a field.
    #[must_use]
    pub fn at(mut self, coordinates: FieldCoordinates, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(coordinates, message));
        self
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

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns an iterator over warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
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

/// Warning codes emitted outside of hard validation failures.
pub mod codes {
    pub const IGNORED_BATCH_SIZE: &str = "W0001";
    pub const IGNORED_INDEXED: &str = "W0002";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_bag() {
        let coords = FieldCoordinates::new("Issue", "owner");
        let mut bag = DiagnosticBag::new();
        assert!(bag.is_empty());
        bag.add(Diagnostic::error("E001", "test error").at(coords.clone(), "details"));
        bag.add(Diagnostic::warning(codes::IGNORED_BATCH_SIZE, "ignored").at(coords, "details"));

        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
        assert_eq!(bag.warnings().count(), 1);
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_warnings_only() {
        let mut bag = DiagnosticBag::new();
        bag.add(Diagnostic::warning(codes::IGNORED_INDEXED, "ignored"));
        assert!(!bag.has_errors());
        assert_eq!(bag.error_count(), 0);
    }

    #[test]
    fn test_diagnostic_creation() {
        let coords = FieldCoordinates::new("Issue", "owner");
        let diag = Diagnostic::error("E001", "Test")
            .with_message("Details")
            .at(coords.clone(), "here");

        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.message.as_deref(), Some("Details"));
        assert_eq!(diag.labels, vec![Label::new(coords, "here")]);
    }
}
