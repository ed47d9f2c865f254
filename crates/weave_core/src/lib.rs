//! Core utilities for the Weave gateway.
//!
//! This crate provides foundational types used throughout weave:
//! - `path`: Query paths from an object to a nested field
//! - `coordinates`: `Type.field` schema coordinates
//! - `diagnostics`: Error reporting

pub mod coordinates;
pub mod diagnostics;
pub mod path;

pub use coordinates::FieldCoordinates;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity, Label};
pub use path::{QueryPath, QueryPathError};
