//! Hydration errors.
//!
//! Every user-facing failure is a value. Components return
//! `Result<_, HydrationError>`; the compiler attaches field coordinates and
//! aggregates failures across the whole schema.

use miette::Diagnostic as _;
use weave_core::{Diagnostic, FieldCoordinates, QueryPath};

/// A reason a single hydration declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum HydrationError {
    // =========================================================================
    // Reference errors
    // =========================================================================
    #[error("service `{service}` does not exist")]
    #[diagnostic(code(weave::hydration::service_not_found))]
    ServiceNotFound { service: String },

    #[error("backing field `{field}` does not exist on service `{service}`")]
    #[diagnostic(code(weave::hydration::backing_field_not_found))]
    BackingFieldNotFound { service: String, field: String },

    #[error("backing field `{backing_field}` has no argument `{argument}`")]
    #[diagnostic(code(weave::hydration::backing_argument_not_found))]
    BackingArgumentNotFound {
        backing_field: String,
        argument: String,
    },

    #[error("source field `{path}` does not exist on `{parent_type}`")]
    #[diagnostic(code(weave::hydration::source_field_not_found))]
    SourceFieldNotFound {
        parent_type: String,
        path: QueryPath,
    },

    #[error("hydrated field has no argument `{argument}`")]
    #[diagnostic(code(weave::hydration::virtual_argument_not_found))]
    VirtualArgumentNotFound { argument: String },

    #[error("condition field `{path}` does not exist on `{parent_type}`")]
    #[diagnostic(code(weave::hydration::condition_field_not_found))]
    ConditionFieldNotFound { parent_type: String, path: String },

    #[error("type `{type_name}` has no @defaultHydration for @idHydrated")]
    #[diagnostic(code(weave::hydration::missing_default_hydration))]
    MissingDefaultHydration { type_name: String },

    #[error("argument `{argument}` has an invalid value `{value}`: {reason}")]
    #[diagnostic(code(weave::hydration::invalid_argument_value))]
    InvalidArgumentValue {
        argument: String,
        value: String,
        reason: String,
    },

    // =========================================================================
    // Type errors
    // =========================================================================
    #[error("argument `{argument}` supplies `{supplied}` but the backing field requires `{required}`")]
    #[diagnostic(code(weave::hydration::incompatible_input_type))]
    IncompatibleInputType {
        argument: String,
        supplied: String,
        required: String,
    },

    #[error("argument `{argument}` cannot build input `{input_type}`: `{supplied_type}` has no field `{input_field}`")]
    #[diagnostic(code(weave::hydration::missing_input_field))]
    MissingInputField {
        argument: String,
        supplied_type: String,
        input_type: String,
        input_field: String,
    },

    #[error("argument `{argument}`: `{supplied_type}.{supplied_field}` is not assignable to `{input_type}.{input_field}`")]
    #[diagnostic(code(weave::hydration::incompatible_field))]
    IncompatibleField {
        argument: String,
        supplied_type: String,
        supplied_field: String,
        input_type: String,
        input_field: String,
    },

    #[error("batch argument `{argument}` must be a single list, found `{required}`")]
    #[diagnostic(code(weave::hydration::invalid_batch_id_shape))]
    InvalidBatchIdShape { argument: String, required: String },

    #[error("static value {value} is not assignable to argument `{argument}` of type `{required}`: {reason}")]
    #[diagnostic(code(weave::hydration::static_value_not_assignable))]
    StaticValueNotAssignable {
        argument: String,
        value: String,
        required: String,
        reason: String,
    },

    // =========================================================================
    // Structural errors
    // =========================================================================
    #[error("backing argument `{argument}` is targeted more than once")]
    #[diagnostic(code(weave::hydration::duplicate_argument))]
    DuplicateArgument { argument: String },

    #[error("batch hydration requires a `$source` argument")]
    #[diagnostic(code(weave::hydration::missing_source_field))]
    MissingSourceField,

    #[error("batch hydration requires exactly one `$source` argument, found {}", .arguments.join(", "))]
    #[diagnostic(code(weave::hydration::multiple_source_fields))]
    MultipleSourceFields { arguments: Vec<String> },

    #[error("required backing argument `{argument}` is not supplied")]
    #[diagnostic(code(weave::hydration::missing_required_backing_argument))]
    MissingRequiredBackingArgument { argument: String },

    #[error("hydrations on one field must be all batched or all unbatched")]
    #[diagnostic(code(weave::hydration::mixed_batch_usage))]
    MixedBatchUsage,

    #[error("hydrations on one field must all be indexed or none")]
    #[diagnostic(code(weave::hydration::mixed_index_usage))]
    MixedIndexUsage,

    #[error("hydrations on one field must all declare a condition or none")]
    #[diagnostic(code(weave::hydration::mixed_condition_usage))]
    MixedConditionUsage,

    #[error("field with multiple hydrations must output a union, found `{declared}`")]
    #[diagnostic(code(weave::hydration::polymorphic_must_output_union))]
    PolymorphicMustOutputUnion { declared: String },

    #[error("backing field returns `{actual}` which is not assignable to `{declared}`")]
    #[diagnostic(code(weave::hydration::incompatible_output_type))]
    IncompatibleOutputType { actual: String, declared: String },

    #[error("hydrated field must be nullable, found `{declared}`")]
    #[diagnostic(code(weave::hydration::must_be_nullable))]
    MustBeNullable { declared: String },

    #[error("argument `{argument}` takes a single value but `{source_path}` is a list; the hydrated field must be a list")]
    #[diagnostic(code(weave::hydration::cannot_squeeze_source_list))]
    CannotSqueezeSourceList {
        argument: String,
        source_path: QueryPath,
    },

    #[error("only one list `$source` argument may fan out into a single-value argument, found {}", .arguments.join(", "))]
    #[diagnostic(code(weave::hydration::multiple_fan_out_arguments))]
    MultipleFanOutArguments { arguments: Vec<String> },

    // =========================================================================
    // Condition errors
    // =========================================================================
    #[error("condition field `{path}` has type `{field_type}`; expected String, Int, Long or ID")]
    #[diagnostic(code(weave::hydration::unsupported_condition_field_type))]
    UnsupportedConditionFieldType { path: QueryPath, field_type: String },

    #[error("condition pattern `{pattern}` is not a valid regular expression: {reason}")]
    #[diagnostic(code(weave::hydration::invalid_regex))]
    InvalidRegex { pattern: String, reason: String },

    #[error("condition value {value} cannot be compared with `{path}` of type `{field_type}`")]
    #[diagnostic(code(weave::hydration::incompatible_value))]
    IncompatibleValue {
        path: QueryPath,
        field_type: String,
        value: String,
    },

    // =========================================================================
    // Match-strategy errors
    // =========================================================================
    #[error("batch hydration must declare `identifiedBy`, `inputIdentifiedBy` or `indexed`")]
    #[diagnostic(code(weave::hydration::missing_identified_by))]
    MissingIdentifiedBy,

    #[error("source id `{source_id}` must extend the `$source` argument path `{source_field}`")]
    #[diagnostic(code(weave::hydration::invalid_source_id))]
    InvalidSourceId {
        source_id: String,
        source_field: QueryPath,
    },
}

impl HydrationError {
    /// The stable diagnostic code, e.g. `weave::hydration::invalid_regex`.
    pub fn code_str(&self) -> String {
        self.code().map(|code| code.to_string()).unwrap_or_default()
    }
}

/// A hydration error located at a schema field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("invalid hydration on `{coordinates}`: {error}")]
#[diagnostic(code(weave::hydration::invalid_field))]
pub struct FieldHydrationError {
    pub coordinates: FieldCoordinates,
    pub error: HydrationError,
}

impl FieldHydrationError {
    pub fn new(coordinates: FieldCoordinates, error: HydrationError) -> Self {
        Self { coordinates, error }
    }

    /// Converts into a diagnostic for a [`weave_core::DiagnosticBag`].
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.error.code_str(), "invalid hydration")
            .with_message(self.error.to_string())
            .at(self.coordinates.clone(), "declared here")
    }
}

/// The schema build failed; carries every rejected field.
#[derive(Debug, Clone, thiserror::Error, miette::Diagnostic)]
#[error("hydration compilation failed with {} error(s)", .errors.len())]
#[diagnostic(code(weave::hydration::compile_failed))]
pub struct CompileError {
    #[related]
    pub errors: Vec<FieldHydrationError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_str() {
        let error = HydrationError::InvalidRegex {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(error.code_str(), "weave::hydration::invalid_regex");
    }

    #[test]
    fn test_field_error_to_diagnostic() {
        let error = FieldHydrationError::new(
            FieldCoordinates::new("Issue", "widget"),
            HydrationError::MustBeNullable {
                declared: "Widget!".to_string(),
            },
        );
        let diagnostic = error.to_diagnostic();

        assert_eq!(diagnostic.code, "weave::hydration::must_be_nullable");
        assert_eq!(
            diagnostic.message.as_deref(),
            Some("hydrated field must be nullable, found `Widget!`")
        );
        assert_eq!(
            error.to_string(),
            "invalid hydration on `Issue.widget`: hydrated field must be nullable, found `Widget!`"
        );
    }

    #[test]
    fn test_multiple_source_fields_message() {
        let error = HydrationError::MultipleSourceFields {
            arguments: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "batch hydration requires exactly one `$source` argument, found a, b"
        );
    }
}
