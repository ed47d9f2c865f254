//! Hydration annotations.
//!
//! These records mirror the directives the schema-merging layer attaches to
//! the unified schema:
//! - `@hydrated` on a field (repeatable, one per backing field)
//! - `@defaultHydration` on a type
//! - `@idHydrated` on a field whose type carries `@defaultHydration`

use crate::value::Value;
use serde::{Deserialize, Serialize};

// =============================================================================
// @hydrated directive
// =============================================================================

/// One `{name, value}` entry of `@hydrated(arguments: [...])`.
///
/// `value` is `"$source.<path>"`, `"$argument.<name>"`, `"$argument.*"` or a
/// literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedArgument {
    pub name: String,
    pub value: Value,
}

/// One `{sourceId, resultId}` entry of `inputIdentifiedBy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputIdentifiedBy {
    pub source_id: String,
    pub result_id: String,
}

/// Arguments for `@hydrated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedDirective {
    /// Service owning the backing field.
    pub service: String,

    /// Dotted path to the backing field from the service's query root.
    pub field: String,

    #[serde(default)]
    pub arguments: Vec<HydratedArgument>,

    /// Result field used to correlate batch results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_by: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_identified_by: Vec<InputIdentifiedBy>,

    /// Correlate batch results by list position.
    #[serde(default)]
    pub indexed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,

    /// Timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<ConditionDirective>,
}

impl HydratedDirective {
    /// Creates a hydration of `field` on `service` with no arguments.
    pub fn new(service: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            field: field.into(),
            arguments: Vec::new(),
            identified_by: None,
            input_identified_by: Vec::new(),
            indexed: false,
            batch_size: None,
            timeout: None,
            when: None,
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.push(HydratedArgument {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Sets the result field used for batch correlation.
    #[must_use]
    pub fn identified_by(mut self, result_id: impl Into<String>) -> Self {
        self.identified_by = Some(result_id.into());
        self
    }

    /// Adds a multi-identifier correlation pair.
    #[must_use]
    pub fn with_input_identified_by(
        mut self,
        source_id: impl Into<String>,
        result_id: impl Into<String>,
    ) -> Self {
        self.input_identified_by.push(InputIdentifiedBy {
            source_id: source_id.into(),
            result_id: result_id.into(),
        });
        self
    }

    /// Correlates batch results by index.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Sets the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Sets the timeout in milliseconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the condition.
    #[must_use]
    pub fn when(mut self, condition: ConditionDirective) -> Self {
        self.when = Some(condition);
        self
    }
}

// =============================================================================
// Conditions
// =============================================================================

/// `{result: {sourceField, predicate}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDirective {
    pub result: ResultConditionDirective,
}

/// Predicate over a field of the object being hydrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultConditionDirective {
    pub source_field: String,
    pub predicate: PredicateDirective,
}

/// The predicate itself. Exactly one kind is set, so JSON such as
/// `{"startsWith": "w-"}` is accepted and `{}` is rejected when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PredicateDirective {
    Equals(Value),
    StartsWith(String),
    Matches(String),
}

impl ConditionDirective {
    fn new(source_field: impl Into<String>, predicate: PredicateDirective) -> Self {
        Self {
            result: ResultConditionDirective {
                source_field: source_field.into(),
                predicate,
            },
        }
    }

    /// `sourceField == value`.
    pub fn equals(source_field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(source_field, PredicateDirective::Equals(value.into()))
    }

    /// `sourceField` starts with `prefix`.
    pub fn starts_with(source_field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(source_field, PredicateDirective::StartsWith(prefix.into()))
    }

    /// `sourceField` matches the regular expression `pattern`.
    pub fn matches(source_field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(source_field, PredicateDirective::Matches(pattern.into()))
    }
}

// =============================================================================
// @defaultHydration / @idHydrated
// =============================================================================

/// Arguments for `@defaultHydration`, attached to an object or interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultHydrationDirective {
    pub service: String,
    pub field: String,
    /// Backing field argument receiving the id.
    pub id_argument: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl DefaultHydrationDirective {
    /// Creates a default hydration calling `field(id_argument: ...)`.
    pub fn new(
        service: impl Into<String>,
        field: impl Into<String>,
        id_argument: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            field: field.into(),
            id_argument: id_argument.into(),
            identified_by: None,
            batch_size: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn identified_by(mut self, result_id: impl Into<String>) -> Self {
        self.identified_by = Some(result_id.into());
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

/// Arguments for `@idHydrated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdHydratedDirective {
    /// Dotted path to the id on the parent object.
    pub id_field: String,
    /// Overrides the type's `identifiedBy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_by: Option<String>,
}

impl IdHydratedDirective {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            identified_by: None,
        }
    }
}
