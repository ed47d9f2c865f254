//! Result conditions.
//!
//! A condition selects one of several hydrations on a polymorphic field by
//! testing a field of the parent object.

use crate::context::DeclarationContext;
use crate::declaration::ConditionDeclaration;
use crate::error::HydrationError;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use weave_core::QueryPath;
use weave_schema::{PredicateDirective, TypeRef, Value};

/// A validated condition.
#[derive(Debug, Clone, Serialize)]
pub struct HydrationCondition {
    /// Field the predicate reads.
    pub path: QueryPath,
    pub predicate: ConditionPredicate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ConditionPredicate {
    StringEquals(String),
    IntEquals(i64),
    StartsWith(String),
    Matches(#[serde(serialize_with = "serialize_regex")] Regex),
}

impl fmt::Display for HydrationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            ConditionPredicate::StringEquals(value) => write!(f, "{} == {value:?}", self.path),
            ConditionPredicate::IntEquals(value) => write!(f, "{} == {value}", self.path),
            ConditionPredicate::StartsWith(prefix) => {
                write!(f, "{} startsWith {prefix:?}", self.path)
            }
            ConditionPredicate::Matches(regex) => {
                write!(f, "{} matches /{}/", self.path, regex.as_str())
            }
        }
    }
}

fn serialize_regex<S: Serializer>(regex: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(regex.as_str())
}

/// Scalar kinds a condition can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionFieldKind {
    String,
    Int,
    Id,
}

impl ConditionFieldKind {
    fn of(name: &str) -> Option<Self> {
        match name {
            "String" => Some(Self::String),
            "Int" | "Long" => Some(Self::Int),
            "ID" => Some(Self::Id),
            _ => None,
        }
    }

    fn is_string_like(self) -> bool {
        matches!(self, Self::String | Self::Id)
    }

    fn is_int_like(self) -> bool {
        matches!(self, Self::Int | Self::Id)
    }
}

/// Validates a condition against the type declaring the hydrated field.
///
/// Non-null wrappers are always stripped. List wrappers are stripped only
/// when the condition reads the batch correlation key, so each element of a
/// batched key can be tested on its own.
pub fn validate_condition(
    ctx: &DeclarationContext<'_>,
    condition: &ConditionDeclaration,
    batch_key: Option<&QueryPath>,
) -> Result<HydrationCondition, HydrationError> {
    let not_found = || HydrationError::ConditionFieldNotFound {
        parent_type: ctx.field.parent_type.to_string(),
        path: condition.source_field.clone(),
    };
    let path = QueryPath::parse(&condition.source_field).map_err(|_| not_found())?;
    let field = ctx.field.source_field(&path).ok_or_else(not_found)?;

    let mut ty = field.field.ty.non_null();
    if batch_key == Some(&path) {
        while let Some(element) = ty.list_element() {
            ty = element.non_null();
        }
    }

    let unsupported = || HydrationError::UnsupportedConditionFieldType {
        path: path.clone(),
        field_type: field.field.ty.to_string(),
    };
    let kind = match ty {
        TypeRef::Named(name) => ConditionFieldKind::of(name).ok_or_else(unsupported)?,
        _ => return Err(unsupported()),
    };

    let incompatible = |value: String| HydrationError::IncompatibleValue {
        path: path.clone(),
        field_type: field.field.ty.to_string(),
        value,
    };

    let predicate = match &condition.predicate {
        PredicateDirective::Equals(Value::String(value)) if kind.is_string_like() => {
            ConditionPredicate::StringEquals(value.clone())
        }
        PredicateDirective::Equals(Value::Int(value)) if kind.is_int_like() => {
            ConditionPredicate::IntEquals(*value)
        }
        PredicateDirective::Equals(value) => return Err(incompatible(value.to_string())),
        PredicateDirective::StartsWith(prefix) if kind.is_string_like() => {
            ConditionPredicate::StartsWith(prefix.clone())
        }
        PredicateDirective::StartsWith(prefix) => return Err(incompatible(format!("{prefix:?}"))),
        PredicateDirective::Matches(pattern) if kind.is_string_like() => {
            let regex = Regex::new(pattern).map_err(|e| HydrationError::InvalidRegex {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            ConditionPredicate::Matches(regex)
        }
        PredicateDirective::Matches(pattern) => return Err(incompatible(format!("{pattern:?}"))),
    };

    Ok(HydrationCondition { path, predicate })
}
