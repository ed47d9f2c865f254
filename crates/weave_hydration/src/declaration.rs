//! Hydration declarations.
//!
//! Lowers the raw `@hydrated` / `@idHydrated` annotations into typed
//! declarations the compiler components consume.

use crate::error::HydrationError;
use weave_core::QueryPath;
use weave_schema::{
    DefaultHydrationDirective, HydratedArgument, HydratedDirective, IdHydratedDirective,
    InputIdentifiedBy, PredicateDirective, Value,
};

const SOURCE_PREFIX: &str = "$source.";
const ARGUMENT_PREFIX: &str = "$argument.";
const REMAINING_ARGUMENTS: &str = "$argument.*";

/// A checked-for-shape hydration declaration, one per `(field, target)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationDeclaration {
    pub service: String,
    pub backing_field_path: QueryPath,
    pub arguments: Vec<ArgumentDeclaration>,
    pub condition: Option<ConditionDeclaration>,
    pub identified_by: Option<String>,
    pub input_identified_by: Vec<InputIdentifiedBy>,
    pub indexed: bool,
    pub batch_size: Option<u32>,
    pub timeout_millis: Option<u64>,
}

/// Binds one backing field argument to where its value comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDeclaration {
    /// Backing field argument name.
    pub name: String,
    pub value: ArgumentValueDeclaration,
}

/// Where a backing argument's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValueDeclaration {
    /// A field on the parent object.
    SourceField(QueryPath),
    /// An argument of the hydrated field.
    VirtualFieldArgument(String),
    /// A literal.
    StaticValue(Value),
    /// Every hydrated field argument not mapped elsewhere.
    RemainingArguments,
}

impl ArgumentValueDeclaration {
    pub fn kind(&self) -> ArgumentKind {
        match self {
            Self::SourceField(_) => ArgumentKind::SourceField,
            Self::VirtualFieldArgument(_) => ArgumentKind::VirtualFieldArgument,
            Self::StaticValue(_) => ArgumentKind::StaticValue,
            Self::RemainingArguments => ArgumentKind::RemainingArguments,
        }
    }
}

/// Discriminant of [`ArgumentValueDeclaration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    SourceField,
    VirtualFieldArgument,
    StaticValue,
    RemainingArguments,
}

/// A result condition as declared, before its field is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionDeclaration {
    pub source_field: String,
    pub predicate: PredicateDirective,
}

impl HydrationDeclaration {
    /// Lowers a `@hydrated` annotation.
    pub fn from_directive(directive: &HydratedDirective) -> Result<Self, HydrationError> {
        let backing_field_path =
            QueryPath::parse(&directive.field).map_err(|_| HydrationError::BackingFieldNotFound {
                service: directive.service.clone(),
                field: directive.field.clone(),
            })?;

        let arguments = directive
            .arguments
            .iter()
            .map(lower_argument)
            .collect::<Result<Vec<_>, _>>()?;

        let condition = directive.when.as_ref().map(|when| ConditionDeclaration {
            source_field: when.result.source_field.clone(),
            predicate: when.result.predicate.clone(),
        });

        Ok(Self {
            service: directive.service.clone(),
            backing_field_path,
            arguments,
            condition,
            identified_by: directive.identified_by.clone(),
            input_identified_by: directive.input_identified_by.clone(),
            indexed: directive.indexed,
            batch_size: directive.batch_size,
            timeout_millis: directive.timeout,
        })
    }

    /// Expands `@idHydrated` against the `@defaultHydration` of the field's
    /// output type.
    pub fn from_default_hydration(
        default: &DefaultHydrationDirective,
        id_hydrated: &IdHydratedDirective,
    ) -> Result<Self, HydrationError> {
        let id_path = QueryPath::parse(&id_hydrated.id_field).map_err(|e| {
            HydrationError::InvalidArgumentValue {
                argument: default.id_argument.clone(),
                value: id_hydrated.id_field.clone(),
                reason: e.to_string(),
            }
        })?;
        let backing_field_path =
            QueryPath::parse(&default.field).map_err(|_| HydrationError::BackingFieldNotFound {
                service: default.service.clone(),
                field: default.field.clone(),
            })?;

        Ok(Self {
            service: default.service.clone(),
            backing_field_path,
            arguments: vec![ArgumentDeclaration {
                name: default.id_argument.clone(),
                value: ArgumentValueDeclaration::SourceField(id_path),
            }],
            condition: None,
            identified_by: id_hydrated
                .identified_by
                .clone()
                .or_else(|| default.identified_by.clone()),
            input_identified_by: Vec::new(),
            indexed: false,
            batch_size: default.batch_size,
            timeout_millis: default.timeout,
        })
    }

    /// Returns the `$source` arguments.
    pub fn source_field_arguments(
        &self,
    ) -> impl Iterator<Item = (&ArgumentDeclaration, &QueryPath)> {
        self.arguments.iter().filter_map(|arg| match &arg.value {
            ArgumentValueDeclaration::SourceField(path) => Some((arg, path)),
            _ => None,
        })
    }
}

fn lower_argument(argument: &HydratedArgument) -> Result<ArgumentDeclaration, HydrationError> {
    let invalid = |reason: &str| HydrationError::InvalidArgumentValue {
        argument: argument.name.clone(),
        value: argument.value.to_string(),
        reason: reason.to_string(),
    };

    let value = match &argument.value {
        Value::String(reference) => {
            if let Some(path) = reference.strip_prefix(SOURCE_PREFIX) {
                let path = QueryPath::parse(path).map_err(|e| invalid(&e.to_string()))?;
                ArgumentValueDeclaration::SourceField(path)
            } else if reference == REMAINING_ARGUMENTS {
                ArgumentValueDeclaration::RemainingArguments
            } else if let Some(name) = reference.strip_prefix(ARGUMENT_PREFIX) {
                if name.is_empty() || name.contains('.') {
                    return Err(invalid("expected `$argument.<name>`"));
                }
                ArgumentValueDeclaration::VirtualFieldArgument(name.to_string())
            } else {
                // Other strings are literals, `$`-prefixed or not.
                ArgumentValueDeclaration::StaticValue(argument.value.clone())
            }
        }
        literal => ArgumentValueDeclaration::StaticValue(literal.clone()),
    };

    Ok(ArgumentDeclaration {
        name: argument.name.clone(),
        value,
    })
}
