//! Non-batch strategy resolution.

use crate::arguments::{ResolvedArgumentValue, ResolvedHydrationArgument};
use crate::context::DeclarationContext;
use crate::error::HydrationError;
use serde::Serialize;
use std::fmt;

/// How a non-batch hydration maps source values onto backing calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NonBatchStrategy {
    /// One backing call per parent object.
    OneToOne,
    /// One backing call per element of a list source field.
    #[serde(rename_all = "camelCase")]
    ManyToOne { input_argument: String },
}

impl fmt::Display for NonBatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneToOne => write!(f, "OneToOne"),
            Self::ManyToOne { input_argument } => write!(f, "ManyToOne({input_argument})"),
        }
    }
}

/// Picks the strategy of a non-batch hydration.
///
/// A `$source` argument whose value is a list but whose backing argument is
/// not fans out into one call per element. At most one argument may do so,
/// and the hydrated field must then be a list.
pub fn resolve_non_batch_strategy(
    ctx: &DeclarationContext<'_>,
    arguments: &[ResolvedHydrationArgument],
) -> Result<NonBatchStrategy, HydrationError> {
    let fan_out: Vec<(&ResolvedHydrationArgument, _)> = arguments
        .iter()
        .filter_map(|argument| match &argument.value {
            ResolvedArgumentValue::SourceField {
                path,
                yields_list: true,
                ..
            } if !argument.backing_type.is_list() => Some((argument, path)),
            _ => None,
        })
        .collect();

    match fan_out.as_slice() {
        [] => Ok(NonBatchStrategy::OneToOne),
        [(argument, path)] => {
            if ctx.field.field.ty.is_list() {
                Ok(NonBatchStrategy::ManyToOne {
                    input_argument: argument.name.clone(),
                })
            } else {
                Err(HydrationError::CannotSqueezeSourceList {
                    argument: argument.name.clone(),
                    source_path: (*path).clone(),
                })
            }
        }
        _ => Err(HydrationError::MultipleFanOutArguments {
            arguments: fan_out.iter().map(|(arg, _)| arg.name.clone()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing::BackingField;
    use crate::config::CompilerConfig;
    use crate::context::FieldContext;
    use crate::declaration::HydrationDeclaration;
    use weave_core::QueryPath;
    use weave_schema::{
        FieldDef, GatewaySchema, HydratedDirective, InputValueDef, ObjectDef, SchemaBuilder,
        ServiceDef, TypeRef,
    };

    fn source(
        name: &str,
        path: &str,
        yields_list: bool,
        backing: &str,
    ) -> ResolvedHydrationArgument {
        ResolvedHydrationArgument {
            name: name.to_string(),
            backing_type: TypeRef::parse(backing).unwrap(),
            value: ResolvedArgumentValue::SourceField {
                path: QueryPath::parse(path).unwrap(),
                source_type: TypeRef::named("ID"),
                yields_list,
                input_shape: None,
            },
        }
    }

    fn strategy(
        field_type: &str,
        arguments: &[ResolvedHydrationArgument],
    ) -> Result<NonBatchStrategy, HydrationError> {
        let query = ObjectDef::new("Query").with_field(
            FieldDef::new("widgetById", TypeRef::option(TypeRef::named("Widget")))
                .with_argument(InputValueDef::new("id", TypeRef::named("ID"))),
        );
        let widget = ObjectDef::new("Widget").with_field(FieldDef::new("id", TypeRef::named("ID")));
        let schema = SchemaBuilder::new().object(query).object(widget).build();
        let gateway =
            GatewaySchema::new(schema.clone()).with_service(ServiceDef::new("widgets", schema));
        let config = CompilerConfig::default();
        let field = FieldDef::new("widgets", TypeRef::parse(field_type).unwrap());
        let field_ctx = FieldContext::new(&gateway, &config, "Issue", &field);
        let declaration =
            HydrationDeclaration::from_directive(&HydratedDirective::new("widgets", "widgetById"))
                .unwrap();
        let backing = BackingField::resolve(&gateway, &declaration).unwrap();
        resolve_non_batch_strategy(
            &DeclarationContext::new(&field_ctx, &declaration, backing),
            arguments,
        )
    }

    #[test]
    fn test_one_to_one() {
        assert_eq!(
            strategy("Widget", &[source("id", "widgetId", false, "ID!")]).unwrap(),
            NonBatchStrategy::OneToOne
        );
        // A list feeding a list argument is passed as is.
        assert_eq!(
            strategy("Widget", &[source("ids", "widgetIds", true, "[ID]")]).unwrap(),
            NonBatchStrategy::OneToOne
        );
    }

    #[test]
    fn test_many_to_one() {
        assert_eq!(
            strategy("[Widget]", &[source("id", "widgetIds", true, "ID!")]).unwrap(),
            NonBatchStrategy::ManyToOne {
                input_argument: "id".to_string()
            }
        );
    }

    #[test]
    fn test_cannot_squeeze_list() {
        assert_eq!(
            strategy("Widget", &[source("id", "widgetIds", true, "ID!")]).unwrap_err(),
            HydrationError::CannotSqueezeSourceList {
                argument: "id".to_string(),
                source_path: QueryPath::field("widgetIds"),
            }
        );
    }

    #[test]
    fn test_multiple_fan_out() {
        let error = strategy(
            "[Widget]",
            &[
                source("a", "aIds", true, "ID"),
                source("b", "bIds", true, "ID"),
            ],
        )
        .unwrap_err();
        assert_eq!(
            error,
            HydrationError::MultipleFanOutArguments {
                arguments: vec!["a".to_string(), "b".to_string()]
            }
        );
    }
}
