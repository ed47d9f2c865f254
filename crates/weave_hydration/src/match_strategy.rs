//! Batch match strategies.
//!
//! Pairs every item of a batch result with the parent object that asked for
//! it.

use crate::arguments::ResolvedHydrationArgument;
use crate::context::DeclarationContext;
use crate::error::HydrationError;
use serde::Serialize;
use std::fmt;
use weave_core::QueryPath;

/// A correlation key: a source path and the result field it must equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdentifier {
    pub source_id: QueryPath,
    pub result_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "identifiers", rename_all = "camelCase")]
pub enum MatchStrategy {
    /// Results are in the same order as the inputs.
    Index,
    ObjectIdentifier(ObjectIdentifier),
    /// One key per concrete result type.
    ObjectIdentifiers(Vec<ObjectIdentifier>),
}

impl MatchStrategy {
    /// Source paths the correlation reads.
    pub fn key_paths(&self) -> Vec<&QueryPath> {
        match self {
            Self::Index => Vec::new(),
            Self::ObjectIdentifier(identifier) => vec![&identifier.source_id],
            Self::ObjectIdentifiers(identifiers) => {
                identifiers.iter().map(|id| &id.source_id).collect()
            }
        }
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.source_id, self.result_id)
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "Index"),
            Self::ObjectIdentifier(identifier) => write!(f, "ObjectIdentifier({identifier})"),
            Self::ObjectIdentifiers(identifiers) => {
                write!(f, "ObjectIdentifiers(")?;
                for (i, identifier) in identifiers.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{identifier}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The path of the sole `$source` argument of a batch hydration.
pub fn batch_key(arguments: &[ResolvedHydrationArgument]) -> Option<&QueryPath> {
    arguments.iter().find_map(ResolvedHydrationArgument::source_path)
}

/// Chooses the match strategy of a batch hydration.
///
/// `indexed` wins, then `inputIdentifiedBy`, then `identifiedBy`.
pub fn resolve_match_strategy(
    ctx: &DeclarationContext<'_>,
    arguments: &[ResolvedHydrationArgument],
) -> Result<MatchStrategy, HydrationError> {
    let declaration = ctx.declaration;
    if declaration.indexed {
        return Ok(MatchStrategy::Index);
    }

    let source_field = batch_key(arguments).ok_or(HydrationError::MissingSourceField)?;

    if !declaration.input_identified_by.is_empty() {
        let identifiers = declaration
            .input_identified_by
            .iter()
            .map(|pair| {
                let invalid = || HydrationError::InvalidSourceId {
                    source_id: pair.source_id.clone(),
                    source_field: source_field.clone(),
                };
                let source_id = QueryPath::parse(&pair.source_id).map_err(|_| invalid())?;
                if !source_field.is_prefix_of(&source_id) {
                    return Err(invalid());
                }
                if ctx.field.source_field(&source_id).is_none() {
                    return Err(HydrationError::SourceFieldNotFound {
                        parent_type: ctx.field.parent_type.to_string(),
                        path: source_id,
                    });
                }
                Ok(ObjectIdentifier {
                    source_id,
                    result_id: pair.result_id.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(MatchStrategy::ObjectIdentifiers(identifiers));
    }

    match &declaration.identified_by {
        Some(result_id) => Ok(MatchStrategy::ObjectIdentifier(ObjectIdentifier {
            source_id: source_field.clone(),
            result_id: result_id.clone(),
        })),
        None => Err(HydrationError::MissingIdentifiedBy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::ResolvedArgumentValue;
    use crate::backing::BackingField;
    use crate::config::CompilerConfig;
    use crate::context::FieldContext;
    use crate::declaration::HydrationDeclaration;
    use weave_schema::{
        FieldDef, GatewaySchema, HydratedDirective, InputValueDef, ObjectDef, SchemaBuilder,
        ServiceDef, TypeRef,
    };

    fn resolve(directive: HydratedDirective) -> Result<MatchStrategy, HydrationError> {
        let query = ObjectDef::new("Query").with_field(
            FieldDef::new(
                "itemsByRefs",
                TypeRef::option(TypeRef::list(TypeRef::named("Item"))),
            )
            .with_argument(InputValueDef::new(
                "refs",
                TypeRef::list(TypeRef::named("RefInput")),
            )),
        );
        let item = ObjectDef::new("Item").with_field(FieldDef::new("id", TypeRef::named("ID")));
        let reference = ObjectDef::new("Ref")
            .with_field(FieldDef::new("id", TypeRef::named("ID")))
            .with_field(FieldDef::new("site", TypeRef::named("String")));
        let board = ObjectDef::new("Board")
            .with_field(FieldDef::new("ref", TypeRef::named("Ref")))
            .with_field(FieldDef::new("otherId", TypeRef::named("ID")));
        let schema = SchemaBuilder::new()
            .object(query)
            .object(item)
            .object(reference)
            .object(board)
            .build();
        let gateway =
            GatewaySchema::new(schema.clone()).with_service(ServiceDef::new("items", schema));
        let config = CompilerConfig::default();
        let field = FieldDef::new("item", TypeRef::option(TypeRef::named("Item")));
        let field_ctx = FieldContext::new(&gateway, &config, "Board", &field);
        let declaration = HydrationDeclaration::from_directive(&directive).unwrap();
        let backing = BackingField::resolve(&gateway, &declaration).unwrap();
        let ctx = DeclarationContext::new(&field_ctx, &declaration, backing);
        let arguments = vec![ResolvedHydrationArgument {
            name: "refs".to_string(),
            backing_type: TypeRef::parse("[RefInput]!").unwrap(),
            value: ResolvedArgumentValue::SourceField {
                path: QueryPath::field("ref"),
                source_type: TypeRef::named("Ref"),
                yields_list: false,
                input_shape: None,
            },
        }];
        resolve_match_strategy(&ctx, &arguments)
    }

    fn items() -> HydratedDirective {
        HydratedDirective::new("items", "itemsByRefs").with_argument("refs", "$source.ref")
    }

    #[test]
    fn test_indexed_wins() {
        assert_eq!(
            resolve(items().indexed().identified_by("id")).unwrap(),
            MatchStrategy::Index
        );
    }

    #[test]
    fn test_object_identifier() {
        let strategy = resolve(items().identified_by("id")).unwrap();
        assert_eq!(strategy.to_string(), "ObjectIdentifier(ref = id)");
        assert_eq!(strategy.key_paths(), vec![&QueryPath::field("ref")]);
    }

    #[test]
    fn test_object_identifiers() {
        let strategy = resolve(
            items()
                .with_input_identified_by("ref.id", "id")
                .with_input_identified_by("ref.site", "site"),
        )
        .unwrap();
        assert_eq!(
            strategy.to_string(),
            "ObjectIdentifiers(ref.id = id, ref.site = site)"
        );
    }

    #[test]
    fn test_invalid_source_id() {
        assert_eq!(
            resolve(items().with_input_identified_by("otherId", "id")).unwrap_err(),
            HydrationError::InvalidSourceId {
                source_id: "otherId".to_string(),
                source_field: QueryPath::field("ref"),
            }
        );
        assert!(matches!(
            resolve(items().with_input_identified_by("ref.missing", "id")),
            Err(HydrationError::SourceFieldNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_identified_by() {
        assert_eq!(
            resolve(items()).unwrap_err(),
            HydrationError::MissingIdentifiedBy
        );
    }
}
