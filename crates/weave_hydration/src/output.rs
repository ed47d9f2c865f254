//! Output type compatibility.

use crate::error::HydrationError;
use weave_schema::{GatewaySchema, TypeDef, TypeRef};

/// Checks that every type the backing field can return is acceptable for
/// the hydrated field.
///
/// Acceptable types are the declared type and, for abstract types, every
/// possible member. A virtual output type accepts any object type, since
/// the type mapper pairs its fields with the backing type's.
pub fn check_output_type(
    gateway: &GatewaySchema,
    declared: &TypeRef,
    backing: &TypeRef,
) -> Result<(), HydrationError> {
    let engine = &gateway.engine;
    let declared_name = declared.named_type();
    let backing_name = backing.named_type();
    let incompatible = |actual: &str| HydrationError::IncompatibleOutputType {
        actual: actual.to_string(),
        declared: declared.to_string(),
    };

    if gateway.is_virtual_type(declared_name) {
        return match engine
            .possible_types(backing_name)
            .into_iter()
            .find(|actual| !matches!(engine.get_type(actual), Some(TypeDef::Object(_))))
        {
            Some(actual) => Err(incompatible(actual)),
            None => Ok(()),
        };
    }

    let mut acceptable = vec![declared_name];
    if engine.is_abstract(declared_name) {
        acceptable.extend(engine.possible_types(declared_name));
    }

    match engine
        .possible_types(backing_name)
        .into_iter()
        .find(|actual| !acceptable.contains(actual))
    {
        Some(actual) => Err(incompatible(actual)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_schema::{FieldDef, InterfaceDef, ObjectDef, SchemaBuilder, ServiceDef, UnionDef};

    fn gateway() -> GatewaySchema {
        let schema = SchemaBuilder::new()
            .interface(
                InterfaceDef::new("Node").with_field(FieldDef::new("id", TypeRef::named("ID"))),
            )
            .object(
                ObjectDef::new("Issue")
                    .implements("Node")
                    .with_field(FieldDef::new("id", TypeRef::named("ID"))),
            )
            .object(
                ObjectDef::new("Page")
                    .implements("Node")
                    .with_field(FieldDef::new("id", TypeRef::named("ID"))),
            )
            .object(ObjectDef::new("User").with_field(FieldDef::new("id", TypeRef::named("ID"))))
            .union(UnionDef::new("Content", ["Issue", "Page"]))
            .build();
        let mut engine = schema.clone();
        engine.types.insert(
            "Card".to_string(),
            TypeDef::Object(
                ObjectDef::new("Card").with_field(FieldDef::new("id", TypeRef::named("ID"))),
            ),
        );
        GatewaySchema::new(engine).with_service(ServiceDef::new("content", schema))
    }

    fn check(declared: &str, backing: &str) -> Result<(), HydrationError> {
        check_output_type(
            &gateway(),
            &TypeRef::parse(declared).unwrap(),
            &TypeRef::parse(backing).unwrap(),
        )
    }

    #[test]
    fn test_same_type() {
        assert!(check("Issue", "Issue!").is_ok());
        assert!(check("[Issue]", "[Issue!]").is_ok());
    }

    #[test]
    fn test_abstract_declared_type() {
        assert!(check("Content", "Issue").is_ok());
        assert!(check("Content", "Node").is_ok());
        assert!(check("Node", "Page").is_ok());
    }

    #[test]
    fn test_incompatible() {
        assert_eq!(
            check("Content", "User").unwrap_err(),
            HydrationError::IncompatibleOutputType {
                actual: "User".to_string(),
                declared: "Content".to_string(),
            }
        );
        assert!(check("Issue", "Node").is_err());
    }

    #[test]
    fn test_virtual_type_backed_by_objects() {
        assert!(check("Card", "User").is_ok());
        assert!(check("[Card]", "[Content]").is_ok());
        assert!(check("Card", "Node").is_ok());
    }

    #[test]
    fn test_virtual_type_backed_by_scalar() {
        assert_eq!(
            check("Card", "String").unwrap_err(),
            HydrationError::IncompatibleOutputType {
                actual: "String".to_string(),
                declared: "Card".to_string(),
            }
        );
    }
}
