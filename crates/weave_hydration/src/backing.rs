//! Backing field resolution.

use crate::declaration::HydrationDeclaration;
use crate::error::HydrationError;
use weave_core::QueryPath;
use weave_schema::{FieldDef, GatewaySchema};

/// The field a hydration calls, located in the engine schema.
#[derive(Debug, Clone, Copy)]
pub struct BackingField<'a> {
    pub service: &'a str,
    /// Type declaring the backing field (the query root or a namespace type).
    pub parent_type: &'a str,
    pub field: &'a FieldDef,
    pub path: &'a QueryPath,
}

impl<'a> BackingField<'a> {
    /// Resolves the backing field a declaration targets.
    ///
    /// The service must own the first path segment on its query root; the
    /// remaining segments are walked over the engine schema.
    pub fn resolve(
        gateway: &'a GatewaySchema,
        declaration: &'a HydrationDeclaration,
    ) -> Result<Self, HydrationError> {
        let service = gateway
            .service(&declaration.service)
            .ok_or_else(|| HydrationError::ServiceNotFound {
                service: declaration.service.clone(),
            })?;

        let path = &declaration.backing_field_path;
        let not_found = || HydrationError::BackingFieldNotFound {
            service: declaration.service.clone(),
            field: path.to_string(),
        };

        if !service.owns_root_field(path.first()) {
            return Err(not_found());
        }

        let engine = &gateway.engine;
        let (last, init) = path.segments().split_last().ok_or_else(not_found)?;
        let mut parent_type = engine.query_type_name();
        for segment in init {
            let field = engine.field(parent_type, segment).ok_or_else(not_found)?;
            let next = field.ty.named_type();
            if !engine.is_output_object(next) {
                return Err(not_found());
            }
            parent_type = next;
        }
        let field = engine.field(parent_type, last).ok_or_else(not_found)?;

        Ok(Self {
            service: &service.name,
            parent_type,
            field,
            path,
        })
    }

    /// A hydration is batched when the backing field returns a list and
    /// accepts at least one list argument.
    pub fn is_batch(&self) -> bool {
        self.field.ty.is_list() && self.field.arguments.values().any(|arg| arg.ty.is_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_schema::{
        HydratedDirective, InputValueDef, ObjectDef, SchemaBuilder, ServiceDef, TypeRef,
    };

    fn gateway() -> GatewaySchema {
        let query = ObjectDef::new("Query")
            .with_field(
                FieldDef::new("widgetById", TypeRef::option(TypeRef::named("Widget")))
                    .with_argument(InputValueDef::new("id", TypeRef::named("ID"))),
            )
            .with_field(
                FieldDef::new(
                    "widgetsByIds",
                    TypeRef::option(TypeRef::list(TypeRef::named("Widget"))),
                )
                .with_argument(InputValueDef::new(
                    "ids",
                    TypeRef::list(TypeRef::named("ID")),
                )),
            )
            .with_field(FieldDef::new("catalog", TypeRef::named("Catalog")));
        let catalog = ObjectDef::new("Catalog").with_field(
            FieldDef::new("widget", TypeRef::option(TypeRef::named("Widget")))
                .with_argument(InputValueDef::new("id", TypeRef::named("ID"))),
        );
        let widget = ObjectDef::new("Widget").with_field(FieldDef::new("id", TypeRef::named("ID")));
        let schema = SchemaBuilder::new()
            .object(query)
            .object(catalog)
            .object(widget)
            .build();

        GatewaySchema::new(schema.clone()).with_service(ServiceDef::new("widgets", schema))
    }

    fn declaration(service: &str, field: &str) -> HydrationDeclaration {
        HydrationDeclaration::from_directive(&HydratedDirective::new(service, field)).unwrap()
    }

    #[test]
    fn test_resolve_root_field() {
        let gateway = gateway();
        let declaration = declaration("widgets", "widgetById");
        let backing = BackingField::resolve(&gateway, &declaration).unwrap();
        assert_eq!(backing.parent_type, "Query");
        assert_eq!(backing.field.name, "widgetById");
        assert!(!backing.is_batch());
    }

    #[test]
    fn test_resolve_nested_field() {
        let gateway = gateway();
        let declaration = declaration("widgets", "catalog.widget");
        let backing = BackingField::resolve(&gateway, &declaration).unwrap();
        assert_eq!(backing.parent_type, "Catalog");
        assert_eq!(backing.service, "widgets");
    }

    #[test]
    fn test_batch_detection() {
        let gateway = gateway();
        let declaration = declaration("widgets", "widgetsByIds");
        assert!(BackingField::resolve(&gateway, &declaration).unwrap().is_batch());
    }

    #[test]
    fn test_unknown_service_and_field() {
        let gateway = gateway();
        let missing_service = declaration("gadgets", "widgetById");
        assert_eq!(
            BackingField::resolve(&gateway, &missing_service).unwrap_err(),
            HydrationError::ServiceNotFound {
                service: "gadgets".to_string()
            }
        );

        let missing_field = declaration("widgets", "catalog.gadget");
        assert!(matches!(
            BackingField::resolve(&gateway, &missing_field),
            Err(HydrationError::BackingFieldNotFound { ref field, .. }) if field == "catalog.gadget"
        ));
    }
}
