//! Type compatibility between supplied values and backing arguments.
//!
//! Rules, in order:
//! 1. A batch correlation key must be a single-level list.
//! 2. Wrappers: a supplied type must be at least as strict as the required
//!    one. Batch arguments and `$source` arguments skip this step and
//!    compare named types only.
//! 3. Leaf types: same name, scalar coercions, enum subsets, and output
//!    objects feeding input objects (checked field by field).

use crate::config::CompilerConfig;
use crate::declaration::ArgumentKind;
use crate::error::HydrationError;
use rustc_hash::FxHashSet;
use weave_schema::{InputObjectDef, Schema, TypeDef, TypeRef};

/// A failed assignability check, before the argument name is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMismatch {
    IncompatibleInputType {
        supplied: String,
        required: String,
    },
    InvalidBatchIdShape {
        required: String,
    },
    MissingInputField {
        supplied_type: String,
        input_type: String,
        input_field: String,
    },
    IncompatibleField {
        supplied_type: String,
        supplied_field: String,
        input_type: String,
        input_field: String,
    },
}

impl TypeMismatch {
    pub fn into_error(self, argument: &str) -> HydrationError {
        let argument = argument.to_string();
        match self {
            Self::IncompatibleInputType { supplied, required } => {
                HydrationError::IncompatibleInputType {
                    argument,
                    supplied,
                    required,
                }
            }
            Self::InvalidBatchIdShape { required } => {
                HydrationError::InvalidBatchIdShape { argument, required }
            }
            Self::MissingInputField {
                supplied_type,
                input_type,
                input_field,
            } => HydrationError::MissingInputField {
                argument,
                supplied_type,
                input_type,
                input_field,
            },
            Self::IncompatibleField {
                supplied_type,
                supplied_field,
                input_type,
                input_field,
            } => HydrationError::IncompatibleField {
                argument,
                supplied_type,
                supplied_field,
                input_type,
                input_field,
            },
        }
    }
}

/// Pairs of (output object, input object) already being checked.
type Visited<'a> = FxHashSet<(&'a str, &'a str)>;

/// Checks supplied types against required argument types.
#[derive(Debug, Clone, Copy)]
pub struct TypeCompatibility<'a> {
    schema: &'a Schema,
    config: &'a CompilerConfig,
}

impl<'a> TypeCompatibility<'a> {
    pub fn new(schema: &'a Schema, config: &'a CompilerConfig) -> Self {
        Self { schema, config }
    }

    /// Checks that a value of `supplied` may fill an argument of `required`.
    pub fn is_assignable(
        &self,
        is_batch: bool,
        kind: ArgumentKind,
        supplied: &TypeRef,
        required: &TypeRef,
    ) -> Result<(), TypeMismatch> {
        if is_batch && kind == ArgumentKind::SourceField && required.list_depth() != 1 {
            return Err(TypeMismatch::InvalidBatchIdShape {
                required: required.to_string(),
            });
        }

        let mut visited = Visited::default();
        let result = if is_batch || kind == ArgumentKind::SourceField {
            self.check_leaf(supplied.named_type(), required.named_type(), &mut visited)
        } else {
            self.check_wrapped(supplied, required, &mut visited)
        };

        result.map_err(|mismatch| match mismatch {
            // Report the declared types rather than the unwrapped leaves.
            TypeMismatch::IncompatibleInputType { .. } => TypeMismatch::IncompatibleInputType {
                supplied: supplied.to_string(),
                required: required.to_string(),
            },
            other => other,
        })
    }

    fn check_wrapped(
        &self,
        supplied: &TypeRef,
        required: &TypeRef,
        visited: &mut Visited<'a>,
    ) -> Result<(), TypeMismatch> {
        match (supplied, required) {
            (TypeRef::Option(s), TypeRef::Option(r)) => self.check_wrapped(s, r, visited),
            // A non-null value may fill a nullable slot.
            (s, TypeRef::Option(r)) => self.check_wrapped(s, r, visited),
            (TypeRef::List(s), TypeRef::List(r)) => self.check_wrapped(s, r, visited),
            (TypeRef::Named(s), TypeRef::Named(r)) => self.check_leaf(s, r, visited),
            _ => Err(incompatible(supplied, required)),
        }
    }

    fn check_leaf(
        &self,
        supplied: &str,
        required: &str,
        visited: &mut Visited<'a>,
    ) -> Result<(), TypeMismatch> {
        // Same-kind pairs with one name are not descended into.
        if supplied == required {
            return Ok(());
        }

        let mismatch = || TypeMismatch::IncompatibleInputType {
            supplied: supplied.to_string(),
            required: required.to_string(),
        };

        match (self.schema.get_type(supplied), self.schema.get_type(required)) {
            (Some(TypeDef::Enum(s)), Some(TypeDef::Enum(r))) => {
                let compatible = self.config.is_enum_override(supplied, required)
                    || s.values.iter().all(|value| r.has_value(value));
                compatible.then_some(()).ok_or_else(mismatch)
            }
            (
                Some(object @ (TypeDef::Object(_) | TypeDef::Interface(_))),
                Some(TypeDef::InputObject(input)),
            ) => self.check_object_into_input(object.name(), input, visited),
            _ if self.schema.is_scalar(supplied) && self.schema.is_scalar(required) => {
                is_scalar_coercible(supplied, required)
                    .then_some(())
                    .ok_or_else(mismatch)
            }
            _ => Err(mismatch()),
        }
    }

    fn check_object_into_input(
        &self,
        object: &'a str,
        input: &'a InputObjectDef,
        visited: &mut Visited<'a>,
    ) -> Result<(), TypeMismatch> {
        if !visited.insert((object, &input.name)) {
            return Ok(());
        }

        let schema = self.schema;
        for input_field in input.fields.values() {
            let Some(output_field) = schema.field(object, &input_field.name) else {
                if input_field.is_optional() {
                    continue;
                }
                return Err(TypeMismatch::MissingInputField {
                    supplied_type: object.to_string(),
                    input_type: input.name.clone(),
                    input_field: input_field.name.clone(),
                });
            };

            self.check_wrapped(&output_field.ty, &input_field.ty, visited)
                .map_err(|mismatch| match mismatch {
                    TypeMismatch::IncompatibleInputType { .. } => TypeMismatch::IncompatibleField {
                        supplied_type: object.to_string(),
                        supplied_field: output_field.name.clone(),
                        input_type: input.name.clone(),
                        input_field: input_field.name.clone(),
                    },
                    nested => nested,
                })?;
        }
        Ok(())
    }
}

/// `ID` accepts `String`, `Int` and `Long`; `String` accepts `ID`.
fn is_scalar_coercible(supplied: &str, required: &str) -> bool {
    matches!(
        (supplied, required),
        ("String" | "Int" | "Long", "ID") | ("ID", "String")
    )
}

fn incompatible(supplied: &TypeRef, required: &TypeRef) -> TypeMismatch {
    TypeMismatch::IncompatibleInputType {
        supplied: supplied.to_string(),
        required: required.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_schema::{EnumDef, FieldDef, InputValueDef, ObjectDef, SchemaBuilder, Value};

    fn schema() -> Schema {
        SchemaBuilder::new()
            .scalar("Long")
            .scalar("DateTime")
            .enumeration(EnumDef::new("Status", ["OPEN", "CLOSED", "ARCHIVED"]))
            .enumeration(EnumDef::new("IssueStatus", ["OPEN", "CLOSED"]))
            .enumeration(EnumDef::new("LegacyStatus", ["OPEN", "RESOLVED"]))
            .object(
                ObjectDef::new("Node")
                    .with_field(FieldDef::new("id", TypeRef::named("ID")))
                    .with_field(FieldDef::new("next", TypeRef::option(TypeRef::named("Node"))))
                    .with_field(FieldDef::new("label", TypeRef::option(TypeRef::named("String")))),
            )
            .input_object(
                InputObjectDef::new("NodeInput")
                    .with_field(InputValueDef::new("id", TypeRef::named("ID")))
                    .with_field(InputValueDef::new(
                        "next",
                        TypeRef::option(TypeRef::named("NodeInput")),
                    )),
            )
            .input_object(
                InputObjectDef::new("StrictInput")
                    .with_field(InputValueDef::new("id", TypeRef::named("ID")))
                    .with_field(InputValueDef::new("label", TypeRef::named("String"))),
            )
            .input_object(
                InputObjectDef::new("WideInput")
                    .with_field(InputValueDef::new("id", TypeRef::named("ID")))
                    .with_field(InputValueDef::new("site", TypeRef::named("String"))),
            )
            .input_object(
                InputObjectDef::new("DefaultedInput")
                    .with_field(InputValueDef::new("id", TypeRef::named("ID")))
                    .with_field(
                        InputValueDef::new("site", TypeRef::named("String"))
                            .with_default(Value::string("main")),
                    ),
            )
            .build()
    }

    fn check(
        config: &CompilerConfig,
        is_batch: bool,
        kind: ArgumentKind,
        supplied: &str,
        required: &str,
    ) -> Result<(), TypeMismatch> {
        let schema = schema();
        TypeCompatibility::new(&schema, config).is_assignable(
            is_batch,
            kind,
            &TypeRef::parse(supplied).unwrap(),
            &TypeRef::parse(required).unwrap(),
        )
    }

    fn check_static(supplied: &str, required: &str) -> Result<(), TypeMismatch> {
        check(
            &CompilerConfig::default(),
            false,
            ArgumentKind::VirtualFieldArgument,
            supplied,
            required,
        )
    }

    #[test]
    fn test_scalar_coercion() {
        for supplied in ["String", "Int", "Long", "ID"] {
            assert!(check_static(supplied, "ID").is_ok(), "{supplied} -> ID");
        }
        assert!(check_static("ID", "String").is_ok());

        for (supplied, required) in [
            ("Int", "String"),
            ("String", "Int"),
            ("ID", "Int"),
            ("Long", "Int"),
            ("Float", "Int"),
            ("DateTime", "String"),
            ("Boolean", "ID"),
        ] {
            assert!(
                check_static(supplied, required).is_err(),
                "{supplied} -> {required}"
            );
        }
    }

    #[test]
    fn test_enum_subset() {
        assert!(check_static("Status", "Status").is_ok());
        assert!(check_static("IssueStatus", "Status").is_ok());
        assert!(check_static("Status", "IssueStatus").is_err());
        assert!(check_static("LegacyStatus", "Status").is_err());
    }

    #[test]
    fn test_enum_override() {
        let config = CompilerConfig::default().with_enum_override("LegacyStatus", "Status");
        let kind = ArgumentKind::VirtualFieldArgument;
        assert!(check(&config, false, kind, "LegacyStatus", "Status").is_ok());
        assert!(check(&config, false, kind, "Status", "LegacyStatus").is_err());
    }

    #[test]
    fn test_wrappers() {
        assert!(check_static("ID!", "ID").is_ok());
        assert!(check_static("[ID!]!", "[ID]").is_ok());
        assert_eq!(
            check_static("ID", "ID!"),
            Err(TypeMismatch::IncompatibleInputType {
                supplied: "ID".to_string(),
                required: "ID!".to_string(),
            })
        );
        assert!(check_static("[ID]", "ID").is_err());
        assert!(check_static("ID", "[ID]").is_err());
    }

    #[test]
    fn test_source_field_unwraps() {
        let config = CompilerConfig::default();
        assert!(check(&config, false, ArgumentKind::SourceField, "[ID]", "ID!").is_ok());
        assert!(check(&config, true, ArgumentKind::SourceField, "ID", "[ID!]!").is_ok());
    }

    #[test]
    fn test_batch_id_shape() {
        let config = CompilerConfig::default();
        for required in ["ID", "[[ID]]", "[[ID!]!]!", "[[String]]"] {
            assert_eq!(
                check(&config, true, ArgumentKind::SourceField, "ID", required),
                Err(TypeMismatch::InvalidBatchIdShape {
                    required: required.to_string()
                })
            );
        }
    }

    #[test]
    fn test_object_into_input() {
        // Self-referential pair terminates.
        assert!(check_static("Node", "NodeInput").is_ok());

        assert_eq!(
            check_static("Node", "StrictInput"),
            Err(TypeMismatch::IncompatibleField {
                supplied_type: "Node".to_string(),
                supplied_field: "label".to_string(),
                input_type: "StrictInput".to_string(),
                input_field: "label".to_string(),
            })
        );
        assert_eq!(
            check_static("Node", "WideInput"),
            Err(TypeMismatch::MissingInputField {
                supplied_type: "Node".to_string(),
                input_type: "WideInput".to_string(),
                input_field: "site".to_string(),
            })
        );
    }

    #[test]
    fn test_defaulted_input_field_may_be_missing() {
        assert!(check_static("Node", "DefaultedInput").is_ok());
    }

    #[test]
    fn test_into_error() {
        let error = TypeMismatch::InvalidBatchIdShape {
            required: "ID".to_string(),
        }
        .into_error("ids");
        assert_eq!(
            error.to_string(),
            "batch argument `ids` must be a single list, found `ID`"
        );
    }
}
