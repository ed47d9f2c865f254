//! Argument resolution.
//!
//! Binds every argument declaration to the backing argument it fills and
//! checks the value it supplies.

use crate::assignability::TypeCompatibility;
use crate::context::DeclarationContext;
use crate::declaration::{ArgumentDeclaration, ArgumentValueDeclaration};
use crate::error::HydrationError;
use crate::literal::LiteralValidator;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use weave_core::QueryPath;
use weave_schema::{InputValueDef, Schema, TypeDef, TypeRef, Value};

/// A checked argument of the backing field call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedHydrationArgument {
    /// Backing field argument name.
    pub name: String,
    pub backing_type: TypeRef,
    pub value: ResolvedArgumentValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResolvedArgumentValue {
    #[serde(rename_all = "camelCase")]
    SourceField {
        path: QueryPath,
        source_type: TypeRef,
        /// True if the path crosses a list, so the value is a list.
        yields_list: bool,
        /// Set when an output object is converted into an input object.
        #[serde(skip_serializing_if = "Option::is_none")]
        input_shape: Option<InputObjectShape>,
    },
    #[serde(rename_all = "camelCase")]
    VirtualFieldArgument {
        name: String,
        argument_type: TypeRef,
        #[serde(skip_serializing_if = "Option::is_none")]
        default_value: Option<Value>,
    },
    StaticValue { value: Value },
    RemainingArguments { names: Vec<String> },
}

/// Which input fields are populated from same-named output fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputObjectShape {
    pub object_type: String,
    pub input_type: String,
    pub fields: Vec<String>,
}

impl ResolvedHydrationArgument {
    /// The source path, for `$source` arguments.
    pub fn source_path(&self) -> Option<&QueryPath> {
        match &self.value {
            ResolvedArgumentValue::SourceField { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for ResolvedHydrationArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} <- ", self.name, self.backing_type)?;
        match &self.value {
            ResolvedArgumentValue::SourceField { path, .. } => write!(f, "$source.{path}"),
            ResolvedArgumentValue::VirtualFieldArgument {
                name, default_value, ..
            } => {
                write!(f, "$argument.{name}")?;
                match default_value {
                    Some(default) => write!(f, " = {default}"),
                    None => Ok(()),
                }
            }
            ResolvedArgumentValue::StaticValue { value } => write!(f, "{value}"),
            ResolvedArgumentValue::RemainingArguments { names } => {
                write!(f, "$argument.* [{}]", names.join(", "))
            }
        }
    }
}

/// Resolves argument declarations against the backing field.
#[derive(Clone, Copy)]
pub struct ArgumentResolver<'a> {
    literals: &'a dyn LiteralValidator,
}

impl<'a> ArgumentResolver<'a> {
    pub fn new(literals: &'a dyn LiteralValidator) -> Self {
        Self { literals }
    }

    /// Resolves every argument of a declaration, stopping at the first error.
    pub fn resolve(
        &self,
        ctx: &DeclarationContext<'_>,
    ) -> Result<Vec<ResolvedHydrationArgument>, HydrationError> {
        let declarations = &ctx.declaration.arguments;
        check_argument_set(ctx, declarations)?;

        declarations
            .iter()
            .map(|declaration| self.resolve_argument(ctx, declaration))
            .collect()
    }

    fn resolve_argument(
        &self,
        ctx: &DeclarationContext<'_>,
        declaration: &ArgumentDeclaration,
    ) -> Result<ResolvedHydrationArgument, HydrationError> {
        let backing_argument = ctx
            .backing
            .field
            .arguments
            .get(&declaration.name)
            .ok_or_else(|| HydrationError::BackingArgumentNotFound {
                backing_field: ctx.backing.path.to_string(),
                argument: declaration.name.clone(),
            })?;

        let engine = ctx.engine();
        let compatibility = TypeCompatibility::new(engine, ctx.field.config);
        let kind = declaration.value.kind();
        let check = |supplied: &TypeRef| {
            compatibility
                .is_assignable(ctx.is_batch, kind, supplied, &backing_argument.ty)
                .map_err(|mismatch| mismatch.into_error(&declaration.name))
        };

        let value = match &declaration.value {
            ArgumentValueDeclaration::SourceField(path) => {
                let source = ctx.field.source_field(path).ok_or_else(|| {
                    HydrationError::SourceFieldNotFound {
                        parent_type: ctx.field.parent_type.to_string(),
                        path: path.clone(),
                    }
                })?;
                check(&source.field.ty)?;
                ResolvedArgumentValue::SourceField {
                    path: path.clone(),
                    source_type: source.field.ty.clone(),
                    yields_list: source.yields_list,
                    input_shape: input_shape(engine, &source.field.ty, &backing_argument.ty),
                }
            }
            ArgumentValueDeclaration::VirtualFieldArgument(name) => {
                let argument = ctx.field.field.arguments.get(name).ok_or_else(|| {
                    HydrationError::VirtualArgumentNotFound {
                        argument: name.clone(),
                    }
                })?;
                check(&argument.ty)?;
                ResolvedArgumentValue::VirtualFieldArgument {
                    name: name.clone(),
                    argument_type: argument.ty.clone(),
                    default_value: self.normalized_default(engine, argument)?,
                }
            }
            ArgumentValueDeclaration::StaticValue(value) => {
                let value = self
                    .literals
                    .coerce(engine, value, &backing_argument.ty)
                    .map_err(|e| HydrationError::StaticValueNotAssignable {
                        argument: declaration.name.clone(),
                        value: value.to_string(),
                        required: backing_argument.ty.to_string(),
                        reason: e.to_string(),
                    })?;
                ResolvedArgumentValue::StaticValue { value }
            }
            ArgumentValueDeclaration::RemainingArguments => {
                ResolvedArgumentValue::RemainingArguments {
                    names: remaining_arguments(ctx),
                }
            }
        };

        Ok(ResolvedHydrationArgument {
            name: declaration.name.clone(),
            backing_type: backing_argument.ty.clone(),
            value,
        })
    }

    fn normalized_default(
        &self,
        schema: &Schema,
        argument: &InputValueDef,
    ) -> Result<Option<Value>, HydrationError> {
        argument
            .default_value
            .as_ref()
            .map(|default| {
                self.literals
                    .coerce(schema, default, &argument.ty)
                    .map_err(|e| HydrationError::InvalidArgumentValue {
                        argument: argument.name.clone(),
                        value: default.to_string(),
                        reason: e.to_string(),
                    })
            })
            .transpose()
    }
}

/// Checks made once over the whole declaration set.
fn check_argument_set(
    ctx: &DeclarationContext<'_>,
    declarations: &[ArgumentDeclaration],
) -> Result<(), HydrationError> {
    let mut targeted = FxHashSet::default();
    for declaration in declarations {
        if !targeted.insert(declaration.name.as_str()) {
            return Err(HydrationError::DuplicateArgument {
                argument: declaration.name.clone(),
            });
        }
    }

    if let Some(missing) = ctx
        .backing
        .field
        .arguments
        .values()
        .find(|arg| !arg.is_optional() && !targeted.contains(arg.name.as_str()))
    {
        return Err(HydrationError::MissingRequiredBackingArgument {
            argument: missing.name.clone(),
        });
    }

    if ctx.is_batch {
        let sources: Vec<String> = ctx
            .declaration
            .source_field_arguments()
            .map(|(declaration, _)| declaration.name.clone())
            .collect();
        match sources.len() {
            0 => return Err(HydrationError::MissingSourceField),
            1 => {}
            _ => return Err(HydrationError::MultipleSourceFields { arguments: sources }),
        }
    }

    Ok(())
}

/// Hydrated field arguments not consumed by an explicit `$argument.<name>`.
fn remaining_arguments(ctx: &DeclarationContext<'_>) -> Vec<String> {
    let consumed: FxHashSet<&str> = ctx
        .declaration
        .arguments
        .iter()
        .filter_map(|d| match &d.value {
            ArgumentValueDeclaration::VirtualFieldArgument(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();

    ctx.field
        .field
        .arguments
        .keys()
        .filter(|name| !consumed.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Describes how an output object populates an input object argument.
///
/// # Panics
///
/// Panics if a required input field has no output counterpart. The
/// assignability check rejects such pairs before synthesis.
fn input_shape(schema: &Schema, source: &TypeRef, backing: &TypeRef) -> Option<InputObjectShape> {
    let object_type = source.named_type();
    let Some(TypeDef::InputObject(input)) = schema.get_type(backing.named_type()) else {
        return None;
    };
    let object_fields = schema.fields_of(object_type)?;

    let fields = input
        .fields
        .values()
        .filter_map(|input_field| {
            if object_fields.contains_key(&input_field.name) {
                Some(input_field.name.clone())
            } else if input_field.is_optional() {
                None
            } else {
                panic!(
                    "input field `{}.{}` has no counterpart on `{object_type}`",
                    input.name, input_field.name
                )
            }
        })
        .collect();

    Some(InputObjectShape {
        object_type: object_type.to_string(),
        input_type: input.name.clone(),
        fields,
    })
}
