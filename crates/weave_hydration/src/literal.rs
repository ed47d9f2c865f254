//! Literal coercion.
//!
//! Static argument values and argument defaults are checked with the
//! input-coercion rules of GraphQL. The validator is injected into the
//! argument resolver so hosts can substitute their own rules.

use indexmap::IndexMap;
use weave_schema::{InputObjectDef, Schema, TypeDef, TypeRef, Value};

/// Why a literal cannot be coerced to a type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("null is not allowed for `{ty}`")]
    NullForNonNull { ty: String },

    #[error("expected {expected}, found {found}")]
    UnexpectedKind {
        expected: String,
        found: &'static str,
    },

    #[error("{value} does not fit in a 32-bit Int")]
    IntOutOfRange { value: i64 },

    #[error("`{value}` is not a value of enum `{enum_name}`")]
    UnknownEnumValue { enum_name: String, value: String },

    #[error("input `{input_type}` has no field `{field}`")]
    UnknownInputField { input_type: String, field: String },

    #[error("input `{input_type}` requires field `{field}`")]
    MissingInputField { input_type: String, field: String },

    #[error("`{name}` is not an input type")]
    NotAnInputType { name: String },
}

/// Validates literals against input types.
pub trait LiteralValidator: Send + Sync {
    /// Coerces `value` to `ty`, returning the normalized value.
    fn coerce(&self, schema: &Schema, value: &Value, ty: &TypeRef) -> Result<Value, LiteralError>;
}

/// GraphQL input coercion.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphQlLiteralValidator;

impl LiteralValidator for GraphQlLiteralValidator {
    fn coerce(&self, schema: &Schema, value: &Value, ty: &TypeRef) -> Result<Value, LiteralError> {
        match ty {
            TypeRef::Option(_) if value.is_null() => Ok(Value::Null),
            TypeRef::Option(inner) => self.coerce(schema, value, inner),
            _ if value.is_null() => Err(LiteralError::NullForNonNull { ty: ty.to_string() }),
            TypeRef::List(inner) => match value {
                Value::List(items) => items
                    .iter()
                    .map(|item| self.coerce(schema, item, inner))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                // A single value is accepted where a list is expected.
                single => Ok(Value::List(vec![self.coerce(schema, single, inner)?])),
            },
            TypeRef::Named(name) => self.coerce_named(schema, value, name),
        }
    }
}

impl GraphQlLiteralValidator {
    #[allow(clippy::cast_precision_loss)]
    fn coerce_named(
        &self,
        schema: &Schema,
        value: &Value,
        name: &str,
    ) -> Result<Value, LiteralError> {
        let unexpected = || LiteralError::UnexpectedKind {
            expected: format!("`{name}`"),
            found: value.kind(),
        };

        match (name, value) {
            ("Int", Value::Int(i)) => i32::try_from(*i)
                .map(|_| Value::Int(*i))
                .map_err(|_| LiteralError::IntOutOfRange { value: *i }),
            ("Float", Value::Int(i)) => Ok(Value::Float(*i as f64)),
            ("Float", Value::Float(x)) => Ok(Value::Float(*x)),
            ("String", Value::String(s)) => Ok(Value::String(s.clone())),
            ("Boolean", Value::Boolean(b)) => Ok(Value::Boolean(*b)),
            ("ID", Value::String(s)) => Ok(Value::String(s.clone())),
            ("ID", Value::Int(i)) => Ok(Value::String(i.to_string())),
            ("Int" | "Float" | "String" | "Boolean" | "ID", _) => Err(unexpected()),
            _ => match schema.get_type(name) {
                Some(TypeDef::Scalar(_)) => Ok(value.clone()),
                Some(TypeDef::Enum(enumeration)) => match value {
                    Value::Enum(v) | Value::String(v) if enumeration.has_value(v) => {
                        Ok(Value::Enum(v.clone()))
                    }
                    Value::Enum(v) | Value::String(v) => Err(LiteralError::UnknownEnumValue {
                        enum_name: name.to_string(),
                        value: v.clone(),
                    }),
                    _ => Err(unexpected()),
                },
                Some(TypeDef::InputObject(input)) => match value {
                    Value::Object(fields) => self.coerce_input_object(schema, fields, input),
                    _ => Err(unexpected()),
                },
                _ => Err(LiteralError::NotAnInputType {
                    name: name.to_string(),
                }),
            },
        }
    }

    fn coerce_input_object(
        &self,
        schema: &Schema,
        fields: &IndexMap<String, Value>,
        input: &InputObjectDef,
    ) -> Result<Value, LiteralError> {
        if let Some(unknown) = fields.keys().find(|key| !input.fields.contains_key(*key)) {
            return Err(LiteralError::UnknownInputField {
                input_type: input.name.clone(),
                field: unknown.clone(),
            });
        }

        let mut coerced = IndexMap::with_capacity(input.fields.len());
        for field in input.fields.values() {
            match (fields.get(&field.name), &field.default_value) {
                (Some(value), _) => {
                    coerced.insert(field.name.clone(), self.coerce(schema, value, &field.ty)?);
                }
                (None, Some(default)) => {
                    coerced.insert(field.name.clone(), default.clone());
                }
                (None, None) if field.ty.is_nullable() => {}
                (None, None) => {
                    return Err(LiteralError::MissingInputField {
                        input_type: input.name.clone(),
                        field: field.name.clone(),
                    })
                }
            }
        }
        Ok(Value::Object(coerced))
    }
}
