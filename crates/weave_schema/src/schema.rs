//! Schema definition for the Weave gateway.

use crate::directives::{DefaultHydrationDirective, HydratedDirective, IdHydratedDirective};
use crate::types::TypeRef;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scalars every schema defines.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// A GraphQL schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(default)]
    pub types: IndexMap<String, TypeDef>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the query root type.
    pub fn query_type_name(&self) -> &str {
        self.query_type.as_deref().unwrap_or("Query")
    }

    /// Gets a declared type by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Returns all types.
    pub fn types(&self) -> impl Iterator<Item = (&String, &TypeDef)> {
        self.types.iter()
    }

    /// Fields of an object or interface type.
    pub fn fields_of(&self, type_name: &str) -> Option<&IndexMap<String, FieldDef>> {
        match self.types.get(type_name)? {
            TypeDef::Object(object) => Some(&object.fields),
            TypeDef::Interface(interface) => Some(&interface.fields),
            _ => None,
        }
    }

    /// Looks up `type_name.field_name`.
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        self.fields_of(type_name)?.get(field_name)
    }

    /// Returns true if the type is a scalar (built-in or declared).
    pub fn is_scalar(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name) || matches!(self.types.get(name), Some(TypeDef::Scalar(_)))
    }

    /// Returns true if the type is an object or interface, i.e. an output
    /// type that exposes fields.
    pub fn is_output_object(&self, name: &str) -> bool {
        matches!(
            self.types.get(name),
            Some(TypeDef::Object(_) | TypeDef::Interface(_))
        )
    }

    /// Returns true if the type is abstract (interface or union).
    pub fn is_abstract(&self, name: &str) -> bool {
        matches!(
            self.types.get(name),
            Some(TypeDef::Interface(_) | TypeDef::Union(_))
        )
    }

    /// Concrete object types a value of `name` can have at runtime.
    ///
    /// Objects yield themselves, unions their members and interfaces every
    /// object that implements them.
    pub fn possible_types<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        match self.types.get(name) {
            Some(TypeDef::Union(union)) => union.members.iter().map(String::as_str).collect(),
            Some(TypeDef::Interface(_)) => self
                .types
                .values()
                .filter_map(|ty| match ty {
                    TypeDef::Object(object) if object.implements.iter().any(|i| i == name) => {
                        Some(object.name.as_str())
                    }
                    _ => None,
                })
                .collect(),
            _ => vec![name],
        }
    }

    /// `@defaultHydration` declared on an object or interface.
    pub fn default_hydration(&self, type_name: &str) -> Option<&DefaultHydrationDirective> {
        match self.types.get(type_name)? {
            TypeDef::Object(object) => object.default_hydration.as_ref(),
            TypeDef::Interface(interface) => interface.default_hydration.as_ref(),
            _ => None,
        }
    }
}

/// A type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeDef {
    Scalar(ScalarDef),
    Object(ObjectDef),
    Interface(InterfaceDef),
    Union(UnionDef),
    Enum(EnumDef),
    InputObject(InputObjectDef),
}

impl TypeDef {
    /// Returns the type name.
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Scalar(s) => &s.name,
            TypeDef::Object(o) => &o.name,
            TypeDef::Interface(i) => &i.name,
            TypeDef::Union(u) => &u.name,
            TypeDef::Enum(e) => &e.name,
            TypeDef::InputObject(i) => &i.name,
        }
    }
}

/// Scalar type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ScalarDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// Object type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hydration: Option<DefaultHydrationDirective>,
}

impl ObjectDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            implements: Vec::new(),
            default_hydration: None,
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Declares an implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    /// Attaches `@defaultHydration`.
    #[must_use]
    pub fn with_default_hydration(mut self, directive: DefaultHydrationDirective) -> Self {
        self.default_hydration = Some(directive);
        self
    }
}

/// Interface type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hydration: Option<DefaultHydrationDirective>,
}

impl InterfaceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
            implements: Vec::new(),
            default_hydration: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

/// Union type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnionDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: Vec<String>,
}

impl UnionDef {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Enum type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub values: Vec<String>,
}

impl EnumDef {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the enum declares `value`.
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Input object type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputObjectDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, InputValueDef>,
}

impl InputObjectDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: InputValueDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}

/// Field definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub arguments: IndexMap<String, InputValueDef>,
    /// `@hydrated` annotations, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hydrated: Vec<HydratedDirective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_hydrated: Option<IdHydratedDirective>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            arguments: IndexMap::new(),
            hydrated: Vec::new(),
            id_hydrated: None,
        }
    }

    #[must_use]
    pub fn with_argument(mut self, argument: InputValueDef) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    #[must_use]
    pub fn with_hydrated(mut self, directive: HydratedDirective) -> Self {
        self.hydrated.push(directive);
        self
    }

    #[must_use]
    pub fn with_id_hydrated(mut self, directive: IdHydratedDirective) -> Self {
        self.id_hydrated = Some(directive);
        self
    }

    /// Returns true if the field is produced by hydration.
    pub fn is_hydrated(&self) -> bool {
        !self.hydrated.is_empty() || self.id_hydrated.is_some()
    }
}

/// Input value definition (arguments, input fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValueDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl InputValueDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Returns true if the value may be omitted by a caller.
    pub fn is_optional(&self) -> bool {
        self.ty.is_nullable() || self.default_value.is_some()
    }
}

/// Schema builder.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Creates a new schema builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query type.
    #[must_use]
    pub fn query_type(mut self, name: impl Into<String>) -> Self {
        self.schema.query_type = Some(name.into());
        self
    }

    /// Adds a type.
    #[must_use]
    pub fn add_type(mut self, type_def: TypeDef) -> Self {
        self.schema
            .types
            .insert(type_def.name().to_string(), type_def);
        self
    }

    #[must_use]
    pub fn object(self, object: ObjectDef) -> Self {
        self.add_type(TypeDef::Object(object))
    }

    #[must_use]
    pub fn interface(self, interface: InterfaceDef) -> Self {
        self.add_type(TypeDef::Interface(interface))
    }

    #[must_use]
    pub fn union(self, union: UnionDef) -> Self {
        self.add_type(TypeDef::Union(union))
    }

    #[must_use]
    pub fn enumeration(self, enumeration: EnumDef) -> Self {
        self.add_type(TypeDef::Enum(enumeration))
    }

    #[must_use]
    pub fn input_object(self, input: InputObjectDef) -> Self {
        self.add_type(TypeDef::InputObject(input))
    }

    #[must_use]
    pub fn scalar(self, name: impl Into<String>) -> Self {
        self.add_type(TypeDef::Scalar(ScalarDef::new(name)))
    }

    /// Builds the schema.
    pub fn build(self) -> Schema {
        self.schema
    }
}
