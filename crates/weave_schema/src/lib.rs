//! Schema model for the Weave gateway.
//!
//! This crate provides:
//! - `types`: Type references (`ID`, `[ID!]`, ...)
//! - `value`: Literal values
//! - `schema`: Type definitions and the schema builder
//! - `directives`: Hydration annotations attached to fields and types
//! - `gateway`: The unified engine schema plus per-service schemas

pub mod directives;
pub mod gateway;
pub mod schema;
pub mod types;
pub mod value;

pub use directives::{
    ConditionDirective, DefaultHydrationDirective, HydratedArgument, HydratedDirective,
    IdHydratedDirective, InputIdentifiedBy, PredicateDirective, ResultConditionDirective,
};
pub use gateway::{GatewaySchema, ServiceDef};
pub use schema::{
    EnumDef, FieldDef, InputObjectDef, InputValueDef, InterfaceDef, ObjectDef, ScalarDef, Schema,
    SchemaBuilder, TypeDef, UnionDef, BUILTIN_SCALARS,
};
pub use types::{TypeRef, TypeRefParseError};
pub use value::Value;
