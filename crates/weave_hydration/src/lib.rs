//! Hydration compiler for the Weave gateway.
//!
//! A hydrated field is served by calling another field, the backing field,
//! possibly on another service. This crate validates every `@hydrated` and
//! `@idHydrated` declaration of a gateway schema and compiles it into an
//! immutable [`FieldInstruction`] for the runtime.
//!
//! Modules:
//! - `declaration`: Lowering annotations into typed declarations
//! - `backing`: Locating the backing field
//! - `assignability`: Type compatibility between supplied and required types
//! - `literal`: Literal coercion for static values and defaults
//! - `arguments`: Argument resolution
//! - `condition`: Result conditions
//! - `strategy` / `match_strategy`: Non-batch and batch strategies
//! - `source_fields`: Source field projection
//! - `output`: Output type compatibility
//! - `virtual_types`: Virtual type mapping
//! - `compiler`: The schema-wide orchestrator
//!
//! # Example
//!
//! ```ignore
//! use weave_hydration::{CompilerConfig, HydrationCompiler};
//!
//! let gateway = weave_schema::GatewaySchema::from_json_str(json)?;
//! let plan = HydrationCompiler::new(CompilerConfig::default())
//!     .compile(&gateway)
//!     .into_result()?;
//! ```

pub mod arguments;
pub mod assignability;
pub mod backing;
pub mod compiler;
pub mod condition;
pub mod config;
pub mod context;
pub mod declaration;
pub mod error;
pub mod instruction;
pub mod literal;
pub mod match_strategy;
pub mod output;
pub mod source_fields;
pub mod strategy;
pub mod virtual_types;

pub use arguments::{
    ArgumentResolver, InputObjectShape, ResolvedArgumentValue, ResolvedHydrationArgument,
};
pub use assignability::{TypeCompatibility, TypeMismatch};
pub use backing::BackingField;
pub use compiler::{CompileResult, HydrationCompiler};
pub use condition::{validate_condition, ConditionPredicate, HydrationCondition};
pub use config::{CompilerConfig, EnumCompatibilityOverride};
pub use context::{DeclarationContext, FieldContext};
pub use declaration::{
    ArgumentDeclaration, ArgumentKind, ArgumentValueDeclaration, ConditionDeclaration,
    HydrationDeclaration,
};
pub use error::{CompileError, FieldHydrationError, HydrationError};
pub use instruction::{
    BatchFieldInstruction, FieldInstruction, HydrationPlan, HydrationTarget,
    NonBatchFieldInstruction,
};
pub use literal::{GraphQlLiteralValidator, LiteralError, LiteralValidator};
pub use match_strategy::{resolve_match_strategy, MatchStrategy, ObjectIdentifier};
pub use output::check_output_type;
pub use source_fields::{project_source_fields, prune};
pub use strategy::{resolve_non_batch_strategy, NonBatchStrategy};
pub use virtual_types::{map_virtual_types, VirtualTypeMapping};
