//! The hydration compiler.
//!
//! Walks every hydrated field of the engine schema and compiles its
//! declarations into field instructions. Within one declaration the first
//! failing check wins; across fields every failure is collected so a schema
//! build reports all broken fields at once.

use crate::arguments::ArgumentResolver;
use crate::backing::BackingField;
use crate::condition::validate_condition;
use crate::config::CompilerConfig;
use crate::context::{DeclarationContext, FieldContext};
use crate::declaration::HydrationDeclaration;
use crate::error::{CompileError, FieldHydrationError, HydrationError};
use crate::instruction::{
    BatchFieldInstruction, FieldInstruction, HydrationPlan, HydrationTarget,
    NonBatchFieldInstruction,
};
use crate::literal::{GraphQlLiteralValidator, LiteralValidator};
use crate::match_strategy::{batch_key, resolve_match_strategy, MatchStrategy};
use crate::output::check_output_type;
use crate::source_fields::project_source_fields;
use crate::strategy::{resolve_non_batch_strategy, NonBatchStrategy};
use crate::virtual_types::{map_virtual_types, VirtualTypeMapping};
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};
use weave_core::diagnostics::codes;
use weave_core::{Diagnostic, DiagnosticBag, FieldCoordinates};
use weave_schema::{FieldDef, GatewaySchema, TypeDef};

/// Result of compiling a gateway schema.
#[derive(Debug)]
pub struct CompileResult {
    /// Instructions of every field that compiled.
    pub plan: HydrationPlan,
    pub errors: Vec<FieldHydrationError>,
    /// Errors and warnings.
    pub diagnostics: DiagnosticBag,
}

impl CompileResult {
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Fails with every rejected field if any field was rejected.
    pub fn into_result(self) -> Result<HydrationPlan, CompileError> {
        if self.errors.is_empty() {
            Ok(self.plan)
        } else {
            Err(CompileError {
                errors: self.errors,
            })
        }
    }
}

/// Compiles hydration declarations into a [`HydrationPlan`].
pub struct HydrationCompiler {
    config: CompilerConfig,
    literals: Box<dyn LiteralValidator>,
}

impl fmt::Debug for HydrationCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HydrationCompiler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HydrationCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

struct FieldOutcome {
    coordinates: FieldCoordinates,
    result: Result<Vec<FieldInstruction>, HydrationError>,
    warnings: Vec<Diagnostic>,
}

impl HydrationCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            literals: Box::new(GraphQlLiteralValidator),
        }
    }

    /// Replaces the validator used for static values and argument defaults.
    #[must_use]
    pub fn with_literal_validator(mut self, literals: impl LiteralValidator + 'static) -> Self {
        self.literals = Box::new(literals);
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles every hydrated field of the engine schema.
    pub fn compile(&self, gateway: &GatewaySchema) -> CompileResult {
        let engine = &gateway.engine;
        let targets: Vec<(&str, &FieldDef)> = engine
            .types()
            .filter_map(|(name, _)| engine.fields_of(name).map(|fields| (name.as_str(), fields)))
            .flat_map(|(name, fields)| {
                fields
                    .values()
                    .filter(|field| field.is_hydrated())
                    .map(move |field| (name, field))
            })
            .collect();

        let compile_one = |&(parent_type, field): &(&str, &FieldDef)| {
            let ctx = FieldContext::new(gateway, &self.config, parent_type, field);
            let mut warnings = Vec::new();
            let result = self.compile_field(&ctx, &mut warnings);
            FieldOutcome {
                coordinates: ctx.coordinates,
                result,
                warnings,
            }
        };

        let outcomes: Vec<FieldOutcome> = if self.config.parallel {
            targets.par_iter().map(compile_one).collect()
        } else {
            targets.iter().map(compile_one).collect()
        };

        let mut plan = HydrationPlan::new();
        let mut errors = Vec::new();
        let mut diagnostics = DiagnosticBag::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(instructions) => {
                    for warning in outcome.warnings {
                        diagnostics.add(warning);
                    }
                    plan.insert(outcome.coordinates, instructions);
                }
                Err(error) => {
                    warn!(field = %outcome.coordinates, code = %error.code_str(), "{error}");
                    let error = FieldHydrationError::new(outcome.coordinates, error);
                    diagnostics.add(error.to_diagnostic());
                    errors.push(error);
                }
            }
        }

        info!(
            compiled = plan.len(),
            rejected = errors.len(),
            "compiled hydrated fields"
        );
        CompileResult {
            plan,
            errors,
            diagnostics,
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(field = %ctx.coordinates))]
    fn compile_field(
        &self,
        ctx: &FieldContext<'_>,
        warnings: &mut Vec<Diagnostic>,
    ) -> Result<Vec<FieldInstruction>, HydrationError> {
        let declarations = collect_declarations(ctx)?;
        let declared = &ctx.field.ty;

        if !declared.is_nullable() {
            return Err(HydrationError::MustBeNullable {
                declared: declared.to_string(),
            });
        }
        if declarations.len() > 1
            && !matches!(
                ctx.engine().get_type(declared.named_type()),
                Some(TypeDef::Union(_))
            )
        {
            return Err(HydrationError::PolymorphicMustOutputUnion {
                declared: declared.to_string(),
            });
        }
        if !all_equal(declarations.iter().map(|d| d.condition.is_some())) {
            return Err(HydrationError::MixedConditionUsage);
        }
        if !all_equal(declarations.iter().map(|d| d.indexed)) {
            return Err(HydrationError::MixedIndexUsage);
        }

        let backings = declarations
            .iter()
            .map(|declaration| BackingField::resolve(ctx.gateway, declaration))
            .collect::<Result<Vec<_>, _>>()?;
        if !all_equal(backings.iter().map(BackingField::is_batch)) {
            return Err(HydrationError::MixedBatchUsage);
        }

        let resolver = ArgumentResolver::new(self.literals.as_ref());
        declarations
            .iter()
            .zip(backings)
            .map(|(declaration, backing)| {
                let ctx = DeclarationContext::new(ctx, declaration, backing);
                self.compile_declaration(&ctx, &resolver, warnings)
            })
            .collect()
    }

    fn compile_declaration(
        &self,
        ctx: &DeclarationContext<'_>,
        resolver: &ArgumentResolver<'_>,
        warnings: &mut Vec<Diagnostic>,
    ) -> Result<FieldInstruction, HydrationError> {
        let declaration = ctx.declaration;
        let backing = ctx.backing;
        let engine = ctx.engine();

        let arguments = resolver.resolve(ctx)?;
        let key = if ctx.is_batch {
            batch_key(&arguments)
        } else {
            None
        };
        let condition = declaration
            .condition
            .as_ref()
            .map(|condition| validate_condition(ctx, condition, key))
            .transpose()?;

        let strategy = if ctx.is_batch {
            Strategy::Batch(resolve_match_strategy(ctx, &arguments)?)
        } else {
            Strategy::NonBatch(resolve_non_batch_strategy(ctx, &arguments)?)
        };

        check_output_type(ctx.field.gateway, &ctx.field.field.ty, &backing.field.ty)?;

        let match_strategy = match &strategy {
            Strategy::Batch(match_strategy) => Some(match_strategy),
            Strategy::NonBatch(_) => None,
        };
        let source_fields =
            project_source_fields(engine, &arguments, match_strategy, condition.as_ref());
        let virtual_type_mapping = virtual_type_mapping(ctx);
        let target = HydrationTarget {
            service: backing.service.to_string(),
            backing_field_path: backing.path.clone(),
            backing_field_coordinates: FieldCoordinates::new(
                backing.parent_type,
                &backing.field.name,
            ),
        };
        let timeout_millis = declaration
            .timeout_millis
            .or(ctx.field.config.default_timeout_millis);
        let location = ctx.field.coordinates.clone();

        let instruction = match strategy {
            Strategy::Batch(match_strategy) => {
                debug!(
                    backing_field = %backing.path,
                    strategy = %match_strategy,
                    "batch hydration"
                );
                FieldInstruction::Batch(BatchFieldInstruction {
                    location,
                    target,
                    arguments,
                    source_fields,
                    condition,
                    timeout_millis,
                    virtual_type_mapping,
                    match_strategy,
                    batch_size: declaration
                        .batch_size
                        .unwrap_or(ctx.field.config.default_batch_size),
                })
            }
            Strategy::NonBatch(strategy) => {
                debug!(backing_field = %backing.path, strategy = %strategy, "non-batch hydration");
                warnings.extend(ignored_batch_options(ctx));
                FieldInstruction::NonBatch(NonBatchFieldInstruction {
                    location,
                    target,
                    arguments,
                    source_fields,
                    condition,
                    timeout_millis,
                    virtual_type_mapping,
                    strategy,
                })
            }
        };
        Ok(instruction)
    }
}

enum Strategy {
    Batch(MatchStrategy),
    NonBatch(NonBatchStrategy),
}

/// Collects the declarations of a field, expanding `@idHydrated`.
fn collect_declarations(
    ctx: &FieldContext<'_>,
) -> Result<Vec<HydrationDeclaration>, HydrationError> {
    let mut declarations = Vec::with_capacity(ctx.field.hydrated.len() + 1);

    if let Some(id_hydrated) = &ctx.field.id_hydrated {
        let type_name = ctx.field.ty.named_type();
        let default = ctx.engine().default_hydration(type_name).ok_or_else(|| {
            HydrationError::MissingDefaultHydration {
                type_name: type_name.to_string(),
            }
        })?;
        declarations.push(HydrationDeclaration::from_default_hydration(
            default,
            id_hydrated,
        )?);
    }

    for directive in &ctx.field.hydrated {
        declarations.push(HydrationDeclaration::from_directive(directive)?);
    }
    Ok(declarations)
}

fn virtual_type_mapping(ctx: &DeclarationContext<'_>) -> Option<VirtualTypeMapping> {
    let virtual_type = ctx.field.field.ty.named_type();
    ctx.field.gateway.is_virtual_type(virtual_type).then(|| {
        map_virtual_types(
            ctx.engine(),
            virtual_type,
            ctx.backing.field.ty.named_type(),
        )
    })
}

/// `batchSize` and `indexed` only apply to batch hydrations.
fn ignored_batch_options(ctx: &DeclarationContext<'_>) -> Vec<Diagnostic> {
    let declaration = ctx.declaration;
    let mut warnings = Vec::new();
    if declaration.batch_size.is_some() {
        warnings.push(
            Diagnostic::warning(codes::IGNORED_BATCH_SIZE, "ignored batchSize")
                .with_message(format!(
                    "`{}` is not a batch field; batchSize has no effect",
                    ctx.backing.path
                ))
                .at(ctx.field.coordinates.clone(), "declared here"),
        );
    }
    if declaration.indexed {
        warnings.push(
            Diagnostic::warning(codes::IGNORED_INDEXED, "ignored indexed")
                .with_message(format!(
                    "`{}` is not a batch field; indexed has no effect",
                    ctx.backing.path
                ))
                .at(ctx.field.coordinates.clone(), "declared here"),
        );
    }
    warnings
}

fn all_equal(mut values: impl Iterator<Item = bool>) -> bool {
    match values.next() {
        Some(first) => values.all(|value| value == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_equal() {
        assert!(all_equal([].into_iter()));
        assert!(all_equal([true, true].into_iter()));
        assert!(!all_equal([false, true].into_iter()));
    }

    #[test]
    fn test_empty_schema_compiles() {
        let result = HydrationCompiler::default().compile(&GatewaySchema::default());
        assert!(result.is_ok());
        assert!(result.plan.is_empty());
        assert!(result.diagnostics.is_empty());
    }
}
