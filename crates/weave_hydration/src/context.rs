//! Validation contexts.
//!
//! Components receive an explicit, immutable context instead of reaching
//! for ambient state. Contexts nest: a [`DeclarationContext`] borrows the
//! [`FieldContext`] of the field it belongs to.

use crate::backing::BackingField;
use crate::config::CompilerConfig;
use crate::declaration::HydrationDeclaration;
use weave_core::{FieldCoordinates, QueryPath};
use weave_schema::{FieldDef, GatewaySchema, Schema};

/// The hydrated field being compiled.
#[derive(Debug, Clone)]
pub struct FieldContext<'a> {
    pub gateway: &'a GatewaySchema,
    pub config: &'a CompilerConfig,
    /// Type declaring the hydrated field.
    pub parent_type: &'a str,
    pub field: &'a FieldDef,
    pub coordinates: FieldCoordinates,
}

/// A field reached from the parent object by following a query path.
#[derive(Debug, Clone, Copy)]
pub struct SourceFieldRef<'a> {
    pub field: &'a FieldDef,
    /// True if any field along the path is a list.
    pub yields_list: bool,
}

impl<'a> FieldContext<'a> {
    pub fn new(
        gateway: &'a GatewaySchema,
        config: &'a CompilerConfig,
        parent_type: &'a str,
        field: &'a FieldDef,
    ) -> Self {
        Self {
            gateway,
            config,
            parent_type,
            field,
            coordinates: FieldCoordinates::new(parent_type, &field.name),
        }
    }

    pub fn engine(&self) -> &'a Schema {
        &self.gateway.engine
    }

    /// Follows `path` from the parent type.
    pub fn source_field(&self, path: &QueryPath) -> Option<SourceFieldRef<'a>> {
        let engine = self.engine();
        let (last, init) = path.segments().split_last()?;
        let mut current = self.parent_type;
        let mut yields_list = false;
        for segment in init {
            let field = engine.field(current, segment)?;
            yields_list |= field.ty.is_list();
            current = field.ty.named_type();
        }
        let field = engine.field(current, last)?;
        Some(SourceFieldRef {
            field,
            yields_list: yields_list || field.ty.is_list(),
        })
    }
}

/// One declaration of the field being compiled.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationContext<'a> {
    pub field: &'a FieldContext<'a>,
    pub declaration: &'a HydrationDeclaration,
    pub backing: BackingField<'a>,
    pub is_batch: bool,
}

impl<'a> DeclarationContext<'a> {
    pub fn new(
        field: &'a FieldContext<'a>,
        declaration: &'a HydrationDeclaration,
        backing: BackingField<'a>,
    ) -> Self {
        Self {
            field,
            declaration,
            backing,
            is_batch: backing.is_batch(),
        }
    }

    pub fn engine(&self) -> &'a Schema {
        self.field.engine()
    }
}
