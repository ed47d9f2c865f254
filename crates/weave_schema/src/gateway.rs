//! The federated schema seen by the hydration compiler.
//!
//! `engine` is the unified public schema produced by merging every service.
//! Each service keeps the schema it contributed so ownership of root fields
//! and synthetic (virtual) types can be determined.

use crate::schema::{Schema, BUILTIN_SCALARS};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A backend service and the schema it exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDef {
    pub name: String,
    pub schema: Schema,
}

impl ServiceDef {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Returns true if the service's query root declares `field_name`.
    pub fn owns_root_field(&self, field_name: &str) -> bool {
        self.schema
            .field(self.schema.query_type_name(), field_name)
            .is_some()
    }
}

/// The unified schema plus every underlying service schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewaySchema {
    pub engine: Schema,
    #[serde(default)]
    pub services: IndexMap<String, ServiceDef>,
}

impl GatewaySchema {
    /// Creates a gateway schema with no services.
    pub fn new(engine: Schema) -> Self {
        Self {
            engine,
            services: IndexMap::new(),
        }
    }

    /// Adds a service.
    #[must_use]
    pub fn with_service(mut self, service: ServiceDef) -> Self {
        self.services.insert(service.name.clone(), service);
        self
    }

    /// Loads a gateway schema from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Gets a service by name.
    pub fn service(&self, name: &str) -> Option<&ServiceDef> {
        self.services.get(name)
    }

    /// Returns true if `type_name` exists only in the engine schema, i.e. it
    /// is a synthetic type no service defines.
    pub fn is_virtual_type(&self, type_name: &str) -> bool {
        !BUILTIN_SCALARS.contains(&type_name)
            && self.engine.get_type(type_name).is_some()
            && !self
                .services
                .values()
                .any(|service| service.schema.get_type(type_name).is_some())
    }
}
