//! Compiler configuration.

use serde::{Deserialize, Serialize};

/// An enum pair treated as compatible regardless of the values either side
/// declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumCompatibilityOverride {
    /// Enum type of the value being supplied.
    pub supplied: String,
    /// Enum type of the argument receiving it.
    pub required: String,
}

/// Hydration compiler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    pub enum_compatibility_overrides: Vec<EnumCompatibilityOverride>,

    /// Compile fields on the rayon thread pool.
    pub parallel: bool,

    /// Batch size for batched hydrations that don't declare one.
    pub default_batch_size: u32,

    /// Timeout for hydrations that don't declare one.
    pub default_timeout_millis: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            enum_compatibility_overrides: Vec::new(),
            parallel: true,
            default_batch_size: 50,
            default_timeout_millis: None,
        }
    }
}

impl CompilerConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds an enum compatibility override.
    #[must_use]
    pub fn with_enum_override(
        mut self,
        supplied: impl Into<String>,
        required: impl Into<String>,
    ) -> Self {
        self.enum_compatibility_overrides.push(EnumCompatibilityOverride {
            supplied: supplied.into(),
            required: required.into(),
        });
        self
    }

    /// Enables or disables parallel compilation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_default_batch_size(mut self, batch_size: u32) -> Self {
        self.default_batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_default_timeout_millis(mut self, timeout: u64) -> Self {
        self.default_timeout_millis = Some(timeout);
        self
    }

    /// Returns true if `supplied` may feed `required` by override.
    pub fn is_enum_override(&self, supplied: &str, required: &str) -> bool {
        self.enum_compatibility_overrides
            .iter()
            .any(|o| o.supplied == supplied && o.required == required)
    }
}
