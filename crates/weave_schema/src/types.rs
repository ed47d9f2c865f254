//! Type references.
//!
//! Types are non-null by default; nullability is an explicit `Option`
//! wrapper. The textual form follows SDL notation, so `[ID!]` is
//! `Option(List(Named("ID")))`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error produced when parsing a type reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type reference `{input}`: {reason}")]
pub struct TypeRefParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Named(String),
    Option(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn option(inner: TypeRef) -> Self {
        Self::Option(Box::new(inner))
    }

    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    /// Parses SDL notation such as `[ID!]!`.
    pub fn parse(input: &str) -> Result<Self, TypeRefParseError> {
        let error = |reason| TypeRefParseError {
            input: input.to_string(),
            reason,
        };
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(error("empty type"));
        }

        let (core, non_null) = match trimmed.strip_suffix('!') {
            Some(core) => (core.trim_end(), true),
            None => (trimmed, false),
        };

        let ty = if let Some(inner) = core.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(|| error("unclosed list"))?;
            Self::list(Self::parse(inner)?)
        } else if core.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && core.chars().next().is_some_and(|c| !c.is_ascii_digit())
        {
            Self::named(core)
        } else {
            return Err(error("expected a type name"));
        };

        Ok(if non_null { ty } else { Self::option(ty) })
    }

    /// Returns true if the outermost wrapper admits null.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    /// Strips the outermost nullability wrapper.
    #[must_use]
    pub fn non_null(&self) -> &TypeRef {
        match self {
            Self::Option(inner) => inner,
            other => other,
        }
    }

    /// Returns true if the type is a list, ignoring nullability.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self.non_null(), Self::List(_))
    }

    /// Returns the element type of a list, ignoring nullability.
    #[must_use]
    pub fn list_element(&self) -> Option<&TypeRef> {
        match self.non_null() {
            Self::List(inner) => Some(inner),
            _ => None,
        }
    }

    /// Number of nested list wrappers.
    #[must_use]
    pub fn list_depth(&self) -> usize {
        match self {
            Self::Named(_) => 0,
            Self::Option(inner) => inner.list_depth(),
            Self::List(inner) => 1 + inner.list_depth(),
        }
    }

    /// The named type beneath every wrapper.
    #[must_use]
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Option(inner) | Self::List(inner) => inner.named_type(),
        }
    }

    fn fmt_core(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::Option(inner) => inner.fmt_core(f),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Option(inner) => inner.fmt_core(f),
            other => {
                other.fmt_core(f)?;
                write!(f, "!")
            }
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}
