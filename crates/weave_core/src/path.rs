//! Query paths.
//!
//! A query path names a value reachable from the current object by following
//! named fields, e.g. `owner.id`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error produced when building a [`QueryPath`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryPathError {
    /// The path had no segments.
    #[error("query path must contain at least one field")]
    Empty,
    /// One of the segments was blank, e.g. `owner..id`.
    #[error("query path `{0}` contains an empty field name")]
    EmptySegment(String),
}

/// An ordered, non-empty sequence of field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<String>", into = "Vec<String>")
)]
pub struct QueryPath {
    segments: Vec<String>,
}

impl QueryPath {
    /// Creates a path from its segments.
    pub fn new<I, S>(segments: I) -> Result<Self, QueryPathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(QueryPathError::Empty);
        }
        if segments.iter().any(String::is_empty) {
            return Err(QueryPathError::EmptySegment(segments.join(".")));
        }
        Ok(Self { segments })
    }

    /// Creates a single-segment path.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "query path field name must not be empty");
        Self {
            segments: vec![name],
        }
    }

    /// Parses a dotted path (e.g. `"owner.id"`).
    pub fn parse(path: &str) -> Result<Self, QueryPathError> {
        if path.is_empty() {
            return Err(QueryPathError::Empty);
        }
        Self::new(path.split('.'))
    }

    /// Returns the segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments. Always at least one.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns the first segment.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// Returns the last segment.
    #[must_use]
    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Returns a new path with `child` appended.
    #[must_use]
    pub fn join(&self, child: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(child.into());
        Self { segments }
    }

    /// Returns true if `self` is an initial subsequence of `other`
    /// (equal paths count as prefixes of each other).
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Returns true if `self` is a prefix of `other` and shorter than it.
    #[must_use]
    pub fn is_strict_prefix_of(&self, other: &Self) -> bool {
        other.segments.len() > self.segments.len() && self.is_prefix_of(other)
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl TryFrom<Vec<String>> for QueryPath {
    type Error = QueryPathError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(segments)
    }
}

impl From<QueryPath> for Vec<String> {
    fn from(path: QueryPath) -> Self {
        path.segments
    }
}
