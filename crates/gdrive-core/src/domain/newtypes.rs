//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for remote object identifiers
//! and hierarchical virtual paths. Each newtype ensures data validity at
//! construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// ID of the root folder sentinel; always exists, never created or deleted
pub const ROOT_ID: &str = "root";

/// Literal spellings that refer to the root folder
const ROOT_SYNONYMS: &[&str] = &["", "root", "home"];

// ============================================================================
// ObjectId
// ============================================================================

/// Opaque identifier of an object in the remote store
///
/// Drive IDs are URL-safe tokens such as `1A2b3C4d5E6f7G8h9I0j`; they are
/// interpolated into request paths, so separators and whitespace are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Create a new ObjectId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains `/` or whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidObjectId(
                "Object ID cannot be empty".to_string(),
            ));
        }
        if id.contains('/') || id.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidObjectId(format!(
                "Object ID contains invalid characters: {id}"
            )));
        }
        Ok(Self(id))
    }

    /// The root folder sentinel
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    /// Returns true if this is the root sentinel
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

// ============================================================================
// VirtualPath
// ============================================================================

/// Hierarchical path (`/a/b/c.txt`) addressing an object through the graph
///
/// The path is stored as its normalized segments. Leading, trailing and
/// repeated separators are collapsed first, then the root synonyms (`/`,
/// `\`, `root`, `home`, empty) map to the root, so `/home` and `root/` name
/// the root as well. Whitespace inside segments is kept. Two paths are
/// equal iff their normalized keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VirtualPath {
    segments: Vec<String>,
}

impl VirtualPath {
    /// Parse and normalize a user-supplied path
    ///
    /// # Errors
    /// Returns error if a segment is `.` or `..`
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        if input.trim().is_empty() {
            return Ok(Self::root());
        }
        // Only separators are stripped; names may begin or end with spaces
        let stripped = input.trim_matches(|c: char| c == '/' || c == '\\');
        if ROOT_SYNONYMS.contains(&stripped) {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in stripped.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(DomainError::InvalidPath(format!(
                    "Path contains relative segment '{segment}': {input}"
                )));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// The root path
    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns true if this path refers to the root folder
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The normalized segments, outermost first
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Normalized string form used as the cache key (`/` or `/a/b`)
    #[must_use]
    pub fn as_key(&self) -> String {
        if self.segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.segments.join("/"))
        }
    }

    /// Key of the sub-path made of the first `depth` segments
    #[must_use]
    pub fn prefix_key(&self, depth: usize) -> String {
        let depth = depth.min(self.segments.len());
        if depth == 0 {
            "/".to_string()
        } else {
            format!("/{}", self.segments[..depth].join("/"))
        }
    }

    /// Append a single name
    ///
    /// # Errors
    /// Returns error if `name` is empty, relative, or contains a separator
    pub fn join(&self, name: &str) -> Result<Self, DomainError> {
        validate_name(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Parent path (`None` for the root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Terminal segment (`None` for the root)
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl Display for VirtualPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

impl FromStr for VirtualPath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Validate a single object name as used by create/rename
///
/// # Errors
/// Returns error if the name is empty, `.`/`..`, or contains `/`
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(DomainError::InvalidName(format!(
            "'{name}' is not a valid object name"
        )));
    }
    Ok(())
}
