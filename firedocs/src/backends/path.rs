//! Validated locations in the tree store and the document store

use crate::error::{FiredocsError, Result};
use std::fmt;

/// Characters the Realtime Database refuses in keys
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']'];

/// Longest id Firestore accepts, in bytes
const MAX_DOCUMENT_ID_BYTES: usize = 1500;

/// A slash-delimited location in the tree store
///
/// Leading, trailing and repeated slashes are ignored, so `"/users//123/"`
/// and `"users/123"` name the same location. The empty path is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DatabasePath {
    segments: Vec<String>,
}

impl DatabasePath {
    /// The root of the tree
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse and validate a path
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for segment in raw.split('/').filter(|s| !s.is_empty()) {
            if let Some(bad) = segment
                .chars()
                .find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_control())
            {
                return Err(FiredocsError::invalid_arguments(format!(
                    "path '{raw}' contains '{}' in segment '{segment}'; keys may not contain . $ # [ ] or control characters",
                    bad.escape_default()
                )));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Path segments from the root down
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// This path extended by a relative path
    pub fn join(&self, relative: &DatabasePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.segments.join("/"))
        }
    }
}

/// A Firestore collection, either at the root (`users`) or nested under a
/// document (`users/alice/posts`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// Parse and validate a collection path
    pub fn parse(raw: &str) -> Result<Self> {
        let segments: Vec<String> = raw
            .trim_matches('/')
            .split('/')
            .map(str::to_string)
            .collect();

        if segments.iter().any(|s| s.is_empty()) {
            return Err(FiredocsError::invalid_arguments(format!(
                "collection '{raw}' must be a non-empty path without empty segments"
            )));
        }
        if segments.len() % 2 == 0 {
            return Err(FiredocsError::invalid_arguments(format!(
                "'{raw}' names a document, not a collection"
            )));
        }
        for segment in &segments {
            validate_id(segment, "collection id")?;
        }
        Ok(Self { segments })
    }

    /// Path segments from the root down
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Check a Firestore document id
pub fn validate_document_id(id: &str) -> Result<()> {
    if id.contains('/') {
        return Err(FiredocsError::invalid_arguments(format!(
            "document id '{id}' may not contain '/'"
        )));
    }
    validate_id(id, "document id")
}

fn validate_id(id: &str, what: &str) -> Result<()> {
    if id.is_empty() {
        return Err(FiredocsError::invalid_arguments(format!("{what} may not be empty")));
    }
    if id == "." || id == ".." {
        return Err(FiredocsError::invalid_arguments(format!(
            "{what} may not be '.' or '..'"
        )));
    }
    if id.starts_with("__") && id.ends_with("__") && id.len() >= 4 {
        return Err(FiredocsError::invalid_arguments(format!(
            "{what} '{id}' is reserved"
        )));
    }
    if id.len() > MAX_DOCUMENT_ID_BYTES {
        return Err(FiredocsError::invalid_arguments(format!(
            "{what} is longer than {MAX_DOCUMENT_ID_BYTES} bytes"
        )));
    }
    Ok(())
}
