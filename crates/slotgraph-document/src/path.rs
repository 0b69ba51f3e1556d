//! Slot paths for addressing values inside documents
//!
//! Provides [`SlotPath`], the dot-joined address (`kind.slotName`) of a slot
//! value within an instance document.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Dotted path within a document
///
/// Slot paths are rooted at a kind, so the first segment names the group
/// (`children`) and the last names the slot (`frame`). Segments may hold any
/// character except `.` and must not be empty.
///
/// # Examples
/// - `["children", "frame"]` → `children.frame`
/// - `["attachments", "handles"]` → `attachments.handles`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotPath(Vec<String>);

impl SlotPath {
    /// Path of `slot` inside the `kind` group
    #[inline]
    #[must_use]
    pub fn slot(kind: impl Into<String>, slot: impl Into<String>) -> Self {
        Self(vec![kind.into(), slot.into()])
    }

    /// Build from pre-validated segments
    #[inline]
    #[must_use]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root path
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Kind the path is rooted at
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Leaf slot name
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning a new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.push(segment.into());
        next
    }

    /// Iterator over segments from kind to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for SlotPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for SlotPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(segments))
    }
}

impl Serialize for SlotPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors related to slot paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path has no segments
    #[error("slot path is empty")]
    Empty,

    /// Empty segment in path
    #[error("slot path '{0}' contains an empty segment")]
    EmptySegment(String),
}
