//! Field paths used throughout the docmeta core.
//!
//! A path is an ordered list of segments rendered as `a.b.3.c`. Numeric
//! segments address array elements; `*` matches any single segment.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Wildcard segment. Matches exactly one segment, including array indexes.
pub const ANY: &str = "*";

/// An addressable location inside a document or field tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path, which addresses the document root.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a dot-separated path. The empty string yields the root path.
    pub fn parse(s: &str) -> crate::Result<Self> {
        if s.is_empty() {
            return Ok(Self::empty());
        }
        let mut segments = Vec::new();
        for segment in s.split('.') {
            if segment.is_empty() {
                return Err(crate::Error::EmptySegment(s.to_string()));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Builds a path from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.iter().any(String::is_empty) {
            return Err(crate::Error::EmptySegment(segments.join(".")));
        }
        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segment at `i`.
    #[must_use]
    pub fn head(&self, i: usize) -> Option<&str> {
        self.segments.get(i).map(String::as_str)
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns the array index stored at segment `i`, if that segment is numeric.
    #[must_use]
    pub fn index_at(&self, i: usize) -> Option<usize> {
        self.head(i).and_then(|s| s.parse().ok())
    }

    #[must_use]
    pub fn is_index(&self, i: usize) -> bool {
        self.index_at(i).is_some()
    }

    /// True if any segment is the [`ANY`] wildcard.
    #[must_use]
    pub fn has_wildcards(&self) -> bool {
        self.segments.iter().any(|s| s == ANY)
    }

    /// The first `n` segments (clamped to the path length).
    #[must_use]
    pub fn prefix(&self, n: usize) -> Self {
        Self {
            segments: self.segments[..n.min(self.len())].to_vec(),
        }
    }

    /// Everything after the first `n` segments.
    #[must_use]
    pub fn suffix(&self, n: usize) -> Self {
        Self {
            segments: self.segments[n.min(self.len())..].to_vec(),
        }
    }

    /// Appends `other` to this path.
    #[must_use]
    pub fn join(&self, other: &Path) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Appends a single segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// The path with its last segment removed. The root has no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self.prefix(self.len() - 1))
        }
    }

    /// Same length, and every segment matches the pattern's segment.
    #[must_use]
    pub fn matches(&self, pattern: &Path) -> bool {
        self.len() == pattern.len() && self.matches_first(pattern, self.len())
    }

    /// True if this path addresses `pattern` itself or one of its ancestors.
    #[must_use]
    pub fn matching_prefix(&self, pattern: &Path) -> bool {
        self.len() <= pattern.len() && self.matches_first(pattern, self.len())
    }

    /// True if this path addresses something strictly beneath `pattern`.
    #[must_use]
    pub fn matching_descendant(&self, pattern: &Path) -> bool {
        self.len() > pattern.len() && self.matches_first(pattern, pattern.len())
    }

    fn matches_first(&self, pattern: &Path, n: usize) -> bool {
        self.segments[..n]
            .iter()
            .zip(&pattern.segments[..n])
            .all(|(s, p)| segment_matches(s, p))
    }
}

fn segment_matches(segment: &str, pattern: &str) -> bool {
    segment == pattern || segment == ANY || pattern == ANY
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for Path {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
