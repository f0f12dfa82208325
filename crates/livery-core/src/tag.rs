//! Tags: the selectors that tie model entities to styles.
//!
//! An entity carries a [`TagSet`], an ordered sequence without duplicates.
//! Order matters: later tags are more specific and win over earlier ones when
//! styles are resolved. Tags compare by exact, case-sensitive string equality.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered, deduplicated sequence of tags.
///
/// Serialized as a comma-separated string, the way workspace documents store
/// tags (`"Element,Software System"`).
///
/// # Examples
///
/// ```
/// use livery_core::tag::TagSet;
///
/// let mut tags = TagSet::parse("Element, Software System");
/// assert!(!tags.add("Element"));
/// assert!(tags.add("Database"));
/// assert_eq!(tags.to_string(), "Element,Software System,Database");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of tags.
    ///
    /// Whitespace around each tag is trimmed, empty entries are dropped and
    /// repeated tags keep their first position.
    pub fn parse(tags: &str) -> Self {
        tags.split(',').collect()
    }

    /// Appends a tag unless it is empty or already present.
    ///
    /// Returns `true` if the tag was added.
    pub fn add(&mut self, tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Returns `true` if the tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Iterates over the tags, least specific first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Self::new();
        for tag in iter {
            tags.add(tag);
        }
        tags
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

impl Serialize for TagSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TagSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tags = String::deserialize(deserializer)?;
        Ok(Self::parse(&tags))
    }
}
