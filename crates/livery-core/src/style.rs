//! Style definitions.
//!
//! This module provides the tri-state style types that themes and workspaces
//! declare, the collections that hold them, and the resolved styles that a
//! renderer consumes.
//!
//! # Overview
//!
//! - [`ElementStyle`] and [`RelationshipStyle`]: one definition per tag. Every
//!   property except the tag is optional, and "unset" is never confused with a
//!   falsy value: `dashed: Some(false)` overrides, `dashed: None` does not.
//! - [`StyleDefinition`]: the behavior both definition types share, which lets
//!   the cascade be written once.
//! - [`StyleSet`] and [`Styles`]: tag-keyed collections, at most one definition
//!   per tag, in insertion order.
//! - [`ResolvedElementStyle`], [`ResolvedRelationshipStyle`] and
//!   [`ResolvedStyle`]: fully-populated results with every default applied.
//!
//! # Example
//!
//! ```
//! use livery_core::style::{ElementStyle, Shape, StyleDefinition};
//!
//! let mut merged = ElementStyle::new("Element").with_shape(Shape::Box).with_font_size(20);
//! merged.overlay(&ElementStyle::new("Element").with_shape(Shape::RoundedBox));
//!
//! assert_eq!(merged.shape(), Some(Shape::RoundedBox));
//! assert_eq!(merged.font_size(), Some(20));
//! assert_eq!(merged.resolve().opacity, 100);
//! ```

mod element;
mod relationship;
mod resolved;

pub use element::{Border, ElementStyle, Shape};
pub use relationship::{RelationshipStyle, Routing};
pub use resolved::{ResolvedElementStyle, ResolvedRelationshipStyle, ResolvedStyle};

use std::fmt;

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The kind of entity a style applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    Element,
    Relationship,
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => write!(f, "element"),
            Self::Relationship => write!(f, "relationship"),
        }
    }
}

/// Behavior shared by [`ElementStyle`] and [`RelationshipStyle`].
pub trait StyleDefinition: Clone + fmt::Debug {
    /// The fully-populated style produced by [`resolve`](Self::resolve).
    type Resolved;

    /// The entity kind this definition styles.
    const KIND: StyleKind;

    /// Creates a definition for `tag` with every property unset.
    fn new(tag: impl Into<String>) -> Self;

    /// Returns the tag this definition selects.
    fn tag(&self) -> &str;

    /// Copies every property that `other` explicitly sets, leaving the rest.
    fn overlay(&mut self, other: &Self);

    /// Copies properties from `other` only where this definition is unset.
    fn fill(&mut self, other: &Self);

    /// Unsets every property that `other` explicitly sets.
    fn mask(&mut self, other: &Self);

    /// Returns `true` if no property besides the tag is set.
    fn is_unset(&self) -> bool;

    /// Applies the kind defaults to every unset property.
    fn resolve(&self) -> Self::Resolved;

    /// Selects the collection of this kind from a [`Styles`] pair.
    fn select(styles: &Styles) -> &StyleSet<Self>;

    /// Selects the mutable collection of this kind from a [`Styles`] pair.
    fn select_mut(styles: &mut Styles) -> &mut StyleSet<Self>;
}

/// Tag-keyed style definitions of one kind.
///
/// Holds at most one definition per tag and keeps insertion order. Building a
/// set from a sequence that repeats a tag keeps the last definition, in the
/// position of the first.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSet<S> {
    styles: IndexMap<String, S>,
}

impl<S> Default for StyleSet<S> {
    fn default() -> Self {
        Self {
            styles: IndexMap::new(),
        }
    }
}

impl<S: StyleDefinition> StyleSet<S> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the definition for exactly `tag`.
    pub fn get(&self, tag: &str) -> Option<&S> {
        self.styles.get(tag)
    }

    pub fn get_mut(&mut self, tag: &str) -> Option<&mut S> {
        self.styles.get_mut(tag)
    }

    /// Returns the definition for `tag`, adding an unset one if missing.
    pub fn get_or_insert(&mut self, tag: &str) -> &mut S {
        self.styles
            .entry(tag.to_string())
            .or_insert_with(|| S::new(tag))
    }

    /// Inserts a definition, returning the one it replaced.
    pub fn insert(&mut self, style: S) -> Option<S> {
        self.styles.insert(style.tag().to_string(), style)
    }

    pub fn remove(&mut self, tag: &str) -> Option<S> {
        self.styles.shift_remove(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.styles.contains_key(tag)
    }

    /// Iterates over the definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.styles.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut S> {
        self.styles.values_mut()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl<S: StyleDefinition> FromIterator<S> for StyleSet<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for style in iter {
            let tag = style.tag().to_string();
            if set.insert(style).is_some() {
                let kind = S::KIND.to_string();
                warn!(kind, tag; "Style defined more than once for the same tag, keeping the last definition");
            }
        }
        set
    }
}

impl<S: StyleDefinition + Serialize> Serialize for StyleSet<S> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        serializer.collect_seq(self.styles.values())
    }
}

impl<'de, S: StyleDefinition + Deserialize<'de>> Deserialize<'de> for StyleSet<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let styles = Vec::<S>::deserialize(deserializer)?;
        if styles.iter().any(|style| style.tag().trim().is_empty()) {
            return Err(serde::de::Error::custom(format!(
                "{} style with an empty tag",
                S::KIND
            )));
        }
        Ok(styles.into_iter().collect())
    }
}

/// Element and relationship definitions together.
///
/// This is the shape of a workspace's local styles and of the style part of a
/// theme document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Styles {
    #[serde(default, skip_serializing_if = "StyleSet::is_empty")]
    elements: StyleSet<ElementStyle>,

    #[serde(default, skip_serializing_if = "StyleSet::is_empty")]
    relationships: StyleSet<RelationshipStyle>,
}

impl Styles {
    /// Creates a pair from existing sets.
    pub fn new(
        elements: StyleSet<ElementStyle>,
        relationships: StyleSet<RelationshipStyle>,
    ) -> Self {
        Self {
            elements,
            relationships,
        }
    }

    pub fn elements(&self) -> &StyleSet<ElementStyle> {
        &self.elements
    }

    pub fn relationships(&self) -> &StyleSet<RelationshipStyle> {
        &self.relationships
    }

    /// Returns the element style for exactly `tag`.
    pub fn element_style(&self, tag: &str) -> Option<&ElementStyle> {
        self.elements.get(tag)
    }

    /// Returns the element style for `tag`, creating an unset one if missing.
    pub fn add_element_style(&mut self, tag: &str) -> &mut ElementStyle {
        self.elements.get_or_insert(tag)
    }

    /// Returns the relationship style for exactly `tag`.
    pub fn relationship_style(&self, tag: &str) -> Option<&RelationshipStyle> {
        self.relationships.get(tag)
    }

    /// Returns the relationship style for `tag`, creating an unset one if missing.
    pub fn add_relationship_style(&mut self, tag: &str) -> &mut RelationshipStyle {
        self.relationships.get_or_insert(tag)
    }

    /// Returns the definition of kind `S` for exactly `tag`.
    pub fn get<S: StyleDefinition>(&self, tag: &str) -> Option<&S> {
        S::select(self).get(tag)
    }

    /// Returns the set of kind `S`.
    pub fn set<S: StyleDefinition>(&self) -> &StyleSet<S> {
        S::select(self)
    }

    /// Returns the mutable set of kind `S`.
    pub fn set_mut<S: StyleDefinition>(&mut self) -> &mut StyleSet<S> {
        S::select_mut(self)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.relationships.is_empty()
    }
}

/// Copies `source` into `target` if `source` is set.
pub(crate) fn overlay_field<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if source.is_some() {
        target.clone_from(source);
    }
}

/// Copies `source` into `target` if `target` is unset.
pub(crate) fn fill_field<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if target.is_none() {
        target.clone_from(source);
    }
}

/// Unsets `target` if `source` is set.
pub(crate) fn mask_field<T>(target: &mut Option<T>, source: &Option<T>) {
    if source.is_some() {
        *target = None;
    }
}

/// Clamps a percentage-valued property to `0..=100`.
pub(crate) fn clamp_percentage(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Reads an optional percentage, clamping out-of-range numbers.
pub(crate) fn deserialize_percentage<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.map(clamp_percentage))
}

/// Reads an optional string, treating an empty or blank string as unset.
pub fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_style_set_get_or_insert() {
        let mut set = StyleSet::<ElementStyle>::new();
        set.get_or_insert("Element").set_font_size(30);
        set.get_or_insert("Element").set_shape(Shape::Circle);

        assert_eq!(set.len(), 1);
        let style = set.get("Element").unwrap();
        assert_eq!(style.font_size(), Some(30));
        assert_eq!(style.shape(), Some(Shape::Circle));
    }

    #[test]
    fn test_style_set_duplicate_tags_keep_last() {
        let set: StyleSet<ElementStyle> = [
            ElementStyle::new("A").with_font_size(10),
            ElementStyle::new("B"),
            ElementStyle::new("A").with_font_size(20),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("A").unwrap().font_size(), Some(20));
        assert_eq!(set.iter().map(|s| s.tag()).collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_style_set_rejects_empty_tag() {
        let result = serde_json::from_str::<StyleSet<ElementStyle>>(r#"[{"tag": " "}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_styles_serde_skips_empty_sets() {
        let mut styles = Styles::default();
        assert_eq!(serde_json::to_string(&styles).unwrap(), "{}");

        styles
            .add_relationship_style("Relationship")
            .set_color(Color::new("#ff0000").unwrap());
        assert_eq!(
            serde_json::to_string(&styles).unwrap(),
            r##"{"relationships":[{"tag":"Relationship","color":"#ff0000"}]}"##
        );
    }

    #[test]
    fn test_styles_generic_access() {
        let mut styles = Styles::default();
        styles.add_element_style("Database").set_shape(Shape::Cylinder);
        styles.set_mut::<RelationshipStyle>().get_or_insert("Async").set_dashed(true);

        assert_eq!(
            styles.get::<ElementStyle>("Database").and_then(|s| s.shape()),
            Some(Shape::Cylinder)
        );
        assert_eq!(styles.relationship_style("Async").and_then(|s| s.dashed()), Some(true));
        assert!(styles.get::<RelationshipStyle>("Database").is_none());
        assert!(!styles.is_empty());
    }

    #[test]
    fn test_clamp_percentage() {
        assert_eq!(clamp_percentage(-5), 0);
        assert_eq!(clamp_percentage(42), 42);
        assert_eq!(clamp_percentage(250), 100);
    }
}
