//! Relationship style definitions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    ResolvedRelationshipStyle, StyleDefinition, StyleKind, StyleSet, Styles, clamp_percentage,
    deserialize_percentage, fill_field, mask_field, overlay_field,
};
use crate::{StyleError, color::Color};

/// How a relationship line is routed between its endpoints.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Routing {
    #[default]
    Direct,
    Curved,
    Orthogonal,
}

impl FromStr for Routing {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Direct" => Ok(Self::Direct),
            "Curved" => Ok(Self::Curved),
            "Orthogonal" => Ok(Self::Orthogonal),
            _ => Err(StyleError::InvalidValue {
                property: "routing",
                value: s.to_string(),
                expected: "Direct, Curved, Orthogonal",
            }),
        }
    }
}

impl fmt::Display for Routing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("Direct"),
            Self::Curved => f.write_str("Curved"),
            Self::Orthogonal => f.write_str("Orthogonal"),
        }
    }
}

/// Style definition for relationships carrying a tag.
///
/// `dashed` is a tri-state: `Some(false)` overrides an inherited dashed line,
/// `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipStyle {
    tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    thickness: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    dashed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    routing: Option<Routing>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_percentage"
    )]
    position: Option<u8>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_percentage"
    )]
    opacity: Option<u8>,
}

impl RelationshipStyle {
    pub fn thickness(&self) -> Option<u32> {
        self.thickness
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn dashed(&self) -> Option<bool> {
        self.dashed
    }

    pub fn routing(&self) -> Option<Routing> {
        self.routing
    }

    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Returns the position of the description along the line, as a percentage.
    pub fn position(&self) -> Option<u8> {
        self.position
    }

    pub fn opacity(&self) -> Option<u8> {
        self.opacity
    }

    pub fn set_thickness(&mut self, thickness: impl Into<Option<u32>>) {
        self.thickness = thickness.into();
    }

    pub fn set_color(&mut self, color: impl Into<Option<Color>>) {
        self.color = color.into();
    }

    pub fn set_dashed(&mut self, dashed: impl Into<Option<bool>>) {
        self.dashed = dashed.into();
    }

    pub fn set_routing(&mut self, routing: impl Into<Option<Routing>>) {
        self.routing = routing.into();
    }

    pub fn set_font_size(&mut self, font_size: impl Into<Option<u32>>) {
        self.font_size = font_size.into();
    }

    pub fn set_width(&mut self, width: impl Into<Option<u32>>) {
        self.width = width.into();
    }

    /// Sets the description position, clamped to `0..=100`.
    pub fn set_position(&mut self, position: impl Into<Option<i64>>) {
        self.position = position.into().map(clamp_percentage);
    }

    /// Sets the opacity percentage, clamped to `0..=100`.
    pub fn set_opacity(&mut self, opacity: impl Into<Option<i64>>) {
        self.opacity = opacity.into().map(clamp_percentage);
    }

    pub fn with_thickness(mut self, thickness: u32) -> Self {
        self.set_thickness(thickness);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    pub fn with_dashed(mut self, dashed: bool) -> Self {
        self.set_dashed(dashed);
        self
    }

    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.set_routing(routing);
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.set_font_size(font_size);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.set_width(width);
        self
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_opacity(mut self, opacity: i64) -> Self {
        self.set_opacity(opacity);
        self
    }
}

impl StyleDefinition for RelationshipStyle {
    type Resolved = ResolvedRelationshipStyle;

    const KIND: StyleKind = StyleKind::Relationship;

    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn overlay(&mut self, other: &Self) {
        overlay_field(&mut self.thickness, &other.thickness);
        overlay_field(&mut self.color, &other.color);
        overlay_field(&mut self.dashed, &other.dashed);
        overlay_field(&mut self.routing, &other.routing);
        overlay_field(&mut self.font_size, &other.font_size);
        overlay_field(&mut self.width, &other.width);
        overlay_field(&mut self.position, &other.position);
        overlay_field(&mut self.opacity, &other.opacity);
    }

    fn fill(&mut self, other: &Self) {
        fill_field(&mut self.thickness, &other.thickness);
        fill_field(&mut self.color, &other.color);
        fill_field(&mut self.dashed, &other.dashed);
        fill_field(&mut self.routing, &other.routing);
        fill_field(&mut self.font_size, &other.font_size);
        fill_field(&mut self.width, &other.width);
        fill_field(&mut self.position, &other.position);
        fill_field(&mut self.opacity, &other.opacity);
    }

    fn mask(&mut self, other: &Self) {
        mask_field(&mut self.thickness, &other.thickness);
        mask_field(&mut self.color, &other.color);
        mask_field(&mut self.dashed, &other.dashed);
        mask_field(&mut self.routing, &other.routing);
        mask_field(&mut self.font_size, &other.font_size);
        mask_field(&mut self.width, &other.width);
        mask_field(&mut self.position, &other.position);
        mask_field(&mut self.opacity, &other.opacity);
    }

    fn is_unset(&self) -> bool {
        self.thickness.is_none()
            && self.color.is_none()
            && self.dashed.is_none()
            && self.routing.is_none()
            && self.font_size.is_none()
            && self.width.is_none()
            && self.position.is_none()
            && self.opacity.is_none()
    }

    fn resolve(&self) -> ResolvedRelationshipStyle {
        let defaults = ResolvedRelationshipStyle::default();

        ResolvedRelationshipStyle {
            thickness: self.thickness.unwrap_or(defaults.thickness),
            color: self.color.unwrap_or(defaults.color),
            dashed: self.dashed.unwrap_or(defaults.dashed),
            routing: self.routing.unwrap_or(defaults.routing),
            font_size: self.font_size.unwrap_or(defaults.font_size),
            width: self.width.unwrap_or(defaults.width),
            position: self.position.unwrap_or(defaults.position),
            opacity: self.opacity.unwrap_or(defaults.opacity),
        }
    }

    fn select(styles: &Styles) -> &StyleSet<Self> {
        styles.relationships()
    }

    fn select_mut(styles: &mut Styles) -> &mut StyleSet<Self> {
        &mut styles.relationships
    }
}
