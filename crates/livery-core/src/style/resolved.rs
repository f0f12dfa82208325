//! Fully-populated styles, the output of resolution.

use serde::Serialize;

use super::{Border, Routing, Shape};
use crate::color::Color;

/// An element style with every property set.
///
/// [`Default`] yields the element defaults applied when no layer sets a
/// property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedElementStyle {
    pub shape: Shape,
    /// Icons have no default; `None` means no icon is drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub color: Color,
    pub stroke: Color,
    pub font_size: u32,
    pub border: Border,
    pub opacity: u8,
    pub metadata: bool,
    pub description: bool,
}

impl ResolvedElementStyle {
    /// Returns the stroke used when none is set: the background darkened by 30%.
    pub fn default_stroke(background: Color) -> Color {
        background.darker(0.3)
    }
}

impl Default for ResolvedElementStyle {
    fn default() -> Self {
        let background = Color::from_rgb(0xdd, 0xdd, 0xdd);
        Self {
            shape: Shape::Box,
            icon: None,
            width: 450,
            height: 300,
            background,
            color: Color::from_rgb(0x00, 0x00, 0x00),
            stroke: Self::default_stroke(background),
            font_size: 24,
            border: Border::Solid,
            opacity: 100,
            metadata: true,
            description: true,
        }
    }
}

/// A relationship style with every property set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRelationshipStyle {
    pub thickness: u32,
    pub color: Color,
    pub dashed: bool,
    pub routing: Routing,
    pub font_size: u32,
    pub width: u32,
    pub position: u8,
    pub opacity: u8,
}

impl Default for ResolvedRelationshipStyle {
    fn default() -> Self {
        Self {
            thickness: 2,
            color: Color::from_rgb(0x70, 0x70, 0x70),
            dashed: true,
            routing: Routing::Direct,
            font_size: 24,
            width: 200,
            position: 50,
            opacity: 100,
        }
    }
}

/// The resolved style of either kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedStyle {
    Element(ResolvedElementStyle),
    Relationship(ResolvedRelationshipStyle),
}

impl ResolvedStyle {
    pub fn as_element(&self) -> Option<&ResolvedElementStyle> {
        match self {
            Self::Element(style) => Some(style),
            Self::Relationship(_) => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&ResolvedRelationshipStyle> {
        match self {
            Self::Relationship(style) => Some(style),
            Self::Element(_) => None,
        }
    }
}

impl From<ResolvedElementStyle> for ResolvedStyle {
    fn from(style: ResolvedElementStyle) -> Self {
        Self::Element(style)
    }
}

impl From<ResolvedRelationshipStyle> for ResolvedStyle {
    fn from(style: ResolvedRelationshipStyle) -> Self {
        Self::Relationship(style)
    }
}
