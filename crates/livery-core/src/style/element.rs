//! Element style definitions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    ResolvedElementStyle, StyleDefinition, StyleKind, StyleSet, Styles, clamp_percentage,
    deserialize_non_empty, deserialize_percentage, fill_field, mask_field, overlay_field,
};
use crate::{StyleError, color::Color, image};

/// The outline drawn for an element.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Box,
    RoundedBox,
    Circle,
    Ellipse,
    Hexagon,
    Diamond,
    Cylinder,
    Bucket,
    Pipe,
    Person,
    Robot,
    Folder,
    WebBrowser,
    Window,
    Terminal,
    Shell,
    MobileDevicePortrait,
    MobileDeviceLandscape,
    Component,
}

impl Shape {
    /// Every shape, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::Box,
        Self::RoundedBox,
        Self::Circle,
        Self::Ellipse,
        Self::Hexagon,
        Self::Diamond,
        Self::Cylinder,
        Self::Bucket,
        Self::Pipe,
        Self::Person,
        Self::Robot,
        Self::Folder,
        Self::WebBrowser,
        Self::Window,
        Self::Terminal,
        Self::Shell,
        Self::MobileDevicePortrait,
        Self::MobileDeviceLandscape,
        Self::Component,
    ];

    /// Returns the name used in theme documents.
    pub fn name(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::RoundedBox => "RoundedBox",
            Self::Circle => "Circle",
            Self::Ellipse => "Ellipse",
            Self::Hexagon => "Hexagon",
            Self::Diamond => "Diamond",
            Self::Cylinder => "Cylinder",
            Self::Bucket => "Bucket",
            Self::Pipe => "Pipe",
            Self::Person => "Person",
            Self::Robot => "Robot",
            Self::Folder => "Folder",
            Self::WebBrowser => "WebBrowser",
            Self::Window => "Window",
            Self::Terminal => "Terminal",
            Self::Shell => "Shell",
            Self::MobileDevicePortrait => "MobileDevicePortrait",
            Self::MobileDeviceLandscape => "MobileDeviceLandscape",
            Self::Component => "Component",
        }
    }
}

impl FromStr for Shape {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| StyleError::InvalidValue {
                property: "shape",
                value: s.to_string(),
                expected: "Box, RoundedBox, Circle, Ellipse, Hexagon, Diamond, Cylinder, Bucket, \
                           Pipe, Person, Robot, Folder, WebBrowser, Window, Terminal, Shell, \
                           MobileDevicePortrait, MobileDeviceLandscape, Component",
            })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The line style of an element's border.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Border {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl FromStr for Border {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Solid" => Ok(Self::Solid),
            "Dashed" => Ok(Self::Dashed),
            "Dotted" => Ok(Self::Dotted),
            _ => Err(StyleError::InvalidValue {
                property: "border",
                value: s.to_string(),
                expected: "Solid, Dashed, Dotted",
            }),
        }
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solid => f.write_str("Solid"),
            Self::Dashed => f.write_str("Dashed"),
            Self::Dotted => f.write_str("Dotted"),
        }
    }
}

/// Style definition for elements carrying a tag.
///
/// Every property is optional. Unset properties are skipped when definitions
/// are layered, and only receive defaults in [`resolve`](StyleDefinition::resolve).
///
/// # Examples
///
/// ```
/// use livery_core::color::Color;
/// use livery_core::style::{Border, ElementStyle, Shape, StyleDefinition};
///
/// let mut style = ElementStyle::new("Database")
///     .with_shape(Shape::Cylinder)
///     .with_background(Color::new("#1168bd").unwrap())
///     .with_border(Border::Dashed);
/// style.set_icon("https://example.com/db.png").unwrap();
///
/// assert!(style.set_icon("db.png").is_err());
/// assert_eq!(style.icon(), Some("https://example.com/db.png"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    shape: Option<Shape>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    background: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stroke: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    border: Option<Border>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_percentage"
    )]
    opacity: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<bool>,
}

impl ElementStyle {
    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    /// Returns the icon: an `http(s)` URL, a data URI, or, for styles read
    /// from a theme, a path relative to that theme.
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn stroke(&self) -> Option<Color> {
        self.stroke
    }

    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    pub fn border(&self) -> Option<Border> {
        self.border
    }

    pub fn opacity(&self) -> Option<u8> {
        self.opacity
    }

    pub fn metadata(&self) -> Option<bool> {
        self.metadata
    }

    pub fn description(&self) -> Option<bool> {
        self.description
    }

    pub fn set_shape(&mut self, shape: impl Into<Option<Shape>>) {
        self.shape = shape.into();
    }

    /// Sets the icon.
    ///
    /// An empty string clears the icon.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidImageReference`] unless the value is an
    /// `http(s)` URL or an image data URI. The icon is left unchanged.
    pub fn set_icon(&mut self, icon: &str) -> Result<(), StyleError> {
        if icon.trim().is_empty() {
            self.icon = None;
        } else {
            self.icon = Some(image::validate(icon)?);
        }
        Ok(())
    }

    pub fn clear_icon(&mut self) {
        self.icon = None;
    }

    /// Rewrites a relative icon against the URL of the theme that declares it.
    pub fn rebase_icon(&mut self, base_url: &str) {
        if let Some(icon) = &self.icon {
            self.icon = Some(image::absolutize(icon, base_url));
        }
    }

    pub fn set_width(&mut self, width: impl Into<Option<u32>>) {
        self.width = width.into();
    }

    pub fn set_height(&mut self, height: impl Into<Option<u32>>) {
        self.height = height.into();
    }

    pub fn set_background(&mut self, background: impl Into<Option<Color>>) {
        self.background = background.into();
    }

    pub fn set_color(&mut self, color: impl Into<Option<Color>>) {
        self.color = color.into();
    }

    pub fn set_stroke(&mut self, stroke: impl Into<Option<Color>>) {
        self.stroke = stroke.into();
    }

    pub fn set_font_size(&mut self, font_size: impl Into<Option<u32>>) {
        self.font_size = font_size.into();
    }

    pub fn set_border(&mut self, border: impl Into<Option<Border>>) {
        self.border = border.into();
    }

    /// Sets the opacity percentage, clamped to `0..=100`.
    pub fn set_opacity(&mut self, opacity: impl Into<Option<i64>>) {
        self.opacity = opacity.into().map(clamp_percentage);
    }

    pub fn set_metadata(&mut self, metadata: impl Into<Option<bool>>) {
        self.metadata = metadata.into();
    }

    pub fn set_description(&mut self, description: impl Into<Option<bool>>) {
        self.description = description.into();
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.set_shape(shape);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.set_width(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.set_height(height);
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.set_background(background);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    pub fn with_stroke(mut self, stroke: Color) -> Self {
        self.set_stroke(stroke);
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.set_font_size(font_size);
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.set_border(border);
        self
    }

    pub fn with_opacity(mut self, opacity: i64) -> Self {
        self.set_opacity(opacity);
        self
    }

    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.set_metadata(metadata);
        self
    }

    pub fn with_description(mut self, description: bool) -> Self {
        self.set_description(description);
        self
    }
}

impl StyleDefinition for ElementStyle {
    type Resolved = ResolvedElementStyle;

    const KIND: StyleKind = StyleKind::Element;

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
        overlay_field(&mut self.shape, &other.shape);
        overlay_field(&mut self.icon, &other.icon);
        overlay_field(&mut self.width, &other.width);
        overlay_field(&mut self.height, &other.height);
        overlay_field(&mut self.background, &other.background);
        overlay_field(&mut self.color, &other.color);
        overlay_field(&mut self.stroke, &other.stroke);
        overlay_field(&mut self.font_size, &other.font_size);
        overlay_field(&mut self.border, &other.border);
        overlay_field(&mut self.opacity, &other.opacity);
        overlay_field(&mut self.metadata, &other.metadata);
        overlay_field(&mut self.description, &other.description);
    }

    fn fill(&mut self, other: &Self) {
        fill_field(&mut self.shape, &other.shape);
        fill_field(&mut self.icon, &other.icon);
        fill_field(&mut self.width, &other.width);
        fill_field(&mut self.height, &other.height);
        fill_field(&mut self.background, &other.background);
        fill_field(&mut self.color, &other.color);
        fill_field(&mut self.stroke, &other.stroke);
        fill_field(&mut self.font_size, &other.font_size);
        fill_field(&mut self.border, &other.border);
        fill_field(&mut self.opacity, &other.opacity);
        fill_field(&mut self.metadata, &other.metadata);
        fill_field(&mut self.description, &other.description);
    }

    fn mask(&mut self, other: &Self) {
        mask_field(&mut self.shape, &other.shape);
        mask_field(&mut self.icon, &other.icon);
        mask_field(&mut self.width, &other.width);
        mask_field(&mut self.height, &other.height);
        mask_field(&mut self.background, &other.background);
        mask_field(&mut self.color, &other.color);
        mask_field(&mut self.stroke, &other.stroke);
        mask_field(&mut self.font_size, &other.font_size);
        mask_field(&mut self.border, &other.border);
        mask_field(&mut self.opacity, &other.opacity);
        mask_field(&mut self.metadata, &other.metadata);
        mask_field(&mut self.description, &other.description);
    }

    fn is_unset(&self) -> bool {
        self.shape.is_none()
            && self.icon.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.background.is_none()
            && self.color.is_none()
            && self.stroke.is_none()
            && self.font_size.is_none()
            && self.border.is_none()
            && self.opacity.is_none()
            && self.metadata.is_none()
            && self.description.is_none()
    }

    fn resolve(&self) -> ResolvedElementStyle {
        let defaults = ResolvedElementStyle::default();
        let background = self.background.unwrap_or(defaults.background);

        ResolvedElementStyle {
            shape: self.shape.unwrap_or(defaults.shape),
            icon: self.icon.clone(),
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            background,
            color: self.color.unwrap_or(defaults.color),
            stroke: self
                .stroke
                .unwrap_or_else(|| ResolvedElementStyle::default_stroke(background)),
            font_size: self.font_size.unwrap_or(defaults.font_size),
            border: self.border.unwrap_or(defaults.border),
            opacity: self.opacity.unwrap_or(defaults.opacity),
            metadata: self.metadata.unwrap_or(defaults.metadata),
            description: self.description.unwrap_or(defaults.description),
        }
    }

    fn select(styles: &Styles) -> &StyleSet<Self> {
        styles.elements()
    }

    fn select_mut(styles: &mut Styles) -> &mut StyleSet<Self> {
        &mut styles.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(value: &str) -> Color {
        Color::new(value).unwrap()
    }

    #[test]
    fn test_shape_from_str() {
        assert_eq!("RoundedBox".parse::<Shape>().unwrap(), Shape::RoundedBox);
        assert_eq!("MobileDeviceLandscape".parse::<Shape>().unwrap(), Shape::MobileDeviceLandscape);

        let err = "roundedbox".parse::<Shape>().unwrap_err();
        assert!(err.to_string().contains("invalid shape `roundedbox`"));
    }

    #[test]
    fn test_shape_names_round_trip() {
        for shape in Shape::ALL {
            assert_eq!(shape.to_string().parse::<Shape>().unwrap(), shape);
        }
    }

    #[test]
    fn test_border_from_str() {
        assert_eq!("Dotted".parse::<Border>().unwrap(), Border::Dotted);
        assert!("Wavy".parse::<Border>().is_err());
    }

    #[test]
    fn test_set_icon_validates() {
        let mut style = ElementStyle::new("Element");
        assert!(style.set_icon("data:image/png;base64,AAAA").is_ok());

        let err = style.set_icon("icon.png").unwrap_err();
        assert_eq!(err, StyleError::InvalidImageReference("icon.png".to_string()));
        assert_eq!(style.icon(), Some("data:image/png;base64,AAAA"));

        style.set_icon("").unwrap();
        assert_eq!(style.icon(), None);
    }

    #[test]
    fn test_opacity_is_clamped() {
        assert_eq!(ElementStyle::new("A").with_opacity(150).opacity(), Some(100));
        assert_eq!(ElementStyle::new("A").with_opacity(-1).opacity(), Some(0));
    }

    #[test]
    fn test_overlay_only_copies_set_fields() {
        let mut style = ElementStyle::new("Element")
            .with_shape(Shape::Box)
            .with_background(hex("#000000"))
            .with_color(hex("#ffffff"));
        style.overlay(&ElementStyle::new("Element").with_background(hex("#ff0000")));

        assert_eq!(style.shape(), Some(Shape::Box));
        assert_eq!(style.background(), Some(hex("#ff0000")));
        assert_eq!(style.color(), Some(hex("#ffffff")));
    }

    #[test]
    fn test_overlay_explicit_false_overrides() {
        let mut style = ElementStyle::new("Element").with_metadata(true);
        style.overlay(&ElementStyle::new("Element").with_metadata(false));
        assert_eq!(style.metadata(), Some(false));

        style.overlay(&ElementStyle::new("Element"));
        assert_eq!(style.metadata(), Some(false));
    }

    #[test]
    fn test_fill_keeps_existing_fields() {
        let mut style = ElementStyle::new("Element").with_shape(Shape::RoundedBox);
        style.fill(
            &ElementStyle::new("Element")
                .with_shape(Shape::Circle)
                .with_font_size(12),
        );

        assert_eq!(style.shape(), Some(Shape::RoundedBox));
        assert_eq!(style.font_size(), Some(12));
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = ElementStyle::new("Element").resolve();
        assert_eq!(resolved, ResolvedElementStyle::default());
        assert_eq!(resolved.shape, Shape::Box);
        assert_eq!(resolved.font_size, 24);
        assert_eq!(resolved.stroke.to_string(), "#9a9a9a");
    }

    #[test]
    fn test_resolve_derives_stroke_from_background() {
        let resolved = ElementStyle::new("Element")
            .with_background(hex("#ff0000"))
            .resolve();
        assert_eq!(resolved.stroke.to_string(), "#b20000");

        let resolved = ElementStyle::new("Element")
            .with_background(hex("#ff0000"))
            .with_stroke(hex("#00ff00"))
            .resolve();
        assert_eq!(resolved.stroke.to_string(), "#00ff00");
    }

    #[test]
    fn test_is_unset() {
        assert!(ElementStyle::new("Element").is_unset());
        assert!(!ElementStyle::new("Element").with_description(false).is_unset());
    }

    #[test]
    fn test_deserialize_theme_json() {
        let style: ElementStyle = serde_json::from_str(
            r##"{
                "tag": "Amazon Web Services - Lambda",
                "stroke": "#d86613",
                "color": "#D86613",
                "icon": "lambda.png",
                "shape": "RoundedBox",
                "opacity": 120,
                "description": false,
                "iconPosition": "Top"
            }"##,
        )
        .unwrap();

        assert_eq!(style.tag(), "Amazon Web Services - Lambda");
        assert_eq!(style.color(), Some(hex("#d86613")));
        assert_eq!(style.icon(), Some("lambda.png"));
        assert_eq!(style.shape(), Some(Shape::RoundedBox));
        assert_eq!(style.opacity(), Some(100));
        assert_eq!(style.description(), Some(false));
        assert_eq!(style.metadata(), None);
        assert_eq!(style.width(), None);
    }

    #[test]
    fn test_deserialize_rejects_invalid_enum() {
        let result = serde_json::from_str::<ElementStyle>(r#"{"tag": "A", "shape": "Blob"}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<ElementStyle>(r#"{"tag": "A", "border": "solid"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_empty_icon_is_unset() {
        let style: ElementStyle = serde_json::from_str(r#"{"tag": "A", "icon": ""}"#).unwrap();
        assert_eq!(style.icon(), None);
    }

    #[test]
    fn test_serialize_omits_unset() {
        let style = ElementStyle::new("Element").with_background(hex("#ff0000"));
        assert_eq!(
            serde_json::to_string(&style).unwrap(),
            r##"{"tag":"Element","background":"#ff0000"}"##
        );
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn color_strategy() -> impl Strategy<Value = Color> {
        any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Color::from_rgb(r, g, b))
    }

    fn element_style_strategy() -> impl Strategy<Value = ElementStyle> {
        (
            proptest::option::of(proptest::sample::select(Shape::ALL.to_vec())),
            proptest::option::of(1u32..2000),
            proptest::option::of(color_strategy()),
            proptest::option::of(color_strategy()),
            proptest::option::of(-50i64..150),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(shape, width, background, stroke, opacity, metadata)| {
                let mut style = ElementStyle::new("Element");
                style.set_shape(shape);
                style.set_width(width);
                style.set_background(background);
                style.set_stroke(stroke);
                style.set_opacity(opacity);
                style.set_metadata(metadata);
                style
            })
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Overlaying an unset definition changes nothing.
    fn check_overlay_unset_is_identity(style: ElementStyle) -> Result<(), TestCaseError> {
        let mut merged = style.clone();
        merged.overlay(&ElementStyle::new("Element"));
        prop_assert_eq!(merged, style);
        Ok(())
    }

    /// Every field the overlaid definition sets ends up in the result.
    fn check_overlay_set_fields_win(
        base: ElementStyle,
        top: ElementStyle,
    ) -> Result<(), TestCaseError> {
        let mut merged = base.clone();
        merged.overlay(&top);

        prop_assert_eq!(merged.shape(), top.shape().or(base.shape()));
        prop_assert_eq!(merged.width(), top.width().or(base.width()));
        prop_assert_eq!(merged.background(), top.background().or(base.background()));
        prop_assert_eq!(merged.opacity(), top.opacity().or(base.opacity()));
        prop_assert_eq!(merged.metadata(), top.metadata().or(base.metadata()));
        Ok(())
    }

    /// Filling from `other` equals overlaying self on top of `other`.
    fn check_fill_is_reverse_overlay(
        style: ElementStyle,
        other: ElementStyle,
    ) -> Result<(), TestCaseError> {
        let mut filled = style.clone();
        filled.fill(&other);

        let mut reversed = other.clone();
        reversed.overlay(&style);

        prop_assert_eq!(filled, reversed);
        Ok(())
    }

    /// Masking leaves only the fields `other` does not set.
    fn check_mask_then_overlay_is_overlay(
        style: ElementStyle,
        other: ElementStyle,
    ) -> Result<(), TestCaseError> {
        let mut masked = style.clone();
        masked.mask(&other);
        prop_assert!(masked.shape().is_none() || other.shape().is_none());
        prop_assert!(masked.background().is_none() || other.background().is_none());

        masked.overlay(&other);
        let mut overlaid = style;
        overlaid.overlay(&other);
        prop_assert_eq!(masked, overlaid);
        Ok(())
    }

    /// Resolution keeps every explicit value and stays within percentage bounds.
    fn check_resolve_keeps_explicit_values(style: ElementStyle) -> Result<(), TestCaseError> {
        let resolved = style.resolve();

        if let Some(shape) = style.shape() {
            prop_assert_eq!(resolved.shape, shape);
        }
        if let Some(stroke) = style.stroke() {
            prop_assert_eq!(resolved.stroke, stroke);
        }
        prop_assert!(resolved.opacity <= 100);
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn overlay_unset_is_identity(style in element_style_strategy()) {
            check_overlay_unset_is_identity(style)?;
        }

        #[test]
        fn overlay_set_fields_win(
            base in element_style_strategy(),
            top in element_style_strategy(),
        ) {
            check_overlay_set_fields_win(base, top)?;
        }

        #[test]
        fn fill_is_reverse_overlay(
            style in element_style_strategy(),
            other in element_style_strategy(),
        ) {
            check_fill_is_reverse_overlay(style, other)?;
        }

        #[test]
        fn mask_then_overlay_is_overlay(
            style in element_style_strategy(),
            other in element_style_strategy(),
        ) {
            check_mask_then_overlay_is_overlay(style, other)?;
        }

        #[test]
        fn resolve_keeps_explicit_values(style in element_style_strategy()) {
            check_resolve_keeps_explicit_values(style)?;
        }
    }
}
