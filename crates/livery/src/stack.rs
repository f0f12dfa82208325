//! The ordered stack of style layers and the cascade over it.
//!
//! # Overview
//!
//! A [`StyleStack`] holds, in order of increasing precedence:
//!
//! 1. the built-in layer with the engine's own tag defaults,
//! 2. one layer per loaded theme, in the order the themes were added,
//! 3. an optional local layer with the workspace's own styles.
//!
//! Resolution is a pure fold. For each tag of the entity, least specific
//! first, every layer that defines that exact tag overlays the properties it
//! sets onto the result. Kind defaults fill whatever is still unset, once, at
//! the end. So a later tag beats an earlier one, within one tag a later layer
//! beats an earlier one, and an unset property never erases a set one.
//!
//! # Example
//!
//! ```
//! use livery::stack::StyleStack;
//! use livery_core::{
//!     style::{Shape, Styles},
//!     tag::TagSet,
//! };
//!
//! let mut local = Styles::default();
//! local.add_element_style("Database").set_shape(Shape::Cylinder);
//!
//! let mut stack = StyleStack::new();
//! stack.set_local(local);
//!
//! let style = stack.resolve_element(&TagSet::parse("Element,Database"));
//! assert_eq!(style.shape, Shape::Cylinder);
//! assert_eq!(style.width, 450);
//! ```

use std::{fmt, sync::Arc};

use log::trace;

use livery_core::{
    style::{
        ElementStyle, RelationshipStyle, ResolvedElementStyle, ResolvedRelationshipStyle,
        ResolvedStyle, Shape, StyleDefinition, StyleKind, Styles,
    },
    tag::TagSet,
};

use crate::theme::{LoadedTheme, ThemeDocument};

/// Where a layer's styles come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerSource {
    BuiltIn,
    /// A theme, identified by its reference.
    Theme(String),
    Local,
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn => write!(f, "built-in"),
            Self::Theme(reference) => write!(f, "theme `{reference}`"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// One immutable set of style definitions in a [`StyleStack`].
#[derive(Debug, Clone)]
pub struct StyleLayer {
    source: LayerSource,
    document: Arc<ThemeDocument>,
}

impl StyleLayer {
    pub fn new(source: LayerSource, document: Arc<ThemeDocument>) -> Self {
        Self { source, document }
    }

    pub fn source(&self) -> &LayerSource {
        &self.source
    }

    pub fn styles(&self) -> &Styles {
        self.document.styles()
    }

    fn definition<S: StyleDefinition>(&self, tag: &str) -> Option<&S> {
        self.styles().get::<S>(tag)
    }
}

/// Style layers in order of increasing precedence.
#[derive(Debug, Clone)]
pub struct StyleStack {
    built_in: StyleLayer,
    themes: Vec<StyleLayer>,
    local: Option<StyleLayer>,
}

impl Default for StyleStack {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleStack {
    /// Creates a stack holding only the built-in layer.
    pub fn new() -> Self {
        Self::with_built_in(built_in_styles())
    }

    /// Creates a stack with a custom built-in layer.
    pub fn with_built_in(styles: Styles) -> Self {
        Self {
            built_in: StyleLayer::new(LayerSource::BuiltIn, Arc::new(ThemeDocument::new(styles))),
            themes: Vec::new(),
            local: None,
        }
    }

    /// Adds a theme layer above the existing themes.
    ///
    /// Adding a reference that is already present does nothing and returns
    /// `false`.
    pub fn push_theme(&mut self, reference: &str, document: Arc<ThemeDocument>) -> bool {
        if self.contains_theme(reference) {
            return false;
        }
        self.themes.push(StyleLayer::new(
            LayerSource::Theme(reference.to_string()),
            document,
        ));
        true
    }

    /// Adds a loaded theme as a layer, see [`push_theme`](Self::push_theme).
    pub fn push_loaded(&mut self, theme: &LoadedTheme) -> bool {
        self.push_theme(theme.reference(), theme.shared_document())
    }

    pub fn contains_theme(&self, reference: &str) -> bool {
        self.themes
            .iter()
            .any(|layer| matches!(&layer.source, LayerSource::Theme(r) if r == reference))
    }

    /// Sets the local layer, replacing any previous one.
    ///
    /// The local layer is always evaluated last, whenever it was set.
    pub fn set_local(&mut self, styles: Styles) {
        self.local = Some(StyleLayer::new(
            LayerSource::Local,
            Arc::new(ThemeDocument::new(styles)),
        ));
    }

    pub fn clear_local(&mut self) {
        self.local = None;
    }

    /// Iterates over the layers in evaluation order.
    pub fn layers(&self) -> impl Iterator<Item = &StyleLayer> {
        std::iter::once(&self.built_in)
            .chain(self.themes.iter())
            .chain(self.local.iter())
    }

    /// Returns the theme references in stack order.
    pub fn theme_references(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().filter_map(|layer| match &layer.source {
            LayerSource::Theme(reference) => Some(reference.as_str()),
            _ => None,
        })
    }

    /// Merges every definition that applies to `tags` without applying
    /// defaults.
    ///
    /// The returned definition carries the joined tags as its tag and leaves
    /// unset every property no layer sets.
    pub fn cascade<S: StyleDefinition>(&self, tags: &TagSet) -> S {
        tags.iter().fold(S::new(tags.to_string()), |mut merged, tag| {
            for layer in self.layers() {
                if let Some(definition) = layer.definition::<S>(tag) {
                    trace!(kind = S::KIND.to_string(), tag, layer = layer.source.to_string(); "Applying style");
                    merged.overlay(definition);
                }
            }
            merged
        })
    }

    /// Resolves the style of kind `S` for `tags`, with defaults applied.
    pub fn resolve_as<S: StyleDefinition>(&self, tags: &TagSet) -> S::Resolved {
        self.cascade::<S>(tags).resolve()
    }

    pub fn resolve_element(&self, tags: &TagSet) -> ResolvedElementStyle {
        self.resolve_as::<ElementStyle>(tags)
    }

    pub fn resolve_relationship(&self, tags: &TagSet) -> ResolvedRelationshipStyle {
        self.resolve_as::<RelationshipStyle>(tags)
    }

    /// Resolves the style of an entity of `kind` carrying `tags`.
    ///
    /// Never fails: tags no layer defines resolve to the kind defaults.
    pub fn resolve(&self, kind: StyleKind, tags: &TagSet) -> ResolvedStyle {
        match kind {
            StyleKind::Element => self.resolve_element(tags).into(),
            StyleKind::Relationship => self.resolve_relationship(tags).into(),
        }
    }
}

/// The engine's own tag defaults.
fn built_in_styles() -> Styles {
    let mut styles = Styles::default();
    styles.add_element_style("Person").set_shape(Shape::Person);
    styles
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use livery_core::{color::Color, style::Border};

    use super::*;

    // ===================
    // Strategies
    // ===================

    const TAG_POOL: &[&str] = &["Element", "Container", "Database", "Queue", "External"];

    fn tags_strategy() -> impl Strategy<Value = TagSet> {
        proptest::sample::subsequence(TAG_POOL, 0..=TAG_POOL.len())
            .prop_shuffle()
            .prop_map(|tags| tags.into_iter().collect())
    }

    fn element_style_strategy(tag: &'static str) -> impl Strategy<Value = ElementStyle> {
        (
            proptest::option::of(prop::sample::select(Shape::ALL.to_vec())),
            proptest::option::of(1u32..2000),
            proptest::option::of(any::<(u8, u8, u8)>()),
            proptest::option::of(prop::sample::select(vec![
                Border::Solid,
                Border::Dashed,
                Border::Dotted,
            ])),
            proptest::option::of(-50i64..150),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(move |(shape, width, background, border, opacity, metadata)| {
                let mut style = ElementStyle::new(tag);
                style.set_shape(shape);
                style.set_width(width);
                style.set_background(background.map(|(r, g, b)| Color::from_rgb(r, g, b)));
                style.set_border(border);
                style.set_opacity(opacity);
                style.set_metadata(metadata);
                style
            })
    }

    fn layer_strategy() -> impl Strategy<Value = Styles> {
        proptest::collection::vec(
            prop::sample::select(TAG_POOL).prop_flat_map(element_style_strategy),
            0..4,
        )
        .prop_map(|styles| {
            let mut layer = Styles::default();
            for style in styles {
                layer.set_mut::<ElementStyle>().insert(style);
            }
            layer
        })
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Each resolved property comes from the last layer, for the last tag,
    /// that sets it, or from the defaults.
    fn check_matches_reference_fold(
        themes: Vec<Styles>,
        local: Styles,
        tags: TagSet,
    ) -> Result<(), TestCaseError> {
        let mut stack = StyleStack::with_built_in(Styles::default());
        for (index, styles) in themes.iter().enumerate() {
            stack.push_theme(&format!("theme-{index}"), Arc::new(ThemeDocument::new(styles.clone())));
        }
        stack.set_local(local.clone());

        let layers: Vec<&Styles> = themes.iter().chain(std::iter::once(&local)).collect();
        let mut expected_width = None;
        let mut expected_shape = None;
        for tag in tags.iter() {
            for layer in &layers {
                if let Some(style) = layer.element_style(tag) {
                    expected_width = style.width().or(expected_width);
                    expected_shape = style.shape().or(expected_shape);
                }
            }
        }

        let resolved = stack.resolve_element(&tags);
        let defaults = ResolvedElementStyle::default();
        prop_assert_eq!(resolved.width, expected_width.unwrap_or(defaults.width));
        prop_assert_eq!(resolved.shape, expected_shape.unwrap_or(defaults.shape));
        Ok(())
    }

    /// A property set by the local layer for the most specific tag always wins.
    fn check_local_precedence(themes: Vec<Styles>, tags: TagSet, width: u32) -> Result<(), TestCaseError> {
        let Some(last) = tags.iter().last() else {
            return Ok(());
        };

        let mut stack = StyleStack::new();
        for (index, styles) in themes.into_iter().enumerate() {
            stack.push_theme(&format!("theme-{index}"), Arc::new(ThemeDocument::new(styles)));
        }
        let mut local = Styles::default();
        local.add_element_style(last).set_width(width);
        stack.set_local(local);

        prop_assert_eq!(stack.resolve_element(&tags).width, width);
        Ok(())
    }

    /// Properties no layer sets take the defaults, and percentages stay in range.
    fn check_default_completeness(themes: Vec<Styles>, tags: TagSet) -> Result<(), TestCaseError> {
        let mut stack = StyleStack::with_built_in(Styles::default());
        for (index, styles) in themes.into_iter().enumerate() {
            stack.push_theme(&format!("theme-{index}"), Arc::new(ThemeDocument::new(styles)));
        }

        // The strategies never set these properties.
        let resolved = stack.resolve_element(&tags);
        let defaults = ResolvedElementStyle::default();
        prop_assert_eq!(resolved.height, defaults.height);
        prop_assert_eq!(resolved.font_size, defaults.font_size);
        prop_assert_eq!(resolved.color, defaults.color);
        prop_assert_eq!(resolved.icon, None);
        prop_assert!(resolved.opacity <= 100);
        prop_assert_eq!(resolved.stroke, ResolvedElementStyle::default_stroke(resolved.background));
        Ok(())
    }

    /// Resolution is a pure function of the stack and the tags.
    fn check_resolution_is_deterministic(themes: Vec<Styles>, tags: TagSet) -> Result<(), TestCaseError> {
        let mut stack = StyleStack::new();
        for (index, styles) in themes.into_iter().enumerate() {
            stack.push_theme(&format!("theme-{index}"), Arc::new(ThemeDocument::new(styles)));
        }
        prop_assert_eq!(stack.resolve_element(&tags), stack.clone().resolve_element(&tags));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn matches_reference_fold(
            themes in proptest::collection::vec(layer_strategy(), 0..4),
            local in layer_strategy(),
            tags in tags_strategy(),
        ) {
            check_matches_reference_fold(themes, local, tags)?;
        }

        #[test]
        fn local_precedence(
            themes in proptest::collection::vec(layer_strategy(), 0..4),
            tags in tags_strategy(),
            width in 1u32..5000,
        ) {
            check_local_precedence(themes, tags, width)?;
        }

        #[test]
        fn default_completeness(
            themes in proptest::collection::vec(layer_strategy(), 0..4),
            tags in tags_strategy(),
        ) {
            check_default_completeness(themes, tags)?;
        }

        #[test]
        fn resolution_is_deterministic(
            themes in proptest::collection::vec(layer_strategy(), 0..3),
            tags in tags_strategy(),
        ) {
            check_resolution_is_deterministic(themes, tags)?;
        }
    }
}
