//! The theme document format.

use serde::{Deserialize, Deserializer, Serialize};

use livery_core::{
    StyleError, image,
    style::{ElementStyle, StyleDefinition, Styles, deserialize_non_empty},
};

use crate::{LiveryError, ThemeError};

/// A named collection of element and relationship styles.
///
/// Stored as JSON with camelCase keys. Absent keys are unset, unknown keys are
/// ignored, and empty `logo`/`icon` strings read as unset.
///
/// # Examples
///
/// ```
/// use livery::theme::ThemeDocument;
///
/// let theme = ThemeDocument::from_json(
///     "inline",
///     br##"{"name": "Dark", "elements": [{"tag": "Element", "background": "#000"}]}"##,
/// )
/// .unwrap();
///
/// assert_eq!(theme.name(), Some("Dark"));
/// let background = theme.styles().element_style("Element").unwrap().background();
/// assert_eq!(background.unwrap().to_string(), "#000000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDocument {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    description: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_logo"
    )]
    logo: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    license: Option<String>,

    #[serde(flatten)]
    styles: Styles,
}

impl ThemeDocument {
    /// Creates a theme document with the given styles and no metadata.
    pub fn new(styles: Styles) -> Self {
        Self {
            styles,
            ..Self::default()
        }
    }

    /// Parses a theme document.
    ///
    /// # Arguments
    ///
    /// * `reference` - Where the document came from, used in error messages.
    /// * `json` - The raw document.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::InvalidThemeDocument`] for malformed JSON,
    /// unknown enum names, invalid colors or an invalid logo.
    pub fn from_json(reference: &str, json: &[u8]) -> Result<Self, ThemeError> {
        serde_json::from_slice(json).map_err(|err| ThemeError::invalid_document(reference, err))
    }

    /// Serializes the document as pretty-printed JSON, omitting unset fields.
    ///
    /// # Errors
    ///
    /// Returns [`LiveryError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, LiveryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<Option<String>>) {
        self.name = name.into().filter(|name| !name.trim().is_empty());
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<Option<String>>) {
        self.description = description
            .into()
            .filter(|description| !description.trim().is_empty());
    }

    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    /// Sets the logo; an empty string clears it.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidImageReference`] unless the logo is an
    /// `http(s)` URL or an image data URI.
    pub fn set_logo(&mut self, logo: &str) -> Result<(), StyleError> {
        self.logo = if logo.trim().is_empty() {
            None
        } else {
            Some(image::validate(logo)?)
        };
        Ok(())
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn set_license(&mut self, license: impl Into<Option<String>>) {
        self.license = license.into().filter(|license| !license.trim().is_empty());
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut Styles {
        &mut self.styles
    }

    /// Rewrites every relative element icon against the document's URL.
    pub fn rebase_icons(&mut self, base_url: &str) {
        for style in self.styles.set_mut::<ElementStyle>().iter_mut() {
            style.rebase_icon(base_url);
        }
    }

    /// Returns `true` if the document defines a style of kind `S` for `tag`.
    pub fn defines<S: StyleDefinition>(&self, tag: &str) -> bool {
        self.styles.set::<S>().contains(tag)
    }
}

fn deserialize_logo<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_non_empty(deserializer)?
        .map(|logo| image::validate(&logo).map_err(serde::de::Error::custom))
        .transpose()
}
