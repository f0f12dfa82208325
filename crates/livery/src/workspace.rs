//! The workspace model the engine styles.
//!
//! Only the parts of a workspace document the style engine reads or writes
//! are modeled: tagged elements and relationships, the theme references and
//! the local styles. Every other key is kept verbatim, so a workspace read and
//! written back loses nothing.
//!
//! # Example
//!
//! ```
//! use livery::workspace::Workspace;
//!
//! let workspace = Workspace::from_json(br#"{
//!     "name": "Shop",
//!     "model": {"elements": [{"id": "1", "name": "Web", "tags": "Element,Container"}]},
//!     "views": {"configuration": {"themes": ["kubernetes-v0.3"]}}
//! }"#).unwrap();
//!
//! assert_eq!(workspace.configuration().themes(), ["kubernetes-v0.3"]);
//! assert!(workspace.used_element_tags().contains("Container"));
//! ```

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use livery_core::{style::Styles, tag::TagSet};

use crate::LiveryError;

/// A workspace document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default)]
    model: Model,

    #[serde(default)]
    views: Views,

    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Parses a workspace document.
    ///
    /// # Errors
    ///
    /// Returns [`LiveryError::Workspace`] if the document is malformed, including
    /// invalid local style values.
    pub fn from_json(json: &[u8]) -> Result<Self, LiveryError> {
        serde_json::from_slice(json).map_err(|err| LiveryError::Workspace(err.to_string()))
    }

    /// Serializes the workspace as pretty-printed JSON.
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

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<Option<String>>) {
        self.description = description.into();
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn configuration(&self) -> &Configuration {
        &self.views.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut Configuration {
        &mut self.views.configuration
    }

    /// Returns every tag carried by at least one element, in first-seen order.
    pub fn used_element_tags(&self) -> IndexSet<String> {
        collect_tags(self.model.elements.iter().map(Element::tags))
    }

    /// Returns every tag carried by at least one relationship, in first-seen order.
    pub fn used_relationship_tags(&self) -> IndexSet<String> {
        collect_tags(self.model.relationships.iter().map(Relationship::tags))
    }
}

fn collect_tags<'a>(tag_sets: impl Iterator<Item = &'a TagSet>) -> IndexSet<String> {
    tag_sets
        .flat_map(TagSet::iter)
        .map(str::to_string)
        .collect()
}

/// The tagged entities of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    elements: Vec<Element>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    relationships: Vec<Relationship>,

    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Model {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == id)
    }
}

/// A model element: a person, software system, container or component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    tags: TagSet,

    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Element {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Replaces the tags with the given ones, in order.
    pub fn with_tags<S: AsRef<str>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.tags
    }
}

/// A relationship between two elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    id: String,

    #[serde(default)]
    source_id: String,

    #[serde(default)]
    destination_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    tags: TagSet,

    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        destination_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            destination_id: destination_id.into(),
            ..Self::default()
        }
    }

    /// Replaces the tags with the given ones, in order.
    pub fn with_tags<S: AsRef<str>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn destination_id(&self) -> &str {
        &self.destination_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.tags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Views {
    #[serde(default)]
    configuration: Configuration,

    #[serde(flatten)]
    other: Map<String, Value>,
}

/// View configuration: theme references and workspace-local styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    themes: Vec<String>,

    #[serde(default, skip_serializing_if = "Styles::is_empty")]
    styles: Styles,

    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Configuration {
    /// Returns the theme references in the order they are applied.
    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    /// Appends a theme reference.
    ///
    /// The reference is trimmed; empty and already-present references are
    /// ignored. Returns `true` if the reference was added.
    pub fn add_theme(&mut self, reference: &str) -> bool {
        let reference = reference.trim();
        if reference.is_empty() || self.themes.iter().any(|theme| theme == reference) {
            return false;
        }
        self.themes.push(reference.to_string());
        true
    }

    /// Removes a theme reference, returning `true` if it was present.
    pub fn remove_theme(&mut self, reference: &str) -> bool {
        let before = self.themes.len();
        self.themes.retain(|theme| theme != reference);
        self.themes.len() != before
    }

    /// Replaces the theme references, applying the rules of [`add_theme`](Self::add_theme).
    pub fn set_themes<S: AsRef<str>>(&mut self, references: impl IntoIterator<Item = S>) {
        self.themes.clear();
        for reference in references {
            self.add_theme(reference.as_ref());
        }
    }

    /// Returns the workspace-local styles.
    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut Styles {
        &mut self.styles
    }
}

#[cfg(test)]
mod tests {
    use livery_core::style::Shape;

    use super::*;

    const WORKSPACE: &str = r##"{
        "id": 42,
        "name": "Shop",
        "model": {
            "elements": [
                {"id": "1", "name": "Customer", "tags": "Element,Person", "location": "External"},
                {"id": "2", "name": "Web", "tags": "Element,Container"}
            ],
            "relationships": [
                {"id": "3", "sourceId": "1", "destinationId": "2", "tags": "Relationship,Async"}
            ]
        },
        "views": {
            "systemContextViews": [],
            "configuration": {
                "themes": ["kubernetes-v0.3"],
                "styles": {"elements": [{"tag": "Person", "background": "#08427b"}]}
            }
        }
    }"##;

    #[test]
    fn test_from_json() {
        let workspace = Workspace::from_json(WORKSPACE.as_bytes()).unwrap();

        assert_eq!(workspace.name(), Some("Shop"));
        assert_eq!(workspace.model().elements().len(), 2);
        assert_eq!(
            workspace.model().element("1").unwrap().tags().to_string(),
            "Element,Person"
        );
        assert_eq!(workspace.configuration().themes(), ["kubernetes-v0.3"]);
        assert!(workspace.configuration().styles().element_style("Person").is_some());
    }

    #[test]
    fn test_round_trip_keeps_unknown_keys() {
        let workspace = Workspace::from_json(WORKSPACE.as_bytes()).unwrap();
        let json = workspace.to_json_pretty().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["id"], 42);
        assert_eq!(value["model"]["elements"][0]["location"], "External");
        assert!(value["views"]["systemContextViews"].is_array());
        assert_eq!(Workspace::from_json(json.as_bytes()).unwrap(), workspace);
    }

    #[test]
    fn test_used_tags() {
        let workspace = Workspace::from_json(WORKSPACE.as_bytes()).unwrap();
        let elements: Vec<_> = workspace.used_element_tags().into_iter().collect();
        assert_eq!(elements, vec!["Element", "Person", "Container"]);
        assert!(workspace.used_relationship_tags().contains("Async"));
        assert!(!workspace.used_relationship_tags().contains("Person"));
    }

    #[test]
    fn test_add_theme_trims_and_deduplicates() {
        let mut configuration = Configuration::default();
        assert!(configuration.add_theme(" https://example.com/theme.json "));
        assert!(!configuration.add_theme("https://example.com/theme.json"));
        assert!(!configuration.add_theme("  "));
        assert_eq!(configuration.themes(), ["https://example.com/theme.json"]);

        assert!(configuration.remove_theme("https://example.com/theme.json"));
        assert!(!configuration.remove_theme("https://example.com/theme.json"));
    }

    #[test]
    fn test_invalid_local_style_is_workspace_error() {
        let json = br#"{"views": {"configuration": {"styles": {"elements": [{"tag": "A", "shape": "Blob"}]}}}}"#;
        assert!(matches!(
            Workspace::from_json(json),
            Err(LiveryError::Workspace(_))
        ));
    }

    #[test]
    fn test_build_in_code() {
        let mut workspace = Workspace::new("Built");
        workspace
            .model_mut()
            .add_element(Element::new("1", "Db").with_tags(["Element", "Database"]));
        workspace
            .configuration_mut()
            .styles_mut()
            .add_element_style("Database")
            .set_shape(Shape::Cylinder);

        assert_eq!(workspace.used_element_tags().len(), 2);
        assert!(workspace.configuration().themes().is_empty());
    }
}
