//! The [`StyleEngine`] façade.

use std::{path::Path, sync::Arc};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;

use livery_core::{
    style::{ResolvedStyle, StyleKind},
    tag::TagSet,
};

use crate::{
    LiveryError, ThemeError,
    config::AppConfig,
    http::{HttpClient, UreqHttpClient},
    icon::{IconResolver, InlineSummary},
    stack::StyleStack,
    theme::{LoadedTheme, ThemeCatalog, ThemeDocument, ThemeRegistry},
    workspace::Workspace,
};

/// Identifies a distinct style request: an entity kind and its tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StyleKey {
    pub kind: StyleKind,
    pub tags: TagSet,
}

impl StyleKey {
    pub fn new(kind: StyleKind, tags: TagSet) -> Self {
        Self { kind, tags }
    }
}

/// Loads themes, builds style stacks and resolves styles for workspaces.
///
/// The engine holds only read-only state and can be shared between threads.
///
/// # Examples
///
/// ```
/// use livery::{StyleEngine, workspace::Workspace};
/// use livery_core::{style::StyleKind, tag::TagSet};
///
/// let engine = StyleEngine::with_defaults();
/// let workspace = Workspace::from_json(br#"{
///     "model": {"elements": [{"id": "1", "tags": "Element,Person"}]}
/// }"#).unwrap();
///
/// let stack = engine.build_stack(&workspace);
/// let styles = engine.resolve_all(&workspace, &stack);
/// assert_eq!(styles.len(), 1);
///
/// let person = engine.resolve(&stack, StyleKind::Element, &TagSet::parse("Element,Person"));
/// assert_eq!(person.as_element().unwrap().shape.to_string(), "Person");
/// ```
pub struct StyleEngine {
    catalog: ThemeCatalog,
    http: Arc<dyn HttpClient>,
}

impl StyleEngine {
    /// Creates an engine.
    ///
    /// # Arguments
    ///
    /// * `registry` - Built-in and registered theme names, populated up front.
    /// * `http` - Client for remote themes and icons.
    pub fn new(registry: Arc<ThemeRegistry>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            catalog: ThemeCatalog::new(registry),
            http,
        }
    }

    /// Creates an engine from configuration, with a `ureq` HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`LiveryError::Config`] if the URL allow-list is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, LiveryError> {
        let registry = ThemeRegistry::from_config(config.themes());
        let http = UreqHttpClient::new(config.http())?;
        Ok(Self::new(Arc::new(registry), Arc::new(http)))
    }

    /// Creates an engine with the default configuration.
    ///
    /// The default URL allow-list is empty, so remote themes and icons are
    /// never fetched.
    pub fn with_defaults() -> Self {
        let config = AppConfig::default();
        let registry = Arc::new(ThemeRegistry::from_config(config.themes()));
        let http: Arc<dyn HttpClient> = match UreqHttpClient::new(config.http()) {
            Ok(client) => Arc::new(client),
            Err(_) => Arc::new(OfflineHttpClient),
        };
        Self::new(registry, http)
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    fn icon_resolver(&self) -> IconResolver<'_> {
        IconResolver::new(&self.catalog, self.http.as_ref())
    }

    /// Loads each theme reference in order and pushes it onto `stack`.
    ///
    /// A theme that fails to load is logged and skipped; the remaining
    /// references are still loaded.
    ///
    /// # Returns
    ///
    /// The number of theme layers added.
    pub fn load_themes_into<S: AsRef<str>>(&self, stack: &mut StyleStack, references: &[S]) -> usize {
        let mut added = 0;
        for reference in references {
            let reference = reference.as_ref();
            match self.catalog.load(reference, self.http.as_ref()) {
                Ok(Some(theme)) => {
                    if stack.push_loaded(&theme) {
                        added += 1;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(reference, err:%; "Could not load theme, skipping");
                }
            }
        }
        debug!(added; "Loaded theme layers");
        added
    }

    /// Builds the stack for a workspace: built-in layer, the workspace's
    /// themes, then its local styles.
    pub fn build_stack(&self, workspace: &Workspace) -> StyleStack {
        let mut stack = StyleStack::new();
        self.load_themes_into(&mut stack, workspace.configuration().themes());
        stack.set_local(workspace.configuration().styles().clone());
        stack
    }

    /// Resolves one style. Never fails.
    pub fn resolve(&self, stack: &StyleStack, kind: StyleKind, tags: &TagSet) -> ResolvedStyle {
        stack.resolve(kind, tags)
    }

    /// Resolves the style of every element and relationship in `workspace`.
    ///
    /// Entities with the same kind and tags share a single entry; entries are
    /// in first-seen order, elements before relationships.
    pub fn resolve_all(
        &self,
        workspace: &Workspace,
        stack: &StyleStack,
    ) -> IndexMap<StyleKey, ResolvedStyle> {
        let elements = workspace
            .model()
            .elements()
            .iter()
            .map(|element| StyleKey::new(StyleKind::Element, element.tags().clone()));
        let relationships = workspace
            .model()
            .relationships()
            .iter()
            .map(|relationship| StyleKey::new(StyleKind::Relationship, relationship.tags().clone()));

        let mut resolved = IndexMap::new();
        for key in elements.chain(relationships) {
            if !resolved.contains_key(&key) {
                let style = stack.resolve(key.kind, &key.tags);
                resolved.insert(key, style);
            }
        }

        info!(styles = resolved.len(); "Resolved workspace styles");
        resolved
    }

    /// Inlines built-in and registered theme icons into the workspace.
    ///
    /// See [`IconResolver::inline_icons`].
    pub fn inline_icons(&self, workspace: &mut Workspace) -> InlineSummary {
        self.icon_resolver().inline_icons(workspace)
    }

    /// Merges a loaded theme into the workspace's local styles.
    ///
    /// # Errors
    ///
    /// Returns a [`ThemeError`] if a relative icon cannot be inlined.
    pub fn inline_theme(
        &self,
        workspace: &mut Workspace,
        theme: &LoadedTheme,
    ) -> Result<InlineSummary, ThemeError> {
        self.icon_resolver().inline_theme(workspace, theme)
    }

    /// Reads a theme file and merges it into the workspace's local styles.
    ///
    /// # Errors
    ///
    /// Returns a [`ThemeError`] if the file is unreadable or invalid, or if a
    /// relative icon cannot be inlined.
    pub fn inline_theme_file(
        &self,
        workspace: &mut Workspace,
        path: &Path,
    ) -> Result<InlineSummary, ThemeError> {
        let theme = self.catalog.load_file(path)?;
        self.inline_theme(workspace, &theme)
    }

    /// Exports the workspace's name, description and local styles as a theme.
    pub fn export_theme(&self, workspace: &Workspace) -> ThemeDocument {
        let mut theme = ThemeDocument::new(workspace.configuration().styles().clone());
        theme.set_name(workspace.name().map(str::to_string));
        theme.set_description(workspace.description().map(str::to_string));
        theme
    }
}

/// Client used when no network client can be built; every request fails.
struct OfflineHttpClient;

impl HttpClient for OfflineHttpClient {
    fn get(&self, url: &str) -> Result<crate::http::RemoteContent, ThemeError> {
        Err(ThemeError::unreachable(url, "network access is disabled"))
    }
}

impl std::fmt::Debug for StyleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleEngine")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}
