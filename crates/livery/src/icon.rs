//! Icon resolution and inlining.
//!
//! Themes refer to icons relative to their own location. Before a workspace
//! can be rendered without its themes, those icons must become self-contained
//! `data:` URIs. [`IconResolver`] does that, reading theme files from disk for
//! built-in, registered and file themes and over HTTP for remote ones.

use std::{fs, path::Component};

use log::{debug, info, warn};

use livery_core::{
    image::{self, ImageReference},
    style::{ElementStyle, RelationshipStyle, StyleDefinition, Styles},
};

use crate::{
    ThemeError,
    http::HttpClient,
    theme::{LoadedTheme, ThemeCatalog, ThemeKind, ThemeSource},
    workspace::Workspace,
};

/// What an inlining pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineSummary {
    /// Icons converted to data URIs.
    pub icons_inlined: usize,
    /// Icons that could not be fetched or were not images.
    pub icons_failed: usize,
    /// Style definitions created or filled from a theme.
    pub styles_merged: usize,
    /// Theme references removed from the workspace.
    pub themes_removed: Vec<String>,
}

impl InlineSummary {
    /// Returns `true` if the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.icons_inlined == 0 && self.styles_merged == 0 && self.themes_removed.is_empty()
    }
}

/// Turns theme-relative icons into usable references.
pub struct IconResolver<'a> {
    catalog: &'a ThemeCatalog,
    http: &'a dyn HttpClient,
}

impl<'a> IconResolver<'a> {
    pub fn new(catalog: &'a ThemeCatalog, http: &'a dyn HttpClient) -> Self {
        Self { catalog, http }
    }

    /// Rewrites a relative icon against the URL of the theme declaring it.
    ///
    /// `http(s)` URLs and data URIs are returned unchanged.
    pub fn absolutize(icon: &str, theme_url: &str) -> String {
        image::absolutize(icon, theme_url)
    }

    /// Fetches an icon declared by `theme` and returns it as a data URI.
    ///
    /// Data URIs are returned as they are. Relative icons are read from the
    /// theme's directory, or from its URL for remote themes.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::UnreachableResource`] if the icon cannot be read
    /// and [`ThemeError::UnsupportedImage`] if it is not an image.
    pub fn fetch_data_uri(&self, theme: &LoadedTheme, icon: &str) -> Result<String, ThemeError> {
        let icon = icon.trim();
        match ImageReference::classify(icon) {
            ImageReference::DataUri => Ok(icon.to_string()),
            ImageReference::Url => self.fetch_remote(icon),
            ImageReference::Relative => match theme.source() {
                ThemeSource::Remote { url } => self.fetch_remote(&Self::absolutize(icon, url)),
                source => {
                    let Some(directory) = source.directory() else {
                        return Err(ThemeError::unreachable(icon, "theme has no directory"));
                    };
                    if !is_contained(icon) {
                        return Err(ThemeError::unreachable(
                            icon,
                            "icon path leaves the theme directory",
                        ));
                    }
                    let path = directory.join(icon);
                    let location = path.display().to_string();
                    let bytes = fs::read(&path).map_err(|err| ThemeError::unreachable(&location, err))?;
                    image::to_data_uri(&bytes)
                        .map_err(|err| ThemeError::from_image_error(location, err))
                }
            },
        }
    }

    fn fetch_remote(&self, url: &str) -> Result<String, ThemeError> {
        let content = self.http.get(url)?;
        image::to_data_uri(&content.bytes).map_err(|err| ThemeError::from_image_error(url, err))
    }

    /// Inlines the icons of the built-in and registered themes attached to
    /// `workspace` into its local styles.
    ///
    /// For every tag in use, registered themes are materialized: the
    /// properties they contribute to the cascade, icon included, fill the
    /// local style wherever it leaves them unset. Properties that a remote
    /// theme listed later overrides are not copied. Registered references are
    /// then removed, so resolution gives the same result before and after.
    ///
    /// Built-in themes only lend their icon to a used element tag that still
    /// has none, and their references stay, as do remote ones.
    ///
    /// Failures for a single theme or icon are logged and skipped. Local
    /// styles are only created when something is written to them. Running the
    /// pass again changes nothing.
    pub fn inline_icons(&self, workspace: &mut Workspace) -> InlineSummary {
        let element_tags = workspace.used_element_tags();
        let relationship_tags = workspace.used_relationship_tags();
        let mut summary = InlineSummary::default();

        let themes = self.load_attached(workspace.configuration().themes());
        let styles = workspace.configuration_mut().styles_mut();

        for tag in element_tags.iter().map(String::as_str) {
            let mut local = styles
                .element_style(tag)
                .cloned()
                .unwrap_or_else(|| ElementStyle::new(tag));

            if local.icon().is_none() {
                let source =
                    registered_icon(&themes, tag).or_else(|| built_in_icon(&themes, tag));
                if let Some((theme, icon)) = source {
                    match self.fetch_data_uri(theme, icon) {
                        Ok(data_uri) => match local.set_icon(&data_uri) {
                            Ok(()) => summary.icons_inlined += 1,
                            Err(err) => {
                                warn!(tag, err:%; "Inlined icon rejected");
                                summary.icons_failed += 1;
                            }
                        },
                        Err(err) => {
                            warn!(tag, icon, err:%; "Could not inline icon");
                            summary.icons_failed += 1;
                        }
                    }
                }
            }

            let mut contribution: ElementStyle = registered_contribution(&themes, tag);
            contribution.clear_icon();
            if fill_changes(&mut local, &contribution) {
                summary.styles_merged += 1;
            }
            store(styles, local);
        }

        for tag in relationship_tags.iter().map(String::as_str) {
            let mut local = styles
                .relationship_style(tag)
                .cloned()
                .unwrap_or_else(|| RelationshipStyle::new(tag));
            let contribution: RelationshipStyle = registered_contribution(&themes, tag);
            if fill_changes(&mut local, &contribution) {
                summary.styles_merged += 1;
                store(styles, local);
            }
        }

        for attached in themes.iter().filter(|attached| attached.kind == ThemeKind::Registered) {
            workspace.configuration_mut().remove_theme(&attached.reference);
            summary.themes_removed.push(attached.reference.clone());
        }

        info!(
            icons_inlined = summary.icons_inlined,
            icons_failed = summary.icons_failed,
            themes_removed = summary.themes_removed.len();
            "Inlined theme icons"
        );
        summary
    }

    /// Loads the workspace's theme references in order, skipping unknown
    /// references and themes that fail to load.
    fn load_attached(&self, references: &[String]) -> Vec<AttachedTheme> {
        let mut themes = Vec::new();
        for reference in references.iter().map(String::as_str) {
            let kind = self.catalog.classify(reference);
            let loaded = match kind {
                ThemeKind::BuiltIn => self.catalog.load_built_in(reference.trim()),
                ThemeKind::Registered | ThemeKind::RemoteUrl => {
                    self.catalog.load(reference, self.http)
                }
                ThemeKind::Unknown => continue,
            };

            match loaded {
                Ok(Some(theme)) => themes.push(AttachedTheme {
                    reference: reference.to_string(),
                    kind,
                    theme,
                }),
                Ok(None) => {
                    debug!(reference; "No packaged resources for theme, skipping icon inlining");
                }
                Err(err) => {
                    warn!(reference, err:%; "Could not load theme for icon inlining");
                }
            }
        }
        themes
    }

    /// Merges every style of `theme` into the workspace's local styles,
    /// overriding properties already set there.
    ///
    /// Relative icons are converted to data URIs first; icons that are already
    /// URLs or data URIs are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns a [`ThemeError`] if a relative icon cannot be inlined. The
    /// workspace is left unchanged in that case.
    pub fn inline_theme(
        &self,
        workspace: &mut Workspace,
        theme: &LoadedTheme,
    ) -> Result<InlineSummary, ThemeError> {
        let mut elements = Vec::new();
        let mut summary = InlineSummary::default();

        for theme_style in theme.document().styles().elements().iter() {
            let mut style = theme_style.clone();
            let relative_icon = theme_style
                .icon()
                .filter(|icon| ImageReference::classify(icon) == ImageReference::Relative);
            if let Some(icon) = relative_icon {
                let data_uri = self.fetch_data_uri(theme, icon)?;
                style
                    .set_icon(&data_uri)
                    .map_err(|err| ThemeError::invalid_document(theme.reference(), err))?;
                summary.icons_inlined += 1;
            }
            elements.push(style);
        }

        let styles = workspace.configuration_mut().styles_mut();
        for style in &elements {
            styles.add_element_style(style.tag()).overlay(style);
            summary.styles_merged += 1;
        }
        for style in theme.document().styles().relationships().iter() {
            styles.add_relationship_style(style.tag()).overlay(style);
            summary.styles_merged += 1;
        }

        info!(reference = theme.reference(), styles = summary.styles_merged; "Inlined theme");
        Ok(summary)
    }
}

/// A theme referenced by the workspace, loaded for inlining.
struct AttachedTheme {
    reference: String,
    kind: ThemeKind,
    theme: LoadedTheme,
}

/// Returns what registered themes contribute to `tag` in the cascade.
///
/// Registered definitions are overlaid in reference order. A remote theme
/// listed later unsets the properties it overrides.
fn registered_contribution<S: StyleDefinition>(themes: &[AttachedTheme], tag: &str) -> S {
    let mut contribution = S::new(tag);
    for attached in themes {
        let Some(style) = attached.theme.document().styles().get::<S>(tag) else {
            continue;
        };
        match attached.kind {
            ThemeKind::Registered => contribution.overlay(style),
            ThemeKind::RemoteUrl => contribution.mask(style),
            ThemeKind::BuiltIn | ThemeKind::Unknown => {}
        }
    }
    contribution
}

/// Returns the registered theme whose icon the cascade shows for `tag`.
fn registered_icon<'t>(
    themes: &'t [AttachedTheme],
    tag: &str,
) -> Option<(&'t LoadedTheme, &'t str)> {
    let mut source = None;
    for attached in themes {
        let icon = attached
            .theme
            .document()
            .styles()
            .element_style(tag)
            .and_then(ElementStyle::icon);
        let Some(icon) = icon else {
            continue;
        };
        match attached.kind {
            ThemeKind::Registered => source = Some((&attached.theme, icon)),
            ThemeKind::RemoteUrl => source = None,
            ThemeKind::BuiltIn | ThemeKind::Unknown => {}
        }
    }
    source
}

/// Returns the first built-in theme with an icon for `tag`.
fn built_in_icon<'t>(
    themes: &'t [AttachedTheme],
    tag: &str,
) -> Option<(&'t LoadedTheme, &'t str)> {
    themes
        .iter()
        .filter(|attached| attached.kind == ThemeKind::BuiltIn)
        .find_map(|attached| {
            let icon = attached.theme.document().styles().element_style(tag)?.icon()?;
            Some((&attached.theme, icon))
        })
}

/// Writes `style` to the local styles unless it sets nothing or matches the
/// definition already there.
fn store<S: StyleDefinition + PartialEq>(styles: &mut Styles, style: S) {
    if style.is_unset() || styles.get::<S>(style.tag()) == Some(&style) {
        return;
    }
    styles.set_mut::<S>().insert(style);
}

/// Fills unset fields of `local` from `theme`, returning `true` if anything
/// changed.
fn fill_changes<S: StyleDefinition + PartialEq>(local: &mut S, theme: &S) -> bool {
    let before = local.clone();
    local.fill(theme);
    *local != before
}

/// Returns `true` if a relative path stays inside the directory it is joined to.
fn is_contained(path: &str) -> bool {
    std::path::Path::new(path)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use livery_core::style::Shape;

    use super::*;
    use crate::{
        http::RemoteContent,
        theme::{THEME_MANIFEST, ThemeRegistry},
        workspace::Element,
    };

    const PNG_BYTES: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ];

    #[derive(Default)]
    struct MapHttp {
        resources: HashMap<String, Vec<u8>>,
    }

    impl HttpClient for MapHttp {
        fn get(&self, url: &str) -> Result<RemoteContent, ThemeError> {
            self.resources
                .get(url)
                .map(|bytes| RemoteContent::new("image/png", bytes.clone()))
                .ok_or_else(|| ThemeError::unreachable(url, "404"))
        }
    }

    fn write_theme(root: &std::path::Path, name: &str, manifest: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(THEME_MANIFEST), manifest).unwrap();
        fs::write(dir.join("icon.png"), PNG_BYTES).unwrap();
    }

    fn workspace_with(tags: &[&str], theme: &str) -> Workspace {
        let mut workspace = Workspace::new("Test");
        workspace
            .model_mut()
            .add_element(Element::new("1", "A").with_tags(tags.iter().copied()));
        workspace.configuration_mut().add_theme(theme);
        workspace
    }

    #[test]
    fn test_is_contained() {
        assert!(is_contained("icons/a.png"));
        assert!(is_contained("./a.png"));
        assert!(!is_contained("../a.png"));
        assert!(!is_contained("/etc/passwd"));
    }

    #[test]
    fn test_built_in_icons_are_inlined_and_reference_kept() {
        let root = tempfile::tempdir().unwrap();
        write_theme(
            root.path(),
            "kubernetes-v0.3",
            r#"{"elements": [{"tag": "Pod", "icon": "icon.png", "shape": "Hexagon"}, {"tag": "Node", "shape": "Box"}]}"#,
        );
        let mut registry = ThemeRegistry::with_default_built_ins();
        registry.set_built_in_root(root.path());
        let catalog = ThemeCatalog::new(Arc::new(registry));
        let http = MapHttp::default();
        let resolver = IconResolver::new(&catalog, &http);

        let mut workspace = workspace_with(&["Element", "Pod", "Node"], "kubernetes-v0.3");
        let summary = resolver.inline_icons(&mut workspace);

        assert_eq!(summary.icons_inlined, 1);
        assert!(summary.themes_removed.is_empty());
        assert_eq!(workspace.configuration().themes(), ["kubernetes-v0.3"]);

        let styles = workspace.configuration().styles();
        let pod = styles.element_style("Pod").unwrap();
        assert!(pod.icon().unwrap().starts_with("data:image/png;base64,"));
        // Only the icon is copied from built-in themes.
        assert_eq!(pod.shape(), None);
        assert!(styles.element_style("Node").is_none());
    }

    #[test]
    fn test_failed_built_in_icon_leaves_no_local_style() {
        let root = tempfile::tempdir().unwrap();
        write_theme(
            root.path(),
            "kubernetes-v0.3",
            r#"{"elements": [{"tag": "Pod", "icon": "missing.png"}]}"#,
        );
        let mut registry = ThemeRegistry::with_default_built_ins();
        registry.set_built_in_root(root.path());
        let catalog = ThemeCatalog::new(Arc::new(registry));
        let http = MapHttp::default();
        let resolver = IconResolver::new(&catalog, &http);

        let mut workspace = workspace_with(&["Element", "Pod"], "kubernetes-v0.3");
        let summary = resolver.inline_icons(&mut workspace);

        assert_eq!(summary.icons_failed, 1);
        assert_eq!(summary.icons_inlined, 0);
        assert!(workspace.configuration().styles().is_empty());
    }

    #[test]
    fn test_registered_icon_wins_over_built_in_icon() {
        let root = tempfile::tempdir().unwrap();
        let built_in = root.path().join("built-in");
        let registered = root.path().join("registered");
        write_theme(
            &built_in,
            "kubernetes-v0.3",
            r#"{"elements": [{"tag": "Pod", "icon": "missing.png"}]}"#,
        );
        write_theme(
            &registered,
            "pods",
            r#"{"elements": [{"tag": "Pod", "icon": "icon.png"}]}"#,
        );
        let mut registry = ThemeRegistry::with_default_built_ins();
        registry.set_built_in_root(&built_in);
        registry.register_directory(&registered);
        let catalog = ThemeCatalog::new(Arc::new(registry));
        let http = MapHttp::default();
        let resolver = IconResolver::new(&catalog, &http);

        let mut workspace = workspace_with(&["Pod"], "kubernetes-v0.3");
        workspace.configuration_mut().add_theme("pods");
        let summary = resolver.inline_icons(&mut workspace);

        assert_eq!(summary.icons_inlined, 1);
        assert_eq!(summary.icons_failed, 0);
        assert_eq!(workspace.configuration().themes(), ["kubernetes-v0.3"]);
    }

    #[test]
    fn test_remote_theme_icon_is_fetched_relative_to_url() {
        let catalog = ThemeCatalog::new(Arc::new(ThemeRegistry::new()));
        let mut http = MapHttp::default();
        http.resources.insert(
            "https://example.com/themes/t/icons/q.png".to_string(),
            PNG_BYTES.to_vec(),
        );
        let resolver = IconResolver::new(&catalog, &http);

        let theme = LoadedTheme::new(
            "https://example.com/themes/t/theme.json",
            ThemeSource::Remote {
                url: "https://example.com/themes/t/theme.json".to_string(),
            },
            Default::default(),
        );
        let uri = resolver.fetch_data_uri(&theme, "icons/q.png").unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let err = resolver.fetch_data_uri(&theme, "missing.png").unwrap_err();
        assert!(matches!(err, ThemeError::UnreachableResource { .. }));
    }

    #[test]
    fn test_non_image_icon_is_counted_as_failure() {
        let root = tempfile::tempdir().unwrap();
        write_theme(
            root.path(),
            "corporate",
            r#"{"elements": [{"tag": "Db", "icon": "theme.json", "shape": "Cylinder"}]}"#,
        );
        let mut registry = ThemeRegistry::new();
        registry.register_directory(root.path());
        let catalog = ThemeCatalog::new(Arc::new(registry));
        let http = MapHttp::default();
        let resolver = IconResolver::new(&catalog, &http);

        let mut workspace = workspace_with(&["Db"], "corporate");
        let summary = resolver.inline_icons(&mut workspace);

        assert_eq!(summary.icons_failed, 1);
        let db = workspace.configuration().styles().element_style("Db").unwrap();
        assert_eq!(db.icon(), None);
        assert_eq!(db.shape(), Some(Shape::Cylinder));
    }
}
