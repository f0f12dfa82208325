//! Classifying and loading theme references.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use log::{debug, info, trace, warn};

use livery_core::image;

use super::{THEME_MANIFEST, ThemeDocument, ThemeRegistry};
use crate::{ThemeError, http::HttpClient};

/// Themes under this prefix are hosted by a service scheduled for shutdown.
const SUNSET_PREFIX: &str = "https://static.structurizr.com/themes/";

const ACCEPTED_CONTENT_TYPES: &[&str] = &["application/json", "text/plain"];

/// What a theme reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeKind {
    BuiltIn,
    Registered,
    RemoteUrl,
    Unknown,
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn => write!(f, "built-in"),
            Self::Registered => write!(f, "registered"),
            Self::RemoteUrl => write!(f, "remote"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Where a loaded theme's files live, for resolving its relative icons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSource {
    BuiltIn { name: String, directory: PathBuf },
    Registered { name: String, directory: PathBuf },
    Remote { url: String },
    /// A theme document read directly from a file.
    File { path: PathBuf },
}

impl ThemeSource {
    /// Returns the local directory holding the theme's files, if any.
    pub fn directory(&self) -> Option<&Path> {
        match self {
            Self::BuiltIn { directory, .. } | Self::Registered { directory, .. } => {
                Some(directory.as_path())
            }
            Self::File { path } => path.parent(),
            Self::Remote { .. } => None,
        }
    }
}

/// A parsed theme together with the reference it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedTheme {
    reference: String,
    source: ThemeSource,
    document: Arc<ThemeDocument>,
}

impl LoadedTheme {
    pub fn new(reference: impl Into<String>, source: ThemeSource, document: ThemeDocument) -> Self {
        Self {
            reference: reference.into(),
            source,
            document: Arc::new(document),
        }
    }

    /// Returns the reference exactly as attached to the workspace.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn source(&self) -> &ThemeSource {
        &self.source
    }

    pub fn document(&self) -> &ThemeDocument {
        &self.document
    }

    /// Returns a shared handle to the immutable document.
    pub fn shared_document(&self) -> Arc<ThemeDocument> {
        Arc::clone(&self.document)
    }
}

/// Resolves theme references against a [`ThemeRegistry`].
///
/// The catalog itself is stateless apart from remembering whether the
/// hosted-theme sunset warning has been logged.
#[derive(Debug)]
pub struct ThemeCatalog {
    registry: Arc<ThemeRegistry>,
    sunset_warned: AtomicBool,
}

impl ThemeCatalog {
    pub fn new(registry: Arc<ThemeRegistry>) -> Self {
        Self {
            registry,
            sunset_warned: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    /// Classifies a theme reference.
    ///
    /// Checks, in order, built-in names, registered names and `http(s)` URLs.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use livery::theme::{ThemeCatalog, ThemeKind, ThemeRegistry};
    ///
    /// let catalog = ThemeCatalog::new(Arc::new(ThemeRegistry::with_default_built_ins()));
    /// assert_eq!(catalog.classify("kubernetes-v0.3"), ThemeKind::BuiltIn);
    /// assert_eq!(catalog.classify("https://example.com/theme.json"), ThemeKind::RemoteUrl);
    /// assert_eq!(catalog.classify("my-theme"), ThemeKind::Unknown);
    /// ```
    pub fn classify(&self, reference: &str) -> ThemeKind {
        let reference = reference.trim();
        if self.registry.is_built_in(reference) {
            ThemeKind::BuiltIn
        } else if self.registry.is_registered(reference) {
            ThemeKind::Registered
        } else if image::is_http_url(reference) {
            ThemeKind::RemoteUrl
        } else {
            ThemeKind::Unknown
        }
    }

    /// Loads the theme a reference points at.
    ///
    /// Built-in themes are applied by the icon resolver rather than stacked,
    /// so they load as `None`, as do unknown references.
    ///
    /// # Arguments
    ///
    /// * `reference` - Built-in name, registered name or URL.
    /// * `http` - Client used for remote themes.
    ///
    /// # Errors
    ///
    /// Returns a [`ThemeError`] if the document cannot be fetched, has an
    /// unexpected content type, or does not parse.
    pub fn load(
        &self,
        reference: &str,
        http: &dyn HttpClient,
    ) -> Result<Option<LoadedTheme>, ThemeError> {
        let trimmed = reference.trim();
        match self.classify(trimmed) {
            ThemeKind::BuiltIn => {
                debug!(reference = trimmed; "Built-in theme is applied by icon inlining, not loaded");
                Ok(None)
            }
            ThemeKind::Registered => self.load_registered(trimmed).map(Some),
            ThemeKind::RemoteUrl => self.load_remote(trimmed, http).map(Some),
            ThemeKind::Unknown => {
                warn!(reference = trimmed; "Unknown theme reference, skipping");
                Ok(None)
            }
        }
    }

    /// Loads a built-in theme from its packaged directory.
    ///
    /// Returns `None` if `name` is not built in or no packaged directory is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns a [`ThemeError`] if the packaged manifest is unreadable or invalid.
    pub fn load_built_in(&self, name: &str) -> Result<Option<LoadedTheme>, ThemeError> {
        let Some(directory) = self.registry.built_in_directory(name) else {
            debug!(name; "No packaged resources for built-in theme");
            return Ok(None);
        };

        let document = read_manifest(name, &directory)?;
        Ok(Some(LoadedTheme::new(
            name,
            ThemeSource::BuiltIn {
                name: name.to_string(),
                directory,
            },
            document,
        )))
    }

    /// Loads a theme document from a file.
    ///
    /// Relative icons in the document are read from the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ThemeError`] if the file is unreadable or invalid.
    pub fn load_file(&self, path: &Path) -> Result<LoadedTheme, ThemeError> {
        let reference = path.display().to_string();
        info!(path:? = path; "Loading theme file");
        let bytes = fs::read(path).map_err(|err| ThemeError::unreachable(&reference, err))?;
        let document = ThemeDocument::from_json(&reference, &bytes)?;
        Ok(LoadedTheme::new(
            reference,
            ThemeSource::File {
                path: path.to_path_buf(),
            },
            document,
        ))
    }

    fn load_registered(&self, name: &str) -> Result<LoadedTheme, ThemeError> {
        let directory = self
            .registry
            .registered_directory(name)
            .ok_or_else(|| ThemeError::unreachable(name, "theme is not registered"))?
            .to_path_buf();

        info!(name, directory:? = directory; "Loading registered theme");
        let document = read_manifest(name, &directory)?;
        Ok(LoadedTheme::new(
            name,
            ThemeSource::Registered {
                name: name.to_string(),
                directory,
            },
            document,
        ))
    }

    fn load_remote(&self, url: &str, http: &dyn HttpClient) -> Result<LoadedTheme, ThemeError> {
        self.warn_if_sunset(url);

        info!(url; "Loading remote theme");
        let content = http.get(url)?;
        let content_type = content.content_type.trim().to_ascii_lowercase();
        if !ACCEPTED_CONTENT_TYPES
            .iter()
            .any(|accepted| content_type.starts_with(accepted))
        {
            return Err(ThemeError::UnexpectedContentType {
                url: url.to_string(),
                content_type: content.content_type,
            });
        }

        let mut document = ThemeDocument::from_json(url, &content.bytes)?;
        document.rebase_icons(url);
        trace!(url, elements = document.styles().elements().len(); "Parsed remote theme");

        Ok(LoadedTheme::new(
            url,
            ThemeSource::Remote {
                url: url.to_string(),
            },
            document,
        ))
    }

    /// Logs, once per catalog, that themes hosted under the sunset prefix
    /// will stop being available.
    pub(crate) fn warn_if_sunset(&self, url: &str) {
        if url.starts_with(SUNSET_PREFIX) && !self.sunset_warned.swap(true, Ordering::Relaxed) {
            warn!(
                url;
                "The Structurizr cloud service will reach its End of Life (EOL) on 30 September 2026 and this theme will not be available"
            );
        }
    }

    #[cfg(test)]
    pub(crate) fn sunset_warned(&self) -> bool {
        self.sunset_warned.load(Ordering::Relaxed)
    }
}

fn read_manifest(reference: &str, directory: &Path) -> Result<ThemeDocument, ThemeError> {
    let path = directory.join(THEME_MANIFEST);
    let bytes =
        fs::read(&path).map_err(|err| ThemeError::unreachable(path.display().to_string(), err))?;
    ThemeDocument::from_json(reference, &bytes)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::RemoteContent;

    struct StaticHttp {
        content_type: &'static str,
        body: &'static str,
        requests: Mutex<Vec<String>>,
    }

    impl StaticHttp {
        fn new(content_type: &'static str, body: &'static str) -> Self {
            Self {
                content_type,
                body,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for StaticHttp {
        fn get(&self, url: &str) -> Result<RemoteContent, ThemeError> {
            self.requests.lock().unwrap().push(url.to_string());
            Ok(RemoteContent::new(self.content_type, self.body.as_bytes()))
        }
    }

    fn catalog_with(registry: ThemeRegistry) -> ThemeCatalog {
        ThemeCatalog::new(Arc::new(registry))
    }

    #[test]
    fn test_classify_order() {
        let mut registry = ThemeRegistry::with_default_built_ins();
        registry.register("kubernetes-v0.3", "/tmp/shadowed");
        registry.register("corporate", "/tmp/corporate");
        let catalog = catalog_with(registry);

        assert_eq!(catalog.classify(" kubernetes-v0.3 "), ThemeKind::BuiltIn);
        assert_eq!(catalog.classify("corporate"), ThemeKind::Registered);
        assert_eq!(catalog.classify("http://example.com/t.json"), ThemeKind::RemoteUrl);
        assert_eq!(catalog.classify("ftp://example.com/t.json"), ThemeKind::Unknown);
        assert_eq!(catalog.classify("Corporate"), ThemeKind::Unknown);
    }

    #[test]
    fn test_load_remote_rebases_icons() {
        let http = StaticHttp::new(
            "application/json; charset=utf-8",
            r#"{"elements": [{"tag": "Queue", "icon": "queue.png"}]}"#,
        );
        let catalog = catalog_with(ThemeRegistry::new());

        let theme = catalog
            .load("https://example.com/themes/t/theme.json", &http)
            .unwrap()
            .unwrap();

        assert_eq!(theme.reference(), "https://example.com/themes/t/theme.json");
        assert!(matches!(theme.source(), ThemeSource::Remote { .. }));
        assert_eq!(
            theme.document().styles().element_style("Queue").unwrap().icon(),
            Some("https://example.com/themes/t/queue.png")
        );
    }

    #[test]
    fn test_load_remote_accepts_text_plain() {
        let http = StaticHttp::new("text/plain", r#"{"name": "Plain"}"#);
        let catalog = catalog_with(ThemeRegistry::new());
        let theme = catalog.load("https://example.com/plain.json", &http).unwrap().unwrap();
        assert_eq!(theme.document().name(), Some("Plain"));
    }

    #[test]
    fn test_load_remote_rejects_content_type() {
        let http = StaticHttp::new("text/html", "<html></html>");
        let catalog = catalog_with(ThemeRegistry::new());

        let err = catalog.load("https://example.com/theme.json", &http).unwrap_err();
        assert!(matches!(
            err,
            ThemeError::UnexpectedContentType { content_type, .. } if content_type == "text/html"
        ));
    }

    #[test]
    fn test_built_in_and_unknown_load_as_none() {
        let http = StaticHttp::new("application/json", "{}");
        let catalog = catalog_with(ThemeRegistry::with_default_built_ins());

        assert!(catalog.load("kubernetes-v0.3", &http).unwrap().is_none());
        assert!(catalog.load("not-a-theme", &http).unwrap().is_none());
        assert!(http.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_load_registered_and_built_in_from_disk() {
        let root = tempfile::tempdir().unwrap();
        let theme_dir = root.path().join("kubernetes-v0.3");
        fs::create_dir(&theme_dir).unwrap();
        fs::write(
            theme_dir.join(THEME_MANIFEST),
            r#"{"name": "Kubernetes", "elements": [{"tag": "Pod", "icon": "pod.png"}]}"#,
        )
        .unwrap();

        let mut registry = ThemeRegistry::with_default_built_ins();
        registry.set_built_in_root(root.path());
        registry.register("k8s", &theme_dir);
        let catalog = catalog_with(registry);

        let built_in = catalog.load_built_in("kubernetes-v0.3").unwrap().unwrap();
        assert_eq!(built_in.source().directory(), Some(theme_dir.as_path()));
        // Icons of on-disk themes stay relative to their directory.
        assert_eq!(
            built_in.document().styles().element_style("Pod").unwrap().icon(),
            Some("pod.png")
        );

        let http = StaticHttp::new("application/json", "{}");
        let registered = catalog.load("k8s", &http).unwrap().unwrap();
        assert_eq!(registered.document().name(), Some("Kubernetes"));
        assert!(matches!(registered.source(), ThemeSource::Registered { name, .. } if name == "k8s"));
    }

    #[test]
    fn test_load_file() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("house.json");
        fs::write(&path, r#"{"name": "House"}"#).unwrap();

        let catalog = catalog_with(ThemeRegistry::new());
        let theme = catalog.load_file(&path).unwrap();
        assert_eq!(theme.document().name(), Some("House"));
        assert_eq!(theme.source().directory(), Some(root.path()));

        let err = catalog.load_file(&root.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ThemeError::UnreachableResource { .. }));
    }

    #[test]
    fn test_load_built_in_without_root() {
        let catalog = catalog_with(ThemeRegistry::with_default_built_ins());
        assert!(catalog.load_built_in("kubernetes-v0.3").unwrap().is_none());
    }

    #[test]
    fn test_sunset_warning_once() {
        let http = StaticHttp::new("application/json", "{}");
        let catalog = catalog_with(ThemeRegistry::new());
        assert!(!catalog.sunset_warned());

        catalog
            .load("https://example.com/theme.json", &http)
            .unwrap();
        assert!(!catalog.sunset_warned());

        let url = "https://static.structurizr.com/themes/default/theme.json";
        catalog.load(url, &http).unwrap();
        assert!(catalog.sunset_warned());
        catalog.load(url, &http).unwrap();
        assert_eq!(http.requests.lock().unwrap().len(), 3);
    }
}
