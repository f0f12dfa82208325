//! Known theme names and where their files live.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, warn};

use super::THEME_MANIFEST;
use crate::config::ThemesConfig;

/// Names of the themes shipped as built-ins.
pub const DEFAULT_BUILT_IN_THEMES: &[&str] = &[
    "amazon-web-services-2020.04.30",
    "amazon-web-services-2022.04.30",
    "amazon-web-services-2023.01.31",
    "google-cloud-platform-v1.5",
    "kubernetes-v0.3",
    "microsoft-azure-2019.09.11",
    "microsoft-azure-2020.07.13",
    "microsoft-azure-2021.01.26",
    "microsoft-azure-2023.01.24",
    "microsoft-azure-2024.07.15",
    "oracle-cloud-infrastructure-2020.04.30",
    "oracle-cloud-infrastructure-2021.04.30",
    "oracle-cloud-infrastructure-2023.04.01",
];

/// Built-in and registered theme names.
///
/// Populated once at startup and then shared read-only, typically behind an
/// `Arc`. Built-in themes are packaged as `<built_in_root>/<name>/theme.json`;
/// registered themes are directories holding a `theme.json` manifest.
#[derive(Debug, Clone, Default)]
pub struct ThemeRegistry {
    built_ins: IndexSet<String>,
    built_in_root: Option<PathBuf>,
    registered: IndexMap<String, PathBuf>,
}

impl ThemeRegistry {
    /// Creates a registry with no built-in or registered themes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with [`DEFAULT_BUILT_IN_THEMES`].
    pub fn with_default_built_ins() -> Self {
        let mut registry = Self::new();
        registry.set_built_ins(DEFAULT_BUILT_IN_THEMES.iter().copied());
        registry
    }

    /// Builds a registry from the themes configuration section.
    ///
    /// Configured built-in names replace the default list. If a themes
    /// directory is configured, its subdirectories are registered.
    pub fn from_config(config: &ThemesConfig) -> Self {
        let mut registry = match config.built_ins() {
            Some(names) => {
                let mut registry = Self::new();
                registry.set_built_ins(names.iter().map(String::as_str));
                registry
            }
            None => Self::with_default_built_ins(),
        };

        if let Some(root) = config.built_in_directory() {
            registry.set_built_in_root(root);
        }
        if let Some(directory) = config.directory() {
            registry.register_directory(directory);
        }
        registry
    }

    /// Replaces the set of built-in theme names.
    pub fn set_built_ins<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.built_ins = names
            .into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Sets the directory that holds the packaged built-in themes.
    pub fn set_built_in_root(&mut self, root: impl Into<PathBuf>) {
        self.built_in_root = Some(root.into());
    }

    pub fn built_ins(&self) -> impl Iterator<Item = &str> {
        self.built_ins.iter().map(String::as_str)
    }

    pub fn is_built_in(&self, name: &str) -> bool {
        self.built_ins.contains(name)
    }

    /// Returns the packaged directory of a built-in theme.
    ///
    /// `None` if `name` is not built in or no built-in root is configured.
    pub fn built_in_directory(&self, name: &str) -> Option<PathBuf> {
        if !self.is_built_in(name) {
            return None;
        }
        self.built_in_root.as_ref().map(|root| root.join(name))
    }

    /// Registers a single theme directory under `name`.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register(&mut self, name: impl Into<String>, directory: impl Into<PathBuf>) {
        let name = name.into();
        let directory = directory.into();
        debug!(name, directory:? = directory; "Registering theme");
        self.registered.insert(name, directory);
    }

    /// Registers every immediate subdirectory of `path` that contains a theme
    /// manifest, under the subdirectory's name.
    ///
    /// Subdirectories without a manifest are skipped. A path that is missing
    /// or not a directory logs a warning and registers nothing.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory whose children are theme directories.
    ///
    /// # Returns
    ///
    /// The number of themes registered.
    pub fn register_directory(&mut self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path:? = path, err:%; "Themes directory is not readable, no themes registered");
                return 0;
            }
        };

        let mut directories: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|dir| dir.is_dir() && dir.join(THEME_MANIFEST).is_file())
            .collect();
        directories.sort();

        let mut count = 0;
        for directory in directories {
            let Some(name) = directory.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            self.register(name.to_string(), directory.clone());
            count += 1;
        }

        info!(path:? = path, count; "Registered themes");
        count
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// Returns the directory of a registered theme.
    pub fn registered_directory(&self, name: &str) -> Option<&Path> {
        self.registered.get(name).map(PathBuf::as_path)
    }

    pub fn registered(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.registered
            .iter()
            .map(|(name, directory)| (name.as_str(), directory.as_path()))
    }
}
