//! Configuration types for the Livery engine.
//!
//! All types implement [`serde::Deserialize`] with every section defaulted,
//! so a partial (or empty) configuration file is valid.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining HTTP and theme settings.
//! - [`HttpConfig`] - Timeout and URL allow-list for remote themes and icons.
//! - [`ThemesConfig`] - Where registered and built-in themes live on disk.
//!
//! # Example
//!
//! ```
//! # use livery::config::AppConfig;
//! let config: AppConfig = serde_json::from_str(r#"{"http": {"timeout_ms": 2500}}"#).unwrap();
//! assert_eq!(config.http().timeout().as_millis(), 2500);
//! assert!(config.themes().directory().is_none());
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

/// Remote fetches give up after this many milliseconds by default.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP configuration section.
    #[serde(default)]
    http: HttpConfig,

    /// Theme locations section.
    #[serde(default)]
    themes: ThemesConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `http` - Timeout and allow-list for remote fetches.
    /// * `themes` - Registered and built-in theme locations.
    pub fn new(http: HttpConfig, themes: ThemesConfig) -> Self {
        Self { http, themes }
    }

    /// Returns the HTTP configuration.
    pub fn http(&self) -> &HttpConfig {
        &self.http
    }

    /// Returns the theme configuration.
    pub fn themes(&self) -> &ThemesConfig {
        &self.themes
    }
}

/// Settings for remote theme and icon fetches.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,

    /// Regular expressions a URL must match to be fetched. Empty denies all.
    #[serde(default)]
    allow: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            allow: Vec::new(),
        }
    }
}

impl HttpConfig {
    /// Creates a new [`HttpConfig`].
    ///
    /// # Arguments
    ///
    /// * `timeout` - Global timeout for a single request.
    /// * `allow` - URL patterns; an empty list denies every URL.
    pub fn new(timeout: Duration, allow: Vec<String>) -> Self {
        Self {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            allow,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn allow(&self) -> &[String] {
        &self.allow
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Locations of themes on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemesConfig {
    /// Directory whose subdirectories are registered as themes.
    #[serde(default)]
    directory: Option<PathBuf>,

    /// Directory holding the packaged built-in themes.
    #[serde(default)]
    built_in_directory: Option<PathBuf>,

    /// Replaces the default list of built-in theme names.
    #[serde(default)]
    built_ins: Option<Vec<String>>,
}

impl ThemesConfig {
    /// Creates a new [`ThemesConfig`].
    ///
    /// # Arguments
    ///
    /// * `directory` - Registered themes directory.
    /// * `built_in_directory` - Packaged built-in themes directory.
    /// * `built_ins` - Built-in names, or `None` for the default list.
    pub fn new(
        directory: Option<PathBuf>,
        built_in_directory: Option<PathBuf>,
        built_ins: Option<Vec<String>>,
    ) -> Self {
        Self {
            directory,
            built_in_directory,
            built_ins,
        }
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn built_in_directory(&self) -> Option<&Path> {
        self.built_in_directory.as_deref()
    }

    pub fn built_ins(&self) -> Option<&[String]> {
        self.built_ins.as_deref()
    }
}
