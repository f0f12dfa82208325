//! Themes: reusable style collections referenced by a workspace.
//!
//! # Overview
//!
//! - [`ThemeDocument`] - The JSON document a theme is stored as.
//! - [`ThemeRegistry`] - Which theme names are built in, and which are
//!   registered from a directory on disk.
//! - [`ThemeCatalog`] - Classifies a theme reference and loads it into a
//!   [`LoadedTheme`].
//!
//! A theme reference is one of:
//!
//! 1. the name of a built-in theme (`amazon-web-services-2023.01.31`),
//! 2. the name of a registered theme directory,
//! 3. an `http(s)` URL of a theme document.
//!
//! Anything else is unknown and is skipped with a warning.

mod catalog;
mod document;
mod registry;

pub use catalog::{LoadedTheme, ThemeCatalog, ThemeKind, ThemeSource};
pub use document::ThemeDocument;
pub use registry::{DEFAULT_BUILT_IN_THEMES, ThemeRegistry};

/// File name of the manifest inside a theme directory.
pub const THEME_MANIFEST: &str = "theme.json";
