//! Error types for Livery operations.
//!
//! [`ThemeError`] covers everything that can go wrong while loading a theme or
//! an icon. These errors are usually caught per theme or per icon, logged and
//! skipped. [`LiveryError`] is the top-level error for whole operations such
//! as reading a workspace file.

use std::io;

use thiserror::Error;

use livery_core::{StyleError, image::ImageError};

/// Failure to load a theme document or one of its icons.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The content is not a valid theme document.
    #[error("invalid theme document `{reference}`: {reason}")]
    InvalidThemeDocument { reference: String, reason: String },

    /// The server answered with a content type other than JSON or plain text.
    #[error("unexpected content type `{content_type}` for `{url}`")]
    UnexpectedContentType { url: String, content_type: String },

    /// The resource could not be fetched or read.
    #[error("unable to reach `{location}`: {reason}")]
    UnreachableResource { location: String, reason: String },

    /// The bytes of an icon are not an image.
    #[error("`{location}` is not a supported image")]
    UnsupportedImage { location: String },

    /// The URL matches none of the configured allow-list patterns.
    #[error("`{url}` is not allowed by the configured URL allow-list")]
    NotAllowed { url: String },
}

impl ThemeError {
    pub(crate) fn invalid_document(reference: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidThemeDocument {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn unreachable(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::UnreachableResource {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn from_image_error(location: impl Into<String>, err: ImageError) -> Self {
        match err {
            ImageError::UnsupportedImage => Self::UnsupportedImage {
                location: location.into(),
            },
        }
    }
}

/// The main error type for Livery operations.
#[derive(Debug, Error)]
pub enum LiveryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),

    #[error("Style error: {0}")]
    Style(#[from] StyleError),

    #[error("Invalid workspace: {0}")]
    Workspace(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
