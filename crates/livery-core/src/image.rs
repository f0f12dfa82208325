//! Image references used for icons and logos.
//!
//! Icons appear in three forms: absolute `http(s)` URLs, embedded
//! `data:image/...` URIs, and paths relative to the theme that declares them.
//! [`ImageReference::classify`] tells them apart, [`validate`] accepts only the
//! first two (the forms a renderer can use without further lookups), and
//! [`to_data_uri`] turns raw image bytes into an embedded URI.

use base64::Engine as _;
use thiserror::Error;
use url::Url;

use crate::StyleError;

/// Error raised when bytes cannot be embedded as an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("content is not a recognized image format")]
    UnsupportedImage,
}

/// The form of an icon or logo string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageReference {
    /// An absolute `http` or `https` URL.
    Url,
    /// An embedded `data:image/...` URI.
    DataUri,
    /// Anything else, interpreted relative to the declaring theme.
    Relative,
}

impl ImageReference {
    /// Classifies an icon or logo string.
    ///
    /// # Examples
    ///
    /// ```
    /// use livery_core::image::ImageReference;
    ///
    /// assert_eq!(ImageReference::classify("https://example.com/a.png"), ImageReference::Url);
    /// assert_eq!(ImageReference::classify("data:image/png;base64,AAAA"), ImageReference::DataUri);
    /// assert_eq!(ImageReference::classify("icons/a.png"), ImageReference::Relative);
    /// ```
    pub fn classify(value: &str) -> Self {
        let value = value.trim();
        if is_http_url(value) {
            Self::Url
        } else if value.starts_with("data:image/") {
            Self::DataUri
        } else {
            Self::Relative
        }
    }

    /// Returns `true` if a renderer can use the reference directly.
    pub fn is_absolute(self) -> bool {
        matches!(self, Self::Url | Self::DataUri)
    }
}

/// Returns `true` if `value` parses as an absolute `http` or `https` URL.
pub fn is_http_url(value: &str) -> bool {
    Url::parse(value.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Validates an image reference assigned directly to a logo or icon.
///
/// # Errors
///
/// Returns [`StyleError::InvalidImageReference`] if the value is not an
/// `http(s)` URL or an image data URI.
pub fn validate(value: &str) -> Result<String, StyleError> {
    let trimmed = value.trim();
    if ImageReference::classify(trimmed).is_absolute() {
        Ok(trimmed.to_string())
    } else {
        Err(StyleError::InvalidImageReference(value.to_string()))
    }
}

/// Rewrites a relative reference against `base_url`.
///
/// `base_url` is the location of the declaring theme document; everything
/// after its last `/` is dropped before the icon is appended. Absolute
/// references are returned unchanged.
///
/// # Examples
///
/// ```
/// use livery_core::image::absolutize;
///
/// let base = "https://example.com/themes/aws/theme.json";
/// assert_eq!(absolutize("lambda.png", base), "https://example.com/themes/aws/lambda.png");
/// assert_eq!(absolutize("https://cdn.example.com/x.png", base), "https://cdn.example.com/x.png");
/// ```
pub fn absolutize(icon: &str, base_url: &str) -> String {
    if ImageReference::classify(icon).is_absolute() {
        return icon.to_string();
    }

    let base = match base_url.rfind('/') {
        Some(idx) => &base_url[..=idx],
        None => base_url,
    };
    format!("{base}{icon}")
}

/// Encodes image bytes as a base64 data URI.
///
/// The format is sniffed from the content, not from a file name, so the MIME
/// type always matches the bytes. SVG documents are recognized by their
/// leading markup.
///
/// # Errors
///
/// Returns [`ImageError::UnsupportedImage`] for content that is not an image.
pub fn to_data_uri(bytes: &[u8]) -> Result<String, ImageError> {
    let mime = mime_type(bytes).ok_or(ImageError::UnsupportedImage)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{mime};base64,{encoded}"))
}

fn mime_type(bytes: &[u8]) -> Option<&'static str> {
    if let Ok(format) = ::image::guess_format(bytes) {
        return Some(format.to_mime_type());
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        Some("image/svg+xml")
    } else {
        None
    }
}
