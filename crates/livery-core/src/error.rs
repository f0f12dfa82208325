//! Errors raised when a style value is assigned directly.

use thiserror::Error;

/// Error returned when a style property is given a value it cannot hold.
///
/// These errors surface synchronously from setters and `FromStr`
/// implementations. Theme parsing reports the same problems as serde errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// The value is neither an `http(s)` URL nor an image data URI.
    #[error("`{0}` is not a valid image reference, expected an http(s) URL or a data URI")]
    InvalidImageReference(String),

    #[error("invalid color `{value}`: {reason}")]
    InvalidColor { value: String, reason: String },

    /// An enumerated property was given an unknown name.
    #[error("invalid {property} `{value}`, valid values: {expected}")]
    InvalidValue {
        property: &'static str,
        value: String,
        expected: &'static str,
    },
}
