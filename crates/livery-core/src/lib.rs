//! Livery Core Types and Definitions
//!
//! This crate provides the foundational types for the Livery style engine.
//! It includes:
//!
//! - **Tags**: Ordered, deduplicated style selectors ([`tag::TagSet`])
//! - **Colors**: CSS color parsing normalized to hex ([`color::Color`])
//! - **Images**: Icon and logo reference validation and data URIs ([`image`] module)
//! - **Styles**: Tri-state element and relationship style definitions and their
//!   resolved, fully-populated counterparts ([`style`] module)

pub mod color;
pub mod image;
pub mod style;
pub mod tag;

mod error;

pub use error::StyleError;
