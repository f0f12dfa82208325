//! Livery - style and theme resolution for software architecture models.
//!
//! Computes, for every tagged element and relationship of a workspace, one
//! concrete visual style by cascading built-in defaults, external themes and
//! workspace-local styles. Also resolves and inlines the icons that themes
//! declare.
//!
//! # Overview
//!
//! - [`StyleEngine`] - Entry point: loads themes, builds stacks, resolves and
//!   inlines.
//! - [`stack`] - The ordered layer stack and the cascade.
//! - [`theme`] - Theme documents, the registry of known names and the catalog
//!   that loads references.
//! - [`icon`] - Icon absolutization and inlining into data URIs.
//! - [`workspace`] - The workspace document the engine reads and updates.
//! - [`http`] - The HTTP seam for remote themes and icons.
//! - [`config`] - Engine configuration.

pub mod config;
pub mod engine;
pub mod http;
pub mod icon;
pub mod stack;
pub mod theme;
pub mod workspace;

mod error;

pub use livery_core::{color, image, style, tag};

pub use engine::{StyleEngine, StyleKey};
pub use error::{LiveryError, ThemeError};
