//! Command-line argument definitions for the Livery CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects the operation; global options control
//! configuration file selection and logging verbosity.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Livery style tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// Operations on a workspace JSON document
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the style of every element and relationship
    Resolve {
        /// Path to the workspace JSON file
        input: String,

        /// Write the resolved styles here instead of standard output
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Inline theme icons (and optionally a theme file) into the workspace
    Inline {
        /// Path to the workspace JSON file
        input: String,

        /// Path to the updated workspace; defaults to overwriting the input
        #[arg(short, long)]
        output: Option<String>,

        /// Theme JSON file whose styles override the local styles
        #[arg(short, long)]
        theme: Option<String>,
    },

    /// Export the workspace's local styles as a theme
    ExportTheme {
        /// Path to the workspace JSON file
        input: String,

        /// Write the theme here instead of standard output
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Command {
    /// Returns the workspace path the command reads.
    pub fn input(&self) -> &str {
        match self {
            Self::Resolve { input, .. }
            | Self::Inline { input, .. }
            | Self::ExportTheme { input, .. } => input,
        }
    }
}
