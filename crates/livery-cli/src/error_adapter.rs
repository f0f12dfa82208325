//! Error adapter for converting LiveryError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use livery::{LiveryError, ThemeError};

/// Adapter for a [`LiveryError`].
///
/// Adds a diagnostic code per error variant and, where one exists, a hint on
/// how to fix the problem.
pub struct ErrorAdapter<'a>(pub &'a LiveryError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            LiveryError::Io(_) => "livery::io",
            LiveryError::Theme(_) => "livery::theme",
            LiveryError::Style(_) => "livery::style",
            LiveryError::Workspace(_) => "livery::workspace",
            LiveryError::Json(_) => "livery::json",
            LiveryError::Config(_) => "livery::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            LiveryError::Theme(ThemeError::NotAllowed { .. }) => {
                "add a matching pattern to `http.allow` in the configuration file"
            }
            LiveryError::Theme(ThemeError::UnexpectedContentType { .. }) => {
                "themes must be served as application/json or text/plain"
            }
            LiveryError::Config(_) => "pass a valid TOML file with --config",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Convert a [`LiveryError`] into a list of reportable errors.
///
/// Every error currently yields a single report.
pub fn to_reportables(err: &LiveryError) -> Vec<ErrorAdapter<'_>> {
    vec![ErrorAdapter(err)]
}
