//! Livery CLI - resolve, inline and export workspace styles from the command
//! line.

pub mod error_adapter;

mod args;
mod config;

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use log::{info, warn};
use serde::Serialize;

use livery::{
    LiveryError, StyleEngine,
    style::{ResolvedStyle, StyleKind},
    tag::TagSet,
    workspace::Workspace,
};

pub use args::{Args, Command};

/// One resolved style in the `resolve` output.
#[derive(Serialize)]
struct ResolvedEntry<'a> {
    kind: StyleKind,
    tags: &'a TagSet,
    style: &'a ResolvedStyle,
}

/// Run the Livery command described by `args`.
///
/// # Errors
///
/// Returns a [`LiveryError`] if configuration, the workspace file or an
/// explicitly requested theme cannot be loaded, or if output cannot be
/// written. Themes referenced by the workspace never fail the command.
pub fn run(args: &Args) -> Result<(), LiveryError> {
    let input = args.command.input();
    info!(input_path = input; "Processing workspace");

    let app_config = config::load_config(args.config.as_ref())?;
    let engine = StyleEngine::from_config(&app_config)?;
    let mut workspace = read_workspace(input)?;

    match &args.command {
        Command::Resolve { output, .. } => {
            let stack = engine.build_stack(&workspace);
            let resolved = engine.resolve_all(&workspace, &stack);
            let entries: Vec<_> = resolved
                .iter()
                .map(|(key, style)| ResolvedEntry {
                    kind: key.kind,
                    tags: &key.tags,
                    style,
                })
                .collect();
            write_output(output.as_deref(), &serde_json::to_string_pretty(&entries)?)?;
        }
        Command::Inline { output, theme, .. } => {
            let summary = engine.inline_icons(&mut workspace);
            info!(
                icons_inlined = summary.icons_inlined,
                icons_failed = summary.icons_failed,
                styles_merged = summary.styles_merged;
                "Inlined theme icons"
            );
            for reference in &summary.themes_removed {
                info!(reference; "Theme materialized into local styles");
            }

            if let Some(theme) = theme {
                let summary = engine.inline_theme_file(&mut workspace, Path::new(theme))?;
                info!(
                    theme,
                    icons_inlined = summary.icons_inlined,
                    styles_merged = summary.styles_merged;
                    "Merged theme file"
                );
            }

            let destination = output.as_deref().unwrap_or(input);
            write_output(Some(destination), &workspace.to_json_pretty()?)?;
        }
        Command::ExportTheme { output, .. } => {
            let theme = engine.export_theme(&workspace);
            if theme.styles().is_empty() {
                warn!("Workspace has no local styles, exported theme is empty");
            }
            write_output(output.as_deref(), &theme.to_json_pretty()?)?;
        }
    }

    Ok(())
}

fn read_workspace(path: &str) -> Result<Workspace, LiveryError> {
    let bytes = fs::read(path)?;
    Workspace::from_json(&bytes)
}

/// Writes `content` to the file at `path`, or to standard output.
fn write_output(path: Option<&str>, content: &str) -> Result<(), LiveryError> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            info!(output_path = path; "Output written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{content}")?;
        }
    }
    Ok(())
}
