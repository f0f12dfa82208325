//! Livery CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use livery_cli::{Args, error_adapter::to_reportables};

fn main() {
    // Must run before anything can panic
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);

    info!(input = args.command.input(); "Starting Livery");
    debug!(args:?; "Parsed arguments");

    let Err(err) = livery_cli::run(&args) else {
        info!("Completed successfully");
        return;
    };

    // Render each diagnostic on its own
    let reporter = miette::GraphicalReportHandler::new();
    for reportable in to_reportables(&err) {
        let mut rendered = String::new();
        reporter
            .render_report(&mut rendered, &reportable)
            .expect("Writing to String buffer is infallible");
        error!("{rendered}");
    }
    process::exit(1);
}

/// Sets up `env_logger`, falling back to `warn` for an unknown level name.
fn init_logger(level: &str) {
    let filter = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Unknown log level '{level}', falling back to 'warn'");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();
}
