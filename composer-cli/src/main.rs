//! # Page Composer
//!
//! `page-composer export <file.json>` writes `{title}.pdf` (or PNG/SVG) for a
//! saved document; `page-composer inspect <file.json>` prints its tree.

use clap::Parser;
use composer_cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: warn, info for the composer crates).
/// Set `RUST_LOG_FORMAT=json` for JSON output. Logs go to stderr so stdout
/// stays clean for command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,composer_cli=info,composer_export=info,composer_core=info")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    tracing::debug!(?cli, "starting page-composer");

    let output = composer_cli::run(&cli)?;
    println!("{output}");
    Ok(())
}
