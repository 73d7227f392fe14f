//! # Page Composer CLI
//!
//! Library half of the `page-composer` binary: argument definitions and the
//! commands they drive. A document is loaded from its JSON form into a fresh
//! [`DocumentStore`], optionally edited by a script of [`EditCommand`]s, then
//! exported or described.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use composer_core::{
    apply_all, composition, DocumentFile, DocumentStore, EditCommand, Element, StoreConfig,
};
use composer_export::{ExportConfig, ExportFormat, Exporter, PageGeometry, SvgRasterizer};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "page-composer")]
#[command(about = "Compose single-page documents and export them to PDF, PNG or SVG")]
#[command(version)]
pub struct Cli {
    /// Maximum number of undo steps kept while replaying a script
    #[arg(long, global = true, env = "PAGE_COMPOSER_HISTORY_LIMIT")]
    pub history_limit: Option<usize>,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export a document page to a file named after its title
    Export(ExportArgs),
    /// Print the page settings and element tree of a document
    Inspect(InspectArgs),
}

/// Arguments of `page-composer export`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Document to export (JSON)
    pub file: PathBuf,

    /// Directory the exported file is written to
    #[arg(long, short, default_value = ".")]
    pub out: PathBuf,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = Format::Pdf)]
    pub format: Format,

    /// Output density in dots per inch
    #[arg(long, default_value_t = 96.0)]
    pub dpi: f32,

    /// Multiplier on the output density
    #[arg(long, default_value_t = 2.0)]
    pub scale: f32,

    /// Edit script (JSON array of commands) applied before exporting
    #[arg(long)]
    pub script: Option<PathBuf>,
}

/// Arguments of `page-composer inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Document to inspect (JSON)
    pub file: PathBuf,

    /// Edit script (JSON array of commands) applied before inspecting
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Print the resulting document as JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}

/// Output format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Single-page PDF
    Pdf,
    /// PNG bitmap
    Png,
    /// SVG markup
    Svg,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => Self::Pdf,
            Format::Png => Self::Png,
            Format::Svg => Self::Svg,
        }
    }
}

impl From<&ExportArgs> for ExportConfig {
    fn from(args: &ExportArgs) -> Self {
        Self {
            dpi: args.dpi,
            scale: args.scale,
            ..Self::default()
        }
    }
}

impl Cli {
    /// Store configuration derived from the global flags.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            history_limit: self.history_limit,
            ..StoreConfig::default()
        }
    }
}

/// Run the parsed command line. Returns the text to print on success.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, a script command is
/// rejected, or the export fails.
pub fn run(cli: &Cli) -> anyhow::Result<String> {
    let store_config = cli.store_config();
    match &cli.command {
        Command::Export(args) => {
            let store = load_store(&args.file, args.script.as_deref(), &store_config)?;
            let path = export(&store, args)?;
            Ok(format!("{}", path.display()))
        }
        Command::Inspect(args) => {
            let store = load_store(&args.file, args.script.as_deref(), &store_config)?;
            if args.json {
                Ok(DocumentFile::from_store(&store).to_json()?)
            } else {
                Ok(describe(&store))
            }
        }
    }
}

/// Open the document at `path` and replay `script` on top of it.
///
/// # Errors
///
/// Returns an error if either file cannot be read, does not parse, or the
/// document or a script command violates the tree invariants.
pub fn load_store(
    path: &Path,
    script: Option<&Path>,
    config: &StoreConfig,
) -> anyhow::Result<DocumentStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    let mut store = DocumentFile::from_json(&json)
        .and_then(|file| file.into_store(config))
        .with_context(|| format!("invalid document {}", path.display()))?;

    if let Some(script) = script {
        let text = std::fs::read_to_string(script)
            .with_context(|| format!("failed to read script {}", script.display()))?;
        let commands: Vec<EditCommand> = serde_json::from_str(&text)
            .with_context(|| format!("invalid script {}", script.display()))?;
        let applied = apply_all(&mut store, commands)
            .with_context(|| format!("script {} rejected", script.display()))?;
        tracing::info!(applied, script = %script.display(), "script replayed");
    }
    Ok(store)
}

/// Export the current page of `store` as described by `args`.
///
/// # Errors
///
/// Returns an error if the export fails; the store is left as it was.
pub fn export(store: &DocumentStore, args: &ExportArgs) -> anyhow::Result<PathBuf> {
    let exporter = Exporter::new(ExportConfig::from(args));
    let path = exporter
        .export_to_dir(store.document(), args.format.into(), &SvgRasterizer, &args.out)
        .with_context(|| format!("failed to export \"{}\"", store.title()))?;
    Ok(path)
}

/// Human-readable summary of the page settings and element tree.
#[must_use]
pub fn describe(store: &DocumentStore) -> String {
    let page = PageGeometry::render(store.paper_format());
    let (px_w, px_h) = page.pixel_dimensions(1.0);
    let top = store.elements().len();
    let total = composition::walk(store.elements()).count();

    let mut out = String::new();
    let _ = writeln!(out, "Title:    {}", store.title());
    let _ = writeln!(
        out,
        "Format:   {} ({} x {} mm, {px_w} x {px_h} px)",
        store.paper_format(),
        page.width_mm,
        page.height_mm,
    );
    let _ = writeln!(out, "Elements: {top} top-level, {total} total");
    for element in store.elements() {
        describe_element(&mut out, element, 1);
    }
    out
}

fn describe_element(out: &mut String, element: &Element, depth: usize) {
    let size = element.size.map_or_else(
        || "auto".to_string(),
        |s| format!("{} x {}", s.width, s.height),
    );
    let _ = writeln!(
        out,
        "{:indent$}- {} {} at ({}, {}) {size}",
        "",
        element.kind(),
        element.id,
        element.position.x,
        element.position.y,
        indent = depth * 2,
    );
    for child in element.children() {
        describe_element(out, child, depth + 1);
    }
}
