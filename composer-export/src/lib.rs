//! # Page Composer Export
//!
//! Turns a document page into SVG, PNG or a single-page PDF. Export only
//! reads the document; a failure at any stage surfaces as one
//! [`ExportError`] and leaves the document untouched.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌────────────┐   ┌───────────────┐
//! │ Document │──▶│ PageSurface │──▶│ Rasterizer │──▶│ PdfPageMapper │
//! │          │   │ (SVG page)  │   │ (Bitmap)   │   │ (one page)    │
//! └──────────┘   └─────────────┘   └────────────┘   └───────────────┘
//! ```
//!
//! Rasterization and PDF output need the `export` feature (on by default).

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod page;
pub mod svg;

pub use error::{ExportError, ExportResult};
#[cfg(feature = "export")]
pub use export::{PdfPageMapper, SvgRasterizer};
pub use export::{
    export_file_name, file_name, Bitmap, ExportConfig, ExportFormat, Exporter, PageSurface,
    Rasterizer,
};
pub use page::PageGeometry;
pub use svg::render_page_svg;
