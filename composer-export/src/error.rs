//! Export error types.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting a page.
///
/// Every export failure surfaces as one of these; the document being
/// exported is never modified.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export configuration cannot produce a page.
    #[error("Invalid export configuration: {0}")]
    InvalidConfig(String),

    /// The page surface could not be rasterized.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// The bitmap could not be encoded.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// The PDF page could not be produced.
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// Writing the output file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
