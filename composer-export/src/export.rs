//! Page export: rasterization, bitmap encoding and single-page PDF output.
//!
//! The pipeline is `Document -> PageSurface (SVG) -> Bitmap -> PNG | PDF`.
//! Rasterization sits behind the [`Rasterizer`] trait so the orchestration
//! can run against any backend; [`SvgRasterizer`] is the resvg/tiny-skia
//! implementation. Nothing in this module mutates the document.

use std::io::Cursor;
#[cfg(feature = "export")]
use std::path::{Path, PathBuf};

use composer_core::Document;
#[cfg(feature = "export")]
use composer_core::PaperFormat;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};
use crate::page::{PageGeometry, CSS_DPI};
use crate::svg::render_page_svg;

/// File stem used when a document has no usable title.
pub const FALLBACK_FILE_STEM: &str = "document";

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Single-page PDF with the rasterized page embedded.
    #[default]
    Pdf,
    /// PNG bitmap of the page.
    Png,
    /// SVG vector rendering of the page.
    Svg,
}

impl ExportFormat {
    /// File extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// Configuration for page export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output density in dots per inch before scaling (default: 96.0).
    pub dpi: f32,
    /// Multiplier on the output density (default: 2.0).
    pub scale: f32,
    /// Page background as RGBA bytes (default: opaque white).
    pub background: [u8; 4],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi: CSS_DPI,
            scale: 2.0,
            background: [255, 255, 255, 255],
        }
    }
}

impl ExportConfig {
    /// Check that the configuration can produce a page.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidConfig`] for a non-positive or
    /// non-finite dpi or scale.
    pub fn validate(&self) -> ExportResult<()> {
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(ExportError::InvalidConfig(format!(
                "dpi must be positive, got {}",
                self.dpi
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ExportError::InvalidConfig(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// A rendered page ready for rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSurface {
    /// Physical page the surface represents.
    pub page: PageGeometry,
    /// SVG markup of the page.
    pub svg: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl PageSurface {
    /// Render `document` into a surface.
    #[must_use]
    pub fn from_document(document: &Document, config: &ExportConfig) -> Self {
        let page = PageGeometry::for_format(document.paper_format, config.dpi);
        let (width, height) = page.pixel_dimensions(config.scale);
        Self {
            page,
            svg: render_page_svg(document, config),
            width,
            height,
        }
    }
}

/// Straight (non-premultiplied) RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long.
    pub rgba: Vec<u8>,
}

impl Bitmap {
    /// Encode as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Encode`] if the buffer does not match the
    /// dimensions or encoding fails.
    pub fn encode_png(&self) -> ExportResult<Vec<u8>> {
        let image = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or_else(|| {
                ExportError::Encode(format!(
                    "buffer of {} bytes does not fit {}x{}",
                    self.rgba.len(),
                    self.width,
                    self.height
                ))
            })?;

        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, image::ImageFormat::Png)
            .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))?;
        Ok(buf.into_inner())
    }
}

/// Turns a page surface into pixels.
pub trait Rasterizer {
    /// Rasterize `surface` at its output size.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Rasterize`] if the surface cannot be drawn.
    fn rasterize(&self, surface: &PageSurface) -> ExportResult<Bitmap>;
}

/// Rasterizer backed by usvg/resvg and tiny-skia.
#[cfg(feature = "export")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRasterizer;

#[cfg(feature = "export")]
impl Rasterizer for SvgRasterizer {
    fn rasterize(&self, surface: &PageSurface) -> ExportResult<Bitmap> {
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(&surface.svg, &opt)
            .map_err(|e| ExportError::Rasterize(format!("SVG parsing failed: {e}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(surface.width.max(1), surface.height.max(1))
            .ok_or_else(|| ExportError::Rasterize("failed to create pixmap".to_string()))?;

        #[allow(clippy::cast_precision_loss)]
        let transform = tiny_skia::Transform::from_scale(
            surface.width as f32 / tree.size().width(),
            surface.height as f32 / tree.size().height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        Ok(Bitmap {
            width: pixmap.width(),
            height: pixmap.height(),
            rgba,
        })
    }
}

/// Places a bitmap on a single PDF page sized from the paper format.
#[cfg(feature = "export")]
#[derive(Debug, Clone)]
pub struct PdfPageMapper {
    format: PaperFormat,
    title: String,
}

#[cfg(feature = "export")]
impl PdfPageMapper {
    /// Mapper for one page of `format`.
    #[must_use]
    pub fn new(format: PaperFormat, title: impl Into<String>) -> Self {
        Self {
            format,
            title: title.into(),
        }
    }

    /// Page format of the produced PDF.
    #[must_use]
    pub fn format(&self) -> PaperFormat {
        self.format
    }

    /// Build a one-page PDF with `bitmap` scaled to cover the whole page.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Pdf`] if the image cannot be embedded or the
    /// document cannot be serialized.
    #[allow(clippy::cast_precision_loss)]
    pub fn map(&self, bitmap: &Bitmap) -> ExportResult<Vec<u8>> {
        let (page_w_mm, page_h_mm) = self.format.dimensions_mm();
        let png = bitmap.encode_png()?;

        let (doc, page1, layer1) = printpdf::PdfDocument::new(
            &self.title,
            printpdf::Mm(page_w_mm),
            printpdf::Mm(page_h_mm),
            "Layer 1",
        );
        let current_layer = doc.get_page(page1).get_layer(layer1);

        // Decode through printpdf's bundled image crate for type compatibility
        let dynamic_image = printpdf::image_crate::load_from_memory(&png)
            .map_err(|e| ExportError::Pdf(format!("failed to decode page bitmap: {e}")))?;
        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

        // Pick the density at which the bitmap is exactly one page wide, then
        // stretch vertically to absorb pixel rounding.
        let width_in = page_w_mm / crate::page::MM_PER_INCH;
        let height_in = page_h_mm / crate::page::MM_PER_INCH;
        let dpi = bitmap.width.max(1) as f32 / width_in;
        let natural_height_in = bitmap.height.max(1) as f32 / dpi;

        let transform = printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            dpi: Some(dpi),
            scale_x: Some(1.0),
            scale_y: Some(height_in / natural_height_in),
            ..Default::default()
        };
        pdf_image.add_to_layer(current_layer, transform);

        doc.save_to_bytes()
            .map_err(|e| ExportError::Pdf(format!("PDF save failed: {e}")))
    }
}

/// File name for an export of a document titled `title`.
///
/// Blank titles fall back to `document`; characters that cannot appear in a
/// file name are replaced with `_`.
#[must_use]
pub fn file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() || stem.chars().all(|c| c == '.') {
        FALLBACK_FILE_STEM
    } else {
        &stem
    };
    format!("{stem}.{}", format.extension())
}

/// PDF file name for a document titled `title`.
#[must_use]
pub fn export_file_name(title: &str) -> String {
    file_name(title, ExportFormat::Pdf)
}

/// Drives a document through the export pipeline.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render the page as an SVG string.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn render_svg(&self, document: &Document) -> ExportResult<String> {
        self.config.validate()?;
        Ok(render_page_svg(document, &self.config))
    }

    /// Render the page into a surface for rasterization.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn render_surface(&self, document: &Document) -> ExportResult<PageSurface> {
        self.config.validate()?;
        Ok(PageSurface::from_document(document, &self.config))
    }

    /// Rasterize the page and encode it as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering, rasterization or encoding fails.
    pub fn export_png(
        &self,
        document: &Document,
        rasterizer: &dyn Rasterizer,
    ) -> ExportResult<Vec<u8>> {
        let surface = self.render_surface(document)?;
        rasterizer.rasterize(&surface)?.encode_png()
    }

    /// Rasterize the page and wrap it in a single-page PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering, rasterization or PDF generation fails.
    #[cfg(feature = "export")]
    pub fn export_pdf_bytes(
        &self,
        document: &Document,
        rasterizer: &dyn Rasterizer,
    ) -> ExportResult<Vec<u8>> {
        let surface = self.render_surface(document)?;
        let bitmap = rasterizer.rasterize(&surface)?;
        PdfPageMapper::new(document.paper_format, &document.title).map(&bitmap)
    }

    /// Produce the bytes of `document` in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage of the pipeline fails.
    #[cfg(feature = "export")]
    pub fn export(
        &self,
        document: &Document,
        format: ExportFormat,
        rasterizer: &dyn Rasterizer,
    ) -> ExportResult<Vec<u8>> {
        match format {
            ExportFormat::Pdf => self.export_pdf_bytes(document, rasterizer),
            ExportFormat::Png => self.export_png(document, rasterizer),
            ExportFormat::Svg => self.render_svg(document).map(String::into_bytes),
        }
    }

    /// Export `document` in `format` into `out_dir`, named after its title.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage fails or the file cannot be written.
    #[cfg(feature = "export")]
    pub fn export_to_dir(
        &self,
        document: &Document,
        format: ExportFormat,
        rasterizer: &dyn Rasterizer,
        out_dir: &Path,
    ) -> ExportResult<PathBuf> {
        let bytes = self.export(document, format, rasterizer).map_err(|e| {
            tracing::warn!(title = %document.title, error = %e, "export failed");
            e
        })?;
        let path = out_dir.join(file_name(&document.title, format));
        std::fs::write(&path, &bytes)?;
        tracing::info!(
            path = %path.display(),
            format = format.extension(),
            bytes = bytes.len(),
            "page exported"
        );
        Ok(path)
    }

    /// Export `document` as `{title}.pdf` into `out_dir`.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage fails or the file cannot be written.
    #[cfg(feature = "export")]
    pub fn export_pdf(
        &self,
        document: &Document,
        rasterizer: &dyn Rasterizer,
        out_dir: &Path,
    ) -> ExportResult<PathBuf> {
        self.export_to_dir(document, ExportFormat::Pdf, rasterizer, out_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_core::PaperFormat;

    struct SolidRasterizer([u8; 4]);

    impl Rasterizer for SolidRasterizer {
        fn rasterize(&self, surface: &PageSurface) -> ExportResult<Bitmap> {
            let pixels = (surface.width * surface.height) as usize;
            Ok(Bitmap {
                width: surface.width,
                height: surface.height,
                rgba: self.0.repeat(pixels),
            })
        }
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(&self, _surface: &PageSurface) -> ExportResult<Bitmap> {
            Err(ExportError::Rasterize("backend unavailable".to_string()))
        }
    }

    fn small() -> Exporter {
        Exporter::new(ExportConfig {
            scale: 0.25,
            ..ExportConfig::default()
        })
    }

    #[test]
    fn test_file_names() {
        assert_eq!(export_file_name("Quarterly Report"), "Quarterly Report.pdf");
        assert_eq!(export_file_name("   "), "document.pdf");
        assert_eq!(export_file_name(""), "document.pdf");
        assert_eq!(export_file_name("a/b\\c"), "a_b_c.pdf");
        assert_eq!(export_file_name(".."), "document.pdf");
        assert_eq!(file_name("Menu", ExportFormat::Png), "Menu.png");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let exporter = Exporter::new(ExportConfig {
            scale: 0.0,
            ..ExportConfig::default()
        });
        let result = exporter.render_surface(&Document::default());
        assert!(matches!(result, Err(ExportError::InvalidConfig(_))));
    }

    #[test]
    fn test_surface_size_follows_scale() {
        let surface = Exporter::with_defaults()
            .render_surface(&Document::default())
            .expect("surface");
        assert_eq!((surface.width, surface.height), (1587, 2245));
        assert_eq!(surface.page.format, PaperFormat::A4);
    }

    #[test]
    fn test_png_with_custom_rasterizer() {
        let png = small()
            .export_png(&Document::default(), &SolidRasterizer([255, 0, 0, 255]))
            .expect("png");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }

    #[test]
    fn test_rasterizer_error_propagates() {
        let result = small().export_png(&Document::default(), &FailingRasterizer);
        assert!(matches!(result, Err(ExportError::Rasterize(_))));
    }

    #[test]
    fn test_mismatched_bitmap_is_encode_error() {
        let bitmap = Bitmap {
            width: 2,
            height: 2,
            rgba: vec![0; 3],
        };
        assert!(matches!(bitmap.encode_png(), Err(ExportError::Encode(_))));
    }

    #[cfg(feature = "export")]
    #[test]
    fn test_svg_rasterizer_paints_background() {
        let exporter = small();
        let surface = exporter
            .render_surface(&Document::default())
            .expect("surface");
        let bitmap = SvgRasterizer.rasterize(&surface).expect("rasterize");
        assert_eq!((bitmap.width, bitmap.height), (surface.width, surface.height));
        assert_eq!(&bitmap.rgba[0..4], &[255, 255, 255, 255]);
        assert_eq!(&bitmap.rgba[bitmap.rgba.len() - 4..], &[255, 255, 255, 255]);
    }

    #[cfg(feature = "export")]
    #[test]
    fn test_fractional_page_fills_every_pixel() {
        let mut document = Document::default();
        document.paper_format = PaperFormat::A3;
        let exporter = Exporter::with_defaults();
        let surface = exporter.render_surface(&document).expect("surface");
        assert_eq!((surface.width, surface.height), (2245, 3175));

        let bitmap = SvgRasterizer.rasterize(&surface).expect("rasterize");
        let translucent = bitmap.rgba.chunks_exact(4).filter(|px| px[3] != 255).count();
        assert_eq!(translucent, 0);
    }

    #[cfg(feature = "export")]
    #[test]
    fn test_pdf_bytes_have_header() {
        let pdf = small()
            .export_pdf_bytes(&Document::default(), &SolidRasterizer([0, 0, 255, 255]))
            .expect("pdf");
        assert_eq!(&pdf[0..5], b"%PDF-");
    }
}
