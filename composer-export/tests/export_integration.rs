//! Integration tests for page export (composer-export).
//!
//! Exercises the full pipeline from a populated store: SVG content, file
//! naming, page sizes per paper format, and raster/PDF output.

use composer_core::{
    create_element, DocumentStore, ElementContent, ElementOptions, PaperFormat, ShapeType,
    TemplateType,
};
use composer_export::{
    export_file_name, render_page_svg, ExportConfig, ExportError, Exporter, PageGeometry,
};
use pretty_assertions::assert_eq;

/// A store with one element of every kind, the template holding a text block.
fn populated_store() -> DocumentStore {
    let mut store = DocumentStore::new();
    store.set_title("Spring Menu");
    store
        .add_element("text", ElementOptions::default())
        .expect("valid");
    store
        .add_element("image", ElementOptions::default())
        .expect("valid");
    store
        .add_element("shape", ElementOptions::shape(ShapeType::Triangle))
        .expect("valid");
    store
        .add_element("table", ElementOptions::table(2, 3))
        .expect("valid");
    let heading = create_element("text", ElementOptions::default()).expect("text");
    store
        .add_element(
            "template",
            ElementOptions::template(TemplateType::Header, vec![heading]),
        )
        .expect("valid");
    store
}

fn small_config() -> ExportConfig {
    ExportConfig {
        scale: 0.25,
        ..ExportConfig::default()
    }
}

// ============================================================================
// SVG
// ============================================================================

#[test]
fn test_svg_contains_every_kind() {
    let store = populated_store();
    let svg = render_page_svg(store.document(), &ExportConfig::default());

    assert!(svg.contains("<title>Spring Menu</title>"));
    assert!(svg.contains("Double-click to edit text"));
    assert!(svg.contains("<image "));
    assert!(svg.contains("images.pexels.com"));
    assert!(svg.contains("<polygon "));
    assert_eq!(svg.matches(">Click to edit</text>").count(), 6);
    assert!(svg.contains("<g transform=\"translate(116,116)\">"));
}

#[test]
fn test_svg_export_does_not_touch_store() {
    let store = populated_store();
    let before = store.snapshot();
    let past = store.history().past_len();

    let _ = Exporter::with_defaults()
        .render_svg(store.document())
        .expect("svg");

    assert_eq!(store.elements(), before.as_slice());
    assert_eq!(store.history().past_len(), past);
}

#[test]
fn test_url_in_image_src_is_escaped() {
    let store = populated_store();
    let svg = render_page_svg(store.document(), &ExportConfig::default());
    assert!(svg.contains("auto=compress&amp;cs=tinysrgb"));
    assert!(!svg.contains("auto=compress&cs"));
}

#[test]
fn test_special_characters_in_text() {
    let mut store = DocumentStore::new();
    store.set_title("Q&A <draft>");
    let id = store
        .add_element("text", ElementOptions::default())
        .expect("valid")
        .expect("text");
    let mut text = store.find(id).cloned().expect("exists");
    if let ElementContent::Text { content, .. } = &mut text.content {
        *content = "Tom &amp; Jerry's \"show\"".to_string();
    }
    store.update_element(id, text).expect("valid");

    let svg = render_page_svg(store.document(), &ExportConfig::default());
    assert!(svg.contains("<title>Q&amp;A &lt;draft&gt;</title>"));
    assert!(svg.contains("Tom &amp; Jerry&apos;s &quot;show&quot;"));
}

// ============================================================================
// Page geometry
// ============================================================================

#[test]
fn test_page_size_tracks_paper_format() {
    let mut store = DocumentStore::new();
    let exporter = Exporter::new(ExportConfig {
        scale: 1.0,
        ..ExportConfig::default()
    });

    for format in PaperFormat::ALL {
        store.set_paper_format(format);
        let surface = exporter.render_surface(store.document()).expect("surface");
        let expected = PageGeometry::render(format).pixel_dimensions(1.0);
        assert_eq!((surface.width, surface.height), expected, "{format}");
    }
}

#[test]
fn test_legal_is_taller_than_letter() {
    let letter = PageGeometry::render(PaperFormat::Letter);
    let legal = PageGeometry::render(PaperFormat::Legal);
    assert_eq!(letter.width_px(), legal.width_px());
    assert!(legal.height_px() > letter.height_px());
}

// ============================================================================
// File naming
// ============================================================================

#[test]
fn test_export_file_name_uses_title() {
    assert_eq!(export_file_name("Spring Menu"), "Spring Menu.pdf");
    assert_eq!(export_file_name(""), "document.pdf");
    assert_eq!(export_file_name("2024/05 flyer"), "2024_05 flyer.pdf");
}

#[test]
fn test_invalid_scale_is_single_export_error() {
    let store = populated_store();
    let exporter = Exporter::new(ExportConfig {
        scale: -1.0,
        ..ExportConfig::default()
    });
    assert!(matches!(
        exporter.render_svg(store.document()),
        Err(ExportError::InvalidConfig(_))
    ));
}

// ============================================================================
// Raster and PDF output
// ============================================================================

#[cfg(feature = "export")]
mod raster {
    use super::*;
    use composer_export::{ExportFormat, SvgRasterizer};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let store = populated_store();
        let png = Exporter::new(small_config())
            .export_png(store.document(), &SvgRasterizer)
            .expect("png");
        assert!(png.len() > 8);
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }

    #[test]
    fn test_pdf_written_under_title() {
        let store = populated_store();
        let dir = tempfile::tempdir().expect("tempdir");

        let path = Exporter::new(small_config())
            .export_pdf(store.document(), &SvgRasterizer, dir.path())
            .expect("pdf");

        assert_eq!(path, dir.path().join("Spring Menu.pdf"));
        let bytes = std::fs::read(&path).expect("read");
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn test_untitled_pdf_falls_back_to_document() {
        let mut store = DocumentStore::new();
        store.set_title("");
        let dir = tempfile::tempdir().expect("tempdir");

        let path = Exporter::new(small_config())
            .export_pdf(store.document(), &SvgRasterizer, dir.path())
            .expect("pdf");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("document.pdf"));
    }

    #[test]
    fn test_missing_out_dir_is_io_error() {
        let store = populated_store();
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("does-not-exist");

        let result =
            Exporter::new(small_config()).export_pdf(store.document(), &SvgRasterizer, &missing);
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_every_format_dispatch() {
        let store = populated_store();
        let exporter = Exporter::new(small_config());

        let pdf = exporter
            .export(store.document(), ExportFormat::Pdf, &SvgRasterizer)
            .expect("pdf");
        assert_eq!(&pdf[0..5], b"%PDF-");

        let png = exporter
            .export(store.document(), ExportFormat::Png, &SvgRasterizer)
            .expect("png");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);

        let svg = exporter
            .export(store.document(), ExportFormat::Svg, &SvgRasterizer)
            .expect("svg");
        assert!(String::from_utf8(svg).expect("utf8").starts_with("<svg"));
    }
}
