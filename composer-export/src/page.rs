//! Physical page geometry for a [`PaperFormat`].

use composer_core::PaperFormat;

/// Millimetres per inch.
pub const MM_PER_INCH: f32 = 25.4;

/// CSS reference resolution. Element positions are render pixels at this density.
pub const CSS_DPI: f32 = 96.0;

/// Size of one portrait page, in millimetres and in pixels at a given density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Format the geometry was derived from.
    pub format: PaperFormat,
    /// Page width in millimetres.
    pub width_mm: f32,
    /// Page height in millimetres.
    pub height_mm: f32,
    /// Pixel density used for the pixel dimensions.
    pub dpi: f32,
}

impl PageGeometry {
    /// Geometry of `format` at `dpi`.
    #[must_use]
    pub fn for_format(format: PaperFormat, dpi: f32) -> Self {
        let (width_mm, height_mm) = format.dimensions_mm();
        Self {
            format,
            width_mm,
            height_mm,
            dpi,
        }
    }

    /// Geometry of `format` in render pixels (96 dpi).
    #[must_use]
    pub fn render(format: PaperFormat) -> Self {
        Self::for_format(format, CSS_DPI)
    }

    /// Page width in (fractional) pixels.
    #[must_use]
    pub fn width_px(&self) -> f32 {
        mm_to_px(self.width_mm, self.dpi)
    }

    /// Page height in (fractional) pixels.
    #[must_use]
    pub fn height_px(&self) -> f32 {
        mm_to_px(self.height_mm, self.dpi)
    }

    /// Whole-pixel `(width, height)` after applying `scale`, at least 1x1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_dimensions(&self, scale: f32) -> (u32, u32) {
        let w = (self.width_px() * scale).round().max(1.0) as u32;
        let h = (self.height_px() * scale).round().max(1.0) as u32;
        (w, h)
    }
}

/// Convert millimetres to pixels at `dpi`.
#[must_use]
pub fn mm_to_px(mm: f32, dpi: f32) -> f32 {
    mm / MM_PER_INCH * dpi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_render_pixels() {
        let page = PageGeometry::render(PaperFormat::A4);
        assert!((page.width_px() - 793.7).abs() < 0.1);
        assert!((page.height_px() - 1122.5).abs() < 0.1);
        assert_eq!(page.pixel_dimensions(1.0), (794, 1123));
    }

    #[test]
    fn test_letter_at_72_dpi_is_us_points() {
        let page = PageGeometry::for_format(PaperFormat::Letter, 72.0);
        assert!((page.width_px() - 612.0).abs() < 0.01);
        assert!((page.height_px() - 792.0).abs() < 0.01);
    }

    #[test]
    fn test_scale_multiplies_pixels() {
        let page = PageGeometry::render(PaperFormat::A3);
        let (w1, h1) = page.pixel_dimensions(1.0);
        let (w2, h2) = page.pixel_dimensions(2.0);
        assert!(w2.abs_diff(w1 * 2) <= 1);
        assert!(h2.abs_diff(h1 * 2) <= 1);
    }

    #[test]
    fn test_every_format_is_portrait() {
        for format in PaperFormat::ALL {
            let page = PageGeometry::render(format);
            assert!(page.height_mm > page.width_mm, "{format} should be portrait");
        }
    }
}
