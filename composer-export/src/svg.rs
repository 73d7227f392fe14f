//! SVG rendering of a document page.
//!
//! The page is drawn in render pixels (96 dpi) through the `viewBox`; the
//! `width`/`height` attributes carry the output size at the configured
//! density and scale, so a rasterizer
//! only has to honor the SVG's intrinsic size. Template children are emitted
//! inside a translated group so their positions stay relative to the
//! template's content box.

use std::fmt::Write;

use composer_core::{
    css_px, Document, Element, ElementContent, ImageStyles, ShapeStyles, ShapeType, TableStyles,
    TemplateStyles, TextAlign, TextStyles,
};

use crate::export::ExportConfig;
use crate::page::PageGeometry;

const DEFAULT_FONT_SIZE: f32 = 16.0;
const DEFAULT_TABLE_FONT_SIZE: f32 = 14.0;
const DEFAULT_CELL_PADDING: f32 = 8.0;
const DEFAULT_SHAPE_FILL: &str = "#e2e8f0";
const DEFAULT_TABLE_BORDER: &str = "#e2e8f0";
const IMAGE_PLACEHOLDER_FILL: &str = "#f1f5f9";
const LINE_HEIGHT: f32 = 1.2;
const FONT_FAMILY: &str = "sans-serif";

/// Width and height of the box percentages resolve against.
#[derive(Debug, Clone, Copy)]
struct Frame {
    width: f32,
    height: f32,
}

/// Resolved placement of one element inside its parent frame.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Bounds {
    fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Render the page of `document` as a standalone SVG document.
///
/// Read-only with respect to the document. Elements are painted in
/// document order, so later elements draw on top.
#[must_use]
pub fn render_page_svg(document: &Document, config: &ExportConfig) -> String {
    let page = PageGeometry::render(document.paper_format);
    let (out_w, out_h) =
        PageGeometry::for_format(document.paper_format, config.dpi).pixel_dimensions(config.scale);
    let view_w = page.width_px();
    let view_h = page.height_px();

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\" preserveAspectRatio=\"none\">",
    );
    let _ = write!(svg, "<title>{}</title>", escape_xml(&document.title));

    let bg = config.background;
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"rgb({},{},{})\" fill-opacity=\"{}\"/>",
        bg[0],
        bg[1],
        bg[2],
        f32::from(bg[3]) / 255.0,
    );

    let frame = Frame {
        width: view_w,
        height: view_h,
    };
    for element in document.elements() {
        render_element(&mut svg, element, frame);
    }

    svg.push_str("</svg>");
    svg
}

fn resolve_bounds(element: &Element, frame: Frame) -> Bounds {
    let (width, height) = match element.size {
        Some(size) => (size.width.resolve(frame.width), size.height.resolve(frame.height)),
        // Unsized elements stretch to the right edge of their frame; only
        // text has an intrinsic height.
        None => {
            let width = (frame.width - element.position.x).max(0.0);
            let height = match &element.content {
                ElementContent::Text { styles, .. } => {
                    font_size(styles.font_size.as_deref(), DEFAULT_FONT_SIZE) * LINE_HEIGHT
                }
                _ => 0.0,
            };
            (width, height)
        }
    };
    Bounds {
        x: element.position.x,
        y: element.position.y,
        width: width.max(0.0),
        height: height.max(0.0),
    }
}

fn render_element(svg: &mut String, element: &Element, frame: Frame) {
    let bounds = resolve_bounds(element, frame);
    match &element.content {
        ElementContent::Text { content, styles } => render_text(svg, content, styles, bounds),
        ElementContent::Image { src, alt, styles } => {
            render_image(svg, src, alt.as_deref(), styles, bounds);
        }
        ElementContent::Shape { shape_type, styles } => {
            render_shape(svg, *shape_type, styles, bounds);
        }
        ElementContent::Table {
            rows,
            columns,
            data,
            styles,
        } => render_table(svg, *rows, *columns, data, styles, bounds),
        ElementContent::Template {
            elements, styles, ..
        } => {
            let offset = element.content_offset();
            render_template(svg, elements, styles, bounds, offset.x);
        }
    }
}

fn render_text(svg: &mut String, content: &str, styles: &TextStyles, b: Bounds) {
    let size = font_size(styles.font_size.as_deref(), DEFAULT_FONT_SIZE);

    if let Some(background) = styles.background_color.as_deref() {
        let rx = styles.border_radius.as_deref().and_then(css_px).unwrap_or(0.0);
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{rx}\" fill=\"{}\"/>",
            b.x,
            b.y,
            b.width,
            b.height,
            escape_xml(background),
        );
    }

    let align = styles.text_align.unwrap_or_default();
    let (anchor, x) = anchor_for(align, b.x, b.width);
    let color = styles.color.as_deref().unwrap_or("#000000");

    let _ = write!(
        svg,
        "<text x=\"{x}\" y=\"{}\" font-family=\"{FONT_FAMILY}\" font-size=\"{size}\" fill=\"{}\" text-anchor=\"{anchor}\"",
        b.y + size,
        escape_xml(color),
    );
    if styles.bold == Some(true) {
        svg.push_str(" font-weight=\"bold\"");
    }
    if styles.italic == Some(true) {
        svg.push_str(" font-style=\"italic\"");
    }
    if styles.underline == Some(true) {
        svg.push_str(" text-decoration=\"underline\"");
    }
    svg.push('>');

    for (index, line) in plain_text(content).lines().enumerate() {
        let dy = if index == 0 { 0.0 } else { size * LINE_HEIGHT };
        let _ = write!(
            svg,
            "<tspan x=\"{x}\" dy=\"{dy}\">{}</tspan>",
            escape_xml(line)
        );
    }
    svg.push_str("</text>");
}

fn render_image(svg: &mut String, src: &str, alt: Option<&str>, styles: &ImageStyles, b: Bounds) {
    let rx = styles.border_radius.as_deref().and_then(css_px).unwrap_or(0.0);

    // Remote sources are not fetched during export; the placeholder shows
    // through wherever the image cannot be resolved.
    let _ = write!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{rx}\" fill=\"{IMAGE_PLACEHOLDER_FILL}\"",
        b.x, b.y, b.width, b.height,
    );
    push_border(svg, styles.border.as_deref());
    svg.push_str("/>");

    let _ = write!(
        svg,
        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid slice\" xlink:href=\"{}\">",
        b.x,
        b.y,
        b.width,
        b.height,
        escape_xml(src),
    );
    if let Some(alt) = alt {
        let _ = write!(svg, "<title>{}</title>", escape_xml(alt));
    }
    svg.push_str("</image>");
}

fn render_shape(svg: &mut String, shape_type: ShapeType, styles: &ShapeStyles, b: Bounds) {
    let fill = escape_xml(styles.background_color.as_deref().unwrap_or(DEFAULT_SHAPE_FILL));
    let opacity = styles.opacity.unwrap_or(1.0);
    let rotate = styles.rotate.unwrap_or(0.0);

    match shape_type {
        ShapeType::Rectangle => {
            let rx = styles.border_radius.as_deref().and_then(css_px).unwrap_or(0.0);
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{rx}\"",
                b.x, b.y, b.width, b.height,
            );
        }
        ShapeType::Circle => {
            let (cx, cy) = b.center();
            let _ = write!(
                svg,
                "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{}\" ry=\"{}\"",
                b.width / 2.0,
                b.height / 2.0,
            );
        }
        ShapeType::Triangle => {
            let _ = write!(
                svg,
                "<polygon points=\"{},{} {},{} {},{}\"",
                b.x + b.width / 2.0,
                b.y,
                b.x + b.width,
                b.y + b.height,
                b.x,
                b.y + b.height,
            );
        }
    }

    let _ = write!(svg, " fill=\"{fill}\" opacity=\"{opacity}\"");
    push_border(svg, styles.border.as_deref());
    if rotate != 0.0 {
        let (cx, cy) = b.center();
        let _ = write!(svg, " transform=\"rotate({rotate} {cx} {cy})\"");
    }
    svg.push_str("/>");
}

#[allow(clippy::cast_precision_loss)]
fn render_table(
    svg: &mut String,
    rows: usize,
    columns: usize,
    data: &[Vec<String>],
    styles: &TableStyles,
    b: Bounds,
) {
    if rows == 0 || columns == 0 {
        return;
    }
    let border = escape_xml(styles.border_color.as_deref().unwrap_or(DEFAULT_TABLE_BORDER));
    let size = font_size(styles.font_size.as_deref(), DEFAULT_TABLE_FONT_SIZE);
    let padding = styles
        .cell_padding
        .as_deref()
        .and_then(css_px)
        .unwrap_or(DEFAULT_CELL_PADDING);
    let cell_w = b.width / columns as f32;
    let cell_h = b.height / rows as f32;

    svg.push_str("<g>");
    let _ = write!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#ffffff\" stroke=\"{border}\" stroke-width=\"1\"/>",
        b.x, b.y, b.width, b.height,
    );
    if let Some(header) = styles.header_background_color.as_deref() {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{cell_h}\" fill=\"{}\"/>",
            b.x,
            b.y,
            b.width,
            escape_xml(header),
        );
    }

    for row in 1..rows {
        let y = b.y + cell_h * row as f32;
        let _ = write!(
            svg,
            "<line x1=\"{}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"{border}\" stroke-width=\"1\"/>",
            b.x,
            b.x + b.width,
        );
    }
    for column in 1..columns {
        let x = b.x + cell_w * column as f32;
        let _ = write!(
            svg,
            "<line x1=\"{x}\" y1=\"{}\" x2=\"{x}\" y2=\"{}\" stroke=\"{border}\" stroke-width=\"1\"/>",
            b.y,
            b.y + b.height,
        );
    }

    let align = styles.text_align.unwrap_or_default();
    for (row, cells) in data.iter().enumerate().take(rows) {
        let baseline = b.y + cell_h * row as f32 + (cell_h + size * 0.7) / 2.0;
        for (column, cell) in cells.iter().enumerate().take(columns) {
            let cell_x = b.x + cell_w * column as f32 + padding;
            let (anchor, x) = anchor_for(align, cell_x, (cell_w - padding * 2.0).max(0.0));
            let weight = if row == 0 { " font-weight=\"600\"" } else { "" };
            let _ = write!(
                svg,
                "<text x=\"{x}\" y=\"{baseline}\" font-family=\"{FONT_FAMILY}\" font-size=\"{size}\" fill=\"#1e293b\" text-anchor=\"{anchor}\"{weight}>{}</text>",
                escape_xml(&plain_text(cell)),
            );
        }
    }
    svg.push_str("</g>");
}

fn render_template(
    svg: &mut String,
    children: &[Element],
    styles: &TemplateStyles,
    b: Bounds,
    padding: f32,
) {
    if let Some(background) = styles
        .background_color
        .as_deref()
        .filter(|c| !c.eq_ignore_ascii_case("transparent"))
    {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            b.x,
            b.y,
            b.width,
            b.height,
            escape_xml(background),
        );
    }

    let _ = write!(
        svg,
        "<g transform=\"translate({},{})\">",
        b.x + padding,
        b.y + padding
    );
    let content = Frame {
        width: (b.width - padding * 2.0).max(0.0),
        height: (b.height - padding * 2.0).max(0.0),
    };
    for child in children {
        render_element(svg, child, content);
    }
    svg.push_str("</g>");
}

fn font_size(value: Option<&str>, default: f32) -> f32 {
    value.and_then(css_px).filter(|s| *s > 0.0).unwrap_or(default)
}

fn anchor_for(align: TextAlign, x: f32, width: f32) -> (&'static str, f32) {
    match align {
        TextAlign::Left => ("start", x),
        TextAlign::Center => ("middle", x + width / 2.0),
        TextAlign::Right => ("end", x + width),
    }
}

/// Append `stroke` attributes for a CSS border shorthand like `"2px solid #333"`.
fn push_border(svg: &mut String, border: Option<&str>) {
    let Some((width, color)) = border.and_then(parse_border) else {
        return;
    };
    let _ = write!(
        svg,
        " stroke=\"{}\" stroke-width=\"{width}\"",
        escape_xml(color)
    );
}

fn parse_border(border: &str) -> Option<(f32, &str)> {
    let mut width = None;
    let mut color = None;
    for token in border.split_whitespace() {
        if token.eq_ignore_ascii_case("none") {
            return None;
        }
        if let Some(px) = css_px(token) {
            width = Some(px);
        } else if !matches!(token, "solid" | "dashed" | "dotted" | "double") {
            color = Some(token);
        }
    }
    match (width.unwrap_or(1.0), color) {
        (w, Some(c)) if w > 0.0 => Some((w, c)),
        _ => None,
    }
}

/// Reduce rich-text HTML to plain text, one line per block or `<br>`.
#[must_use]
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars();
    while let Some(c) = chars.next() {
        if c != '<' {
            out.push(c);
            continue;
        }
        let mut tag = String::new();
        for t in chars.by_ref() {
            if t == '>' {
                break;
            }
            tag.push(t);
        }
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        let closing = tag.starts_with('/');
        let breaks = name == "br"
            || (closing && matches!(name.as_str(), "p" | "div" | "li" | "h1" | "h2" | "h3"));
        if breaks && !out.ends_with('\n') {
            out.push('\n');
        }
    }
    decode_entities(out.trim_end_matches('\n'))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escape special XML characters.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
