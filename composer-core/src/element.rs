//! Page elements - the typed content blocks placed on a document page.
//!
//! Every element shares an id, a page-relative [`Position`] and an optional
//! [`Size`]. The kind-specific payload, including a closed style record per
//! kind, lives in [`ElementContent`].

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ComposerError, ComposerResult};

/// Placeholder image shown until the user supplies a source.
pub const PLACEHOLDER_IMAGE_SRC: &str = "https://images.pexels.com/photos/326055/pexels-photo-326055.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=1";

/// Default text of a freshly created text element.
pub const DEFAULT_TEXT_CONTENT: &str = "Double-click to edit text";

/// Default text of every freshly created table cell.
pub const DEFAULT_CELL_TEXT: &str = "Click to edit";

/// Height of one table row in render pixels, used for the default table size.
pub const TABLE_ROW_HEIGHT: f32 = 40.0;

/// Where every new element lands, regardless of existing layout.
pub const DEFAULT_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an id from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::InvalidId`] if the string is not a UUID.
    pub fn parse(s: &str) -> ComposerResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ComposerError::InvalidId(format!("{s}: {e}")))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A page-relative point in render pixels. Also used for movement deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Pixels from the left edge of the parent content box.
    pub x: f32,
    /// Pixels from the top edge of the parent content box.
    pub y: f32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// One axis of an element's size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DimensionRepr", into = "DimensionRepr")]
pub enum Dimension {
    /// Absolute size in render pixels. Serialized as a bare number.
    Pixels(f32),
    /// Fraction of the parent content box. Serialized as `"NN%"`.
    Percent(f32),
}

impl Dimension {
    /// Resolve against the size of the parent content box.
    #[must_use]
    pub fn resolve(self, parent: f32) -> f32 {
        match self {
            Self::Pixels(px) => px,
            Self::Percent(pct) => parent * pct / 100.0,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<DimensionRepr> for Dimension {
    type Error = String;

    fn try_from(repr: DimensionRepr) -> Result<Self, Self::Error> {
        match repr {
            DimensionRepr::Number(px) => Ok(Self::Pixels(px)),
            DimensionRepr::Text(text) => {
                let text = text.trim();
                if let Some(pct) = text.strip_suffix('%') {
                    pct.trim()
                        .parse()
                        .map(Self::Percent)
                        .map_err(|_| format!("invalid percentage: {text}"))
                } else {
                    text.strip_suffix("px")
                        .unwrap_or(text)
                        .trim()
                        .parse()
                        .map(Self::Pixels)
                        .map_err(|_| format!("invalid dimension: {text}"))
                }
            }
        }
    }
}

impl From<Dimension> for DimensionRepr {
    fn from(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Pixels(px) => Self::Number(px),
            Dimension::Percent(pct) => Self::Text(format!("{pct}%")),
        }
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: Dimension,
    /// Height.
    pub height: Dimension,
}

impl Size {
    /// A size in pixels on both axes.
    #[must_use]
    pub const fn pixels(width: f32, height: f32) -> Self {
        Self {
            width: Dimension::Pixels(width),
            height: Dimension::Pixels(height),
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Geometric form of a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    /// Axis-aligned rectangle.
    #[default]
    Rectangle,
    /// Circle (ellipse inscribed in the bounds).
    Circle,
    /// Upward-pointing triangle inscribed in the bounds.
    Triangle,
}

/// Page region a template group represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    /// Page header band.
    Header,
    /// Main content area.
    #[default]
    Content,
    /// Page footer band.
    Footer,
}

/// Styles recognized on text elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextStyles {
    /// Text color (CSS color).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Font size (CSS length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    /// Horizontal alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Bold weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    /// Italic slant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    /// Underline decoration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    /// Background fill (CSS color).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Corner radius (CSS length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
}

/// Styles recognized on image elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageStyles {
    /// Corner radius (CSS length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    /// Border shorthand (CSS).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
}

/// Styles recognized on shape elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShapeStyles {
    /// Background fill (CSS color).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Corner radius (CSS length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    /// Border shorthand (CSS).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    /// Opacity in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Clockwise rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f32>,
}

/// Styles recognized on table elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableStyles {
    /// Grid line color (CSS color).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Fill of the first row (CSS color).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_background_color: Option<String>,
    /// Inner cell padding (CSS length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_padding: Option<String>,
    /// Font size (CSS length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    /// Horizontal alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

/// Styles recognized on template elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateStyles {
    /// Background fill (CSS color).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Content box inset (CSS length).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
}

/// The kind-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementContent {
    /// A rich-text block.
    Text {
        /// Rich-text (HTML) content.
        content: String,
        /// Text styles.
        #[serde(default)]
        styles: TextStyles,
    },

    /// A bitmap image referenced by URI.
    Image {
        /// Image source URI.
        src: String,
        /// Alternative text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        /// Image styles.
        #[serde(default)]
        styles: ImageStyles,
    },

    /// A filled geometric shape.
    Shape {
        /// Which shape to draw.
        #[serde(rename = "shapeType")]
        shape_type: ShapeType,
        /// Shape styles.
        #[serde(default)]
        styles: ShapeStyles,
    },

    /// A grid of editable text cells.
    Table {
        /// Number of rows (at least 1).
        rows: usize,
        /// Number of columns (at least 1).
        columns: usize,
        /// Cell text, `rows` rows of `columns` cells each.
        data: Vec<Vec<String>>,
        /// Table styles.
        #[serde(default)]
        styles: TableStyles,
    },

    /// A container that owns an ordered sequence of child elements.
    Template {
        /// Page region this group represents.
        #[serde(rename = "templateType")]
        template_type: TemplateType,
        /// Child elements, positioned relative to this template's content box.
        #[serde(default)]
        elements: Vec<Element>,
        /// Template styles.
        #[serde(default)]
        styles: TemplateStyles,
    },
}

/// The closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Text block.
    Text,
    /// Image.
    Image,
    /// Shape.
    Shape,
    /// Table.
    Table,
    /// Template group.
    Template,
}

impl ElementKind {
    /// Map a tool name onto a kind. Unrecognized names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "shape" => Some(Self::Shape),
            "table" => Some(Self::Table),
            "template" => Some(Self::Template),
            _ => None,
        }
    }

    /// The canonical tool name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Shape => "shape",
            Self::Table => "table",
            Self::Template => "template",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation options consulted by [`create_element`]. Fields that do not apply
/// to the requested kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementOptions {
    /// Shape form (defaults to rectangle).
    pub shape_type: Option<ShapeType>,
    /// Table rows (zero or missing means 3).
    pub rows: Option<usize>,
    /// Table columns (zero or missing means 3).
    pub columns: Option<usize>,
    /// Template region (defaults to content).
    pub template_type: Option<TemplateType>,
    /// Initial template children.
    pub elements: Option<Vec<Element>>,
}

impl ElementOptions {
    /// Options for a shape of the given form.
    #[must_use]
    pub fn shape(shape_type: ShapeType) -> Self {
        Self {
            shape_type: Some(shape_type),
            ..Self::default()
        }
    }

    /// Options for a table of the given dimensions.
    #[must_use]
    pub fn table(rows: usize, columns: usize) -> Self {
        Self {
            rows: Some(rows),
            columns: Some(columns),
            ..Self::default()
        }
    }

    /// Options for a template with initial children.
    #[must_use]
    pub fn template(template_type: TemplateType, elements: Vec<Element>) -> Self {
        Self {
            template_type: Some(template_type),
            elements: Some(elements),
            ..Self::default()
        }
    }
}

/// A placed content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier, fixed at creation.
    pub id: ElementId,
    /// Position relative to the parent content box (the page for top-level elements).
    pub position: Position,
    /// Optional explicit size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub content: ElementContent,
}

impl Element {
    /// Create an element of the given kind with its creation defaults.
    #[must_use]
    pub fn from_kind(kind: ElementKind, options: ElementOptions) -> Self {
        let (size, content) = match kind {
            ElementKind::Text => (
                Size::pixels(200.0, 24.0),
                ElementContent::Text {
                    content: DEFAULT_TEXT_CONTENT.to_string(),
                    styles: TextStyles {
                        color: Some("#000000".to_string()),
                        font_size: Some("16px".to_string()),
                        text_align: Some(TextAlign::Left),
                        bold: Some(false),
                        italic: Some(false),
                        underline: Some(false),
                        ..TextStyles::default()
                    },
                },
            ),
            ElementKind::Image => (
                Size::pixels(200.0, 150.0),
                ElementContent::Image {
                    src: PLACEHOLDER_IMAGE_SRC.to_string(),
                    alt: Some("Image".to_string()),
                    styles: ImageStyles {
                        border_radius: Some("0px".to_string()),
                        ..ImageStyles::default()
                    },
                },
            ),
            ElementKind::Shape => (
                Size::pixels(100.0, 100.0),
                ElementContent::Shape {
                    shape_type: options.shape_type.unwrap_or_default(),
                    styles: ShapeStyles {
                        background_color: Some("#e2e8f0".to_string()),
                        border_radius: Some("0px".to_string()),
                        opacity: Some(1.0),
                        rotate: Some(0.0),
                        ..ShapeStyles::default()
                    },
                },
            ),
            ElementKind::Table => {
                let rows = options.rows.filter(|&n| n > 0).unwrap_or(3);
                let columns = options.columns.filter(|&n| n > 0).unwrap_or(3);
                #[allow(clippy::cast_precision_loss)]
                let height = rows as f32 * TABLE_ROW_HEIGHT;
                (
                    Size::pixels(400.0, height),
                    ElementContent::Table {
                        rows,
                        columns,
                        data: vec![vec![DEFAULT_CELL_TEXT.to_string(); columns]; rows],
                        styles: TableStyles {
                            border_color: Some("#e2e8f0".to_string()),
                            header_background_color: Some("#f8fafc".to_string()),
                            cell_padding: Some("8px".to_string()),
                            font_size: Some("14px".to_string()),
                            text_align: Some(TextAlign::Left),
                        },
                    },
                )
            }
            ElementKind::Template => (
                Size {
                    width: Dimension::Percent(100.0),
                    height: Dimension::Pixels(200.0),
                },
                ElementContent::Template {
                    template_type: options.template_type.unwrap_or_default(),
                    elements: options.elements.unwrap_or_default(),
                    styles: TemplateStyles {
                        background_color: Some("transparent".to_string()),
                        padding: Some("16px".to_string()),
                    },
                },
            ),
        };

        Self {
            id: ElementId::new(),
            position: DEFAULT_POSITION,
            size: Some(size),
            content,
        }
    }

    /// The kind of this element.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self.content {
            ElementContent::Text { .. } => ElementKind::Text,
            ElementContent::Image { .. } => ElementKind::Image,
            ElementContent::Shape { .. } => ElementKind::Shape,
            ElementContent::Table { .. } => ElementKind::Table,
            ElementContent::Template { .. } => ElementKind::Template,
        }
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Child elements. Empty for everything but templates.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        match &self.content {
            ElementContent::Template { elements, .. } => elements,
            _ => &[],
        }
    }

    /// Mutable access to a template's children.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match &mut self.content {
            ElementContent::Template { elements, .. } => Some(elements),
            _ => None,
        }
    }

    /// Whether this element is a template group.
    #[must_use]
    pub fn is_template(&self) -> bool {
        matches!(self.content, ElementContent::Template { .. })
    }

    /// Offset of this element's content box from its own position.
    ///
    /// Templates inset their children by their padding; other kinds have no
    /// content box and report zero.
    #[must_use]
    pub fn content_offset(&self) -> Position {
        match &self.content {
            ElementContent::Template { styles, .. } => {
                let pad = styles.padding.as_deref().and_then(css_px).unwrap_or(0.0);
                Position::new(pad, pad)
            }
            _ => Position::default(),
        }
    }

    /// Check the structural invariants of this element and its subtree.
    ///
    /// # Errors
    ///
    /// Returns [`ComposerError::InvalidTable`] for a table whose grid does not
    /// match its dimensions, or [`ComposerError::InvalidStyle`] for a shape
    /// opacity outside `[0, 1]`.
    pub fn validate(&self) -> ComposerResult<()> {
        match &self.content {
            ElementContent::Table {
                rows,
                columns,
                data,
                ..
            } => validate_grid(*rows, *columns, data)
                .map_err(|reason| ComposerError::InvalidTable(format!("{}: {reason}", self.id))),
            ElementContent::Shape { styles, .. } => match styles.opacity {
                Some(opacity) if !(0.0..=1.0).contains(&opacity) => Err(
                    ComposerError::InvalidStyle(format!("{}: opacity {opacity} outside [0, 1]", self.id)),
                ),
                _ => Ok(()),
            },
            ElementContent::Template { elements, .. } => {
                elements.iter().try_for_each(Element::validate)
            }
            ElementContent::Text { .. } | ElementContent::Image { .. } => Ok(()),
        }
    }

    /// Replace the text of one table cell. Returns `false` if this is not a
    /// table or the cell is out of range.
    pub fn set_cell(&mut self, row: usize, column: usize, text: impl Into<String>) -> bool {
        let ElementContent::Table { data, .. } = &mut self.content else {
            return false;
        };
        match data.get_mut(row).and_then(|r| r.get_mut(column)) {
            Some(cell) => {
                *cell = text.into();
                true
            }
            None => false,
        }
    }
}

fn validate_grid(rows: usize, columns: usize, data: &[Vec<String>]) -> Result<(), String> {
    if rows == 0 || columns == 0 {
        return Err(format!("dimensions {rows}x{columns} must be at least 1x1"));
    }
    if data.len() != rows {
        return Err(format!("expected {rows} rows, found {}", data.len()));
    }
    if let Some((index, row)) = data.iter().enumerate().find(|(_, r)| r.len() != columns) {
        return Err(format!(
            "row {index} has {} cells, expected {columns}",
            row.len()
        ));
    }
    Ok(())
}

/// Build an element for a tool name, applying creation defaults.
///
/// Returns `None` for names that do not map to an element kind; callers treat
/// that as a silent no-op.
#[must_use]
pub fn create_element(kind: &str, options: ElementOptions) -> Option<Element> {
    ElementKind::parse(kind).map(|kind| Element::from_kind(kind, options))
}

/// Parse a CSS pixel length such as `"16px"` or `"16"`.
#[must_use]
pub fn css_px(value: &str) -> Option<f32> {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}
