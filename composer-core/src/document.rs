//! The document aggregate: title, page format, element collection and selection.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{composition, Element, ElementId};

/// Title given to a fresh document.
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// An immutable, shareable copy of the top-level element collection.
///
/// The store edits its collection copy-on-write, so a snapshot held by the
/// history never observes later edits.
pub type Snapshot = Arc<Vec<Element>>;

/// Named physical page size. Pages are always portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperFormat {
    /// ISO A4, 210 x 297 mm.
    #[default]
    A4,
    /// ISO A3, 297 x 420 mm.
    A3,
    /// US Letter, 8.5 x 11 in.
    Letter,
    /// US Legal, 8.5 x 14 in.
    Legal,
}

impl PaperFormat {
    /// All formats, in menu order.
    pub const ALL: [Self; 4] = [Self::A4, Self::A3, Self::Letter, Self::Legal];

    /// Page `(width, height)` in millimetres, portrait.
    #[must_use]
    pub const fn dimensions_mm(self) -> (f32, f32) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::A3 => (297.0, 420.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
        }
    }

    /// Lowercase name as used in documents and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A4 => "a4",
            Self::A3 => "a3",
            Self::Letter => "letter",
            Self::Legal => "legal",
        }
    }

    /// Parse a case-insensitive format name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PaperFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document title, used for the export file name.
    pub title: String,
    /// Physical page size.
    pub paper_format: PaperFormat,
    /// Top-level elements in z-order (later is on top).
    pub(crate) elements: Snapshot,
    /// Focused element, if any. A weak reference by id.
    pub(crate) selected: Option<ElementId>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            paper_format: PaperFormat::default(),
            elements: Arc::new(Vec::new()),
            selected: None,
        }
    }

    /// Top-level elements in z-order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// A shared handle to the current collection.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.elements)
    }

    /// The focused element's id.
    #[must_use]
    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    /// The focused element, looked up anywhere in the tree.
    ///
    /// Returns `None` if nothing is selected or the id no longer resolves.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected
            .and_then(|id| composition::find(&self.elements, id))
    }

    /// Number of elements in the whole tree, template children included.
    #[must_use]
    pub fn element_count(&self) -> usize {
        composition::walk(&self.elements).count()
    }

    /// Check if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_dimensions() {
        assert_eq!(PaperFormat::A4.dimensions_mm(), (210.0, 297.0));
        assert_eq!(PaperFormat::A3.dimensions_mm(), (297.0, 420.0));
        assert_eq!(PaperFormat::Letter.dimensions_mm(), (215.9, 279.4));
        assert_eq!(PaperFormat::Legal.dimensions_mm(), (215.9, 355.6));
    }

    #[test]
    fn test_paper_format_parse() {
        assert_eq!(PaperFormat::parse("A4"), Some(PaperFormat::A4));
        assert_eq!(PaperFormat::parse("legal"), Some(PaperFormat::Legal));
        assert_eq!(PaperFormat::parse("tabloid"), None);
    }

    #[test]
    fn test_paper_format_serde_names() {
        let json = serde_json::to_string(&PaperFormat::Letter).expect("serialize");
        assert_eq!(json, "\"letter\"");
    }

    #[test]
    fn test_default_document() {
        let doc = Document::default();
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.paper_format, PaperFormat::A4);
        assert!(doc.is_empty());
        assert!(doc.selected_element().is_none());
    }
}
