//! Canonical serialized representation of a document.
//!
//! The JSON shape mirrors the document settings used by the web editor:
//! `{ "title", "paperFormat", "elements": [...] }`, each element tagged by
//! `"type"`. Selection and history are session state and are not saved.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    composition, ComposerResult, Document, DocumentStore, Element, PaperFormat, StoreConfig,
};

/// Saved form of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    /// Document title.
    pub title: String,
    /// Page format.
    #[serde(default)]
    pub paper_format: PaperFormat,
    /// Top-level elements in z-order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl From<&Document> for DocumentFile {
    fn from(document: &Document) -> Self {
        Self {
            title: document.title.clone(),
            paper_format: document.paper_format,
            elements: document.elements().to_vec(),
        }
    }
}

impl DocumentFile {
    /// Capture the current state of a store.
    #[must_use]
    pub fn from_store(store: &DocumentStore) -> Self {
        Self::from(store.document())
    }

    /// Check the tree invariants: unique ids and well-formed elements.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> ComposerResult<()> {
        composition::ensure_forest(&self.elements)?;
        self.elements.iter().try_for_each(Element::validate)
    }

    /// Open this document in a fresh store with empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the document violates the tree invariants.
    pub fn into_store(self, config: &StoreConfig) -> ComposerResult<DocumentStore> {
        self.validate()?;
        let document = Document {
            title: self.title,
            paper_format: self.paper_format,
            elements: Arc::new(self.elements),
            selected: None,
        };
        tracing::debug!(
            title = %document.title,
            elements = document.element_count(),
            "document opened"
        );
        Ok(DocumentStore::with_document(document, config))
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> ComposerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a document.
    pub fn from_json(json: &str) -> ComposerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl DocumentStore {
    /// Open a saved document in a fresh store with empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the document violates the tree invariants.
    pub fn from_file(file: DocumentFile, config: &StoreConfig) -> ComposerResult<Self> {
        file.into_store(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComposerError, ElementOptions, TemplateType};

    #[test]
    fn test_store_round_trip() {
        let mut store = DocumentStore::new();
        store.set_title("Menu");
        store.set_paper_format(PaperFormat::A3);
        let child = crate::create_element("text", ElementOptions::default()).expect("text");
        store
            .add_element(
                "template",
                ElementOptions::template(TemplateType::Footer, vec![child]),
            )
            .expect("valid");
        store
            .add_element("table", ElementOptions::table(2, 2))
            .expect("valid");

        let json = DocumentFile::from_store(&store).to_json().expect("json");
        let file = DocumentFile::from_json(&json).expect("parse");
        let reopened = DocumentStore::from_file(file, &StoreConfig::default()).expect("valid");

        assert_eq!(reopened.title(), "Menu");
        assert_eq!(reopened.paper_format(), PaperFormat::A3);
        assert_eq!(reopened.elements(), store.elements());
        assert!(!reopened.can_undo());
        assert!(reopened.selected_id().is_none());
    }

    #[test]
    fn test_reads_web_editor_json() {
        let json = r##"{
            "title": "Flyer",
            "paperFormat": "letter",
            "elements": [
                {
                    "id": "6f1c2a8e-3d4b-4c5e-9f60-718293a4b5c6",
                    "type": "shape",
                    "shapeType": "circle",
                    "position": { "x": 12, "y": 34 },
                    "size": { "width": 100, "height": 100 },
                    "styles": { "backgroundColor": "#e2e8f0", "opacity": 0.5, "rotate": 45 }
                }
            ]
        }"##;
        let file = DocumentFile::from_json(json).expect("parse");
        assert_eq!(file.paper_format, PaperFormat::Letter);
        assert_eq!(file.elements.len(), 1);
        assert!(file.validate().is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected_on_open() {
        let element = crate::create_element("text", ElementOptions::default()).expect("text");
        let file = DocumentFile {
            title: "Dup".to_string(),
            paper_format: PaperFormat::A4,
            elements: vec![element.clone(), element],
        };
        assert!(matches!(
            file.into_store(&StoreConfig::default()),
            Err(ComposerError::DuplicateElementId(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        assert!(matches!(
            DocumentFile::from_json("{ not json"),
            Err(ComposerError::Serialization(_))
        ));
    }
}
