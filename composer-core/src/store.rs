//! The document store: sole mutator of document state.
//!
//! Every content mutation (add, update, remove, move) applies its change
//! copy-on-write, records the pre-mutation collection in the [`History`] and
//! clears the redo branch, all in one call. Title, paper format and
//! selection are outside undo scope.
//!
//! # Example
//!
//! ```
//! use composer_core::{DocumentStore, ElementOptions, Position};
//!
//! let mut store = DocumentStore::new();
//! let id = store
//!     .add_element("text", ElementOptions::default())
//!     .unwrap()
//!     .expect("text is a known kind");
//!
//! store.move_element(id, Position::new(10.0, 5.0));
//! assert_eq!(store.find(id).unwrap().position, Position::new(110.0, 105.0));
//!
//! store.undo();
//! assert_eq!(store.find(id).unwrap().position, Position::new(100.0, 100.0));
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_TITLE;
use crate::{
    composition, create_element, ComposerResult, Document, Element, ElementId, ElementOptions,
    History, PaperFormat, Position, Snapshot,
};

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of undo steps kept. `None` keeps every step.
    pub history_limit: Option<usize>,
    /// Title given to a new document.
    pub default_title: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Owner of one editing session's document and its history.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    document: Document,
    history: History,
}

impl DocumentStore {
    /// Create a store holding an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from configuration.
    #[must_use]
    pub fn with_config(config: &StoreConfig) -> Self {
        Self::with_document(Document::new(config.default_title.clone()), config)
    }

    /// Create a store around an existing document, with empty history.
    #[must_use]
    pub fn with_document(mut document: Document, config: &StoreConfig) -> Self {
        document.selected = None;
        Self {
            document,
            history: History::with_max_depth(config.history_limit),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The document being edited.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Document title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.document.title
    }

    /// Page format.
    #[must_use]
    pub fn paper_format(&self) -> PaperFormat {
        self.document.paper_format
    }

    /// Top-level elements in z-order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        self.document.elements()
    }

    /// A shared handle to the current collection.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.document.snapshot()
    }

    /// Find an element anywhere in the tree.
    #[must_use]
    pub fn find(&self, id: ElementId) -> Option<&Element> {
        composition::find(self.document.elements(), id)
    }

    /// Id of the focused element.
    #[must_use]
    pub fn selected_id(&self) -> Option<ElementId> {
        self.document.selected_id()
    }

    /// The focused element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.document.selected_element()
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The undo/redo log.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    // -----------------------------------------------------------------------
    // Metadata (not recorded in history)
    // -----------------------------------------------------------------------

    /// Replace the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.document.title = title.into();
    }

    /// Replace the page format.
    pub fn set_paper_format(&mut self, format: PaperFormat) {
        self.document.paper_format = format;
    }

    /// Focus an element, or clear focus with `None`.
    pub fn set_selected_element(&mut self, id: Option<ElementId>) {
        self.document.selected = id;
    }

    // -----------------------------------------------------------------------
    // Content mutations (recorded in history)
    // -----------------------------------------------------------------------

    /// Create an element of the named kind, append it on top and select it.
    ///
    /// Returns `Ok(None)` without touching state or history if `kind` is not
    /// an element kind.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving state and history untouched, if template
    /// children supplied in `options` are invalid or reuse ids already in the
    /// document.
    pub fn add_element(
        &mut self,
        kind: &str,
        options: ElementOptions,
    ) -> ComposerResult<Option<ElementId>> {
        let Some(element) = create_element(kind, options) else {
            tracing::trace!(kind, "ignoring unknown element kind");
            return Ok(None);
        };
        element.validate()?;
        composition::ensure_unique_ids(self.document.elements(), &element, None)?;

        let id = element.id;
        self.commit(|elements| elements.push(element));
        self.document.selected = Some(id);
        tracing::debug!(%id, kind, "element added");
        Ok(Some(id))
    }

    /// Replace the element with `id`, wherever it sits, by a complete new value.
    ///
    /// The replacement keeps `id`. Returns whether an element matched. When
    /// nothing matches the collection is unchanged but a history step is
    /// still recorded.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving state and history untouched, if the
    /// replacement is invalid or reuses ids present elsewhere in the document.
    pub fn update_element(&mut self, id: ElementId, mut element: Element) -> ComposerResult<bool> {
        if element.id != id {
            tracing::debug!(%id, supplied = %element.id, "keeping original id on update");
            element.id = id;
        }
        element.validate()?;
        composition::ensure_unique_ids(self.document.elements(), &element, Some(id))?;

        let mut matched = false;
        self.commit(|elements| matched = composition::replace(elements, id, element));
        self.clear_stale_selection();
        if matched {
            tracing::debug!(%id, "element updated");
        } else {
            tracing::debug!(%id, "update matched no element");
        }
        Ok(matched)
    }

    /// Remove the element with `id` and its whole subtree.
    ///
    /// Clears the selection if it pointed into the removed subtree. A history
    /// step is recorded even when nothing matched. Returns whether an
    /// element was removed.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let mut removed = None;
        self.commit(|elements| removed = composition::remove(elements, id));
        self.clear_stale_selection();

        match removed {
            Some(element) => {
                tracing::debug!(
                    %id,
                    descendants = composition::descendant_count(&element),
                    "element removed"
                );
                true
            }
            None => {
                tracing::debug!(%id, "remove matched no element");
                false
            }
        }
    }

    /// Shift the element with `id` by `delta`.
    ///
    /// Unknown ids are a no-op with no history step. Returns whether an
    /// element moved.
    pub fn move_element(&mut self, id: ElementId, delta: Position) -> bool {
        if !composition::contains(self.document.elements(), id) {
            tracing::trace!(%id, "ignoring move of unknown element");
            return false;
        }
        self.commit(|elements| {
            if let Some(element) = composition::find_mut(elements, id) {
                element.position = element.position + delta;
            }
        });
        tracing::debug!(%id, dx = delta.x, dy = delta.y, "element moved");
        true
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Restore the collection as it was before the most recent edit.
    ///
    /// Clears the selection. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.document.snapshot()) {
            Some(previous) => {
                self.document.elements = previous;
                self.document.selected = None;
                tracing::debug!(remaining = self.history.past_len(), "undo");
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone edit.
    ///
    /// Clears the selection. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.document.snapshot()) {
            Some(next) => {
                self.document.elements = next;
                self.document.selected = None;
                tracing::debug!(remaining = self.history.future_len(), "redo");
                true
            }
            None => false,
        }
    }

    /// Apply `mutate` to a private copy of the collection and record the
    /// previous collection as one history step.
    fn commit<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut Vec<Element>),
    {
        let before = self.document.snapshot();
        mutate(Arc::make_mut(&mut self.document.elements));
        self.history.record(before);
    }

    /// Drop the selection if its element is no longer in the document.
    fn clear_stale_selection(&mut self) {
        if let Some(selected) = self.document.selected {
            if !composition::contains(self.document.elements(), selected) {
                tracing::trace!(%selected, "selected element left the document");
                self.document.selected = None;
            }
        }
    }
}

/// Cloneable handle to a [`DocumentStore`] for presentation layers that need
/// to share one store.
#[derive(Debug, Clone, Default)]
pub struct SharedDocumentStore {
    inner: Arc<RwLock<DocumentStore>>,
}

impl SharedDocumentStore {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: DocumentStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Run a query against the store.
    pub fn read<R>(&self, f: impl FnOnce(&DocumentStore) -> R) -> R {
        let store = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Run a command against the store. The whole closure is atomic with
    /// respect to other holders of the handle.
    pub fn update<R>(&self, f: impl FnOnce(&mut DocumentStore) -> R) -> R {
        let mut store = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }
}

impl From<DocumentStore> for SharedDocumentStore {
    fn from(store: DocumentStore) -> Self {
        Self::new(store)
    }
}
