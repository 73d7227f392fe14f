//! Drag gesture contract between a gesture source and the store.
//!
//! A drag start only marks the element as active; intermediate motion is
//! presentation-only. The drag end commits the cumulative delta through a
//! single [`DocumentStore::move_element`] call, so one completed gesture is
//! one history step. Bounds are the gesture source's concern: the store
//! performs no clamping.

use serde::{Deserialize, Serialize};

use crate::{DocumentStore, ElementId, Position};

/// Events delivered by a gesture source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum DragEvent {
    /// Pointer went down on an element and passed the activation distance.
    Start {
        /// Dragged element.
        id: ElementId,
    },
    /// Pointer released. Commits only when it ends the active drag of `id`.
    End {
        /// Dragged element.
        id: ElementId,
        /// Total displacement since the start, in render pixels.
        delta: Position,
    },
    /// Gesture aborted; nothing is committed.
    Cancel,
}

/// Transient drag state. Not part of the document and never recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragSession {
    active: Option<ElementId>,
}

impl DragSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Element currently being dragged, if any.
    #[must_use]
    pub fn active(&self) -> Option<ElementId> {
        self.active
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Mark `id` as the active element.
    pub fn begin(&mut self, id: ElementId) {
        if let Some(previous) = self.active.replace(id) {
            tracing::trace!(%previous, %id, "drag restarted before end");
        }
    }

    /// Drop the active marker without committing anything.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Finish the active drag, committing `delta` as one move.
    ///
    /// Returns whether an element moved. Without an active drag this is a no-op.
    pub fn end(&mut self, store: &mut DocumentStore, delta: Position) -> bool {
        match self.active.take() {
            Some(id) => store.move_element(id, delta),
            None => false,
        }
    }

    /// Feed one event from a gesture source.
    ///
    /// Returns whether the event moved an element.
    pub fn handle(&mut self, store: &mut DocumentStore, event: DragEvent) -> bool {
        match event {
            DragEvent::Start { id } => {
                self.begin(id);
                false
            }
            DragEvent::End { id, delta } => {
                if self.active == Some(id) {
                    self.end(store, delta)
                } else {
                    tracing::trace!(
                        %id,
                        active = ?self.active,
                        "ignoring drag end without matching start"
                    );
                    self.active = None;
                    false
                }
            }
            DragEvent::Cancel => {
                self.cancel();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementOptions;

    fn store_with_text() -> (DocumentStore, ElementId) {
        let mut store = DocumentStore::new();
        let id = store
            .add_element("text", ElementOptions::default())
            .expect("valid")
            .expect("text");
        (store, id)
    }

    #[test]
    fn test_completed_drag_is_one_history_step() {
        let (mut store, id) = store_with_text();
        let mut drag = DragSession::new();

        drag.handle(&mut store, DragEvent::Start { id });
        assert_eq!(drag.active(), Some(id));
        assert_eq!(store.history().past_len(), 1);

        let moved = drag.handle(
            &mut store,
            DragEvent::End {
                id,
                delta: Position::new(40.0, 25.0),
            },
        );
        assert!(moved);
        assert!(!drag.is_dragging());
        assert_eq!(store.history().past_len(), 2);
        assert_eq!(store.find(id).map(|e| e.position), Some(Position::new(140.0, 125.0)));
    }

    #[test]
    fn test_cancel_commits_nothing() {
        let (mut store, id) = store_with_text();
        let mut drag = DragSession::new();
        drag.begin(id);
        drag.handle(&mut store, DragEvent::Cancel);
        assert!(!drag.end(&mut store, Position::new(5.0, 5.0)));
        assert_eq!(store.history().past_len(), 1);
    }

    #[test]
    fn test_drag_of_removed_element_is_noop() {
        let (mut store, id) = store_with_text();
        let mut drag = DragSession::new();
        drag.begin(id);
        store.remove_element(id);
        let past = store.history().past_len();
        assert!(!drag.end(&mut store, Position::new(1.0, 1.0)));
        assert_eq!(store.history().past_len(), past);
    }

    #[test]
    fn test_end_without_start_commits_nothing() {
        let (mut store, id) = store_with_text();
        let mut drag = DragSession::new();
        let past = store.history().past_len();

        let moved = drag.handle(
            &mut store,
            DragEvent::End {
                id,
                delta: Position::new(10.0, 10.0),
            },
        );
        assert!(!moved);
        assert_eq!(store.history().past_len(), past);
        assert_eq!(store.find(id).map(|e| e.position), Some(Position::new(100.0, 100.0)));
    }

    #[test]
    fn test_end_for_other_element_commits_nothing() {
        let (mut store, dragged) = store_with_text();
        let other = store
            .add_element("text", ElementOptions::default())
            .expect("valid")
            .expect("text");
        let mut drag = DragSession::new();
        let past = store.history().past_len();

        drag.handle(&mut store, DragEvent::Start { id: dragged });
        let moved = drag.handle(
            &mut store,
            DragEvent::End {
                id: other,
                delta: Position::new(10.0, 10.0),
            },
        );
        assert!(!moved);
        assert!(!drag.is_dragging());
        assert_eq!(store.history().past_len(), past);
        assert_eq!(store.find(other).map(|e| e.position), Some(Position::new(100.0, 100.0)));
    }

    #[test]
    fn test_event_wire_format() {
        let id = ElementId::new();
        let json = serde_json::to_value(DragEvent::Start { id }).expect("serialize");
        assert_eq!(json["phase"], "start");
        assert_eq!(json["id"], id.to_string());
    }
}
