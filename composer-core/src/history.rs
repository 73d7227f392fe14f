//! Snapshot-based linear undo/redo log.
//!
//! `past` holds collections older to newer; `future` holds the collections
//! that redo would restore, soonest first. Recording a new edit truncates
//! `future`, so redo is only possible until the next edit.

use std::collections::VecDeque;

use crate::Snapshot;

/// Undo/redo stacks of element-collection snapshots.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<Snapshot>,
    future: VecDeque<Snapshot>,
    max_depth: Option<usize>,
}

impl History {
    /// Create an unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history keeping at most `max_depth` undo steps.
    ///
    /// `None` keeps every step.
    #[must_use]
    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Record the collection as it was before a new edit.
    ///
    /// Clears the redo branch unconditionally.
    pub fn record(&mut self, before: Snapshot) {
        self.past.push(before);
        self.future.clear();
        if let Some(max) = self.max_depth {
            if self.past.len() > max {
                let excess = self.past.len() - max;
                self.past.drain(..excess);
                tracing::trace!(dropped = excess, "history depth limit reached");
            }
        }
    }

    /// Step back: take the most recent snapshot and park `current` for redo.
    ///
    /// Returns `None`, leaving both stacks untouched, if there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop()?;
        self.future.push_front(current);
        Some(previous)
    }

    /// Step forward: take the soonest redo snapshot and park `current` for undo.
    ///
    /// Returns `None`, leaving both stacks untouched, if there is nothing to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop_front()?;
        self.past.push(current);
        Some(next)
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Configured depth limit.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Forget every step in both directions.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{create_element, ElementOptions};

    fn snapshot(len: usize) -> Snapshot {
        Arc::new(
            (0..len)
                .filter_map(|_| create_element("text", ElementOptions::default()))
                .collect(),
        )
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo(snapshot(0)).is_none());
        assert!(history.redo(snapshot(0)).is_none());
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_undo_then_redo_transfers() {
        let mut history = History::new();
        let before = snapshot(1);
        let after = snapshot(2);
        history.record(Arc::clone(&before));

        let restored = history.undo(Arc::clone(&after)).expect("undo");
        assert!(Arc::ptr_eq(&restored, &before));
        assert!(!history.can_undo());
        assert!(history.can_redo());

        let redone = history.redo(restored).expect("redo");
        assert!(Arc::ptr_eq(&redone, &after));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_truncates_future() {
        let mut history = History::new();
        history.record(snapshot(0));
        history.undo(snapshot(1));
        assert!(history.can_redo());
        history.record(snapshot(0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_future_is_soonest_first() {
        let mut history = History::new();
        let s0 = snapshot(0);
        let s1 = snapshot(1);
        let s2 = snapshot(2);
        history.record(Arc::clone(&s0));
        history.record(Arc::clone(&s1));

        let back1 = history.undo(Arc::clone(&s2)).expect("undo");
        let back0 = history.undo(back1).expect("undo");
        assert!(Arc::ptr_eq(&back0, &s0));

        let fwd1 = history.redo(back0).expect("redo");
        assert!(Arc::ptr_eq(&fwd1, &s1));
        let fwd2 = history.redo(fwd1).expect("redo");
        assert!(Arc::ptr_eq(&fwd2, &s2));
    }

    #[test]
    fn test_depth_limit_drops_oldest() {
        let mut history = History::with_max_depth(Some(2));
        let oldest = snapshot(0);
        history.record(Arc::clone(&oldest));
        history.record(snapshot(1));
        history.record(snapshot(2));
        assert_eq!(history.past_len(), 2);

        let a = history.undo(snapshot(3)).expect("undo");
        let b = history.undo(a).expect("undo");
        assert!(!Arc::ptr_eq(&b, &oldest));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut history = History::new();
        for _ in 0..500 {
            history.record(snapshot(0));
        }
        assert_eq!(history.past_len(), 500);
        assert_eq!(history.max_depth(), None);
    }
}
