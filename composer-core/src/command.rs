//! The store's command surface as data.
//!
//! Presentation layers that cannot hold a `&mut DocumentStore` (scripts, a
//! bridge to a web view) send [`EditCommand`]s instead. Applying a command
//! calls exactly one store operation, so history behaves the same as for a
//! direct call.

use serde::{Deserialize, Serialize};

use crate::{
    ComposerResult, DocumentStore, Element, ElementId, ElementOptions, PaperFormat, Position,
};

/// One store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum EditCommand {
    /// Replace the document title.
    SetTitle {
        /// New title.
        title: String,
    },
    /// Replace the page format.
    SetPaperFormat {
        /// New format.
        format: PaperFormat,
    },
    /// Create an element from a tool name.
    AddElement {
        /// Tool name; unknown names are ignored.
        kind: String,
        /// Creation options.
        #[serde(default)]
        options: ElementOptions,
    },
    /// Replace an element by full value.
    UpdateElement {
        /// Target element.
        id: ElementId,
        /// Complete replacement.
        element: Element,
    },
    /// Remove an element and its subtree.
    RemoveElement {
        /// Target element.
        id: ElementId,
    },
    /// Shift an element.
    MoveElement {
        /// Target element.
        id: ElementId,
        /// Displacement in render pixels.
        delta: Position,
    },
    /// Change or clear the focused element.
    Select {
        /// Element to focus, or `None` to clear.
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Step back one edit.
    Undo,
    /// Step forward one edit.
    Redo,
}

impl EditCommand {
    /// Apply the command to `store`.
    ///
    /// # Errors
    ///
    /// Propagates validation errors from [`DocumentStore::add_element`] and
    /// [`DocumentStore::update_element`].
    pub fn apply(self, store: &mut DocumentStore) -> ComposerResult<()> {
        match self {
            Self::SetTitle { title } => store.set_title(title),
            Self::SetPaperFormat { format } => store.set_paper_format(format),
            Self::AddElement { kind, options } => {
                store.add_element(&kind, options)?;
            }
            Self::UpdateElement { id, element } => {
                store.update_element(id, element)?;
            }
            Self::RemoveElement { id } => {
                store.remove_element(id);
            }
            Self::MoveElement { id, delta } => {
                store.move_element(id, delta);
            }
            Self::Select { id } => store.set_selected_element(id),
            Self::Undo => {
                store.undo();
            }
            Self::Redo => {
                store.redo();
            }
        }
        Ok(())
    }

    /// Whether this command edits content (and so may record history).
    #[must_use]
    pub const fn is_content_edit(&self) -> bool {
        matches!(
            self,
            Self::AddElement { .. }
                | Self::UpdateElement { .. }
                | Self::RemoveElement { .. }
                | Self::MoveElement { .. }
        )
    }
}

/// Apply commands in order, stopping at the first error.
///
/// Returns the number of commands applied.
///
/// # Errors
///
/// Returns the first command error; commands before it stay applied.
pub fn apply_all(
    store: &mut DocumentStore,
    commands: impl IntoIterator<Item = EditCommand>,
) -> ComposerResult<usize> {
    let mut applied = 0;
    for command in commands {
        command.apply(store)?;
        applied += 1;
    }
    tracing::debug!(applied, "commands applied");
    Ok(applied)
}
