//! # Page Composer Core
//!
//! Document state engine for the page composer: the element model, the
//! mutation and undo/redo protocol, and the recursive composition rules for
//! template groups. Rendering, gesture input and export are collaborators
//! that only read state or call into the [`DocumentStore`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               DocumentStore                 │
//! │  add / update / remove / move  undo / redo  │
//! ├──────────────────────┬──────────────────────┤
//! │  Document            │  History             │
//! │  - title, format     │  - past snapshots    │
//! │  - element forest    │  - future snapshots  │
//! │  - selection (id)    │                      │
//! ├──────────────────────┴──────────────────────┤
//! │  Element model       │  Composition rules   │
//! │  - typed variants    │  - find / remove     │
//! │  - creation defaults │  - unique-id forest  │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod composition;
pub mod document;
pub mod element;
pub mod error;
pub mod gesture;
pub mod history;
pub mod schema;
pub mod store;

pub use command::{apply_all, EditCommand};
pub use document::{Document, PaperFormat, Snapshot};
pub use element::{
    create_element, css_px, Dimension, Element, ElementContent, ElementId, ElementKind,
    ElementOptions, ImageStyles, Position, ShapeStyles, ShapeType, Size, TableStyles, TemplateStyles,
    TemplateType, TextAlign, TextStyles,
};
pub use error::{ComposerError, ComposerResult};
pub use gesture::{DragEvent, DragSession};
pub use history::History;
pub use schema::DocumentFile;
pub use store::{DocumentStore, SharedDocumentStore, StoreConfig};

/// Composer core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
