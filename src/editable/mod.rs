//! Editable surface model.
//!
//! The surface is a single inline container holding text runs, non-editable
//! atoms and line breaks, plus a live selection. A host (browser
//! contenteditable, terminal widget, or the in-memory [`MemorySurface`])
//! exposes it to the signal engine through [`SurfaceAccess`].
//!
//! # Architecture
//!
//! - [`Node`] / [`InlineElement`]: content nodes
//! - [`Position`] / [`CursorSpan`]: tree positions and spans (snapshots)
//! - [`EditableContent`]: node list + selection, linear offset mapping
//! - [`markup`]: HTML parse/serialize
//! - [`range`]: range algebra used by the engine
//! - [`SurfaceAccess`]: the capability the engine is constructed with
//!
//! # Example
//!
//! ```ignore
//! use sigil::editable::{range, EditableContent, CursorSpan, Position};
//!
//! let mut content = EditableContent::new();
//! content.type_text("hi @Al");
//! let start = CursorSpan::collapsed(Position::in_node(0, 4));
//! let live = content.selection().unwrap();
//!
//! assert_eq!(range::extract_text(&mut content, &start, &live), "Al");
//! ```

mod content;
mod cursor;
pub mod markup;
mod node;
pub mod range;
mod selection;
mod surface;

// Re-export main types
pub use content::EditableContent;
pub use cursor::{NodeRef, Position};
pub use markup::MarkupError;
pub use node::{is_atomic_element, InlineElement, Node, ATTR_CONTENTEDITABLE};
pub use selection::CursorSpan;
pub use surface::{MemorySurface, SignalGeometry, SurfaceAccess};
