//! Plain-text extraction from Docs and Slides document trees
//!
//! Raw API JSON is first lifted into a small typed tree (one variant per
//! node kind, with an explicit `Unsupported` for kinds that carry no text),
//! then walked. Everything here is pure.

mod docs;
mod slides;

pub use docs::{StructuralElement, TableCell, body_text, extract_document_text, parse_content};
pub use slides::{PLACEHOLDER_BODY, Page, PageElement, Shape, slide_text, speaker_notes};
