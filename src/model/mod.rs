//! Document model: paragraphs, runs, tables, and the parsed body tree.

mod document;
mod paragraph;
mod table;

pub use document::{BodyItem, BodyItemKind, Document};
pub use paragraph::{NumberingRef, Paragraph, SemanticRole, TextRun, TextStyle};
pub use table::Table;
