pub mod category;
pub use category::{DocCategory, NumberingPolicy};
pub mod document;
pub use document::{Document, DocumentLine, NewDocument, UpdateOutcome};
