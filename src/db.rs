pub mod document_store;
pub use document_store::{AtomicSequenceStore, DocumentStore};
pub mod pg_store;
pub use pg_store::PgDocumentStore;
