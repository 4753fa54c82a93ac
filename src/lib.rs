// src/lib.rs

// Declaração dos nossos módulos
pub mod common;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-exportações principais, para o host não precisar navegar pelos módulos
pub use common::error::LedgerError;
pub use config::{EngineConfig, SequenceMode};
pub use db::{AtomicSequenceStore, DocumentStore, PgDocumentStore};
pub use models::category::{DocCategory, NumberingPolicy};
pub use models::document::{Document, DocumentLine, LineReference, LineRole, NewDocument, NewDocumentLine, UpdateOutcome};
pub use services::assembly_service::DocumentAssembly;
pub use services::ledger_service::LedgerRules;
pub use services::sequence_service::SequenceService;
