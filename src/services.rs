pub mod sequence_service;
pub use sequence_service::SequenceService;
pub mod ledger_service;
pub use ledger_service::LedgerRules;
pub mod assembly_service;
pub use assembly_service::DocumentAssembly;
