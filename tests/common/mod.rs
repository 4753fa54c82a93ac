// tests/common/mod.rs
#![allow(dead_code)]

// Dublê de persistência em memória para os testes de integração do
// motor. Implementa os dois contratos de store sobre um Mutex simples:
// cada operação tranca, mexe e solta, sem await com o lock preso.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use doc_ledger::common::numbering::{finalize_document_number, parse_sequence_prefix};
use doc_ledger::models::category::DocCategory;
use doc_ledger::models::document::{Document, DocumentLine, LineReference, LineRole, NewDocument, NewDocumentLine};
use doc_ledger::{AtomicSequenceStore, DocumentStore, LedgerError};
use rust_decimal::Decimal;

/// Liga o logger dos testes (idempotente; ver os eventos com
/// `RUST_LOG=doc_ledger=debug`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: Vec<Document>,
    fail_counts: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store que falha em toda contagem de linhas, para exercitar o
    /// caminho de `CountUnavailable`.
    pub fn with_failing_counts() -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().fail_counts = true;
        store
    }

    /// Semeia um documento já persistido (sem passar pela montagem).
    pub fn seed(&self, document: Document) {
        self.inner.lock().unwrap().documents.push(document);
    }

    pub fn document_count(&self) -> usize {
        self.inner.lock().unwrap().documents.len()
    }

    fn greatest_key_locked(inner: &Inner, table: &str) -> Option<String> {
        inner
            .documents
            .iter()
            .filter(|d| d.category.table_of() == table)
            .map(|d| d.document_no.clone())
            .max()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_greatest_key(
        &self,
        table: &str,
        _key_column: &str,
    ) -> Result<Option<String>, LedgerError> {
        let inner = self.inner.lock().unwrap();
        Ok(Self::greatest_key_locked(&inner, table))
    }

    async fn count_rows(&self, table: &str) -> Result<i64, LedgerError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_counts {
            return Err(LedgerError::Internal(anyhow::anyhow!(
                "falha simulada na contagem"
            )));
        }
        let count: usize = inner
            .documents
            .iter()
            .filter(|d| d.category.detail_table_of() == table)
            .map(|d| d.lines.len())
            .sum();
        Ok(count as i64)
    }

    async fn persist_document(&self, document: &Document) -> Result<Document, LedgerError> {
        self.inner.lock().unwrap().documents.push(document.clone());
        Ok(document.clone())
    }

    async fn persist_update(&self, document: &Document) -> Result<u64, LedgerError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(stored) = inner
            .documents
            .iter_mut()
            .find(|d| d.category == document.category && d.document_no == document.document_no)
        else {
            return Ok(0);
        };

        let mut changed: u64 = 0;

        // Mesma semântica do UPDATE com IS DISTINCT FROM: só conta o que
        // realmente mudou.
        if stored.warehouse_code != document.warehouse_code || stored.remark != document.remark {
            stored.warehouse_code = document.warehouse_code.clone();
            stored.remark = document.remark.clone();
            stored.last_updated_by = document.last_updated_by.clone();
            stored.last_updated_at = document.last_updated_at;
            changed += 1;
        }

        for submitted in &document.lines {
            let Some(line) = stored.lines.iter_mut().find(|l| l.d_no == submitted.d_no) else {
                continue;
            };
            let differs = line.quantity != submitted.quantity
                || line.available_stock != submitted.available_stock
                || line.batch_no != submitted.batch_no
                || line.cancelled != submitted.cancelled
                || line.success != submitted.success;
            if differs {
                line.quantity = submitted.quantity;
                line.available_stock = submitted.available_stock;
                line.batch_no = submitted.batch_no.clone();
                line.cancelled = submitted.cancelled;
                line.success = submitted.success;
                changed += 1;
            }
        }

        Ok(changed)
    }

    async fn fetch_document_by_number(
        &self,
        category: DocCategory,
        document_no: &str,
    ) -> Result<Option<Document>, LedgerError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .documents
            .iter()
            .find(|d| d.category == category && d.document_no == document_no)
            .cloned())
    }
}

#[async_trait]
impl AtomicSequenceStore for MemoryStore {
    async fn persist_numbered(
        &self,
        mut document: Document,
        org_tag: &str,
        today: NaiveDate,
    ) -> Result<Document, LedgerError> {
        // Um único lock cobre leitura, incremento e insert: é o
        // equivalente em memória da transação serializável.
        let mut inner = self.inner.lock().unwrap();

        let info = document.category.info();
        let sequence = match Self::greatest_key_locked(&inner, info.table) {
            None => 0,
            Some(value) => parse_sequence_prefix(&value).ok_or_else(|| {
                LedgerError::MalformedSequenceState {
                    table: info.table.to_string(),
                    value,
                }
            })?,
        };

        finalize_document_number(&mut document, sequence + 1, org_tag, today);
        inner.documents.push(document.clone());
        Ok(document)
    }
}

// ---
// Fábricas de dados compartilhadas pelos cenários
// ---

pub fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

pub fn sample_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
}

pub fn new_line(item: &str, quantity: i64) -> NewDocumentLine {
    NewDocumentLine {
        item_code: item.to_string(),
        batch_no: None,
        quantity: Decimal::from(quantity),
        available_stock: Decimal::from(quantity),
        role: LineRole::Standard,
        reference: None,
    }
}

pub fn mutation_line(item: &str, role: LineRole, quantity: i64, available: i64) -> NewDocumentLine {
    NewDocumentLine {
        item_code: item.to_string(),
        batch_no: None,
        quantity: Decimal::from(quantity),
        available_stock: Decimal::from(available),
        role,
        reference: Some(LineReference {
            document_no: "0001/R1/IS/01/24".to_string(),
            d_no: "001".to_string(),
        }),
    }
}

pub fn new_document(category: DocCategory, lines: Vec<NewDocumentLine>) -> NewDocument {
    NewDocument {
        category,
        document_date: "20240115".to_string(),
        warehouse_code: Some("WH-01".to_string()),
        remark: None,
        lines,
    }
}

/// Documento persistido mínimo para semear o dublê.
pub fn seeded_document(category: DocCategory, document_no: &str, line_count: usize) -> Document {
    let mut doc = Document::empty(category, sample_date());
    doc.document_no = document_no.to_string();
    doc.created_by = "seed".to_string();
    doc.created_at = sample_now();
    doc.lines = (1..=line_count)
        .map(|i| DocumentLine {
            id: uuid::Uuid::new_v4(),
            d_no: format!("{i:03}"),
            item_code: format!("ITEM-{i}"),
            batch_no: "20240115".to_string(),
            source: format!("15*{document_no}*{i:03}"),
            quantity: Decimal::ONE,
            available_stock: Decimal::ONE,
            role: LineRole::Standard,
            cancelled: false,
            success: false,
            reference: None,
        })
        .collect();
    doc
}
