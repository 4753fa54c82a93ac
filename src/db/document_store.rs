// src/db/document_store.rs

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::common::error::LedgerError;
use crate::models::category::DocCategory;
use crate::models::document::Document;

// ---
// O contrato que o motor exige da persistência do host.
// ---
// O motor não conhece SQL: só precisa de "maior chave da tabela",
// "contagem de linhas", persistência atômica de documento + detalhes e
// busca por número para as checagens de atualização. Cada operação é uma
// ida bloqueante ao banco; o cancelamento do chamador se propaga pelo
// drop do future; nenhuma implementação deve disparar trabalho solto.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Linha com a maior chave primária da tabela, ou None se vazia.
    async fn fetch_greatest_key(
        &self,
        table: &str,
        key_column: &str,
    ) -> Result<Option<String>, LedgerError>;

    /// Contagem total de linhas da tabela (0 quando vazia).
    async fn count_rows(&self, table: &str) -> Result<i64, LedgerError>;

    /// Grava cabeçalho + linhas numa única transação lógica.
    async fn persist_document(&self, document: &Document) -> Result<Document, LedgerError>;

    /// Aplica o delta de uma atualização e devolve quantas linhas
    /// REALMENTE mudaram (0 => NoDataEdited no chamador).
    async fn persist_update(&self, document: &Document) -> Result<u64, LedgerError>;

    /// Busca documento + detalhes pelo número.
    async fn fetch_document_by_number(
        &self,
        category: DocCategory,
        document_no: &str,
    ) -> Result<Option<Document>, LedgerError>;
}

// ---
// Extensão para o modo estrito de sequência.
// ---
// No modo fiel ao sistema de origem, "lê o último número, incrementa,
// insere" são três idas separadas e dois Creates concorrentes podem
// propor o mesmo número (a colisão estoura como violação de unicidade e
// o chamador reexecuta o Create inteiro). Quem implementa este trait
// fecha a corrida: a leitura, o incremento e o insert acontecem dentro
// de uma única transação serializável do próprio banco.
#[async_trait]
pub trait AtomicSequenceStore: DocumentStore {
    /// Numera e grava o documento numa única transação. O documento chega
    /// montado (linhas numeradas, lote preenchido, regras validadas) mas
    /// ainda sem número e sem tags de origem.
    async fn persist_numbered(
        &self,
        document: Document,
        org_tag: &str,
        today: NaiveDate,
    ) -> Result<Document, LedgerError>;
}
