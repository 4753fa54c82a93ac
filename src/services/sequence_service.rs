// src/services/sequence_service.rs

use std::sync::Arc;

use chrono::NaiveDate;

use crate::common::error::LedgerError;
use crate::common::numbering::{format_document_number, parse_sequence_prefix};
use crate::config::EngineConfig;
use crate::db::document_store::DocumentStore;
use crate::models::category::DocCategory;

// O resolvedor de sequência: lê o estado atual do banco e propõe o
// próximo número. Ele NÃO reserva nada: o chamador precisa persistir
// logo em seguida para encurtar a janela de corrida (modo fiel), ou usar
// o modo estrito do store. Nenhum estado de sequência fica em memória
// entre requisições.
#[derive(Clone)]
pub struct SequenceService<S: DocumentStore> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: DocumentStore> SequenceService<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Próximo número de documento da categoria: busca a maior chave,
    /// extrai o prefixo numérico (0 se a tabela estiver vazia), incrementa
    /// e formata `NNNN/<org>/<ABBR>/MM/YY`.
    pub async fn next_document_number(
        &self,
        category: DocCategory,
        today: NaiveDate,
    ) -> Result<String, LedgerError> {
        let info = category.info();

        let last = self
            .store
            .fetch_greatest_key(info.table, info.primary_key)
            .await?;

        let sequence = match last {
            None => 0,
            Some(value) => parse_sequence_prefix(&value).ok_or_else(|| {
                tracing::error!(
                    table = info.table,
                    value = %value,
                    "último número emitido não tem prefixo numérico"
                );
                LedgerError::MalformedSequenceState {
                    table: info.table.to_string(),
                    value,
                }
            })?,
        };

        let number = format_document_number(sequence + 1, &self.config.org_tag, info.abbreviation, today);
        tracing::debug!(category = info.name, number = %number, "número de documento proposto");
        Ok(number)
    }

    /// Contagem de linhas já gravadas na tabela de detalhes da categoria,
    /// usada como offset inicial da numeração corrida de DNo.
    pub async fn last_detail_count(&self, category: DocCategory) -> Result<i64, LedgerError> {
        let info = category.info();
        match self.store.count_rows(info.detail_table).await {
            Ok(count) => Ok(count),
            Err(e) => {
                tracing::error!(table = info.detail_table, error = %e, "falha na contagem de detalhes");
                Err(LedgerError::CountUnavailable {
                    table: info.detail_table.to_string(),
                })
            }
        }
    }
}
