// src/services/assembly_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::error::LedgerError;
use crate::common::numbering::{assign_line_numbers, normalize_date, stamp_source_tags};
use crate::config::{EngineConfig, SequenceMode};
use crate::db::document_store::{AtomicSequenceStore, DocumentStore};
use crate::models::category::NumberingPolicy;
use crate::models::document::{Document, DocumentLine, NewDocument, UpdateOutcome};
use crate::services::ledger_service::LedgerRules;
use crate::services::sequence_service::SequenceService;

// A montagem de documento: o orquestrador que junta registro, sequência,
// numeração de linhas, tags de origem e regras do livro, e só então
// entrega o documento pronto para a persistência. Qualquer passo que
// falhe aborta ANTES do persist, sem sobrar escrita parcial.
#[derive(Clone)]
pub struct DocumentAssembly<S: DocumentStore> {
    store: Arc<S>,
    sequence: SequenceService<S>,
    config: EngineConfig,
}

impl<S: DocumentStore> DocumentAssembly<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let sequence = SequenceService::new(store.clone(), config.clone());
        Self {
            store,
            sequence,
            config,
        }
    }

    // Monta o documento até o ponto em que só falta o número e as tags
    // de origem: audit, data normalizada, defaults de lote, saldo zerado
    // nas linhas de destino, linhas numeradas e regras validadas.
    async fn assemble(
        &self,
        input: NewDocument,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Document, LedgerError> {
        let document_date = normalize_date(&input.document_date)
            .ok_or_else(|| LedgerError::InvalidDocumentDate(input.document_date.clone()))?;

        let batch_default = document_date.format("%Y%m%d").to_string();

        let mut document = Document {
            document_no: String::new(),
            category: input.category,
            document_date,
            warehouse_code: input.warehouse_code,
            remark: input.remark,
            created_by: created_by.to_string(),
            created_at: now,
            last_updated_by: None,
            last_updated_at: None,
            lines: input
                .lines
                .into_iter()
                .map(|line| DocumentLine {
                    id: Uuid::new_v4(),
                    d_no: String::new(),
                    item_code: line.item_code,
                    // Lote vazio assume a data do documento
                    batch_no: line.batch_no.filter(|b| !b.is_empty()).unwrap_or_else(|| batch_default.clone()),
                    source: String::new(),
                    quantity: line.quantity,
                    available_stock: line.available_stock,
                    role: line.role,
                    cancelled: false,
                    success: false,
                    reference: line.reference,
                })
                .collect(),
        };

        LedgerRules::reset_destination_stock(&mut document);

        // Saldo insuficiente tem que derrubar o Create antes de qualquer
        // tag de origem ser calculada.
        LedgerRules::validate_create(&document)?;

        let offset = match document.category.numbering_policy_of() {
            NumberingPolicy::PerDocument => 0,
            NumberingPolicy::CrossDocument => self.sequence.last_detail_count(document.category).await?,
        };
        assign_line_numbers(document.category.numbering_policy_of(), offset, &mut document.lines);

        Ok(document)
    }

    /// Fluxo de criação fiel ao sistema de origem: o número é proposto
    /// por leitura simples (read-then-compute) e a gravação vem depois.
    /// Dois Creates concorrentes podem propor o mesmo número; a colisão
    /// estoura como violação de unicidade no banco e o chamador reexecuta
    /// o Create inteiro com leitura nova (nunca reaproveita o número).
    pub async fn create(
        &self,
        input: NewDocument,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Document, LedgerError> {
        let mut document = self.assemble(input, created_by, now).await?;

        document.document_no = self
            .sequence
            .next_document_number(document.category, now.date_naive())
            .await?;
        stamp_source_tags(&mut document);

        let persisted = self.store.persist_document(&document).await?;
        tracing::info!(
            document_no = %persisted.document_no,
            category = document.category.info().name,
            lines = persisted.lines.len(),
            "documento criado"
        );
        Ok(persisted)
    }

    /// Fluxo de atualização: busca o estado persistido, valida as
    /// transições linha a linha e aplica o delta. Zero linhas alteradas
    /// NÃO é erro: devolve `NoDataEdited` ecoando o documento enviado.
    pub async fn update(
        &self,
        mut submitted: Document,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, LedgerError> {
        let existing = self
            .store
            .fetch_document_by_number(submitted.category, &submitted.document_no)
            .await?
            .ok_or_else(|| LedgerError::DocumentNotFound(submitted.document_no.clone()))?;

        LedgerRules::validate_transition(&existing, &submitted)?;

        submitted.last_updated_by = Some(updated_by.to_string());
        submitted.last_updated_at = Some(now);

        let changed = self.store.persist_update(&submitted).await?;
        if changed == 0 {
            tracing::info!(document_no = %submitted.document_no, "atualização sem linhas alteradas");
            return Ok(UpdateOutcome::NoDataEdited(submitted));
        }

        tracing::info!(
            document_no = %submitted.document_no,
            changed,
            "documento atualizado"
        );
        Ok(UpdateOutcome::Updated(submitted))
    }
}

impl<S: AtomicSequenceStore> DocumentAssembly<S> {
    /// Fluxo de criação endurecido: a leitura do último número, o
    /// incremento e o insert acontecem numa única transação do store,
    /// fechando a corrida de numeração do modo fiel.
    pub async fn create_strict(
        &self,
        input: NewDocument,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Document, LedgerError> {
        let document = self.assemble(input, created_by, now).await?;

        let persisted = self
            .store
            .persist_numbered(document, &self.config.org_tag, now.date_naive())
            .await?;
        tracing::info!(
            document_no = %persisted.document_no,
            lines = persisted.lines.len(),
            "documento criado (sequência estrita)"
        );
        Ok(persisted)
    }

    /// Despacha para o fluxo fiel ou o estrito conforme a configuração.
    /// A escolha é sempre explícita, nada de endurecer silenciosamente.
    pub async fn submit(
        &self,
        input: NewDocument,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Document, LedgerError> {
        match self.config.sequence_mode {
            SequenceMode::Faithful => self.create(input, created_by, now).await,
            SequenceMode::Strict => self.create_strict(input, created_by, now).await,
        }
    }
}
