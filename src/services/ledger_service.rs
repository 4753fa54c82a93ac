// src/services/ledger_service.rs

use rust_decimal::Decimal;

use crate::common::error::LedgerError;
use crate::models::document::{Document, LineRole};

// As regras de consistência do livro de estoque, avaliadas sobre o
// documento já numerado antes de qualquer persistência. Violação vira
// rejeição tipada, nunca erro genérico.
pub struct LedgerRules;

impl LedgerRules {
    /// Regras de criação.
    ///
    /// - Linha "from" de mutação não pode pedir mais do que o saldo
    ///   disponível (avaliado ANTES de carimbar as tags de origem; nada
    ///   parcial é persistido na falha).
    /// - Nenhuma linha nasce cancelada e bem-sucedida ao mesmo tempo.
    pub fn validate_create(document: &Document) -> Result<(), LedgerError> {
        for line in &document.lines {
            if line.role == LineRole::MutationFrom && line.quantity > line.available_stock {
                tracing::warn!(
                    item = %line.item_code,
                    requested = %line.quantity,
                    available = %line.available_stock,
                    "mutação rejeitada: saldo insuficiente na origem"
                );
                return Err(LedgerError::InsufficientStock {
                    item_code: line.item_code.clone(),
                    requested: line.quantity,
                    available: line.available_stock,
                });
            }

            if line.cancelled && line.success {
                return Err(LedgerError::InvalidReferenceTransition {
                    document_no: document.document_no.clone(),
                    d_no: line.d_no.clone(),
                });
            }
        }
        Ok(())
    }

    /// Zera o saldo das linhas "to": linha de destino nunca carrega
    /// estoque anterior.
    pub fn reset_destination_stock(document: &mut Document) {
        for line in document.lines.iter_mut() {
            if line.role == LineRole::MutationTo {
                line.available_stock = Decimal::ZERO;
            }
        }
    }

    /// Regras de transição (atualização), comparando o estado persistido
    /// com o enviado, linha a linha por DNo.
    ///
    /// - Linha já marcada como sucesso/usada não pode ser cancelada.
    /// - Linha já cancelada não pode virar sucesso na mesma atualização.
    /// - Cancelada e bem-sucedida ao mesmo tempo nunca é válido.
    pub fn validate_transition(previous: &Document, next: &Document) -> Result<(), LedgerError> {
        for next_line in &next.lines {
            if next_line.cancelled && next_line.success {
                return Err(LedgerError::InvalidReferenceTransition {
                    document_no: next.document_no.clone(),
                    d_no: next_line.d_no.clone(),
                });
            }

            // Linhas novas (sem contraparte persistida) só passam pela
            // regra de exclusão mútua acima.
            let Some(prev_line) = previous.line_by_d_no(&next_line.d_no) else {
                continue;
            };

            let reopening_done_line = prev_line.success && next_line.cancelled;
            let reviving_cancelled_line = prev_line.cancelled && next_line.success;
            if reopening_done_line || reviving_cancelled_line {
                tracing::warn!(
                    document_no = %next.document_no,
                    d_no = %next_line.d_no,
                    "transição de referência rejeitada"
                );
                return Err(LedgerError::InvalidReferenceTransition {
                    document_no: next.document_no.clone(),
                    d_no: next_line.d_no.clone(),
                });
            }
        }
        Ok(())
    }
}
