use rust_decimal::Decimal;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// `NoDataEdited` NÃO aparece aqui de propósito: edição sem linhas alteradas
// é um sinal suave (ver `UpdateOutcome`), nunca um erro.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Categoria de documento desconhecida: {0}")]
    UnknownCategory(String),

    #[error("Estado de sequência corrompido na tabela {table}: último número '{value}' não é numérico")]
    MalformedSequenceState { table: String, value: String },

    #[error("Contagem de detalhes indisponível na tabela {table}")]
    CountUnavailable { table: String },

    #[error("Estoque insuficiente para o item {item_code}: pedido {requested}, disponível {available}")]
    InsufficientStock {
        item_code: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Transição inválida na linha {d_no} do documento {document_no}")]
    InvalidReferenceTransition { document_no: String, d_no: String },

    #[error("Data de documento inválida: '{0}' (esperado YYYYMMDD ou YYYY-MM-DD)")]
    InvalidDocumentDate(String),

    #[error("Documento não encontrado: {0}")]
    DocumentNotFound(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno")]
    Internal(#[from] anyhow::Error),
}

impl LedgerError {
    /// Indica se o erro é corrigível pelo usuário (vira erro de validação no
    /// host) ou interno (vira 5xx / investigação).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LedgerError::InsufficientStock { .. }
                | LedgerError::InvalidReferenceTransition { .. }
                | LedgerError::InvalidDocumentDate(_)
                | LedgerError::DocumentNotFound(_)
        )
    }
}
