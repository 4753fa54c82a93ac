// src/models/document.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::category::DocCategory;

// --- 1. Papel da linha ---
// Linhas de mutação de estoque têm papéis distintos: a linha "from" baixa
// estoque de origem (e exige saldo), a linha "to" entra zerada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineRole {
    Standard,
    MutationFrom,
    MutationTo,
}

impl LineRole {
    pub fn as_db_str(self) -> &'static str {
        match self {
            LineRole::Standard => "STANDARD",
            LineRole::MutationFrom => "FROM",
            LineRole::MutationTo => "TO",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "STANDARD" => Some(LineRole::Standard),
            "FROM" => Some(LineRole::MutationFrom),
            "TO" => Some(LineRole::MutationTo),
            _ => None,
        }
    }
}

// --- 2. Referência cruzada (fraca) ---
// Par (documento, linha) apontando para a linha de outro documento.
// Serve só para lookup de rastreabilidade; nunca implica posse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineReference {
    pub document_no: String,
    pub d_no: String,
}

// --- 3. Linha de detalhe ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    // Identidade sintética da linha; o DNo é a identidade de negócio e
    // pode ser renumerado, o id não.
    pub id: Uuid,
    pub d_no: String,
    pub item_code: String,
    pub batch_no: String,
    pub source: String,
    pub quantity: Decimal,
    pub available_stock: Decimal,
    pub role: LineRole,
    pub cancelled: bool,
    pub success: bool,
    pub reference: Option<LineReference>,
}

// --- 4. Documento (cabeçalho + linhas) ---
// O documento é dono das suas linhas (composição). Não há deleção física:
// o ciclo de vida é criar uma vez e depois atualizar parcialmente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_no: String,
    pub category: DocCategory,
    pub document_date: NaiveDate,
    pub warehouse_code: Option<String>,
    pub remark: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub lines: Vec<DocumentLine>,
}

impl Document {
    /// Documento vazio ainda sem número. Útil na montagem e nos testes.
    pub fn empty(category: DocCategory, document_date: NaiveDate) -> Self {
        Self {
            document_no: String::new(),
            category,
            document_date,
            warehouse_code: None,
            remark: None,
            created_by: String::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            last_updated_by: None,
            last_updated_at: None,
            lines: Vec::new(),
        }
    }

    pub fn line_by_d_no(&self, d_no: &str) -> Option<&DocumentLine> {
        self.lines.iter().find(|l| l.d_no == d_no)
    }
}

// --- 5. Entrada de criação ---
// O que o host manda num Create: ainda sem número, sem DNo e sem source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub category: DocCategory,
    pub document_date: String,
    pub warehouse_code: Option<String>,
    pub remark: Option<String>,
    pub lines: Vec<NewDocumentLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentLine {
    pub item_code: String,
    #[serde(default)]
    pub batch_no: Option<String>,
    pub quantity: Decimal,
    #[serde(default)]
    pub available_stock: Decimal,
    #[serde(default = "NewDocumentLine::default_role")]
    pub role: LineRole,
    #[serde(default)]
    pub reference: Option<LineReference>,
}

impl NewDocumentLine {
    fn default_role() -> LineRole {
        LineRole::Standard
    }
}

// --- 6. Resultado de atualização ---
// "Nenhuma linha alterada" é sucesso suave: o chamador devolve o payload
// como se tivesse gravado, sem mascarar falhas reais de persistência.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Document),
    NoDataEdited(Document),
}

impl UpdateOutcome {
    pub fn document(&self) -> &Document {
        match self {
            UpdateOutcome::Updated(doc) | UpdateOutcome::NoDataEdited(doc) => doc,
        }
    }

    pub fn into_document(self) -> Document {
        match self {
            UpdateOutcome::Updated(doc) | UpdateOutcome::NoDataEdited(doc) => doc,
        }
    }

    pub fn is_no_data_edited(&self) -> bool {
        matches!(self, UpdateOutcome::NoDataEdited(_))
    }
}
