// src/models/category.rs

use serde::{Deserialize, Serialize};

use crate::common::error::LedgerError;

// --- 1. Política de numeração de linhas ---
// Decide se o DNo reinicia a cada documento ou continua correndo pela
// tabela de detalhes compartilhada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberingPolicy {
    PerDocument,
    CrossDocument,
}

// --- 2. Categorias de documento ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocCategory {
    StockAdjustment,
    StockMutation,
    InitialStock,
    DirectPurchaseReceive,
    MaterialReceive,
    MaterialTransfer,
    DirectSalesDelivery,
    PurchaseOrderRequest,
    VendorQuotation,
}

// --- 3. Registro (tabela fixa, somente leitura) ---
// Cada categoria conhece sua tabela de cabeçalho, a coluna de chave
// primária, a tabela de detalhes, a abreviação do número e a política
// de numeração. Populado na compilação; sem API de mutação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub name: &'static str,
    pub table: &'static str,
    pub primary_key: &'static str,
    pub detail_table: &'static str,
    pub abbreviation: &'static str,
    pub policy: NumberingPolicy,
}

impl DocCategory {
    pub const ALL: [DocCategory; 9] = [
        DocCategory::StockAdjustment,
        DocCategory::StockMutation,
        DocCategory::InitialStock,
        DocCategory::DirectPurchaseReceive,
        DocCategory::MaterialReceive,
        DocCategory::MaterialTransfer,
        DocCategory::DirectSalesDelivery,
        DocCategory::PurchaseOrderRequest,
        DocCategory::VendorQuotation,
    ];

    /// Busca por nome, para chamadas que chegam com a categoria em texto.
    pub fn from_name(name: &str) -> Result<Self, LedgerError> {
        Self::ALL
            .into_iter()
            .find(|c| c.info().name == name)
            .ok_or_else(|| LedgerError::UnknownCategory(name.to_string()))
    }

    pub fn info(self) -> &'static CategoryInfo {
        // As categorias de estoque corrido (ajuste, mutação, estoque inicial,
        // recebimento direto) compartilham a tabela de detalhes, por isso o
        // DNo delas corre entre documentos.
        match self {
            DocCategory::StockAdjustment => &CategoryInfo {
                name: "StockAdjustment",
                table: "stock_adjustments",
                primary_key: "document_no",
                detail_table: "stock_details",
                abbreviation: "SA",
                policy: NumberingPolicy::CrossDocument,
            },
            DocCategory::StockMutation => &CategoryInfo {
                name: "StockMutation",
                table: "stock_mutations",
                primary_key: "document_no",
                detail_table: "stock_details",
                abbreviation: "SM",
                policy: NumberingPolicy::CrossDocument,
            },
            DocCategory::InitialStock => &CategoryInfo {
                name: "InitialStock",
                table: "initial_stocks",
                primary_key: "document_no",
                detail_table: "stock_details",
                abbreviation: "IS",
                policy: NumberingPolicy::CrossDocument,
            },
            DocCategory::DirectPurchaseReceive => &CategoryInfo {
                name: "DirectPurchaseReceive",
                table: "direct_purchase_receives",
                primary_key: "document_no",
                detail_table: "stock_details",
                abbreviation: "DPR",
                policy: NumberingPolicy::CrossDocument,
            },
            DocCategory::MaterialReceive => &CategoryInfo {
                name: "MaterialReceive",
                table: "material_receives",
                primary_key: "document_no",
                detail_table: "material_receive_details",
                abbreviation: "MR",
                policy: NumberingPolicy::PerDocument,
            },
            DocCategory::MaterialTransfer => &CategoryInfo {
                name: "MaterialTransfer",
                table: "material_transfers",
                primary_key: "document_no",
                detail_table: "material_transfer_details",
                abbreviation: "MT",
                policy: NumberingPolicy::PerDocument,
            },
            DocCategory::DirectSalesDelivery => &CategoryInfo {
                name: "DirectSalesDelivery",
                table: "direct_sales_deliveries",
                primary_key: "document_no",
                detail_table: "direct_sales_delivery_details",
                abbreviation: "DSD",
                policy: NumberingPolicy::PerDocument,
            },
            DocCategory::PurchaseOrderRequest => &CategoryInfo {
                name: "PurchaseOrderRequest",
                table: "purchase_order_requests",
                primary_key: "document_no",
                detail_table: "purchase_order_request_details",
                abbreviation: "POR",
                policy: NumberingPolicy::PerDocument,
            },
            DocCategory::VendorQuotation => &CategoryInfo {
                name: "VendorQuotation",
                table: "vendor_quotations",
                primary_key: "document_no",
                detail_table: "vendor_quotation_details",
                abbreviation: "VQ",
                policy: NumberingPolicy::PerDocument,
            },
        }
    }

    pub fn table_of(self) -> &'static str {
        self.info().table
    }

    pub fn primary_key_of(self) -> &'static str {
        self.info().primary_key
    }

    pub fn detail_table_of(self) -> &'static str {
        self.info().detail_table
    }

    pub fn doc_abbreviation_of(self) -> &'static str {
        self.info().abbreviation
    }

    pub fn numbering_policy_of(self) -> NumberingPolicy {
        self.info().policy
    }
}
