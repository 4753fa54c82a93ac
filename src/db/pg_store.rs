// src/db/pg_store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::common::error::LedgerError;
use crate::common::numbering::{finalize_document_number, parse_sequence_prefix};
use crate::db::document_store::{AtomicSequenceStore, DocumentStore};
use crate::models::category::DocCategory;
use crate::models::document::{Document, DocumentLine, LineReference, LineRole};

// A implementação Postgres do contrato de persistência.
//
// O layout de colunas esperado (o schema em si pertence ao host):
//   cabeçalho: document_no, document_date, warehouse_code, remark,
//              created_by, created_at, last_updated_by, last_updated_at
//   detalhe:   id, document_no, d_no, item_code, batch_no, source,
//              quantity, available_stock, role, cancelled, success,
//              ref_document_no, ref_d_no
//
// Os nomes de tabela e coluna interpolados nas queries vêm SEMPRE do
// registro estático de categorias, nunca de entrada do usuário.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Grava cabeçalho + linhas dentro da transação recebida.
    async fn insert_document(
        tx: &mut Transaction<'_, Postgres>,
        document: &Document,
    ) -> Result<(), LedgerError> {
        let info = document.category.info();

        let header_sql = format!(
            "INSERT INTO {} (document_no, document_date, warehouse_code, remark, \
             created_by, created_at, last_updated_by, last_updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            info.table
        );
        sqlx::query(&header_sql)
            .bind(&document.document_no)
            .bind(document.document_date)
            .bind(&document.warehouse_code)
            .bind(&document.remark)
            .bind(&document.created_by)
            .bind(document.created_at)
            .bind(&document.last_updated_by)
            .bind(document.last_updated_at)
            .execute(&mut **tx)
            .await?;

        let detail_sql = format!(
            "INSERT INTO {} (id, document_no, d_no, item_code, batch_no, source, \
             quantity, available_stock, role, cancelled, success, \
             ref_document_no, ref_d_no) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            info.detail_table
        );
        for line in &document.lines {
            sqlx::query(&detail_sql)
                .bind(line.id)
                .bind(&document.document_no)
                .bind(&line.d_no)
                .bind(&line.item_code)
                .bind(&line.batch_no)
                .bind(&line.source)
                .bind(line.quantity)
                .bind(line.available_stock)
                .bind(line.role.as_db_str())
                .bind(line.cancelled)
                .bind(line.success)
                .bind(line.reference.as_ref().map(|r| r.document_no.clone()))
                .bind(line.reference.as_ref().map(|r| r.d_no.clone()))
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    fn line_from_row(row: &sqlx::postgres::PgRow) -> Result<DocumentLine, LedgerError> {
        let role_raw: String = row.try_get("role")?;
        let role = LineRole::from_db_str(&role_raw).ok_or_else(|| {
            LedgerError::Internal(anyhow::anyhow!("papel de linha desconhecido no banco: {role_raw}"))
        })?;

        let ref_document_no: Option<String> = row.try_get("ref_document_no")?;
        let ref_d_no: Option<String> = row.try_get("ref_d_no")?;
        let reference = match (ref_document_no, ref_d_no) {
            (Some(document_no), Some(d_no)) => Some(LineReference { document_no, d_no }),
            _ => None,
        };

        Ok(DocumentLine {
            id: row.try_get("id")?,
            d_no: row.try_get("d_no")?,
            item_code: row.try_get("item_code")?,
            batch_no: row.try_get("batch_no")?,
            source: row.try_get("source")?,
            quantity: row.try_get("quantity")?,
            available_stock: row.try_get("available_stock")?,
            role,
            cancelled: row.try_get("cancelled")?,
            success: row.try_get("success")?,
            reference,
        })
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn fetch_greatest_key(
        &self,
        table: &str,
        key_column: &str,
    ) -> Result<Option<String>, LedgerError> {
        let sql = format!("SELECT {key_column} FROM {table} ORDER BY {key_column} DESC LIMIT 1");
        let last = sqlx::query_scalar::<_, String>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(last)
    }

    async fn count_rows(&self, table: &str) -> Result<i64, LedgerError> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn persist_document(&self, document: &Document) -> Result<Document, LedgerError> {
        let mut tx = self.pool.begin().await?;
        Self::insert_document(&mut tx, document).await?;
        tx.commit().await?;
        Ok(document.clone())
    }

    async fn persist_update(&self, document: &Document) -> Result<u64, LedgerError> {
        let info = document.category.info();
        let mut tx = self.pool.begin().await?;
        let mut changed: u64 = 0;

        // O guard IS DISTINCT FROM faz o UPDATE só contar linhas que
        // realmente mudaram; payload idêntico => 0 linhas => NoDataEdited.
        let header_sql = format!(
            "UPDATE {} SET warehouse_code = $2, remark = $3, \
             last_updated_by = $4, last_updated_at = $5 \
             WHERE document_no = $1 \
             AND (warehouse_code IS DISTINCT FROM $2 OR remark IS DISTINCT FROM $3)",
            info.table
        );
        let result = sqlx::query(&header_sql)
            .bind(&document.document_no)
            .bind(&document.warehouse_code)
            .bind(&document.remark)
            .bind(&document.last_updated_by)
            .bind(document.last_updated_at)
            .execute(&mut *tx)
            .await?;
        changed += result.rows_affected();

        let line_sql = format!(
            "UPDATE {} SET quantity = $3, available_stock = $4, batch_no = $5, \
             cancelled = $6, success = $7 \
             WHERE document_no = $1 AND d_no = $2 \
             AND (quantity IS DISTINCT FROM $3 OR available_stock IS DISTINCT FROM $4 \
             OR batch_no IS DISTINCT FROM $5 OR cancelled IS DISTINCT FROM $6 \
             OR success IS DISTINCT FROM $7)",
            info.detail_table
        );
        for line in &document.lines {
            let result = sqlx::query(&line_sql)
                .bind(&document.document_no)
                .bind(&line.d_no)
                .bind(line.quantity)
                .bind(line.available_stock)
                .bind(&line.batch_no)
                .bind(line.cancelled)
                .bind(line.success)
                .execute(&mut *tx)
                .await?;
            changed += result.rows_affected();
        }

        tx.commit().await?;
        Ok(changed)
    }

    async fn fetch_document_by_number(
        &self,
        category: DocCategory,
        document_no: &str,
    ) -> Result<Option<Document>, LedgerError> {
        let info = category.info();

        let header_sql = format!(
            "SELECT document_no, document_date, warehouse_code, remark, \
             created_by, created_at, last_updated_by, last_updated_at \
             FROM {} WHERE document_no = $1",
            info.table
        );
        let header = sqlx::query(&header_sql)
            .bind(document_no)
            .fetch_optional(&self.pool)
            .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let detail_sql = format!(
            "SELECT id, d_no, item_code, batch_no, source, quantity, available_stock, \
             role, cancelled, success, ref_document_no, ref_d_no \
             FROM {} WHERE document_no = $1 ORDER BY d_no ASC",
            info.detail_table
        );
        let detail_rows = sqlx::query(&detail_sql)
            .bind(document_no)
            .fetch_all(&self.pool)
            .await?;

        let mut lines = Vec::with_capacity(detail_rows.len());
        for row in &detail_rows {
            lines.push(Self::line_from_row(row)?);
        }

        Ok(Some(Document {
            document_no: header.try_get("document_no")?,
            category,
            document_date: header.try_get("document_date")?,
            warehouse_code: header.try_get("warehouse_code")?,
            remark: header.try_get("remark")?,
            created_by: header.try_get("created_by")?,
            created_at: header.try_get("created_at")?,
            last_updated_by: header.try_get("last_updated_by")?,
            last_updated_at: header.try_get("last_updated_at")?,
            lines,
        }))
    }
}

#[async_trait]
impl AtomicSequenceStore for PgDocumentStore {
    async fn persist_numbered(
        &self,
        mut document: Document,
        org_tag: &str,
        today: NaiveDate,
    ) -> Result<Document, LedgerError> {
        let info = document.category.info();
        let mut tx = self.pool.begin().await?;

        // Serializável: dois Creates concorrentes não enxergam o mesmo
        // "último número"; o perdedor falha na serialização e o host
        // reexecuta o Create com leitura nova.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let last_sql = format!(
            "SELECT {pk} FROM {table} ORDER BY {pk} DESC LIMIT 1 FOR UPDATE",
            pk = info.primary_key,
            table = info.table
        );
        let last = sqlx::query_scalar::<_, String>(&last_sql)
            .fetch_optional(&mut *tx)
            .await?;

        let sequence = match last {
            None => 0,
            Some(value) => parse_sequence_prefix(&value).ok_or_else(|| {
                LedgerError::MalformedSequenceState {
                    table: info.table.to_string(),
                    value,
                }
            })?,
        };

        finalize_document_number(&mut document, sequence + 1, org_tag, today);
        tracing::debug!(document_no = %document.document_no, "número emitido em transação estrita");

        Self::insert_document(&mut tx, &document).await?;
        tx.commit().await?;

        Ok(document)
    }
}
