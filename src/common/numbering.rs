// src/common/numbering.rs

use chrono::{Datelike, NaiveDate};

use crate::models::category::NumberingPolicy;
use crate::models::document::{Document, DocumentLine};

// ---
// Helpers puros de numeração: nada aqui toca o banco.
// ---

/// Preenche com zeros à esquerda ("7" -> "007").
pub fn zero_pad(n: i64, width: usize) -> String {
    format!("{:0>width$}", n, width = width)
}

/// Período do número de documento, no formato MM/YY.
pub fn period_of(date: NaiveDate) -> String {
    date.format("%m/%y").to_string()
}

/// Monta o número completo: `NNNN/<org>/<ABBR>/MM/YY`.
pub fn format_document_number(sequence: i64, org_tag: &str, abbreviation: &str, today: NaiveDate) -> String {
    format!(
        "{:04}/{}/{}/{}",
        sequence,
        org_tag,
        abbreviation,
        period_of(today)
    )
}

/// Extrai o prefixo numérico do último número emitido (tudo antes da
/// primeira '/'). Retorna None se o prefixo não for numérico.
pub fn parse_sequence_prefix(last_key: &str) -> Option<i64> {
    let prefix = last_key.split('/').next().unwrap_or(last_key);
    prefix.trim().parse::<i64>().ok()
}

/// Tag de rastreabilidade de uma linha: `DD*docNo*DNo`.
/// O dia vem da data do documento (canonizado: dia do mês, não o recorte
/// de mês que alguns fluxos antigos usavam).
pub fn compose_source_tag(date: NaiveDate, document_no: &str, d_no: &str) -> String {
    format!("{:02}*{}*{}", date.day(), document_no, d_no)
}

/// Numera as linhas do documento em ordem de envio.
///
/// - `PerDocument`: o contador reinicia em zero a cada documento.
/// - `CrossDocument`: o contador continua a partir de `starting_offset`
///   (a contagem de linhas já persistidas na tabela de detalhes
///   compartilhada).
pub fn assign_line_numbers(policy: NumberingPolicy, starting_offset: i64, lines: &mut [DocumentLine]) {
    let mut counter = match policy {
        NumberingPolicy::PerDocument => 0,
        NumberingPolicy::CrossDocument => starting_offset,
    };
    for line in lines.iter_mut() {
        counter += 1;
        line.d_no = zero_pad(counter, 3);
    }
}

/// Normaliza a data de entrada (aceita `YYYYMMDD` ou `YYYY-MM-DD`).
pub fn normalize_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}

/// Recalcula a tag de origem de todas as linhas já numeradas.
pub fn stamp_source_tags(document: &mut Document) {
    let date = document.document_date;
    let doc_no = document.document_no.clone();
    for line in document.lines.iter_mut() {
        line.source = compose_source_tag(date, &doc_no, &line.d_no);
    }
}

/// Fecha o número do documento a partir da sequência lida no banco e
/// carimba as tags de origem. Usado tanto pelo fluxo comum quanto pelo
/// persist atômico do modo estrito.
pub fn finalize_document_number(document: &mut Document, sequence: i64, org_tag: &str, today: NaiveDate) {
    let abbreviation = document.category.doc_abbreviation_of();
    document.document_no = format_document_number(sequence, org_tag, abbreviation, today);
    stamp_source_tags(document);
}
