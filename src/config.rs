// src/config.rs

use std::env;

// --- Modo de sequência ---
// `Faithful` reproduz o contrato do sistema de origem (read-then-compute,
// com a corrida documentada). `Strict` exige um store que implemente
// `AtomicSequenceStore` e fecha a corrida dentro de uma transação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    Faithful,
    Strict,
}

// A configuração do motor, compartilhada pelos serviços
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tag fixa da organização no número do documento (o `R1` de
    /// `0001/R1/SA/01/24`).
    pub org_tag: String,
    pub sequence_mode: SequenceMode,
}

impl EngineConfig {
    pub fn new(org_tag: impl Into<String>, sequence_mode: SequenceMode) -> Self {
        Self {
            org_tag: org_tag.into(),
            sequence_mode,
        }
    }

    /// Carrega a configuração das variáveis de ambiente (com .env via
    /// dotenvy), para hosts que preferem não montar na mão.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let org_tag = env::var("LEDGER_ORG_TAG").unwrap_or_else(|_| "R1".to_string());

        let sequence_mode = match env::var("LEDGER_SEQUENCE_MODE") {
            Err(_) => SequenceMode::Faithful,
            Ok(raw) => match raw.to_ascii_lowercase().as_str() {
                "faithful" => SequenceMode::Faithful,
                "strict" => SequenceMode::Strict,
                other => anyhow::bail!("LEDGER_SEQUENCE_MODE inválido: '{other}' (use 'faithful' ou 'strict')"),
            },
        };

        tracing::info!(org_tag = %org_tag, ?sequence_mode, "configuração do motor carregada");
        Ok(Self {
            org_tag,
            sequence_mode,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("R1", SequenceMode::Faithful)
    }
}
