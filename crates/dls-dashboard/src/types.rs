//! Response shapes for the dashboard endpoints.
//!
//! `Serialize + Deserialize` so they can be JSON-encoded by the daemon and
//! decoded by its scenario tests. No logic lives here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dls_schemas::Alocacao;

// ---------------------------------------------------------------------------
// /dashboard/resumo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resumo {
    pub total_dataloggers: usize,
    pub em_estoque: usize,
    pub alocados: usize,
    pub em_calibracao: usize,
    pub em_manutencao: usize,
    pub demandas_ativas: usize,
    pub alocacoes_em_campo: usize,
    pub calibracoes_vencidas: usize,
    /// In-field allocations expected back within the next 7 days.
    pub retornos_proximos: usize,
    /// Alocado / Total × 100, 2 decimals; 0 when there are no dataloggers.
    pub taxa_ocupacao: f64,
}

// ---------------------------------------------------------------------------
// /dashboard/disponibilidade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjecaoDia {
    pub data: NaiveDate,
    /// Cumulative availability at end of this day.
    pub disponibilidade: usize,
    /// Returns expected on exactly this day.
    pub retornos: usize,
    pub detalhes_retornos: Vec<Alocacao>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disponibilidade {
    pub projecao: Vec<ProjecaoDia>,
    pub disponibilidade_atual: usize,
    pub total_dataloggers: usize,
}

// ---------------------------------------------------------------------------
// /dashboard/ocupacao-por-cliente
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcupacaoCliente {
    pub cliente: String,
    pub quantidade: usize,
}

// ---------------------------------------------------------------------------
// /dashboard/alertas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoAlerta {
    #[serde(rename = "calibracao_vencida")]
    CalibracaoVencida,
    #[serde(rename = "calibracao_proxima")]
    CalibracaoProxima,
    #[serde(rename = "retorno_atrasado")]
    RetornoAtrasado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prioridade {
    #[serde(rename = "alta")]
    Alta,
    #[serde(rename = "media")]
    Media,
    #[serde(rename = "baixa")]
    Baixa,
}

impl Prioridade {
    /// Sort rank: alta before media before baixa.
    pub fn rank(&self) -> u8 {
        match self {
            Prioridade::Alta => 0,
            Prioridade::Media => 1,
            Prioridade::Baixa => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alerta {
    pub tipo: TipoAlerta,
    pub prioridade: Prioridade,
    pub mensagem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datalogger_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alocacao_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demanda_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_vencimento: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dias_atraso: Option<i64>,
}

// ---------------------------------------------------------------------------
// /dashboard/historico-ocupacao
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricoDia {
    pub data: NaiveDate,
    pub alocados: usize,
    pub disponivel: usize,
    pub taxa_ocupacao: f64,
}
