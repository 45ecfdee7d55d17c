//! dls-schemas
//!
//! Domain entities and status vocabularies for the datalogger inventory
//! tracker. Wire-format field names and status strings match the running
//! API (Portuguese); Rust identifiers stay ASCII.
//!
//! Pure data: no IO, no store logic, no HTTP types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Datalogger lifecycle status.
///
/// `Manutencao` is an out-of-band manual state: it is only ever set through
/// a direct update, never by the allocation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataloggerStatus {
    #[serde(rename = "Estoque")]
    Estoque,
    #[serde(rename = "Alocado")]
    Alocado,
    #[serde(rename = "Calibração")]
    Calibracao,
    #[serde(rename = "Manutenção")]
    Manutencao,
}

impl DataloggerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataloggerStatus::Estoque => "Estoque",
            DataloggerStatus::Alocado => "Alocado",
            DataloggerStatus::Calibracao => "Calibração",
            DataloggerStatus::Manutencao => "Manutenção",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Estoque" => Some(DataloggerStatus::Estoque),
            "Alocado" => Some(DataloggerStatus::Alocado),
            "Calibração" => Some(DataloggerStatus::Calibracao),
            "Manutenção" => Some(DataloggerStatus::Manutencao),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataloggerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Demand lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandaStatus {
    #[serde(rename = "Ativa")]
    Ativa,
    #[serde(rename = "Finalizada")]
    Finalizada,
    #[serde(rename = "Cancelada")]
    Cancelada,
}

impl DemandaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandaStatus::Ativa => "Ativa",
            DemandaStatus::Finalizada => "Finalizada",
            DemandaStatus::Cancelada => "Cancelada",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Ativa" => Some(DemandaStatus::Ativa),
            "Finalizada" => Some(DemandaStatus::Finalizada),
            "Cancelada" => Some(DemandaStatus::Cancelada),
            _ => None,
        }
    }
}

impl std::fmt::Display for DemandaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allocation status. `Retornado` is terminal: return registration happens
/// exactly once per allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlocacaoStatus {
    #[serde(rename = "Em campo")]
    EmCampo,
    #[serde(rename = "Retornado")]
    Retornado,
}

impl AlocacaoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlocacaoStatus::EmCampo => "Em campo",
            AlocacaoStatus::Retornado => "Retornado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Em campo" => Some(AlocacaoStatus::EmCampo),
            "Retornado" => Some(AlocacaoStatus::Retornado),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlocacaoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entities (read models)
// ---------------------------------------------------------------------------

/// A physical measurement unit tracked by serial number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datalogger {
    pub id: i32,
    pub numero_serie: String,
    pub modelo: String,
    pub status: DataloggerStatus,
    pub data_aquisicao: Option<NaiveDate>,
    pub ultima_calibracao: Option<NaiveDate>,
    pub proxima_calibracao: Option<NaiveDate>,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cliente {
    pub id: i32,
    pub nome: String,
    pub contato: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub endereco: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A client engagement requiring device deployment.
///
/// `cliente_nome` is filled by a joined read at the query layer; it is never
/// fetched lazily.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demanda {
    pub id: i32,
    pub cliente_id: i32,
    pub cliente_nome: Option<String>,
    pub descricao: String,
    pub data_inicio: NaiveDate,
    pub data_fim_prevista: NaiveDate,
    pub data_fim_real: Option<NaiveDate>,
    pub status: DemandaStatus,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The assignment of one datalogger to one demand for a field period.
///
/// The `datalogger_numero_serie` / `demanda_descricao` / `cliente_id` /
/// `cliente_nome` display fields come from the same joined read as the row
/// itself. `cliente_id` keeps client groupings correct when two clients
/// share a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alocacao {
    pub id: i32,
    pub datalogger_id: i32,
    pub datalogger_numero_serie: Option<String>,
    pub demanda_id: i32,
    pub demanda_descricao: Option<String>,
    pub cliente_id: Option<i32>,
    pub cliente_nome: Option<String>,
    pub data_saida: NaiveDate,
    pub data_retorno_prevista: NaiveDate,
    pub data_retorno_real: Option<NaiveDate>,
    pub status: AlocacaoStatus,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Create payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDatalogger {
    pub numero_serie: String,
    pub modelo: String,
    /// Defaults to `Estoque` when absent.
    pub status: Option<DataloggerStatus>,
    pub data_aquisicao: Option<NaiveDate>,
    pub ultima_calibracao: Option<NaiveDate>,
    pub proxima_calibracao: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCliente {
    pub nome: String,
    pub contato: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub endereco: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDemanda {
    pub cliente_id: i32,
    pub descricao: String,
    pub data_inicio: NaiveDate,
    pub data_fim_prevista: NaiveDate,
    pub data_fim_real: Option<NaiveDate>,
    /// Defaults to `Ativa` when absent.
    pub status: Option<DemandaStatus>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlocacao {
    pub datalogger_id: i32,
    pub demanda_id: i32,
    pub data_saida: NaiveDate,
    pub data_retorno_prevista: NaiveDate,
    pub observacoes: Option<String>,
}

// ---------------------------------------------------------------------------
// Update payloads (None = leave unchanged)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataloggerUpdate {
    pub numero_serie: Option<String>,
    pub modelo: Option<String>,
    /// Direct status writes cover the out-of-band `Manutenção` state.
    pub status: Option<DataloggerStatus>,
    pub data_aquisicao: Option<NaiveDate>,
    pub ultima_calibracao: Option<NaiveDate>,
    pub proxima_calibracao: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClienteUpdate {
    pub nome: Option<String>,
    pub contato: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub endereco: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemandaUpdate {
    pub cliente_id: Option<i32>,
    pub descricao: Option<String>,
    pub status: Option<DemandaStatus>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim_prevista: Option<NaiveDate>,
    pub data_fim_real: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlocacaoUpdate {
    pub data_saida: Option<NaiveDate>,
    pub data_retorno_prevista: Option<NaiveDate>,
    pub data_retorno_real: Option<NaiveDate>,
    pub observacoes: Option<String>,
}
