//! Request, response and query-string types for the dls-daemon endpoints.
//!
//! Entity payloads (`NewDatalogger`, `DataloggerUpdate`, ...) live in
//! `dls-schemas`; this module only holds the daemon-specific shapes. No
//! business logic lives here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dls_schemas::{AlocacaoStatus, DataloggerStatus, DemandaStatus};

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" when the store answers, "degraded" otherwise.
    pub status: &'static str,
    /// "connected" | "no schema" | "error"
    pub database: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// Delete confirmations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// POST /alocacoes/{id}/retorno
// ---------------------------------------------------------------------------

/// Body for the return registration. `data_retorno_real` defaults to today;
/// `enviar_calibracao` defaults to false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetornoRequest {
    pub data_retorno_real: Option<NaiveDate>,
    pub enviar_calibracao: Option<bool>,
    pub observacoes: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /demandas/{id}/finalizar
// ---------------------------------------------------------------------------

/// Body for finalization. `data_fim_real` defaults to today; the body itself
/// may be omitted entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinalizarRequest {
    pub data_fim_real: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DataloggerQuery {
    pub status: Option<DataloggerStatus>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DemandaQuery {
    pub status: Option<DemandaStatus>,
    pub cliente_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AlocacaoQuery {
    pub status: Option<AlocacaoStatus>,
    pub demanda_id: Option<i32>,
    pub datalogger_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PeriodoQuery {
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DiasQuery {
    /// Horizon in days; endpoints default to 30 when absent.
    pub dias: Option<i64>,
}
