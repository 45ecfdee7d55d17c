//! Store boundary for the inventory tracker.
//!
//! This module defines only the trait and its parameter types. Concrete
//! backends live in `pg` (PostgreSQL) and `mem` (in-memory, for scenario
//! tests and local development).
//!
//! Every mutating operation is one atomic unit of work: either all of its
//! effects persist or none do. Implementations must re-check entity status
//! inside the transaction so concurrent requests cannot double-allocate a
//! datalogger.

use async_trait::async_trait;
use chrono::NaiveDate;

use dls_schemas::{
    Alocacao, AlocacaoStatus, AlocacaoUpdate, Cliente, ClienteUpdate, Datalogger,
    DataloggerStatus, DataloggerUpdate, Demanda, DemandaStatus, DemandaUpdate, NewAlocacao,
    NewCliente, NewDatalogger, NewDemanda,
};

use crate::error::Result;
use crate::DbStatus;

// ---------------------------------------------------------------------------
// Query filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct DemandaFilter {
    pub status: Option<DemandaStatus>,
    pub cliente_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlocacaoFilter {
    pub status: Option<AlocacaoStatus>,
    pub demanda_id: Option<i32>,
    pub datalogger_id: Option<i32>,
}

/// Inclusive date window over `data_retorno_prevista`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodoFilter {
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

/// Resolved return registration: callers fill in "today" before calling.
#[derive(Debug, Clone)]
pub struct RegistroRetorno {
    pub data_retorno_real: NaiveDate,
    pub enviar_calibracao: bool,
    pub observacoes: Option<String>,
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Persistence contract. Object-safe so handlers and tests hold an
/// `Arc<dyn Store>` without knowing the backend.
#[async_trait]
pub trait Store: Send + Sync {
    // -- dataloggers --------------------------------------------------------

    async fn list_dataloggers(&self, status: Option<DataloggerStatus>) -> Result<Vec<Datalogger>>;
    async fn create_datalogger(&self, new: NewDatalogger) -> Result<Datalogger>;
    async fn get_datalogger(&self, id: i32) -> Result<Datalogger>;
    async fn update_datalogger(&self, id: i32, upd: DataloggerUpdate) -> Result<Datalogger>;
    /// Fails with `Conflict` while the datalogger has an in-field allocation.
    async fn delete_datalogger(&self, id: i32) -> Result<()>;
    /// Dataloggers whose `proxima_calibracao` is on or before `hoje`.
    async fn dataloggers_calibracao_vencida(&self, hoje: NaiveDate) -> Result<Vec<Datalogger>>;

    // -- clientes -----------------------------------------------------------

    async fn list_clientes(&self) -> Result<Vec<Cliente>>;
    async fn create_cliente(&self, new: NewCliente) -> Result<Cliente>;
    async fn get_cliente(&self, id: i32) -> Result<Cliente>;
    async fn update_cliente(&self, id: i32, upd: ClienteUpdate) -> Result<Cliente>;
    /// Fails with `Conflict` while the cliente has an `Ativa` demanda.
    async fn delete_cliente(&self, id: i32) -> Result<()>;

    // -- demandas -----------------------------------------------------------

    async fn list_demandas(&self, filtro: DemandaFilter) -> Result<Vec<Demanda>>;
    async fn create_demanda(&self, new: NewDemanda) -> Result<Demanda>;
    async fn get_demanda(&self, id: i32) -> Result<Demanda>;
    async fn update_demanda(&self, id: i32, upd: DemandaUpdate) -> Result<Demanda>;
    /// Fails with `Conflict` while the demanda has an in-field allocation.
    async fn delete_demanda(&self, id: i32) -> Result<()>;
    /// Demanda -> `Finalizada`; every in-field allocation under it is
    /// returned with `data_retorno_real = data_fim_real` and its datalogger
    /// goes back to `Estoque`. One atomic batch.
    async fn finalizar_demanda(&self, id: i32, data_fim_real: NaiveDate) -> Result<Demanda>;

    // -- alocacoes ----------------------------------------------------------

    async fn list_alocacoes(&self, filtro: AlocacaoFilter) -> Result<Vec<Alocacao>>;
    /// Requires datalogger in `Estoque` and demanda `Ativa`; creates the
    /// `Em campo` allocation and flips the datalogger to `Alocado`
    /// atomically.
    async fn create_alocacao(&self, new: NewAlocacao) -> Result<Alocacao>;
    async fn get_alocacao(&self, id: i32) -> Result<Alocacao>;
    async fn update_alocacao(&self, id: i32, upd: AlocacaoUpdate) -> Result<Alocacao>;
    /// Deleting an in-field allocation returns its datalogger to `Estoque`
    /// in the same transaction.
    async fn delete_alocacao(&self, id: i32) -> Result<()>;
    /// Exactly-once: a second call on the same allocation fails with
    /// `Conflict` and leaves the first call's state intact.
    async fn registrar_retorno(&self, id: i32, registro: RegistroRetorno) -> Result<Alocacao>;
    /// In-field allocations ordered by `data_retorno_prevista`, optionally
    /// windowed.
    async fn retornos_previstos(&self, periodo: PeriodoFilter) -> Result<Vec<Alocacao>>;

    // -- health -------------------------------------------------------------

    async fn status(&self) -> Result<DbStatus>;
}
