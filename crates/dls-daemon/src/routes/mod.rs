//! Axum router for dls-daemon, one module per resource.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  Handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly over the in-memory store.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::api_types::HealthResponse;
use crate::state::AppState;

mod alocacoes;
mod clientes;
mod dashboard;
mod dataloggers;
mod demandas;

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/dataloggers",
            get(dataloggers::list).post(dataloggers::create),
        )
        .route("/dataloggers/disponiveis", get(dataloggers::disponiveis))
        .route(
            "/dataloggers/calibracao-vencida",
            get(dataloggers::calibracao_vencida),
        )
        .route(
            "/dataloggers/:id",
            get(dataloggers::fetch)
                .put(dataloggers::update)
                .delete(dataloggers::remove),
        )
        .route("/clientes", get(clientes::list).post(clientes::create))
        .route(
            "/clientes/:id",
            get(clientes::fetch)
                .put(clientes::update)
                .delete(clientes::remove),
        )
        .route("/clientes/:id/demandas", get(clientes::demandas))
        .route("/demandas", get(demandas::list).post(demandas::create))
        .route(
            "/demandas/:id",
            get(demandas::fetch)
                .put(demandas::update)
                .delete(demandas::remove),
        )
        .route("/demandas/:id/finalizar", post(demandas::finalizar))
        .route("/demandas/:id/alocacoes", get(demandas::alocacoes))
        .route("/alocacoes", get(alocacoes::list).post(alocacoes::create))
        .route("/alocacoes/em-campo", get(alocacoes::em_campo))
        .route(
            "/alocacoes/retornos-previstos",
            get(alocacoes::retornos_previstos),
        )
        .route(
            "/alocacoes/:id",
            get(alocacoes::fetch)
                .put(alocacoes::update)
                .delete(alocacoes::remove),
        )
        .route("/alocacoes/:id/retorno", post(alocacoes::retorno))
        .route("/dashboard/resumo", get(dashboard::resumo))
        .route("/dashboard/disponibilidade", get(dashboard::disponibilidade))
        .route(
            "/dashboard/ocupacao-por-cliente",
            get(dashboard::ocupacao_por_cliente),
        )
        .route("/dashboard/alertas", get(dashboard::alertas))
        .route(
            "/dashboard/historico-ocupacao",
            get(dashboard::historico_ocupacao),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, database) = match st.store.status().await {
        Ok(db) if db.ok && db.has_schema => ("ok", "connected"),
        Ok(db) if db.ok => ("degraded", "no schema"),
        _ => ("degraded", "error"),
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            database,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}
