//! /demandas handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use dls_db::{AlocacaoFilter, DemandaFilter};
use dls_schemas::{Alocacao, Demanda, DemandaUpdate, NewDemanda};

use crate::api_types::{DemandaQuery, FinalizarRequest, MessageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DemandaQuery>,
) -> ApiResult<Json<Vec<Demanda>>> {
    let filtro = DemandaFilter {
        status: q.status,
        cliente_id: q.cliente_id,
    };
    Ok(Json(st.store.list_demandas(filtro).await?))
}

pub(crate) async fn create(
    State(st): State<Arc<AppState>>,
    Json(nova): Json<NewDemanda>,
) -> ApiResult<(StatusCode, Json<Demanda>)> {
    let demanda = st.store.create_demanda(nova).await?;
    info!(id = demanda.id, cliente_id = demanda.cliente_id, "demanda criada");
    Ok((StatusCode::CREATED, Json(demanda)))
}

pub(crate) async fn fetch(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Demanda>> {
    Ok(Json(st.store.get_demanda(id).await?))
}

pub(crate) async fn update(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(upd): Json<DemandaUpdate>,
) -> ApiResult<Json<Demanda>> {
    Ok(Json(st.store.update_demanda(id, upd).await?))
}

pub(crate) async fn remove(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    st.store.delete_demanda(id).await?;
    info!(id, "demanda excluída");
    Ok(Json(MessageResponse {
        message: "Demanda excluída com sucesso".into(),
    }))
}

/// POST /demandas/{id}/finalizar — body optional; `data_fim_real` defaults
/// to today.
pub(crate) async fn finalizar(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
    body: Option<Json<FinalizarRequest>>,
) -> ApiResult<Json<Demanda>> {
    let data_fim_real = body
        .and_then(|Json(req)| req.data_fim_real)
        .unwrap_or_else(|| Utc::now().date_naive());

    let demanda = st.store.finalizar_demanda(id, data_fim_real).await?;
    info!(id, %data_fim_real, "demanda finalizada");
    Ok(Json(demanda))
}

/// GET /demandas/{id}/alocacoes — 404 when the demanda itself is missing.
pub(crate) async fn alocacoes(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<Alocacao>>> {
    st.store.get_demanda(id).await?;
    let filtro = AlocacaoFilter {
        demanda_id: Some(id),
        ..Default::default()
    };
    Ok(Json(st.store.list_alocacoes(filtro).await?))
}
