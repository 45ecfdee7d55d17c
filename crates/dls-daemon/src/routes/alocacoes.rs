//! /alocacoes handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use dls_db::{AlocacaoFilter, PeriodoFilter, RegistroRetorno};
use dls_schemas::{Alocacao, AlocacaoStatus, AlocacaoUpdate, NewAlocacao};

use crate::api_types::{AlocacaoQuery, MessageResponse, PeriodoQuery, RetornoRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<AlocacaoQuery>,
) -> ApiResult<Json<Vec<Alocacao>>> {
    let filtro = AlocacaoFilter {
        status: q.status,
        demanda_id: q.demanda_id,
        datalogger_id: q.datalogger_id,
    };
    Ok(Json(st.store.list_alocacoes(filtro).await?))
}

pub(crate) async fn create(
    State(st): State<Arc<AppState>>,
    Json(nova): Json<NewAlocacao>,
) -> ApiResult<(StatusCode, Json<Alocacao>)> {
    let aloc = st.store.create_alocacao(nova).await?;
    info!(
        id = aloc.id,
        datalogger_id = aloc.datalogger_id,
        demanda_id = aloc.demanda_id,
        "alocação criada"
    );
    Ok((StatusCode::CREATED, Json(aloc)))
}

pub(crate) async fn fetch(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Alocacao>> {
    Ok(Json(st.store.get_alocacao(id).await?))
}

pub(crate) async fn update(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(upd): Json<AlocacaoUpdate>,
) -> ApiResult<Json<Alocacao>> {
    Ok(Json(st.store.update_alocacao(id, upd).await?))
}

pub(crate) async fn remove(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    st.store.delete_alocacao(id).await?;
    info!(id, "alocação excluída");
    Ok(Json(MessageResponse {
        message: "Alocação excluída com sucesso".into(),
    }))
}

/// POST /alocacoes/{id}/retorno — body optional; `data_retorno_real`
/// defaults to today and `enviar_calibracao` to false.
pub(crate) async fn retorno(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
    body: Option<Json<RetornoRequest>>,
) -> ApiResult<Json<Alocacao>> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let registro = RegistroRetorno {
        data_retorno_real: req
            .data_retorno_real
            .unwrap_or_else(|| Utc::now().date_naive()),
        enviar_calibracao: req.enviar_calibracao.unwrap_or(false),
        observacoes: req.observacoes,
    };

    let aloc = st.store.registrar_retorno(id, registro).await?;
    info!(
        id,
        datalogger_id = aloc.datalogger_id,
        enviar_calibracao = req.enviar_calibracao.unwrap_or(false),
        "retorno registrado"
    );
    Ok(Json(aloc))
}

pub(crate) async fn em_campo(State(st): State<Arc<AppState>>) -> ApiResult<Json<Vec<Alocacao>>> {
    let filtro = AlocacaoFilter {
        status: Some(AlocacaoStatus::EmCampo),
        ..Default::default()
    };
    Ok(Json(st.store.list_alocacoes(filtro).await?))
}

pub(crate) async fn retornos_previstos(
    State(st): State<Arc<AppState>>,
    Query(q): Query<PeriodoQuery>,
) -> ApiResult<Json<Vec<Alocacao>>> {
    let periodo = PeriodoFilter {
        data_inicio: q.data_inicio,
        data_fim: q.data_fim,
    };
    Ok(Json(st.store.retornos_previstos(periodo).await?))
}
