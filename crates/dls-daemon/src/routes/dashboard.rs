//! /dashboard handlers.
//!
//! Each handler fetches the rows it needs, resolves today once, and hands
//! everything to the pure aggregation functions in `dls-dashboard`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use dls_dashboard::{Alerta, Disponibilidade, HistoricoDia, OcupacaoCliente, Resumo};
use dls_db::{AlocacaoFilter, DemandaFilter};

use crate::api_types::DiasQuery;
use crate::error::ApiResult;
use crate::state::AppState;

const DIAS_PADRAO: i64 = 30;

pub(crate) async fn resumo(State(st): State<Arc<AppState>>) -> ApiResult<Json<Resumo>> {
    let dataloggers = st.store.list_dataloggers(None).await?;
    let demandas = st.store.list_demandas(DemandaFilter::default()).await?;
    let alocacoes = st.store.list_alocacoes(AlocacaoFilter::default()).await?;
    let hoje = Utc::now().date_naive();

    Ok(Json(dls_dashboard::resumo(
        &dataloggers,
        &demandas,
        &alocacoes,
        hoje,
    )))
}

pub(crate) async fn disponibilidade(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DiasQuery>,
) -> ApiResult<Json<Disponibilidade>> {
    let dataloggers = st.store.list_dataloggers(None).await?;
    let alocacoes = st.store.list_alocacoes(AlocacaoFilter::default()).await?;
    let hoje = Utc::now().date_naive();
    let dias = q.dias.unwrap_or(DIAS_PADRAO);

    Ok(Json(dls_dashboard::disponibilidade(
        &dataloggers,
        &alocacoes,
        hoje,
        dias,
    )))
}

pub(crate) async fn ocupacao_por_cliente(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<OcupacaoCliente>>> {
    let alocacoes = st.store.list_alocacoes(AlocacaoFilter::default()).await?;
    Ok(Json(dls_dashboard::ocupacao_por_cliente(&alocacoes)))
}

pub(crate) async fn alertas(State(st): State<Arc<AppState>>) -> ApiResult<Json<Vec<Alerta>>> {
    let dataloggers = st.store.list_dataloggers(None).await?;
    let alocacoes = st.store.list_alocacoes(AlocacaoFilter::default()).await?;
    let hoje = Utc::now().date_naive();

    Ok(Json(dls_dashboard::alertas(&dataloggers, &alocacoes, hoje)))
}

pub(crate) async fn historico_ocupacao(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DiasQuery>,
) -> ApiResult<Json<Vec<HistoricoDia>>> {
    let dataloggers = st.store.list_dataloggers(None).await?;
    let alocacoes = st.store.list_alocacoes(AlocacaoFilter::default()).await?;
    let hoje = Utc::now().date_naive();
    let dias = q.dias.unwrap_or(DIAS_PADRAO);

    Ok(Json(dls_dashboard::historico_ocupacao(
        dataloggers.len(),
        &alocacoes,
        hoje,
        dias,
    )))
}
