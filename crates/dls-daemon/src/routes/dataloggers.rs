//! /dataloggers handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use dls_schemas::{Datalogger, DataloggerStatus, DataloggerUpdate, NewDatalogger};

use crate::api_types::{DataloggerQuery, MessageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<DataloggerQuery>,
) -> ApiResult<Json<Vec<Datalogger>>> {
    Ok(Json(st.store.list_dataloggers(q.status).await?))
}

pub(crate) async fn create(
    State(st): State<Arc<AppState>>,
    Json(novo): Json<NewDatalogger>,
) -> ApiResult<(StatusCode, Json<Datalogger>)> {
    let dl = st.store.create_datalogger(novo).await?;
    info!(id = dl.id, numero_serie = %dl.numero_serie, "datalogger criado");
    Ok((StatusCode::CREATED, Json(dl)))
}

pub(crate) async fn fetch(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Datalogger>> {
    Ok(Json(st.store.get_datalogger(id).await?))
}

pub(crate) async fn update(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(upd): Json<DataloggerUpdate>,
) -> ApiResult<Json<Datalogger>> {
    Ok(Json(st.store.update_datalogger(id, upd).await?))
}

pub(crate) async fn remove(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    st.store.delete_datalogger(id).await?;
    info!(id, "datalogger excluído");
    Ok(Json(MessageResponse {
        message: "Datalogger excluído com sucesso".into(),
    }))
}

pub(crate) async fn disponiveis(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Datalogger>>> {
    Ok(Json(
        st.store
            .list_dataloggers(Some(DataloggerStatus::Estoque))
            .await?,
    ))
}

pub(crate) async fn calibracao_vencida(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Datalogger>>> {
    let hoje = Utc::now().date_naive();
    Ok(Json(st.store.dataloggers_calibracao_vencida(hoje).await?))
}
