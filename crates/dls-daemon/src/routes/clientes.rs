//! /clientes handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use dls_db::DemandaFilter;
use dls_schemas::{Cliente, ClienteUpdate, Demanda, NewCliente};

use crate::api_types::MessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn list(State(st): State<Arc<AppState>>) -> ApiResult<Json<Vec<Cliente>>> {
    Ok(Json(st.store.list_clientes().await?))
}

pub(crate) async fn create(
    State(st): State<Arc<AppState>>,
    Json(novo): Json<NewCliente>,
) -> ApiResult<(StatusCode, Json<Cliente>)> {
    let cliente = st.store.create_cliente(novo).await?;
    info!(id = cliente.id, nome = %cliente.nome, "cliente criado");
    Ok((StatusCode::CREATED, Json(cliente)))
}

pub(crate) async fn fetch(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Cliente>> {
    Ok(Json(st.store.get_cliente(id).await?))
}

pub(crate) async fn update(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(upd): Json<ClienteUpdate>,
) -> ApiResult<Json<Cliente>> {
    Ok(Json(st.store.update_cliente(id, upd).await?))
}

pub(crate) async fn remove(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    st.store.delete_cliente(id).await?;
    info!(id, "cliente excluído");
    Ok(Json(MessageResponse {
        message: "Cliente excluído com sucesso".into(),
    }))
}

/// GET /clientes/{id}/demandas — 404 when the cliente itself is missing.
pub(crate) async fn demandas(
    State(st): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<Demanda>>> {
    st.store.get_cliente(id).await?;
    let filtro = DemandaFilter {
        cliente_id: Some(id),
        ..Default::default()
    };
    Ok(Json(st.store.list_demandas(filtro).await?))
}
