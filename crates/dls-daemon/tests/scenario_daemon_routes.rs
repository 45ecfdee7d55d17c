//! In-process scenario tests for the dls-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test builds the router over the in-memory store and drives it via
//! `tower::ServiceExt::oneshot`; no network or Postgres required.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // oneshot

use dls_daemon::{routes, state};
use dls_db::MemStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fresh shared state backed by an empty in-memory store.
fn make_state() -> Arc<state::AppState> {
    Arc::new(state::AppState::new(Arc::new(MemStore::new())))
}

/// Drive one request through a fresh router over `st`; return (status, json).
async fn call(st: &Arc<state::AppState>, req: Request<axum::body::Body>) -> (StatusCode, Value) {
    let resp = routes::build_router(Arc::clone(st))
        .oneshot(req)
        .await
        .expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("body is not valid JSON")
    };
    (status, json)
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn put_json(uri: &str, body: Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

/// Seed one cliente, one ativa demanda and one datalogger in stock over
/// HTTP. Returns (datalogger_id, demanda_id, cliente_id).
async fn seed(st: &Arc<state::AppState>) -> (i64, i64, i64) {
    let (status, cliente) = call(
        st,
        post_json("/clientes", json!({ "nome": "Acme Alimentos" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, demanda) = call(
        st,
        post_json(
            "/demandas",
            json!({
                "cliente_id": cliente["id"],
                "descricao": "Validação de câmara fria",
                "data_inicio": "2024-01-10",
                "data_fim_prevista": "2024-03-01"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, dl) = call(
        st,
        post_json(
            "/dataloggers",
            json!({ "numero_serie": "DL-001", "modelo": "HOBO MX2301" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        dl["id"].as_i64().unwrap(),
        demanda["id"].as_i64().unwrap(),
        cliente["id"].as_i64().unwrap(),
    )
}

async fn allocate(st: &Arc<state::AppState>, dl_id: i64, dem_id: i64) -> Value {
    let (status, aloc) = call(
        st,
        post_json(
            "/alocacoes",
            json!({
                "datalogger_id": dl_id,
                "demanda_id": dem_id,
                "data_saida": "2024-01-15",
                "data_retorno_prevista": "2024-02-15"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "allocation failed: {aloc}");
    aloc
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_connected_store() {
    let st = make_state();
    let (status, json) = call(&st, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
    assert_eq!(json["service"], "dls-daemon");
}

// ---------------------------------------------------------------------------
// Allocation lifecycle over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn allocation_lifecycle_flips_datalogger_status() {
    let st = make_state();
    let (dl_id, dem_id, _) = seed(&st).await;

    let aloc = allocate(&st, dl_id, dem_id).await;
    assert_eq!(aloc["status"], "Em campo");
    assert_eq!(aloc["datalogger_numero_serie"], "DL-001");
    assert_eq!(aloc["cliente_nome"], "Acme Alimentos");

    let (_, dl) = call(&st, get(&format!("/dataloggers/{dl_id}"))).await;
    assert_eq!(dl["status"], "Alocado");

    // Return to calibration.
    let (status, devolvida) = call(
        &st,
        post_json(
            &format!("/alocacoes/{}/retorno", aloc["id"]),
            json!({ "data_retorno_real": "2024-02-10", "enviar_calibracao": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(devolvida["status"], "Retornado");
    assert_eq!(devolvida["data_retorno_real"], "2024-02-10");

    let (_, dl) = call(&st, get(&format!("/dataloggers/{dl_id}"))).await;
    assert_eq!(dl["status"], "Calibração");
}

#[tokio::test]
async fn second_return_is_rejected_with_400() {
    let st = make_state();
    let (dl_id, dem_id, _) = seed(&st).await;
    let aloc = allocate(&st, dl_id, dem_id).await;
    let uri = format!("/alocacoes/{}/retorno", aloc["id"]);

    // Empty body: defaults apply.
    let (status, _) = call(&st, post_empty(&uri)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = call(&st, post_empty(&uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Alocação já foi finalizada");
}

#[tokio::test]
async fn allocating_a_non_estoque_datalogger_returns_400() {
    let st = make_state();
    let (dl_id, dem_id, _) = seed(&st).await;
    allocate(&st, dl_id, dem_id).await;

    let (status, json) = call(
        &st,
        post_json(
            "/alocacoes",
            json!({
                "datalogger_id": dl_id,
                "demanda_id": dem_id,
                "data_saida": "2024-01-16",
                "data_retorno_prevista": "2024-02-16"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Datalogger não está disponível para alocação");
}

#[tokio::test]
async fn missing_resources_return_404_with_error_body() {
    let st = make_state();

    let (status, json) = call(&st, get("/dataloggers/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Datalogger não encontrado");

    let (status, json) = call(&st, get("/clientes/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Cliente não encontrado");

    let (status, json) = call(&st, post_empty("/demandas/999/finalizar")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Demanda não encontrada");
}

// ---------------------------------------------------------------------------
// POST /demandas/{id}/finalizar
// ---------------------------------------------------------------------------

#[tokio::test]
async fn finalizing_a_demanda_returns_all_its_devices() {
    let st = make_state();
    let (dl_id, dem_id, _) = seed(&st).await;
    let (_, dl2) = call(
        &st,
        post_json(
            "/dataloggers",
            json!({ "numero_serie": "DL-002", "modelo": "HOBO MX2301" }),
        ),
    )
    .await;
    let dl2_id = dl2["id"].as_i64().unwrap();

    allocate(&st, dl_id, dem_id).await;
    allocate(&st, dl2_id, dem_id).await;

    let (status, demanda) = call(
        &st,
        post_json(
            &format!("/demandas/{dem_id}/finalizar"),
            json!({ "data_fim_real": "2024-03-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(demanda["status"], "Finalizada");
    assert_eq!(demanda["data_fim_real"], "2024-03-01");

    let (_, alocacoes) = call(&st, get(&format!("/demandas/{dem_id}/alocacoes"))).await;
    let alocacoes = alocacoes.as_array().unwrap();
    assert_eq!(alocacoes.len(), 2);
    for a in alocacoes {
        assert_eq!(a["status"], "Retornado");
        assert_eq!(a["data_retorno_real"], "2024-03-01");
    }

    for id in [dl_id, dl2_id] {
        let (_, dl) = call(&st, get(&format!("/dataloggers/{id}"))).await;
        assert_eq!(dl["status"], "Estoque");
    }
}

// ---------------------------------------------------------------------------
// Deletion guards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_guards_surface_as_400_conflicts() {
    let st = make_state();
    let (dl_id, dem_id, cliente_id) = seed(&st).await;
    allocate(&st, dl_id, dem_id).await;

    let (status, json) = call(&st, delete(&format!("/dataloggers/{dl_id}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Não é possível excluir datalogger com alocações ativas"
    );

    let (status, _) = call(&st, delete(&format!("/demandas/{dem_id}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = call(&st, delete(&format!("/clientes/{cliente_id}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Não é possível excluir cliente com demandas ativas"
    );
}

#[tokio::test]
async fn deleting_an_in_field_allocation_restocks_and_confirms() {
    let st = make_state();
    let (dl_id, dem_id, _) = seed(&st).await;
    let aloc = allocate(&st, dl_id, dem_id).await;

    let (status, json) = call(&st, delete(&format!("/alocacoes/{}", aloc["id"]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Alocação excluída com sucesso");

    let (_, dl) = call(&st, get(&format!("/dataloggers/{dl_id}"))).await;
    assert_eq!(dl["status"], "Estoque");
}

// ---------------------------------------------------------------------------
// Uniqueness and updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_serial_number_returns_400() {
    let st = make_state();
    seed(&st).await;

    let (status, json) = call(
        &st,
        post_json(
            "/dataloggers",
            json!({ "numero_serie": "DL-001", "modelo": "Testo 174H" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Número de série já existe");
}

#[tokio::test]
async fn put_updates_only_the_provided_fields() {
    let st = make_state();
    let (dl_id, _, _) = seed(&st).await;

    let (status, dl) = call(
        &st,
        put_json(
            &format!("/dataloggers/{dl_id}"),
            json!({ "proxima_calibracao": "2024-12-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dl["proxima_calibracao"], "2024-12-01");
    assert_eq!(dl["numero_serie"], "DL-001");
    assert_eq!(dl["modelo"], "HOBO MX2301");
}

// ---------------------------------------------------------------------------
// Listings and filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_filter_and_convenience_listings_agree() {
    let st = make_state();
    let (dl_id, dem_id, _) = seed(&st).await;
    let (_, _) = call(
        &st,
        post_json(
            "/dataloggers",
            json!({ "numero_serie": "DL-002", "modelo": "HOBO MX2301" }),
        ),
    )
    .await;
    allocate(&st, dl_id, dem_id).await;

    let (_, em_estoque) = call(&st, get("/dataloggers?status=Estoque")).await;
    assert_eq!(em_estoque.as_array().unwrap().len(), 1);
    assert_eq!(em_estoque[0]["numero_serie"], "DL-002");

    let (_, disponiveis) = call(&st, get("/dataloggers/disponiveis")).await;
    assert_eq!(disponiveis, em_estoque);

    let (_, em_campo) = call(&st, get("/alocacoes/em-campo")).await;
    assert_eq!(em_campo.as_array().unwrap().len(), 1);
    assert_eq!(em_campo[0]["datalogger_id"].as_i64(), Some(dl_id));
}

#[tokio::test]
async fn retornos_previstos_honors_the_date_window() {
    let st = make_state();
    let (dl_id, dem_id, _) = seed(&st).await;
    allocate(&st, dl_id, dem_id).await; // prevista 2024-02-15

    let (status, dentro) = call(
        &st,
        get("/alocacoes/retornos-previstos?data_inicio=2024-02-01&data_fim=2024-02-28"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dentro.as_array().unwrap().len(), 1);

    let (_, fora) = call(
        &st,
        get("/alocacoes/retornos-previstos?data_inicio=2024-03-01"),
    )
    .await;
    assert!(fora.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cliente_demandas_listing_requires_the_cliente() {
    let st = make_state();
    let (_, dem_id, cliente_id) = seed(&st).await;

    let (status, demandas) = call(&st, get(&format!("/clientes/{cliente_id}/demandas"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(demandas.as_array().unwrap().len(), 1);
    assert_eq!(demandas[0]["id"].as_i64(), Some(dem_id));

    let (status, _) = call(&st, get("/clientes/999/demandas")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Unknown routes return 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let st = make_state();
    let (status, _) = call(&st, get("/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
