//! In-process scenario tests for the /dashboard endpoints.
//!
//! The dashboard handlers resolve "today" from the wall clock, so these
//! tests only pin down facts that hold for any today: status counts, group
//! membership, window sizes and far-past calibration dates.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // oneshot

use dls_daemon::{routes, state};
use dls_db::MemStore;

fn make_state() -> Arc<state::AppState> {
    Arc::new(state::AppState::new(Arc::new(MemStore::new())))
}

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
    (status, serde_json::from_slice(&body).expect("body is not valid JSON"))
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
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

/// Two dataloggers (one overdue for calibration), one cliente, one demanda,
/// one in-field allocation on DL-001.
async fn seed(st: &Arc<state::AppState>) {
    let (_, cliente) = call(
        st,
        post_json("/clientes", json!({ "nome": "Acme Alimentos" })),
    )
    .await;
    let (_, demanda) = call(
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
    let (_, dl1) = call(
        st,
        post_json(
            "/dataloggers",
            json!({
                "numero_serie": "DL-001",
                "modelo": "HOBO MX2301",
                "proxima_calibracao": "2000-01-01"
            }),
        ),
    )
    .await;
    let (_, _dl2) = call(
        st,
        post_json(
            "/dataloggers",
            json!({ "numero_serie": "DL-002", "modelo": "HOBO MX2301" }),
        ),
    )
    .await;
    let (status, aloc) = call(
        st,
        post_json(
            "/alocacoes",
            json!({
                "datalogger_id": dl1["id"],
                "demanda_id": demanda["id"],
                "data_saida": "2024-01-15",
                "data_retorno_prevista": "2024-02-15"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed allocation failed: {aloc}");
}

#[tokio::test]
async fn resumo_reports_counts_and_occupancy() {
    let st = make_state();
    seed(&st).await;

    let (status, resumo) = call(&st, get("/dashboard/resumo")).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(resumo["total_dataloggers"], 2);
    assert_eq!(resumo["alocados"], 1);
    assert_eq!(resumo["em_estoque"], 1);
    assert_eq!(resumo["demandas_ativas"], 1);
    assert_eq!(resumo["alocacoes_em_campo"], 1);
    assert_eq!(resumo["calibracoes_vencidas"], 1);
    assert_eq!(resumo["taxa_ocupacao"], 50.0);
}

#[tokio::test]
async fn ocupacao_por_cliente_groups_in_field_allocations() {
    let st = make_state();
    seed(&st).await;

    let (status, ocupacao) = call(&st, get("/dashboard/ocupacao-por-cliente")).await;
    assert_eq!(status, StatusCode::OK);

    let ocupacao = ocupacao.as_array().unwrap();
    assert_eq!(ocupacao.len(), 1);
    assert_eq!(ocupacao[0]["cliente"], "Acme Alimentos");
    assert_eq!(ocupacao[0]["quantidade"], 1);
}

#[tokio::test]
async fn alertas_flag_the_overdue_calibration_first() {
    let st = make_state();
    seed(&st).await;

    let (status, alertas) = call(&st, get("/dashboard/alertas")).await;
    assert_eq!(status, StatusCode::OK);

    let alertas = alertas.as_array().unwrap();
    // DL-001: calibration overdue since 2000, and its allocation is long
    // past the 2024-02-15 expected return. Both are alta.
    assert!(alertas.len() >= 2, "expected at least 2 alerts: {alertas:?}");
    assert!(alertas
        .iter()
        .any(|a| a["tipo"] == "calibracao_vencida" && a["prioridade"] == "alta"));
    assert!(alertas
        .iter()
        .any(|a| a["tipo"] == "retorno_atrasado" && a["dias_atraso"].is_i64()));
}

#[tokio::test]
async fn disponibilidade_projects_the_requested_horizon() {
    let st = make_state();
    seed(&st).await;

    let (status, proj) = call(&st, get("/dashboard/disponibilidade?dias=2")).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(proj["total_dataloggers"], 2);
    assert_eq!(proj["disponibilidade_atual"], 1);
    let dias = proj["projecao"].as_array().unwrap();
    assert_eq!(dias.len(), 3);
    // The only in-field allocation's expected return is in the past, so no
    // projected day gains a return.
    for dia in dias {
        assert_eq!(dia["disponibilidade"], 1);
        assert_eq!(dia["retornos"], 0);
    }
}

#[tokio::test]
async fn historico_ocupacao_spans_dias_plus_one_days() {
    let st = make_state();
    seed(&st).await;

    let (status, hist) = call(&st, get("/dashboard/historico-ocupacao?dias=7")).await;
    assert_eq!(status, StatusCode::OK);

    let hist = hist.as_array().unwrap();
    assert_eq!(hist.len(), 8);
    // One allocation out since 2024-01-15 and never returned: every day in
    // the window counts it.
    for dia in hist {
        assert_eq!(dia["alocados"], 1);
        assert_eq!(dia["disponivel"], 1);
        assert_eq!(dia["taxa_ocupacao"], 50.0);
    }
}
