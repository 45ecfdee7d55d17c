//! Summary counts, occupancy rate and per-client occupancy scenarios.

use chrono::{NaiveDate, Utc};

use dls_dashboard::{ocupacao_por_cliente, resumo};
use dls_schemas::{
    Alocacao, AlocacaoStatus, Datalogger, DataloggerStatus, Demanda, DemandaStatus,
};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date literal")
}

fn datalogger(id: i32, status: DataloggerStatus, proxima_calibracao: Option<&str>) -> Datalogger {
    let ts = Utc::now();
    Datalogger {
        id,
        numero_serie: format!("DL-{id:03}"),
        modelo: "HOBO MX2301".into(),
        status,
        data_aquisicao: None,
        ultima_calibracao: None,
        proxima_calibracao: proxima_calibracao.map(d),
        observacoes: None,
        created_at: ts,
        updated_at: ts,
    }
}

fn demanda(id: i32, status: DemandaStatus) -> Demanda {
    let ts = Utc::now();
    Demanda {
        id,
        cliente_id: 1,
        cliente_nome: Some("Acme".into()),
        descricao: "Validação de transporte".into(),
        data_inicio: d("2024-01-01"),
        data_fim_prevista: d("2024-06-01"),
        data_fim_real: None,
        status,
        observacoes: None,
        created_at: ts,
        updated_at: ts,
    }
}

fn alocacao(
    id: i32,
    status: AlocacaoStatus,
    prevista: &str,
    cliente: Option<(i32, &str)>,
) -> Alocacao {
    let ts = Utc::now();
    Alocacao {
        id,
        datalogger_id: id,
        datalogger_numero_serie: Some(format!("DL-{id:03}")),
        demanda_id: 1,
        demanda_descricao: None,
        cliente_id: cliente.map(|(cid, _)| cid),
        cliente_nome: cliente.map(|(_, nome)| nome.to_owned()),
        data_saida: d("2024-01-01"),
        data_retorno_prevista: d(prevista),
        data_retorno_real: None,
        status,
        observacoes: None,
        created_at: ts,
        updated_at: ts,
    }
}

#[test]
fn empty_inventory_has_zero_occupancy() {
    let r = resumo(&[], &[], &[], d("2024-03-10"));
    assert_eq!(r.total_dataloggers, 0);
    assert_eq!(r.taxa_ocupacao, 0.0);
}

#[test]
fn occupancy_rate_rounds_to_two_decimals() {
    let dls = vec![
        datalogger(1, DataloggerStatus::Alocado, None),
        datalogger(2, DataloggerStatus::Estoque, None),
        datalogger(3, DataloggerStatus::Calibracao, None),
    ];
    let r = resumo(&dls, &[], &[], d("2024-03-10"));
    assert_eq!(r.alocados, 1);
    assert_eq!(r.em_estoque, 1);
    assert_eq!(r.em_calibracao, 1);
    assert_eq!(r.em_manutencao, 0);
    assert_eq!(r.taxa_ocupacao, 33.33);
}

#[test]
fn counts_cover_demands_allocations_and_calibration() {
    let hoje = d("2024-03-10");
    let dls = vec![
        datalogger(1, DataloggerStatus::Alocado, Some("2024-03-01")), // vencida
        datalogger(2, DataloggerStatus::Alocado, Some("2024-03-10")), // vencida (today)
        datalogger(3, DataloggerStatus::Estoque, Some("2024-04-01")), // futura
        datalogger(4, DataloggerStatus::Manutencao, None),
    ];
    let dms = vec![
        demanda(1, DemandaStatus::Ativa),
        demanda(2, DemandaStatus::Finalizada),
        demanda(3, DemandaStatus::Cancelada),
    ];
    let alocs = vec![
        alocacao(1, AlocacaoStatus::EmCampo, "2024-03-12", None), // within 7d
        alocacao(2, AlocacaoStatus::EmCampo, "2024-03-17", None), // exactly +7
        alocacao(3, AlocacaoStatus::EmCampo, "2024-03-18", None), // outside
        alocacao(4, AlocacaoStatus::EmCampo, "2024-03-09", None), // overdue, not "proximo"
        alocacao(5, AlocacaoStatus::Retornado, "2024-03-12", None),
    ];

    let r = resumo(&dls, &dms, &alocs, hoje);
    assert_eq!(r.demandas_ativas, 1);
    assert_eq!(r.alocacoes_em_campo, 4);
    assert_eq!(r.calibracoes_vencidas, 2);
    assert_eq!(r.retornos_proximos, 2);
    assert_eq!(r.taxa_ocupacao, 50.0);
}

#[test]
fn per_client_occupancy_counts_only_in_field() {
    let alocs = vec![
        alocacao(1, AlocacaoStatus::EmCampo, "2024-03-12", Some((1, "Acme"))),
        alocacao(2, AlocacaoStatus::EmCampo, "2024-03-13", Some((1, "Acme"))),
        alocacao(3, AlocacaoStatus::EmCampo, "2024-03-14", Some((2, "Borealis"))),
        alocacao(4, AlocacaoStatus::Retornado, "2024-03-15", Some((2, "Borealis"))),
    ];

    let ocupacao = ocupacao_por_cliente(&alocs);
    assert_eq!(ocupacao.len(), 2);
    assert_eq!(ocupacao[0].cliente, "Acme");
    assert_eq!(ocupacao[0].quantidade, 2);
    assert_eq!(ocupacao[1].cliente, "Borealis");
    assert_eq!(ocupacao[1].quantidade, 1);
}

#[test]
fn distinct_clients_sharing_a_name_do_not_merge() {
    let alocs = vec![
        alocacao(1, AlocacaoStatus::EmCampo, "2024-03-12", Some((1, "Acme"))),
        alocacao(2, AlocacaoStatus::EmCampo, "2024-03-13", Some((7, "Acme"))),
        alocacao(3, AlocacaoStatus::EmCampo, "2024-03-14", Some((7, "Acme"))),
    ];

    let ocupacao = ocupacao_por_cliente(&alocs);
    assert_eq!(ocupacao.len(), 2);
    assert_eq!(ocupacao[0].cliente, "Acme");
    assert_eq!(ocupacao[0].quantidade, 1);
    assert_eq!(ocupacao[1].cliente, "Acme");
    assert_eq!(ocupacao[1].quantidade, 2);
}

#[test]
fn clients_with_zero_in_field_allocations_are_omitted() {
    let alocs = vec![alocacao(
        1,
        AlocacaoStatus::Retornado,
        "2024-03-12",
        Some((1, "Acme")),
    )];
    assert!(ocupacao_por_cliente(&alocs).is_empty());
}
