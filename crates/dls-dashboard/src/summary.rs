use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use dls_schemas::{Alocacao, AlocacaoStatus, Datalogger, DataloggerStatus, Demanda, DemandaStatus};

use crate::taxa_percentual;
use crate::types::{OcupacaoCliente, Resumo};

/// Summary counts and occupancy rate over current entity state.
pub fn resumo(
    dataloggers: &[Datalogger],
    demandas: &[Demanda],
    alocacoes: &[Alocacao],
    hoje: NaiveDate,
) -> Resumo {
    let count_status =
        |s: DataloggerStatus| dataloggers.iter().filter(|dl| dl.status == s).count();

    let total = dataloggers.len();
    let alocados = count_status(DataloggerStatus::Alocado);

    let calibracoes_vencidas = dataloggers
        .iter()
        .filter(|dl| dl.proxima_calibracao.is_some_and(|d| d <= hoje))
        .count();

    let limite = hoje + Duration::days(7);
    let retornos_proximos = alocacoes
        .iter()
        .filter(|a| a.status == AlocacaoStatus::EmCampo)
        .filter(|a| a.data_retorno_prevista >= hoje && a.data_retorno_prevista <= limite)
        .count();

    Resumo {
        total_dataloggers: total,
        em_estoque: count_status(DataloggerStatus::Estoque),
        alocados,
        em_calibracao: count_status(DataloggerStatus::Calibracao),
        em_manutencao: count_status(DataloggerStatus::Manutencao),
        demandas_ativas: demandas
            .iter()
            .filter(|d| d.status == DemandaStatus::Ativa)
            .count(),
        alocacoes_em_campo: alocacoes
            .iter()
            .filter(|a| a.status == AlocacaoStatus::EmCampo)
            .count(),
        calibracoes_vencidas,
        retornos_proximos,
        taxa_ocupacao: taxa_percentual(alocados, total),
    }
}

/// In-field allocations grouped by the owning demand's client.
///
/// Inner-join semantics: allocations without a resolved client are skipped,
/// and clients with zero in-field allocations do not appear. Grouping keys
/// on `cliente_id`, so two clients sharing a name stay separate; output is
/// ordered by client id.
pub fn ocupacao_por_cliente(alocacoes: &[Alocacao]) -> Vec<OcupacaoCliente> {
    let mut por_cliente: BTreeMap<(i32, String), usize> = BTreeMap::new();
    for a in alocacoes.iter().filter(|a| a.status == AlocacaoStatus::EmCampo) {
        if let (Some(id), Some(nome)) = (a.cliente_id, &a.cliente_nome) {
            *por_cliente.entry((id, nome.clone())).or_default() += 1;
        }
    }
    por_cliente
        .into_iter()
        .map(|((_, cliente), quantidade)| OcupacaoCliente {
            cliente,
            quantidade,
        })
        .collect()
}
