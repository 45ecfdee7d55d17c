use chrono::{Duration, NaiveDate};

use dls_schemas::{Alocacao, AlocacaoStatus, Datalogger, DataloggerStatus};

use crate::types::{Disponibilidade, ProjecaoDia};
use crate::MAX_DIAS;

/// Cumulative availability projection over `0..=dias` day offsets from
/// `hoje`; `dias` is clamped to `0..=MAX_DIAS`.
///
/// Starting point is the current `Estoque` count; each day adds the in-field
/// allocations whose expected return falls on exactly that day. An
/// allocation is consumed once, on its expected-return date, regardless of
/// delays; returns expected before `hoje` never enter the projection.
pub fn disponibilidade(
    dataloggers: &[Datalogger],
    alocacoes: &[Alocacao],
    hoje: NaiveDate,
    dias: i64,
) -> Disponibilidade {
    let estoque_atual = dataloggers
        .iter()
        .filter(|dl| dl.status == DataloggerStatus::Estoque)
        .count();

    let dias = dias.clamp(0, MAX_DIAS);
    let mut acumulado = estoque_atual;
    let mut projecao = Vec::with_capacity(dias as usize + 1);

    for offset in 0..=dias {
        let data = hoje + Duration::days(offset);
        let detalhes: Vec<Alocacao> = alocacoes
            .iter()
            .filter(|a| a.status == AlocacaoStatus::EmCampo)
            .filter(|a| a.data_retorno_prevista == data)
            .cloned()
            .collect();
        acumulado += detalhes.len();
        projecao.push(ProjecaoDia {
            data,
            disponibilidade: acumulado,
            retornos: detalhes.len(),
            detalhes_retornos: detalhes,
        });
    }

    Disponibilidade {
        projecao,
        disponibilidade_atual: estoque_atual,
        total_dataloggers: dataloggers.len(),
    }
}
