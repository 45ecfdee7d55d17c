use chrono::{Duration, NaiveDate};

use dls_schemas::Alocacao;

use crate::taxa_percentual;
use crate::types::HistoricoDia;
use crate::MAX_DIAS;

/// Occupancy per day over `[hoje - dias, hoje]`; `dias` is clamped to
/// `0..=MAX_DIAS`.
///
/// An allocation occupies a day when it had departed by that day and had not
/// yet actually returned (`data_saida <= dia` and `data_retorno_real` null
/// or `>= dia`). Expected-return dates play no role here; this is the
/// realized history, not the projection.
pub fn historico_ocupacao(
    total_dataloggers: usize,
    alocacoes: &[Alocacao],
    hoje: NaiveDate,
    dias: i64,
) -> Vec<HistoricoDia> {
    let dias = dias.clamp(0, MAX_DIAS);
    let inicio = hoje - Duration::days(dias);
    let mut historico = Vec::with_capacity(dias as usize + 1);

    for offset in 0..=dias {
        let dia = inicio + Duration::days(offset);
        let alocados = alocacoes
            .iter()
            .filter(|a| a.data_saida <= dia)
            .filter(|a| a.data_retorno_real.is_none_or(|r| r >= dia))
            .count();

        historico.push(HistoricoDia {
            data: dia,
            alocados,
            disponivel: total_dataloggers.saturating_sub(alocados),
            taxa_ocupacao: taxa_percentual(alocados, total_dataloggers),
        });
    }

    historico
}
