use chrono::{Duration, NaiveDate};

use dls_schemas::{Alocacao, AlocacaoStatus, Datalogger};

use crate::types::{Alerta, Prioridade, TipoAlerta};

/// All current alerts, sorted by priority (alta, media, baixa). The sort is
/// stable: within a priority, discovery order is kept.
pub fn alertas(dataloggers: &[Datalogger], alocacoes: &[Alocacao], hoje: NaiveDate) -> Vec<Alerta> {
    let mut saida = Vec::new();

    // Overdue calibrations.
    for dl in dataloggers {
        let Some(vencimento) = dl.proxima_calibracao else {
            continue;
        };
        if vencimento <= hoje {
            let dias = (hoje - vencimento).num_days();
            saida.push(Alerta {
                tipo: TipoAlerta::CalibracaoVencida,
                prioridade: Prioridade::Alta,
                mensagem: format!(
                    "Datalogger {} com calibração vencida há {} dias",
                    dl.numero_serie, dias
                ),
                datalogger_id: Some(dl.id),
                alocacao_id: None,
                demanda_id: None,
                data_vencimento: Some(vencimento),
                dias_atraso: None,
            });
        }
    }

    // Calibrations due within the next 30 days.
    let limite = hoje + Duration::days(30);
    for dl in dataloggers {
        let Some(vencimento) = dl.proxima_calibracao else {
            continue;
        };
        if vencimento > hoje && vencimento <= limite {
            let dias = (vencimento - hoje).num_days();
            saida.push(Alerta {
                tipo: TipoAlerta::CalibracaoProxima,
                prioridade: Prioridade::Media,
                mensagem: format!(
                    "Datalogger {} precisa de calibração em {} dias",
                    dl.numero_serie, dias
                ),
                datalogger_id: Some(dl.id),
                alocacao_id: None,
                demanda_id: None,
                data_vencimento: Some(vencimento),
                dias_atraso: None,
            });
        }
    }

    // Overdue returns.
    for a in alocacoes {
        if a.status != AlocacaoStatus::EmCampo || a.data_retorno_prevista >= hoje {
            continue;
        }
        let dias = (hoje - a.data_retorno_prevista).num_days();
        let serie = a.datalogger_numero_serie.as_deref().unwrap_or("?");
        saida.push(Alerta {
            tipo: TipoAlerta::RetornoAtrasado,
            prioridade: Prioridade::Alta,
            mensagem: format!("Datalogger {serie} está {dias} dias em atraso"),
            datalogger_id: Some(a.datalogger_id),
            alocacao_id: Some(a.id),
            demanda_id: Some(a.demanda_id),
            data_vencimento: None,
            dias_atraso: Some(dias),
        });
    }

    // Vec::sort_by_key is stable, so ties keep discovery order.
    saida.sort_by_key(|a| a.prioridade.rank());
    saida
}
