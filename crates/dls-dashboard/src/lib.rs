//! dls-dashboard
//!
//! Dashboard projections over current entity state:
//! - summary counts + occupancy rate
//! - cumulative availability projection
//! - in-field occupancy grouped by client
//! - calibration / overdue-return alerts
//! - historical occupancy over a trailing window
//!
//! Pure deterministic logic: no IO, no clock. Every function takes `hoje`
//! (today) explicitly so callers and tests control time.

mod alerts;
mod history;
mod projection;
mod summary;
mod types;

pub use alerts::alertas;
pub use history::historico_ocupacao;
pub use projection::disponibilidade;
pub use summary::{ocupacao_por_cliente, resumo};
pub use types::{
    Alerta, Disponibilidade, HistoricoDia, OcupacaoCliente, Prioridade, ProjecaoDia, Resumo,
    TipoAlerta,
};

/// Cap for caller-supplied day horizons (ten years). `dias` reaches the
/// aggregators straight from the `?dias=N` query string, so windows are
/// clamped to `0..=MAX_DIAS` before any iteration.
pub(crate) const MAX_DIAS: i64 = 3650;

/// Percentage rounded to 2 decimals; 0 when the denominator is 0.
pub(crate) fn taxa_percentual(parte: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let bruto = parte as f64 / total as f64 * 100.0;
    (bruto * 100.0).round() / 100.0
}
