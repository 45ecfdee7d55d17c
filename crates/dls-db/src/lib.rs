//! dls-db
//!
//! Store boundary and backends for the datalogger inventory tracker:
//! the [`Store`] trait, the PostgreSQL implementation ([`PgStore`]) and an
//! in-memory implementation ([`MemStore`]) used by scenario tests and local
//! development.

use anyhow::{Context, Result as AnyResult};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub mod error;
pub mod mem;
pub mod pg;
pub mod store;

pub use error::{Error, Result};
pub use mem::MemStore;
pub use pg::PgStore;
pub use store::{AlocacaoFilter, DemandaFilter, PeriodoFilter, RegistroRetorno, Store};

pub const ENV_DB_URL: &str = "DLS_DATABASE_URL";

/// Connect to Postgres using DLS_DATABASE_URL.
pub async fn connect_from_env() -> AnyResult<PgPool> {
    let url =
        std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> AnyResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Connectivity + schema presence, surfaced by the /health endpoint.
#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_schema: bool,
}
