//! PostgreSQL backend.
//!
//! Every mutating operation runs in one transaction and re-reads the rows it
//! depends on with `select ... for update`, so concurrent requests serialize
//! through the store. The partial unique index
//! `uq_alocacoes_datalogger_em_campo` backs the "one in-field allocation per
//! datalogger" invariant even if a future code path forgets the re-check.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use dls_schemas::{
    Alocacao, AlocacaoStatus, AlocacaoUpdate, Cliente, ClienteUpdate, Datalogger,
    DataloggerStatus, DataloggerUpdate, Demanda, DemandaStatus, DemandaUpdate, NewAlocacao,
    NewCliente, NewDatalogger, NewDemanda,
};

use crate::error::{Error, Result};
use crate::store::{AlocacaoFilter, DemandaFilter, PeriodoFilter, RegistroRetorno, Store};
use crate::DbStatus;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const DATALOGGER_COLS: &str = "id, numero_serie, modelo, status, data_aquisicao, \
     ultima_calibracao, proxima_calibracao, observacoes, created_at, updated_at";

const DEMANDA_SELECT: &str = "select d.id, d.cliente_id, c.nome as cliente_nome, d.descricao, \
     d.data_inicio, d.data_fim_prevista, d.data_fim_real, d.status, d.observacoes, \
     d.created_at, d.updated_at \
     from demandas d join clientes c on c.id = d.cliente_id";

const ALOCACAO_SELECT: &str = "select a.id, a.datalogger_id, \
     dl.numero_serie as datalogger_numero_serie, a.demanda_id, \
     d.descricao as demanda_descricao, c.id as cliente_id, \
     c.nome as cliente_nome, a.data_saida, \
     a.data_retorno_prevista, a.data_retorno_real, a.status, a.observacoes, \
     a.created_at, a.updated_at \
     from alocacoes a \
     join dataloggers dl on dl.id = a.datalogger_id \
     join demandas d on d.id = a.demanda_id \
     join clientes c on c.id = d.cliente_id";

fn parse_datalogger_status(s: &str) -> Result<DataloggerStatus> {
    DataloggerStatus::parse(s)
        .ok_or_else(|| Error::Internal(format!("invalid datalogger status in row: {s}")))
}

fn parse_demanda_status(s: &str) -> Result<DemandaStatus> {
    DemandaStatus::parse(s)
        .ok_or_else(|| Error::Internal(format!("invalid demanda status in row: {s}")))
}

fn parse_alocacao_status(s: &str) -> Result<AlocacaoStatus> {
    AlocacaoStatus::parse(s)
        .ok_or_else(|| Error::Internal(format!("invalid alocacao status in row: {s}")))
}

fn datalogger_from_row(row: &PgRow) -> Result<Datalogger> {
    Ok(Datalogger {
        id: row.try_get("id")?,
        numero_serie: row.try_get("numero_serie")?,
        modelo: row.try_get("modelo")?,
        status: parse_datalogger_status(&row.try_get::<String, _>("status")?)?,
        data_aquisicao: row.try_get("data_aquisicao")?,
        ultima_calibracao: row.try_get("ultima_calibracao")?,
        proxima_calibracao: row.try_get("proxima_calibracao")?,
        observacoes: row.try_get("observacoes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn cliente_from_row(row: &PgRow) -> Result<Cliente> {
    Ok(Cliente {
        id: row.try_get("id")?,
        nome: row.try_get("nome")?,
        contato: row.try_get("contato")?,
        telefone: row.try_get("telefone")?,
        email: row.try_get("email")?,
        endereco: row.try_get("endereco")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn demanda_from_row(row: &PgRow) -> Result<Demanda> {
    Ok(Demanda {
        id: row.try_get("id")?,
        cliente_id: row.try_get("cliente_id")?,
        cliente_nome: row.try_get("cliente_nome")?,
        descricao: row.try_get("descricao")?,
        data_inicio: row.try_get("data_inicio")?,
        data_fim_prevista: row.try_get("data_fim_prevista")?,
        data_fim_real: row.try_get("data_fim_real")?,
        status: parse_demanda_status(&row.try_get::<String, _>("status")?)?,
        observacoes: row.try_get("observacoes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn alocacao_from_row(row: &PgRow) -> Result<Alocacao> {
    Ok(Alocacao {
        id: row.try_get("id")?,
        datalogger_id: row.try_get("datalogger_id")?,
        datalogger_numero_serie: row.try_get("datalogger_numero_serie")?,
        demanda_id: row.try_get("demanda_id")?,
        demanda_descricao: row.try_get("demanda_descricao")?,
        cliente_id: row.try_get("cliente_id")?,
        cliente_nome: row.try_get("cliente_nome")?,
        data_saida: row.try_get("data_saida")?,
        data_retorno_prevista: row.try_get("data_retorno_prevista")?,
        data_retorno_real: row.try_get("data_retorno_real")?,
        status: parse_alocacao_status(&row.try_get::<String, _>("status")?)?,
        observacoes: row.try_get("observacoes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Detect a Postgres unique constraint violation by name.
fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Store impl
// ---------------------------------------------------------------------------

#[async_trait]
impl Store for PgStore {
    // -- dataloggers --------------------------------------------------------

    async fn list_dataloggers(&self, status: Option<DataloggerStatus>) -> Result<Vec<Datalogger>> {
        let rows = sqlx::query(&format!(
            "select {DATALOGGER_COLS} from dataloggers \
             where ($1::text is null or status = $1) order by id"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(datalogger_from_row).collect()
    }

    async fn create_datalogger(&self, new: NewDatalogger) -> Result<Datalogger> {
        let status = new.status.unwrap_or(DataloggerStatus::Estoque);
        let res = sqlx::query(&format!(
            "insert into dataloggers \
             (numero_serie, modelo, status, data_aquisicao, ultima_calibracao, \
              proxima_calibracao, observacoes) \
             values ($1, $2, $3, $4, $5, $6, $7) \
             returning {DATALOGGER_COLS}"
        ))
        .bind(&new.numero_serie)
        .bind(&new.modelo)
        .bind(status.as_str())
        .bind(new.data_aquisicao)
        .bind(new.ultima_calibracao)
        .bind(new.proxima_calibracao)
        .bind(&new.observacoes)
        .fetch_one(&self.pool)
        .await;

        match res {
            Ok(row) => datalogger_from_row(&row),
            Err(e) if is_unique_violation(&e, "uq_dataloggers_numero_serie") => {
                Err(Error::Conflict("Número de série já existe".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_datalogger(&self, id: i32) -> Result<Datalogger> {
        let row = sqlx::query(&format!(
            "select {DATALOGGER_COLS} from dataloggers where id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Datalogger não encontrado".into()))?;
        datalogger_from_row(&row)
    }

    async fn update_datalogger(&self, id: i32, upd: DataloggerUpdate) -> Result<Datalogger> {
        let res = sqlx::query(&format!(
            "update dataloggers set \
               numero_serie = coalesce($2::text, numero_serie), \
               modelo = coalesce($3::text, modelo), \
               status = coalesce($4::text, status), \
               data_aquisicao = coalesce($5::date, data_aquisicao), \
               ultima_calibracao = coalesce($6::date, ultima_calibracao), \
               proxima_calibracao = coalesce($7::date, proxima_calibracao), \
               observacoes = coalesce($8::text, observacoes), \
               updated_at = now() \
             where id = $1 \
             returning {DATALOGGER_COLS}"
        ))
        .bind(id)
        .bind(&upd.numero_serie)
        .bind(&upd.modelo)
        .bind(upd.status.map(|s| s.as_str()))
        .bind(upd.data_aquisicao)
        .bind(upd.ultima_calibracao)
        .bind(upd.proxima_calibracao)
        .bind(&upd.observacoes)
        .fetch_optional(&self.pool)
        .await;

        match res {
            Ok(Some(row)) => datalogger_from_row(&row),
            Ok(None) => Err(Error::NotFound("Datalogger não encontrado".into())),
            Err(e) if is_unique_violation(&e, "uq_dataloggers_numero_serie") => {
                Err(Error::Conflict("Número de série já existe".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_datalogger(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("select id from dataloggers where id = $1 for update")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound("Datalogger não encontrado".into()));
        }

        let (em_campo,): (i64,) = sqlx::query_as(
            "select count(*) from alocacoes where datalogger_id = $1 and status = 'Em campo'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if em_campo > 0 {
            return Err(Error::Conflict(
                "Não é possível excluir datalogger com alocações ativas".into(),
            ));
        }

        sqlx::query("delete from dataloggers where id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn dataloggers_calibracao_vencida(&self, hoje: NaiveDate) -> Result<Vec<Datalogger>> {
        let rows = sqlx::query(&format!(
            "select {DATALOGGER_COLS} from dataloggers \
             where proxima_calibracao is not null and proxima_calibracao <= $1 \
             order by proxima_calibracao, id"
        ))
        .bind(hoje)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(datalogger_from_row).collect()
    }

    // -- clientes -----------------------------------------------------------

    async fn list_clientes(&self) -> Result<Vec<Cliente>> {
        let rows = sqlx::query("select * from clientes order by id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(cliente_from_row).collect()
    }

    async fn create_cliente(&self, new: NewCliente) -> Result<Cliente> {
        let row = sqlx::query(
            "insert into clientes (nome, contato, telefone, email, endereco) \
             values ($1, $2, $3, $4, $5) returning *",
        )
        .bind(&new.nome)
        .bind(&new.contato)
        .bind(&new.telefone)
        .bind(&new.email)
        .bind(&new.endereco)
        .fetch_one(&self.pool)
        .await?;
        cliente_from_row(&row)
    }

    async fn get_cliente(&self, id: i32) -> Result<Cliente> {
        let row = sqlx::query("select * from clientes where id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Cliente não encontrado".into()))?;
        cliente_from_row(&row)
    }

    async fn update_cliente(&self, id: i32, upd: ClienteUpdate) -> Result<Cliente> {
        let row = sqlx::query(
            "update clientes set \
               nome = coalesce($2::text, nome), \
               contato = coalesce($3::text, contato), \
               telefone = coalesce($4::text, telefone), \
               email = coalesce($5::text, email), \
               endereco = coalesce($6::text, endereco), \
               updated_at = now() \
             where id = $1 returning *",
        )
        .bind(id)
        .bind(&upd.nome)
        .bind(&upd.contato)
        .bind(&upd.telefone)
        .bind(&upd.email)
        .bind(&upd.endereco)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Cliente não encontrado".into()))?;
        cliente_from_row(&row)
    }

    async fn delete_cliente(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("select id from clientes where id = $1 for update")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound("Cliente não encontrado".into()));
        }

        let (ativas,): (i64,) = sqlx::query_as(
            "select count(*) from demandas where cliente_id = $1 and status = 'Ativa'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if ativas > 0 {
            return Err(Error::Conflict(
                "Não é possível excluir cliente com demandas ativas".into(),
            ));
        }

        sqlx::query("delete from clientes where id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // -- demandas -----------------------------------------------------------

    async fn list_demandas(&self, filtro: DemandaFilter) -> Result<Vec<Demanda>> {
        let rows = sqlx::query(&format!(
            "{DEMANDA_SELECT} \
             where ($1::text is null or d.status = $1) \
               and ($2::int4 is null or d.cliente_id = $2) \
             order by d.id"
        ))
        .bind(filtro.status.map(|s| s.as_str()))
        .bind(filtro.cliente_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(demanda_from_row).collect()
    }

    async fn create_demanda(&self, new: NewDemanda) -> Result<Demanda> {
        let cliente = sqlx::query("select id from clientes where id = $1")
            .bind(new.cliente_id)
            .fetch_optional(&self.pool)
            .await?;
        if cliente.is_none() {
            return Err(Error::NotFound("Cliente não encontrado".into()));
        }

        let status = new.status.unwrap_or(DemandaStatus::Ativa);
        let (id,): (i32,) = sqlx::query_as(
            "insert into demandas \
             (cliente_id, descricao, data_inicio, data_fim_prevista, data_fim_real, \
              status, observacoes) \
             values ($1, $2, $3, $4, $5, $6, $7) returning id",
        )
        .bind(new.cliente_id)
        .bind(&new.descricao)
        .bind(new.data_inicio)
        .bind(new.data_fim_prevista)
        .bind(new.data_fim_real)
        .bind(status.as_str())
        .bind(&new.observacoes)
        .fetch_one(&self.pool)
        .await?;

        self.get_demanda(id).await
    }

    async fn get_demanda(&self, id: i32) -> Result<Demanda> {
        let row = sqlx::query(&format!("{DEMANDA_SELECT} where d.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Demanda não encontrada".into()))?;
        demanda_from_row(&row)
    }

    async fn update_demanda(&self, id: i32, upd: DemandaUpdate) -> Result<Demanda> {
        if let Some(cliente_id) = upd.cliente_id {
            let cliente = sqlx::query("select id from clientes where id = $1")
                .bind(cliente_id)
                .fetch_optional(&self.pool)
                .await?;
            if cliente.is_none() {
                return Err(Error::NotFound("Cliente não encontrado".into()));
            }
        }

        let updated = sqlx::query(
            "update demandas set \
               cliente_id = coalesce($2::int4, cliente_id), \
               descricao = coalesce($3::text, descricao), \
               status = coalesce($4::text, status), \
               data_inicio = coalesce($5::date, data_inicio), \
               data_fim_prevista = coalesce($6::date, data_fim_prevista), \
               data_fim_real = coalesce($7::date, data_fim_real), \
               observacoes = coalesce($8::text, observacoes), \
               updated_at = now() \
             where id = $1 returning id",
        )
        .bind(id)
        .bind(upd.cliente_id)
        .bind(&upd.descricao)
        .bind(upd.status.map(|s| s.as_str()))
        .bind(upd.data_inicio)
        .bind(upd.data_fim_prevista)
        .bind(upd.data_fim_real)
        .bind(&upd.observacoes)
        .fetch_optional(&self.pool)
        .await?;
        if updated.is_none() {
            return Err(Error::NotFound("Demanda não encontrada".into()));
        }

        self.get_demanda(id).await
    }

    async fn delete_demanda(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("select id from demandas where id = $1 for update")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound("Demanda não encontrada".into()));
        }

        let (em_campo,): (i64,) = sqlx::query_as(
            "select count(*) from alocacoes where demanda_id = $1 and status = 'Em campo'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if em_campo > 0 {
            return Err(Error::Conflict(
                "Não é possível excluir demanda com alocações ativas".into(),
            ));
        }

        sqlx::query("delete from demandas where id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn finalizar_demanda(&self, id: i32, data_fim_real: NaiveDate) -> Result<Demanda> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("select id from demandas where id = $1 for update")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound("Demanda não encontrada".into()));
        }

        sqlx::query(
            "update demandas set status = 'Finalizada', data_fim_real = $2, updated_at = now() \
             where id = $1",
        )
        .bind(id)
        .bind(data_fim_real)
        .execute(&mut *tx)
        .await?;

        // Return every in-field allocation and free its datalogger in one
        // statement so the cascade cannot be half-applied.
        sqlx::query(
            "with devolvidas as ( \
               update alocacoes \
               set status = 'Retornado', data_retorno_real = $2, updated_at = now() \
               where demanda_id = $1 and status = 'Em campo' \
               returning datalogger_id \
             ) \
             update dataloggers set status = 'Estoque', updated_at = now() \
             where id in (select datalogger_id from devolvidas)",
        )
        .bind(id)
        .bind(data_fim_real)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get_demanda(id).await
    }

    // -- alocacoes ----------------------------------------------------------

    async fn list_alocacoes(&self, filtro: AlocacaoFilter) -> Result<Vec<Alocacao>> {
        let rows = sqlx::query(&format!(
            "{ALOCACAO_SELECT} \
             where ($1::text is null or a.status = $1) \
               and ($2::int4 is null or a.demanda_id = $2) \
               and ($3::int4 is null or a.datalogger_id = $3) \
             order by a.id"
        ))
        .bind(filtro.status.map(|s| s.as_str()))
        .bind(filtro.demanda_id)
        .bind(filtro.datalogger_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(alocacao_from_row).collect()
    }

    async fn create_alocacao(&self, new: NewAlocacao) -> Result<Alocacao> {
        let mut tx = self.pool.begin().await?;

        // Status re-checks happen inside the transaction, under row locks.
        let dl = sqlx::query("select status from dataloggers where id = $1 for update")
            .bind(new.datalogger_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("Datalogger não encontrado".into()))?;
        if parse_datalogger_status(&dl.try_get::<String, _>("status")?)?
            != DataloggerStatus::Estoque
        {
            return Err(Error::Conflict(
                "Datalogger não está disponível para alocação".into(),
            ));
        }

        let dm = sqlx::query("select status from demandas where id = $1 for update")
            .bind(new.demanda_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("Demanda não encontrada".into()))?;
        if parse_demanda_status(&dm.try_get::<String, _>("status")?)? != DemandaStatus::Ativa {
            return Err(Error::Conflict("Demanda não está ativa".into()));
        }

        let res = sqlx::query_as::<_, (i32,)>(
            "insert into alocacoes \
             (datalogger_id, demanda_id, data_saida, data_retorno_prevista, status, observacoes) \
             values ($1, $2, $3, $4, 'Em campo', $5) returning id",
        )
        .bind(new.datalogger_id)
        .bind(new.demanda_id)
        .bind(new.data_saida)
        .bind(new.data_retorno_prevista)
        .bind(&new.observacoes)
        .fetch_one(&mut *tx)
        .await;

        let (id,) = match res {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e, "uq_alocacoes_datalogger_em_campo") => {
                return Err(Error::Conflict(
                    "Datalogger não está disponível para alocação".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query("update dataloggers set status = 'Alocado', updated_at = now() where id = $1")
            .bind(new.datalogger_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.get_alocacao(id).await
    }

    async fn get_alocacao(&self, id: i32) -> Result<Alocacao> {
        let row = sqlx::query(&format!("{ALOCACAO_SELECT} where a.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Alocação não encontrada".into()))?;
        alocacao_from_row(&row)
    }

    async fn update_alocacao(&self, id: i32, upd: AlocacaoUpdate) -> Result<Alocacao> {
        let updated = sqlx::query(
            "update alocacoes set \
               data_saida = coalesce($2::date, data_saida), \
               data_retorno_prevista = coalesce($3::date, data_retorno_prevista), \
               data_retorno_real = coalesce($4::date, data_retorno_real), \
               observacoes = coalesce($5::text, observacoes), \
               updated_at = now() \
             where id = $1 returning id",
        )
        .bind(id)
        .bind(upd.data_saida)
        .bind(upd.data_retorno_prevista)
        .bind(upd.data_retorno_real)
        .bind(&upd.observacoes)
        .fetch_optional(&self.pool)
        .await?;
        if updated.is_none() {
            return Err(Error::NotFound("Alocação não encontrada".into()));
        }

        self.get_alocacao(id).await
    }

    async fn delete_alocacao(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "select status, datalogger_id from alocacoes where id = $1 for update",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Alocação não encontrada".into()))?;

        let status = parse_alocacao_status(&row.try_get::<String, _>("status")?)?;
        if status == AlocacaoStatus::EmCampo {
            let datalogger_id: i32 = row.try_get("datalogger_id")?;
            sqlx::query(
                "update dataloggers set status = 'Estoque', updated_at = now() where id = $1",
            )
            .bind(datalogger_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("delete from alocacoes where id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn registrar_retorno(&self, id: i32, registro: RegistroRetorno) -> Result<Alocacao> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "select status, datalogger_id from alocacoes where id = $1 for update",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Alocação não encontrada".into()))?;

        if parse_alocacao_status(&row.try_get::<String, _>("status")?)?
            == AlocacaoStatus::Retornado
        {
            return Err(Error::Conflict("Alocação já foi finalizada".into()));
        }
        let datalogger_id: i32 = row.try_get("datalogger_id")?;

        sqlx::query(
            "update alocacoes set status = 'Retornado', data_retorno_real = $2, \
               observacoes = coalesce($3::text, observacoes), updated_at = now() \
             where id = $1",
        )
        .bind(id)
        .bind(registro.data_retorno_real)
        .bind(&registro.observacoes)
        .execute(&mut *tx)
        .await?;

        let destino = if registro.enviar_calibracao {
            DataloggerStatus::Calibracao
        } else {
            DataloggerStatus::Estoque
        };
        sqlx::query("update dataloggers set status = $2, updated_at = now() where id = $1")
            .bind(datalogger_id)
            .bind(destino.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.get_alocacao(id).await
    }

    async fn retornos_previstos(&self, periodo: PeriodoFilter) -> Result<Vec<Alocacao>> {
        let rows = sqlx::query(&format!(
            "{ALOCACAO_SELECT} \
             where a.status = 'Em campo' \
               and ($1::date is null or a.data_retorno_prevista >= $1) \
               and ($2::date is null or a.data_retorno_prevista <= $2) \
             order by a.data_retorno_prevista, a.id"
        ))
        .bind(periodo.data_inicio)
        .bind(periodo.data_fim)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(alocacao_from_row).collect()
    }

    // -- health -------------------------------------------------------------

    async fn status(&self) -> Result<DbStatus> {
        let (one,): (i32,) = sqlx::query_as("select 1").fetch_one(&self.pool).await?;

        let (has_schema,): (bool,) = sqlx::query_as(
            "select exists ( \
               select 1 from information_schema.tables \
               where table_schema = 'public' and table_name = 'dataloggers' \
             )",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DbStatus {
            ok: one == 1,
            has_schema,
        })
    }
}
