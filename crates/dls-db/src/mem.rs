//! In-memory store backend.
//!
//! Implements the same contract as [`crate::PgStore`], including the status
//! re-checks and the all-or-nothing semantics of the cascading operations,
//! over plain vectors behind one mutex. Used by the daemon's in-process
//! router scenario tests and handy for local development without Postgres.
//!
//! Joined display fields (`cliente_nome`, `datalogger_numero_serie`,
//! `demanda_descricao`) are materialized at read time, mirroring the joined
//! SQL reads of the Postgres backend.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use dls_schemas::{
    Alocacao, AlocacaoStatus, AlocacaoUpdate, Cliente, ClienteUpdate, Datalogger,
    DataloggerStatus, DataloggerUpdate, Demanda, DemandaStatus, DemandaUpdate, NewAlocacao,
    NewCliente, NewDatalogger, NewDemanda,
};

use crate::error::{Error, Result};
use crate::store::{AlocacaoFilter, DemandaFilter, PeriodoFilter, RegistroRetorno, Store};
use crate::DbStatus;

#[derive(Default)]
struct Inner {
    dataloggers: Vec<Datalogger>,
    clientes: Vec<Cliente>,
    demandas: Vec<Demanda>,
    alocacoes: Vec<Alocacao>,
    next_datalogger_id: i32,
    next_cliente_id: i32,
    next_demanda_id: i32,
    next_alocacao_id: i32,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("mem store mutex poisoned")
    }
}

// ---------------------------------------------------------------------------
// Join materialization
// ---------------------------------------------------------------------------

fn materialize_demanda(inner: &Inner, d: &Demanda) -> Demanda {
    let mut out = d.clone();
    out.cliente_nome = inner
        .clientes
        .iter()
        .find(|c| c.id == d.cliente_id)
        .map(|c| c.nome.clone());
    out
}

fn materialize_alocacao(inner: &Inner, a: &Alocacao) -> Alocacao {
    let mut out = a.clone();
    out.datalogger_numero_serie = inner
        .dataloggers
        .iter()
        .find(|dl| dl.id == a.datalogger_id)
        .map(|dl| dl.numero_serie.clone());
    let demanda = inner.demandas.iter().find(|d| d.id == a.demanda_id);
    out.demanda_descricao = demanda.map(|d| d.descricao.clone());
    out.cliente_id = demanda.map(|d| d.cliente_id);
    out.cliente_nome = demanda.and_then(|d| {
        inner
            .clientes
            .iter()
            .find(|c| c.id == d.cliente_id)
            .map(|c| c.nome.clone())
    });
    out
}

fn not_found(what: &str) -> Error {
    Error::NotFound(what.into())
}

// ---------------------------------------------------------------------------
// Store impl
// ---------------------------------------------------------------------------

#[async_trait]
impl Store for MemStore {
    // -- dataloggers --------------------------------------------------------

    async fn list_dataloggers(&self, status: Option<DataloggerStatus>) -> Result<Vec<Datalogger>> {
        let inner = self.lock();
        Ok(inner
            .dataloggers
            .iter()
            .filter(|dl| status.is_none_or(|s| dl.status == s))
            .cloned()
            .collect())
    }

    async fn create_datalogger(&self, new: NewDatalogger) -> Result<Datalogger> {
        let mut inner = self.lock();
        if inner
            .dataloggers
            .iter()
            .any(|dl| dl.numero_serie == new.numero_serie)
        {
            return Err(Error::Conflict("Número de série já existe".into()));
        }

        inner.next_datalogger_id += 1;
        let now = Utc::now();
        let dl = Datalogger {
            id: inner.next_datalogger_id,
            numero_serie: new.numero_serie,
            modelo: new.modelo,
            status: new.status.unwrap_or(DataloggerStatus::Estoque),
            data_aquisicao: new.data_aquisicao,
            ultima_calibracao: new.ultima_calibracao,
            proxima_calibracao: new.proxima_calibracao,
            observacoes: new.observacoes,
            created_at: now,
            updated_at: now,
        };
        inner.dataloggers.push(dl.clone());
        Ok(dl)
    }

    async fn get_datalogger(&self, id: i32) -> Result<Datalogger> {
        let inner = self.lock();
        inner
            .dataloggers
            .iter()
            .find(|dl| dl.id == id)
            .cloned()
            .ok_or_else(|| not_found("Datalogger não encontrado"))
    }

    async fn update_datalogger(&self, id: i32, upd: DataloggerUpdate) -> Result<Datalogger> {
        let mut inner = self.lock();
        if let Some(serie) = &upd.numero_serie {
            if inner
                .dataloggers
                .iter()
                .any(|dl| dl.id != id && dl.numero_serie == *serie)
            {
                return Err(Error::Conflict("Número de série já existe".into()));
            }
        }

        let dl = inner
            .dataloggers
            .iter_mut()
            .find(|dl| dl.id == id)
            .ok_or_else(|| not_found("Datalogger não encontrado"))?;
        if let Some(v) = upd.numero_serie {
            dl.numero_serie = v;
        }
        if let Some(v) = upd.modelo {
            dl.modelo = v;
        }
        if let Some(v) = upd.status {
            dl.status = v;
        }
        if let Some(v) = upd.data_aquisicao {
            dl.data_aquisicao = Some(v);
        }
        if let Some(v) = upd.ultima_calibracao {
            dl.ultima_calibracao = Some(v);
        }
        if let Some(v) = upd.proxima_calibracao {
            dl.proxima_calibracao = Some(v);
        }
        if let Some(v) = upd.observacoes {
            dl.observacoes = Some(v);
        }
        dl.updated_at = Utc::now();
        Ok(dl.clone())
    }

    async fn delete_datalogger(&self, id: i32) -> Result<()> {
        let mut inner = self.lock();
        if !inner.dataloggers.iter().any(|dl| dl.id == id) {
            return Err(not_found("Datalogger não encontrado"));
        }
        if inner
            .alocacoes
            .iter()
            .any(|a| a.datalogger_id == id && a.status == AlocacaoStatus::EmCampo)
        {
            return Err(Error::Conflict(
                "Não é possível excluir datalogger com alocações ativas".into(),
            ));
        }
        inner.alocacoes.retain(|a| a.datalogger_id != id);
        inner.dataloggers.retain(|dl| dl.id != id);
        Ok(())
    }

    async fn dataloggers_calibracao_vencida(&self, hoje: NaiveDate) -> Result<Vec<Datalogger>> {
        let inner = self.lock();
        let mut vencidos: Vec<Datalogger> = inner
            .dataloggers
            .iter()
            .filter(|dl| dl.proxima_calibracao.is_some_and(|d| d <= hoje))
            .cloned()
            .collect();
        vencidos.sort_by_key(|dl| (dl.proxima_calibracao, dl.id));
        Ok(vencidos)
    }

    // -- clientes -----------------------------------------------------------

    async fn list_clientes(&self) -> Result<Vec<Cliente>> {
        Ok(self.lock().clientes.clone())
    }

    async fn create_cliente(&self, new: NewCliente) -> Result<Cliente> {
        let mut inner = self.lock();
        inner.next_cliente_id += 1;
        let now = Utc::now();
        let cliente = Cliente {
            id: inner.next_cliente_id,
            nome: new.nome,
            contato: new.contato,
            telefone: new.telefone,
            email: new.email,
            endereco: new.endereco,
            created_at: now,
            updated_at: now,
        };
        inner.clientes.push(cliente.clone());
        Ok(cliente)
    }

    async fn get_cliente(&self, id: i32) -> Result<Cliente> {
        let inner = self.lock();
        inner
            .clientes
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found("Cliente não encontrado"))
    }

    async fn update_cliente(&self, id: i32, upd: ClienteUpdate) -> Result<Cliente> {
        let mut inner = self.lock();
        let cliente = inner
            .clientes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Cliente não encontrado"))?;
        if let Some(v) = upd.nome {
            cliente.nome = v;
        }
        if let Some(v) = upd.contato {
            cliente.contato = Some(v);
        }
        if let Some(v) = upd.telefone {
            cliente.telefone = Some(v);
        }
        if let Some(v) = upd.email {
            cliente.email = Some(v);
        }
        if let Some(v) = upd.endereco {
            cliente.endereco = Some(v);
        }
        cliente.updated_at = Utc::now();
        Ok(cliente.clone())
    }

    async fn delete_cliente(&self, id: i32) -> Result<()> {
        let mut inner = self.lock();
        if !inner.clientes.iter().any(|c| c.id == id) {
            return Err(not_found("Cliente não encontrado"));
        }
        if inner
            .demandas
            .iter()
            .any(|d| d.cliente_id == id && d.status == DemandaStatus::Ativa)
        {
            return Err(Error::Conflict(
                "Não é possível excluir cliente com demandas ativas".into(),
            ));
        }
        let demanda_ids: Vec<i32> = inner
            .demandas
            .iter()
            .filter(|d| d.cliente_id == id)
            .map(|d| d.id)
            .collect();
        inner
            .alocacoes
            .retain(|a| !demanda_ids.contains(&a.demanda_id));
        inner.demandas.retain(|d| d.cliente_id != id);
        inner.clientes.retain(|c| c.id != id);
        Ok(())
    }

    // -- demandas -----------------------------------------------------------

    async fn list_demandas(&self, filtro: DemandaFilter) -> Result<Vec<Demanda>> {
        let inner = self.lock();
        Ok(inner
            .demandas
            .iter()
            .filter(|d| filtro.status.is_none_or(|s| d.status == s))
            .filter(|d| filtro.cliente_id.is_none_or(|c| d.cliente_id == c))
            .map(|d| materialize_demanda(&inner, d))
            .collect())
    }

    async fn create_demanda(&self, new: NewDemanda) -> Result<Demanda> {
        let mut inner = self.lock();
        if !inner.clientes.iter().any(|c| c.id == new.cliente_id) {
            return Err(not_found("Cliente não encontrado"));
        }

        inner.next_demanda_id += 1;
        let now = Utc::now();
        let demanda = Demanda {
            id: inner.next_demanda_id,
            cliente_id: new.cliente_id,
            cliente_nome: None,
            descricao: new.descricao,
            data_inicio: new.data_inicio,
            data_fim_prevista: new.data_fim_prevista,
            data_fim_real: new.data_fim_real,
            status: new.status.unwrap_or(DemandaStatus::Ativa),
            observacoes: new.observacoes,
            created_at: now,
            updated_at: now,
        };
        inner.demandas.push(demanda.clone());
        Ok(materialize_demanda(&inner, &demanda))
    }

    async fn get_demanda(&self, id: i32) -> Result<Demanda> {
        let inner = self.lock();
        inner
            .demandas
            .iter()
            .find(|d| d.id == id)
            .map(|d| materialize_demanda(&inner, d))
            .ok_or_else(|| not_found("Demanda não encontrada"))
    }

    async fn update_demanda(&self, id: i32, upd: DemandaUpdate) -> Result<Demanda> {
        let mut inner = self.lock();
        if let Some(cliente_id) = upd.cliente_id {
            if !inner.clientes.iter().any(|c| c.id == cliente_id) {
                return Err(not_found("Cliente não encontrado"));
            }
        }

        let demanda = inner
            .demandas
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found("Demanda não encontrada"))?;
        if let Some(v) = upd.cliente_id {
            demanda.cliente_id = v;
        }
        if let Some(v) = upd.descricao {
            demanda.descricao = v;
        }
        if let Some(v) = upd.status {
            demanda.status = v;
        }
        if let Some(v) = upd.data_inicio {
            demanda.data_inicio = v;
        }
        if let Some(v) = upd.data_fim_prevista {
            demanda.data_fim_prevista = v;
        }
        if let Some(v) = upd.data_fim_real {
            demanda.data_fim_real = Some(v);
        }
        if let Some(v) = upd.observacoes {
            demanda.observacoes = Some(v);
        }
        demanda.updated_at = Utc::now();
        let demanda = demanda.clone();
        Ok(materialize_demanda(&inner, &demanda))
    }

    async fn delete_demanda(&self, id: i32) -> Result<()> {
        let mut inner = self.lock();
        if !inner.demandas.iter().any(|d| d.id == id) {
            return Err(not_found("Demanda não encontrada"));
        }
        if inner
            .alocacoes
            .iter()
            .any(|a| a.demanda_id == id && a.status == AlocacaoStatus::EmCampo)
        {
            return Err(Error::Conflict(
                "Não é possível excluir demanda com alocações ativas".into(),
            ));
        }
        inner.alocacoes.retain(|a| a.demanda_id != id);
        inner.demandas.retain(|d| d.id != id);
        Ok(())
    }

    async fn finalizar_demanda(&self, id: i32, data_fim_real: NaiveDate) -> Result<Demanda> {
        let mut inner = self.lock();
        if !inner.demandas.iter().any(|d| d.id == id) {
            return Err(not_found("Demanda não encontrada"));
        }

        let now = Utc::now();
        let mut devolvidos: Vec<i32> = Vec::new();
        for a in inner
            .alocacoes
            .iter_mut()
            .filter(|a| a.demanda_id == id && a.status == AlocacaoStatus::EmCampo)
        {
            a.status = AlocacaoStatus::Retornado;
            a.data_retorno_real = Some(data_fim_real);
            a.updated_at = now;
            devolvidos.push(a.datalogger_id);
        }
        for dl in inner
            .dataloggers
            .iter_mut()
            .filter(|dl| devolvidos.contains(&dl.id))
        {
            dl.status = DataloggerStatus::Estoque;
            dl.updated_at = now;
        }

        let demanda = inner
            .demandas
            .iter_mut()
            .find(|d| d.id == id)
            .expect("checked above");
        demanda.status = DemandaStatus::Finalizada;
        demanda.data_fim_real = Some(data_fim_real);
        demanda.updated_at = now;
        let demanda = demanda.clone();
        Ok(materialize_demanda(&inner, &demanda))
    }

    // -- alocacoes ----------------------------------------------------------

    async fn list_alocacoes(&self, filtro: AlocacaoFilter) -> Result<Vec<Alocacao>> {
        let inner = self.lock();
        Ok(inner
            .alocacoes
            .iter()
            .filter(|a| filtro.status.is_none_or(|s| a.status == s))
            .filter(|a| filtro.demanda_id.is_none_or(|d| a.demanda_id == d))
            .filter(|a| filtro.datalogger_id.is_none_or(|d| a.datalogger_id == d))
            .map(|a| materialize_alocacao(&inner, a))
            .collect())
    }

    async fn create_alocacao(&self, new: NewAlocacao) -> Result<Alocacao> {
        let mut inner = self.lock();

        let dl_status = inner
            .dataloggers
            .iter()
            .find(|dl| dl.id == new.datalogger_id)
            .map(|dl| dl.status)
            .ok_or_else(|| not_found("Datalogger não encontrado"))?;
        if dl_status != DataloggerStatus::Estoque {
            return Err(Error::Conflict(
                "Datalogger não está disponível para alocação".into(),
            ));
        }

        let dm_status = inner
            .demandas
            .iter()
            .find(|d| d.id == new.demanda_id)
            .map(|d| d.status)
            .ok_or_else(|| not_found("Demanda não encontrada"))?;
        if dm_status != DemandaStatus::Ativa {
            return Err(Error::Conflict("Demanda não está ativa".into()));
        }

        inner.next_alocacao_id += 1;
        let now = Utc::now();
        let alocacao = Alocacao {
            id: inner.next_alocacao_id,
            datalogger_id: new.datalogger_id,
            datalogger_numero_serie: None,
            demanda_id: new.demanda_id,
            demanda_descricao: None,
            cliente_id: None,
            cliente_nome: None,
            data_saida: new.data_saida,
            data_retorno_prevista: new.data_retorno_prevista,
            data_retorno_real: None,
            status: AlocacaoStatus::EmCampo,
            observacoes: new.observacoes,
            created_at: now,
            updated_at: now,
        };
        inner.alocacoes.push(alocacao.clone());

        let dl = inner
            .dataloggers
            .iter_mut()
            .find(|dl| dl.id == new.datalogger_id)
            .expect("checked above");
        dl.status = DataloggerStatus::Alocado;
        dl.updated_at = now;

        Ok(materialize_alocacao(&inner, &alocacao))
    }

    async fn get_alocacao(&self, id: i32) -> Result<Alocacao> {
        let inner = self.lock();
        inner
            .alocacoes
            .iter()
            .find(|a| a.id == id)
            .map(|a| materialize_alocacao(&inner, a))
            .ok_or_else(|| not_found("Alocação não encontrada"))
    }

    async fn update_alocacao(&self, id: i32, upd: AlocacaoUpdate) -> Result<Alocacao> {
        let mut inner = self.lock();
        let alocacao = inner
            .alocacoes
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("Alocação não encontrada"))?;
        if let Some(v) = upd.data_saida {
            alocacao.data_saida = v;
        }
        if let Some(v) = upd.data_retorno_prevista {
            alocacao.data_retorno_prevista = v;
        }
        if let Some(v) = upd.data_retorno_real {
            alocacao.data_retorno_real = Some(v);
        }
        if let Some(v) = upd.observacoes {
            alocacao.observacoes = Some(v);
        }
        alocacao.updated_at = Utc::now();
        let alocacao = alocacao.clone();
        Ok(materialize_alocacao(&inner, &alocacao))
    }

    async fn delete_alocacao(&self, id: i32) -> Result<()> {
        let mut inner = self.lock();
        let (status, datalogger_id) = inner
            .alocacoes
            .iter()
            .find(|a| a.id == id)
            .map(|a| (a.status, a.datalogger_id))
            .ok_or_else(|| not_found("Alocação não encontrada"))?;

        if status == AlocacaoStatus::EmCampo {
            if let Some(dl) = inner
                .dataloggers
                .iter_mut()
                .find(|dl| dl.id == datalogger_id)
            {
                dl.status = DataloggerStatus::Estoque;
                dl.updated_at = Utc::now();
            }
        }
        inner.alocacoes.retain(|a| a.id != id);
        Ok(())
    }

    async fn registrar_retorno(&self, id: i32, registro: RegistroRetorno) -> Result<Alocacao> {
        let mut inner = self.lock();
        let now = Utc::now();

        let alocacao = inner
            .alocacoes
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("Alocação não encontrada"))?;
        if alocacao.status == AlocacaoStatus::Retornado {
            return Err(Error::Conflict("Alocação já foi finalizada".into()));
        }

        alocacao.status = AlocacaoStatus::Retornado;
        alocacao.data_retorno_real = Some(registro.data_retorno_real);
        if let Some(obs) = registro.observacoes {
            alocacao.observacoes = Some(obs);
        }
        alocacao.updated_at = now;
        let datalogger_id = alocacao.datalogger_id;
        let alocacao = alocacao.clone();

        if let Some(dl) = inner
            .dataloggers
            .iter_mut()
            .find(|dl| dl.id == datalogger_id)
        {
            dl.status = if registro.enviar_calibracao {
                DataloggerStatus::Calibracao
            } else {
                DataloggerStatus::Estoque
            };
            dl.updated_at = now;
        }

        Ok(materialize_alocacao(&inner, &alocacao))
    }

    async fn retornos_previstos(&self, periodo: PeriodoFilter) -> Result<Vec<Alocacao>> {
        let inner = self.lock();
        let mut previstos: Vec<Alocacao> = inner
            .alocacoes
            .iter()
            .filter(|a| a.status == AlocacaoStatus::EmCampo)
            .filter(|a| periodo.data_inicio.is_none_or(|d| a.data_retorno_prevista >= d))
            .filter(|a| periodo.data_fim.is_none_or(|d| a.data_retorno_prevista <= d))
            .map(|a| materialize_alocacao(&inner, a))
            .collect();
        previstos.sort_by_key(|a| (a.data_retorno_prevista, a.id));
        Ok(previstos)
    }

    // -- health -------------------------------------------------------------

    async fn status(&self) -> Result<DbStatus> {
        Ok(DbStatus {
            ok: true,
            has_schema: true,
        })
    }
}
