//! Publicador de snapshots – a única fronteira de sincronização entre
//! a thread de ingestão (um escritor) e os leitores concorrentes da
//! API externa.
//!
//! Um único mutex guarda store, rastreador de sessão e a flag de
//! conectividade. Cada atualização lógica (amostra + evento opcional +
//! ponto de histórico) é aplicada segurando o lock uma vez, então um
//! leitor nunca observa campos de duas amostras misturados. Seções
//! críticas curtas, sem I/O dentro delas.

use chrono::NaiveDate;
use postura_core::store::AggregateStore;
use postura_core::{AlertEvent, HistoryPoint, SessionTracker, Statistics, Telemetry};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Debug, Default)]
struct MonitorState {
    store: AggregateStore,
    tracker: SessionTracker,
    connected: bool,
}

/// Amostra atual + conectividade, como a API externa consome.
///
/// A flag indica apenas que os dados podem estar velhos; dados velhos
/// não são descartados quando a conexão cai.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSnapshot {
    pub telemetry: Option<Telemetry>,
    pub connected: bool,
}

/// Estado resumido do pipeline.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusSnapshot {
    pub connected: bool,
    pub episode_active: bool,
}

/// Handle clonável e thread-safe para o estado do monitor.
///
/// O lado de leitura é total: todo acessor devolve um valor (coleções
/// vazias ou `None` antes da primeira amostra), nunca um erro.
#[derive(Clone, Default)]
pub struct MonitorHandle {
    inner: Arc<Mutex<MonitorState>>,
}

impl MonitorHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MonitorState> {
        self.inner.lock().expect("estado do monitor envenenado")
    }

    // ── Lado do escritor (thread de ingestão) ──

    /// Aplica uma amostra aceita como uma unidade atômica: transição
    /// do rastreador, evento opcional e ponto de histórico sob o mesmo
    /// lock.
    pub fn ingest(&self, telemetry: Telemetry) {
        let mut guard = self.state();
        let state = &mut *guard;

        let event = state.tracker.observe(&telemetry);
        state.store.record_telemetry(telemetry);
        if let Some(event) = event {
            info!("Alerta de postura: {}", event.affected_labels());
            state.store.record_event(event);
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.state().connected = connected;
    }

    // ── Lado dos leitores (API externa) ──

    pub fn current(&self) -> CurrentSnapshot {
        let state = self.state();
        CurrentSnapshot {
            telemetry: state.store.current().cloned(),
            connected: state.connected,
        }
    }

    pub fn statistics(&self) -> Statistics {
        self.state().store.statistics()
    }

    /// Estatísticas relativas a uma data arbitrária (testes e camadas
    /// que queiram fixar o relógio).
    pub fn statistics_on(&self, today: NaiveDate) -> Statistics {
        self.state().store.statistics_on(today)
    }

    /// Até `limit` eventos, mais recente primeiro.
    pub fn events(&self, limit: usize) -> Vec<AlertEvent> {
        self.state().store.events(limit)
    }

    /// Histórico completo, cronológico.
    pub fn history(&self) -> Vec<HistoryPoint> {
        self.state().store.history()
    }

    /// Cauda do histórico para os gráficos.
    pub fn recent_history(&self, n: usize) -> Vec<HistoryPoint> {
        self.state().store.recent_history(n)
    }

    pub fn status(&self) -> StatusSnapshot {
        let state = self.state();
        StatusSnapshot {
            connected: state.connected,
            episode_active: state.tracker.episode_active(),
        }
    }

    /// Zera o store e devolve o rastreador ao estado ocioso, para que
    /// a próxima amostra ruim dispare um evento novo imediatamente.
    pub fn clear(&self) {
        let mut guard = self.state();
        let state = &mut *guard;
        state.store.clear();
        state.tracker.reset();
        info!("Histórico e eventos limpos");
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
