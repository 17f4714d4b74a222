//! Store agregado em memória: amostra atual, log de eventos, anel de
//! histórico e estatísticas derivadas.
//!
//! Todas as coleções têm capacidade fixa com descarte FIFO do mais
//! antigo. Nada é persistido; um `clear()` explícito zera tudo. O
//! store em si não é sincronizado — a publicação para leitores
//! concorrentes fica a cargo da camada de snapshot do monitor.

use crate::types::{AlertEvent, HistoryPoint, Statistics, Telemetry};
use chrono::{Local, NaiveDate};
use std::collections::VecDeque;

/// Capacidade do anel de histórico (amostras).
pub const HISTORY_CAPACITY: usize = 200;
/// Capacidade do log de eventos (episódios).
pub const EVENT_LOG_CAPACITY: usize = 100;
/// Máximo de eventos devolvidos por leitura da API.
pub const EVENT_READ_LIMIT: usize = 20;
/// Cauda do histórico usada pelos gráficos do dashboard externo.
pub const HISTORY_CHART_POINTS: usize = 50;

/// Estado derivado das amostras aceitas.
#[derive(Debug, Default)]
pub struct AggregateStore {
    /// Última amostra aceita (sobrescrita a cada amostra)
    current: Option<Telemetry>,
    /// Eventos de episódio, mais recente primeiro
    events: VecDeque<AlertEvent>,
    /// Histórico em ordem cronológica (anel FIFO)
    history: VecDeque<HistoryPoint>,
    /// Total de episódios desde o início ou desde o último clear
    total_bad_events: u64,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self {
            current: None,
            events: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            total_bad_events: 0,
        }
    }

    /// Registra uma amostra aceita: sobrescreve a atual e anexa um
    /// ponto de histórico, incondicionalmente — o histórico captura o
    /// sinal completo, não só os episódios.
    pub fn record_telemetry(&mut self, telemetry: Telemetry) {
        if self.history.len() >= HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(HistoryPoint::from(&telemetry));
        self.current = Some(telemetry);
    }

    /// Registra um evento emitido pelo rastreador de sessão.
    pub fn record_event(&mut self, event: AlertEvent) {
        self.events.push_front(event);
        self.events.truncate(EVENT_LOG_CAPACITY);
        self.total_bad_events += 1;
    }

    /// Zera amostra atual, eventos, histórico e contadores.
    pub fn clear(&mut self) {
        self.current = None;
        self.events.clear();
        self.history.clear();
        self.total_bad_events = 0;
    }

    /// Última amostra aceita, se houver.
    pub fn current(&self) -> Option<&Telemetry> {
        self.current.as_ref()
    }

    /// Até `limit` eventos, do mais recente para o mais antigo.
    pub fn events(&self, limit: usize) -> Vec<AlertEvent> {
        self.events.iter().take(limit).cloned().collect()
    }

    /// Histórico completo em ordem cronológica.
    pub fn history(&self) -> Vec<HistoryPoint> {
        self.history.iter().cloned().collect()
    }

    /// Os últimos `n` pontos do histórico, em ordem cronológica.
    pub fn recent_history(&self, n: usize) -> Vec<HistoryPoint> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Estatísticas relativas à data local atual.
    pub fn statistics(&self) -> Statistics {
        self.statistics_on(Local::now().date_naive())
    }

    /// Estatísticas relativas a uma data arbitrária.
    ///
    /// `bad_events_today` é uma visão: recontado varrendo o log e
    /// comparando a data local de cada evento com `today`. Na virada
    /// de meia-noite a próxima releitura simplesmente conta menos.
    pub fn statistics_on(&self, today: NaiveDate) -> Statistics {
        let bad_events_today = self
            .events
            .iter()
            .filter(|e| e.occurred_at.date_naive() == today)
            .count() as u64;

        Statistics {
            total_bad_events: self.total_bad_events,
            bad_events_today,
            ..Statistics::default()
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
