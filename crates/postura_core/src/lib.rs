//! # Postura Core
//!
//! Crate compartilhada do monitor de postura: tipos de telemetria do
//! cinturão, decodificação do formato de fio (JSON UTF-8), máquina de
//! estados de sessão de alerta, store agregado com capacidade fixa e
//! configuração TOML.
//!
//! ## Módulos
//! - [`types`] – Structs de telemetria (leituras, eventos, histórico…)
//! - [`wire`] – Decodificação das amostras JSON do cinturão
//! - [`session`] – Máquina de estados "um alerta por episódio"
//! - [`store`] – Histórico, log de eventos e estatísticas em memória
//! - [`config`] – Configuração unificada via TOML

pub mod types;
pub mod wire;
pub mod session;
pub mod store;
pub mod config;

// Re-exports convenientes
pub use types::{AlertEvent, HistoryPoint, SensorKind, SensorReading, Statistics, Telemetry};
pub use wire::{decode_sample, DecodeError};
pub use session::SessionTracker;
pub use store::AggregateStore;
pub use config::{AppConfig, BridgeConfig, MonitorConfig};
