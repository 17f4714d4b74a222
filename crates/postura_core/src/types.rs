//! Definição de tipos/structs da telemetria de postura.
//!
//! Porta direta do dicionário JSON que o cinturão (ESP32) publica.
//! Os nomes de campo no fio permanecem em espanhol (`angulo`,
//! `malaPostura`/`alerta`, `toracico`, `hombro`) para compatibilidade
//! com o firmware; os identificadores Rust usam os nomes em inglês.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Leitura de um sensor
// ──────────────────────────────────────────────

/// Estado instantâneo de um sensor do cinturão.
///
/// `malaPostura` e `alerta` são o mesmo campo lógico; o nome varia
/// conforme a variante de transporte (serial vs. broker).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    /// Ângulo medido (graus)
    #[serde(rename = "angulo")]
    pub angle: f32,
    /// Flag de postura fora da faixa
    #[serde(rename = "malaPostura", alias = "alerta")]
    pub bad_posture: bool,
}

// ──────────────────────────────────────────────
// Identificação dos sensores
// ──────────────────────────────────────────────

/// Posição de um sensor no cinturão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    Lumbar,
    Thoracic,
    Shoulder,
}

impl SensorKind {
    /// Rótulo exibido ao usuário (mesmos rótulos do firmware).
    pub fn label(self) -> &'static str {
        match self {
            SensorKind::Lumbar => "Lumbar",
            SensorKind::Thoracic => "Torácico",
            SensorKind::Shoulder => "Hombro",
        }
    }
}

// ──────────────────────────────────────────────
// Amostra completa
// ──────────────────────────────────────────────

/// Uma amostra completa do dispositivo: três leituras nomeadas mais o
/// instante de aceitação. Imutável depois de construída.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Telemetry {
    pub lumbar: SensorReading,
    #[serde(rename = "toracico")]
    pub thoracic: SensorReading,
    #[serde(rename = "hombro")]
    pub shoulder: SensorReading,
    /// Instante em que a amostra foi aceita pelo pipeline.
    pub captured_at: DateTime<Local>,
}

impl Telemetry {
    /// Sinal geral de alerta: OR das três flags por sensor.
    pub fn any_bad_posture(&self) -> bool {
        self.lumbar.bad_posture || self.thoracic.bad_posture || self.shoulder.bad_posture
    }

    /// Sensores atualmente em alerta, em ordem fixa lumbar → torácico → ombro.
    pub fn alerting_sensors(&self) -> Vec<SensorKind> {
        let mut out = Vec::new();
        if self.lumbar.bad_posture {
            out.push(SensorKind::Lumbar);
        }
        if self.thoracic.bad_posture {
            out.push(SensorKind::Thoracic);
        }
        if self.shoulder.bad_posture {
            out.push(SensorKind::Shoulder);
        }
        out
    }
}

// ──────────────────────────────────────────────
// Evento de alerta
// ──────────────────────────────────────────────

/// Registro do início de um episódio de má postura.
///
/// Criado exatamente uma vez por episódio (borda de subida do sinal
/// geral); o conjunto de sensores é fotografado nesse instante e não é
/// atualizado se outros sensores entrarem em alerta durante o episódio.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertEvent {
    pub occurred_at: DateTime<Local>,
    /// Sensores em alerta na borda de subida. Nunca vazio.
    pub affected: Vec<SensorKind>,
}

impl AlertEvent {
    /// Rótulos dos sensores afetados separados por vírgula
    /// (ex.: "Lumbar, Torácico"), como o dashboard original exibia.
    pub fn affected_labels(&self) -> String {
        self.affected
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ──────────────────────────────────────────────
// Ponto de histórico
// ──────────────────────────────────────────────

/// Uma amostra aceita, achatada para consumo em série temporal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryPoint {
    pub captured_at: DateTime<Local>,
    /// Sinal geral (OR dos três sensores)
    pub bad_posture: bool,
    pub lumbar_bad: bool,
    pub thoracic_bad: bool,
    pub shoulder_bad: bool,
    pub lumbar_angle: f32,
    pub thoracic_angle: f32,
    pub shoulder_angle: f32,
}

impl From<&Telemetry> for HistoryPoint {
    fn from(t: &Telemetry) -> Self {
        Self {
            captured_at: t.captured_at,
            bad_posture: t.any_bad_posture(),
            lumbar_bad: t.lumbar.bad_posture,
            thoracic_bad: t.thoracic.bad_posture,
            shoulder_bad: t.shoulder.bad_posture,
            lumbar_angle: t.lumbar.angle,
            thoracic_angle: t.thoracic.angle,
            shoulder_angle: t.shoulder.angle,
        }
    }
}

// ──────────────────────────────────────────────
// Estatísticas
// ──────────────────────────────────────────────

/// Agregado derivado do log de eventos.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Statistics {
    /// Total de episódios desde o início (ou desde o último clear)
    pub total_bad_events: u64,
    /// Episódios cuja data local é a data de hoje; sempre recomputado
    /// varrendo o log, nunca armazenado em separado.
    pub bad_events_today: u64,
    /// Campo herdado do sistema original: declarado, fixo em 100,
    /// nunca derivado dos dados.
    pub good_percentage: f32,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            total_bad_events: 0,
            bad_events_today: 0,
            good_percentage: 100.0,
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
