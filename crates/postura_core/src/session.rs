//! Máquina de estados de sessão de alerta.
//!
//! Converte o sinal booleano "alguma leitura em má postura" em
//! episódios discretos: um [`AlertEvent`] por borda de subida do sinal
//! geral, nenhum durante o episódio sustentado e nenhum na borda de
//! descida. Evita inundar o log com um evento por amostra enquanto a
//! postura ruim persiste.

use crate::types::{AlertEvent, Telemetry};

/// Rastreador de episódios. Uma instância por processo.
///
/// Dois estados: ocioso (sem episódio ativo) e em episódio (evento já
/// emitido, repetições suprimidas).
#[derive(Debug, Default)]
pub struct SessionTracker {
    in_episode: bool,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processa uma amostra aceita e devolve no máximo um evento.
    ///
    /// O conjunto de sensores afetados é fotografado no instante da
    /// borda de subida; sensores que entrarem em alerta depois, dentro
    /// do mesmo episódio, não atualizam o evento.
    pub fn observe(&mut self, telemetry: &Telemetry) -> Option<AlertEvent> {
        let bad = telemetry.any_bad_posture();

        match (self.in_episode, bad) {
            // Borda de subida: abre o episódio e emite
            (false, true) => {
                self.in_episode = true;
                Some(AlertEvent {
                    occurred_at: telemetry.captured_at,
                    affected: telemetry.alerting_sensors(),
                })
            }
            // Borda de descida: fecha o episódio em silêncio
            (true, false) => {
                self.in_episode = false;
                None
            }
            // Sustentado ou ocioso: nada a fazer
            _ => None,
        }
    }

    /// Episódio em andamento?
    pub fn episode_active(&self) -> bool {
        self.in_episode
    }

    /// Volta ao estado ocioso. Chamado pelo clear do store para que a
    /// próxima amostra ruim dispare um evento novo imediatamente.
    pub fn reset(&mut self) {
        self.in_episode = false;
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
