//! Decodificação do formato de fio do cinturão.
//!
//! Cada amostra é um registro JSON UTF-8 com três objetos aninhados,
//! um por sensor:
//!
//! ```text
//! {"lumbar":{"angulo":12.5,"malaPostura":false},
//!  "toracico":{"angulo":8.0,"malaPostura":true},
//!  "hombro":{"angulo":3.2,"malaPostura":false}}
//! ```
//!
//! A variante via broker usa `alerta` no lugar de `malaPostura`; os
//! dois nomes são tratados como o mesmo campo lógico (alias serde).
//! Falhas de decodificação não são fatais para o pipeline: a mensagem
//! é descartada e a amostra aceita anterior continua sendo a "atual".

use crate::types::{SensorReading, Telemetry};
use chrono::{DateTime, Local};
use serde::Deserialize;

/// Erros de decodificação de uma amostra.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("registro malformado: {0}")]
    MalformedEncoding(String),

    #[error("campo obrigatório ausente ou inválido: {0}")]
    MissingField(String),
}

/// Forma da amostra no fio, sem timestamp (o firmware não envia um).
#[derive(Debug, Deserialize)]
struct WireSample {
    lumbar: SensorReading,
    toracico: SensorReading,
    hombro: SensorReading,
}

/// Decodifica uma amostra crua em [`Telemetry`].
///
/// Função pura: o instante de aceitação é carimbado pelo chamador
/// (o leitor de transporte), não lido do relógio aqui.
pub fn decode_sample(raw: &[u8], captured_at: DateTime<Local>) -> Result<Telemetry, DecodeError> {
    let sample: WireSample = serde_json::from_slice(raw).map_err(classify)?;

    Ok(Telemetry {
        lumbar: sample.lumbar,
        thoracic: sample.toracico,
        shoulder: sample.hombro,
        captured_at,
    })
}

/// Classifica o erro do serde_json na taxonomia do decoder: erros de
/// sintaxe/EOF são encoding malformado; erros de dados (campo ausente,
/// tipo errado) são campo faltante.
fn classify(e: serde_json::Error) -> DecodeError {
    use serde_json::error::Category;
    match e.classify() {
        Category::Data => DecodeError::MissingField(e.to_string()),
        _ => DecodeError::MalformedEncoding(e.to_string()),
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
