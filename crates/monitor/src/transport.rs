//! Abstração do transporte de entrada.
//!
//! As duas variantes (serial Bluetooth e datagramas UDP vindos da
//! bridge) são implementações alternativas da mesma capacidade
//! `{connect, read_next, close}`; o resto do pipeline é agnóstico ao
//! transporte.

use std::io;

/// Erros de nível de conexão. Diferente de um erro de decodificação:
/// qualquer um destes derruba o estado para Desconectado e dispara a
/// reconexão com backoff fixo.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("falha ao abrir o transporte: {0}")]
    Open(#[source] io::Error),

    #[error("falha de leitura: {0}")]
    Read(#[source] io::Error),

    #[error("fluxo encerrado pelo dispositivo")]
    Eof,
}

/// Fonte de mensagens cruas do cinturão.
pub trait TransportSource {
    /// Nome curto da fonte para logs.
    fn describe(&self) -> String;

    /// Abre a conexão. Em caso de erro o chamador espera o backoff e
    /// tenta de novo, indefinidamente.
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Próxima mensagem crua. `Ok(None)` é um tick silencioso (timeout
    /// de leitura, datagrama filtrado); `Err` derruba a conexão.
    fn read_next(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Libera o handle. Deve ser chamado em toda saída do estado de
    /// streaming, inclusive nas de erro; chamadas repetidas são inócuas.
    fn close(&mut self);
}
