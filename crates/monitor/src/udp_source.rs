//! Fonte UDP: cada datagrama vindo da bridge é uma mensagem.
//!
//! Faz as vezes da assinatura no broker da versão original; o monitor
//! só precisa de "uma fonte de registros reconectável".

use crate::transport::{TransportError, TransportSource};
use std::net::UdpSocket;
use std::time::Duration;
use tracing::debug;

/// Timeout de leitura: transforma o recv bloqueante em ticks
/// periódicos para o loop de ingestão poder checar a parada.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

pub struct UdpSource {
    port: u16,
    /// IP de origem aceito (vazio = qualquer)
    source_filter: String,
    sock: Option<UdpSocket>,
    buf: Vec<u8>,
}

impl UdpSource {
    pub fn new(port: u16, source_filter: impl Into<String>) -> Self {
        Self {
            port,
            source_filter: source_filter.into(),
            sock: None,
            buf: vec![0u8; 65536],
        }
    }

    /// Porta efetiva depois do bind (útil com porta 0 nos testes).
    pub fn local_port(&self) -> Option<u16> {
        self.sock
            .as_ref()
            .and_then(|s| s.local_addr().ok())
            .map(|a| a.port())
    }
}

impl TransportSource for UdpSource {
    fn describe(&self) -> String {
        format!("udp 0.0.0.0:{}", self.port)
    }

    fn connect(&mut self) -> Result<(), TransportError> {
        let sock =
            UdpSocket::bind(format!("0.0.0.0:{}", self.port)).map_err(TransportError::Open)?;
        sock.set_read_timeout(Some(READ_TIMEOUT))
            .map_err(TransportError::Open)?;
        self.sock = Some(sock);
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let sock = self.sock.as_ref().ok_or(TransportError::Eof)?;

        match sock.recv_from(&mut self.buf) {
            Ok((size, addr)) => {
                let source = addr.ip().to_string();
                if !self.source_filter.is_empty() && source != self.source_filter {
                    debug!(
                        "Ignorando datagrama de {source} (esperado: {})",
                        self.source_filter
                    );
                    return Ok(None);
                }
                Ok(Some(self.buf[..size].to_vec()))
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                // Timeout normal, tick silencioso
                Ok(None)
            }
            Err(e) => Err(TransportError::Read(e)),
        }
    }

    fn close(&mut self) {
        self.sock = None;
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receives_datagram_as_one_message() {
        let mut src = UdpSource::new(0, "");
        src.connect().unwrap();
        let port = src.local_port().unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"hola", ("127.0.0.1", port)).unwrap();

        assert_eq!(src.read_next().unwrap(), Some(b"hola".to_vec()));
    }

    #[test]
    fn filters_unexpected_source_ip() {
        let mut src = UdpSource::new(0, "10.9.9.9");
        src.connect().unwrap();
        let port = src.local_port().unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"spoof", ("127.0.0.1", port)).unwrap();

        // Datagrama de origem errada vira tick silencioso
        assert_eq!(src.read_next().unwrap(), None);
    }

    #[test]
    fn read_after_close_reports_eof() {
        let mut src = UdpSource::new(0, "");
        src.connect().unwrap();
        src.close();
        assert!(matches!(src.read_next(), Err(TransportError::Eof)));
    }
}
