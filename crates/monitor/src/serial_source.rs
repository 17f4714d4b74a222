//! Fonte serial: lê registros delimitados por nova linha direto do
//! dispositivo Bluetooth (ex.: `/dev/rfcomm0`).
//!
//! O tty deve estar configurado (baud etc.) antes do monitor subir; o
//! RFCOMM já entrega a stream pronta para leitura. As linhas são
//! repassadas como bytes opacos: validação UTF-8 é assunto do decoder,
//! uma linha malformada custa só aquela mensagem, nunca a conexão.

use crate::transport::{TransportError, TransportSource};
use std::fs::File;
use std::io::{BufRead, BufReader};

pub struct SerialSource {
    device: String,
    reader: Option<BufReader<File>>,
}

impl SerialSource {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            reader: None,
        }
    }
}

impl TransportSource for SerialSource {
    fn describe(&self) -> String {
        format!("serial {}", self.device)
    }

    fn connect(&mut self) -> Result<(), TransportError> {
        let file = File::open(&self.device).map_err(TransportError::Open)?;
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let reader = self.reader.as_mut().ok_or(TransportError::Eof)?;

        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line) {
            // EOF: o dispositivo fechou a ponta dele
            Ok(0) => Err(TransportError::Eof),
            Ok(_) => {
                let trimmed = line.trim_ascii();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                Ok(Some(trimmed.to_vec()))
            }
            Err(e) => Err(TransportError::Read(e)),
        }
    }

    fn close(&mut self) {
        // Dropa o descritor; chamadas repetidas não têm efeito
        self.reader = None;
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
