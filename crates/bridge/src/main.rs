//! # Postura Bridge
//!
//! Ponte entre o cinturão e o monitor: lê registros delimitados por
//! nova linha da serial Bluetooth (ex.: `/dev/rfcomm0`) e repassa cada
//! linha como um datagrama UDP para o monitor. Mesma política de
//! reconexão do monitor: tentar para sempre, backoff fixo.
//!
//! ## Uso
//! ```bash
//! postura_bridge         # serial e destino conforme config.toml
//! ```

use postura_core::config::AppConfig;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::UdpSocket;
use std::time::Duration;
use tracing::{debug, error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let bridge_cfg = &config.bridge;
    let dest_addr = format!("{}:{}", bridge_cfg.dest_ip, bridge_cfg.port);
    let backoff = Duration::from_secs_f64(bridge_cfg.reconnect_backoff_secs.max(0.1));

    // ── Socket UDP ──
    let sock = UdpSocket::bind("0.0.0.0:0").expect("Falha ao criar socket UDP");

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   📡 POSTURA BRIDGE – ATIVO (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  Serial:    {}", bridge_cfg.serial_device);
    println!("  Destino:   {dest_addr}");
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    loop {
        match File::open(&bridge_cfg.serial_device) {
            Ok(file) => {
                info!("Serial aberta: {}", bridge_cfg.serial_device);
                forward_lines(file, &sock, &dest_addr);
                warn!("Fluxo serial encerrado");
            }
            Err(e) => {
                error!("Falha ao abrir {}: {e}", bridge_cfg.serial_device);
            }
        }

        info!(
            "Nova tentativa em {:.0}s",
            bridge_cfg.reconnect_backoff_secs
        );
        std::thread::sleep(backoff);
    }
}

/// Repassa cada linha não vazia como um datagrama, até a serial cair.
///
/// As linhas são bytes opacos: a bridge não valida UTF-8 nem JSON, só
/// repassa; quem rejeita mensagem malformada é o decoder do monitor.
fn forward_lines(file: File, sock: &UdpSocket, dest_addr: &str) {
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            // EOF: o cinturão fechou a ponta dele
            Ok(0) => return,
            Ok(_) => {
                let payload = line.trim_ascii();
                if payload.is_empty() {
                    continue;
                }
                match sock.send_to(payload, dest_addr) {
                    Ok(sent) => debug!("→ {sent} bytes para {dest_addr}"),
                    Err(e) => error!("Erro ao enviar UDP: {e}"),
                }
            }
            Err(e) => {
                warn!("Erro de leitura serial: {e}");
                return;
            }
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
