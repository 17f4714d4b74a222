//! # Postura Monitor
//!
//! Daemon de ingestão da telemetria do cinturão de postura. Lê as
//! amostras da serial Bluetooth ou dos datagramas UDP da bridge,
//! detecta episódios de má postura e publica snapshots consistentes
//! (amostra atual, eventos, histórico, estatísticas) para a camada
//! HTTP externa consumir.
//!
//! ## Uso
//! ```bash
//! postura_monitor        # transporte conforme config.toml
//! RUST_LOG=debug postura_monitor
//! ```

mod ingest;
mod serial_source;
mod snapshot;
mod transport;
mod udp_source;

use ingest::IngestWorker;
use postura_core::config::AppConfig;
use postura_core::store::{EVENT_READ_LIMIT, HISTORY_CHART_POINTS};
use serial_source::SerialSource;
use snapshot::MonitorHandle;
use std::time::Duration;
use tracing::{info, warn};
use udp_source::UdpSource;

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

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    for error in config.validate() {
        warn!("Config: {error}");
    }

    let monitor_cfg = &config.monitor;
    let backoff = Duration::from_secs_f64(monitor_cfg.reconnect_backoff_secs.max(0.1));
    let status_interval = Duration::from_secs_f64(monitor_cfg.status_interval_secs.max(1.0));

    // ── Pipeline de ingestão ──
    let monitor = MonitorHandle::new();

    let source_label;
    let _worker = match monitor_cfg.transport.as_str() {
        "serial" => {
            source_label = format!("serial {}", monitor_cfg.serial_device);
            IngestWorker::spawn(
                SerialSource::new(monitor_cfg.serial_device.clone()),
                monitor.clone(),
                backoff,
            )
        }
        _ => {
            source_label = format!("udp 0.0.0.0:{}", monitor_cfg.udp_port);
            IngestWorker::spawn(
                UdpSource::new(monitor_cfg.udp_port, monitor_cfg.source_ip.clone()),
                monitor.clone(),
                backoff,
            )
        }
    };

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   🏃 POSTURA MONITOR – ATIVO (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  Fonte:     {source_label}");
    println!("  Backoff:   {:.1}s", monitor_cfg.reconnect_backoff_secs);
    println!("══════════════════════════════════════════════");
    println!();

    info!("Esperando dados do cinturão...");

    // ── Loop de status ──
    // A API de leitura fica disponível pelo handle; aqui só resumimos
    // periodicamente o estado para o log.
    loop {
        std::thread::sleep(status_interval);

        let status = monitor.status();
        let stats = monitor.statistics();
        info!(
            "Status: conectado={} | episódio ativo={} | episódios total={} hoje={} | eventos={} | histórico={} (gráfico usa {})",
            status.connected,
            status.episode_active,
            stats.total_bad_events,
            stats.bad_events_today,
            monitor.events(EVENT_READ_LIMIT).len(),
            monitor.history().len(),
            monitor.recent_history(HISTORY_CHART_POINTS).len(),
        );
    }
}
