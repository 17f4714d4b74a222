//! Configuração unificada via TOML.
//!
//! Um único `config.toml` cobre o monitor e a bridge serial.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuração do Monitor (daemon de ingestão).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Transporte de entrada: "udp" ou "serial"
    pub transport: String,
    /// Porta UDP para escutar (variante broker/bridge)
    pub udp_port: u16,
    /// IP de origem aceito (vazio = qualquer)
    pub source_ip: String,
    /// Dispositivo serial (variante Bluetooth direto)
    pub serial_device: String,
    /// Intervalo fixo entre tentativas de reconexão (segundos)
    pub reconnect_backoff_secs: f64,
    /// Intervalo do log periódico de status (segundos)
    pub status_interval_secs: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            transport: "udp".into(),
            udp_port: 5005,
            source_ip: String::new(),
            serial_device: "/dev/rfcomm0".into(),
            reconnect_backoff_secs: 5.0,
            status_interval_secs: 30.0,
        }
    }
}

/// Configuração da Bridge (serial Bluetooth → UDP).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Dispositivo serial do cinturão
    pub serial_device: String,
    /// IP de destino (o monitor)
    pub dest_ip: String,
    /// Porta UDP de destino
    pub port: u16,
    /// Intervalo fixo entre tentativas de reabrir a serial (segundos)
    pub reconnect_backoff_secs: f64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            serial_device: "/dev/rfcomm0".into(),
            dest_ip: "127.0.0.1".into(),
            port: 5005,
            reconnect_backoff_secs: 5.0,
        }
    }
}

/// Configuração raiz do aplicativo (unifica monitor e bridge).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub bridge: BridgeConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match self.monitor.transport.as_str() {
            "udp" | "serial" => {}
            other => errors.push(format!("Transporte desconhecido: {other:?} (udp|serial)")),
        }
        if self.monitor.udp_port == 0 {
            errors.push("Porta UDP do monitor não pode ser 0".into());
        }
        if self.monitor.transport == "serial" && self.monitor.serial_device.is_empty() {
            errors.push("Dispositivo serial do monitor não configurado".into());
        }
        if self.monitor.reconnect_backoff_secs <= 0.0 {
            errors.push(format!(
                "Backoff de reconexão inválido: {}",
                self.monitor.reconnect_backoff_secs
            ));
        }
        if self.bridge.port == 0 {
            errors.push("Porta da bridge não pode ser 0".into());
        }
        if self.bridge.serial_device.is_empty() {
            errors.push("Dispositivo serial da bridge não configurado".into());
        }

        errors
    }
}
