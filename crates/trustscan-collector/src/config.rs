use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use trustscan_core::error::{Error, Result};
use trustscan_explorer::ExplorerConfig;
use trustscan_trustapi::TrustApiConfig;

/// Configuração do node Ethereum
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EthereumConfig {
    /// Endpoint WebSocket do node para a subscrição de logs
    pub wss_url: String,
}

/// Configuração do pipeline do collector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Arquivo descritor dos protocolos monitorados
    pub protocols_file: String,
    /// Profundidade máxima da varredura de carteiras
    pub max_scan_depth: usize,
    /// Janela de agregação por transação, em segundos
    pub aggregation_window_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            protocols_file: "protocols.json".to_string(),
            max_scan_depth: crate::walker::DEFAULT_MAX_DEPTH,
            aggregation_window_secs: 5,
        }
    }
}

/// Configuração geral do serviço
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ethereum: EthereumConfig,
    pub explorer: ExplorerConfig,
    pub trust_api: TrustApiConfig,
    pub collector: CollectorConfig,
}

impl Config {
    /// Carrega a configuração de um arquivo JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("falha ao ler {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigError(format!("configuração inválida: {}", e)))
    }

    /// Valida os campos obrigatórios, acumulando as ausências
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.ethereum.wss_url.is_empty() {
            missing.push("ethereum.wss_url");
        }
        if self.explorer.api_token.is_empty() {
            missing.push("explorer.api_token");
        }
        if self.trust_api.url.is_empty() {
            missing.push("trust_api.url");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigError(format!(
                "configuração incompleta: {}",
                missing.join(", ")
            )))
        }
    }
}
