use ethereum_types::Address;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use trustscan_core::error::{Error, Result};
use trustscan_core::types::Protocol;

/// Formato do arquivo descritor de protocolos (protocols.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolsFile {
    #[serde(default)]
    pub defi_protocols: Vec<Protocol>,
}

/// Lê a lista de protocolos monitorados do arquivo descritor
pub fn load_protocols(path: impl AsRef<Path>) -> Result<Vec<Protocol>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("falha ao ler {}: {}", path.display(), e)))?;
    let file: ProtocolsFile = serde_json::from_str(&raw)
        .map_err(|e| Error::ConfigError(format!("descritor de protocolos inválido: {}", e)))?;
    Ok(file.defi_protocols)
}

/// Endereços de filtro de todos os protocolos, para montar a subscrição
pub fn filter_addresses(protocols: &[Protocol]) -> Vec<Address> {
    protocols
        .iter()
        .flat_map(|protocol| protocol.filter_addresses())
        .collect()
}
