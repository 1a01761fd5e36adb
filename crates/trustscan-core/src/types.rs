/*!
 * Trustscan Types
 *
 * Tipos comuns usados em toda a workspace Trustscan
 */

use chrono::{DateTime, Utc};
use ethereum_types::{Address, H256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::utils::{format_address, format_h256};

/// Alias para hash de transação
pub type TransactionHash = H256;

/// Classificação de um endereço observado na cadeia. `DeFiProtocol` vem da
/// configuração estática de protocolos e nunca é rebaixada; `Address` é
/// atribuída na primeira observação de um endereço desconhecido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressClassification {
    Unclassified,
    Address,
    DeFiProtocol,
}

impl fmt::Display for AddressClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressClassification::Unclassified => write!(f, "Unclassified"),
            AddressClassification::Address => write!(f, "Address"),
            AddressClassification::DeFiProtocol => write!(f, "DeFiProtocol"),
        }
    }
}

impl FromStr for AddressClassification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unclassified" => Ok(AddressClassification::Unclassified),
            "Address" => Ok(AddressClassification::Address),
            "DeFiProtocol" => Ok(AddressClassification::DeFiProtocol),
            other => Err(Error::DecodeError(format!(
                "classificação desconhecida: {}",
                other
            ))),
        }
    }
}

/// Registro bruto de log de evento entregue pela subscrição do node
#[derive(Debug, Clone)]
pub struct EventLog {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: bytes::Bytes,
    pub transaction_hash: TransactionHash,
    pub block_hash: H256,
    pub block_number: u64,
}

/// Entidade do trust graph (endereço, protocolo, pool, token...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ids: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, serde_json::Value>,
}

impl TrustEntity {
    /// Cria uma entidade vazia do tipo informado
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            name: None,
            ids: HashMap::new(),
            image: None,
            properties: HashMap::new(),
        }
    }

    /// Entidade para um endereço: id e nome na forma canônica, avatar
    /// derivado do próprio endereço
    pub fn for_address(address: Address, classification: AddressClassification) -> Self {
        let canonical = format_address(&address);
        let mut entity = TrustEntity::new(classification.to_string());
        entity.ids.insert("address".to_string(), canonical.clone());
        entity.image = Some(format!("https://effigy.im/a/{}.png", canonical));
        entity.name = Some(canonical);
        entity
    }

    /// Endereço presente nos ids da entidade, se houver
    pub fn address(&self) -> Option<&str> {
        self.ids.get("address").map(String::as_str)
    }
}

/// Relacionamento dirigido entre duas entidades do trust graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustRelationship {
    #[serde(rename = "type")]
    pub relationship_type: String,
    #[serde(rename = "sourceCriteria")]
    pub source_criteria: TrustEntity,
    #[serde(rename = "targetCriteria")]
    pub target_criteria: TrustEntity,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl TrustRelationship {
    /// Tipo de relacionamento emitido pelo pipeline
    pub const INTERACTION: &'static str = "interaction";

    /// Relacionamento `interaction` com as propriedades padrão
    /// {txId, action, timestamp}
    pub fn interaction(
        source: TrustEntity,
        target: TrustEntity,
        tx_hash: &TransactionHash,
        action: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut properties = HashMap::new();
        properties.insert("txId".to_string(), format_h256(tx_hash).into());
        properties.insert("action".to_string(), action.into());
        properties.insert("timestamp".to_string(), timestamp.to_rfc3339().into());
        Self {
            relationship_type: Self::INTERACTION.to_string(),
            source_criteria: source,
            target_criteria: target,
            properties,
        }
    }
}

/// Conjunto atômico de mutações a aplicar no trust graph. As entidades são
/// sempre declaradas (e aplicadas) antes dos relacionamentos que as referem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub entities: Vec<TrustEntity>,
    pub relationships: Vec<TrustRelationship>,
}

impl ChangeSet {
    /// Cria um changeset vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona uma entidade ao changeset
    pub fn add_entity(&mut self, entity: TrustEntity) {
        self.entities.push(entity);
    }

    /// Adiciona um relacionamento ao changeset
    pub fn add_relationship(&mut self, relationship: TrustRelationship) {
        self.relationships.push(relationship);
    }

    /// Indica se o changeset não carrega mutações
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---------------CHANGESET--------------")?;
        for e in &self.entities {
            writeln!(
                f,
                "entidade      {:12} {}",
                e.entity_type,
                e.name.as_deref().unwrap_or("-")
            )?;
        }
        for r in &self.relationships {
            writeln!(
                f,
                "relacionamento {:11} {} -> {}",
                r.relationship_type,
                r.source_criteria.address().unwrap_or("-"),
                r.target_criteria.address().unwrap_or("-"),
            )?;
        }
        write!(f, "---------------/////////--------------")
    }
}

/// Transação normalizada retornada pelo block explorer. `to` ausente indica
/// criação de contrato.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub hash: TransactionHash,
    pub from: Address,
    pub to: Option<Address>,
    pub timestamp: DateTime<Utc>,
}

/// Evento de interação bufferizado pelo agregador por transação
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub block_number: u64,
    pub block_time: DateTime<Utc>,
    pub protocol: String,
    pub action: String,
    pub transaction_hash: TransactionHash,
    pub senders: Vec<Address>,
    pub recipients: Vec<Address>,
}

/// Protocolo DeFi monitorado (Uniswap, Balancer, ...). Os endereços em
/// `filters` alimentam o filtro da subscrição e a seed do cache, mapeados
/// para o rótulo de cada pool/contrato.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, rename = "icon", skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub main_address: String,
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

impl Protocol {
    /// Endereços de filtro do protocolo, já normalizados
    pub fn filter_addresses(&self) -> Vec<Address> {
        self.filters
            .keys()
            .filter_map(|raw| crate::utils::hex_to_address(raw))
            .collect()
    }
}
