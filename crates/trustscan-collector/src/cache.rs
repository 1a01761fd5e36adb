use ethereum_types::Address;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::warn;

use trustscan_core::types::{AddressClassification, Protocol};
use trustscan_core::utils::{format_address, hex_to_address};

/// Entrada do cache: rótulo de exibição e marcação de protocolo
#[derive(Debug, Clone)]
struct CacheEntry {
    label: String,
    protocol: bool,
}

impl CacheEntry {
    fn classification(&self) -> AddressClassification {
        if self.protocol {
            AddressClassification::DeFiProtocol
        } else {
            AddressClassification::Address
        }
    }
}

/// Cache concorrente de classificação de endereços, chaveado pela forma
/// canônica. Sem eviction nem TTL: as entradas vivem pelo tempo do processo.
pub struct AddressCache {
    entries: RwLock<HashMap<Address, CacheEntry>>,
}

impl AddressCache {
    /// Cria um cache vazio
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registra um endereço. A marcação `DeFiProtocol` é autoritativa: uma
    /// gravação posterior como `Address` não a rebaixa.
    pub fn put(&self, address: Address, label: &str, classification: AddressClassification) {
        let mut entries = self.entries.write();
        let entry = entries.entry(address).or_insert_with(|| CacheEntry {
            label: String::new(),
            protocol: false,
        });
        entry.label = label.to_string();
        if classification == AddressClassification::DeFiProtocol {
            entry.protocol = true;
        }
    }

    /// Consulta o rótulo e a classificação de um endereço
    pub fn get(&self, address: Address) -> Option<(String, AddressClassification)> {
        let entries = self.entries.read();
        entries
            .get(&address)
            .map(|entry| (entry.label.clone(), entry.classification()))
    }

    /// Classifica um endereço, registrando-o como `Address` na primeira
    /// observação. Retorna a classificação vigente e se o endereço é novo.
    pub fn classify(&self, address: Address) -> (AddressClassification, bool) {
        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(&address) {
                return (entry.classification(), false);
            }
        }
        let mut entries = self.entries.write();
        match entries.entry(address) {
            Entry::Occupied(entry) => (entry.get().classification(), false),
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry {
                    label: format_address(&address),
                    protocol: false,
                });
                (AddressClassification::Address, true)
            }
        }
    }

    /// Registra os endereços de filtro dos protocolos configurados como
    /// `DeFiProtocol`. Retorna quantos endereços foram registrados.
    pub fn seed_protocols(&self, protocols: &[Protocol]) -> usize {
        let mut seeded = 0;
        for protocol in protocols {
            for (raw, label) in &protocol.filters {
                let Some(address) = hex_to_address(raw) else {
                    warn!(protocol = %protocol.name, raw, "endereço de filtro inválido");
                    continue;
                };
                let label = if label.is_empty() { &protocol.name } else { label };
                self.put(address, label, AddressClassification::DeFiProtocol);
                seeded += 1;
            }
        }
        seeded
    }

    /// Quantidade de endereços registrados
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Indica se o cache está vazio
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for AddressCache {
    fn default() -> Self {
        Self::new()
    }
}
