/*!
 * Trustscan Utils
 *
 * Utilitários comuns usados em toda a workspace Trustscan
 */

use chrono::{DateTime, TimeZone, Utc};
use ethereum_types::{Address, H256};
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

/// Converte uma string hexadecimal para Address
pub fn hex_to_address(hex: &str) -> Option<Address> {
    let hex_str = if hex.starts_with("0x") { &hex[2..] } else { hex };
    Address::from_str(hex_str).ok()
}

/// Converte uma string hexadecimal para H256
pub fn hex_to_h256(hex: &str) -> Option<H256> {
    let hex_str = if hex.starts_with("0x") { &hex[2..] } else { hex };
    H256::from_str(hex_str).ok()
}

/// Forma canônica de um endereço: hexadecimal minúsculo com prefixo `0x`.
/// Toda emissão textual de endereço da workspace passa por aqui.
pub fn format_address(address: &Address) -> String {
    format!("0x{:x}", address)
}

/// Formata um H256 para exibição
pub fn format_h256(hash: &H256) -> String {
    format!("0x{:x}", hash)
}

/// Calcula o hash Keccak-256 de dados
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut result = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut result);
    result
}

/// Representação EIP-55 de um endereço, a outra forma textual em circulação.
/// Usada apenas para normalização na entrada; a forma canônica é a minúscula.
pub fn checksum_address(address: &Address) -> String {
    let lower = format!("{:x}", address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Endereço embutido nos últimos 20 bytes de um tópico de evento
pub fn address_from_topic(topic: &H256) -> Address {
    Address::from_slice(&topic.as_bytes()[12..])
}

/// Converte um timestamp unix em string decimal para DateTime
pub fn parse_unix_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let secs = value.trim().parse::<i64>().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

/// Link do etherscan para uma transação
pub fn etherscan_tx_link(hash: &H256) -> String {
    format!("https://etherscan.io/tx/{}", format_h256(hash))
}

/// Link do etherscan para um endereço
pub fn etherscan_address_link(address: &Address) -> String {
    format!("https://etherscan.io/address/{}", format_address(address))
}

/// Link do etherscan para um bloco
pub fn etherscan_block_link(number: u64) -> String {
    format!("https://etherscan.io/blocks/{}", number)
}
