use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ethereum_types::{Address, H256};
use std::sync::Arc;

use trustscan_collector::{AddressCache, LogClassifier};
use trustscan_core::error::{Error, Result};
use trustscan_core::traits::BlockResolver;
use trustscan_core::types::{AddressClassification, EventLog};
use trustscan_core::utils::{format_address, hex_to_h256};

const TRANSFER_SIGNATURE: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
const SWAP_SIGNATURE: &str =
    "0xd78ad95fa46c994b6551d0da85fc275fe613ce37657fb8d5e3d130840159d822";

struct FixedResolver {
    pending: bool,
}

impl FixedResolver {
    fn mined() -> Self {
        Self { pending: false }
    }
}

#[async_trait]
impl BlockResolver for FixedResolver {
    async fn block_time(&self, _block_hash: H256) -> Result<DateTime<Utc>> {
        Ok(Utc.timestamp_opt(1_609_459_200, 0).unwrap())
    }

    async fn is_pending(&self, _tx_hash: H256) -> Result<bool> {
        Ok(self.pending)
    }
}

fn topic_for(address: Address) -> H256 {
    let mut bytes = [0u8; 32];
    bytes[12..].copy_from_slice(address.as_bytes());
    H256::from(bytes)
}

fn transfer_log(contract: Address, from: Address, to: Address) -> EventLog {
    EventLog {
        address: contract,
        topics: vec![
            hex_to_h256(TRANSFER_SIGNATURE).unwrap(),
            topic_for(from),
            topic_for(to),
        ],
        data: bytes::Bytes::new(),
        transaction_hash: H256::repeat_byte(0x77),
        block_hash: H256::repeat_byte(0x88),
        block_number: 1,
    }
}

fn cache_with_protocol(address: Address, name: &str) -> Arc<AddressCache> {
    let cache = Arc::new(AddressCache::new());
    cache.put(address, name, AddressClassification::DeFiProtocol);
    cache
}

#[tokio::test]
async fn unknown_signature_is_rejected() {
    let cache = Arc::new(AddressCache::new());
    let classifier = LogClassifier::new(cache, FixedResolver::mined());

    let mut log = transfer_log(
        Address::repeat_byte(0x01),
        Address::repeat_byte(0x02),
        Address::repeat_byte(0x03),
    );
    log.topics[0] = H256::repeat_byte(0xff);

    let err = classifier.classify(&log).await.unwrap_err();
    assert!(matches!(err, Error::UnknownActionSignature(_)));
}

#[tokio::test]
async fn recognized_but_untranslated_action_is_rejected() {
    let cache = Arc::new(AddressCache::new());
    let classifier = LogClassifier::new(cache, FixedResolver::mined());

    let mut log = transfer_log(
        Address::repeat_byte(0x01),
        Address::repeat_byte(0x02),
        Address::repeat_byte(0x03),
    );
    log.topics[0] = hex_to_h256(SWAP_SIGNATURE).unwrap();

    let err = classifier.classify(&log).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedAction(_)));
}

#[tokio::test]
async fn pending_transaction_is_skipped() {
    let cache = Arc::new(AddressCache::new());
    let classifier = LogClassifier::new(cache, FixedResolver { pending: true });

    let log = transfer_log(
        Address::repeat_byte(0x01),
        Address::repeat_byte(0x02),
        Address::repeat_byte(0x03),
    );

    let err = classifier.classify(&log).await.unwrap_err();
    assert!(matches!(err, Error::TransactionPending(_)));
}

#[tokio::test]
async fn zero_address_transfer_is_skipped() {
    let cache = Arc::new(AddressCache::new());
    let classifier = LogClassifier::new(Arc::clone(&cache), FixedResolver::mined());

    let log = transfer_log(
        Address::repeat_byte(0x01),
        Address::zero(),
        Address::repeat_byte(0x03),
    );

    let err = classifier.classify(&log).await.unwrap_err();
    assert!(matches!(err, Error::ZeroAddressSkipped));
}

#[tokio::test]
async fn protocol_to_protocol_transfer_is_skipped() {
    let contract = Address::repeat_byte(0x01);
    let pool_a = Address::repeat_byte(0x02);
    let pool_b = Address::repeat_byte(0x03);

    let cache = cache_with_protocol(contract, "Uniswap");
    cache.put(pool_a, "PoolA", AddressClassification::DeFiProtocol);
    cache.put(pool_b, "PoolB", AddressClassification::DeFiProtocol);

    let classifier = LogClassifier::new(cache, FixedResolver::mined());
    let err = classifier
        .classify(&transfer_log(contract, pool_a, pool_b))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BothPartiesAreProtocols));
}

#[tokio::test]
async fn wallet_pair_emits_two_legs_to_contract() {
    let contract = Address::repeat_byte(0x01);
    let wallet_a = Address::repeat_byte(0x02);
    let wallet_b = Address::repeat_byte(0x03);

    let cache = cache_with_protocol(contract, "Uniswap");
    let classifier = LogClassifier::new(cache, FixedResolver::mined());

    let changeset = classifier
        .classify(&transfer_log(contract, wallet_a, wallet_b))
        .await
        .unwrap();

    // as duas carteiras são novas; o contrato já estava registrado
    assert_eq!(changeset.entities.len(), 2);
    assert_eq!(changeset.relationships.len(), 2);
    for relationship in &changeset.relationships {
        assert_eq!(relationship.relationship_type, "interaction");
        assert_eq!(
            relationship.target_criteria.address(),
            Some(format_address(&contract).as_str())
        );
    }
    let sources: Vec<_> = changeset
        .relationships
        .iter()
        .filter_map(|r| r.source_criteria.address().map(str::to_string))
        .collect();
    assert!(sources.contains(&format_address(&wallet_a)));
    assert!(sources.contains(&format_address(&wallet_b)));
}

#[tokio::test]
async fn mixed_pair_is_oriented_wallet_to_protocol() {
    let contract = Address::repeat_byte(0x01);
    let pool = Address::repeat_byte(0x02);
    let wallet = Address::repeat_byte(0x03);

    let cache = cache_with_protocol(contract, "Uniswap");
    cache.put(pool, "Pool", AddressClassification::DeFiProtocol);
    let classifier = LogClassifier::new(Arc::clone(&cache), FixedResolver::mined());

    // carteira como remetente on-chain
    let outbound = classifier
        .classify(&transfer_log(contract, wallet, pool))
        .await
        .unwrap();
    assert_eq!(outbound.relationships.len(), 1);
    assert_eq!(
        outbound.relationships[0].source_criteria.address(),
        Some(format_address(&wallet).as_str())
    );
    assert_eq!(
        outbound.relationships[0].target_criteria.address(),
        Some(format_address(&pool).as_str())
    );

    // carteira como destinatária on-chain: a orientação não muda
    let inbound = classifier
        .classify(&transfer_log(contract, pool, wallet))
        .await
        .unwrap();
    assert_eq!(inbound.relationships.len(), 1);
    assert_eq!(
        inbound.relationships[0].source_criteria.address(),
        Some(format_address(&wallet).as_str())
    );
    assert_eq!(
        inbound.relationships[0].target_criteria.address(),
        Some(format_address(&pool).as_str())
    );
}

#[tokio::test]
async fn new_entities_use_canonical_lowercase_ids() {
    let contract = Address::repeat_byte(0xab);
    let cache = Arc::new(AddressCache::new());
    let classifier = LogClassifier::new(cache, FixedResolver::mined());

    let changeset = classifier
        .classify(&transfer_log(
            contract,
            Address::repeat_byte(0xcd),
            Address::repeat_byte(0xef),
        ))
        .await
        .unwrap();

    // contrato desconhecido também entra como entidade nova
    assert_eq!(changeset.entities.len(), 3);
    for entity in &changeset.entities {
        let id = entity.address().unwrap();
        assert_eq!(id, id.to_lowercase());
        assert!(id.starts_with("0x"));
        assert_eq!(id.len(), 42);
    }
}

#[tokio::test]
async fn relationship_carries_standard_properties() {
    let contract = Address::repeat_byte(0x01);
    let cache = cache_with_protocol(contract, "Uniswap");
    let classifier = LogClassifier::new(cache, FixedResolver::mined());

    let changeset = classifier
        .classify(&transfer_log(
            contract,
            Address::repeat_byte(0x02),
            Address::repeat_byte(0x03),
        ))
        .await
        .unwrap();

    let properties = &changeset.relationships[0].properties;
    assert_eq!(
        properties.get("txId").and_then(|v| v.as_str()),
        Some(format!("0x{:x}", H256::repeat_byte(0x77)).as_str())
    );
    assert_eq!(properties.get("action").and_then(|v| v.as_str()), Some("Transfer"));
    assert!(properties.contains_key("timestamp"));
}
