//! Varre o histórico de uma carteira e imprime os changesets que seriam
//! publicados no trust graph.
//!
//! Uso: `cargo run --example scan_wallet -- 0xENDERECO`

use anyhow::Context;
use std::sync::Arc;

use trustscan_collector::protocols::load_protocols;
use trustscan_collector::{changeset_channel, AddressCache, Config, GraphWalker};
use trustscan_core::utils::hex_to_address;
use trustscan_explorer::EtherscanClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let raw = std::env::args().nth(1).context("uso: scan_wallet 0xENDERECO")?;
    let root = hex_to_address(&raw).context("endereço inválido")?;

    let config = Config::load("config.json").unwrap_or_default();
    let cache = Arc::new(AddressCache::new());
    if let Ok(protocols) = load_protocols(&config.collector.protocols_file) {
        cache.seed_protocols(&protocols);
    }

    let (changesets, mut queue) = changeset_channel();
    let explorer = EtherscanClient::new(config.explorer.clone())?;
    let walker = GraphWalker::new(
        Arc::clone(&cache),
        explorer,
        changesets,
        config.collector.max_scan_depth,
    );
    walker.walk(root).await;
    drop(walker);

    while let Some(changeset) = queue.recv().await {
        println!("{}", changeset);
    }
    Ok(())
}
