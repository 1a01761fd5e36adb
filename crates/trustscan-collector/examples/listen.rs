//! Serviço completo: subscrição de logs, consumidor de changesets e
//! varredura de carteiras.
//!
//! Uso: `cargo run --example listen -- config.json`

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use trustscan_collector::protocols::load_protocols;
use trustscan_collector::{
    changeset_channel, listener, AddressCache, ChangeSetSink, Config, GraphWalker, ScanService,
    TransactionAggregator,
};
use trustscan_explorer::EtherscanClient;
use trustscan_trustapi::TrustApiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&config_path).context("falha ao carregar a configuração")?;
    config.validate()?;

    let protocols = load_protocols(&config.collector.protocols_file)?;
    let cache = Arc::new(AddressCache::new());

    // consumidor único de changesets
    let (changesets, queue) = changeset_channel();
    let trust_client = TrustApiClient::new(config.trust_api.clone())?;
    let sink = ChangeSetSink::new(Arc::clone(&cache), trust_client, config.trust_api.dry_run);
    let sink_handle = sink.spawn(queue);

    // serviço de varredura de carteiras
    let explorer = EtherscanClient::new(config.explorer.clone())?;
    let walker = GraphWalker::new(
        Arc::clone(&cache),
        explorer,
        changesets.clone(),
        config.collector.max_scan_depth,
    );
    let (_scans, _walker_handle) = ScanService::start(walker);

    let aggregator = Arc::new(TransactionAggregator::new(Duration::from_secs(
        config.collector.aggregation_window_secs,
    )));

    let result = listener::listen(
        &config.ethereum.wss_url,
        &protocols,
        cache,
        changesets,
        aggregator,
    )
    .await;

    sink_handle.abort();
    result.context("subscrição encerrada com erro")
}
