use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ethereum_types::H256;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use web3::transports::WebSocket;
use web3::types::{BlockId, FilterBuilder, Log, TransactionId};
use web3::Web3;

use trustscan_core::error::{Error, Result};
use trustscan_core::traits::BlockResolver;
use trustscan_core::types::{EventLog, InteractionEvent, Protocol, TransactionHash};
use trustscan_core::utils::{
    address_from_topic, etherscan_address_link, etherscan_block_link, etherscan_tx_link,
    format_address,
};

use crate::aggregator::TransactionAggregator;
use crate::cache::AddressCache;
use crate::classifier::LogClassifier;
use crate::protocols::filter_addresses;
use crate::sink::ChangeSetSender;

/// Resolvedor de metadados de bloco e transação sobre a conexão web3
pub struct NodeResolver<T: web3::Transport> {
    web3: Web3<T>,
}

impl<T: web3::Transport> NodeResolver<T> {
    /// Cria um resolvedor sobre uma conexão existente
    pub fn new(web3: Web3<T>) -> Self {
        Self { web3 }
    }
}

#[async_trait]
impl<T> BlockResolver for NodeResolver<T>
where
    T: web3::Transport + Send + Sync,
    T::Out: Send,
{
    async fn block_time(&self, block_hash: H256) -> Result<DateTime<Utc>> {
        let block = self
            .web3
            .eth()
            .block(BlockId::Hash(block_hash))
            .await
            .map_err(|e| Error::RpcError(format!("falha ao obter bloco: {}", e)))?
            .ok_or_else(|| Error::RpcError(format!("bloco {:?} não encontrado", block_hash)))?;
        Utc.timestamp_opt(block.timestamp.as_u64() as i64, 0)
            .single()
            .ok_or_else(|| Error::DecodeError("timestamp de bloco inválido".to_string()))
    }

    async fn is_pending(&self, tx_hash: TransactionHash) -> Result<bool> {
        let tx = self
            .web3
            .eth()
            .transaction(TransactionId::Hash(tx_hash))
            .await
            .map_err(|e| Error::RpcError(format!("falha ao obter transação: {}", e)))?;
        Ok(match tx {
            Some(tx) => tx.block_number.is_none(),
            None => true,
        })
    }
}

/// Subscreve os logs dos protocolos configurados e alimenta a fila de
/// changesets e o agregador. Erros por registro são locais; erros da
/// subscrição encerram o loop e devem derrubar o serviço.
pub async fn listen(
    wss_url: &str,
    protocols: &[Protocol],
    cache: Arc<AddressCache>,
    changesets: ChangeSetSender,
    aggregator: Arc<TransactionAggregator>,
) -> Result<()> {
    let transport = WebSocket::new(wss_url)
        .await
        .map_err(|e| Error::RpcError(format!("falha ao conectar via WebSocket: {}", e)))?;
    let web3 = Web3::new(transport);

    let seeded = cache.seed_protocols(protocols);
    info!(seeded, "endereços de protocolos registrados no cache");

    let addresses = filter_addresses(protocols);
    info!(filtros = addresses.len(), "subscrevendo logs dos protocolos configurados");
    let filter = FilterBuilder::default().address(addresses).build();

    let resolver = NodeResolver::new(web3.clone());
    let classifier = LogClassifier::new(Arc::clone(&cache), NodeResolver::new(web3.clone()));

    let mut subscription = web3
        .eth_subscribe()
        .subscribe_logs(filter)
        .await
        .map_err(|e| Error::RpcError(format!("falha ao subscrever logs: {}", e)))?;

    while let Some(next) = subscription.next().await {
        let log = match next {
            Ok(log) => log,
            Err(e) => return Err(Error::RpcError(format!("erro na subscrição: {}", e))),
        };
        let Some(event) = to_event_log(&log) else {
            warn!("log sem metadados de bloco, ignorado");
            continue;
        };
        debug!(
            bloco = %etherscan_block_link(event.block_number),
            contrato = %etherscan_address_link(&event.address),
            tx = %etherscan_tx_link(&event.transaction_hash),
            "log recebido"
        );

        // canal lateral: resumo por transação
        if let Some(action) = classifier.action_for(&event) {
            match resolver.block_time(event.block_hash).await {
                Ok(block_time) => {
                    aggregator.queue(interaction_event(&cache, &event, action, block_time))
                }
                Err(e) => debug!(%e, "resumo sem timestamp de bloco, ignorado"),
            }
        }

        match classifier.classify(&event).await {
            Ok(changeset) => {
                if changesets.send(changeset).is_err() {
                    info!("fila de changesets fechada, encerrando subscrição");
                    return Ok(());
                }
            }
            Err(e) => log_discarded(&e, &event),
        }
    }

    Err(Error::RpcError("subscrição encerrada pelo node".to_string()))
}

/// Converte o log do web3 no registro interno; logs sem metadados de bloco
/// não são processáveis
fn to_event_log(log: &Log) -> Option<EventLog> {
    Some(EventLog {
        address: log.address,
        topics: log.topics.clone(),
        data: bytes::Bytes::from(log.data.0.clone()),
        transaction_hash: log.transaction_hash?,
        block_hash: log.block_hash?,
        block_number: log.block_number?.as_u64(),
    })
}

/// Monta o evento de apresentação para o agregador
fn interaction_event(
    cache: &AddressCache,
    event: &EventLog,
    action: &str,
    block_time: DateTime<Utc>,
) -> InteractionEvent {
    let protocol = cache
        .get(event.address)
        .map(|(label, _)| label)
        .unwrap_or_else(|| format_address(&event.address));
    InteractionEvent {
        block_number: event.block_number,
        block_time,
        protocol,
        action: action.to_string(),
        transaction_hash: event.transaction_hash,
        senders: event.topics.get(1).map(address_from_topic).into_iter().collect(),
        recipients: event.topics.get(2).map(address_from_topic).into_iter().collect(),
    }
}

/// Registra o descarte de um log conforme a classe do erro
fn log_discarded(error: &Error, event: &EventLog) {
    let tx = event.transaction_hash;
    match error {
        Error::UnknownActionSignature(_) => error!(?tx, %error, "log descartado"),
        Error::TransactionPending(_) => warn!(?tx, %error, "log descartado"),
        Error::ZeroAddressSkipped
        | Error::BothPartiesAreProtocols
        | Error::UnsupportedAction(_) => debug!(?tx, %error, "log descartado"),
        _ => error!(?tx, %error, "falha ao classificar log"),
    }
}
