use dashmap::DashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::info;

use trustscan_core::types::{InteractionEvent, TransactionHash};
use trustscan_core::utils::{etherscan_tx_link, format_address};

/// Janela padrão de agregação, contada a partir do primeiro evento
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

/// Agregador por transação: bufferiza eventos da mesma transação durante uma
/// janela fixa e emite um resumo legível no flush. Canal lateral de
/// apresentação, sem efeito no pipeline de changesets.
pub struct TransactionAggregator {
    buffers: Arc<DashMap<TransactionHash, mpsc::UnboundedSender<InteractionEvent>>>,
    window: Duration,
}

impl TransactionAggregator {
    /// Cria um agregador com a janela informada
    pub fn new(window: Duration) -> Self {
        Self {
            buffers: Arc::new(DashMap::new()),
            window,
        }
    }

    /// Enfileira um evento no buffer da sua transação. O buffer e a task de
    /// flush são criados na primeira ocorrência do hash.
    pub fn queue(&self, event: InteractionEvent) {
        let tx_hash = event.transaction_hash;
        let sender = self
            .buffers
            .entry(tx_hash)
            .or_insert_with(|| {
                let (sender, receiver) = mpsc::unbounded_channel();
                let buffers = Arc::clone(&self.buffers);
                let window = self.window;
                tokio::spawn(async move {
                    aggregate(receiver, window).await;
                    buffers.remove(&tx_hash);
                });
                sender
            })
            .clone();
        let _ = sender.send(event);
    }

    /// Quantidade de buffers ainda abertos
    pub fn active_buffers(&self) -> usize {
        self.buffers.len()
    }
}

impl Default for TransactionAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// Acumula eventos até a janela expirar e emite o resumo da transação
async fn aggregate(mut events: mpsc::UnboundedReceiver<InteractionEvent>, window: Duration) {
    let deadline = Instant::now() + window;
    let mut buffered: Vec<InteractionEvent> = Vec::new();
    loop {
        tokio::select! {
            _ = sleep_until(deadline) => break,
            event = events.recv() => match event {
                Some(event) => buffered.push(event),
                None => break,
            },
        }
    }
    if buffered.is_empty() {
        return;
    }

    let mut summary = String::new();
    let _ = writeln!(summary, "---------------TX SUMMARY-------------");
    let _ = writeln!(summary, "Protocol {}", buffered[0].protocol);
    let _ = writeln!(summary, "Tx       {}", etherscan_tx_link(&buffered[0].transaction_hash));
    for (i, event) in buffered.iter().enumerate() {
        let _ = writeln!(
            summary,
            "{}. {:>20}     {:>20} -> {:>20}",
            i + 1,
            event.action,
            join_addresses(&event.recipients),
            join_addresses(&event.senders),
        );
    }
    let _ = writeln!(summary, "---------------//////////-------------");
    info!("{}", summary);
}

fn join_addresses(addresses: &[ethereum_types::Address]) -> String {
    addresses
        .iter()
        .map(format_address)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ethereum_types::{Address, H256};

    fn event(tx_hash: H256, action: &str) -> InteractionEvent {
        InteractionEvent {
            block_number: 1,
            block_time: Utc.timestamp_opt(1_609_459_200, 0).unwrap(),
            protocol: "Uniswap".to_string(),
            action: action.to_string(),
            transaction_hash: tx_hash,
            senders: vec![Address::repeat_byte(0x0a)],
            recipients: vec![Address::repeat_byte(0x0b)],
        }
    }

    #[tokio::test]
    async fn buffer_is_discarded_after_window() {
        let aggregator = TransactionAggregator::new(Duration::from_millis(50));
        let tx_hash = H256::repeat_byte(0x01);

        aggregator.queue(event(tx_hash, "Transfer"));
        aggregator.queue(event(tx_hash, "Swap"));
        assert_eq!(aggregator.active_buffers(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(aggregator.active_buffers(), 0);
    }

    #[tokio::test]
    async fn distinct_transactions_use_distinct_buffers() {
        let aggregator = TransactionAggregator::new(Duration::from_millis(50));
        aggregator.queue(event(H256::repeat_byte(0x01), "Transfer"));
        aggregator.queue(event(H256::repeat_byte(0x02), "Transfer"));
        assert_eq!(aggregator.active_buffers(), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(aggregator.active_buffers(), 0);
    }
}
