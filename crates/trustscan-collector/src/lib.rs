/*!
 * Trustscan Collector
 *
 * Pipeline de classificação de endereços e construção de changesets para o
 * trust graph: cache concorrente, classificador de logs, fila de changesets
 * com consumidor único, caminhante do grafo de transações e agregador de
 * resumo por transação
 */

pub mod aggregator;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod listener;
pub mod protocols;
pub mod sink;
pub mod topics;
pub mod walker;

pub use aggregator::TransactionAggregator;
pub use cache::AddressCache;
pub use classifier::{tie_break, LogClassifier, TiePolicy};
pub use config::Config;
pub use sink::{changeset_channel, ChangeSetSender, ChangeSetSink};
pub use walker::{GraphWalker, ScanService};
