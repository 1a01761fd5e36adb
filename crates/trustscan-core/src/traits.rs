/*!
 * Trustscan Traits
 *
 * Contratos dos colaboradores externos do pipeline
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethereum_types::{Address, H256};

use crate::error::Result;
use crate::types::{TransactionHash, TrustEntity, TrustRelationship, WalletTransaction};

/// Resolução de metadados de bloco e transação junto ao node
#[async_trait]
pub trait BlockResolver: Send + Sync {
    /// Timestamp do bloco identificado pelo hash
    async fn block_time(&self, block_hash: H256) -> Result<DateTime<Utc>>;

    /// Indica se a transação ainda está pendente (fora de bloco)
    async fn is_pending(&self, tx_hash: TransactionHash) -> Result<bool>;
}

/// Cliente de block explorer com paginação oculta. Uma lista vazia significa
/// que o endereço não tem (mais) transações; isso não é um erro.
#[async_trait]
pub trait ExplorerProvider: Send + Sync {
    /// Histórico de transações normais de um endereço
    async fn transactions(&self, address: Address) -> Result<Vec<WalletTransaction>>;
}

/// Destino de escrita do trust graph
#[async_trait]
pub trait TrustSink: Send + Sync {
    /// Publica uma entidade
    async fn post_entity(&self, entity: &TrustEntity) -> Result<()>;

    /// Publica um relacionamento
    async fn post_relationship(&self, relationship: &TrustRelationship) -> Result<()>;
}
