use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use trustscan_core::traits::TrustSink;
use trustscan_core::types::{AddressClassification, ChangeSet};
use trustscan_core::utils::hex_to_address;

use crate::cache::AddressCache;

/// Lado produtor da fila de changesets
pub type ChangeSetSender = mpsc::UnboundedSender<ChangeSet>;

/// Lado consumidor da fila de changesets
pub type ChangeSetReceiver = mpsc::UnboundedReceiver<ChangeSet>;

/// Cria a fila de changesets: múltiplos produtores, um único consumidor
pub fn changeset_channel() -> (ChangeSetSender, ChangeSetReceiver) {
    mpsc::unbounded_channel()
}

/// Consumidor único da fila de changesets. Em dry-run imprime a representação
/// do changeset e nada mais; em modo normal grava os ids das entidades no
/// cache e publica entidades antes dos relacionamentos.
pub struct ChangeSetSink<S> {
    cache: Arc<AddressCache>,
    client: S,
    dry_run: bool,
}

impl<S: TrustSink> ChangeSetSink<S> {
    /// Cria o consumidor sobre o cache compartilhado e o cliente do trust
    /// graph
    pub fn new(cache: Arc<AddressCache>, client: S, dry_run: bool) -> Self {
        Self { cache, client, dry_run }
    }

    /// Consome a fila até o canal ser fechado (encerramento gracioso)
    pub async fn run(self, mut queue: ChangeSetReceiver) {
        while let Some(changeset) = queue.recv().await {
            self.apply(&changeset).await;
        }
        info!("fila de changesets fechada, consumidor encerrado");
    }

    /// Inicia o consumidor em uma task dedicada
    pub fn spawn(self, queue: ChangeSetReceiver) -> JoinHandle<()>
    where
        S: 'static,
    {
        tokio::spawn(self.run(queue))
    }

    /// Aplica um changeset. Falhas de publicação são registradas e não
    /// interrompem os itens restantes.
    async fn apply(&self, changeset: &ChangeSet) {
        if self.dry_run {
            info!("\n{}", changeset);
            return;
        }

        for entity in &changeset.entities {
            if let Some(raw) = entity.address() {
                if let Some(address) = hex_to_address(raw) {
                    let classification = entity
                        .entity_type
                        .parse()
                        .unwrap_or(AddressClassification::Address);
                    let label = entity.name.as_deref().unwrap_or(raw);
                    self.cache.put(address, label, classification);
                }
            }
            if let Err(e) = self.client.post_entity(entity).await {
                error!(%e, "falha ao publicar entidade");
            }
        }
        for relationship in &changeset.relationships {
            if let Err(e) = self.client.post_relationship(relationship).await {
                error!(%e, "falha ao publicar relacionamento");
            }
        }
    }
}
