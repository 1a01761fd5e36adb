use ethereum_types::Address;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use trustscan_core::traits::ExplorerProvider;
use trustscan_core::types::{AddressClassification, ChangeSet, TrustEntity, TrustRelationship};
use trustscan_core::utils::format_address;

use crate::cache::AddressCache;
use crate::sink::ChangeSetSender;

/// Profundidade padrão de varredura: apenas contrapartes diretas
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Caminhante do histórico de transações de uma carteira: percorre as
/// contrapartes até a profundidade máxima, emitindo um changeset por
/// interação descoberta.
pub struct GraphWalker<E> {
    cache: Arc<AddressCache>,
    explorer: E,
    changesets: ChangeSetSender,
    max_depth: usize,
}

impl<E: ExplorerProvider> GraphWalker<E> {
    /// Cria um caminhante sobre o cache, o explorer e a fila de changesets
    pub fn new(
        cache: Arc<AddressCache>,
        explorer: E,
        changesets: ChangeSetSender,
        max_depth: usize,
    ) -> Self {
        Self { cache, explorer, changesets, max_depth }
    }

    /// Varre uma raiz. Pilha explícita de (endereço, profundidade) no lugar
    /// de recursão nativa; o conjunto `visited` é por varredura e o corte de
    /// profundidade/ciclo acontece antes de qualquer busca.
    pub async fn walk(&self, root: Address) {
        let mut visited: HashSet<Address> = HashSet::new();
        let mut stack: Vec<(Address, usize)> = vec![(root, 0)];

        while let Some((address, depth)) = stack.pop() {
            if depth > self.max_depth {
                continue;
            }
            if !visited.insert(address) {
                continue;
            }

            let txs = match self.explorer.transactions(address).await {
                Ok(txs) => txs,
                Err(e) => {
                    // a falha descarta a subárvore deste endereço; os irmãos
                    // já empilhados seguem normalmente
                    warn!(address = %format_address(&address), %e, "falha ao buscar transações");
                    continue;
                }
            };

            let (classification, is_new) = self.cache.classify(address);
            if classification == AddressClassification::DeFiProtocol {
                debug!(
                    address = %format_address(&address),
                    "contrato de protocolo não é varrido como carteira"
                );
                continue;
            }
            if is_new {
                let mut changeset = ChangeSet::new();
                changeset.add_entity(TrustEntity::for_address(address, classification));
                let _ = self.changesets.send(changeset);
            }

            for tx in txs {
                // normaliza a direção: a carteira visitada é sempre a origem
                let counterparty = if tx.from == address {
                    match tx.to {
                        Some(to) => to,
                        None => continue,
                    }
                } else {
                    tx.from
                };
                if counterparty == address {
                    continue;
                }

                let (cp_class, cp_new) = self.cache.classify(counterparty);
                let mut changeset = ChangeSet::new();
                if cp_new {
                    changeset.add_entity(TrustEntity::for_address(counterparty, cp_class));
                }
                changeset.add_relationship(TrustRelationship::interaction(
                    TrustEntity::for_address(address, classification),
                    TrustEntity::for_address(counterparty, cp_class),
                    &tx.hash,
                    "interaction",
                    tx.timestamp,
                ));
                let _ = self.changesets.send(changeset);

                stack.push((counterparty, depth + 1));
            }
        }
    }
}

/// Serviço de varredura: consome pedidos serialmente em uma task dedicada,
/// com deduplicação de raízes já varridas pela vida do processo.
pub struct ScanService {
    requests: mpsc::UnboundedSender<Address>,
}

impl ScanService {
    /// Inicia a task consumidora de pedidos de varredura
    pub fn start<E>(walker: GraphWalker<E>) -> (Self, JoinHandle<()>)
    where
        E: ExplorerProvider + 'static,
    {
        let (requests, mut queue) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut scanned: HashSet<Address> = HashSet::new();
            while let Some(root) = queue.recv().await {
                if !scanned.insert(root) {
                    debug!(root = %format_address(&root), "raiz já varrida, pedido ignorado");
                    continue;
                }
                info!(root = %format_address(&root), "iniciando varredura");
                walker.walk(root).await;
            }
        });
        (Self { requests }, handle)
    }

    /// Enfileira um pedido de varredura; retorna false se o serviço já parou
    pub fn scan(&self, root: Address) -> bool {
        self.requests.send(root).is_ok()
    }
}
