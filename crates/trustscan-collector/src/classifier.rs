use std::sync::Arc;

use trustscan_core::error::{Error, Result};
use trustscan_core::traits::BlockResolver;
use trustscan_core::types::{
    AddressClassification, ChangeSet, EventLog, TrustEntity, TrustRelationship,
};
use trustscan_core::utils::address_from_topic;

use crate::cache::AddressCache;
use crate::topics::{ActionTable, TRANSFER_ACTION};

/// Decisão de emissão para um par (remetente, destinatário) já classificado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiePolicy {
    /// Transferência protocolo-protocolo não vira interação de usuário
    SkipBothProtocols,
    /// Duas carteiras: uma perna de cada parte para o contrato do log
    BothLegsToContract,
    /// Par misto: a carteira é sempre a origem e o protocolo o destino,
    /// independente da direção on-chain
    WalletToProtocol { wallet_is_sender: bool },
}

/// Tabela de política de orientação das interações por classificação das
/// partes
pub fn tie_break(
    sender: AddressClassification,
    recipient: AddressClassification,
) -> TiePolicy {
    use AddressClassification::*;
    match (sender, recipient) {
        (DeFiProtocol, DeFiProtocol) => TiePolicy::SkipBothProtocols,
        (DeFiProtocol, _) => TiePolicy::WalletToProtocol { wallet_is_sender: false },
        (_, DeFiProtocol) => TiePolicy::WalletToProtocol { wallet_is_sender: true },
        _ => TiePolicy::BothLegsToContract,
    }
}

/// Tradutor de logs de evento em changesets do trust graph
pub struct LogClassifier<R> {
    cache: Arc<AddressCache>,
    actions: ActionTable,
    resolver: R,
}

impl<R: BlockResolver> LogClassifier<R> {
    /// Cria um classificador sobre o cache compartilhado e o resolvedor de
    /// blocos informado
    pub fn new(cache: Arc<AddressCache>, resolver: R) -> Self {
        Self {
            cache,
            actions: ActionTable::new(),
            resolver,
        }
    }

    /// Nome da ação do log, quando a assinatura é conhecida
    pub fn action_for(&self, log: &EventLog) -> Option<&'static str> {
        log.topics.first().and_then(|sig| self.actions.action_for(sig))
    }

    /// Traduz um log em um changeset. Erros são locais ao registro: o
    /// chamador registra e descarta o log, sem derrubar a subscrição.
    pub async fn classify(&self, log: &EventLog) -> Result<ChangeSet> {
        let signature = log
            .topics
            .first()
            .ok_or_else(|| Error::DecodeError("log sem topics".to_string()))?;
        let action = self
            .actions
            .action_for(signature)
            .ok_or(Error::UnknownActionSignature(*signature))?;
        if action != TRANSFER_ACTION {
            return Err(Error::UnsupportedAction(action.to_string()));
        }

        // transação pendente ainda pode ser reordenada; reobservar depois
        if self.resolver.is_pending(log.transaction_hash).await? {
            return Err(Error::TransactionPending(log.transaction_hash));
        }

        if log.topics.len() < 3 {
            return Err(Error::DecodeError(format!(
                "Transfer com {} topics",
                log.topics.len()
            )));
        }
        let contract = log.address;
        let sender = address_from_topic(&log.topics[1]);
        let recipient = address_from_topic(&log.topics[2]);

        // mint/burn não são representados no grafo
        if sender.is_zero() || recipient.is_zero() {
            return Err(Error::ZeroAddressSkipped);
        }

        let timestamp = self.resolver.block_time(log.block_hash).await?;

        let (contract_class, contract_new) = self.cache.classify(contract);
        let (sender_class, sender_new) = self.cache.classify(sender);
        let (recipient_class, recipient_new) = self.cache.classify(recipient);

        let policy = tie_break(sender_class, recipient_class);
        if policy == TiePolicy::SkipBothProtocols {
            return Err(Error::BothPartiesAreProtocols);
        }

        let mut changeset = ChangeSet::new();
        if contract_new {
            changeset.add_entity(TrustEntity::for_address(contract, contract_class));
        }
        if sender_new {
            changeset.add_entity(TrustEntity::for_address(sender, sender_class));
        }
        if recipient_new {
            changeset.add_entity(TrustEntity::for_address(recipient, recipient_class));
        }

        match policy {
            TiePolicy::SkipBothProtocols => unreachable!("descartado acima"),
            TiePolicy::BothLegsToContract => {
                let contract_entity = TrustEntity::for_address(contract, contract_class);
                changeset.add_relationship(TrustRelationship::interaction(
                    TrustEntity::for_address(sender, sender_class),
                    contract_entity.clone(),
                    &log.transaction_hash,
                    action,
                    timestamp,
                ));
                changeset.add_relationship(TrustRelationship::interaction(
                    TrustEntity::for_address(recipient, recipient_class),
                    contract_entity,
                    &log.transaction_hash,
                    action,
                    timestamp,
                ));
            }
            TiePolicy::WalletToProtocol { wallet_is_sender } => {
                let (wallet, wallet_class, protocol, protocol_class) = if wallet_is_sender {
                    (sender, sender_class, recipient, recipient_class)
                } else {
                    (recipient, recipient_class, sender, sender_class)
                };
                changeset.add_relationship(TrustRelationship::interaction(
                    TrustEntity::for_address(wallet, wallet_class),
                    TrustEntity::for_address(protocol, protocol_class),
                    &log.transaction_hash,
                    action,
                    timestamp,
                ));
            }
        }

        Ok(changeset)
    }
}
