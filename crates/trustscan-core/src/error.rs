use ethereum_types::H256;
use thiserror::Error;

/// Erros comuns da workspace Trustscan
#[derive(Error, Debug)]
pub enum Error {
    /// Assinatura de evento ausente da tabela de ações
    #[error("assinatura de ação desconhecida: {0:?}")]
    UnknownActionSignature(H256),

    /// A transação ainda não foi incluída em um bloco
    #[error("transação {0:?} ainda pendente")]
    TransactionPending(H256),

    /// Transferência de mint/burn envolvendo o endereço zero
    #[error("transferência envolvendo o endereço zero, descartada")]
    ZeroAddressSkipped,

    /// Interação protocolo-protocolo não é modelada no trust graph
    #[error("ambas as partes são protocolos DeFi")]
    BothPartiesAreProtocols,

    /// Ação reconhecida porém sem tradução para o trust graph
    #[error("ação não suportada: {0}")]
    UnsupportedAction(String),

    /// Falha de consulta ao block explorer
    #[error("falha ao consultar o block explorer: {0}")]
    ExplorerFetchFailed(String),

    /// Falha de envio ao trust graph
    #[error("falha ao enviar para a trust API: {0}")]
    SinkPostFailed(String),

    /// Erro de comunicação com o node Ethereum
    #[error("erro de RPC: {0}")]
    RpcError(String),

    /// Erro de decodificação de dados
    #[error("erro de decodificação: {0}")]
    DecodeError(String),

    /// Erro de configuração
    #[error("erro de configuração: {0}")]
    ConfigError(String),
}

/// Tipo de resultado usado em toda a workspace
pub type Result<T> = std::result::Result<T, Error>;
