/*!
 * Trustscan Explorer
 *
 * Cliente do block explorer (API estilo etherscan) para o histórico de
 * transações de um endereço, com paginação oculta do chamador
 */

use async_trait::async_trait;
use ethereum_types::Address;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use trustscan_core::error::{Error, Result};
use trustscan_core::traits::ExplorerProvider;
use trustscan_core::types::WalletTransaction;
use trustscan_core::utils::{format_address, hex_to_address, hex_to_h256, parse_unix_timestamp};

/// Resposta do explorer com a lista "No transactions found": condição
/// terminal da paginação, não um erro.
const NO_MORE_TRANSACTIONS: &str = "No transactions found";

/// Configuração do cliente de explorer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub api_url: String,
    pub api_token: String,
    /// Quantidade de transações por página
    pub page_size: usize,
    /// Quando definido, limita a consulta a partir deste bloco
    pub start_block: Option<u64>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.etherscan.io/api".to_string(),
            api_token: String::new(),
            page_size: 100,
            start_block: None,
        }
    }
}

/// Envelope de resposta do explorer
#[derive(Debug, Deserialize)]
struct ExplorerReply {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Vec<TxRow>,
}

/// Linha bruta de transação como o explorer a devolve (tudo string)
#[derive(Debug, Clone, Deserialize)]
struct TxRow {
    #[serde(default, rename = "timeStamp")]
    time_stamp: String,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
}

impl TxRow {
    /// Normaliza a linha para o tipo compartilhado; `to` vazio é criação de
    /// contrato
    fn normalize(&self) -> Option<WalletTransaction> {
        let hash = hex_to_h256(&self.hash)?;
        let from = hex_to_address(&self.from)?;
        let to = if self.to.is_empty() {
            None
        } else {
            Some(hex_to_address(&self.to)?)
        };
        let timestamp = parse_unix_timestamp(&self.time_stamp)?;
        Some(WalletTransaction { hash, from, to, timestamp })
    }
}

/// Cliente de block explorer
pub struct EtherscanClient {
    config: ExplorerConfig,
    client: Client,
}

impl EtherscanClient {
    /// Cria um novo cliente a partir da configuração
    pub fn new(config: ExplorerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::ExplorerFetchFailed(format!("falha ao criar cliente HTTP: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Busca uma página de transações; lista vazia sinaliza fim da paginação
    async fn paged_transactions(&self, address: Address, page: usize) -> Result<Vec<TxRow>> {
        let mut params: Vec<(&str, String)> = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", format_address(&address)),
            ("apikey", self.config.api_token.clone()),
            ("page", page.to_string()),
            ("offset", self.config.page_size.to_string()),
        ];
        if let Some(start_block) = self.config.start_block {
            params.push(("startblock", start_block.to_string()));
        }

        let reply: ExplorerReply = self
            .client
            .get(&self.config.api_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::ExplorerFetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::ExplorerFetchFailed(format!("resposta inválida: {}", e)))?;

        // sem mais transações o status também vem "0"; checar a mensagem antes
        if reply.message == NO_MORE_TRANSACTIONS && reply.result.is_empty() {
            return Ok(Vec::new());
        }
        if reply.status == "0" {
            return Err(Error::ExplorerFetchFailed(reply.message));
        }
        Ok(reply.result)
    }

    /// Todas as transações normais de um endereço, acumuladas página a página
    pub async fn transactions(&self, address: Address) -> Result<Vec<WalletTransaction>> {
        let mut txs = Vec::new();
        let mut page = 1;
        loop {
            let rows = self.paged_transactions(address, page).await?;
            if rows.is_empty() {
                break;
            }
            for row in &rows {
                match row.normalize() {
                    Some(tx) => txs.push(tx),
                    None => warn!(?row, "linha de transação não decodificável, ignorada"),
                }
            }
            page += 1;
        }
        Ok(txs)
    }
}

#[async_trait]
impl ExplorerProvider for EtherscanClient {
    async fn transactions(&self, address: Address) -> Result<Vec<WalletTransaction>> {
        self.transactions(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> EtherscanClient {
        EtherscanClient::new(ExplorerConfig {
            api_url: server.uri(),
            api_token: "token".to_string(),
            page_size: 2,
            start_block: None,
        })
        .unwrap()
    }

    fn tx_row(hash: &str, from: &str, to: &str) -> serde_json::Value {
        json!({
            "hash": hash,
            "from": from,
            "to": to,
            "timeStamp": "1609459200",
        })
    }

    #[tokio::test]
    async fn paginates_until_terminal_reply() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": [
                    tx_row(
                        "0x1111111111111111111111111111111111111111111111111111111111111111",
                        "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                        "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                    ),
                    tx_row(
                        "0x2222222222222222222222222222222222222222222222222222222222222222",
                        "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                        "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                    ),
                ],
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "No transactions found",
                "result": [],
            })))
            .mount(&server)
            .await;

        let txs = client_for(&server)
            .transactions(Address::repeat_byte(0xaa))
            .await
            .unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].from, Address::repeat_byte(0xaa));
        assert_eq!(txs[0].to, Some(Address::repeat_byte(0xbb)));
    }

    #[tokio::test]
    async fn contract_creation_has_no_recipient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": [tx_row(
                    "0x3333333333333333333333333333333333333333333333333333333333333333",
                    "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                    "",
                )],
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "No transactions found",
                "result": [],
            })))
            .mount(&server)
            .await;

        let txs = client_for(&server)
            .transactions(Address::repeat_byte(0xaa))
            .await
            .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].to, None);
    }

    #[tokio::test]
    async fn error_reply_is_not_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": [],
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .transactions(Address::repeat_byte(0xaa))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExplorerFetchFailed(_)));
    }
}
