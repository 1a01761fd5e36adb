/*!
 * Trustscan Trust API
 *
 * Cliente HTTP para publicação de entidades e relacionamentos no trust graph
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use trustscan_core::error::{Error, Result};
use trustscan_core::traits::TrustSink;
use trustscan_core::types::{TrustEntity, TrustRelationship};

/// Configuração do cliente da trust API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustApiConfig {
    pub url: String,
    pub client_id: String,
    pub auth_header: String,
    /// Quando habilitado, o consumidor de changesets apenas imprime o que
    /// seria publicado; nenhuma chamada chega a este cliente.
    pub dry_run: bool,
}

impl Default for TrustApiConfig {
    fn default() -> Self {
        Self {
            url: "https://api.ututrust.com".to_string(),
            client_id: "defiPortal".to_string(),
            auth_header: "UTU-Trust-Api-Client-Id".to_string(),
            dry_run: false,
        }
    }
}

/// Cliente da trust API
pub struct TrustApiClient {
    config: TrustApiConfig,
    client: Client,
}

impl TrustApiClient {
    /// Cria um novo cliente a partir da configuração
    pub fn new(config: TrustApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::SinkPostFailed(format!("falha ao criar cliente HTTP: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Configuração ativa do cliente
    pub fn config(&self) -> &TrustApiConfig {
        &self.config
    }

    async fn post_json<T: Serialize>(&self, path: &str, payload: &T) -> Result<()> {
        let url = format!("{}/{}", self.config.url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(&url)
            .header(self.config.auth_header.as_str(), self.config.client_id.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::SinkPostFailed(format!("{}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::SinkPostFailed(format!(
                "{} respondeu {}: {}",
                path, status, body
            )));
        }
        tracing::debug!(path, %status, "publicado na trust API");
        Ok(())
    }
}

#[async_trait]
impl TrustSink for TrustApiClient {
    async fn post_entity(&self, entity: &TrustEntity) -> Result<()> {
        self.post_json("entity", entity).await
    }

    async fn post_relationship(&self, relationship: &TrustRelationship) -> Result<()> {
        self.post_json("relationship", relationship).await
    }
}
