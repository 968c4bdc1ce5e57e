//! Network-origin lookup handlers

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use warden_core::{LookupError, OriginLookup, WardenConfig, WardenError, WardenResult};

#[derive(Deserialize)]
struct OriginResponse {
    ip: String,
}

/// Resolves the public address from a `{ "ip": "..." }` endpoint
#[derive(Debug, Clone)]
pub struct HttpOriginLookup {
    url: String,
    client: Client,
}

impl HttpOriginLookup {
    /// Create a lookup against the configured endpoint
    pub fn from_config(config: &WardenConfig) -> WardenResult<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder =
            builder.timeout(std::time::Duration::from_secs(config.request_timeout_secs));
        let client = builder
            .build()
            .map_err(|e| WardenError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: config.origin_lookup_url.clone(),
            client,
        })
    }
}

#[async_trait(?Send)]
impl OriginLookup for HttpOriginLookup {
    async fn resolve(&self) -> Result<String, LookupError> {
        if self.url.trim().is_empty() {
            return Err(LookupError::unconfigured("origin lookup"));
        }
        debug!(url = %self.url, "resolving network origin");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LookupError::transport(&self.url, e.to_string()))?;
        if !response.status().is_success() {
            return Err(LookupError::status(&self.url, response.status().as_u16()));
        }
        let body: OriginResponse = response
            .json()
            .await
            .map_err(|e| LookupError::decode(&self.url, e.to_string()))?;
        let ip = body.ip.trim();
        if ip.is_empty() {
            return Err(LookupError::decode(&self.url, "empty ip field"));
        }
        Ok(ip.to_string())
    }
}

/// Origin lookup for deployments that never resolve an origin
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOriginLookup;

#[async_trait(?Send)]
impl OriginLookup for DisabledOriginLookup {
    async fn resolve(&self) -> Result<String, LookupError> {
        Err(LookupError::unconfigured("origin lookup"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_url_is_unconfigured() {
        let mut config = WardenConfig::default();
        config.origin_lookup_url = String::new();
        let lookup = HttpOriginLookup::from_config(&config).unwrap();
        assert!(matches!(
            lookup.resolve().await,
            Err(LookupError::Unconfigured { .. })
        ));
        assert!(DisabledOriginLookup.resolve().await.is_err());
    }
}
