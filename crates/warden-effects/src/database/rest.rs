//! REST client for the remote JSON database
//!
//! Every node is reachable at `{base}{path}.json`; GET/PUT/PATCH/DELETE map
//! to get/set/update/delete. Works natively and, through `fetch`, in the
//! browser.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::debug;
use warden_core::{LookupError, RemoteDatabase, WardenConfig, WardenError, WardenResult};

/// HTTP handler for [`RemoteDatabase`]
#[derive(Debug, Clone)]
pub struct RestDatabase {
    base_url: String,
    client: Client,
}

impl RestDatabase {
    /// Create a client for `base_url` with the configured timeout
    pub fn from_config(config: &WardenConfig) -> WardenResult<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder =
            builder.timeout(std::time::Duration::from_secs(config.request_timeout_secs));
        let client = builder
            .build()
            .map_err(|e| WardenError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(&config.database_url, client))
    }

    /// Create a client around an existing [`Client`]
    pub fn with_client(base_url: &str, client: Client) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Self { base_url, client }
    }

    /// Absolute URL for a node path
    pub fn node_url(&self, path: &str) -> String {
        format!("{}{}.json", self.base_url, path.trim_matches('/'))
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, LookupError> {
        let url = self.node_url(path);
        debug!(%method, %url, "remote database request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| LookupError::transport(path, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::status(path, status.as_u16()));
        }
        if status != StatusCode::OK {
            return Ok(None);
        }
        let value: Value = response
            .json()
            .await
            .map_err(|e| LookupError::decode(path, e.to_string()))?;
        Ok(if value.is_null() { None } else { Some(value) })
    }
}

#[async_trait(?Send)]
impl RemoteDatabase for RestDatabase {
    async fn get(&self, path: &str) -> Result<Option<Value>, LookupError> {
        self.request(Method::GET, path, None).await
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), LookupError> {
        self.request(Method::PUT, path, Some(value)).await.map(|_| ())
    }

    async fn update(&self, path: &str, patch: &Value) -> Result<(), LookupError> {
        self.request(Method::PATCH, path, Some(patch)).await.map(|_| ())
    }

    async fn delete(&self, path: &str) -> Result<(), LookupError> {
        self.request(Method::DELETE, path, None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_urls_append_json_suffix() {
        let db = RestDatabase::with_client("https://example-rtdb.test", Client::new());
        assert_eq!(
            db.node_url("/bans/ips/10_0_0_1"),
            "https://example-rtdb.test/bans/ips/10_0_0_1.json"
        );
        assert_eq!(db.node_url("users/bob/"), "https://example-rtdb.test/users/bob.json");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let db = RestDatabase::with_client("http://127.0.0.1:9/", Client::new());
        let err = db.get("bans/users/alice").await.unwrap_err();
        assert!(matches!(err, LookupError::Transport { .. }));
    }
}
