//! Cache Storage channel

use super::{unavailable, window_for};
use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use warden_core::{ChannelError, ChannelKind, StorageChannel};
use web_sys::{Cache, Headers, Response, ResponseInit};

const KIND: ChannelKind = ChannelKind::ResponseCache;

/// Stores the payload as a cached JSON response at a virtual path.
///
/// The cache is shared with the site's service worker and survives some
/// clearing flows that only target cookies and web storage.
#[derive(Debug, Clone)]
pub struct CacheStorageChannel {
    cache_name: String,
    path: String,
}

impl CacheStorageChannel {
    /// Channel over `cache_name`, keyed by `path`
    pub fn new(cache_name: &str, path: &str) -> Self {
        Self {
            cache_name: cache_name.to_string(),
            path: path.to_string(),
        }
    }

    async fn open(&self) -> Result<Cache, ChannelError> {
        let caches = window_for(KIND)?.caches().map_err(unavailable(KIND))?;
        let cache = JsFuture::from(caches.open(&self.cache_name))
            .await
            .map_err(unavailable(KIND))?;
        cache
            .dyn_into::<Cache>()
            .map_err(|_| ChannelError::unavailable(KIND, "caches.open returned a non-cache"))
    }
}

#[async_trait(?Send)]
impl StorageChannel for CacheStorageChannel {
    fn kind(&self) -> ChannelKind {
        KIND
    }

    async fn write(&self, payload: &str) -> Result<(), ChannelError> {
        let cache = self.open().await?;
        let headers = Headers::new().map_err(unavailable(KIND))?;
        headers
            .set("content-type", "application/json")
            .map_err(unavailable(KIND))?;
        let init = ResponseInit::new();
        init.set_status(200);
        init.set_headers(&headers);
        let response = Response::new_with_opt_str_and_init(Some(payload), &init)
            .map_err(unavailable(KIND))?;
        JsFuture::from(cache.put_with_str(&self.path, &response))
            .await
            .map_err(unavailable(KIND))?;
        Ok(())
    }

    async fn read(&self) -> Result<Option<String>, ChannelError> {
        let cache = self.open().await?;
        let matched = JsFuture::from(cache.match_with_str(&self.path))
            .await
            .map_err(unavailable(KIND))?;
        if matched.is_undefined() || matched.is_null() {
            return Ok(None);
        }
        let response: Response = matched
            .dyn_into()
            .map_err(|_| ChannelError::unavailable(KIND, "cache match returned a non-response"))?;
        let text = JsFuture::from(response.text().map_err(unavailable(KIND))?)
            .await
            .map_err(unavailable(KIND))?;
        Ok(text.as_string())
    }

    async fn clear(&self) -> Result<(), ChannelError> {
        let cache = self.open().await?;
        JsFuture::from(cache.delete_with_str(&self.path))
            .await
            .map_err(unavailable(KIND))?;
        Ok(())
    }
}
