//! Cookie channel

use super::{unavailable, window_for};
use crate::storage::find_cookie;
use async_trait::async_trait;
use wasm_bindgen::JsCast;
use warden_core::{ChannelError, ChannelKind, StorageChannel};
use web_sys::HtmlDocument;

const KIND: ChannelKind = ChannelKind::Cookie;

/// Stores the payload in a long-lived first-party cookie.
///
/// The value is URI-component encoded; a bare legacy value such as `1`
/// decodes to itself.
#[derive(Debug, Clone)]
pub struct CookieChannel {
    name: String,
    max_age_secs: u64,
}

impl CookieChannel {
    /// Cookie named `name` living `max_age_secs`
    pub fn new(name: &str, max_age_secs: u64) -> Self {
        Self {
            name: name.to_string(),
            max_age_secs,
        }
    }

    fn document(&self) -> Result<HtmlDocument, ChannelError> {
        window_for(KIND)?
            .document()
            .ok_or_else(|| ChannelError::unavailable(KIND, "no document"))?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| ChannelError::unavailable(KIND, "document has no cookie jar"))
    }

    fn assign(&self, value: &str, max_age_secs: u64) -> Result<(), ChannelError> {
        let cookie = format!(
            "{}={}; path=/; max-age={}; SameSite=Lax",
            self.name, value, max_age_secs
        );
        self.document()?.set_cookie(&cookie).map_err(unavailable(KIND))
    }
}

#[async_trait(?Send)]
impl StorageChannel for CookieChannel {
    fn kind(&self) -> ChannelKind {
        KIND
    }

    async fn write(&self, payload: &str) -> Result<(), ChannelError> {
        let encoded = String::from(js_sys::encode_uri_component(payload));
        self.assign(&encoded, self.max_age_secs)
    }

    async fn read(&self) -> Result<Option<String>, ChannelError> {
        let jar = self.document()?.cookie().map_err(unavailable(KIND))?;
        let Some(raw) = find_cookie(&jar, &self.name) else {
            return Ok(None);
        };
        let decoded = js_sys::decode_uri_component(raw)
            .map(String::from)
            .map_err(|_| ChannelError::malformed(KIND, "cookie value is not URI-encoded"))?;
        Ok(Some(decoded))
    }

    async fn clear(&self) -> Result<(), ChannelError> {
        self.assign("", 0)
    }
}
