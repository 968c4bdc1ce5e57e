//! Browser handlers
//!
//! Compiled only for `wasm32` with the `web` feature. Each channel talks to
//! one browser storage API and reports every thrown exception as
//! [`ChannelError::Unavailable`](warden_core::ChannelError::Unavailable).
//!
//! | Channel | Browser API |
//! |---------|-------------|
//! | `ResponseCache` | Cache Storage (shared with service workers) |
//! | `IndexedDb` | IndexedDB object store |
//! | `Cookie` | `document.cookie`, multi-year `max-age`, `SameSite=Lax` |
//! | `LocalStorage` | `window.localStorage` |
//! | `SessionStorage` | `window.sessionStorage` |

mod cache;
mod cookie;
mod environment;
mod indexed_db;
mod session;
mod surface;
mod web_storage;

pub use cache::CacheStorageChannel;
pub use cookie::CookieChannel;
pub use environment::BrowserEnvironment;
pub use indexed_db::IndexedDbChannel;
pub use session::BrowserSession;
pub use surface::DomSurface;
pub use web_storage::{StorageArea, WebStorageChannel};

use std::sync::Arc;
use wasm_bindgen::JsValue;
use warden_core::{ChannelConfig, ChannelError, ChannelKind, StorageChannel};

/// The five browser channels in read-precedence order
pub fn browser_channels(config: &ChannelConfig) -> Vec<Arc<dyn StorageChannel>> {
    vec![
        Arc::new(CacheStorageChannel::new(&config.cache_name, &config.cache_path)),
        Arc::new(IndexedDbChannel::new(
            &config.idb_name,
            &config.idb_store,
            &config.storage_key,
        )),
        Arc::new(CookieChannel::new(&config.storage_key, config.cookie_max_age_secs)),
        Arc::new(WebStorageChannel::new(StorageArea::Local, &config.storage_key)),
        Arc::new(WebStorageChannel::new(StorageArea::Session, &config.storage_key)),
    ]
}

/// Best-effort text for a thrown JavaScript value
pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Map a thrown value to an unavailable-channel error
pub(crate) fn unavailable(channel: ChannelKind) -> impl Fn(JsValue) -> ChannelError {
    move |value| ChannelError::unavailable(channel, js_message(&value))
}

/// The global window, or an unavailable-channel error outside a window context
pub(crate) fn window_for(channel: ChannelKind) -> Result<web_sys::Window, ChannelError> {
    web_sys::window().ok_or_else(|| ChannelError::unavailable(channel, "no window"))
}
