//! IndexedDB channel

use super::{js_message, unavailable, window_for};
use async_trait::async_trait;
use js_sys::Promise;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use warden_core::{ChannelError, ChannelKind, StorageChannel};
use web_sys::{Event, IdbDatabase, IdbObjectStore, IdbRequest, IdbTransactionMode};

const KIND: ChannelKind = ChannelKind::IndexedDb;
const SCHEMA_VERSION: u32 = 1;

/// Stores the payload as a single record in an IndexedDB object store
#[derive(Debug, Clone)]
pub struct IndexedDbChannel {
    database: String,
    store: String,
    key: String,
}

/// Resolve once `request` succeeds, reject on error.
///
/// The handlers free themselves after firing.
async fn settle(request: &IdbRequest) -> Result<JsValue, JsValue> {
    let promise = Promise::new(&mut |resolve, reject| {
        let success_request = request.clone();
        let on_success = Closure::once_into_js(move |_event: Event| {
            let result = success_request.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        let error_request = request.clone();
        let on_error = Closure::once_into_js(move |_event: Event| {
            let error = error_request
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or_else(|| JsValue::from_str("request failed"));
            let _ = reject.call1(&JsValue::NULL, &error);
        });
        request.set_onsuccess(Some(on_success.unchecked_ref()));
        request.set_onerror(Some(on_error.unchecked_ref()));
    });
    JsFuture::from(promise).await
}

impl IndexedDbChannel {
    /// Channel storing under `key` in `database`/`store`
    pub fn new(database: &str, store: &str, key: &str) -> Self {
        Self {
            database: database.to_string(),
            store: store.to_string(),
            key: key.to_string(),
        }
    }

    async fn open(&self) -> Result<IdbDatabase, ChannelError> {
        let factory = window_for(KIND)?
            .indexed_db()
            .map_err(unavailable(KIND))?
            .ok_or_else(|| ChannelError::unavailable(KIND, "indexedDB disabled"))?;
        let open = factory
            .open_with_u32(&self.database, SCHEMA_VERSION)
            .map_err(unavailable(KIND))?;

        let upgrade_request = open.clone();
        let store = self.store.clone();
        let on_upgrade = Closure::once_into_js(move |_event: Event| {
            let Ok(result) = upgrade_request.result() else {
                return;
            };
            let Ok(db) = result.dyn_into::<IdbDatabase>() else {
                return;
            };
            if !db.object_store_names().contains(&store) {
                if let Err(e) = db.create_object_store(&store) {
                    tracing::warn!(error = %js_message(&e), "could not create ban store");
                }
            }
        });
        open.set_onupgradeneeded(Some(on_upgrade.unchecked_ref()));

        let db = settle(&open).await.map_err(unavailable(KIND))?;
        db.dyn_into::<IdbDatabase>()
            .map_err(|_| ChannelError::unavailable(KIND, "open returned a non-database"))
    }

    async fn with_store<F>(&self, mode: IdbTransactionMode, op: F) -> Result<JsValue, ChannelError>
    where
        F: FnOnce(&IdbObjectStore, &JsValue) -> Result<IdbRequest, JsValue>,
    {
        let db = self.open().await?;
        let outcome = async {
            let tx = db
                .transaction_with_str_and_mode(&self.store, mode)
                .map_err(unavailable(KIND))?;
            let store = tx.object_store(&self.store).map_err(unavailable(KIND))?;
            let request = op(&store, &JsValue::from_str(&self.key)).map_err(unavailable(KIND))?;
            settle(&request).await.map_err(unavailable(KIND))
        }
        .await;
        db.close();
        outcome
    }
}

#[async_trait(?Send)]
impl StorageChannel for IndexedDbChannel {
    fn kind(&self) -> ChannelKind {
        KIND
    }

    async fn write(&self, payload: &str) -> Result<(), ChannelError> {
        let value = JsValue::from_str(payload);
        self.with_store(IdbTransactionMode::Readwrite, |store, key| {
            store.put_with_key(&value, key)
        })
        .await
        .map(|_| ())
    }

    async fn read(&self) -> Result<Option<String>, ChannelError> {
        let value = self
            .with_store(IdbTransactionMode::Readonly, |store, key| store.get(key))
            .await?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        value
            .as_string()
            .map(Some)
            .ok_or_else(|| ChannelError::malformed(KIND, "stored record is not text"))
    }

    async fn clear(&self) -> Result<(), ChannelError> {
        self.with_store(IdbTransactionMode::Readwrite, |store, key| store.delete(key))
            .await
            .map(|_| ())
    }
}
