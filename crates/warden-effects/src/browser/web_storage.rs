//! `localStorage` / `sessionStorage` channels

use super::{unavailable, window_for};
use async_trait::async_trait;
use warden_core::{ChannelError, ChannelKind, StorageChannel};
use web_sys::Storage;

/// Which Web Storage area a channel uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    /// Persists across tabs and restarts
    Local,
    /// Cleared when the tab closes
    Session,
}

/// Web Storage channel
#[derive(Debug, Clone)]
pub struct WebStorageChannel {
    area: StorageArea,
    key: String,
}

impl WebStorageChannel {
    /// Channel storing under `key` in `area`
    pub fn new(area: StorageArea, key: &str) -> Self {
        Self {
            area,
            key: key.to_string(),
        }
    }

    fn storage(&self) -> Result<Storage, ChannelError> {
        let kind = self.kind();
        let window = window_for(kind)?;
        let storage = match self.area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        };
        storage
            .map_err(unavailable(kind))?
            .ok_or_else(|| ChannelError::unavailable(kind, "storage disabled"))
    }
}

#[async_trait(?Send)]
impl StorageChannel for WebStorageChannel {
    fn kind(&self) -> ChannelKind {
        match self.area {
            StorageArea::Local => ChannelKind::LocalStorage,
            StorageArea::Session => ChannelKind::SessionStorage,
        }
    }

    async fn write(&self, payload: &str) -> Result<(), ChannelError> {
        self.storage()?
            .set_item(&self.key, payload)
            .map_err(unavailable(self.kind()))
    }

    async fn read(&self) -> Result<Option<String>, ChannelError> {
        self.storage()?
            .get_item(&self.key)
            .map_err(unavailable(self.kind()))
    }

    async fn clear(&self) -> Result<(), ChannelError> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(unavailable(self.kind()))
    }
}
