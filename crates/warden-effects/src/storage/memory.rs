//! In-memory storage channel

use async_lock::RwLock;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use warden_core::{ChannelError, ChannelKind, StorageChannel};

/// In-memory channel standing in for any backend.
///
/// Clones share state, so a test can keep a handle while the channel set
/// owns another. Toggling availability simulates storage being disabled.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    kind: ChannelKind,
    slot: Arc<RwLock<Option<String>>>,
    available: Arc<AtomicBool>,
}

impl MemoryChannel {
    /// Create an empty, available channel
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            slot: Arc::new(RwLock::new(None)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// One empty channel per kind, in precedence order
    pub fn full_set() -> Vec<MemoryChannel> {
        ChannelKind::PRECEDENCE.into_iter().map(Self::new).collect()
    }

    /// Enable or disable the backend
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Place raw text directly, bypassing availability (for seeding tests)
    pub async fn seed(&self, raw: impl Into<String>) {
        *self.slot.write().await = Some(raw.into());
    }

    /// Raw stored text, bypassing availability
    pub async fn peek(&self) -> Option<String> {
        self.slot.read().await.clone()
    }

    /// Drop the stored value, as a user clearing site data would
    pub async fn wipe(&self) {
        *self.slot.write().await = None;
    }

    fn check(&self) -> Result<(), ChannelError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ChannelError::unavailable(self.kind, "storage disabled"))
        }
    }
}

#[async_trait(?Send)]
impl StorageChannel for MemoryChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn write(&self, payload: &str) -> Result<(), ChannelError> {
        self.check()?;
        *self.slot.write().await = Some(payload.to_string());
        Ok(())
    }

    async fn read(&self) -> Result<Option<String>, ChannelError> {
        self.check()?;
        Ok(self.slot.read().await.clone())
    }

    async fn clear(&self) -> Result<(), ChannelError> {
        self.check()?;
        *self.slot.write().await = None;
        Ok(())
    }
}
