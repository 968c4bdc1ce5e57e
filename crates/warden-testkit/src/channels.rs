//! Misbehaving storage channels

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warden_core::{ChannelError, ChannelKind, StorageChannel};

#[derive(Debug, Clone)]
enum Fault {
    Unavailable,
    Garbage(String),
}

/// Channel that refuses every operation or serves a fixed unparseable
/// payload, counting attempts either way.
#[derive(Debug, Clone)]
pub struct FaultyChannel {
    kind: ChannelKind,
    fault: Fault,
    attempts: Arc<AtomicUsize>,
}

impl FaultyChannel {
    /// Every operation fails as if the backend were disabled
    pub fn unavailable(kind: ChannelKind) -> Self {
        Self {
            kind,
            fault: Fault::Unavailable,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reads return `raw`; writes are accepted and dropped
    pub fn garbage(kind: ChannelKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            fault: Fault::Garbage(raw.into()),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Operations attempted so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn attempt(&self) -> Result<(), ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            Fault::Unavailable => Err(ChannelError::unavailable(self.kind, "injected failure")),
            Fault::Garbage(_) => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl StorageChannel for FaultyChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    async fn write(&self, _payload: &str) -> Result<(), ChannelError> {
        self.attempt()
    }

    async fn read(&self) -> Result<Option<String>, ChannelError> {
        self.attempt()?;
        match &self.fault {
            Fault::Garbage(raw) => Ok(Some(raw.clone())),
            Fault::Unavailable => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), ChannelError> {
        self.attempt()
    }
}
