//! Origin lookup doubles

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warden_core::{LookupError, OriginLookup};

/// Resolves to a fixed address and counts calls
#[derive(Debug, Clone)]
pub struct StaticOrigin {
    origin: String,
    calls: Arc<AtomicUsize>,
}

impl StaticOrigin {
    /// Always resolve to `origin`
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolutions so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl OriginLookup for StaticOrigin {
    async fn resolve(&self) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.origin.clone())
    }
}

/// Never resolves
#[derive(Debug, Clone, Default)]
pub struct FailingOrigin {
    calls: Arc<AtomicUsize>,
}

impl FailingOrigin {
    /// Create a failing resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl OriginLookup for FailingOrigin {
    async fn resolve(&self) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LookupError::transport("origin-lookup", "request timed out"))
    }
}
