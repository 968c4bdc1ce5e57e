//! Database doubles

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warden_core::{LookupError, RemoteDatabase};

/// Wraps another database and counts reads and writes
#[derive(Clone)]
pub struct CountingDatabase {
    inner: Arc<dyn RemoteDatabase>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl CountingDatabase {
    /// Count calls made to `inner`
    pub fn new(inner: impl RemoteDatabase + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            reads: Arc::new(AtomicUsize::new(0)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// `get` calls so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// `set`, `update` and `delete` calls so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Every call so far
    pub fn total_calls(&self) -> usize {
        self.reads() + self.writes()
    }

    /// Zero both counters
    pub fn reset(&self) {
        self.reads.store(0, Ordering::SeqCst);
        self.writes.store(0, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for CountingDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountingDatabase")
            .field("reads", &self.reads())
            .field("writes", &self.writes())
            .finish_non_exhaustive()
    }
}

#[async_trait(?Send)]
impl RemoteDatabase for CountingDatabase {
    async fn get(&self, path: &str) -> Result<Option<Value>, LookupError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), LookupError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &str, patch: &Value) -> Result<(), LookupError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(path, patch).await
    }

    async fn delete(&self, path: &str) -> Result<(), LookupError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(path).await
    }
}

/// Database whose every call fails at the transport layer
#[derive(Debug, Clone, Default)]
pub struct UnreachableDatabase {
    calls: Arc<AtomicUsize>,
}

impl UnreachableDatabase {
    /// Create an unreachable database
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn refuse(&self, path: &str) -> LookupError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        LookupError::transport(path, "connection refused")
    }
}

#[async_trait(?Send)]
impl RemoteDatabase for UnreachableDatabase {
    async fn get(&self, path: &str) -> Result<Option<Value>, LookupError> {
        Err(self.refuse(path))
    }

    async fn set(&self, path: &str, _value: &Value) -> Result<(), LookupError> {
        Err(self.refuse(path))
    }

    async fn update(&self, path: &str, _patch: &Value) -> Result<(), LookupError> {
        Err(self.refuse(path))
    }

    async fn delete(&self, path: &str) -> Result<(), LookupError> {
        Err(self.refuse(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_effects::MemoryDatabase;

    #[tokio::test]
    async fn counts_reads_and_writes_separately() {
        let db = CountingDatabase::new(MemoryDatabase::new());
        db.set("a/b", &Value::Bool(true)).await.unwrap();
        assert_eq!(db.get("a/b").await.unwrap(), Some(Value::Bool(true)));
        db.delete("a").await.unwrap();
        assert_eq!((db.reads(), db.writes()), (1, 2));
        db.reset();
        assert_eq!(db.total_calls(), 0);
    }

    #[tokio::test]
    async fn unreachable_database_always_fails() {
        let db = UnreachableDatabase::new();
        assert!(matches!(
            db.get("bans/users/x").await,
            Err(LookupError::Transport { .. })
        ));
        assert!(db.update("users/x", &Value::Null).await.is_err());
        assert_eq!(db.calls(), 2);
    }
}
