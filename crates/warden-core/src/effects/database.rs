//! Remote database effects

use crate::errors::LookupError;
use async_trait::async_trait;
use serde_json::Value;

/// Hierarchical, path-addressed JSON store.
///
/// Paths are `/`-separated and may carry a leading `/`. A missing node
/// reads as `Ok(None)`. Every failure is an explicit [`LookupError`];
/// callers decide whether to collapse it into absence.
#[async_trait(?Send)]
pub trait RemoteDatabase {
    /// Read the node at `path`
    async fn get(&self, path: &str) -> Result<Option<Value>, LookupError>;

    /// Replace the node at `path`
    async fn set(&self, path: &str, value: &Value) -> Result<(), LookupError>;

    /// Merge the object `patch` into the node at `path`
    async fn update(&self, path: &str, patch: &Value) -> Result<(), LookupError>;

    /// Remove the node at `path`
    async fn delete(&self, path: &str) -> Result<(), LookupError>;
}
