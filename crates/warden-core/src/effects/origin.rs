//! Network-origin lookup effects

use crate::errors::LookupError;
use async_trait::async_trait;

/// Resolves the caller's public network address.
///
/// Best effort: failure means "skip the origin key", never a fatal error.
#[async_trait(?Send)]
pub trait OriginLookup {
    /// Resolve the current origin
    async fn resolve(&self) -> Result<String, LookupError>;
}
