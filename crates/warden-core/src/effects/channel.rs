//! Local storage channel effects

use crate::errors::ChannelError;
use crate::types::ChannelKind;
use async_trait::async_trait;

/// One independent local storage backend holding a ban payload.
///
/// Channels move opaque payload text; encoding and decoding happen in
/// [`crate::payload`]. Every operation may fail on its own without
/// affecting other channels.
#[async_trait(?Send)]
pub trait StorageChannel {
    /// Which backend this is
    fn kind(&self) -> ChannelKind;

    /// Store payload text, replacing any previous value
    async fn write(&self, payload: &str) -> Result<(), ChannelError>;

    /// Read payload text; `Ok(None)` when the backend holds nothing
    async fn read(&self) -> Result<Option<String>, ChannelError>;

    /// Remove the payload
    async fn clear(&self) -> Result<(), ChannelError>;
}
