//! Local channel set
//!
//! A fixed, precedence-ordered list of [`StorageChannel`]s. Writes fan
//! out to every channel and swallow individual failures; reads walk the
//! list in order and stop at the first parseable positive flag.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};
use warden_core::{
    decode_flag, encode_flag, ChannelError, ChannelKind, Fault, LocalBanFlag, PhysicalClock,
    StorageChannel,
};

/// Result of [`LocalChannelSet::read_any`]
#[derive(Debug, Clone, Default)]
pub struct LocalRead {
    /// First positive flag and the channel holding it; `None` means
    /// "no local evidence", which is not the same as "not banned"
    pub found: Option<(ChannelKind, LocalBanFlag)>,
    /// Channels that failed or held garbage along the way
    pub faults: Vec<Fault>,
}

/// Result of [`LocalChannelSet::write_all`]
#[derive(Debug, Clone, Default)]
pub struct LocalWrite {
    /// Channels that accepted the payload
    pub written: Vec<ChannelKind>,
    /// Channels that refused it
    pub faults: Vec<Fault>,
}

/// Precedence-ordered set of local ban caches
#[derive(Clone)]
pub struct LocalChannelSet {
    channels: Vec<Arc<dyn StorageChannel>>,
    clock: Arc<dyn PhysicalClock>,
    default_reason: String,
}

impl LocalChannelSet {
    /// Build a set; channels are ordered by [`ChannelKind::PRECEDENCE`]
    /// whatever order they are passed in
    pub fn new(
        mut channels: Vec<Arc<dyn StorageChannel>>,
        clock: Arc<dyn PhysicalClock>,
        default_reason: impl Into<String>,
    ) -> Self {
        channels.sort_by_key(|c| c.kind().rank());
        Self {
            channels,
            clock,
            default_reason: default_reason.into(),
        }
    }

    /// Reason used for legacy payloads that carry none
    pub fn default_reason(&self) -> &str {
        &self.default_reason
    }

    /// Channel kinds in read order
    pub fn kinds(&self) -> Vec<ChannelKind> {
        self.channels.iter().map(|c| c.kind()).collect()
    }

    /// Write the ban flag to every channel.
    ///
    /// Each channel gets exactly one attempt; a failing channel never
    /// stops the others.
    pub async fn write_all(&self, reason: &str) -> LocalWrite {
        let flag = LocalBanFlag::new(reason, self.clock.now());
        let payload = encode_flag(&flag);

        let attempts = self.channels.iter().map(|channel| {
            let payload = payload.as_str();
            async move { (channel.kind(), channel.write(payload).await) }
        });

        let mut outcome = LocalWrite::default();
        for (kind, result) in join_all(attempts).await {
            match result {
                Ok(()) => {
                    debug!(channel = %kind, "ban flag written");
                    outcome.written.push(kind);
                }
                Err(error) => {
                    warn!(channel = %kind, %error, "ban flag write failed");
                    outcome.faults.push(error.into());
                }
            }
        }
        outcome
    }

    /// Return the first positive flag in precedence order.
    ///
    /// Unavailable channels and malformed payloads are recorded as faults
    /// and treated as absent, never as banned.
    pub async fn read_any(&self) -> LocalRead {
        let mut outcome = LocalRead::default();
        for channel in &self.channels {
            let kind = channel.kind();
            match self.read_one(channel.as_ref()).await {
                Ok(Some(flag)) => {
                    debug!(channel = %kind, reason = %flag.reason, "cached ban flag found");
                    outcome.found = Some((kind, flag));
                    break;
                }
                Ok(None) => debug!(channel = %kind, "no cached ban flag"),
                Err(error) => {
                    warn!(channel = %kind, %error, "ban flag read failed");
                    outcome.faults.push(error.into());
                }
            }
        }
        outcome
    }

    async fn read_one(
        &self,
        channel: &dyn StorageChannel,
    ) -> Result<Option<LocalBanFlag>, ChannelError> {
        let Some(raw) = channel.read().await? else {
            return Ok(None);
        };
        decode_flag(&raw, &self.default_reason, self.clock.now())
            .map_err(|e| ChannelError::malformed(channel.kind(), e.0))
    }
}

impl std::fmt::Debug for LocalChannelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalChannelSet")
            .field("channels", &self.kinds())
            .field("default_reason", &self.default_reason)
            .finish_non_exhaustive()
    }
}
