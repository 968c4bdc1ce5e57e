//! Moderator ban administration

use std::sync::Arc;
use tracing::{info, warn};
use warden_core::{BanRecord, PhysicalClock, WardenError, WardenResult};

use crate::index::{IdentityIndex, UserProfile};

/// Issues bans against a target user's recorded signals.
///
/// Write-only: never reads local channels and never enforces.
#[derive(Clone)]
pub struct BanAdministration {
    index: IdentityIndex,
    clock: Arc<dyn PhysicalClock>,
    default_reason: String,
}

impl BanAdministration {
    /// Administration over `index`
    pub fn new(
        index: IdentityIndex,
        clock: Arc<dyn PhysicalClock>,
        default_reason: impl Into<String>,
    ) -> Self {
        Self {
            index,
            clock,
            default_reason: default_reason.into(),
        }
    }

    /// Ban `username`, indexing the record under every signal the target's
    /// profile knows about, and flag the profile itself.
    ///
    /// A blank reason falls back to the configured default. An unreadable
    /// profile still bans by username alone.
    pub async fn ban_user(&self, username: &str, reason: &str) -> WardenResult<BanRecord> {
        let username = username.trim();
        if username.is_empty() {
            return Err(WardenError::invalid("username must not be empty"));
        }
        let reason = if reason.trim().is_empty() {
            self.default_reason.as_str()
        } else {
            reason
        };

        let profile = match self.index.profile(username).await {
            Ok(profile) => profile.unwrap_or_default(),
            Err(error) => {
                warn!(%username, %error, "target profile unreadable, banning by username only");
                UserProfile::default()
            }
        };

        let mut record = BanRecord::new(reason, self.clock.now())
            .with_username(username)
            .with_origin(profile.known_origin());
        if let Some(fingerprint) = profile.known_fingerprint() {
            record = record.with_fingerprint(fingerprint);
        }

        let indexed = self.index.record_ban(&record).await;
        let flagged = self.index.flag_profile(username, reason).await;
        let keys = indexed?;
        flagged?;

        info!(%username, %reason, keys = ?keys, "user banned");
        Ok(record)
    }
}

impl std::fmt::Debug for BanAdministration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BanAdministration")
            .field("default_reason", &self.default_reason)
            .finish_non_exhaustive()
    }
}
