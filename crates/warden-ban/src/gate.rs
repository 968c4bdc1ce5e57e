//! Signup and login admission

use tracing::{info, warn};
use warden_core::{EvidenceSource, WardenResult};

use crate::index::IdentityIndex;
use crate::reconciler::{BanReconciler, Verdict};

/// Result of an admission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The account may proceed
    Allowed,
    /// The account or device is banned
    Denied {
        /// Reason to show the visitor
        reason: String,
        /// Where the ban was found
        source: EvidenceSource,
    },
}

impl Admission {
    /// Whether admission was granted
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Runs the ban check in front of account creation and sign-in.
///
/// Denials re-spread the ban to every local channel. Admitted accounts are
/// registered in the identity index under the current origin and
/// fingerprint.
#[derive(Debug, Clone)]
pub struct SessionGate {
    reconciler: BanReconciler,
    index: IdentityIndex,
}

impl SessionGate {
    /// Gate over the given reconciler and index
    pub fn new(reconciler: BanReconciler, index: IdentityIndex) -> Self {
        Self { reconciler, index }
    }

    /// Admit a new account named `username`
    pub async fn admit_signup(&self, username: &str) -> WardenResult<Admission> {
        if let Some(denied) = self.screen().await {
            info!(%username, "signup denied");
            return Ok(denied);
        }
        self.record_session(username).await?;
        Ok(Admission::Allowed)
    }

    /// Admit an existing account signing in as `username`.
    ///
    /// Besides the device check, a profile flagged `banned` denies the
    /// login and seeds the local channels with its reason.
    pub async fn admit_login(&self, username: &str) -> WardenResult<Admission> {
        if let Some(denied) = self.screen().await {
            info!(%username, "login denied");
            return Ok(denied);
        }

        match self.index.profile_ban(username).await {
            Ok(Some(record)) => {
                self.reconciler.channels().write_all(&record.reason).await;
                info!(%username, reason = %record.reason, "login denied by profile flag");
                return Ok(Admission::Denied {
                    reason: record.reason,
                    source: EvidenceSource::Profile,
                });
            }
            Ok(None) => {}
            Err(error) => warn!(%username, %error, "profile unreadable during login"),
        }

        self.record_session(username).await?;
        Ok(Admission::Allowed)
    }

    /// Register `username` under the current origin and fingerprint
    pub async fn record_session(&self, username: &str) -> WardenResult<()> {
        let identity = self.reconciler.current_identity().await;
        self.index
            .register_identity(
                username,
                identity.network_origin.as_deref(),
                &identity.fingerprint,
            )
            .await
    }

    async fn screen(&self) -> Option<Admission> {
        let report = self.reconciler.check().await;
        let Verdict::Banned(record) = report.verdict else {
            return None;
        };
        let source = report.source.unwrap_or(EvidenceSource::Profile);
        if matches!(source, EvidenceSource::Local(_)) {
            self.reconciler.channels().write_all(&record.reason).await;
        }
        Some(Admission::Denied {
            reason: record.reason,
            source,
        })
    }
}
