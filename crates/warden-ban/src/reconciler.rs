//! Ban reconciliation
//!
//! One [`BanReconciler::check`] call walks a small state machine:
//!
//! ```text
//! Unchecked -> LocalChecked -> (ServerChecked) -> Resolved { Allowed | Banned }
//! ```
//!
//! Cached positive evidence short-circuits before any network call. Without
//! it the identity index is consulted key by key (username, origin,
//! fingerprint). A username miss falls back to the `banned` flag on the
//! user's own profile. A server hit is written back to every local channel.
//! Absence of evidence, including absence caused by errors, is `Allowed`.

use std::sync::Arc;
use tracing::{debug, info, warn};
use warden_core::{
    BanRecord, EvidenceSource, Fault, Identity, IndexKey, LookupTarget, OriginLookup,
    SessionSource,
};

use crate::channels::LocalChannelSet;
use crate::fingerprint::FingerprintGenerator;
use crate::index::IdentityIndex;

/// Progress of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckPhase {
    /// Nothing consulted yet
    Unchecked,
    /// Local channels read
    LocalChecked,
    /// Identity index consulted
    ServerChecked,
    /// Verdict reached
    Resolved,
}

/// Outcome of a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No evidence of a ban
    Allowed,
    /// Banned by the enclosed record
    Banned(BanRecord),
}

impl Verdict {
    /// Whether the verdict is a ban
    pub fn is_banned(&self) -> bool {
        matches!(self, Verdict::Banned(_))
    }

    /// The record behind a ban
    pub fn into_record(self) -> Option<BanRecord> {
        match self {
            Verdict::Banned(record) => Some(record),
            Verdict::Allowed => None,
        }
    }
}

/// Everything a check learned, including what went wrong along the way
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Final verdict
    pub verdict: Verdict,
    /// Where a ban was found
    pub source: Option<EvidenceSource>,
    /// Last phase entered before resolving: `LocalChecked` for a cached
    /// hit, `ServerChecked` otherwise
    pub resolved_after: CheckPhase,
    /// Faults swallowed while checking
    pub faults: Vec<Fault>,
}

/// Tracks phase transitions and collected faults for one check
struct CheckRun {
    phase: CheckPhase,
    faults: Vec<Fault>,
}

impl CheckRun {
    fn new() -> Self {
        Self {
            phase: CheckPhase::Unchecked,
            faults: Vec::new(),
        }
    }

    fn advance(&mut self, next: CheckPhase) {
        debug_assert!(next > self.phase);
        debug!(from = ?self.phase, to = ?next, "ban check phase");
        self.phase = next;
    }

    fn resolve(mut self, verdict: Verdict, source: Option<EvidenceSource>) -> CheckReport {
        let resolved_after = self.phase;
        self.advance(CheckPhase::Resolved);
        CheckReport {
            verdict,
            source,
            resolved_after,
            faults: self.faults,
        }
    }
}

/// Decides whether the current visitor is banned
#[derive(Clone)]
pub struct BanReconciler {
    channels: LocalChannelSet,
    index: IdentityIndex,
    fingerprints: FingerprintGenerator,
    origin: Arc<dyn OriginLookup>,
    session: Arc<dyn SessionSource>,
}

impl BanReconciler {
    /// Reconciler over the given collaborators
    pub fn new(
        channels: LocalChannelSet,
        index: IdentityIndex,
        fingerprints: FingerprintGenerator,
        origin: Arc<dyn OriginLookup>,
        session: Arc<dyn SessionSource>,
    ) -> Self {
        Self {
            channels,
            index,
            fingerprints,
            origin,
            session,
        }
    }

    /// Local channel set this reconciler reads and heals
    pub fn channels(&self) -> &LocalChannelSet {
        &self.channels
    }

    /// Current session username, blank treated as absent
    pub fn session_user(&self) -> Option<String> {
        self.session
            .current_user()
            .map(|u| u.trim().to_owned())
            .filter(|u| !u.is_empty())
    }

    /// Best-effort origin resolution; `None` on any failure
    pub async fn resolve_origin(&self) -> Result<Option<String>, Fault> {
        match self.origin.resolve().await {
            Ok(origin) => {
                let origin = origin.trim();
                Ok((!origin.is_empty()).then(|| origin.to_owned()))
            }
            Err(error) => {
                warn!(%error, "origin lookup failed");
                Err(Fault::lookup(LookupTarget::OriginResolver, &error))
            }
        }
    }

    /// Identity as currently observable, resolving the origin
    pub async fn current_identity(&self) -> Identity {
        Identity {
            username: self.session_user(),
            network_origin: self.resolve_origin().await.ok().flatten(),
            fingerprint: self.fingerprints.fingerprint(),
        }
    }

    /// The ban record for this visitor, or `None`. Never fails.
    pub async fn check_ban(&self) -> Option<BanRecord> {
        self.check().await.verdict.into_record()
    }

    /// Run one full check and report how it was decided
    pub async fn check(&self) -> CheckReport {
        let mut run = CheckRun::new();

        let local = self.channels.read_any().await;
        run.faults.extend(local.faults);
        run.advance(CheckPhase::LocalChecked);

        if let Some((channel, flag)) = local.found {
            let identity = Identity {
                username: self.session_user(),
                network_origin: None,
                fingerprint: self.fingerprints.fingerprint(),
            };
            info!(%channel, reason = %flag.reason, "ban confirmed from local cache");
            let record = BanRecord::from_flag(&flag, &identity);
            return self.finish(run, Verdict::Banned(record), Some(EvidenceSource::Local(channel)));
        }

        let found = self.query_index(&mut run).await;
        run.advance(CheckPhase::ServerChecked);

        match found {
            Some((source, record)) => {
                info!(%source, reason = %record.reason, "ban confirmed by server");
                let healed = self.channels.write_all(&record.reason).await;
                debug!(channels = healed.written.len(), "local ban cache healed");
                run.faults.extend(healed.faults);
                self.finish(run, Verdict::Banned(record), Some(source))
            }
            None => self.finish(run, Verdict::Allowed, None),
        }
    }

    /// Sequential lookups in precedence order; the origin is only resolved
    /// once the username key and profile flag have missed.
    async fn query_index(&self, run: &mut CheckRun) -> Option<(EvidenceSource, BanRecord)> {
        for key in IndexKey::PRECEDENCE {
            let value = match key {
                IndexKey::Username => self.session_user(),
                IndexKey::Origin => match self.resolve_origin().await {
                    Ok(origin) => origin,
                    Err(fault) => {
                        run.faults.push(fault);
                        None
                    }
                },
                IndexKey::Fingerprint => {
                    Some(self.fingerprints.fingerprint()).filter(|fp| !fp.is_empty())
                }
            };
            let Some(value) = value else {
                debug!(%key, "identity key unknown, skipped");
                continue;
            };

            match self.index.lookup(key, &value).await {
                Ok(Some(record)) => return Some((EvidenceSource::Index(key), record)),
                Ok(None) if key == IndexKey::Username => {
                    debug!(%key, "no ban indexed, reading profile flag");
                    if let Some(record) = self.profile_flag(&value, run).await {
                        return Some((EvidenceSource::Profile, record));
                    }
                }
                Ok(None) => debug!(%key, "no ban indexed"),
                Err(error) => {
                    warn!(%key, %error, "identity index lookup failed");
                    run.faults.push(Fault::lookup(LookupTarget::Index(key), &error));
                }
            }
        }
        None
    }

    async fn profile_flag(&self, username: &str, run: &mut CheckRun) -> Option<BanRecord> {
        match self.index.profile_ban(username).await {
            Ok(found) => found,
            Err(error) => {
                warn!(%username, %error, "profile lookup failed");
                run.faults.push(Fault::lookup(LookupTarget::Profile, &error));
                None
            }
        }
    }

    fn finish(
        &self,
        run: CheckRun,
        verdict: Verdict,
        source: Option<EvidenceSource>,
    ) -> CheckReport {
        let report = run.resolve(verdict, source);
        if !report.faults.is_empty() {
            debug!(faults = report.faults.len(), "ban check finished with faults");
        }
        report
    }
}

impl std::fmt::Debug for BanReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BanReconciler")
            .field("channels", &self.channels)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use warden_core::{
        encode_flag, ChannelKind, EnvironmentSignals, LocalBanFlag, RemoteDatabase,
        StorageChannel,
    };
    use warden_effects::{MemoryChannel, MemoryDatabase, SimulatedClock, StaticEnvironment, StaticSession};
    use warden_testkit::{CountingDatabase, FailingOrigin, StaticOrigin, UnreachableDatabase};

    struct Rig {
        channels: Vec<MemoryChannel>,
        db: CountingDatabase,
        session: StaticSession,
        origin: StaticOrigin,
    }

    fn signals() -> EnvironmentSignals {
        EnvironmentSignals {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".into(),
            language: "en-GB".into(),
            screen_width: 1920,
            screen_height: 1080,
            color_depth: 24,
            timezone_offset_minutes: 0,
            hardware_concurrency: 8,
            platform: "Linux x86_64".into(),
            canvas_signature: "data:image/png;base64,AAAA".into(),
        }
    }

    fn rig() -> Rig {
        Rig {
            channels: MemoryChannel::full_set(),
            db: CountingDatabase::new(MemoryDatabase::new()),
            session: StaticSession::anonymous(),
            origin: StaticOrigin::new("203.0.113.9"),
        }
    }

    fn reconciler_with(rig: &Rig, db: Arc<dyn RemoteDatabase>, origin: Arc<dyn OriginLookup>) -> BanReconciler {
        let clock = Arc::new(SimulatedClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        ));
        let channels = LocalChannelSet::new(
            rig.channels
                .iter()
                .cloned()
                .map(|c| Arc::new(c) as Arc<dyn StorageChannel>)
                .collect(),
            clock.clone(),
            "Access Denied",
        );
        BanReconciler::new(
            channels,
            IdentityIndex::new(db, clock, "Access Denied"),
            FingerprintGenerator::new(Arc::new(StaticEnvironment::new(signals()))),
            origin,
            Arc::new(rig.session.clone()),
        )
    }

    fn reconciler(rig: &Rig) -> BanReconciler {
        reconciler_with(rig, Arc::new(rig.db.clone()), Arc::new(rig.origin.clone()))
    }

    fn fingerprint() -> String {
        warden_core::fingerprint_of(&signals())
    }

    #[tokio::test]
    async fn cached_flag_short_circuits_the_network() {
        let rig = rig();
        rig.channels[ChannelKind::LocalStorage.rank()]
            .seed(&encode_flag(&LocalBanFlag::new("spam", Utc::now())))
            .await;

        let report = reconciler(&rig).check().await;
        assert_eq!(report.source, Some(EvidenceSource::Local(ChannelKind::LocalStorage)));
        assert_eq!(report.resolved_after, CheckPhase::LocalChecked);
        assert_matches!(report.verdict, Verdict::Banned(ref r) if r.reason == "spam");
        assert_eq!(rig.db.total_calls(), 0);
        assert_eq!(rig.origin.calls(), 0);
    }

    #[tokio::test]
    async fn username_wins_over_origin_and_fingerprint() {
        let rig = rig();
        rig.session.sign_in("mallory");
        let db = &rig.db;
        for (path, reason) in [
            ("bans/users/mallory", "by name"),
            ("bans/ips/203_0_113_9", "by origin"),
        ] {
            db.set(path, &serde_json::json!({ "reason": reason }))
                .await
                .unwrap();
        }

        let report = reconciler(&rig).check().await;
        assert_eq!(report.source, Some(EvidenceSource::Index(IndexKey::Username)));
        assert_eq!(report.verdict.into_record().unwrap().reason, "by name");
        assert_eq!(rig.origin.calls(), 0);
    }

    #[tokio::test]
    async fn flagged_profile_bans_signed_in_session() {
        let rig = rig();
        rig.session.sign_in("alice");
        rig.db
            .set(
                "users/alice",
                &serde_json::json!({ "banned": true, "banReason": "legacy" }),
            )
            .await
            .unwrap();
        rig.db
            .set("bans/ips/203_0_113_9", &serde_json::json!({ "reason": "by origin" }))
            .await
            .unwrap();

        let report = reconciler(&rig).check().await;
        assert_eq!(report.source, Some(EvidenceSource::Profile));
        assert_eq!(report.resolved_after, CheckPhase::ServerChecked);
        let record = report.verdict.into_record().unwrap();
        assert_eq!(record.reason, "legacy");
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(rig.origin.calls(), 0);
        for channel in &rig.channels {
            assert!(channel.peek().await.unwrap().contains("legacy"));
        }
    }

    #[tokio::test]
    async fn unflagged_profile_falls_through_to_origin() {
        let rig = rig();
        rig.session.sign_in("walt");
        rig.db
            .set("users/walt", &serde_json::json!({ "banned": false }))
            .await
            .unwrap();
        rig.db
            .set("bans/ips/203_0_113_9", &serde_json::json!({ "reason": "by origin" }))
            .await
            .unwrap();

        let report = reconciler(&rig).check().await;
        assert_eq!(report.source, Some(EvidenceSource::Index(IndexKey::Origin)));
        assert_eq!(rig.origin.calls(), 1);
    }

    #[tokio::test]
    async fn origin_is_consulted_before_fingerprint() {
        let rig = rig();
        rig.db
            .set("bans/ips/203_0_113_9", &serde_json::json!({ "reason": "by origin" }))
            .await
            .unwrap();
        rig.db
            .set(
                &format!("bans/fingerprints/{}", fingerprint()),
                &serde_json::json!({ "reason": "by fingerprint" }),
            )
            .await
            .unwrap();

        let report = reconciler(&rig).check().await;
        assert_eq!(report.source, Some(EvidenceSource::Index(IndexKey::Origin)));
        assert_eq!(report.verdict.into_record().unwrap().reason, "by origin");
    }

    #[tokio::test]
    async fn server_hit_heals_every_channel() {
        let rig = rig();
        rig.db
            .set(
                &format!("bans/fingerprints/{}", fingerprint()),
                &serde_json::json!({ "reason": "ban evasion" }),
            )
            .await
            .unwrap();

        let record = reconciler(&rig).check_ban().await.unwrap();
        assert_eq!(record.reason, "ban evasion");
        for channel in &rig.channels {
            assert!(channel.peek().await.unwrap().contains("ban evasion"));
        }

        let calls = rig.db.total_calls();
        let again = reconciler(&rig).check().await;
        assert_eq!(again.source, Some(EvidenceSource::Local(ChannelKind::ResponseCache)));
        assert_eq!(rig.db.total_calls(), calls);
    }

    #[tokio::test]
    async fn failing_origin_is_skipped() {
        let rig = rig();
        rig.db
            .set(
                &format!("bans/fingerprints/{}", fingerprint()),
                &serde_json::json!({ "reason": "fp" }),
            )
            .await
            .unwrap();
        let reconciler =
            reconciler_with(&rig, Arc::new(rig.db.clone()), Arc::new(FailingOrigin::new()));

        let report = reconciler.check().await;
        assert!(report.verdict.is_banned());
        assert!(report
            .faults
            .iter()
            .any(|f| matches!(f, Fault::LookupFailed { target: LookupTarget::OriginResolver, .. })));
    }

    #[tokio::test]
    async fn unreachable_index_fails_open() {
        let rig = rig();
        rig.session.sign_in("alice");
        let reconciler =
            reconciler_with(&rig, Arc::new(UnreachableDatabase::new()), Arc::new(rig.origin.clone()));

        let report = reconciler.check().await;
        assert_eq!(report.verdict, Verdict::Allowed);
        assert_eq!(report.resolved_after, CheckPhase::ServerChecked);
        let failed: Vec<_> = report
            .faults
            .iter()
            .filter(|f| matches!(f, Fault::LookupFailed { .. }))
            .collect();
        assert_eq!(failed.len(), 3);
        for channel in &rig.channels {
            assert_eq!(channel.peek().await, None);
        }
    }

    #[tokio::test]
    async fn garbage_cache_is_not_a_ban() {
        let rig = rig();
        rig.channels[0].seed("not json at all").await;
        let report = reconciler(&rig).check().await;
        assert_eq!(report.verdict, Verdict::Allowed);
        assert!(report
            .faults
            .iter()
            .any(|f| matches!(f, Fault::MalformedCachedPayload { .. })));
    }
}
