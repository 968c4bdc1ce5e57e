//! Server-side identity index
//!
//! Layout in the remote database:
//!
//! ```text
//! bans/users/{username}            -> BanRecord
//! bans/ips/{sanitizedOrigin}       -> BanRecord
//! bans/fingerprints/{fingerprint}  -> BanRecord
//! identity/ips/{sanitizedOrigin}   -> { sanitizedUsername: username, ... }
//! identity/fingerprints/{fp}       -> { sanitizedUsername: username, ... }
//! users/{username}                 -> profile (lastIP, fingerprint, banned, banReason, ...)
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use warden_core::keys::{ban_path, identity_path, profile_path, sanitize_segment};
use warden_core::{
    BanRecord, IndexKey, LookupError, PhysicalClock, RemoteDatabase, WardenError, WardenResult,
};

/// Placeholder the signup flow stores when the origin could not be resolved
const UNKNOWN_ORIGIN: &str = "unknown";

/// The ban-relevant part of a user's profile record
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Last origin the user was seen from
    #[serde(rename = "lastIP")]
    pub last_ip: Option<String>,
    /// Last fingerprint the user was seen with
    pub fingerprint: Option<String>,
    /// Set by the banning operation
    pub banned: bool,
    /// Reason recorded alongside `banned`
    #[serde(rename = "banReason")]
    pub ban_reason: Option<String>,
}

impl UserProfile {
    /// Recorded origin, ignoring the `"unknown"` placeholder
    pub fn known_origin(&self) -> Option<String> {
        self.last_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty() && *ip != UNKNOWN_ORIGIN)
            .map(str::to_owned)
    }

    /// Recorded fingerprint, if any
    pub fn known_fingerprint(&self) -> Option<String> {
        self.fingerprint
            .as_deref()
            .map(str::trim)
            .filter(|fp| !fp.is_empty())
            .map(str::to_owned)
    }
}

/// Mapping from identity signals to ban records
#[derive(Clone)]
pub struct IdentityIndex {
    db: Arc<dyn RemoteDatabase>,
    clock: Arc<dyn PhysicalClock>,
    default_reason: String,
}

impl IdentityIndex {
    /// Index over `db`
    pub fn new(
        db: Arc<dyn RemoteDatabase>,
        clock: Arc<dyn PhysicalClock>,
        default_reason: impl Into<String>,
    ) -> Self {
        Self {
            db,
            clock,
            default_reason: default_reason.into(),
        }
    }

    /// Ban record stored under one key, if any
    pub async fn lookup(&self, key: IndexKey, value: &str) -> Result<Option<BanRecord>, LookupError> {
        let path = ban_path(key, value);
        debug!(%key, %path, "identity index lookup");
        let Some(raw) = self.db.get(&path).await? else {
            return Ok(None);
        };
        Ok(BanRecord::from_index_value(
            &raw,
            &self.default_reason,
            self.clock.now(),
        ))
    }

    /// Write `record` under every key it carries.
    ///
    /// All known keys are attempted even if one fails; the keys written are
    /// returned, or an error naming the keys that could not be written.
    pub async fn record_ban(&self, record: &BanRecord) -> WardenResult<Vec<IndexKey>> {
        let value = serde_json::to_value(record)?;
        let mut keys: Vec<(IndexKey, &str)> = Vec::with_capacity(3);
        if let Some(username) = record.username.as_deref() {
            keys.push((IndexKey::Username, username));
        }
        if let Some(origin) = record.origin.as_deref() {
            keys.push((IndexKey::Origin, origin));
        }
        if !record.fingerprint.trim().is_empty() {
            keys.push((IndexKey::Fingerprint, record.fingerprint.as_str()));
        }

        let mut written = Vec::new();
        let mut failed = Vec::new();
        for (key, signal) in keys {
            match self.db.set(&ban_path(key, signal), &value).await {
                Ok(()) => written.push(key),
                Err(error) => {
                    warn!(%key, %error, "ban record write failed");
                    failed.push(format!("{key}: {error}"));
                }
            }
        }
        if failed.is_empty() {
            Ok(written)
        } else {
            Err(WardenError::storage(format!(
                "ban record not indexed under {}",
                failed.join("; ")
            )))
        }
    }

    /// Profile record for `username`
    pub async fn profile(&self, username: &str) -> Result<Option<UserProfile>, LookupError> {
        let path = profile_path(username);
        let Some(raw) = self.db.get(&path).await? else {
            return Ok(None);
        };
        serde_json::from_value(raw)
            .map(Some)
            .map_err(|e| LookupError::decode(path, e.to_string()))
    }

    /// Ban carried by the user's own profile flag.
    ///
    /// A profile marked `banned` without a reason gets the default reason.
    /// The record carries the profile's last-seen signals.
    pub async fn profile_ban(&self, username: &str) -> Result<Option<BanRecord>, LookupError> {
        let Some(profile) = self.profile(username).await? else {
            return Ok(None);
        };
        if !profile.banned {
            return Ok(None);
        }
        let reason = profile
            .ban_reason
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(&self.default_reason);
        let mut record = BanRecord::new(reason, self.clock.now())
            .with_username(username)
            .with_origin(profile.known_origin());
        if let Some(fingerprint) = profile.known_fingerprint() {
            record = record.with_fingerprint(fingerprint);
        }
        Ok(Some(record))
    }

    /// Mark the user's own profile as banned
    pub async fn flag_profile(&self, username: &str, reason: &str) -> WardenResult<()> {
        self.db
            .update(
                &profile_path(username),
                &json!({ "banned": true, "banReason": reason }),
            )
            .await
            .map_err(|e| WardenError::storage(e.to_string()))
    }

    /// Record that `username` was seen under `origin` and `fingerprint`.
    ///
    /// Adds the user to both observation sets and refreshes the profile's
    /// last-seen signals. Every write is attempted.
    pub async fn register_identity(
        &self,
        username: &str,
        origin: Option<&str>,
        fingerprint: &str,
    ) -> WardenResult<()> {
        let now = self.clock.now();
        let mut member = Map::new();
        member.insert(sanitize_segment(username), Value::String(username.to_string()));
        let member = Value::Object(member);
        let mut writes: Vec<(String, Value)> = Vec::with_capacity(3);

        if let Some(path) = origin.and_then(|o| identity_path(IndexKey::Origin, o)) {
            writes.push((path, member.clone()));
        }
        if !fingerprint.trim().is_empty() {
            if let Some(path) = identity_path(IndexKey::Fingerprint, fingerprint) {
                writes.push((path, member.clone()));
            }
        }
        writes.push((profile_path(username), last_seen_patch(origin, fingerprint, now)));

        let mut failed = Vec::new();
        for (path, patch) in writes {
            if let Err(error) = self.db.update(&path, &patch).await {
                warn!(%path, %error, "identity registration write failed");
                failed.push(path);
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(WardenError::storage(format!(
                "identity not registered at {}",
                failed.join(", ")
            )))
        }
    }

    /// Usernames ever observed under `origin`
    pub async fn accounts_for_origin(&self, origin: &str) -> Result<Vec<String>, LookupError> {
        self.members(IndexKey::Origin, origin).await
    }

    /// Usernames ever observed under `fingerprint`
    pub async fn accounts_for_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Vec<String>, LookupError> {
        self.members(IndexKey::Fingerprint, fingerprint).await
    }

    async fn members(&self, key: IndexKey, value: &str) -> Result<Vec<String>, LookupError> {
        let Some(path) = identity_path(key, value) else {
            return Ok(Vec::new());
        };
        let Some(Value::Object(set)) = self.db.get(&path).await? else {
            return Ok(Vec::new());
        };
        // Older entries are `{ username: true }` and only carry the key.
        let mut names: Vec<String> = set
            .into_iter()
            .filter_map(|(key, member)| match member {
                Value::String(name) if !name.trim().is_empty() => Some(name),
                Value::Bool(true) => Some(key),
                _ => None,
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

fn last_seen_patch(origin: Option<&str>, fingerprint: &str, now: DateTime<Utc>) -> Value {
    let mut patch = Map::new();
    patch.insert(
        "lastIP".into(),
        Value::String(origin.unwrap_or(UNKNOWN_ORIGIN).to_string()),
    );
    if !fingerprint.trim().is_empty() {
        patch.insert("fingerprint".into(), Value::String(fingerprint.to_string()));
    }
    patch.insert(
        "lastSeen".into(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    Value::Object(patch)
}

impl std::fmt::Debug for IdentityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityIndex")
            .field("default_reason", &self.default_reason)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use warden_effects::{MemoryDatabase, SimulatedClock};

    fn index() -> (IdentityIndex, MemoryDatabase) {
        let db = MemoryDatabase::new();
        let clock = SimulatedClock::new(Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap());
        (
            IdentityIndex::new(Arc::new(db.clone()), Arc::new(clock), "Banned"),
            db,
        )
    }

    #[tokio::test]
    async fn record_ban_writes_every_known_key() {
        let (index, db) = index();
        let record = BanRecord::new("spam", Utc::now())
            .with_username("alice")
            .with_origin(Some("203.0.113.9".into()))
            .with_fingerprint("k3x9");

        let keys = index.record_ban(&record).await.unwrap();
        assert_eq!(keys, IndexKey::PRECEDENCE.to_vec());

        for (key, value) in [
            (IndexKey::Username, "alice"),
            (IndexKey::Origin, "203.0.113.9"),
            (IndexKey::Fingerprint, "k3x9"),
        ] {
            assert_eq!(index.lookup(key, value).await.unwrap(), Some(record.clone()));
        }
        assert!(db.get("bans/ips/203_0_113_9").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_keys_are_skipped() {
        let (index, db) = index();
        let record = BanRecord::new("spam", Utc::now()).with_username("carol");
        assert_eq!(
            index.record_ban(&record).await.unwrap(),
            vec![IndexKey::Username]
        );
        assert!(db.get("bans/fingerprints").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn legacy_records_get_default_reason() {
        let (index, db) = index();
        db.set("bans/fingerprints/zz", &json!({ "bannedAt": "bad" }))
            .await
            .unwrap();
        let record = index
            .lookup(IndexKey::Fingerprint, "zz")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.reason, "Banned");
        assert_eq!(record.banned_at, Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn registration_builds_observation_sets() {
        let (index, db) = index();
        index
            .register_identity("bob", Some("10.0.0.1"), "fp1")
            .await
            .unwrap();
        index
            .register_identity("carol", Some("10.0.0.1"), "fp2")
            .await
            .unwrap();

        assert_eq!(
            index.accounts_for_origin("10.0.0.1").await.unwrap(),
            vec!["bob".to_string(), "carol".to_string()]
        );
        assert_eq!(
            index.accounts_for_fingerprint("fp2").await.unwrap(),
            vec!["carol".to_string()]
        );
        let profile = index.profile("bob").await.unwrap().unwrap();
        assert_eq!(profile.known_origin().as_deref(), Some("10.0.0.1"));
        assert_eq!(profile.known_fingerprint().as_deref(), Some("fp1"));
        assert!(db.get("users/bob/lastSeen").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn observation_sets_return_real_usernames() {
        let (index, db) = index();
        index
            .register_identity("j.doe", Some("10.0.0.2"), "fp3")
            .await
            .unwrap();
        db.update("identity/ips/10_0_0_2", &json!({ "old_timer": true, "gone": false }))
            .await
            .unwrap();

        assert_eq!(
            index.accounts_for_origin("10.0.0.2").await.unwrap(),
            vec!["j.doe".to_string(), "old_timer".to_string()]
        );
        assert_eq!(
            index.accounts_for_fingerprint("fp3").await.unwrap(),
            vec!["j.doe".to_string()]
        );
        assert_eq!(
            db.get("identity/ips/10_0_0_2/j_doe").await.unwrap(),
            Some(json!("j.doe"))
        );
    }

    #[tokio::test]
    async fn profile_flag_becomes_a_record() {
        let (index, db) = index();
        db.set(
            "users/kim",
            &json!({ "banned": true, "banReason": "legacy", "lastIP": "10.1.1.1", "fingerprint": "fk" }),
        )
        .await
        .unwrap();
        db.set("users/lee", &json!({ "banned": true, "banReason": "  " }))
            .await
            .unwrap();
        db.set("users/max", &json!({ "banned": false, "banReason": "lifted" }))
            .await
            .unwrap();

        let record = index.profile_ban("kim").await.unwrap().unwrap();
        assert_eq!(record.reason, "legacy");
        assert_eq!(record.username.as_deref(), Some("kim"));
        assert_eq!(record.origin.as_deref(), Some("10.1.1.1"));
        assert_eq!(record.fingerprint, "fk");
        assert_eq!(record.banned_at, Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap());

        assert_eq!(index.profile_ban("lee").await.unwrap().unwrap().reason, "Banned");
        assert_eq!(index.profile_ban("max").await.unwrap(), None);
        assert_eq!(index.profile_ban("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_origin_placeholder_is_not_an_origin() {
        let (index, _db) = index();
        index.register_identity("dave", None, "fp9").await.unwrap();
        let profile = index.profile("dave").await.unwrap().unwrap();
        assert_eq!(profile.last_ip.as_deref(), Some("unknown"));
        assert_eq!(profile.known_origin(), None);
    }

    #[tokio::test]
    async fn flag_profile_keeps_other_fields() {
        let (index, db) = index();
        db.set("users/erin", &json!({ "role": "user", "fingerprint": "f" }))
            .await
            .unwrap();
        index.flag_profile("erin", "doxxing").await.unwrap();
        let profile = index.profile("erin").await.unwrap().unwrap();
        assert!(profile.banned);
        assert_eq!(profile.ban_reason.as_deref(), Some("doxxing"));
        assert_eq!(profile.known_fingerprint().as_deref(), Some("f"));
    }
}
