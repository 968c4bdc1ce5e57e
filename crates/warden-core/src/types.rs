//! Domain types shared by every Warden crate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A local storage backend, listed in read-precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    /// Network-response cache addressable from a service worker
    ResponseCache,
    /// Per-origin transactional key-value store
    IndexedDb,
    /// Long-lived cookie sent with every request
    Cookie,
    /// Persistent per-origin key-value store
    LocalStorage,
    /// Per-tab key-value store
    SessionStorage,
}

impl ChannelKind {
    /// Every channel, strongest survivability first
    pub const PRECEDENCE: [ChannelKind; 5] = [
        ChannelKind::ResponseCache,
        ChannelKind::IndexedDb,
        ChannelKind::Cookie,
        ChannelKind::LocalStorage,
        ChannelKind::SessionStorage,
    ];

    /// Position in [`Self::PRECEDENCE`]
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Stable short name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::ResponseCache => "response-cache",
            ChannelKind::IndexedDb => "indexed-db",
            ChannelKind::Cookie => "cookie",
            ChannelKind::LocalStorage => "local-storage",
            ChannelKind::SessionStorage => "session-storage",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identity signal under which ban records are indexed server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexKey {
    /// Declared account name
    Username,
    /// Resolved public network address
    Origin,
    /// Derived browser/device fingerprint
    Fingerprint,
}

impl IndexKey {
    /// Lookup order used by the reconciler
    pub const PRECEDENCE: [IndexKey; 3] =
        [IndexKey::Username, IndexKey::Origin, IndexKey::Fingerprint];

    /// Stable short name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            IndexKey::Username => "username",
            IndexKey::Origin => "origin",
            IndexKey::Fingerprint => "fingerprint",
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The weak signals available for recognising a visitor.
///
/// Several people may share an origin or fingerprint; collisions are
/// accepted false positives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Present only once authenticated
    pub username: Option<String>,
    /// Best-effort public address
    pub network_origin: Option<String>,
    /// Always derivable
    pub fingerprint: String,
}

/// The authoritative ban fact stored in the identity index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRecord {
    /// Human-readable reason, preserved verbatim
    pub reason: String,
    /// When the ban was issued
    pub banned_at: DateTime<Utc>,
    /// Offender's last known public address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Offender's last known fingerprint, empty when never recorded
    #[serde(default)]
    pub fingerprint: String,
    /// Banned account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl BanRecord {
    /// Create a record for the given reason and time
    pub fn new(reason: impl Into<String>, banned_at: DateTime<Utc>) -> Self {
        Self {
            reason: reason.into(),
            banned_at,
            origin: None,
            fingerprint: String::new(),
            username: None,
        }
    }

    /// Attach the offender's username
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Attach the offender's network origin
    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }

    /// Attach the offender's fingerprint
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    /// Record synthesised from a cached local flag for the current identity
    pub fn from_flag(flag: &LocalBanFlag, identity: &Identity) -> Self {
        Self {
            reason: flag.reason.clone(),
            banned_at: flag.timestamp,
            origin: identity.network_origin.clone(),
            fingerprint: identity.fingerprint.clone(),
            username: identity.username.clone(),
        }
    }

    /// Decode a record read from the index.
    ///
    /// Older writers stored partial objects or a bare `true`; missing
    /// fields fall back to `default_reason` and `fallback_time`.
    /// Returns `None` for null, `false` and non-record shapes.
    pub fn from_index_value(
        value: &serde_json::Value,
        default_reason: &str,
        fallback_time: DateTime<Utc>,
    ) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Bool(true) => Some(Self::new(default_reason, fallback_time)),
            Value::Object(map) => {
                let text = |name: &str| {
                    map.get(name)
                        .and_then(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                };
                let banned_at = text("bannedAt")
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or(fallback_time);
                Some(Self {
                    reason: text("reason").unwrap_or_else(|| default_reason.to_owned()),
                    banned_at,
                    origin: text("origin"),
                    fingerprint: text("fingerprint").unwrap_or_default(),
                    username: text("username"),
                })
            }
            _ => None,
        }
    }
}

/// Cached mirror of a confirmed ban, held by a single local channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBanFlag {
    /// Reason copied verbatim from the confirming record
    pub reason: String,
    /// When the flag was written (or the legacy read time)
    pub timestamp: DateTime<Utc>,
}

impl LocalBanFlag {
    /// Create a flag
    pub fn new(reason: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            reason: reason.into(),
            timestamp,
        }
    }
}

/// Where a positive verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceSource {
    /// A cached flag in a local channel
    Local(ChannelKind),
    /// A record in the identity index
    Index(IndexKey),
    /// The user's own profile record
    Profile,
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceSource::Local(channel) => write!(f, "local:{channel}"),
            EvidenceSource::Index(key) => write!(f, "index:{key}"),
            EvidenceSource::Profile => f.write_str("profile"),
        }
    }
}
