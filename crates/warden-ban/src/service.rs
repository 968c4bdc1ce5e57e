//! Ban service facade and builder

use std::sync::Arc;
use tracing::{info, warn};
use warden_core::{
    BanRecord, DocumentSurface, EnvironmentProbe, OriginLookup, PhysicalClock, RemoteDatabase,
    SessionSource, StorageChannel, WardenConfig, WardenError, WardenResult,
};

use crate::admin::BanAdministration;
use crate::channels::LocalChannelSet;
use crate::enforcer::Enforcer;
use crate::fingerprint::FingerprintGenerator;
use crate::gate::SessionGate;
use crate::index::IdentityIndex;
use crate::reconciler::{BanReconciler, CheckReport, Verdict};

/// The three external operations plus the admission gate
#[derive(Debug, Clone)]
pub struct BanService {
    reconciler: BanReconciler,
    enforcer: Enforcer,
    admin: BanAdministration,
    gate: SessionGate,
    index: IdentityIndex,
}

impl BanService {
    /// Start building a service
    pub fn builder() -> BanServiceBuilder {
        BanServiceBuilder::default()
    }

    /// The ban record for the current visitor, or `None`.
    ///
    /// Never fails: every storage and network error resolves to "no
    /// evidence from that source".
    pub async fn check_ban(&self) -> Option<BanRecord> {
        self.reconciler.check_ban().await
    }

    /// Like [`Self::check_ban`] but keeps the phase and fault trail
    pub async fn check(&self) -> CheckReport {
        self.reconciler.check().await
    }

    /// Check and, if banned, take over the page. Returns whether a ban was
    /// found. A surface failure is logged; the ban still counts.
    pub async fn enforce_ban(&self) -> bool {
        self.guard_page().await.is_banned()
    }

    /// Gate protected content: must complete before the page body is
    /// revealed.
    pub async fn guard_page(&self) -> Verdict {
        let verdict = self.reconciler.check().await.verdict;
        if let Verdict::Banned(record) = &verdict {
            if let Err(error) = self.enforcer.enforce(&record.reason) {
                warn!(%error, "block screen could not be shown");
            }
        }
        verdict
    }

    /// Ban `username` by its recorded signals; never enforces
    pub async fn ban_user(&self, username: &str, reason: &str) -> WardenResult<BanRecord> {
        self.admin.ban_user(username, reason).await
    }

    /// Signup/login admission
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Identity index, for moderator investigation
    pub fn index(&self) -> &IdentityIndex {
        &self.index
    }

    /// Reconciler driving [`Self::check_ban`]
    pub fn reconciler(&self) -> &BanReconciler {
        &self.reconciler
    }
}

/// Builder wiring collaborators into a [`BanService`]
#[derive(Default)]
pub struct BanServiceBuilder {
    config: WardenConfig,
    channels: Vec<Arc<dyn StorageChannel>>,
    database: Option<Arc<dyn RemoteDatabase>>,
    origin: Option<Arc<dyn OriginLookup>>,
    environment: Option<Arc<dyn EnvironmentProbe>>,
    session: Option<Arc<dyn SessionSource>>,
    surface: Option<Arc<dyn DocumentSurface>>,
    clock: Option<Arc<dyn PhysicalClock>>,
}

impl BanServiceBuilder {
    /// Use `config` for defaults such as the fallback reason
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Local channels, in any order
    pub fn channels(mut self, channels: Vec<Arc<dyn StorageChannel>>) -> Self {
        self.channels = channels;
        self
    }

    /// Add one local channel
    pub fn channel(mut self, channel: Arc<dyn StorageChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Remote identity index store
    pub fn database(mut self, database: Arc<dyn RemoteDatabase>) -> Self {
        self.database = Some(database);
        self
    }

    /// Network origin resolver
    pub fn origin(mut self, origin: Arc<dyn OriginLookup>) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Fingerprint signal source
    pub fn environment(mut self, environment: Arc<dyn EnvironmentProbe>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Current-session source
    pub fn session(mut self, session: Arc<dyn SessionSource>) -> Self {
        self.session = Some(session);
        self
    }

    /// Page the enforcer takes over
    pub fn surface(mut self, surface: Arc<dyn DocumentSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Time source for flags and records
    pub fn clock(mut self, clock: Arc<dyn PhysicalClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the configuration and assemble the service
    pub fn build(self) -> WardenResult<BanService> {
        self.config.validate()?;
        let database = required(self.database, "database")?;
        let origin = required(self.origin, "origin lookup")?;
        let environment = required(self.environment, "environment probe")?;
        let session = required(self.session, "session source")?;
        let surface = required(self.surface, "document surface")?;
        let clock = required(self.clock, "clock")?;
        if self.channels.is_empty() {
            warn!("ban service built without local channels");
        }

        let reason = self.config.default_reason.clone();
        let channels = LocalChannelSet::new(self.channels, clock.clone(), reason.as_str());
        let index = IdentityIndex::new(database, clock.clone(), reason.as_str());
        let reconciler = BanReconciler::new(
            channels,
            index.clone(),
            FingerprintGenerator::new(environment),
            origin,
            session,
        );

        info!(channels = ?reconciler.channels().kinds(), "ban service ready");
        Ok(BanService {
            gate: SessionGate::new(reconciler.clone(), index.clone()),
            admin: BanAdministration::new(index.clone(), clock, reason),
            enforcer: Enforcer::new(surface),
            reconciler,
            index,
        })
    }
}

fn required<T>(value: Option<T>, what: &str) -> WardenResult<T> {
    value.ok_or_else(|| WardenError::config(format!("{what} not configured")))
}
