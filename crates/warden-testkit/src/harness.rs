//! Fully wired ban service over in-memory collaborators

use std::sync::Arc;
use warden_ban::BanService;
use warden_core::{
    fingerprint_of, EnvironmentProbe, EnvironmentSignals, RemoteDatabase, StorageChannel, WardenConfig,
};
use warden_effects::{MemoryChannel, MemoryDatabase, SimulatedClock, StaticSession};

use crate::database::{CountingDatabase, UnreachableDatabase};
use crate::environment::{desktop_signals, FixedEnvironment};
use crate::origin::StaticOrigin;
use crate::surface::RecordingSurface;

/// One simulated browser tab talking to a shared database.
///
/// Every collaborator handle is public so tests can seed, wipe and count
/// directly.
#[derive(Debug, Clone)]
pub struct BanHarness {
    /// The service under test
    pub service: BanService,
    /// Local channels in precedence order
    pub channels: Vec<MemoryChannel>,
    /// Call-counting view of the database the service uses
    pub database: CountingDatabase,
    /// Backing store; empty and unused when the database is unreachable
    pub store: MemoryDatabase,
    /// Origin resolver
    pub origin: StaticOrigin,
    /// Current session
    pub session: StaticSession,
    /// Device signals
    pub environment: FixedEnvironment,
    /// Page the enforcer writes to
    pub surface: RecordingSurface,
    /// Shared clock
    pub clock: SimulatedClock,
}

impl BanHarness {
    /// Harness with default collaborators
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a harness
    pub fn builder() -> BanHarnessBuilder {
        BanHarnessBuilder::default()
    }

    /// Fingerprint this harness's device produces
    pub fn fingerprint(&self) -> String {
        fingerprint_of(&self.environment.signals())
    }

    /// Clear every local channel, as a user wiping site data would
    pub async fn wipe_local(&self) {
        for channel in &self.channels {
            channel.wipe().await;
        }
    }

    /// Raw payloads held by each channel, in precedence order
    pub async fn local_payloads(&self) -> Vec<Option<String>> {
        let mut payloads = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            payloads.push(channel.peek().await);
        }
        payloads
    }

    /// Record `username` as seen from this device
    pub async fn register(&self, username: &str) {
        self.service
            .gate()
            .record_session(username)
            .await
            .expect("identity registration");
    }

    /// Another tab on another device sharing this harness's database,
    /// origin and clock; local storage, session and page start fresh.
    pub fn other_device(&self, signals: EnvironmentSignals) -> Self {
        BanHarnessBuilder {
            signals,
            origin: self.origin.clone(),
            store: Some(self.store.clone()),
            clock: self.clock.clone(),
            ..BanHarnessBuilder::default()
        }
        .build()
    }

    /// A fresh visit from the same device: new local storage, anonymous
    /// session, untouched page.
    pub fn fresh_visit(&self) -> Self {
        self.other_device(self.environment.signals())
    }
}

impl Default for BanHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configures a [`BanHarness`]
#[derive(Debug, Clone)]
pub struct BanHarnessBuilder {
    signals: EnvironmentSignals,
    origin: StaticOrigin,
    store: Option<MemoryDatabase>,
    unreachable: bool,
    user: Option<String>,
    clock: SimulatedClock,
    config: WardenConfig,
}

impl Default for BanHarnessBuilder {
    fn default() -> Self {
        Self {
            signals: desktop_signals(),
            origin: StaticOrigin::new("203.0.113.50"),
            store: None,
            unreachable: false,
            user: None,
            clock: SimulatedClock::default(),
            config: WardenConfig::default(),
        }
    }
}

impl BanHarnessBuilder {
    /// Device signals
    pub fn signals(mut self, signals: EnvironmentSignals) -> Self {
        self.signals = signals;
        self
    }

    /// Address the origin lookup resolves to
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = StaticOrigin::new(origin);
        self
    }

    /// Share an existing backing store
    pub fn store(mut self, store: MemoryDatabase) -> Self {
        self.store = Some(store);
        self
    }

    /// Route every database call to a transport failure
    pub fn unreachable_database(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Start signed in as `username`
    pub fn signed_in(mut self, username: impl Into<String>) -> Self {
        self.user = Some(username.into());
        self
    }

    /// Service configuration
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Wire the service
    pub fn build(self) -> BanHarness {
        let channels = MemoryChannel::full_set();
        let store = self.store.unwrap_or_default();
        let database = if self.unreachable {
            CountingDatabase::new(UnreachableDatabase::new())
        } else {
            CountingDatabase::new(store.clone())
        };
        let session = match self.user {
            Some(user) => StaticSession::signed_in(user),
            None => StaticSession::anonymous(),
        };
        let environment = FixedEnvironment::new(self.signals);
        let surface = RecordingSurface::with_body("<main>protected content</main>");

        let service = BanService::builder()
            .config(self.config)
            .channels(
                channels
                    .iter()
                    .cloned()
                    .map(|c| Arc::new(c) as Arc<dyn StorageChannel>)
                    .collect(),
            )
            .database(Arc::new(database.clone()) as Arc<dyn RemoteDatabase>)
            .origin(Arc::new(self.origin.clone()))
            .environment(Arc::new(environment.clone()))
            .session(Arc::new(session.clone()))
            .surface(Arc::new(surface.clone()))
            .clock(Arc::new(self.clock.clone()))
            .build()
            .expect("harness collaborators are complete");

        BanHarness {
            service,
            channels,
            database,
            store,
            origin: self.origin,
            session,
            environment,
            surface,
            clock: self.clock,
        }
    }
}
