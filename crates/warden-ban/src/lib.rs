//! # Warden Ban
//!
//! Multi-channel ban persistence and reconciliation.
//!
//! A confirmed ban is cached in every available local channel and indexed
//! server-side under each identity signal the offender is known by
//! (username, network origin, fingerprint). Checks trust any cached
//! positive flag without a network round trip, fall back to the identity
//! index otherwise, and heal the local cache whenever the index answers.
//!
//! [`BanService`] is the entry point:
//!
//! - [`BanService::check_ban`] resolves to a [`BanRecord`] or `None` and
//!   never fails
//! - [`BanService::enforce_ban`] / [`BanService::guard_page`] replace the
//!   page with the block screen when banned
//! - [`BanService::ban_user`] indexes a ban against a target's recorded
//!   signals
//! - [`BanService::gate`] screens signups and logins

pub mod admin;
pub mod channels;
pub mod enforcer;
pub mod fingerprint;
pub mod gate;
pub mod index;
pub mod reconciler;
pub mod service;

pub use admin::BanAdministration;
pub use channels::{LocalChannelSet, LocalRead, LocalWrite};
pub use enforcer::{escape_html, render_block_screen, Enforcer, BLOCK_SCREEN_ID};
pub use fingerprint::FingerprintGenerator;
pub use gate::{Admission, SessionGate};
pub use index::{IdentityIndex, UserProfile};
pub use reconciler::{BanReconciler, CheckPhase, CheckReport, Verdict};
pub use service::{BanService, BanServiceBuilder};

pub use warden_core::{BanRecord, EvidenceSource, Fault, Identity, WardenConfig, WardenError, WardenResult};
