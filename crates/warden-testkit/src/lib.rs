//! Warden Testing Infrastructure
//!
//! Fakes for every effect trait plus [`BanHarness`], which wires a full
//! [`warden_ban::BanService`] over in-memory collaborators so tests can
//! inspect channels, database, surface and call counts directly.
//!
//! ```rust,no_run
//! use warden_testkit::BanHarness;
//!
//! # async fn demo() {
//! let harness = BanHarness::new();
//! assert!(harness.service.check_ban().await.is_none());
//! # }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod channels;
pub mod database;
pub mod environment;
pub mod harness;
pub mod logging;
pub mod origin;
pub mod surface;

pub use channels::FaultyChannel;
pub use database::{CountingDatabase, UnreachableDatabase};
pub use environment::{desktop_signals, phone_signals, FixedEnvironment};
pub use harness::{BanHarness, BanHarnessBuilder};
pub use logging::init_test_logging;
pub use origin::{FailingOrigin, StaticOrigin};
pub use surface::RecordingSurface;

// Re-export commonly used handlers for convenience
pub use warden_effects::{MemoryChannel, MemoryDatabase, SimulatedClock, StaticSession};
