//! # Warden Effects
//!
//! Handlers for the effect traits declared in `warden-core`:
//!
//! | Effect | Handlers |
//! |--------|----------|
//! | `StorageChannel` | [`MemoryChannel`], browser channels (`web`) |
//! | `RemoteDatabase` | [`RestDatabase`], [`MemoryDatabase`] |
//! | `OriginLookup` | [`HttpOriginLookup`], [`DisabledOriginLookup`] |
//! | `PhysicalClock` | [`SystemClock`], [`SimulatedClock`] |
//! | `EnvironmentProbe` | [`StaticEnvironment`], `BrowserEnvironment` (`web`) |
//! | `SessionSource` | [`StaticSession`], `BrowserSession` (`web`) |
//! | `DocumentSurface` | `DomSurface` (`web`) |
//!
//! Browser handlers compile only for `wasm32` with the `web` feature.

pub mod database;
pub mod environment;
pub mod logging;
pub mod origin;
pub mod storage;
pub mod time;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod browser;

pub use database::{MemoryDatabase, RestDatabase};
pub use environment::{StaticEnvironment, StaticSession};
pub use logging::init_logging;
pub use origin::{DisabledOriginLookup, HttpOriginLookup};
pub use storage::MemoryChannel;
pub use time::{SimulatedClock, SystemClock};
