//! Effect trait definitions
//!
//! Every side effect the ban subsystem performs goes through one of these
//! traits; handlers live in `warden-effects` and fakes in `warden-testkit`.
//!
//! Execution is a single-threaded cooperative event loop (one per browser
//! tab), so async traits are declared `?Send` and handlers may hold
//! JavaScript objects.

pub mod channel;
pub mod database;
pub mod environment;
pub mod origin;
pub mod session;
pub mod surface;
pub mod time;

pub use channel::StorageChannel;
pub use database::RemoteDatabase;
pub use environment::EnvironmentProbe;
pub use origin::OriginLookup;
pub use session::SessionSource;
pub use surface::DocumentSurface;
pub use time::PhysicalClock;
