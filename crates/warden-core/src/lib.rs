//! # Warden Core
//!
//! Pure foundation for the ban-persistence subsystem: domain types, the
//! local payload codec, the fingerprint hash, index path layout,
//! configuration, the error taxonomy, and the effect traits through which
//! every side effect flows.
//!
//! Nothing in this crate performs I/O. Handlers for the effect traits
//! live in `warden-effects`; the orchestration lives in `warden-ban`.

pub mod config;
pub mod effects;
pub mod errors;
pub mod fingerprint;
pub mod keys;
pub mod payload;
pub mod types;

pub use config::{ChannelConfig, WardenConfig};
pub use effects::{
    DocumentSurface, EnvironmentProbe, OriginLookup, PhysicalClock, RemoteDatabase,
    SessionSource, StorageChannel,
};
pub use errors::{
    ChannelError, Fault, LookupError, LookupTarget, WardenError, WardenResult,
};
pub use fingerprint::{fingerprint_of, EnvironmentSignals};
pub use payload::{decode_flag, encode_flag, MalformedPayload};
pub use types::{BanRecord, ChannelKind, EvidenceSource, Identity, IndexKey, LocalBanFlag};
