//! Error taxonomy for the ban subsystem
//!
//! Channel and lookup failures are ordinary values: callers log them and
//! carry on. Only configuration, administration writes and the document
//! surface ever surface a [`WardenError`].

use crate::types::{ChannelKind, IndexKey};
use serde::{Deserialize, Serialize};

/// Failure of a single local storage channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The backend threw, is disabled, or does not exist in this context
    #[error("{channel} unavailable: {message}")]
    Unavailable {
        /// Channel that failed
        channel: ChannelKind,
        /// Backend-supplied description
        message: String,
    },

    /// The backend returned data that is not a recognisable ban payload
    #[error("{channel} holds malformed payload: {message}")]
    Malformed {
        /// Channel that held the payload
        channel: ChannelKind,
        /// Decoder description
        message: String,
    },
}

impl ChannelError {
    /// Create an unavailable-channel error
    pub fn unavailable(channel: ChannelKind, message: impl Into<String>) -> Self {
        Self::Unavailable {
            channel,
            message: message.into(),
        }
    }

    /// Create a malformed-payload error
    pub fn malformed(channel: ChannelKind, message: impl Into<String>) -> Self {
        Self::Malformed {
            channel,
            message: message.into(),
        }
    }

    /// Channel the error belongs to
    pub fn channel(&self) -> ChannelKind {
        match self {
            Self::Unavailable { channel, .. } | Self::Malformed { channel, .. } => *channel,
        }
    }
}

/// Failure of a remote call (database or origin lookup).
///
/// Every variant means the same thing to the reconciler: no evidence from
/// this key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Request never produced a response
    #[error("transport failure for {target}: {message}")]
    Transport {
        /// Path or URL that was requested
        target: String,
        /// Transport description
        message: String,
    },

    /// Response arrived with a non-success status
    #[error("{target} answered with status {status}")]
    Status {
        /// Path or URL that was requested
        target: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body could not be parsed
    #[error("could not decode response from {target}: {message}")]
    Decode {
        /// Path or URL that was requested
        target: String,
        /// Decoder description
        message: String,
    },

    /// The collaborator is not configured in this deployment
    #[error("{what} is not configured")]
    Unconfigured {
        /// Missing collaborator
        what: String,
    },
}

impl LookupError {
    /// Create a transport error
    pub fn transport(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a status error
    pub fn status(target: impl Into<String>, status: u16) -> Self {
        Self::Status {
            target: target.into(),
            status,
        }
    }

    /// Create a decode error
    pub fn decode(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create an unconfigured-collaborator error
    pub fn unconfigured(what: impl Into<String>) -> Self {
        Self::Unconfigured { what: what.into() }
    }
}

/// Where a lookup was headed when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupTarget {
    /// The network-origin resolver
    OriginResolver,
    /// An identity index key
    Index(IndexKey),
    /// The signed-in user's profile record
    Profile,
}

/// A swallowed failure observed during a check or a cache write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// A storage backend threw or is disabled
    ChannelUnavailable {
        /// Channel that failed
        channel: ChannelKind,
        /// Description
        message: String,
    },
    /// A remote call failed or returned non-success
    LookupFailed {
        /// What was being looked up
        target: LookupTarget,
        /// Description
        message: String,
    },
    /// A channel held unparseable data
    MalformedCachedPayload {
        /// Channel that held the data
        channel: ChannelKind,
        /// Description
        message: String,
    },
}

impl Fault {
    /// Record a lookup failure
    pub fn lookup(target: LookupTarget, error: &LookupError) -> Self {
        Self::LookupFailed {
            target,
            message: error.to_string(),
        }
    }
}

impl From<ChannelError> for Fault {
    fn from(error: ChannelError) -> Self {
        match error {
            ChannelError::Unavailable { channel, message } => {
                Self::ChannelUnavailable { channel, message }
            }
            ChannelError::Malformed { channel, message } => {
                Self::MalformedCachedPayload { channel, message }
            }
        }
    }
}

/// Unified error type for operations that are allowed to fail loudly
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum WardenError {
    /// Invalid input
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },

    /// Remote storage write failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Network or transport error
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// The document surface refused an update
    #[error("Surface error: {message}")]
    Surface {
        /// Error message describing the surface failure
        message: String,
    },
}

impl WardenError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a surface error
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<LookupError> for WardenError {
    fn from(err: LookupError) -> Self {
        Self::network(err.to_string())
    }
}

/// Result alias for fallible Warden operations
pub type WardenResult<T> = Result<T, WardenError>;
