//! Fixed environment and session handlers
//!
//! Used where no browser is present: server-side tooling, tests, and
//! hosts that collect signals themselves and pass them in.

use std::sync::{Arc, Mutex, PoisonError};
use warden_core::{EnvironmentProbe, EnvironmentSignals, SessionSource};

/// Probe returning a fixed set of signals
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    signals: EnvironmentSignals,
}

impl StaticEnvironment {
    /// Wrap pre-collected signals
    pub fn new(signals: EnvironmentSignals) -> Self {
        Self { signals }
    }
}

impl EnvironmentProbe for StaticEnvironment {
    fn signals(&self) -> EnvironmentSignals {
        self.signals.clone()
    }
}

/// Session whose user can be swapped at runtime
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Arc<Mutex<Option<String>>>,
}

impl StaticSession {
    /// Session with no signed-in user
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session signed in as `username`
    pub fn signed_in(username: impl Into<String>) -> Self {
        let session = Self::default();
        session.sign_in(username);
        session
    }

    /// Switch to `username`
    pub fn sign_in(&self, username: impl Into<String>) {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(username.into());
    }

    /// Drop the current user
    pub fn sign_out(&self) {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl SessionSource for StaticSession {
    fn current_user(&self) -> Option<String> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|u| !u.trim().is_empty())
    }
}
