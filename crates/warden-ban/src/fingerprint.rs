//! Fingerprint generation

use std::sync::Arc;
use warden_core::{fingerprint_of, EnvironmentProbe, EnvironmentSignals};

/// Derives the device fingerprint from the current environment.
///
/// Pure apart from reading the probe: no I/O, no failure.
#[derive(Clone)]
pub struct FingerprintGenerator {
    probe: Arc<dyn EnvironmentProbe>,
}

impl FingerprintGenerator {
    /// Generator reading from `probe`
    pub fn new(probe: Arc<dyn EnvironmentProbe>) -> Self {
        Self { probe }
    }

    /// Current signals
    pub fn signals(&self) -> EnvironmentSignals {
        self.probe.signals()
    }

    /// Current fingerprint
    pub fn fingerprint(&self) -> String {
        fingerprint_of(&self.signals())
    }
}

impl std::fmt::Debug for FingerprintGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintGenerator").finish_non_exhaustive()
    }
}
