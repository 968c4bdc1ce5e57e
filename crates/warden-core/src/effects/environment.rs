//! Environment signal effects

use crate::fingerprint::EnvironmentSignals;

/// Reads fingerprinting signals from the running environment.
///
/// Must not fail and must not prompt; unavailable signals are left at
/// their defaults.
pub trait EnvironmentProbe {
    /// Collect the current signals
    fn signals(&self) -> EnvironmentSignals;
}
