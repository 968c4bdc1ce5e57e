//! Fixed environment signals

use std::sync::{Arc, Mutex, PoisonError};
use warden_core::{EnvironmentProbe, EnvironmentSignals};

/// Signals of a typical desktop browser
pub fn desktop_signals() -> EnvironmentSignals {
    EnvironmentSignals {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".into(),
        language: "en-US".into(),
        screen_width: 2560,
        screen_height: 1440,
        color_depth: 24,
        timezone_offset_minutes: 300,
        hardware_concurrency: 12,
        platform: "Win32".into(),
        canvas_signature: "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAMgAAAAy".into(),
    }
}

/// Signals of a typical phone browser
pub fn phone_signals() -> EnvironmentSignals {
    EnvironmentSignals {
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148".into(),
        language: "fr-FR".into(),
        screen_width: 390,
        screen_height: 844,
        color_depth: 32,
        timezone_offset_minutes: -60,
        hardware_concurrency: 6,
        platform: "iPhone".into(),
        canvas_signature: "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAMgAAABk".into(),
    }
}

/// Probe whose signals can be swapped mid-test to simulate another device
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    signals: Arc<Mutex<EnvironmentSignals>>,
}

impl FixedEnvironment {
    /// Probe reporting `signals`
    pub fn new(signals: EnvironmentSignals) -> Self {
        Self {
            signals: Arc::new(Mutex::new(signals)),
        }
    }

    /// Report `signals` from now on
    pub fn set_signals(&self, signals: EnvironmentSignals) {
        *self.signals.lock().unwrap_or_else(PoisonError::into_inner) = signals;
    }
}

impl Default for FixedEnvironment {
    fn default() -> Self {
        Self::new(desktop_signals())
    }
}

impl EnvironmentProbe for FixedEnvironment {
    fn signals(&self) -> EnvironmentSignals {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
