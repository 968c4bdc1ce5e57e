//! Low-entropy device fingerprint
//!
//! The hash is a 32-bit multiply-and-add over UTF-16 code units. It is
//! cheap, synchronous and stable for the same browser and device; it is
//! neither cryptographic nor unique.

use serde::{Deserialize, Serialize};

/// Separator placed between signals before hashing
pub const SIGNAL_DELIMITER: char = '|';

/// Environment signals readable without a permission prompt.
///
/// Unavailable signals stay at their empty/zero defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSignals {
    /// Browser user-agent string
    pub user_agent: String,
    /// Preferred language tag
    pub language: String,
    /// Screen width in CSS pixels
    pub screen_width: u32,
    /// Screen height in CSS pixels
    pub screen_height: u32,
    /// Screen colour depth in bits
    pub color_depth: u32,
    /// Minutes between local time and UTC, as the browser reports it
    pub timezone_offset_minutes: i32,
    /// Logical processor count
    pub hardware_concurrency: u32,
    /// Platform string
    pub platform: String,
    /// Encoded image read back from an off-screen drawing
    pub canvas_signature: String,
}

impl EnvironmentSignals {
    /// Concatenate every signal in fixed order
    pub fn canonical_string(&self) -> String {
        let parts = [
            self.user_agent.clone(),
            self.language.clone(),
            format!("{}x{}", self.screen_width, self.screen_height),
            self.color_depth.to_string(),
            self.timezone_offset_minutes.to_string(),
            self.hardware_concurrency.to_string(),
            self.platform.clone(),
            self.canvas_signature.clone(),
        ];
        parts.join(&SIGNAL_DELIMITER.to_string())
    }
}

/// Rolling hash folded into an `i32`, as `h = h * 31 + c` with wraparound
pub fn rolling_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Render a magnitude in lowercase base 36
pub fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(7);
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Short fingerprint string for a set of signals
pub fn fingerprint_of(signals: &EnvironmentSignals) -> String {
    to_base36(rolling_hash(&signals.canonical_string()).unsigned_abs())
}
