//! Physical time effects

use chrono::{DateTime, Utc};

/// Wall-clock source
pub trait PhysicalClock {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}
