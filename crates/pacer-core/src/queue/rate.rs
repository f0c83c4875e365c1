//! Rate limit: decides the spacing between consecutive sends.

use std::time::Duration;

use tokio::time::Instant;

/// Fixed spacing derived from the provider's permitted sends per second.
///
/// The email provider allows 2 sends/second, so the default spacing is 500ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    spacing: Duration,
}

impl RateLimit {
    pub const DEFAULT_SENDS_PER_SECOND: f64 = 2.0;

    /// Spacing of `1 / sends_per_second` seconds.
    ///
    /// Returns `None` for zero, negative, non-finite, or absurdly small rates
    /// (spacing that does not fit in a `Duration`).
    pub fn per_second(sends_per_second: f64) -> Option<Self> {
        if !sends_per_second.is_finite() || sends_per_second <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / sends_per_second)
            .ok()
            .map(Self::from_spacing)
    }

    pub fn from_spacing(spacing: Duration) -> Self {
        Self { spacing }
    }

    /// The inter-send delay.
    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// How long to wait before the next send, given when the previous one settled.
    ///
    /// Zero once the spacing has already elapsed.
    pub fn remaining_since(&self, last_settled_at: Instant, now: Instant) -> Duration {
        self.spacing
            .saturating_sub(now.saturating_duration_since(last_settled_at))
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::from_spacing(Duration::from_millis(500))
    }
}
