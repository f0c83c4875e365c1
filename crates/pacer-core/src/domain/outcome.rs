//! Delivery outcome: what the sink learns about one settled task.
//!
//! The queue never acts on an outcome (no retry, no dead-letter). Outcomes
//! exist only to be recorded.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::SendError;
use super::ids::TaskId;

/// Classification of a settled send.
///
/// Serialized as SCREAMING_SNAKE_CASE: DELIVERED / FAILED / TIMED_OUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Delivered,
    Failed,
    TimedOut,
}

/// Result of one send as seen by the drain loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOutcome {
    Delivered,
    Failed { reason: String },
    TimedOut { after_ms: u64 },
}

impl DeliveryOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            DeliveryOutcome::Delivered => OutcomeKind::Delivered,
            DeliveryOutcome::Failed { .. } => OutcomeKind::Failed,
            DeliveryOutcome::TimedOut { .. } => OutcomeKind::TimedOut,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

impl From<Result<(), SendError>> for DeliveryOutcome {
    fn from(result: Result<(), SendError>) -> Self {
        match result {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(SendError::TimedOut(after)) => DeliveryOutcome::TimedOut {
                after_ms: saturating_millis(after),
            },
            Err(err) => DeliveryOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }
}

/// One record handed to the `DeliverySink` per settled task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub task_id: TaskId,

    /// Submission order within the queue (0-based).
    pub seq: u64,

    /// Opaque label for logs only.
    pub recipient: String,

    pub outcome: DeliveryOutcome,

    /// Time between invoking the send function and its settlement.
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

/// Whole milliseconds, clamped to `u64::MAX`.
pub(crate) fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(super::saturating_millis(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
