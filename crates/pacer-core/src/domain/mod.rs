//! Domain model (IDs, tasks, outcomes, errors, email).

pub mod email;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod task;

pub use email::EmailMessage;
pub use errors::SendError;
pub use ids::TaskId;
pub use outcome::{DeliveryOutcome, DeliveryReport, OutcomeKind};
pub(crate) use outcome::saturating_millis;
pub use task::{QueuedTask, SendFuture, Task};
