//! Task - キューに投入される 1 件の送信
//!
//! Task は「送信関数 + 宛先ラベル」だけを持ちます。
//! ID はキューへの投入時に採番されるので、ここには含めません。

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::time::Instant;

use super::errors::SendError;
use super::ids::TaskId;

/// Future returned by a send function.
pub type SendFuture = Pin<Box<dyn Future<Output = Result<(), SendError>> + Send + 'static>>;

pub(crate) type SendFn = Box<dyn FnOnce() -> SendFuture + Send + 'static>;

/// A unit of work submitted to the dispatch queue.
///
/// The send function is `FnOnce`: the drain loop moves it out and calls it
/// exactly once.
pub struct Task {
    recipient: String,
    send: SendFn,
}

impl Task {
    /// Wrap a zero-argument async operation.
    ///
    /// ```ignore
    /// let task = Task::new("creator@example.com", move || async move {
    ///     client.send(message).await.map_err(|e| SendError::provider(e.to_string()))
    /// });
    /// ```
    pub fn new<F, Fut>(recipient: impl Into<String>, send: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), SendError>> + Send + 'static,
    {
        Self {
            recipient: recipient.into(),
            send: Box::new(move || Box::pin(send()) as SendFuture),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Split into label and send function (consumes the task).
    pub(crate) fn into_parts(self) -> (String, SendFn) {
        (self.recipient, self.send)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

/// Backlog entry: a task plus what the queue assigned at submission.
#[derive(Debug)]
pub struct QueuedTask {
    pub id: TaskId,
    pub seq: u64,
    pub submitted_at: Instant,
    pub task: Task,
}
