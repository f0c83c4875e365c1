//! DispatchQueue: in-memory, FIFO, rate-limited sequencer of send operations.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{debug, error};

use super::RateLimit;
use super::stats::{Counters, DispatchStats};
use crate::domain::{
    DeliveryOutcome, DeliveryReport, EmailMessage, QueuedTask, SendError, Task, TaskId,
    saturating_millis,
};
use crate::ports::{DeliverySink, IdGenerator, Mailer};

/// Backlog + bookkeeping that must change together.
///
/// Never held across an `.await`.
struct Backlog {
    tasks: VecDeque<QueuedTask>,
    next_seq: u64,

    /// When the last send settled. Used to keep spacing across drain cycles.
    last_settled_at: Option<Instant>,
}

struct Inner {
    backlog: Mutex<Backlog>,

    /// Set by compare-and-set in `start_drain`, cleared by the drain loop while
    /// it holds the backlog lock and has seen the backlog empty.
    draining: AtomicBool,

    /// Bumped whenever a drain cycle ends. `wait_idle` listens on it.
    drained_tx: watch::Sender<u64>,

    rate: RateLimit,
    send_timeout: Option<Duration>,
    sink: Arc<dyn DeliverySink>,
    ids: Box<dyn IdGenerator>,
    runtime: Handle,
    counters: Counters,
}

/// Rate-limited dispatch queue.
///
/// - `submit` never blocks and never fails; delivery results only reach the
///   configured `DeliverySink`.
/// - One drain loop at a time sends tasks in submission order, pausing for the
///   inter-send delay between consecutive sends.
/// - Failed sends are logged and dropped. No retry.
///
/// The backlog lives in memory only: tasks not yet sent are lost when the
/// process exits. Do not use this where delivery must be guaranteed.
///
/// Cloning is cheap and every clone feeds the same backlog.
#[derive(Clone)]
pub struct DispatchQueue {
    inner: Arc<Inner>,
}

impl DispatchQueue {
    pub(crate) fn from_parts(
        rate: RateLimit,
        send_timeout: Option<Duration>,
        sink: Arc<dyn DeliverySink>,
        ids: Box<dyn IdGenerator>,
        runtime: Handle,
    ) -> Self {
        let (drained_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                backlog: Mutex::new(Backlog {
                    tasks: VecDeque::new(),
                    next_seq: 0,
                    last_settled_at: None,
                }),
                draining: AtomicBool::new(false),
                drained_tx,
                rate,
                send_timeout,
                sink,
                ids,
                runtime,
                counters: Counters::default(),
            }),
        }
    }

    /// Append a task to the backlog and make sure a drain is running.
    ///
    /// Returns as soon as the task is queued; the send function is invoked
    /// later by the drain loop.
    pub fn submit(&self, task: Task) -> TaskId {
        let id = self.inner.ids.generate_task_id();
        let recipient = task.recipient().to_string();

        let seq = {
            let mut backlog = self.inner.lock_backlog();
            let seq = backlog.next_seq;
            backlog.next_seq += 1;
            backlog.tasks.push_back(QueuedTask {
                id,
                seq,
                submitted_at: Instant::now(),
                task,
            });
            self.inner.counters.record_submitted();
            seq
        };
        debug!(task_id = %id, seq, recipient = %recipient, "task submitted");

        self.start_drain();
        id
    }

    /// `submit` each task in order.
    pub fn submit_many<I>(&self, tasks: I) -> Vec<TaskId>
    where
        I: IntoIterator<Item = Task>,
    {
        tasks.into_iter().map(|task| self.submit(task)).collect()
    }

    /// Queue one email through `mailer`. The recipient label is the `to` list.
    pub fn submit_email(&self, mailer: Arc<dyn Mailer>, message: EmailMessage) -> TaskId {
        let recipient = message.recipient_label();
        self.submit(Task::new(recipient, move || async move {
            mailer.send(message).await
        }))
    }

    pub fn stats(&self) -> DispatchStats {
        let pending = self.inner.lock_backlog().tasks.len();
        self.inner.counters.snapshot(pending, self.is_draining())
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Acquire)
    }

    pub fn inter_send_delay(&self) -> Duration {
        self.inner.rate.spacing()
    }

    /// Resolve once the backlog is empty and no drain is running.
    ///
    /// Does not cancel anything: with a send that never settles, this never
    /// resolves either.
    pub async fn wait_idle(&self) {
        let mut drained_rx = self.inner.drained_tx.subscribe();
        loop {
            if self.is_idle() {
                return;
            }
            if drained_rx.changed().await.is_err() {
                return;
            }
        }
    }

    fn is_idle(&self) -> bool {
        let backlog = self.inner.lock_backlog();
        backlog.tasks.is_empty() && !self.is_draining()
    }

    fn start_drain(&self) {
        // 既に drain 中なら何もしない（同時に動く drain は 1 本だけ）
        if self
            .inner
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(drain(inner));
    }
}

impl Inner {
    fn lock_backlog(&self) -> MutexGuard<'_, Backlog> {
        self.backlog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pop the next task, or end the drain cycle if there is none.
    ///
    /// The flag is cleared under the backlog lock, so a concurrent `submit`
    /// either lands before (and is popped here) or after (and wins the
    /// compare-and-set to start a new drain).
    fn next_or_finish(&self) -> Option<QueuedTask> {
        let mut backlog = self.lock_backlog();
        let next = backlog.tasks.pop_front();
        if next.is_none() {
            self.draining.store(false, Ordering::Release);
            self.drained_tx.send_modify(|cycles| *cycles += 1);
        }
        next
    }

    fn mark_settled(&self) {
        self.lock_backlog().last_settled_at = Some(Instant::now());
    }

    /// How long to pause before the next send, measured from the last settle.
    ///
    /// Covers the pause between tasks of one drain as well as a task that
    /// arrives right after a drain cycle ended.
    fn pending_spacing(&self) -> Duration {
        let backlog = self.lock_backlog();
        match backlog.last_settled_at {
            Some(at) => self.rate.remaining_since(at, Instant::now()),
            None => Duration::ZERO,
        }
    }

    /// Hand a report to the sink. A panicking sink loses that report only;
    /// the drain keeps going.
    fn record(&self, report: &DeliveryReport) {
        let recorded = panic::catch_unwind(AssertUnwindSafe(|| self.sink.record(report)));
        if let Err(payload) = recorded {
            error!(
                task_id = %report.task_id,
                seq = report.seq,
                panic = %panic_message(payload),
                "delivery sink panicked"
            );
        }
    }

    /// Invoke one send function and turn its result into a report.
    ///
    /// The send runs in its own tokio task so a panic is contained and a
    /// timeout can abort it.
    async fn execute(&self, queued: QueuedTask) -> DeliveryReport {
        let QueuedTask {
            id,
            seq,
            submitted_at,
            task,
        } = queued;
        let (recipient, send) = task.into_parts();

        let started_at = Instant::now();
        debug!(
            task_id = %id,
            seq,
            queued_ms = saturating_millis(started_at.duration_since(submitted_at)),
            "send started"
        );

        let mut handle = self.runtime.spawn(async move { send().await });
        let result = match self.send_timeout {
            None => flatten(handle.await),
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => flatten(joined),
                Err(_) => {
                    handle.abort();
                    Err(SendError::TimedOut(limit))
                }
            },
        };

        DeliveryReport {
            task_id: id,
            seq,
            recipient,
            outcome: DeliveryOutcome::from(result),
            elapsed: started_at.elapsed(),
        }
    }
}

async fn drain(inner: Arc<Inner>) {
    debug!("drain started");

    let mut sent = 0u64;
    while let Some(queued) = inner.next_or_finish() {
        // 次のタスクを手にした時だけ待つ（空になったらタイマーは残さない）
        let pause = inner.pending_spacing();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        let report = inner.execute(queued).await;
        inner.mark_settled();
        inner.counters.record_settled(report.outcome.kind());
        inner.record(&report);
        sent += 1;
    }

    debug!(sent, "drain finished");
}

fn flatten(joined: Result<Result<(), SendError>, JoinError>) -> Result<(), SendError> {
    match joined {
        Ok(result) => result,
        Err(err) if err.is_panic() => Err(SendError::Panicked(panic_message(err.into_panic()))),
        Err(err) => Err(SendError::provider(format!("send task cancelled: {err}"))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
