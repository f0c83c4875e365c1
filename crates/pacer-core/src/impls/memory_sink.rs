//! In-process sinks: MemorySink (inspectable), NoopSink, FanoutSink.

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::{DeliveryReport, OutcomeKind};
use crate::ports::DeliverySink;

/// Keeps every report in memory, in the order they were recorded.
///
/// Unbounded; meant for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<DeliveryReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<DeliveryReport> {
        self.lock().clone()
    }

    /// Reports whose outcome is not `Delivered`.
    pub fn failures(&self) -> Vec<DeliveryReport> {
        self.lock()
            .iter()
            .filter(|r| !r.outcome.is_delivered())
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.lock()
            .iter()
            .filter(|r| r.outcome.kind() == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DeliveryReport>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeliverySink for MemorySink {
    fn record(&self, report: &DeliveryReport) {
        self.lock().push(report.clone());
    }
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DeliverySink for NoopSink {
    fn record(&self, _report: &DeliveryReport) {}
}

/// Forwards each report to every inner sink, in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DeliverySink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn DeliverySink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl DeliverySink for FanoutSink {
    fn record(&self, report: &DeliveryReport) {
        for sink in &self.sinks {
            sink.record(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeliveryOutcome, TaskId};
    use std::time::Duration;
    use ulid::Ulid;

    fn report(seq: u64, outcome: DeliveryOutcome) -> DeliveryReport {
        DeliveryReport {
            task_id: TaskId::from_ulid(Ulid::new()),
            seq,
            recipient: format!("r{seq}@example.com"),
            outcome,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn memory_sink_keeps_order_and_filters_failures() {
        let sink = MemorySink::new();
        sink.record(&report(0, DeliveryOutcome::Delivered));
        sink.record(&report(
            1,
            DeliveryOutcome::Failed {
                reason: "x".into(),
            },
        ));
        sink.record(&report(2, DeliveryOutcome::TimedOut { after_ms: 5 }));

        let seqs: Vec<u64> = sink.reports().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);

        let failed: Vec<u64> = sink.failures().iter().map(|r| r.seq).collect();
        assert_eq!(failed, vec![1, 2]);

        assert_eq!(sink.count(OutcomeKind::Delivered), 1);
        assert_eq!(sink.count(OutcomeKind::Failed), 1);
        assert_eq!(sink.count(OutcomeKind::TimedOut), 1);
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn fanout_forwards_to_every_sink() {
        let a = Arc::new(MemorySink::new());
        let b = Arc::new(MemorySink::new());
        let fanout = FanoutSink::new()
            .with(a.clone())
            .with(Arc::new(NoopSink))
            .with(b.clone());

        fanout.record(&report(7, DeliveryOutcome::Delivered));

        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a.reports()[0].seq, 7);
    }
}
