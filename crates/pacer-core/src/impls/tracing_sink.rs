//! TracingSink - 送信結果を `tracing` のイベントとして出力する（デフォルト）

use tracing::{info, warn};

use crate::domain::{DeliveryOutcome, DeliveryReport, saturating_millis};
use crate::ports::DeliverySink;

/// Logs every report as one structured event.
///
/// - Delivered -> `info`
/// - Failed / TimedOut -> `warn`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DeliverySink for TracingSink {
    fn record(&self, report: &DeliveryReport) {
        let elapsed_ms = saturating_millis(report.elapsed);
        match &report.outcome {
            DeliveryOutcome::Delivered => info!(
                task_id = %report.task_id,
                seq = report.seq,
                recipient = %report.recipient,
                elapsed_ms,
                "email delivered"
            ),
            DeliveryOutcome::Failed { reason } => warn!(
                task_id = %report.task_id,
                seq = report.seq,
                recipient = %report.recipient,
                elapsed_ms,
                reason = %reason,
                "email send failed"
            ),
            DeliveryOutcome::TimedOut { after_ms } => warn!(
                task_id = %report.task_id,
                seq = report.seq,
                recipient = %report.recipient,
                elapsed_ms,
                after_ms,
                "email send timed out"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use std::collections::BTreeMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record};
    use tracing::subscriber::with_default;
    use tracing::{Event, Level, Metadata, Subscriber};
    use ulid::Ulid;

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        level: Level,
        fields: BTreeMap<String, String>,
    }

    #[derive(Clone, Default)]
    struct RecordingSubscriber {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl RecordingSubscriber {
        fn events(&self) -> Vec<CapturedEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Subscriber for RecordingSubscriber {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }

        fn record(&self, _: &Id, _: &Record<'_>) {}

        fn record_follows_from(&self, _: &Id, _: &Id) {}

        fn event(&self, event: &Event<'_>) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.events.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                fields: visitor.0,
            });
        }

        fn enter(&self, _: &Id) {}

        fn exit(&self, _: &Id) {}
    }

    #[derive(Default)]
    struct FieldVisitor(BTreeMap<String, String>);

    impl Visit for FieldVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    fn report(outcome: DeliveryOutcome) -> DeliveryReport {
        DeliveryReport {
            task_id: TaskId::from_ulid(Ulid::new()),
            seq: 7,
            recipient: "a@example.com".into(),
            outcome,
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn delivered_is_logged_at_info_with_report_fields() {
        let collector = RecordingSubscriber::default();
        let delivered = report(DeliveryOutcome::Delivered);
        with_default(collector.clone(), || TracingSink.record(&delivered));

        let events = collector.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, Level::INFO);
        assert_eq!(event.fields["message"], "email delivered");
        assert_eq!(event.fields["task_id"], delivered.task_id.to_string());
        assert_eq!(event.fields["seq"], "7");
        assert_eq!(event.fields["recipient"], "a@example.com");
        assert_eq!(event.fields["elapsed_ms"], "12");
    }

    #[test]
    fn failures_are_logged_at_warn() {
        let collector = RecordingSubscriber::default();
        with_default(collector.clone(), || {
            TracingSink.record(&report(DeliveryOutcome::Failed {
                reason: "rejected".into(),
            }));
            TracingSink.record(&report(DeliveryOutcome::TimedOut { after_ms: 10 }));
        });

        let events = collector.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.level == Level::WARN));
        assert_eq!(events[0].fields["message"], "email send failed");
        assert_eq!(events[0].fields["reason"], "rejected");
        assert_eq!(events[1].fields["message"], "email send timed out");
        assert_eq!(events[1].fields["after_ms"], "10");
    }
}
