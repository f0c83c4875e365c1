//! DeliverySink port - 送信結果の記録先
//!
//! キューは結果を書き込むだけで、戻り値は使いません。
//! 呼び出し元への通知経路はここ以外にありません。

use crate::domain::DeliveryReport;

/// Write-only receiver of one report per settled task.
///
/// Called from the drain loop, so implementations must not block for long.
/// A panic in `record` is caught and logged; that report is lost.
pub trait DeliverySink: Send + Sync {
    fn record(&self, report: &DeliveryReport);
}
