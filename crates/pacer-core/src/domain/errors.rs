//! Errors - 送信エラー
//!
//! キューは送信エラーを分類しません（transient / permanent の区別なし、リトライなし）。
//! variant は「何が起きたか」をログに残すためだけに使います。

use std::time::Duration;

use thiserror::Error;

/// Failure of a single send function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The send function itself reported a failure (provider rejected, network, ...).
    #[error("send failed: {0}")]
    Provider(String),

    /// The configured per-send timeout elapsed before the send settled.
    #[error("send timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    /// The send function panicked.
    #[error("send panicked: {0}")]
    Panicked(String),
}

impl SendError {
    pub fn provider(reason: impl Into<String>) -> Self {
        Self::Provider(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            SendError::provider("550 mailbox unavailable").to_string(),
            "send failed: 550 mailbox unavailable"
        );
        assert_eq!(
            SendError::TimedOut(Duration::from_millis(1500)).to_string(),
            "send timed out after 1500ms"
        );
        assert_eq!(SendError::Panicked("boom".into()).to_string(), "send panicked: boom");
    }
}
