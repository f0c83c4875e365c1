//! Mailer port - トランザクションメール送信の抽象化
//!
//! 実際のプロバイダ (HTTP API クライアントなど) はアプリ側で実装します。
//! エラーの分類は実装側の責務で、キューは `SendError` を不透明に扱います。

use async_trait::async_trait;

use crate::domain::{EmailMessage, SendError};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), SendError>;
}
