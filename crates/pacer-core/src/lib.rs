//! pacer-core
//!
//! In-memory, rate-limited dispatch queue for outbound email.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId, Task, DeliveryOutcome, SendError, EmailMessage）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, DeliverySink, Mailer）
//! - **queue**: DispatchQueue 本体（drain loop, RateLimit, DispatchConfig, DispatchStats）
//! - **app**: DispatchQueueBuilder（起動時の組み立て）
//! - **impls**: ports の実装（TracingSink, MemorySink など）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;

pub use app::{BuildError, DispatchQueueBuilder};
pub use domain::{DeliveryOutcome, DeliveryReport, EmailMessage, SendError, Task, TaskId};
pub use queue::{DispatchConfig, DispatchQueue, DispatchStats};
