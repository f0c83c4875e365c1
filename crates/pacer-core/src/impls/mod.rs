//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **TracingSink**: デフォルトの DeliverySink（tracing に出力）
//! - **MemorySink**: テスト・CLI 集計用
//! - **NoopSink** / **FanoutSink**
//!
//! Mailer の本番実装（プロバイダの API クライアント）はアプリ側に置きます。

pub mod memory_sink;
pub mod tracing_sink;

pub use self::memory_sink::{FanoutSink, MemorySink, NoopSink};
pub use self::tracing_sink::TracingSink;
