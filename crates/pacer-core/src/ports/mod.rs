//! Ports - 抽象化レイヤー
//!
//! キューが外部に依存する部分 (時刻, ID 採番, 結果の記録, メール送信) を
//! trait として定義します。実装は `impls` かアプリ側に置きます。

pub mod clock;
pub mod delivery_sink;
pub mod id_generator;
pub mod mailer;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::delivery_sink::DeliverySink;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::mailer::Mailer;
