//! App - アプリケーション層
//!
//! ports と queue を組み合わせて、起動時にキューを組み立てます。
//! キューはグローバルに持たず、組み立てたインスタンスを呼び出し元に渡します。

pub mod builder;

pub use self::builder::{BuildError, DispatchQueueBuilder};
