//! DispatchQueueBuilder - キューの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 設定の検証と tokio runtime の取得は build() 時に行う
//! - build() が通れば、以降の submit() は失敗しない

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::impls::TracingSink;
use crate::ports::{DeliverySink, IdGenerator, SystemClock, UlidGenerator};
use crate::queue::{ConfigError, DispatchConfig, DispatchQueue};

/// BuildError はキュー構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("no tokio runtime: build the queue inside a runtime or pass a handle with `runtime()`")]
    NoRuntime,
}

/// Builds a `DispatchQueue`.
///
/// # 使用例
/// ```ignore
/// let queue = DispatchQueueBuilder::new()
///     .config(DispatchConfig::from_json_str(&raw)?)
///     .sink(Arc::new(TracingSink))
///     .build()?;
/// ```
///
/// Defaults: `DispatchConfig::default()`, `TracingSink`, ULIDs from the system
/// clock, and the runtime the builder is called from.
pub struct DispatchQueueBuilder {
    config: DispatchConfig,
    sink: Option<Arc<dyn DeliverySink>>,
    ids: Option<Box<dyn IdGenerator>>,
    runtime: Option<Handle>,
}

impl DispatchQueueBuilder {
    pub fn new() -> Self {
        Self {
            config: DispatchConfig::default(),
            sink: None,
            ids: None,
            runtime: None,
        }
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the inter-send delay directly.
    ///
    /// Millisecond precision; a fraction of a millisecond rounds up so a tiny
    /// delay never turns the rate limit off.
    pub fn inter_send_delay(mut self, delay: Duration) -> Self {
        self.config.inter_send_delay_ms = Some(ceil_millis(delay));
        self
    }

    /// Millisecond precision, rounded up like `inter_send_delay`.
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.config.send_timeout_ms = Some(ceil_millis(timeout));
        self
    }

    pub fn sink(mut self, sink: Arc<dyn DeliverySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    /// Runtime the drain loop is spawned on.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Result<DispatchQueue, BuildError> {
        self.config.validate()?;

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| BuildError::NoRuntime)?,
        };
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        let ids = self
            .ids
            .unwrap_or_else(|| Box::new(UlidGenerator::new(SystemClock)));

        Ok(DispatchQueue::from_parts(
            self.config.rate_limit(),
            self.config.send_timeout(),
            sink,
            ids,
            runtime,
        ))
    }
}

fn ceil_millis(d: Duration) -> u64 {
    let whole = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
    if d.subsec_nanos() % 1_000_000 == 0 {
        whole
    } else {
        whole.saturating_add(1)
    }
}

impl Default for DispatchQueueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchQueue {
    pub fn builder() -> DispatchQueueBuilder {
        DispatchQueueBuilder::new()
    }
}
