//! Queue module: the dispatch queue, its rate limit, configuration and counters.

mod config;
mod dispatch;
mod rate;
mod stats;

pub use config::{ConfigError, DispatchConfig};
pub use dispatch::DispatchQueue;
pub use rate::RateLimit;
pub use stats::DispatchStats;
