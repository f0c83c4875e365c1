use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use serde::Serialize;
use tokio::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pacer_core::impls::{FanoutSink, MemorySink, TracingSink};
use pacer_core::ports::Mailer;
use pacer_core::{
    DeliveryReport, DispatchConfig, DispatchQueue, DispatchStats, EmailMessage, SendError,
};

/// pacer - push simulated emails through a rate-limited dispatch queue
#[derive(Parser, Debug)]
#[command(name = "pacer", version, about = "Rate-limited email dispatch queue demo")]
struct Cli {
    /// Path to a JSON config file (DispatchConfig)
    #[arg(long, env = "PACER_CONFIG")]
    config: Option<PathBuf>,

    /// Number of emails to submit
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// Sends per second the provider allows (overrides config)
    #[arg(long)]
    rate: Option<f64>,

    /// Explicit inter-send delay in ms (overrides rate)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Per-send timeout in ms
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Make every Nth send fail (0 = never)
    #[arg(long, default_value_t = 0)]
    fail_every: u64,

    /// Simulated provider latency in ms
    #[arg(long, default_value_t = 20)]
    latency_ms: u64,
}

/// Stand-in for the transactional email provider.
struct SimulatedMailer {
    latency: Duration,
    fail_every: u64,
    calls: AtomicU64,
}

impl SimulatedMailer {
    fn new(latency: Duration, fail_every: u64) -> Self {
        Self {
            latency,
            fail_every,
            calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Mailer for SimulatedMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), SendError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        tokio::time::sleep(self.latency).await;

        if self.fail_every > 0 && n % self.fail_every == 0 {
            return Err(SendError::provider(format!("simulated rejection (call {n})")));
        }
        debug!(to = %message.recipient_label(), subject = %message.subject, "provider accepted");
        Ok(())
    }
}

#[derive(Serialize)]
struct Summary {
    stats: DispatchStats,
    failures: Vec<DeliveryReport>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load_config(cli: &Cli) -> Result<DispatchConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            DispatchConfig::from_json_str(&raw)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => DispatchConfig::default(),
    };

    if let Some(rate) = cli.rate {
        config.sends_per_second = rate;
    }
    if let Some(ms) = cli.delay_ms {
        config.inter_send_delay_ms = Some(ms);
    }
    if let Some(ms) = cli.timeout_ms {
        config.send_timeout_ms = Some(ms);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli)?;
    let memory = Arc::new(MemorySink::new());
    let sink = FanoutSink::new()
        .with(Arc::new(TracingSink))
        .with(memory.clone());

    let queue = DispatchQueue::builder()
        .config(config)
        .sink(Arc::new(sink))
        .build()
        .context("failed to build dispatch queue")?;
    info!(
        count = cli.count,
        delay_ms = u64::try_from(queue.inter_send_delay().as_millis()).unwrap_or(u64::MAX),
        "submitting emails"
    );

    let mailer: Arc<dyn Mailer> = Arc::new(SimulatedMailer::new(
        Duration::from_millis(cli.latency_ms),
        cli.fail_every,
    ));
    for i in 0..cli.count {
        let message = EmailMessage::new(
            "agency@example.com",
            format!("creator{i}@example.com"),
            "Your creative agenda was updated",
            format!("<p>Item {i} moved to review.</p>"),
        );
        queue.submit_email(Arc::clone(&mailer), message);
    }

    // submit は即座に戻るので、終了前に backlog を流し切る
    queue.wait_idle().await;

    let summary = Summary {
        stats: queue.stats(),
        failures: memory.failures(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config_values() {
        let cli = Cli::parse_from(["pacer", "--rate", "4", "--timeout-ms", "250"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.sends_per_second, 4.0);
        assert_eq!(config.send_timeout_ms, Some(250));
        assert_eq!(config.rate_limit().spacing(), Duration::from_millis(250));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["pacer", "--config", "/nonexistent/pacer.json"]);
        assert!(load_config(&cli).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_mailer_fails_every_nth_call() {
        let mailer = SimulatedMailer::new(Duration::from_millis(5), 2);
        let msg = EmailMessage::new("a@example.com", "b@example.com", "s", "h");

        assert!(mailer.send(msg.clone()).await.is_ok());
        assert!(mailer.send(msg.clone()).await.is_err());
        assert!(mailer.send(msg).await.is_ok());
    }
}
