use rand::Rng;
use std::time::Duration;
use tokio::signal;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Inclusive bounds for a randomized pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub fn from_secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min.min(max)),
            max: Duration::from_secs(max.max(min)),
        }
    }

    /// Uniform draw in `[min, max]`.
    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if min >= max {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// Sleeps for `delay` unless `token` fires first.
///
/// Returns `true` when the full delay elapsed, `false` when it was cut short
/// by cancellation.
pub async fn wait_with_cancel(delay: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = sleep(delay) => true,
    }
}

/// `1m 5s` style rendering used in wait notices.
pub fn format_wait(delay: Duration) -> String {
    let secs = delay.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

/// `5h 12m` style rendering for long cooldowns.
pub fn format_cooldown(secs: u64) -> String {
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}

pub struct WorkerRunner;

impl WorkerRunner {
    /// Runs `on_signal` on Ctrl+C. The returned handle can be aborted once
    /// the guarded work has finished.
    pub fn on_ctrl_c<F>(on_signal: F) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("🛑 Received Ctrl+C. Requesting graceful stop...");
                    on_signal();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        })
    }
}
