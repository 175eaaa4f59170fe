use std::time::Duration;

/// Count-bounded retry policy for expired access tokens.
///
/// There is no backoff: every attempt, the first one included, is preceded by
/// the same fixed courtesy delay.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub call_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::config::DEFAULT_MAX_REFRESH_RETRIES,
            call_interval: crate::config::DEFAULT_CALL_INTERVAL,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &crate::Config) -> Self {
        Self {
            max_retries: cfg.max_refresh_retries,
            call_interval: cfg.call_interval,
        }
    }

    /// Initial attempt plus every allowed retry.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether another attempt may follow `attempts_made` failed ones.
    pub fn allows_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts()
    }

    pub async fn pace(&self) {
        if !self.call_interval.is_zero() {
            tokio::time::sleep(self.call_interval).await;
        }
    }
}
