//! Coordinator configuration

use std::time::Duration;

/// Timing knobs for one write attempt.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How long to wait for the peer commit event before synthesizing a
    /// timeout. Trades latency against false-timeout risk under network
    /// variance.
    pub commit_wait_ms: u64,
    /// How long to wait for the ordering service to answer a broadcast.
    pub submit_timeout_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            commit_wait_ms: 3000,
            submit_timeout_ms: 10000,
        }
    }
}

impl CoordinatorConfig {
    pub fn commit_wait(&self) -> Duration {
        Duration::from_millis(self.commit_wait_ms)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }
}
