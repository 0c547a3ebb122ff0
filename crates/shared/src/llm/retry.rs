use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;
pub const DEFAULT_BASE_DELAY_MS: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn start(&self) -> RetryState {
        RetryState {
            attempt: 1,
            policy: *self,
        }
    }

    /// Delay slept after a failed `attempt` (1-based) before the next one.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let multiplier = 1_u32 << exponent;
        self.base_delay.saturating_mul(multiplier)
    }
}

/// Per-call attempt counter; never shared between calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryState {
    attempt: u32,
    policy: RetryPolicy,
}

impl RetryState {
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn exhausted(&self) -> bool {
        self.attempt >= self.policy.max_attempts
    }

    /// Advances to the next attempt and returns the backoff to sleep first, or `None`
    /// once the attempt budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.exhausted() {
            return None;
        }
        let delay = self.policy.delay_after_attempt(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        Some(delay)
    }
}
