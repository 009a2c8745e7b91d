//! Backoff policy for establishing the stream connection.
//!
//! Waits double from `initial_delay` up to `max_delay`. Each wait is spread
//! randomly by up to `randomization` of its length in either direction.

use std::time::Duration;

/// Connection retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Connection attempts after the first one.
    pub retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction of each wait applied as random spread; `0.0` disables it.
    pub randomization: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 5,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            randomization: 0.2,
        }
    }
}

impl RetryConfig {
    /// The waits between failed attempts, one per retry.
    pub fn delays(&self) -> Backoff<'_> {
        Backoff {
            config: self,
            retry: 0,
        }
    }

    fn nominal_ms(&self, retry: u32) -> f64 {
        let grown = self.initial_delay.as_millis() as f64 * self.multiplier.powi(retry as i32);
        grown.min(self.max_delay.as_millis() as f64)
    }

    fn spread(&self, nominal_ms: f64) -> Duration {
        let factor = if self.randomization > 0.0 {
            1.0 + self.randomization * (rand::random::<f64>() * 2.0 - 1.0)
        } else {
            1.0
        };
        Duration::from_millis((nominal_ms * factor).max(0.0) as u64)
    }
}

/// Iterator over retry waits; ends once the retries are spent.
#[derive(Debug)]
pub struct Backoff<'a> {
    config: &'a RetryConfig,
    retry: u32,
}

impl Iterator for Backoff<'_> {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.retry >= self.config.retries {
            return None;
        }
        let nominal = self.config.nominal_ms(self.retry);
        self.retry += 1;
        Some(self.config.spread(nominal))
    }
}
