//! Shared retry utilities for provider operations.
//!
//! Hosted-API HTTP calls get a small bounded retry with backoff on
//! transient failures. Git shell-outs are deliberately not retried: a ref
//! that fails to shallow-clone is treated as a task failure instead.

use std::time::Duration;

use backon::ExponentialBuilder;

/// Maximum attempts for a single provider HTTP call.
pub const PROVIDER_RETRY_ATTEMPTS: usize = 3;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 500;

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 10_000;

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: PROVIDER_RETRY_ATTEMPTS,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// The standard backoff for hosted-API provider calls.
#[must_use]
pub fn provider_backoff() -> ExponentialBuilder {
    RetryConfig::default().into_backoff()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = RetryConfig::default();
        assert_eq!(config.min_delay, Duration::from_millis(INITIAL_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(config.max_retries, PROVIDER_RETRY_ATTEMPTS);
        assert!(config.with_jitter);
    }

    #[test]
    fn custom_config() {
        let config = RetryConfig::new(Duration::from_secs(1), Duration::from_secs(30), 5);
        assert_eq!(config.max_retries, 5);
        let _backoff = config.into_backoff();
    }
}
