// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for swapscan runs
//!
//! [`WatchConfig`] holds the tunables shared by scans and the live monitor:
//! chunk sizes, paging, poll cadence, request budget and retry policy.
//! [`Settings`] holds the validated endpoints, credentials and the watched
//! contract, built from CLI flags and environment variables.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use swapscan::WatchConfig;
//!
//! let config = WatchConfig::default();
//! assert_eq!(config.poll_interval.as_secs(), 12);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use std::time::Duration;
//! use swapscan::WatchConfigBuilder;
//!
//! let config = WatchConfigBuilder::with_defaults()
//!     .max_block_range(1000)
//!     .poll_interval(Duration::from_secs(4))
//!     .build()
//!     .unwrap();
//! assert_eq!(config.max_block_range.as_u64(), 1000);
//! ```

use std::time::Duration;

use crate::errors::ConfigError;
use crate::transport::RetryPolicy;
use crate::types::config::{MaxBlockRange, PageSize};

pub mod constants;
mod settings;

pub use settings::{
    parse_contract_address, Backend, EndpointArgs, ExplorerEndpoint, Settings, SourceKind,
};

use constants::{DEFAULT_POLL_INTERVAL, DEFAULT_REQUESTS_PER_SECOND, DEFAULT_REQUEST_TIMEOUT};

/// Tunables for log fetching and polling
///
/// Use [`WatchConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Maximum number of blocks covered by one log query
    /// Default: 500
    pub max_block_range: MaxBlockRange,

    /// Entries requested per explorer page
    /// Default: 1000
    pub page_size: PageSize,

    /// Maximum number of blocks a single monitor poll advances past the watermark
    /// Default: 2000
    pub max_blocks_per_poll: MaxBlockRange,

    /// Sleep between monitor poll cycles
    /// Default: 12s
    pub poll_interval: Duration,

    /// Request budget for the explorer and RPC clients
    /// Default: Some(5), None disables throttling
    pub requests_per_second: Option<u32>,

    /// Backoff policy for transient fetch failures
    /// Default: 3 retries, 2s doubling, capped at 30s
    pub retry: RetryPolicy,

    /// Timeout for a single HTTP request
    /// Default: 30s
    pub request_timeout: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl WatchConfig {
    /// Defaults suited to a free-tier explorer key
    pub fn with_defaults() -> Self {
        Self {
            max_block_range: MaxBlockRange::DEFAULT,
            page_size: PageSize::default(),
            max_blocks_per_poll: MaxBlockRange::POLL_DEFAULT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            requests_per_second: Some(DEFAULT_REQUESTS_PER_SECOND),
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// No throttling and no backoff delay, for local nodes and tests
    pub fn minimal() -> Self {
        Self {
            requests_per_second: None,
            retry: RetryPolicy::immediate(RetryPolicy::default().max_retries),
            ..Self::with_defaults()
        }
    }
}

/// Builder for [`WatchConfig`]
#[derive(Debug, Clone)]
pub struct WatchConfigBuilder {
    config: WatchConfig,
}

impl Default for WatchConfigBuilder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl WatchConfigBuilder {
    /// Start from [`WatchConfig::with_defaults`]
    pub fn with_defaults() -> Self {
        Self {
            config: WatchConfig::with_defaults(),
        }
    }

    /// Start from [`WatchConfig::minimal`]
    pub fn minimal() -> Self {
        Self {
            config: WatchConfig::minimal(),
        }
    }

    /// Set the maximum number of blocks per log query
    pub fn max_block_range(mut self, blocks: u64) -> Self {
        self.config.max_block_range = MaxBlockRange::new(blocks);
        self
    }

    /// Set the explorer page size (clamped to 1..=1000)
    pub fn page_size(mut self, entries: u32) -> Self {
        self.config.page_size = PageSize::new(entries);
        self
    }

    /// Set how far one poll cycle may advance the watermark
    pub fn max_blocks_per_poll(mut self, blocks: u64) -> Self {
        self.config.max_blocks_per_poll = MaxBlockRange::new(blocks);
        self
    }

    /// Set the sleep between poll cycles
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the request budget, `None` to disable throttling
    pub fn requests_per_second(mut self, rps: Option<u32>) -> Self {
        self.config.requests_per_second = rps;
        self
    }

    /// Set the retry policy for transient fetch failures
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero block ranges, a zero
    /// poll interval, a zero request budget or a zero timeout.
    pub fn build(self) -> Result<WatchConfig, ConfigError> {
        let config = self.config;
        if config.max_block_range.as_u64() == 0 {
            return Err(ConfigError::invalid_value("max_block_range", "must be at least 1 block"));
        }
        if config.max_blocks_per_poll.as_u64() == 0 {
            return Err(ConfigError::invalid_value(
                "max_blocks_per_poll",
                "must be at least 1 block",
            ));
        }
        if config.poll_interval.is_zero() {
            return Err(ConfigError::invalid_value("poll_interval", "must be non-zero"));
        }
        if config.requests_per_second == Some(0) {
            return Err(ConfigError::invalid_value(
                "requests_per_second",
                "must be non-zero, omit it to disable throttling",
            ));
        }
        if config.request_timeout.is_zero() {
            return Err(ConfigError::invalid_value("request_timeout", "must be non-zero"));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WatchConfig::default();
        assert_eq!(config.max_block_range, MaxBlockRange::DEFAULT);
        assert_eq!(config.page_size, PageSize::MAX);
        assert_eq!(config.poll_interval, Duration::from_secs(12));
        assert_eq!(config.requests_per_second, Some(5));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_minimal_has_no_throttling() {
        let config = WatchConfig::minimal();
        assert_eq!(config.requests_per_second, None);
        assert_eq!(config.retry.base_delay, Duration::ZERO);
    }

    #[test]
    fn test_builder_overrides() {
        let config = WatchConfigBuilder::with_defaults()
            .max_block_range(100)
            .page_size(250)
            .max_blocks_per_poll(50)
            .poll_interval(Duration::from_secs(2))
            .requests_per_second(None)
            .build()
            .unwrap();

        assert_eq!(config.max_block_range.as_u64(), 100);
        assert_eq!(config.page_size.as_u32(), 250);
        assert_eq!(config.max_blocks_per_poll.as_u64(), 50);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.requests_per_second, None);
    }

    #[test]
    fn test_builder_rejects_zero_values() {
        assert!(matches!(
            WatchConfigBuilder::with_defaults().max_block_range(0).build(),
            Err(ConfigError::InvalidValue { field: "max_block_range", .. })
        ));
        assert!(matches!(
            WatchConfigBuilder::with_defaults()
                .poll_interval(Duration::ZERO)
                .build(),
            Err(ConfigError::InvalidValue { field: "poll_interval", .. })
        ));
        assert!(matches!(
            WatchConfigBuilder::with_defaults()
                .requests_per_second(Some(0))
                .build(),
            Err(ConfigError::InvalidValue { field: "requests_per_second", .. })
        ));
    }
}
