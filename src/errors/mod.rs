// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the swapscan library.
//!
//! Each domain has its own error type:
//! - [`ConfigError`] - invalid flags, environment or tunables (fatal)
//! - [`RangeError`] - an empty scan range (fatal, raised before any fetch)
//! - [`FetchError`] - explorer or RPC failures (retryable with a ceiling)
//! - [`DecodeError`] - a single malformed log (logged and skipped)
//! - [`MetadataError`] - token lookups (degrades to fallback metadata)
//! - [`WatermarkError`] - monitor state persistence
//!
//! [`ScanError`] and [`MonitorError`] collect what can end each mode, and
//! [`WatchError`] unifies everything the binary can fail with.

mod config;
mod decode;
mod fetch;
mod metadata;
mod monitor;
mod scan;
mod watermark;

pub use config::ConfigError;
pub use decode::DecodeError;
pub use fetch::FetchError;
pub use metadata::MetadataError;
pub use monitor::MonitorError;
pub use scan::{RangeError, ScanError};
pub use watermark::WatermarkError;

/// Unified error type for a swapscan run.
///
/// Module-specific errors convert into it with `?`.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scan failed.
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    /// The monitor failed to start.
    #[error("Monitor failed: {0}")]
    Monitor(#[from] MonitorError),
}

impl From<RangeError> for WatchError {
    fn from(err: RangeError) -> Self {
        Self::Scan(ScanError::Range(err))
    }
}

impl WatchError {
    /// Process exit code for this error: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Scan(_) | Self::Monitor(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(WatchError::from(ConfigError::MissingApiKey).exit_code(), 2);
        let range = RangeError {
            from_block: 10,
            to_block: 5,
        };
        let err = WatchError::from(range);
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "Scan failed: Invalid block range: from block 10 is greater than to block 5"
        );
    }
}
