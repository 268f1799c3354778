// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for run configuration.

/// Errors raised while validating CLI flags, environment variables and
/// tunables before any network access happens.
///
/// All variants are fatal: the binary exits with a non-zero status before
/// the first request is sent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The explorer API key is absent or blank.
    #[error("Missing explorer API key (set BASESCAN_API_KEY or pass --api-key)")]
    MissingApiKey,

    /// The RPC backend was selected without an endpoint.
    #[error("Missing RPC URL (set BASE_RPC_URL or pass --rpc-url)")]
    MissingRpcUrl,

    /// The watched contract address could not be parsed.
    #[error("Invalid contract address '{value}': {reason}")]
    InvalidContractAddress {
        /// The value as supplied by the user
        value: String,
        /// Parser error message
        reason: String,
    },

    /// An endpoint URL could not be parsed.
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Name of the setting that holds the URL
        field: &'static str,
        /// Parser error message
        reason: String,
    },

    /// A tunable has a value the watcher cannot run with.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the setting
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create an `InvalidContractAddress` error.
    pub fn invalid_contract_address(value: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidContractAddress {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an `InvalidUrl` error.
    pub fn invalid_url(field: &'static str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            field,
            reason: reason.to_string(),
        }
    }

    /// Create an `InvalidValue` error.
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
