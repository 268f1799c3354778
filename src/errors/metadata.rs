// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for token metadata lookups.

use alloy_primitives::Address;

use super::FetchError;

/// A token or pool contract could not be queried.
///
/// Never fatal: the resolver degrades to fallback metadata and logs the
/// error at warn level. Only [`MetadataError::Unavailable`] says nothing
/// about the contract; the other variants are its final answer.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// The contract answered with an error (revert, no code).
    #[error("Call {function} on {contract} failed: {details}")]
    CallFailed {
        /// Contract called
        contract: Address,
        /// Function name
        function: &'static str,
        /// Failure description
        details: String,
    },

    /// The call succeeded but its return data did not decode.
    #[error("Could not decode {function} result from {contract}: {details}")]
    InvalidReturn {
        /// Contract called
        contract: Address,
        /// Function name
        function: &'static str,
        /// Decoder message
        details: String,
    },

    /// The call never reached the contract (network, rate limit, retries spent).
    #[error("Call {function} on {contract} unavailable: {source}")]
    Unavailable {
        /// Contract called
        contract: Address,
        /// Function name
        function: &'static str,
        /// Underlying fetch failure
        #[source]
        source: FetchError,
    },
}

impl MetadataError {
    /// Create a `CallFailed` error.
    pub fn call_failed(contract: Address, function: &'static str, details: impl ToString) -> Self {
        Self::CallFailed {
            contract,
            function,
            details: details.to_string(),
        }
    }

    /// Create an `InvalidReturn` error.
    pub fn invalid_return(
        contract: Address,
        function: &'static str,
        details: impl ToString,
    ) -> Self {
        Self::InvalidReturn {
            contract,
            function,
            details: details.to_string(),
        }
    }

    /// Create an `Unavailable` error.
    pub fn unavailable(contract: Address, function: &'static str, source: FetchError) -> Self {
        Self::Unavailable {
            contract,
            function,
            source,
        }
    }

    /// Whether a later attempt may get a different answer.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_transient() {
        let contract = Address::repeat_byte(0x11);
        let outage = FetchError::RateLimited {
            message: "Max rate limit reached".into(),
        };

        assert!(MetadataError::unavailable(contract, "decimals", outage).is_transient());
        assert!(!MetadataError::call_failed(contract, "decimals", "execution reverted").is_transient());
        assert!(!MetadataError::invalid_return(contract, "symbol", "empty symbol").is_transient());
    }
}
