// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for log and block-height retrieval.

use alloy_primitives::BlockNumber;
use alloy_transport::TransportError;

/// Errors that occur while talking to the explorer API or an RPC node.
///
/// Use [`FetchError::is_retryable`] to decide whether another attempt can
/// succeed. The retry helper in [`crate::transport`] relies on it.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request could not be completed (connect, timeout, body read).
    #[error("HTTP request for {operation} failed: {source}")]
    Http {
        /// Which request failed
        operation: &'static str,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("{operation} returned HTTP {status}")]
    Status {
        /// Which request failed
        operation: &'static str,
        /// HTTP status code
        status: u16,
    },

    /// The explorer reported that the request rate limit was hit.
    #[error("Explorer rate limit reached: {message}")]
    RateLimited {
        /// Message returned by the explorer
        message: String,
    },

    /// The explorer rejected the API key.
    #[error("Explorer rejected the API key: {message}")]
    InvalidApiKey {
        /// Message returned by the explorer
        message: String,
    },

    /// The explorer returned an error envelope.
    #[error("Explorer error during {operation}: {message}")]
    Api {
        /// Which request failed
        operation: &'static str,
        /// Message returned by the explorer
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed response for {operation}: {details}")]
    Malformed {
        /// Which request failed
        operation: &'static str,
        /// What was wrong with the body
        details: String,
    },

    /// An RPC call failed after transport-level retries.
    #[error("RPC {operation} failed: {source}")]
    Rpc {
        /// Which call failed
        operation: &'static str,
        /// Underlying transport error
        #[source]
        source: TransportError,
    },

    /// A single block holds more logs than the explorer result window can page through.
    #[error("Block {block} has more logs than the explorer result window allows")]
    WindowExhausted {
        /// The block that could not be paged through
        block: BlockNumber,
    },

    /// The retry budget ran out.
    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Which call failed
        operation: &'static str,
        /// Number of attempts made, including the first
        attempts: u32,
        /// The last error observed
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Create a `Malformed` error.
    pub fn malformed(operation: &'static str, details: impl Into<String>) -> Self {
        Self::Malformed {
            operation,
            details: details.into(),
        }
    }

    /// Create an `Api` error.
    pub fn api(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Api {
            operation,
            message: message.into(),
        }
    }

    /// Whether another attempt at the same request may succeed.
    ///
    /// Transport failures, throttling, 5xx statuses, explorer error envelopes
    /// and malformed bodies are transient. A rejected API key, RPC errors
    /// (already retried by the transport layer) and an overflowing block are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request() || source.is_body()
            }
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::RateLimited { .. } | Self::Api { .. } | Self::Malformed { .. } => true,
            Self::InvalidApiKey { .. }
            | Self::Rpc { .. }
            | Self::WindowExhausted { .. }
            | Self::RetriesExhausted { .. } => false,
        }
    }
}
