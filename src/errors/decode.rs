// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for log decoding.

use alloy_primitives::TxHash;

/// A log entry carried a known event signature but did not match its layout.
///
/// Decode errors are local to one log: they are logged and the log is
/// skipped, the rest of the batch is still reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Wrong number of topics for the event.
    #[error("{event} log {tx_hash}:{log_index} has {actual} topics, expected {expected}")]
    TopicCount {
        /// Event name
        event: &'static str,
        /// Transaction that emitted the log
        tx_hash: TxHash,
        /// Position of the log in its block
        log_index: u64,
        /// Topics the layout requires
        expected: usize,
        /// Topics present
        actual: usize,
    },

    /// Wrong data blob length for the event.
    #[error("{event} log {tx_hash}:{log_index} has {actual} data bytes, expected {expected}")]
    DataLength {
        /// Event name
        event: &'static str,
        /// Transaction that emitted the log
        tx_hash: TxHash,
        /// Position of the log in its block
        log_index: u64,
        /// Bytes the layout requires
        expected: usize,
        /// Bytes present
        actual: usize,
    },

    /// ABI decoding rejected the log.
    #[error("Failed to decode {event} log {tx_hash}:{log_index}: {details}")]
    Abi {
        /// Event name
        event: &'static str,
        /// Transaction that emitted the log
        tx_hash: TxHash,
        /// Position of the log in its block
        log_index: u64,
        /// Decoder message
        details: String,
    },
}
