// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw log entries as delivered by a log source.

use alloy_primitives::{Address, BlockNumber, Bytes, TxHash, B256};
use serde::{Deserialize, Serialize};

/// A log entry fetched for the watched contract, before decoding.
///
/// Immutable once fetched. Ordering across a batch is by
/// `(block_number, log_index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogEntry {
    /// Transaction that emitted the log
    pub tx_hash: TxHash,
    /// Block containing the transaction
    pub block_number: BlockNumber,
    /// Position of the log within its block
    pub log_index: u64,
    /// Contract that emitted the log
    pub address: Address,
    /// Indexed topics, the event signature first
    pub topics: Vec<B256>,
    /// Non-indexed data blob
    pub data: Bytes,
}

impl RawLogEntry {
    /// Event signature hash in the first topic slot, if any
    pub fn signature(&self) -> Option<B256> {
        self.topics.first().copied()
    }

    /// Identity of this log for duplicate suppression
    pub fn key(&self) -> LogKey {
        LogKey {
            tx_hash: self.tx_hash,
            log_index: self.log_index,
        }
    }

    /// Sort key placing logs in chain order
    pub fn position(&self) -> (BlockNumber, u64) {
        (self.block_number, self.log_index)
    }
}

/// `(transaction hash, log index)` pair identifying a delivered log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogKey {
    /// Transaction that emitted the log
    pub tx_hash: TxHash,
    /// Position of the log within its block
    pub log_index: u64,
}

impl std::fmt::Display for LogKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.log_index)
    }
}
