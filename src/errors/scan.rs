// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for historical block range scans.

use alloy_primitives::BlockNumber;

use super::FetchError;

/// The requested block range is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid block range: from block {from_block} is greater than to block {to_block}")]
pub struct RangeError {
    /// Requested start block
    pub from_block: BlockNumber,
    /// Requested end block
    pub to_block: BlockNumber,
}

/// Errors that end a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The range was rejected before any fetch.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Fetching logs failed after the retry budget was spent.
    #[error("Failed to fetch logs for blocks {from_block}..={to_block}: {source}")]
    Fetch {
        /// First block of the failing chunk
        from_block: BlockNumber,
        /// Last block of the failing chunk
        to_block: BlockNumber,
        /// Underlying error
        #[source]
        source: FetchError,
    },

    /// The chain head could not be determined to default the range.
    #[error("Failed to read chain head: {0}")]
    Head(#[source] FetchError),

    /// A report could not be written to its sink.
    #[error("Failed to write event report: {0}")]
    Report(#[source] std::io::Error),
}
