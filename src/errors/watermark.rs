// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for watermark persistence.

use std::path::PathBuf;

use alloy_primitives::Address;

/// Errors reading or writing the persisted watermark.
///
/// Load failures are fatal during monitor start-up. Save failures after a
/// poll cycle are logged and the next cycle tries again.
#[derive(Debug, thiserror::Error)]
pub enum WatermarkError {
    /// File system failure.
    #[error("Watermark I/O error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid watermark document.
    #[error("Watermark file {path} is corrupt: {source}")]
    Corrupt {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The document was written by an incompatible version.
    #[error("Watermark file {path} has version {found}, expected {expected}")]
    UnsupportedVersion {
        /// File involved
        path: PathBuf,
        /// Version in the file
        found: u32,
        /// Version this build writes
        expected: u32,
    },

    /// The document belongs to another contract.
    #[error("Watermark file {path} tracks {found}, not {expected}")]
    ContractMismatch {
        /// File involved
        path: PathBuf,
        /// Contract being monitored
        expected: Address,
        /// Contract recorded in the file
        found: Address,
    },
}
