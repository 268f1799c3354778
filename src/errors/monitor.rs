// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the live monitor.

use super::{FetchError, ScanError, WatermarkError};

/// Errors raised by the live monitor.
///
/// Only [`MonitorError::Watermark`] stops a running monitor. `Head` and
/// `Poll` are logged by the run loop, which tries again after the poll
/// interval.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The persisted watermark could not be loaded or initialised.
    #[error("Watermark error: {0}")]
    Watermark(#[from] WatermarkError),

    /// No watermark exists and the chain head could not be read.
    #[error("Failed to read chain head during start-up: {0}")]
    Head(#[source] FetchError),

    /// A poll cycle could not fetch the head or its logs.
    #[error("Poll cycle failed: {0}")]
    Poll(#[source] ScanError),
}
