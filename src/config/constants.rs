// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Defaults and well-known values
//!
//! Centralizes the magic numbers used by the explorer client, the scanner
//! and the monitor.

use std::time::Duration;

/// Default Etherscan-compatible explorer for Base
pub const DEFAULT_EXPLORER_URL: &str = "https://api.basescan.org";

/// Path segment the explorer serves its API under
pub const EXPLORER_API_PATH: &str = "/api";

/// Time between monitor poll cycles (one Ethereum slot)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(12);

/// Blocks covered by `scan` when `--from-block` is omitted
pub const DEFAULT_SCAN_LOOKBACK: u64 = 1000;

/// Explorer free-tier request budget
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

/// Timeout for a single HTTP request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Directory holding monitor watermarks when no explicit path is given
pub const DEFAULT_WATERMARK_DIR: &str = ".swapscan";

/// Environment variables read by the binary
pub mod env {
    /// Explorer API key
    pub const API_KEY: &str = "BASESCAN_API_KEY";
    /// Explorer base URL
    pub const EXPLORER_URL: &str = "BASE_SCAN_URL";
    /// JSON-RPC endpoint
    pub const RPC_URL: &str = "BASE_RPC_URL";
    /// Chain id for multichain explorer endpoints
    pub const CHAIN_ID: &str = "EXPLORER_CHAIN_ID";
}
