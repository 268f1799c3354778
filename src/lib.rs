// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # swapscan
//!
//! Watch a contract for ERC-20 `Transfer` and Uniswap V2-style `Swap`
//! events, either over a historical block range or live, and render each
//! one as a stable text report with exact decimal amounts.
//!
//! ## Pipeline
//!
//! ```text
//! LogSource -> EventDecoder -> AmountNormalizer (TokenMetadataResolver) -> EventFormatter -> ReportSink
//! ```
//!
//! - [`source`]: explorer API or JSON-RPC log sources
//! - [`events`]: decoding, normalization and formatting
//! - [`metadata`]: cached token symbol/decimals lookups with fallbacks
//! - [`scanner`]: chunked historical scans
//! - [`monitor`]: the live poll loop and its persisted watermark
//!
//! ## Amount normalization
//!
//! ```rust
//! use alloy_primitives::U256;
//! use swapscan::{TokenAmount, TokenDecimals};
//!
//! let raw = TokenAmount::new(U256::from(133_521_502_759_972_748u128));
//! let normalized = raw.normalize(TokenDecimals::STANDARD);
//! assert_eq!(normalized.to_string(), "0.133521502759972748");
//! ```

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod errors;
pub mod events;
pub mod metadata;
pub mod monitor;
pub mod provider;
pub mod scanner;
pub mod sink;
pub mod source;
pub mod transport;
pub mod types;

mod spans;

pub use config::{WatchConfig, WatchConfigBuilder};
pub use errors::{
    ConfigError, DecodeError, FetchError, MetadataError, MonitorError, RangeError, ScanError,
    WatchError, WatermarkError,
};
pub use events::{EventDecoder, EventFormatter, NormalizedEvent};
pub use metadata::{ContractReader, TokenMetadataResolver};
pub use monitor::{LiveMonitor, MonitorState};
pub use scanner::BlockRangeScanner;
pub use source::LogSource;
pub use types::config::{MaxBlockRange, PageSize};
pub use types::log::{LogKey, RawLogEntry};
pub use types::tokens::{NormalizedAmount, TokenAmount, TokenDecimals, TokenMetadata};
