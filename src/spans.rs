// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for swapscan operations.
//!
//! Telemetry is kept apart from business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here and the
//! caller attaches it with [`tracing::Instrument`].
//!
//! ```rust,ignore
//! async fn my_operation(&self, param: Type) -> Result<T> {
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(spans::my_operation(param))
//!     .await
//! }
//! ```

use alloy_primitives::{Address, BlockNumber};
use tracing::{Level, Span};

/// Span for a full historical scan of `[from_block, to_block]`.
///
/// Parent: None (root span for a scan)
/// Children: fetch_chunk spans
#[inline]
pub(crate) fn scan_range(contract: Address, from_block: BlockNumber, to_block: BlockNumber) -> Span {
    tracing::span!(
        Level::INFO,
        "swapscan.scan_range",
        contract = %contract,
        from_block = from_block,
        to_block = to_block,
    )
}

/// Span for fetching and decoding one chunk of a range.
///
/// Parent: scan_range or poll_cycle
/// Children: explorer_request spans, resolve_token spans
#[inline]
pub(crate) fn fetch_chunk(from_block: BlockNumber, to_block: BlockNumber) -> Span {
    tracing::debug_span!(
        "swapscan.fetch_chunk",
        from_block = from_block,
        to_block = to_block,
    )
}

/// Span for one monitor poll cycle.
///
/// Parent: None
/// Children: fetch_chunk spans
#[inline]
pub(crate) fn poll_cycle(contract: Address, last_block: BlockNumber) -> Span {
    tracing::info_span!(
        "swapscan.poll_cycle",
        contract = %contract,
        last_block = last_block,
    )
}

/// Span for a token metadata lookup that missed the cache.
#[inline]
pub(crate) fn resolve_token(token: Address) -> Span {
    tracing::debug_span!("swapscan.resolve_token", token = %token)
}

/// Span for a single explorer HTTP request.
#[inline]
pub(crate) fn explorer_request(action: &'static str) -> Span {
    tracing::trace_span!("swapscan.explorer_request", action = action)
}
