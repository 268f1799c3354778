// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Request throttling and retry plumbing.
//!
//! - [`TokenBucket`] / [`RateLimitLayer`]: shared request budget for the
//!   explorer client and Alloy RPC clients
//! - [`RetryPolicy`] / [`retry_fetch`] / [`RetryLayer`]: bounded exponential
//!   backoff for transient failures
//!
//! # Usage
//!
//! ```rust,ignore
//! use alloy_rpc_client::ClientBuilder;
//! use swapscan::transport::{RateLimitLayer, RetryLayer, RetryPolicy, TokenBucket};
//!
//! let bucket = TokenBucket::per_second(5);
//! let client = ClientBuilder::default()
//!     .layer(RetryLayer::new(RetryPolicy::default()))
//!     .layer(RateLimitLayer::new(bucket.clone()))
//!     .http(rpc_url);
//! ```

mod rate_limit;
mod retry;

pub use rate_limit::{RateLimitLayer, RateLimitService, TokenBucket};
pub use retry::{retry_fetch, RetryLayer, RetryPolicy, RetryService};
