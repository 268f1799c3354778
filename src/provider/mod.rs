// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider construction for the JSON-RPC backend
//!
//! Providers use `AnyNetwork` so one binary can watch any EVM chain. The
//! recommended fillers are disabled: only reads are performed, so a bare
//! `RootProvider` is all that is needed.

use alloy_network::AnyNetwork;
use alloy_provider::{ProviderBuilder, RootProvider};
use alloy_rpc_client::ClientBuilder;
use alloy_transport_http::Http;
use url::Url;

use crate::config::WatchConfig;
use crate::errors::ConfigError;
use crate::transport::{RateLimitLayer, RetryLayer, TokenBucket};

/// Type alias for an HTTP provider using `AnyNetwork`
pub type AnyHttpProvider = RootProvider<AnyNetwork>;

/// Create an HTTP provider for `url`.
///
/// Requests pass through a [`RetryLayer`] built from `config.retry` and,
/// when `config.requests_per_second` is set, a [`RateLimitLayer`]. Retries
/// draw from the request budget like any other request.
///
/// ```rust,ignore
/// use swapscan::provider::create_http_provider;
/// use swapscan::WatchConfig;
///
/// let provider = create_http_provider("https://mainnet.base.org".parse()?, &WatchConfig::default())?;
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the HTTP client cannot be built.
pub fn create_http_provider(url: Url, config: &WatchConfig) -> Result<AnyHttpProvider, ConfigError> {
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ConfigError::invalid_value("request_timeout", e.to_string()))?;
    let transport = Http::with_client(http_client, url);
    let retry = RetryLayer::new(config.retry.clone());

    let client = match config.requests_per_second {
        Some(rps) => ClientBuilder::default()
            .layer(retry)
            .layer(RateLimitLayer::new(TokenBucket::per_second(rps)))
            .transport(transport, false),
        None => ClientBuilder::default().layer(retry).transport(transport, false),
    };

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<AnyNetwork>()
        .connect_client(client))
}
