// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded exponential backoff.
//!
//! [`RetryPolicy`] drives two retry paths:
//! - [`retry_fetch`] wraps any fallible async fetch that returns a
//!   [`FetchError`], used for explorer requests and by the scanner and monitor
//! - [`RetryLayer`] is a Tower layer for Alloy RPC clients
//!
//! The backoff formula is `min(base_delay * 2^attempt, max_delay)`.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket, RpcError};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, warn};

use crate::errors::FetchError;

/// Default maximum number of retry attempts.
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay; doubles on every attempt.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);
/// Default maximum delay between retries.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Retry budget and backoff curve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not including the initial request).
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Retry without waiting between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::immediate(0)
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let multiplier = 2u64.saturating_pow(attempt);
        let delay_ms = self
            .base_delay
            .as_millis()
            .saturating_mul(multiplier as u128);
        let capped_delay_ms = delay_ms.min(self.max_delay.as_millis()) as u64;
        Duration::from_millis(capped_delay_ms)
    }
}

/// Run `fetch` until it succeeds, fails permanently, or the budget is spent.
///
/// Non-retryable errors are returned unchanged. Once the budget is spent the
/// last error is wrapped in [`FetchError::RetriesExhausted`].
pub async fn retry_fetch<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut fetch: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;
    loop {
        match fetch().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempt, "Fetch succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if !error.is_retryable() => {
                debug!(operation, error = %error, "Non-retryable error, not retrying");
                return Err(error);
            }
            Err(error) if attempt >= policy.max_retries => {
                warn!(operation, error = %error, attempts = attempt + 1, "Max retries exceeded");
                return Err(FetchError::RetriesExhausted {
                    operation,
                    attempts: attempt + 1,
                    source: Box::new(error),
                });
            }
            Err(error) => {
                let delay = policy.backoff(attempt);
                warn!(
                    operation,
                    error = %error,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Retryable error, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// A Tower layer that retries RPC requests with exponential backoff.
///
/// ```rust,ignore
/// use alloy_rpc_client::ClientBuilder;
/// use swapscan::transport::{RetryLayer, RetryPolicy};
///
/// let client = ClientBuilder::default()
///     .layer(RetryLayer::new(RetryPolicy::default()))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct RetryLayer {
    policy: Arc<RetryPolicy>,
}

impl RetryLayer {
    /// Creates a retry layer following `policy`.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl Default for RetryLayer {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RetryService {
            service,
            policy: self.policy.clone(),
        }
    }
}

/// A Tower service that retries failed RPC requests.
#[derive(Clone, Debug)]
pub struct RetryService<S> {
    service: S,
    policy: Arc<RetryPolicy>,
}

impl<S> tower::Service<RequestPacket> for RetryService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let service = self.service.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            let mut attempt = 0u32;
            loop {
                let mut service = service.clone();
                match service.call(request.clone()).await {
                    Ok(response) => return Ok(response),
                    Err(error) if !is_retryable_rpc_error(&error) => return Err(error),
                    Err(error) if attempt >= policy.max_retries => {
                        warn!(error = %error, attempts = attempt + 1, "RPC retries exceeded");
                        return Err(error);
                    }
                    Err(error) => {
                        let delay = policy.backoff(attempt);
                        warn!(
                            error = %error,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "Retryable RPC error, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        })
    }
}

/// Transport failures, malformed or null responses and retryable error
/// codes are transient. Serialization errors and reverts are not.
fn is_retryable_rpc_error(error: &TransportError) -> bool {
    match error {
        RpcError::Transport(kind) => kind.is_retry_err(),
        RpcError::SerError(_) => false,
        RpcError::DeserError { .. } => true,
        RpcError::ErrorResp(err) => err.is_retry_err(),
        RpcError::NullResp => true,
        _ => false,
    }
}
