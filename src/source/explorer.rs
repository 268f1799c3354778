// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Etherscan-compatible explorer client
//!
//! Logs come from `module=logs&action=getLogs`, paged with `page`/`offset`.
//! The chain head and metadata calls go through the `module=proxy` JSON-RPC
//! passthrough. Every request draws from the same [`TokenBucket`], so the
//! explorer's per-key budget is shared by log fetching and metadata lookups.
//!
//! Explorers cap the reachable result set at `page * offset <= 10000`. When a
//! range holds more logs than that, paging restarts from the last block seen
//! and the overlap is de-duplicated by `(block, log index)`.

use std::collections::BTreeMap;
use std::future::Future;

use alloy_primitives::{Address, BlockNumber, Bytes, TxHash, B256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, Instrument};

use crate::config::{ExplorerEndpoint, WatchConfig};
use crate::errors::{ConfigError, FetchError, MetadataError};
use crate::metadata::{calls::MetadataCall, ContractReader};
use crate::source::LogSource;
use crate::spans;
use crate::transport::{retry_fetch, RetryPolicy, TokenBucket};
use crate::types::config::PageSize;
use crate::types::log::RawLogEntry;

const GET_LOGS: &str = "getLogs";
const BLOCK_NUMBER: &str = "eth_blockNumber";
const ETH_CALL: &str = "eth_call";

/// Message explorers return alongside `status: "0"` when a query matched nothing.
const NO_RECORDS: &str = "no records found";

/// Explorer API client implementing [`LogSource`] and [`ContractReader`].
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    endpoint: ExplorerEndpoint,
    bucket: Option<TokenBucket>,
    page_size: PageSize,
    retry: RetryPolicy,
}

impl ExplorerClient {
    /// Build a client for `endpoint` using the request budget, timeout and
    /// page size from `config`.
    pub fn new(endpoint: ExplorerEndpoint, config: &WatchConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::invalid_value("request_timeout", e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            bucket: config.requests_per_second.map(TokenBucket::per_second),
            page_size: config.page_size,
            retry: config.retry.clone(),
        })
    }

    /// Share an existing request budget with another client.
    pub fn with_bucket(mut self, bucket: TokenBucket) -> Self {
        self.bucket = Some(bucket);
        self
    }

    async fn get(
        &self,
        operation: &'static str,
        params: &[(&str, String)],
    ) -> Result<String, FetchError> {
        if let Some(bucket) = &self.bucket {
            bucket.acquire().await;
        }

        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("apikey", self.endpoint.api_key.clone()));
        if let Some(chain_id) = self.endpoint.chain_id {
            query.push(("chainid", chain_id.to_string()));
        }

        let response = self
            .http
            .get(self.endpoint.api_url.clone())
            .query(&query)
            .send()
            .await
            .map_err(|source| FetchError::Http { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                operation,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| FetchError::Http { operation, source })
    }

    async fn logs_page(
        &self,
        contract: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
        page: u32,
    ) -> Result<Vec<RawLogEntry>, FetchError> {
        let params = [
            ("module", "logs".to_string()),
            ("action", GET_LOGS.to_string()),
            ("address", contract.to_string()),
            ("fromBlock", from_block.to_string()),
            ("toBlock", to_block.to_string()),
            ("page", page.to_string()),
            ("offset", self.page_size.as_u32().to_string()),
        ];

        let body = self
            .get(GET_LOGS, &params)
            .instrument(spans::explorer_request(GET_LOGS))
            .await?;
        let logs = parse_logs_response(&body)?;
        trace!(from_block, to_block, page, count = logs.len(), "Fetched log page");
        Ok(logs)
    }

    async fn proxy(
        &self,
        action: &'static str,
        extra: &[(&str, String)],
    ) -> Result<ProxyReply, FetchError> {
        let mut params = vec![("module", "proxy".to_string()), ("action", action.to_string())];
        params.extend_from_slice(extra);

        let body = self
            .get(action, &params)
            .instrument(spans::explorer_request(action))
            .await?;
        parse_proxy_response(action, &body)
    }
}

#[async_trait]
impl LogSource for ExplorerClient {
    async fn latest_block(&self) -> Result<BlockNumber, FetchError> {
        match self.proxy(BLOCK_NUMBER, &[]).await? {
            ProxyReply::Value(hex) => parse_quantity(BLOCK_NUMBER, &hex),
            ProxyReply::Error(message) => Err(FetchError::api(BLOCK_NUMBER, message)),
        }
    }

    async fn fetch_logs(
        &self,
        contract: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<RawLogEntry>, FetchError> {
        let logs = paginate(from_block, self.page_size, |cursor, page| {
            self.logs_page(contract, cursor, to_block, page)
        })
        .await?;
        debug!(%contract, from_block, to_block, count = logs.len(), "Fetched logs from explorer");
        Ok(logs)
    }
}

#[async_trait]
impl ContractReader for ExplorerClient {
    async fn call(&self, contract: Address, call: &MetadataCall) -> Result<Bytes, MetadataError> {
        let params = [
            ("to", contract.to_string()),
            ("data", call.calldata.to_string()),
            ("tag", "latest".to_string()),
        ];

        let reply = retry_fetch(&self.retry, ETH_CALL, || self.proxy(ETH_CALL, &params))
            .await
            .map_err(|e| MetadataError::unavailable(contract, call.function, e))?;

        match reply {
            ProxyReply::Value(hex) => hex
                .parse::<Bytes>()
                .map_err(|e| MetadataError::invalid_return(contract, call.function, e.to_string())),
            ProxyReply::Error(message) => {
                Err(MetadataError::call_failed(contract, call.function, message))
            }
        }
    }
}

/// Collect every log of a range starting at `from_block` by paging through `fetch_page`.
///
/// `fetch_page(cursor, page)` returns one page of the range starting at
/// `cursor`. Paging stops at the first short page. When the result window
/// runs out, paging restarts at the last block seen; a window that never
/// leaves its starting block is reported as [`FetchError::WindowExhausted`].
pub(crate) async fn paginate<F, Fut>(
    from_block: BlockNumber,
    page_size: PageSize,
    mut fetch_page: F,
) -> Result<Vec<RawLogEntry>, FetchError>
where
    F: FnMut(BlockNumber, u32) -> Fut,
    Fut: Future<Output = Result<Vec<RawLogEntry>, FetchError>>,
{
    let mut collected: BTreeMap<(BlockNumber, u64), RawLogEntry> = BTreeMap::new();
    let mut cursor = from_block;

    loop {
        let mut last_block = cursor;

        for page in 1..=page_size.max_pages() {
            let entries = fetch_page(cursor, page).await?;
            let full = entries.len() >= page_size.as_u32() as usize;

            for entry in entries {
                last_block = last_block.max(entry.block_number);
                collected.insert(entry.position(), entry);
            }

            if !full {
                return Ok(collected.into_values().collect());
            }
        }

        if last_block <= cursor {
            return Err(FetchError::WindowExhausted { block: cursor });
        }
        debug!(
            cursor,
            restart = last_block,
            "Explorer result window exhausted, restarting from last block"
        );
        cursor = last_block;
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplorerLog {
    address: Address,
    topics: Vec<Option<B256>>,
    data: Bytes,
    block_number: String,
    log_index: String,
    transaction_hash: TxHash,
}

impl ExplorerLog {
    fn into_entry(self) -> Result<RawLogEntry, FetchError> {
        Ok(RawLogEntry {
            tx_hash: self.transaction_hash,
            block_number: parse_quantity(GET_LOGS, &self.block_number)?,
            log_index: parse_quantity(GET_LOGS, &self.log_index)?,
            address: self.address,
            topics: self.topics.into_iter().map_while(|topic| topic).collect(),
            data: self.data,
        })
    }
}

/// Reply to a `module=proxy` call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProxyReply {
    /// The hex `result` string
    Value(String),
    /// A JSON-RPC `error` object, e.g. a reverted call
    Error(String),
}

fn parse_envelope(operation: &'static str, body: &str) -> Result<Envelope, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::malformed(operation, e.to_string()))
}

/// Map an explorer error envelope onto a [`FetchError`].
fn envelope_error(operation: &'static str, message: Option<&str>, result: &Value) -> FetchError {
    let detail = match result {
        Value::String(text) if !text.is_empty() => text.clone(),
        _ => message.unwrap_or("unknown error").to_string(),
    };
    let lowered = detail.to_ascii_lowercase();

    if lowered.contains("rate limit") {
        FetchError::RateLimited { message: detail }
    } else if lowered.contains("api key") || lowered.contains("apikey") {
        FetchError::InvalidApiKey { message: detail }
    } else {
        FetchError::api(operation, detail)
    }
}

fn parse_logs_response(body: &str) -> Result<Vec<RawLogEntry>, FetchError> {
    let envelope = parse_envelope(GET_LOGS, body)?;

    if envelope.status.as_deref() != Some("1") {
        let no_records = envelope
            .message
            .as_deref()
            .is_some_and(|m| m.to_ascii_lowercase().contains(NO_RECORDS));
        let empty_result = matches!(&envelope.result, Value::Array(items) if items.is_empty());
        if no_records || empty_result {
            return Ok(Vec::new());
        }
        return Err(envelope_error(
            GET_LOGS,
            envelope.message.as_deref(),
            &envelope.result,
        ));
    }

    let logs: Vec<ExplorerLog> = serde_json::from_value(envelope.result)
        .map_err(|e| FetchError::malformed(GET_LOGS, e.to_string()))?;
    logs.into_iter().map(ExplorerLog::into_entry).collect()
}

fn parse_proxy_response(operation: &'static str, body: &str) -> Result<ProxyReply, FetchError> {
    let envelope = parse_envelope(operation, body)?;

    if let Some(error) = envelope.error {
        return Ok(ProxyReply::Error(error.message));
    }
    if envelope.status.as_deref() == Some("0") {
        return Err(envelope_error(
            operation,
            envelope.message.as_deref(),
            &envelope.result,
        ));
    }

    match envelope.result {
        Value::String(hex) if hex.starts_with("0x") || hex.starts_with("0X") => {
            Ok(ProxyReply::Value(hex))
        }
        // Proxy throttling answers with a plain-text result and no status
        Value::String(text) => Err(envelope_error(operation, None, &Value::String(text))),
        other => Err(FetchError::malformed(
            operation,
            format!("expected hex string result, got {other}"),
        )),
    }
}

/// Parse a hex (`0x`-prefixed) or decimal quantity. A bare `0x` is zero.
fn parse_quantity(operation: &'static str, raw: &str) -> Result<u64, FetchError> {
    let parsed = match raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
    {
        Some("") => Ok(0),
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse::<u64>(),
    };
    parsed.map_err(|e| FetchError::malformed(operation, format!("invalid quantity {raw:?}: {e}")))
}
