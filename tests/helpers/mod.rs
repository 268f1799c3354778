// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for swapscan integration tests
//!
//! Provides mock implementations of the log source and contract reader so
//! scans and the monitor can run without a network.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{address, Address, BlockNumber, Bytes, LogData, B256, U256};
use alloy_sol_types::{sol_data, SolEvent, SolType, SolValue};
use async_trait::async_trait;
use swapscan::errors::{FetchError, MetadataError};
use swapscan::events::{AmountNormalizer, EventDecoder, EventPipeline, Swap, Transfer};
use swapscan::metadata::calls::MetadataCall;
use swapscan::sink::ReportSink;
use swapscan::transport::RetryPolicy;
use swapscan::{
    BlockRangeScanner, ContractReader, LogSource, RawLogEntry, TokenMetadataResolver, WatchConfig,
    WatchConfigBuilder,
};

pub const POOL: Address = address!("0x88A43bbDF9D098eEC7bCEda4e2494615dfD9bB9C");
pub const ROUTER: Address = address!("0x4752ba5DBc23f44D87826276BF6Fd6b1C372aD24");
pub const WETH: Address = address!("0x4200000000000000000000000000000000000006");
pub const TOKEN: Address = address!("0x1111111111111111111111111111111111111111");
pub const NOT_A_TOKEN: Address = address!("0x2222222222222222222222222222222222222222");

/// In-memory [`LogSource`]
///
/// Logs can be added while a test runs. Failures are scripted: the next
/// `n` calls to `fetch_logs` or `latest_block` fail with a retryable error.
#[derive(Default)]
pub struct MockLogSource {
    logs: Mutex<Vec<RawLogEntry>>,
    head: AtomicU64,
    fetch_calls: AtomicUsize,
    head_calls: AtomicUsize,
    pending_failures: AtomicU32,
    pending_head_failures: AtomicU32,
    ranges: Mutex<Vec<(BlockNumber, BlockNumber)>>,
}

impl MockLogSource {
    pub fn new(head: BlockNumber) -> Self {
        let source = Self::default();
        source.set_head(head);
        source
    }

    pub fn with_logs(self, logs: impl IntoIterator<Item = RawLogEntry>) -> Self {
        self.logs.lock().unwrap().extend(logs);
        self
    }

    pub fn push_log(&self, log: RawLogEntry) {
        self.logs.lock().unwrap().push(log);
    }

    pub fn set_head(&self, head: BlockNumber) {
        self.head.store(head, Ordering::SeqCst);
    }

    /// Make the next `count` log fetches fail with a rate-limit error.
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` head lookups fail with a rate-limit error.
    pub fn fail_head_next(&self, count: u32) {
        self.pending_head_failures.store(count, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.fetch_calls() + self.head_calls()
    }

    /// Block ranges requested so far, in call order
    pub fn ranges(&self) -> Vec<(BlockNumber, BlockNumber)> {
        self.ranges.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn latest_block(&self) -> Result<BlockNumber, FetchError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.pending_head_failures) {
            return Err(rate_limited());
        }
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn fetch_logs(
        &self,
        contract: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<RawLogEntry>, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push((from_block, to_block));

        if take_failure(&self.pending_failures) {
            return Err(rate_limited());
        }

        let mut logs: Vec<RawLogEntry> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.address == contract)
            .filter(|log| (from_block..=to_block).contains(&log.block_number))
            .cloned()
            .collect();
        // Sources are not required to sort; hand logs back reversed.
        logs.reverse();
        Ok(logs)
    }
}

fn take_failure(pending: &AtomicU32) -> bool {
    pending
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn rate_limited() -> FetchError {
    FetchError::RateLimited {
        message: "Max rate limit reached".into(),
    }
}

/// [`ContractReader`] answering for a WETH/TOKEN pool and its tokens.
///
/// [`NOT_A_TOKEN`] and any other address revert.
#[derive(Default)]
pub struct MockTokenReader {
    calls: AtomicUsize,
}

impl MockTokenReader {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn answer(contract: Address, function: &str) -> Option<Vec<u8>> {
    if contract == POOL {
        match function {
            "token0" => return Some((WETH,).abi_encode_params()),
            "token1" => return Some((TOKEN,).abi_encode_params()),
            _ => {}
        }
    }
    let tokens = [(POOL, "UNI-V2", 18u8), (WETH, "WETH", 18), (TOKEN, "TKN", 18)];
    let (_, symbol, decimals) = tokens.into_iter().find(|(token, ..)| *token == contract)?;
    match function {
        "decimals" => Some(<(sol_data::Uint<8>,) as SolType>::abi_encode_params(&(decimals,))),
        "symbol" => Some((symbol.to_string(),).abi_encode_params()),
        _ => None,
    }
}

#[async_trait]
impl ContractReader for MockTokenReader {
    async fn call(&self, contract: Address, call: &MetadataCall) -> Result<Bytes, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        answer(contract, call.function)
            .map(Bytes::from)
            .ok_or_else(|| MetadataError::call_failed(contract, call.function, "execution reverted"))
    }
}

/// Sink that keeps every report
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub reports: Vec<String>,
}

impl ReportSink for CollectingSink {
    fn emit(&mut self, report: &str) -> io::Result<()> {
        self.reports.push(report.to_string());
        Ok(())
    }
}

/// Sink that accepts `accept` reports, then fails every write.
#[derive(Debug, Default)]
pub struct FailingSink {
    pub accept: usize,
    pub reports: Vec<String>,
}

impl ReportSink for FailingSink {
    fn emit(&mut self, report: &str) -> io::Result<()> {
        if self.reports.len() >= self.accept {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.reports.push(report.to_string());
        Ok(())
    }
}

/// Config with immediate retries and no throttling
pub fn test_config() -> WatchConfig {
    WatchConfigBuilder::minimal()
        .retry(RetryPolicy::immediate(2))
        .build()
        .unwrap()
}

pub fn pipeline() -> EventPipeline<Arc<MockTokenReader>> {
    pipeline_with(Arc::new(MockTokenReader::default()))
}

pub fn pipeline_with(reader: Arc<MockTokenReader>) -> EventPipeline<Arc<MockTokenReader>> {
    let resolver = Arc::new(TokenMetadataResolver::new(reader));
    EventPipeline::new(EventDecoder::new(), AmountNormalizer::new(resolver))
}

pub fn scanner(
    source: Arc<MockLogSource>,
    config: WatchConfig,
) -> BlockRangeScanner<Arc<MockLogSource>, Arc<MockTokenReader>> {
    BlockRangeScanner::new(source, pipeline(), config)
}

pub fn tx_hash(block: BlockNumber, log_index: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[16..24].copy_from_slice(&block.to_be_bytes());
    bytes[24..].copy_from_slice(&log_index.to_be_bytes());
    B256::from(bytes)
}

fn entry(contract: Address, block: BlockNumber, log_index: u64, data: LogData) -> RawLogEntry {
    RawLogEntry {
        tx_hash: tx_hash(block, log_index),
        block_number: block,
        log_index,
        address: contract,
        topics: data.topics().to_vec(),
        data: data.data,
    }
}

pub fn transfer_log(
    contract: Address,
    block: BlockNumber,
    log_index: u64,
    from: Address,
    to: Address,
    value: u128,
) -> RawLogEntry {
    let event = Transfer {
        from,
        to,
        value: U256::from(value),
    };
    entry(contract, block, log_index, event.encode_log_data())
}

pub fn swap_log(
    block: BlockNumber,
    log_index: u64,
    amounts: [u128; 4],
    sender: Address,
    to: Address,
) -> RawLogEntry {
    let [in0, in1, out0, out1] = amounts.map(U256::from);
    let event = Swap {
        sender,
        amount0In: in0,
        amount1In: in1,
        amount0Out: out0,
        amount1Out: out1,
        to,
    };
    entry(POOL, block, log_index, event.encode_log_data())
}

/// An LP token transfer emitted by the pool itself
pub fn pool_transfer(block: BlockNumber, log_index: u64) -> RawLogEntry {
    transfer_log(POOL, block, log_index, ROUTER, POOL, 1_000_000)
}
