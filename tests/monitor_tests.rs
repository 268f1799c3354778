// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the live monitor and watermark persistence

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use helpers::*;
use swapscan::errors::{MonitorError, ScanError, WatermarkError};
use swapscan::monitor::{JsonFileStore, MemoryStore, Watermark, WatermarkStore, WATERMARK_VERSION};
use swapscan::{LiveMonitor, MonitorState, WatchConfig, WatchConfigBuilder};
use tempfile::TempDir;
use tokio::sync::watch;

type TestMonitor<W> = LiveMonitor<Arc<MockLogSource>, Arc<MockTokenReader>, W>;

fn monitor<W: WatermarkStore>(
    source: &Arc<MockLogSource>,
    store: W,
    config: WatchConfig,
) -> TestMonitor<W> {
    LiveMonitor::new(POOL, scanner(source.clone(), config.clone()), store, &config)
}

/// Store whose saves always fail
struct FailingStore;

#[async_trait]
impl WatermarkStore for FailingStore {
    async fn load(&self, _contract: Address) -> Result<Option<Watermark>, WatermarkError> {
        Ok(None)
    }

    async fn save(&self, _contract: Address, _watermark: &Watermark) -> Result<(), WatermarkError> {
        Err(WatermarkError::Io {
            path: "unwritable.json".into(),
            source: std::io::Error::other("disk full"),
        })
    }
}

#[tokio::test]
async fn fresh_start_processes_the_head_block() {
    let source = Arc::new(MockLogSource::new(100).with_logs([pool_transfer(100, 0)]));
    let mut monitor = monitor(&source, MemoryStore::new(), test_config());
    let mut sink = CollectingSink::default();

    assert_eq!(monitor.state(), MonitorState::Init);
    let outcome = monitor.poll_once(&mut sink).await.unwrap().unwrap();

    assert_eq!((outcome.from_block, outcome.to_block), (100, 100));
    assert_eq!(outcome.emitted, 1);
    assert_eq!(sink.reports.len(), 1);
    assert!(sink.reports[0].contains("Block: 100\n"));
}

#[tokio::test]
async fn restart_does_not_redeliver_and_picks_up_late_boundary_logs() {
    let store = MemoryStore::new();
    let source = Arc::new(MockLogSource::new(100).with_logs([pool_transfer(100, 0)]));
    let mut sink = CollectingSink::default();

    {
        let mut first = monitor(&source, store.clone(), test_config());
        first.poll_once(&mut sink).await.unwrap();
    }
    assert_eq!(sink.reports.len(), 1);

    let saved = store.load(POOL).await.unwrap().unwrap();
    assert_eq!(saved.last_block, 100);
    assert_eq!(saved.seen.len(), 1);

    // A log lands in the boundary block after the first fetch, and the chain moves on
    source.push_log(pool_transfer(100, 1));
    source.push_log(pool_transfer(105, 0));
    source.set_head(110);

    let mut second = monitor(&source, store.clone(), test_config());
    let outcome = second.poll_once(&mut sink).await.unwrap().unwrap();

    assert_eq!((outcome.from_block, outcome.to_block), (100, 110));
    assert_eq!(outcome.emitted, 2);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(sink.reports.len(), 3);
    assert!(sink.reports[1].contains("Block: 100\nLog Index: 1\n"));
    assert!(sink.reports[2].contains("Block: 105\nLog Index: 0\n"));

    let again = second.poll_once(&mut sink).await.unwrap().unwrap();
    assert_eq!(again.emitted, 0);
    assert_eq!(sink.reports.len(), 3);
}

#[tokio::test]
async fn head_behind_watermark_is_a_no_op() {
    let store = MemoryStore::new();
    store.save(POOL, &Watermark::starting_at(500)).await.unwrap();
    let source = Arc::new(MockLogSource::new(450));
    let mut monitor = monitor(&source, store.clone(), test_config());
    let mut sink = CollectingSink::default();

    assert_eq!(monitor.poll_once(&mut sink).await.unwrap(), None);
    assert_eq!(source.fetch_calls(), 0);
    assert_eq!(store.load(POOL).await.unwrap().unwrap().last_block, 500);
}

#[tokio::test]
async fn failed_fetch_leaves_watermark_in_place() {
    let store = MemoryStore::new();
    store.save(POOL, &Watermark::starting_at(100)).await.unwrap();
    let source = Arc::new(MockLogSource::new(120).with_logs([pool_transfer(110, 0)]));
    let mut monitor = monitor(&source, store.clone(), test_config());
    let mut sink = CollectingSink::default();

    source.fail_next(10);
    let error = monitor.poll_once(&mut sink).await.unwrap_err();
    assert!(matches!(error, MonitorError::Poll(ScanError::Fetch { .. })));
    assert_eq!(monitor.watermark().unwrap().last_block, 100);
    assert_eq!(store.load(POOL).await.unwrap().unwrap().last_block, 100);
    assert!(sink.reports.is_empty());

    source.fail_next(0);
    let outcome = monitor.poll_once(&mut sink).await.unwrap().unwrap();
    assert_eq!((outcome.from_block, outcome.to_block), (100, 120));
    assert_eq!(sink.reports.len(), 1);
}

#[tokio::test]
async fn catch_up_is_bounded_per_cycle() {
    let store = MemoryStore::new();
    store.save(POOL, &Watermark::starting_at(0)).await.unwrap();
    let source = Arc::new(MockLogSource::new(100).with_logs([pool_transfer(15, 0)]));
    let config = WatchConfigBuilder::minimal()
        .retry(swapscan::transport::RetryPolicy::immediate(2))
        .max_blocks_per_poll(10)
        .build()
        .unwrap();
    let mut monitor = monitor(&source, store, config);
    let mut sink = CollectingSink::default();

    let first = monitor.poll_once(&mut sink).await.unwrap().unwrap();
    assert_eq!((first.from_block, first.to_block), (0, 10));
    assert_eq!(first.emitted, 0);

    let second = monitor.poll_once(&mut sink).await.unwrap().unwrap();
    assert_eq!((second.from_block, second.to_block), (10, 20));
    assert_eq!(second.emitted, 1);
}

#[tokio::test]
async fn save_failure_is_tolerated() {
    let source = Arc::new(MockLogSource::new(100).with_logs([pool_transfer(100, 0)]));
    let mut monitor = monitor(&source, FailingStore, test_config());
    let mut sink = CollectingSink::default();

    let outcome = monitor.poll_once(&mut sink).await.unwrap().unwrap();
    assert_eq!(outcome.emitted, 1);

    source.push_log(pool_transfer(101, 0));
    source.set_head(101);
    let outcome = monitor.poll_once(&mut sink).await.unwrap().unwrap();
    assert_eq!(outcome.emitted, 1);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(monitor.watermark().unwrap().last_block, 101);
    assert_eq!(sink.reports.len(), 2);
}

#[tokio::test]
async fn failed_report_write_leaves_watermark_in_place() {
    let store = MemoryStore::new();
    store.save(POOL, &Watermark::starting_at(100)).await.unwrap();
    let source = Arc::new(
        MockLogSource::new(110).with_logs([pool_transfer(105, 0), pool_transfer(106, 0)]),
    );
    let mut monitor = monitor(&source, store.clone(), test_config());
    let mut sink = FailingSink {
        accept: 1,
        ..FailingSink::default()
    };

    let error = monitor.poll_once(&mut sink).await.unwrap_err();
    assert!(matches!(error, MonitorError::Poll(ScanError::Report(_))));
    assert_eq!(monitor.watermark().unwrap().last_block, 100);
    assert_eq!(store.load(POOL).await.unwrap().unwrap().last_block, 100);

    sink.accept = 10;
    let outcome = monitor.poll_once(&mut sink).await.unwrap().unwrap();
    assert_eq!(outcome.emitted, 2);
    assert_eq!(monitor.watermark().unwrap().last_block, 110);

    // The report written before the failure is delivered again
    assert_eq!(sink.reports.len(), 3);
    assert_eq!(sink.reports[0], sink.reports[1]);
    assert!(sink.reports[2].contains("Block: 106\n"));
}

#[tokio::test(start_paused = true)]
async fn run_retries_start_up_while_chain_head_is_unavailable() {
    let source = Arc::new(MockLogSource::new(100).with_logs([pool_transfer(100, 0)]));
    // Three attempts per lookup, so only the second start-up succeeds
    source.fail_head_next(5);
    let config = WatchConfigBuilder::minimal()
        .retry(swapscan::transport::RetryPolicy::immediate(2))
        .poll_interval(Duration::from_secs(12))
        .build()
        .unwrap();
    let mut monitor = monitor(&source, MemoryStore::new(), config);
    let mut sink = CollectingSink::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let driver = async move {
        tokio::time::sleep(Duration::from_secs(20)).await;
        shutdown_tx.send(true).unwrap();
    };

    let (result, ()) = tokio::join!(monitor.run(&mut sink, shutdown_rx), driver);
    result.unwrap();

    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert_eq!(monitor.watermark().unwrap().last_block, 100);
    assert_eq!(sink.reports.len(), 1);
    // three failed attempts, two more failures and a success, then the poll's head read
    assert_eq!(source.head_calls(), 7);
}

#[tokio::test(start_paused = true)]
async fn run_polls_until_shutdown_without_duplicates() {
    let source = Arc::new(MockLogSource::new(100).with_logs([pool_transfer(100, 0)]));
    let config = WatchConfigBuilder::minimal()
        .retry(swapscan::transport::RetryPolicy::immediate(2))
        .poll_interval(Duration::from_secs(12))
        .build()
        .unwrap();
    let mut monitor = monitor(&source, MemoryStore::new(), config);
    let mut sink = CollectingSink::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let driver = {
        let source = source.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            source.push_log(pool_transfer(100, 1));
            source.push_log(pool_transfer(101, 0));
            source.set_head(101);
            tokio::time::sleep(Duration::from_secs(20)).await;
            shutdown_tx.send(true).unwrap();
        }
    };

    let (result, ()) = tokio::join!(monitor.run(&mut sink, shutdown_rx), driver);
    result.unwrap();

    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert_eq!(sink.reports.len(), 3);
    let mut unique = sink.reports.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3);
    assert!(source.fetch_calls() >= 3);
}

#[tokio::test]
async fn run_stops_when_the_shutdown_sender_is_dropped() {
    let source = Arc::new(MockLogSource::new(100));
    let mut monitor = monitor(&source, MemoryStore::new(), test_config());
    let mut sink = CollectingSink::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    drop(shutdown_tx);

    monitor.run(&mut sink, shutdown_rx).await.unwrap();
    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert_eq!(source.fetch_calls(), 1);
}

#[tokio::test]
async fn corrupt_watermark_stops_run_at_start_up() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("watermark.json");
    std::fs::write(&path, "not json").unwrap();

    let source = Arc::new(MockLogSource::new(100));
    let mut monitor = monitor(&source, JsonFileStore::new(&path), test_config());
    let mut sink = CollectingSink::default();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let error = monitor.run(&mut sink, shutdown_rx).await.unwrap_err();
    assert!(matches!(
        error,
        MonitorError::Watermark(WatermarkError::Corrupt { .. })
    ));
    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert_eq!(source.total_calls(), 0);
}

#[tokio::test]
async fn file_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("state").join("wm.json"));

    assert_eq!(store.load(POOL).await.unwrap(), None);

    let mut watermark = Watermark::starting_at(23071608);
    watermark.advance(23071608, &[pool_transfer(23071608, 4), pool_transfer(23071608, 7)]);
    store.save(POOL, &watermark).await.unwrap();

    assert_eq!(store.load(POOL).await.unwrap(), Some(watermark));
    let leftovers: Vec<_> = std::fs::read_dir(store.path().parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("wm.json")]);

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(document["version"], WATERMARK_VERSION);
    assert_eq!(document["last_block"], 23071608);
    assert_eq!(document["seen_log_keys"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn file_store_rejects_other_contracts() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("wm.json"));
    store.save(POOL, &Watermark::starting_at(1)).await.unwrap();

    match store.load(ROUTER).await {
        Err(WatermarkError::ContractMismatch { expected, found, .. }) => {
            assert_eq!(expected, ROUTER);
            assert_eq!(found, POOL);
        }
        other => panic!("expected contract mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn file_store_rejects_unknown_versions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wm.json");
    std::fs::write(&path, r#"{"version": 99, "something": "else"}"#).unwrap();

    match JsonFileStore::new(&path).load(POOL).await {
        Err(WatermarkError::UnsupportedVersion { found, expected, .. }) => {
            assert_eq!(found, 99);
            assert_eq!(expected, WATERMARK_VERSION);
        }
        other => panic!("expected version error, got {other:?}"),
    }
}

#[tokio::test]
async fn file_store_reports_corrupt_documents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wm.json");
    std::fs::write(&path, r#"{"version": 1, "last_block": "soon"}"#).unwrap();

    assert!(matches!(
        JsonFileStore::new(&path).load(POOL).await,
        Err(WatermarkError::Corrupt { .. })
    ));
}
