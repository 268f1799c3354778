// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Wiring for the `swapscan` binary.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, BlockNumber};
use futures::TryStreamExt;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::{Cli, Command};
use crate::config::{Backend, Settings, WatchConfig, WatchConfigBuilder};
use crate::errors::{ConfigError, ScanError, WatchError};
use crate::events::{AmountNormalizer, EventDecoder, EventFormatter, EventPipeline};
use crate::metadata::{ContractReader, TokenMetadataResolver};
use crate::monitor::{JsonFileStore, LiveMonitor};
use crate::provider::create_http_provider;
use crate::scanner::BlockRangeScanner;
use crate::sink::{FileSink, ReportSink, StdoutSink, TeeSink};
use crate::source::{ExplorerClient, LogSource, RpcClient};

/// Main entry point for the application.
///
/// Validates flags and environment, builds the selected backend and runs
/// the requested subcommand to completion.
pub async fn run(cli: Cli) -> Result<(), WatchError> {
    let settings = Settings::resolve(cli.command.contract_address(), &cli.endpoints)?;

    let mut builder = WatchConfigBuilder::with_defaults();
    if let Command::Monitor { poll_interval, .. } = &cli.command {
        builder = builder.poll_interval(Duration::from_secs(*poll_interval));
    }
    let config = builder.build()?;

    let mut sink = report_sink(cli.report_file.as_deref())?;

    match settings.backend {
        Backend::Explorer(endpoint) => {
            info!(api_url = %endpoint.api_url, chain_id = ?endpoint.chain_id, "Using explorer backend");
            let client = ExplorerClient::new(endpoint, &config)?;
            execute(Arc::new(client), settings.contract, cli.command, config, &mut sink).await
        }
        Backend::Rpc(url) => {
            info!(rpc_url = %url, "Using RPC backend");
            let provider = create_http_provider(url, &config)?;
            let client = RpcClient::new(provider);
            execute(Arc::new(client), settings.contract, cli.command, config, &mut sink).await
        }
    }
}

fn report_sink(report_file: Option<&Path>) -> Result<Box<dyn ReportSink>, ConfigError> {
    match report_file {
        Some(path) => {
            let file = FileSink::append(path)
                .map_err(|e| ConfigError::invalid_value("report_file", e.to_string()))?;
            Ok(Box::new(TeeSink::new(StdoutSink, file)))
        }
        None => Ok(Box::new(StdoutSink)),
    }
}

async fn execute<B>(
    backend: Arc<B>,
    contract: Address,
    command: Command,
    config: WatchConfig,
    sink: &mut dyn ReportSink,
) -> Result<(), WatchError>
where
    B: LogSource + ContractReader + 'static,
{
    let resolver = Arc::new(TokenMetadataResolver::new(backend.clone()));
    let pipeline = EventPipeline::new(EventDecoder::new(), AmountNormalizer::new(resolver));
    let scanner = BlockRangeScanner::new(backend, pipeline, config.clone());

    match command {
        Command::Scan {
            from_block,
            to_block,
            ..
        } => scan(&scanner, contract, from_block, to_block, sink).await,
        Command::Monitor { watermark_file, .. } => {
            let path = watermark_file.unwrap_or_else(|| JsonFileStore::default_path(contract));
            info!(%contract, watermark = %path.display(), "Starting monitor");

            let store = JsonFileStore::new(path);
            let mut monitor = LiveMonitor::new(contract, scanner, store, &config);
            monitor.run(sink, shutdown_signal()).await?;
            Ok(())
        }
    }
}

async fn scan<S, R>(
    scanner: &BlockRangeScanner<S, R>,
    contract: Address,
    from_block: Option<BlockNumber>,
    to_block: Option<BlockNumber>,
    sink: &mut dyn ReportSink,
) -> Result<(), WatchError>
where
    S: LogSource,
    R: ContractReader,
{
    let (from_block, to_block) = scanner.resolve_range(from_block, to_block).await?;
    info!(%contract, from_block, to_block, "Scanning contract");

    let formatter = EventFormatter::new();
    let events = scanner.scan(contract, from_block, to_block)?;
    tokio::pin!(events);

    let mut found = 0usize;
    while let Some(event) = events.try_next().await? {
        sink.emit(&formatter.format(&event)).map_err(ScanError::Report)?;
        found += 1;
    }

    if found == 0 {
        println!("No events found");
    } else {
        println!("Found {found} events");
    }
    Ok(())
}

/// Receiver that flips to `true` on Ctrl-C.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested, stopping after the current cycle");
                let _ = tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "Could not listen for Ctrl-C");
                // Holding the sender keeps the monitor running.
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}
