// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Live monitoring
//!
//! [`LiveMonitor`] is an explicit state machine:
//!
//! ```text
//! Init -> Polling <-> IdleWait -> Stopped
//!   ^                     |
//!   +---------------------+  (head unavailable at start-up)
//! ```
//!
//! - `Init` loads the persisted [`Watermark`] or starts at the chain head.
//!   If the head cannot be read it waits a poll interval and tries again.
//! - `Polling` fetches `[last_block, head]` (bounded by `max_blocks_per_poll`),
//!   drops logs already delivered from the boundary block, emits reports in
//!   chain order, then advances and persists the watermark.
//! - `IdleWait` sleeps for the poll interval; it is the only place shutdown
//!   is observed, so a cycle that started always finishes.
//!
//! A failed poll, including a report that could not be written, is logged
//! and leaves the watermark untouched; the next cycle retries the same
//! range.

pub mod watermark;

use alloy_primitives::{Address, BlockNumber};
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};

use crate::config::WatchConfig;
use crate::errors::{MonitorError, ScanError};
use crate::events::EventFormatter;
use crate::metadata::ContractReader;
use crate::scanner::BlockRangeScanner;
use crate::sink::ReportSink;
use crate::source::LogSource;
use crate::spans;
use crate::types::config::MaxBlockRange;

pub use watermark::{JsonFileStore, MemoryStore, Watermark, WatermarkStore, WATERMARK_VERSION};

/// Lifecycle state of a [`LiveMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Watermark not loaded yet
    Init,
    /// Running a poll cycle
    Polling,
    /// Sleeping between cycles
    IdleWait,
    /// Shut down
    Stopped,
}

/// Summary of one completed poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// First block fetched
    pub from_block: BlockNumber,
    /// Last block fetched, now the watermark
    pub to_block: BlockNumber,
    /// Reports emitted
    pub emitted: usize,
    /// Logs dropped as already delivered
    pub duplicates: usize,
    /// Logs with an untracked signature
    pub ignored: usize,
    /// Logs that failed to decode
    pub malformed: usize,
}

/// Polls a contract for new events and reports each exactly once per
/// watermark, across restarts.
#[derive(Debug)]
pub struct LiveMonitor<S, R, W> {
    contract: Address,
    scanner: BlockRangeScanner<S, R>,
    store: W,
    formatter: EventFormatter,
    poll_interval: std::time::Duration,
    max_blocks_per_poll: MaxBlockRange,
    watermark: Option<Watermark>,
    state: MonitorState,
}

impl<S, R, W> LiveMonitor<S, R, W>
where
    S: LogSource,
    R: ContractReader,
    W: WatermarkStore,
{
    /// Create a monitor for `contract`. Nothing is loaded until the first
    /// [`run`](Self::run) or [`poll_once`](Self::poll_once).
    pub fn new(
        contract: Address,
        scanner: BlockRangeScanner<S, R>,
        store: W,
        config: &WatchConfig,
    ) -> Self {
        Self {
            contract,
            scanner,
            store,
            formatter: EventFormatter::new(),
            poll_interval: config.poll_interval,
            max_blocks_per_poll: config.max_blocks_per_poll,
            watermark: None,
            state: MonitorState::Init,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Watermark in effect, once initialised.
    pub fn watermark(&self) -> Option<&Watermark> {
        self.watermark.as_ref()
    }

    /// Load the persisted watermark, or start at the current head.
    pub async fn init(&mut self) -> Result<&Watermark, MonitorError> {
        let watermark = match self.store.load(self.contract).await? {
            Some(watermark) => {
                info!(
                    contract = %self.contract,
                    last_block = watermark.last_block,
                    seen = watermark.seen.len(),
                    "Resuming from persisted watermark"
                );
                watermark
            }
            None => {
                let head = self
                    .scanner
                    .latest_block()
                    .await
                    .map_err(MonitorError::Head)?;
                info!(contract = %self.contract, head, "No watermark found, starting at chain head");
                Watermark::starting_at(head)
            }
        };
        Ok(self.watermark.insert(watermark))
    }

    /// Run one poll cycle, emitting reports to `sink`.
    ///
    /// Returns `Ok(None)` when the head is behind the watermark. On error the
    /// watermark is not advanced.
    pub async fn poll_once(
        &mut self,
        sink: &mut dyn ReportSink,
    ) -> Result<Option<PollOutcome>, MonitorError> {
        let mut watermark = match self.watermark.take() {
            Some(watermark) => watermark,
            None => self.init().await?.clone(),
        };

        let result = self.poll_from(&mut watermark, sink).await;
        self.watermark = Some(watermark);

        match result {
            Ok(outcome) => Ok(outcome),
            Err(error) => Err(MonitorError::Poll(error)),
        }
    }

    async fn poll_from(
        &self,
        watermark: &mut Watermark,
        sink: &mut dyn ReportSink,
    ) -> Result<Option<PollOutcome>, ScanError> {
        let head = self.scanner.latest_block().await.map_err(ScanError::Head)?;
        let Some((from_block, to_block)) = watermark.poll_range(head, self.max_blocks_per_poll)
        else {
            debug!(head, last_block = watermark.last_block, "Chain head behind watermark");
            return Ok(None);
        };

        let logs = self
            .scanner
            .collect_logs(self.contract, from_block, to_block)
            .await?;

        let (fresh, duplicates): (Vec<_>, Vec<_>) = logs
            .iter()
            .cloned()
            .partition(|log| !watermark.is_duplicate(log));

        let batch = self.scanner.pipeline().process(fresh).await;
        for event in &batch.events {
            sink.emit(&self.formatter.format(event)).map_err(ScanError::Report)?;
        }

        watermark.advance(to_block, &logs);
        if let Err(error) = self.store.save(self.contract, watermark).await {
            warn!(
                contract = %self.contract,
                last_block = watermark.last_block,
                error = %error,
                "Failed to persist watermark, continuing with in-memory state"
            );
        }

        Ok(Some(PollOutcome {
            from_block,
            to_block,
            emitted: batch.events.len(),
            duplicates: duplicates.len(),
            ignored: batch.ignored,
            malformed: batch.malformed,
        }))
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Only watermark load failures are fatal. A chain head that cannot be
    /// read during `Init` and failed poll cycles are logged, and the monitor
    /// tries again after the poll interval.
    pub async fn run(
        &mut self,
        sink: &mut dyn ReportSink,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), MonitorError> {
        self.state = MonitorState::Init;

        loop {
            self.state = match self.state {
                MonitorState::Init => match self.init().await {
                    Ok(_) => MonitorState::Polling,
                    Err(MonitorError::Head(error)) => {
                        warn!(
                            contract = %self.contract,
                            error = %error,
                            "Chain head unavailable, retrying start-up after the poll interval"
                        );
                        MonitorState::IdleWait
                    }
                    Err(error) => {
                        self.state = MonitorState::Stopped;
                        return Err(error);
                    }
                },
                MonitorState::Polling => {
                    let last_block = self.watermark.as_ref().map_or(0, |w| w.last_block);
                    let span = spans::poll_cycle(self.contract, last_block);
                    match self.poll_once(sink).instrument(span).await {
                        Ok(Some(outcome)) => info!(
                            from_block = outcome.from_block,
                            to_block = outcome.to_block,
                            emitted = outcome.emitted,
                            duplicates = outcome.duplicates,
                            ignored = outcome.ignored,
                            malformed = outcome.malformed,
                            "Poll cycle complete"
                        ),
                        Ok(None) => {}
                        Err(error) => warn!(
                            contract = %self.contract,
                            last_block,
                            error = %error,
                            "Poll cycle failed, watermark not advanced"
                        ),
                    }
                    MonitorState::IdleWait
                }
                MonitorState::IdleWait => {
                    if *shutdown.borrow_and_update() {
                        MonitorState::Stopped
                    } else {
                        tokio::select! {
                            _ = tokio::time::sleep(self.poll_interval) => {
                                if self.watermark.is_some() {
                                    MonitorState::Polling
                                } else {
                                    MonitorState::Init
                                }
                            }
                            changed = shutdown.changed() => {
                                if changed.is_err() || *shutdown.borrow() {
                                    MonitorState::Stopped
                                } else {
                                    MonitorState::IdleWait
                                }
                            }
                        }
                    }
                }
                MonitorState::Stopped => {
                    info!(contract = %self.contract, "Monitor stopped");
                    return Ok(());
                }
            };
        }
    }
}
