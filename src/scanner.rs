// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Historical block range scans
//!
//! [`BlockRangeScanner`] walks an inclusive block range in chunks of at most
//! `max_block_range` blocks, fetches each chunk through a [`LogSource`] with
//! retry, and yields normalized events lazily in `(block, log index)` order.
//! An invalid range is rejected before any request is made.

use std::collections::VecDeque;

use alloy_primitives::{Address, BlockNumber};
use futures::stream::{self, Stream};
use tracing::{info, Instrument, Span};

use crate::config::constants::DEFAULT_SCAN_LOOKBACK;
use crate::config::WatchConfig;
use crate::errors::{FetchError, RangeError, ScanError};
use crate::events::{BatchOutcome, EventPipeline, NormalizedEvent};
use crate::metadata::ContractReader;
use crate::source::LogSource;
use crate::spans;
use crate::transport::retry_fetch;
use crate::types::config::ChunkIterator;
use crate::types::log::RawLogEntry;

/// Reject ranges whose start lies after their end.
pub fn validate_range(from_block: BlockNumber, to_block: BlockNumber) -> Result<(), RangeError> {
    if from_block > to_block {
        return Err(RangeError {
            from_block,
            to_block,
        });
    }
    Ok(())
}

/// Chunked, retrying log scanner.
#[derive(Debug)]
pub struct BlockRangeScanner<S, R> {
    source: S,
    pipeline: EventPipeline<R>,
    config: WatchConfig,
}

struct ScanState {
    chunks: ChunkIterator,
    buffered: VecDeque<NormalizedEvent>,
    emitted: usize,
    ignored: usize,
    malformed: usize,
}

impl<S, R> BlockRangeScanner<S, R>
where
    S: LogSource,
    R: ContractReader,
{
    /// Create a scanner over `source`.
    pub fn new(source: S, pipeline: EventPipeline<R>, config: WatchConfig) -> Self {
        Self {
            source,
            pipeline,
            config,
        }
    }

    /// The underlying log source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The decode and normalize stage.
    pub fn pipeline(&self) -> &EventPipeline<R> {
        &self.pipeline
    }

    /// Current chain head, retried on transient failures.
    pub async fn latest_block(&self) -> Result<BlockNumber, FetchError> {
        retry_fetch(&self.config.retry, "latest_block", || {
            self.source.latest_block()
        })
        .await
    }

    /// Fill in missing range bounds.
    ///
    /// `to_block` defaults to the chain head and `from_block` to
    /// `to_block - 1000`, saturating at genesis.
    pub async fn resolve_range(
        &self,
        from_block: Option<BlockNumber>,
        to_block: Option<BlockNumber>,
    ) -> Result<(BlockNumber, BlockNumber), ScanError> {
        let to_block = match to_block {
            Some(block) => block,
            None => self.latest_block().await.map_err(ScanError::Head)?,
        };
        let from_block = from_block.unwrap_or(to_block.saturating_sub(DEFAULT_SCAN_LOOKBACK));
        validate_range(from_block, to_block)?;
        Ok((from_block, to_block))
    }

    /// Stream every tracked event `contract` emitted in `from_block..=to_block`.
    ///
    /// Chunks are fetched on demand as the stream is polled. A chunk that
    /// still fails once the retry budget is spent yields
    /// [`ScanError::Fetch`] and ends the stream; events from earlier chunks
    /// have already been yielded by then.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] without contacting the source when
    /// `from_block > to_block`.
    pub fn scan(
        &self,
        contract: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<impl Stream<Item = Result<NormalizedEvent, ScanError>> + '_, RangeError> {
        validate_range(from_block, to_block)?;

        let span = spans::scan_range(contract, from_block, to_block);
        let chunks = self.config.max_block_range.chunk_range(from_block, to_block);
        span.in_scope(|| {
            info!(
                chunks = chunks.len(),
                max_block_range = %self.config.max_block_range,
                "Starting block range scan"
            )
        });

        let state = ScanState {
            chunks,
            buffered: VecDeque::new(),
            emitted: 0,
            ignored: 0,
            malformed: 0,
        };

        Ok(stream::try_unfold(state, move |mut state| {
            let span = span.clone();
            async move {
                loop {
                    if let Some(event) = state.buffered.pop_front() {
                        state.emitted += 1;
                        return Ok::<_, ScanError>(Some((event, state)));
                    }

                    let Some((start, end)) = state.chunks.next() else {
                        span.in_scope(|| {
                            info!(
                                events = state.emitted,
                                ignored = state.ignored,
                                malformed = state.malformed,
                                "Block range scan complete"
                            )
                        });
                        return Ok(None);
                    };

                    let outcome = self.fetch_chunk(contract, start, end, &span).await?;
                    state.ignored += outcome.ignored;
                    state.malformed += outcome.malformed;
                    state.buffered.extend(outcome.events);
                }
            }
        }))
    }

    /// Fetch every raw log in `from_block..=to_block`, chunk by chunk.
    ///
    /// Used by the live monitor, which filters duplicates before decoding.
    pub async fn collect_logs(
        &self,
        contract: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<RawLogEntry>, ScanError> {
        validate_range(from_block, to_block)?;

        let mut logs = Vec::new();
        for (start, end) in self.config.max_block_range.chunk_range(from_block, to_block) {
            let chunk = self
                .fetch_logs(contract, start, end)
                .instrument(spans::fetch_chunk(start, end))
                .await?;
            logs.extend(chunk);
        }
        Ok(logs)
    }

    async fn fetch_chunk(
        &self,
        contract: Address,
        start: BlockNumber,
        end: BlockNumber,
        parent: &Span,
    ) -> Result<BatchOutcome, ScanError> {
        let span = parent.in_scope(|| spans::fetch_chunk(start, end));
        async {
            let logs = self.fetch_logs(contract, start, end).await?;
            Ok::<_, ScanError>(self.pipeline.process(logs).await)
        }
        .instrument(span)
        .await
    }

    async fn fetch_logs(
        &self,
        contract: Address,
        start: BlockNumber,
        end: BlockNumber,
    ) -> Result<Vec<RawLogEntry>, ScanError> {
        retry_fetch(&self.config.retry, "fetch_logs", || {
            self.source.fetch_logs(contract, start, end)
        })
        .await
        .map_err(|source| ScanError::Fetch {
            from_block: start,
            to_block: end,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_validation() {
        assert!(validate_range(5, 5).is_ok());
        assert!(validate_range(0, 10).is_ok());
        assert_eq!(
            validate_range(11, 10),
            Err(RangeError {
                from_block: 11,
                to_block: 10
            })
        );
    }
}
