// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Decode-then-normalize over a batch of raw logs.

use tracing::{debug, warn};

use super::decoder::EventDecoder;
use super::normalizer::{AmountNormalizer, NormalizedEvent};
use crate::metadata::ContractReader;
use crate::types::log::RawLogEntry;

/// Result of processing one batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Reportable events in `(block, log index)` order
    pub events: Vec<NormalizedEvent>,
    /// Logs with an untracked signature
    pub ignored: usize,
    /// Logs that failed to decode
    pub malformed: usize,
}

/// Shared decoding and normalization stage for scans and polls.
#[derive(Debug)]
pub struct EventPipeline<R> {
    decoder: EventDecoder,
    normalizer: AmountNormalizer<R>,
}

impl<R> Clone for EventPipeline<R> {
    fn clone(&self) -> Self {
        Self {
            decoder: self.decoder,
            normalizer: self.normalizer.clone(),
        }
    }
}

impl<R: ContractReader> EventPipeline<R> {
    /// Create a pipeline
    pub fn new(decoder: EventDecoder, normalizer: AmountNormalizer<R>) -> Self {
        Self {
            decoder,
            normalizer,
        }
    }

    /// Decode and normalize `logs`, in chain order.
    ///
    /// Malformed logs are logged and skipped; they never fail the batch.
    pub async fn process(&self, mut logs: Vec<RawLogEntry>) -> BatchOutcome {
        logs.sort_by_key(RawLogEntry::position);

        let mut outcome = BatchOutcome::default();
        for log in &logs {
            match self.decoder.decode(log) {
                Ok(Some(decoded)) => {
                    let event = self.normalizer.normalize_event(decoded).await;
                    outcome.events.push(event);
                }
                Ok(None) => {
                    debug!(
                        tx_hash = %log.tx_hash,
                        log_index = log.log_index,
                        "Skipping log with untracked signature"
                    );
                    outcome.ignored += 1;
                }
                Err(e) => {
                    warn!(
                        block = log.block_number,
                        tx_hash = %log.tx_hash,
                        log_index = log.log_index,
                        error = %e,
                        "Skipping malformed log"
                    );
                    outcome.malformed += 1;
                }
            }
        }
        outcome
    }
}
