// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Watermark state and persistence
//!
//! The watermark is the last block a poll cycle fully processed plus the
//! log keys already delivered from that block. The next cycle starts at the
//! same block and drops those keys, so logs landing in the boundary block
//! after the previous fetch are still picked up exactly once.

use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy_primitives::{Address, BlockNumber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::constants::DEFAULT_WATERMARK_DIR;
use crate::errors::WatermarkError;
use crate::types::config::MaxBlockRange;
use crate::types::log::{LogKey, RawLogEntry};

/// Format version written by [`JsonFileStore`].
pub const WATERMARK_VERSION: u32 = 1;

/// Resume point for the live monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watermark {
    /// Last block fully processed
    pub last_block: BlockNumber,
    /// Keys of logs already delivered from `last_block`
    pub seen: BTreeSet<LogKey>,
}

impl Watermark {
    /// Watermark for a fresh start at `block`. Nothing has been seen, so
    /// `block` itself is processed by the first poll.
    pub fn starting_at(block: BlockNumber) -> Self {
        Self {
            last_block: block,
            seen: BTreeSet::new(),
        }
    }

    /// Inclusive range for the next poll, or `None` if the head is behind.
    ///
    /// The range starts at `last_block` to recheck the boundary block and
    /// covers at most `max_blocks` blocks past it.
    pub fn poll_range(
        &self,
        head: BlockNumber,
        max_blocks: MaxBlockRange,
    ) -> Option<(BlockNumber, BlockNumber)> {
        if head < self.last_block {
            return None;
        }
        let to_block = head.min(self.last_block.saturating_add(max_blocks.as_u64()));
        Some((self.last_block, to_block))
    }

    /// Whether `log` was already delivered.
    pub fn is_duplicate(&self, log: &RawLogEntry) -> bool {
        log.block_number < self.last_block
            || (log.block_number == self.last_block && self.seen.contains(&log.key()))
    }

    /// Move the watermark to `to_block` after a cycle that fetched `logs`.
    ///
    /// The seen-set is rebuilt from the logs in `to_block` only; keys from
    /// older blocks are no longer needed.
    pub fn advance(&mut self, to_block: BlockNumber, logs: &[RawLogEntry]) {
        if to_block > self.last_block {
            self.seen.clear();
            self.last_block = to_block;
        }
        let last_block = self.last_block;
        self.seen.extend(
            logs.iter()
                .filter(|log| log.block_number == last_block)
                .map(RawLogEntry::key),
        );
    }
}

/// Persistence for [`Watermark`]s.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Load the watermark for `contract`, if one was saved.
    async fn load(&self, contract: Address) -> Result<Option<Watermark>, WatermarkError>;

    /// Persist `watermark` for `contract`.
    async fn save(&self, contract: Address, watermark: &Watermark) -> Result<(), WatermarkError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct WatermarkDocument {
    version: u32,
    contract: Address,
    last_block: BlockNumber,
    seen_log_keys: Vec<LogKey>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct VersionHeader {
    version: u32,
}

/// Watermark stored as a JSON document on disk.
///
/// Saves write a temporary sibling file and rename it over the target, so a
/// crash mid-write leaves the previous watermark intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `.swapscan/watermark-<address>.json`.
    pub fn default_path(contract: Address) -> PathBuf {
        let address = contract.to_string().to_lowercase();
        Path::new(DEFAULT_WATERMARK_DIR).join(format!("watermark-{address}.json"))
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> WatermarkError {
        WatermarkError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl WatermarkStore for JsonFileStore {
    async fn load(&self, contract: Address) -> Result<Option<Watermark>, WatermarkError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let corrupt = |source| WatermarkError::Corrupt {
            path: self.path.clone(),
            source,
        };

        let header: VersionHeader = serde_json::from_str(&contents).map_err(corrupt)?;
        if header.version != WATERMARK_VERSION {
            return Err(WatermarkError::UnsupportedVersion {
                path: self.path.clone(),
                found: header.version,
                expected: WATERMARK_VERSION,
            });
        }

        let document: WatermarkDocument = serde_json::from_str(&contents).map_err(corrupt)?;
        if document.contract != contract {
            return Err(WatermarkError::ContractMismatch {
                path: self.path.clone(),
                expected: contract,
                found: document.contract,
            });
        }

        Ok(Some(Watermark {
            last_block: document.last_block,
            seen: document.seen_log_keys.into_iter().collect(),
        }))
    }

    async fn save(&self, contract: Address, watermark: &Watermark) -> Result<(), WatermarkError> {
        let document = WatermarkDocument {
            version: WATERMARK_VERSION,
            contract,
            last_block: watermark.last_block,
            seen_log_keys: watermark.seen.iter().copied().collect(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&document).map_err(|source| WatermarkError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }
}

/// In-memory store. Clones share state, which lets tests simulate a restart
/// by handing the same store to a second monitor.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    watermarks: Arc<Mutex<HashMap<Address, Watermark>>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatermarkStore for MemoryStore {
    async fn load(&self, contract: Address) -> Result<Option<Watermark>, WatermarkError> {
        Ok(self.watermarks.lock().await.get(&contract).cloned())
    }

    async fn save(&self, contract: Address, watermark: &Watermark) -> Result<(), WatermarkError> {
        self.watermarks
            .lock()
            .await
            .insert(contract, watermark.clone());
        Ok(())
    }
}
