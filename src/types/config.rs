// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for configuration values
//!
//! These types keep fetch sizing knobs from being confused with block
//! numbers or log counts.

use serde::{Deserialize, Serialize};

/// Maximum number of blocks covered by one log query.
///
/// Scans and poll cycles are split into chunks of at most this many blocks
/// so a single request never asks an explorer or RPC node for an unbounded
/// range.
///
/// # Examples
///
/// ```
/// use swapscan::MaxBlockRange;
///
/// let range = MaxBlockRange::new(1000);
/// let chunks: Vec<_> = range.chunk_range(0, 2500).collect();
///
/// assert_eq!(chunks, vec![(0, 999), (1000, 1999), (2000, 2500)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxBlockRange(u64);

impl MaxBlockRange {
    /// Default chunk size for log queries
    pub const DEFAULT: Self = Self(500);

    /// Default catch-up step for a single monitor poll
    pub const POLL_DEFAULT: Self = Self(2000);

    /// Create a new max block range
    pub const fn new(blocks: u64) -> Self {
        Self(blocks)
    }

    /// Get the inner u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Calculate number of chunks needed to cover an inclusive range
    pub fn chunks_needed(&self, start: u64, end: u64) -> usize {
        if end < start {
            return 0;
        }
        ((end - start) / self.0.max(1) + 1) as usize
    }

    /// Split an inclusive block range into chunks
    ///
    /// Returns an iterator of `(start_block, end_block)` tuples, each at
    /// most `self.0` blocks wide. A zero range is treated as one block.
    pub fn chunk_range(&self, start: u64, end: u64) -> ChunkIterator {
        ChunkIterator {
            current: start,
            end,
            chunk_size: self.0.max(1),
            done: end < start,
        }
    }
}

impl Default for MaxBlockRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u64> for MaxBlockRange {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for MaxBlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} blocks", self.0)
    }
}

/// Iterator over block range chunks
///
/// Created by [`MaxBlockRange::chunk_range`].
#[derive(Debug, Clone)]
pub struct ChunkIterator {
    current: u64,
    end: u64,
    chunk_size: u64,
    done: bool,
}

impl Iterator for ChunkIterator {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let chunk_start = self.current;
        let chunk_end = chunk_start
            .saturating_add(self.chunk_size - 1)
            .min(self.end);

        // chunk_end == u64::MAX cannot be advanced past
        match chunk_end.checked_add(1) {
            Some(next) if chunk_end < self.end => self.current = next,
            _ => self.done = true,
        }

        Some((chunk_start, chunk_end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            let remaining_blocks = self.end - self.current;
            let chunks = (remaining_blocks / self.chunk_size + 1) as usize;
            (chunks, Some(chunks))
        }
    }
}

impl ExactSizeIterator for ChunkIterator {}

/// Number of log entries requested per explorer page.
///
/// Etherscan-compatible explorers accept at most 1000 entries per page and
/// refuse to page beyond [`PageSize::RESULT_WINDOW`] entries for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    /// Largest page the explorer serves
    pub const MAX: Self = Self(1000);

    /// Maximum `page * offset` the explorer pages through for a single query
    pub const RESULT_WINDOW: u64 = 10_000;

    /// Create a page size, clamped to `1..=1000`
    pub fn new(entries: u32) -> Self {
        Self(entries.clamp(1, Self::MAX.0))
    }

    /// Get the inner u32 value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Highest page number reachable inside the result window
    pub fn max_pages(&self) -> u32 {
        (Self::RESULT_WINDOW / u64::from(self.0)).max(1) as u32
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::MAX
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} entries", self.0)
    }
}
