// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for amount normalization, range chunking and
//! watermark bookkeeping

use std::str::FromStr;

use alloy_primitives::{address, Address, Bytes, B256, U256};
use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use proptest::prelude::*;
use swapscan::events::SwapDirection;
use swapscan::monitor::Watermark;
use swapscan::{MaxBlockRange, NormalizedAmount, RawLogEntry, TokenAmount, TokenDecimals};

const POOL: Address = address!("0x88A43bbDF9D098eEC7bCEda4e2494615dfD9bB9C");

fn amount(raw: u128, decimals: u8) -> NormalizedAmount {
    NormalizedAmount::new(TokenAmount::new(U256::from(raw)), TokenDecimals::new(decimals))
}

fn log(block: u64, log_index: u64) -> RawLogEntry {
    let mut hash = [0u8; 32];
    hash[16..24].copy_from_slice(&block.to_be_bytes());
    hash[24..].copy_from_slice(&log_index.to_be_bytes());
    RawLogEntry {
        tx_hash: B256::from(hash),
        block_number: block,
        log_index,
        address: POOL,
        topics: vec![],
        data: Bytes::new(),
    }
}

proptest! {
    /// Property: scaling the normalized value back by 10^decimals gives the raw amount
    #[test]
    fn prop_normalization_is_exact(raw in any::<u128>(), decimals in 0u8..=36) {
        let normalized = amount(raw, decimals);
        let scale = BigDecimal::new(BigInt::from(1), -i64::from(decimals));
        let expected = BigDecimal::from_str(&raw.to_string()).unwrap();

        prop_assert_eq!(normalized.to_big_decimal() * scale, expected);
    }

    /// Property: the rendered decimal parses back to the same value
    #[test]
    fn prop_display_parses_back(raw in any::<u128>(), decimals in 0u8..=36) {
        let normalized = amount(raw, decimals);
        let rendered = normalized.to_string();

        prop_assert!(!rendered.contains('e') && !rendered.contains('E'));
        if let Some((_, fractional)) = rendered.split_once('.') {
            prop_assert!(!fractional.is_empty());
            prop_assert!(!fractional.ends_with('0'));
        }

        let parsed = NormalizedAmount::from_str(&rendered).unwrap();
        prop_assert_eq!(parsed.to_big_decimal(), normalized.to_big_decimal());
    }

    /// Property: chunks cover the range exactly, in order, without overlap
    #[test]
    fn prop_chunks_cover_range(
        start in 0u64..1_000_000_000,
        length in 0u64..100_000,
        size in 1u64..5_000,
    ) {
        let end = start + length;
        let range = MaxBlockRange::new(size);
        let chunks: Vec<(u64, u64)> = range.chunk_range(start, end).collect();

        prop_assert_eq!(chunks.len(), range.chunks_needed(start, end));
        prop_assert_eq!(chunks.first().map(|c| c.0), Some(start));
        prop_assert_eq!(chunks.last().map(|c| c.1), Some(end));
        for (chunk_start, chunk_end) in &chunks {
            prop_assert!(chunk_start <= chunk_end);
            prop_assert!(chunk_end - chunk_start < size);
        }
        for pair in chunks.windows(2) {
            prop_assert_eq!(pair[0].1 + 1, pair[1].0);
        }
    }

    /// Property: a derived direction always agrees with the raw amounts
    #[test]
    fn prop_direction_matches_net_flow(
        in0 in 0u64..1_000, in1 in 0u64..1_000, out0 in 0u64..1_000, out1 in 0u64..1_000,
    ) {
        let raw = |v: u64| TokenAmount::new(U256::from(v));
        let direction = SwapDirection::from_amounts(raw(in0), raw(in1), raw(out0), raw(out1));

        match direction {
            SwapDirection::Token0ToToken1 => prop_assert!(in0 > out0 && out1 > in1),
            SwapDirection::Token1ToToken0 => prop_assert!(in1 > out1 && out0 > in0),
            SwapDirection::Indeterminate => prop_assert!(
                !(in0 > out0 && out1 > in1) && !(in1 > out1 && out0 > in0)
            ),
        }
    }

    /// Property: splitting the boundary block's logs across cycles delivers each once
    #[test]
    fn prop_boundary_logs_delivered_once(
        block in 1u64..1_000_000,
        count in 1u64..20,
        split in 0u64..20,
    ) {
        let split = split.min(count);
        let all: Vec<RawLogEntry> = (0..count).map(|i| log(block, i)).collect();

        let mut watermark = Watermark::starting_at(block);
        let mut delivered = 0usize;

        // First cycle sees only the logs that had landed so far
        let early = &all[..split as usize];
        delivered += early.iter().filter(|l| !watermark.is_duplicate(l)).count();
        watermark.advance(block, early);

        // Second cycle sees the whole block plus one later log
        let mut late = all.clone();
        late.push(log(block + 1, 0));
        delivered += late.iter().filter(|l| !watermark.is_duplicate(l)).count();
        watermark.advance(block + 1, &late);

        prop_assert_eq!(delivered, count as usize + 1);
        prop_assert_eq!(watermark.last_block, block + 1);
        prop_assert!(all.iter().all(|l| watermark.is_duplicate(l)));
        prop_assert!(!watermark.is_duplicate(&log(block + 1, 1)));
    }
}
