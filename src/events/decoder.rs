// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw log decoding
//!
//! [`EventDecoder`] looks up the event signature in topic 0 in a fixed
//! signature-to-decoder table. Unknown signatures are skipped. A known
//! signature whose topics or data do not match the layout is a
//! [`DecodeError`] for that log only.

use alloy_primitives::{Address, BlockNumber, TxHash, B256};
use alloy_sol_types::SolEvent;

use super::definitions::{Swap, Transfer};
use crate::errors::DecodeError;
use crate::types::log::{LogKey, RawLogEntry};
use crate::types::tokens::TokenAmount;

/// Where an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLocation {
    /// Transaction that emitted the log
    pub tx_hash: TxHash,
    /// Block containing the transaction
    pub block_number: BlockNumber,
    /// Position of the log within its block
    pub log_index: u64,
    /// Contract that emitted the log
    pub contract: Address,
}

impl EventLocation {
    /// Identity of the underlying log
    pub fn key(&self) -> LogKey {
        LogKey {
            tx_hash: self.tx_hash,
            log_index: self.log_index,
        }
    }
}

impl From<&RawLogEntry> for EventLocation {
    fn from(log: &RawLogEntry) -> Self {
        Self {
            tx_hash: log.tx_hash,
            block_number: log.block_number,
            log_index: log.log_index,
            contract: log.address,
        }
    }
}

/// Token movement with its raw amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferEvent {
    /// Sender, zero for mints
    pub from: Address,
    /// Recipient, zero for burns
    pub to: Address,
    /// Raw amount in the token's smallest unit
    pub value: TokenAmount,
}

/// Which token a swap sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapDirection {
    /// token0 went in, token1 came out
    Token0ToToken1,
    /// token1 went in, token0 came out
    Token1ToToken0,
    /// Neither side was clearly spent for the other
    Indeterminate,
}

impl SwapDirection {
    /// Derive the direction from the four raw amounts.
    ///
    /// The net delta per token is `out - in`; the token with a negative
    /// delta was sold and the one with a positive delta was bought.
    pub fn from_amounts(
        amount0_in: TokenAmount,
        amount1_in: TokenAmount,
        amount0_out: TokenAmount,
        amount1_out: TokenAmount,
    ) -> Self {
        let token0_spent = amount0_in > amount0_out;
        let token1_spent = amount1_in > amount1_out;
        let token0_received = amount0_out > amount0_in;
        let token1_received = amount1_out > amount1_in;

        match (token0_spent && token1_received, token1_spent && token0_received) {
            (true, false) => Self::Token0ToToken1,
            (false, true) => Self::Token1ToToken0,
            _ => Self::Indeterminate,
        }
    }

    /// `SELL` when token0 is sold, `BUY` when token0 is bought
    pub fn label(&self) -> &'static str {
        match self {
            Self::Token0ToToken1 => "SELL",
            Self::Token1ToToken0 => "BUY",
            Self::Indeterminate => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token0ToToken1 => write!(f, "token0 to token1"),
            Self::Token1ToToken0 => write!(f, "token1 to token0"),
            Self::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// AMM swap with its raw amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapEvent {
    /// Caller of `swap`
    pub sender: Address,
    /// Recipient of the output tokens, possibly equal to `sender`
    pub recipient: Address,
    /// token0 paid into the pool
    pub amount0_in: TokenAmount,
    /// token1 paid into the pool
    pub amount1_in: TokenAmount,
    /// token0 paid out of the pool
    pub amount0_out: TokenAmount,
    /// token1 paid out of the pool
    pub amount1_out: TokenAmount,
    /// Derived from the amounts
    pub direction: SwapDirection,
}

/// A decoded event of one of the tracked kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedEvent {
    /// ERC-20 Transfer
    Transfer(TransferEvent),
    /// Uniswap V2-style Swap
    Swap(SwapEvent),
}

impl DecodedEvent {
    /// Event kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transfer(_) => "Transfer",
            Self::Swap(_) => "Swap",
        }
    }
}

/// A decoded event together with where it was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedLog {
    /// Emission site
    pub location: EventLocation,
    /// Event payload
    pub event: DecodedEvent,
}

type DecodeFn = fn(&RawLogEntry) -> Result<DecodedEvent, DecodeError>;

/// Signature-to-decoder lookup table.
static DECODERS: [(B256, DecodeFn); 2] = [
    (Transfer::SIGNATURE_HASH, decode_transfer),
    (Swap::SIGNATURE_HASH, decode_swap),
];

/// Decodes raw logs into [`DecodedLog`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDecoder;

impl EventDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        Self
    }

    /// Signatures this decoder understands
    pub fn tracked_signatures(&self) -> impl Iterator<Item = B256> {
        DECODERS.iter().map(|(signature, _)| *signature)
    }

    /// Decode one log.
    ///
    /// Returns `Ok(None)` for logs without topics or with an untracked signature.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when a tracked signature has the wrong number
    /// of topics, the wrong data length, or data the ABI decoder rejects.
    pub fn decode(&self, log: &RawLogEntry) -> Result<Option<DecodedLog>, DecodeError> {
        let Some(signature) = log.signature() else {
            return Ok(None);
        };
        let Some((_, decode)) = DECODERS.iter().find(|(known, _)| *known == signature) else {
            return Ok(None);
        };

        let event = decode(log)?;
        Ok(Some(DecodedLog {
            location: EventLocation::from(log),
            event,
        }))
    }
}

fn check_layout(
    log: &RawLogEntry,
    event: &'static str,
    topics: usize,
    data_len: usize,
) -> Result<(), DecodeError> {
    if log.topics.len() != topics {
        return Err(DecodeError::TopicCount {
            event,
            tx_hash: log.tx_hash,
            log_index: log.log_index,
            expected: topics,
            actual: log.topics.len(),
        });
    }
    if log.data.len() != data_len {
        return Err(DecodeError::DataLength {
            event,
            tx_hash: log.tx_hash,
            log_index: log.log_index,
            expected: data_len,
            actual: log.data.len(),
        });
    }
    Ok(())
}

fn abi_error(log: &RawLogEntry, event: &'static str, err: alloy_sol_types::Error) -> DecodeError {
    DecodeError::Abi {
        event,
        tx_hash: log.tx_hash,
        log_index: log.log_index,
        details: err.to_string(),
    }
}

fn decode_transfer(log: &RawLogEntry) -> Result<DecodedEvent, DecodeError> {
    check_layout(log, "Transfer", 3, 32)?;
    let transfer = Transfer::decode_raw_log(log.topics.iter().copied(), &log.data)
        .map_err(|e| abi_error(log, "Transfer", e))?;

    Ok(DecodedEvent::Transfer(TransferEvent {
        from: transfer.from,
        to: transfer.to,
        value: TokenAmount::new(transfer.value),
    }))
}

fn decode_swap(log: &RawLogEntry) -> Result<DecodedEvent, DecodeError> {
    check_layout(log, "Swap", 3, 4 * 32)?;
    let swap = Swap::decode_raw_log(log.topics.iter().copied(), &log.data)
        .map_err(|e| abi_error(log, "Swap", e))?;

    let amount0_in = TokenAmount::new(swap.amount0In);
    let amount1_in = TokenAmount::new(swap.amount1In);
    let amount0_out = TokenAmount::new(swap.amount0Out);
    let amount1_out = TokenAmount::new(swap.amount1Out);

    Ok(DecodedEvent::Swap(SwapEvent {
        sender: swap.sender,
        recipient: swap.to,
        amount0_in,
        amount1_in,
        amount0_out,
        amount1_out,
        direction: SwapDirection::from_amounts(amount0_in, amount1_in, amount0_out, amount1_out),
    }))
}
