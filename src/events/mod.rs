// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Event processing for ERC-20 transfers and AMM swaps.
//!
//! This module handles:
//! - Transfer and Swap event definitions
//! - Decoding raw logs through a signature lookup table
//! - Decimal normalization and swap direction/delta derivation
//! - Stable text reports

pub mod decoder;
pub mod definitions;
pub mod formatter;
pub mod normalizer;
pub mod pipeline;

pub use decoder::{
    DecodedEvent, DecodedLog, EventDecoder, EventLocation, SwapDirection, SwapEvent, TransferEvent,
};
pub use definitions::{Swap, Transfer};
pub use formatter::{EventFormatter, Report, SEPARATOR};
pub use normalizer::{
    AmountNormalizer, NormalizedEvent, NormalizedSwap, NormalizedTransfer, TransferKind,
};
pub use pipeline::{BatchOutcome, EventPipeline};
