// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Text reports for normalized events
//!
//! The layout (labels, field order, separators) is stable so downstream log
//! scrapers can rely on it. Addresses are rendered checksummed and amounts
//! as exact decimals.

use std::fmt;

use alloy_primitives::Address;

use super::decoder::{EventLocation, SwapDirection};
use super::normalizer::{NormalizedEvent, NormalizedSwap, NormalizedTransfer};

/// Line framing every report block
pub const SEPARATOR: &str = "--------------------------------------";

/// Renders [`NormalizedEvent`]s as text blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFormatter;

impl EventFormatter {
    /// Create a formatter
    pub fn new() -> Self {
        Self
    }

    /// Render one event. Pure: equal inputs give equal output.
    pub fn format(&self, event: &NormalizedEvent) -> String {
        self.report(event).to_string()
    }

    /// Borrow `event` as a [`fmt::Display`] report, for writing straight
    /// into another formatter or buffer.
    pub fn report<'a>(&self, event: &'a NormalizedEvent) -> Report<'a> {
        Report(event)
    }
}

/// One event rendered through [`fmt::Display`]
#[derive(Debug, Clone, Copy)]
pub struct Report<'a>(&'a NormalizedEvent);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            NormalizedEvent::Transfer(transfer) => write_transfer(f, transfer),
            NormalizedEvent::Swap(swap) => write_swap(f, swap),
        }
    }
}

fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}

fn header(f: &mut fmt::Formatter<'_>, title: &str, location: &EventLocation) -> fmt::Result {
    writeln!(f, "{title} Event Details:")?;
    writeln!(f, "{SEPARATOR}")?;
    writeln!(f, "Transaction Hash: {}", location.tx_hash)?;
    writeln!(f, "Block: {}", location.block_number)?;
    writeln!(f, "Log Index: {}", location.log_index)?;
    writeln!(f, "Contract: {}", checksum(&location.contract))
}

fn write_transfer(f: &mut fmt::Formatter<'_>, transfer: &NormalizedTransfer) -> fmt::Result {
    header(f, "Transfer", &transfer.location)?;
    let symbol = &transfer.token.symbol;
    writeln!(f, "Type: {}", transfer.kind.label())?;
    writeln!(f, "From: {}", checksum(&transfer.from))?;
    writeln!(f, "To: {}", checksum(&transfer.to))?;
    writeln!(f, "Value: {} {symbol}", transfer.value)?;
    writeln!(f, "{SEPARATOR}")
}

fn write_swap(f: &mut fmt::Formatter<'_>, swap: &NormalizedSwap) -> fmt::Result {
    header(f, "Swap", &swap.location)?;
    let (sym0, sym1) = (&swap.token0.symbol, &swap.token1.symbol);

    let route = match swap.direction {
        SwapDirection::Token0ToToken1 => format!("{sym0} -> {sym1}"),
        SwapDirection::Token1ToToken0 => format!("{sym1} -> {sym0}"),
        SwapDirection::Indeterminate => "?".to_string(),
    };

    writeln!(f, "Sender: {}", checksum(&swap.sender))?;
    writeln!(f, "Recipient: {}", checksum(&swap.recipient))?;
    writeln!(f, "Direction: {} ({route})", swap.direction.label())?;
    writeln!(f, "Amount0In: {} {sym0}", swap.amount0_in)?;
    writeln!(f, "Amount1In: {} {sym1}", swap.amount1_in)?;
    writeln!(f, "Amount0Out: {} {sym0}", swap.amount0_out)?;
    writeln!(f, "Amount1Out: {} {sym1}", swap.amount1_out)?;
    writeln!(f, "Deltas:")?;
    for (token, delta) in swap.deltas() {
        writeln!(f, "  {}: {delta}", token.symbol)?;
    }
    match swap.trade() {
        Some((spent, sold, received, bought)) => writeln!(
            f,
            "Summary: {spent} {} -> {received} {}",
            sold.symbol, bought.symbol
        )?,
        None => writeln!(f, "Summary: {sym0} {}, {sym1} {}", swap.delta0, swap.delta1)?,
    }
    writeln!(f, "{SEPARATOR}")
}
