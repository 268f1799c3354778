// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Event layouts understood by the decoder
//!
//! # Event Signatures
//!
//! - **Transfer**: `Transfer(address,address,uint256)`
//! - **Swap**: `Swap(address,uint256,uint256,uint256,uint256,address)`
//!   (Uniswap V2 pair layout)
//!
//! The `sol!` macro generates `SIGNATURE` and `SIGNATURE_HASH` constants for
//! each event; the decoder dispatches on `SIGNATURE_HASH` in topic 0.

use std::fmt::Debug;

use alloy_sol_types::sol;

sol! {
    /// ERC-20 Transfer event
    ///
    /// - `from`: sender, zero for mints (indexed)
    /// - `to`: recipient, zero for burns (indexed)
    /// - `value`: raw amount, not adjusted for decimals
    event Transfer(address indexed from, address indexed to, uint256 value);
}

impl Debug for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transfer(from: {}, to: {}, value: {})",
            self.from, self.to, self.value
        )
    }
}

sol! {
    /// Uniswap V2-style Swap event
    ///
    /// Emitted by a pair contract. Amounts are raw integers in each token's
    /// smallest unit. In a plain swap exactly one of `amount0In`/`amount1In`
    /// and one of `amount0Out`/`amount1Out` is non-zero.
    ///
    /// - `sender`: caller of `swap`, usually a router (indexed)
    /// - `to`: recipient of the output tokens (indexed)
    event Swap(
        address indexed sender,
        uint256 amount0In,
        uint256 amount1In,
        uint256 amount0Out,
        uint256 amount1Out,
        address indexed to
    );
}

impl Debug for Swap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Swap(sender: {}, to: {}, in: [{}, {}], out: [{}, {}])",
            self.sender, self.to, self.amount0In, self.amount1In, self.amount0Out, self.amount1Out
        )
    }
}
