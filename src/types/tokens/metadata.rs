// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token metadata record

use alloy_primitives::Address;

use super::decimals::TokenDecimals;

/// Symbol and precision of a token contract.
///
/// Produced by the metadata resolver and cached for the process lifetime.
/// Records that could not be read from the chain carry `resolved == false`,
/// the raw address as symbol and 18 decimals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenMetadata {
    /// Token contract address
    pub address: Address,
    /// Display symbol
    pub symbol: String,
    /// Decimal precision
    pub decimals: TokenDecimals,
    /// Whether the symbol and decimals were read from the contract
    pub resolved: bool,
}

impl TokenMetadata {
    /// Metadata read from the token contract
    pub fn resolved(address: Address, symbol: impl Into<String>, decimals: TokenDecimals) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
            resolved: true,
        }
    }

    /// Fallback for a contract that did not answer as an ERC20 token
    pub fn fallback(address: Address) -> Self {
        Self {
            address,
            symbol: address.to_checksum(None),
            decimals: TokenDecimals::STANDARD,
            resolved: false,
        }
    }

    /// Placeholder for one side of a pool whose tokens could not be read
    pub fn unknown_pool_side(pool: Address, side: usize) -> Self {
        Self {
            address: pool,
            symbol: format!("token{side}"),
            decimals: TokenDecimals::STANDARD,
            resolved: false,
        }
    }
}
