// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw token amount type

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use super::decimals::TokenDecimals;
use super::normalized::NormalizedAmount;

/// Raw token amount (not normalized for decimals)
///
/// The integer stored on-chain in the token's smallest unit. Use
/// [`normalize`](Self::normalize) with the token's [`TokenDecimals`] to get
/// the exact human-scale value.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use swapscan::{TokenAmount, TokenDecimals};
///
/// let amount = TokenAmount::new(U256::from(1_500_000_000_000_000_000u64));
/// assert_eq!(amount.normalize(TokenDecimals::STANDARD).to_string(), "1.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(U256);

impl TokenAmount {
    /// Zero token amount
    pub const ZERO: Self = Self(U256::ZERO);

    /// Create a new token amount from U256
    pub const fn new(amount: U256) -> Self {
        Self(amount)
    }

    /// Get the inner U256 value
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Check if amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Scale by `10^decimals` without losing precision.
    pub fn normalize(&self, decimals: TokenDecimals) -> NormalizedAmount {
        NormalizedAmount::new(*self, decimals)
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
