// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Decimal-normalized token amounts
//!
//! Amounts are kept as the raw integer plus its decimals, and rendered as an
//! exact decimal string. Nothing here goes through floating point.

use std::cmp::Ordering;
use std::str::FromStr;

use alloy_primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;

use super::amount::TokenAmount;
use super::decimals::TokenDecimals;

/// Token amount scaled by its decimals: `raw / 10^decimals`
///
/// [`Display`](std::fmt::Display) renders the exact value with trailing
/// fractional zeros trimmed and no decimal point for whole values.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use swapscan::{NormalizedAmount, TokenAmount, TokenDecimals};
///
/// let raw = TokenAmount::new(U256::from(4_494_317_262_057u64));
/// let amount = NormalizedAmount::new(raw, TokenDecimals::STANDARD);
/// assert_eq!(amount.to_string(), "0.000004494317262057");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedAmount {
    raw: TokenAmount,
    decimals: TokenDecimals,
}

impl NormalizedAmount {
    /// Create a normalized amount from a raw amount and its precision
    pub const fn new(raw: TokenAmount, decimals: TokenDecimals) -> Self {
        Self { raw, decimals }
    }

    /// Zero in the given precision
    pub const fn zero(decimals: TokenDecimals) -> Self {
        Self::new(TokenAmount::ZERO, decimals)
    }

    /// The underlying on-chain integer
    pub const fn raw(&self) -> TokenAmount {
        self.raw
    }

    /// The precision used for scaling
    pub const fn decimals(&self) -> TokenDecimals {
        self.decimals
    }

    /// Check if amount is zero
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Exact value as a [`BigDecimal`] with scale equal to the token decimals
    pub fn to_big_decimal(&self) -> BigDecimal {
        let bytes = self.raw.as_u256().to_be_bytes::<32>();
        let unscaled = BigInt::from_bytes_be(Sign::Plus, &bytes);
        BigDecimal::new(unscaled, i64::from(self.decimals.as_u8()))
    }

    /// Split into whole and fractional digit strings, fractional zeros trimmed.
    fn parts(&self) -> (String, String) {
        let raw = self.raw.as_u256();
        let decimals = usize::from(self.decimals.as_u8());
        if decimals == 0 {
            return (raw.to_string(), String::new());
        }

        // 10^78 no longer fits in 256 bits; every raw value is then purely fractional
        let (whole, fractional) = match U256::from(10u64).checked_pow(U256::from(decimals)) {
            Some(divisor) => (raw / divisor, raw % divisor),
            None => (U256::ZERO, raw),
        };

        let fractional = format!("{:0>decimals$}", fractional.to_string());
        let trimmed = fractional.trim_end_matches('0');
        (whole.to_string(), trimmed.to_string())
    }
}

impl std::fmt::Display for NormalizedAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (whole, fractional) = self.parts();
        if fractional.is_empty() {
            write!(f, "{whole}")
        } else {
            write!(f, "{whole}.{fractional}")
        }
    }
}

impl PartialOrd for NormalizedAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NormalizedAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.decimals == other.decimals {
            return self.raw.cmp(&other.raw);
        }
        self.to_big_decimal().cmp(&other.to_big_decimal())
    }
}

impl FromStr for NormalizedAmount {
    type Err = String;

    /// Parse a plain decimal string (`"185.875827271336738996"`) back into a
    /// raw integer at the given number of fractional digits.
    ///
    /// The precision is the number of fractional digits present.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (whole, fractional) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() || !whole.bytes().chain(fractional.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(format!("not a plain decimal: {s}"));
        }
        let decimals = u8::try_from(fractional.len())
            .map_err(|_| format!("too many fractional digits: {}", fractional.len()))?;
        let digits = format!("{whole}{fractional}");
        let raw = U256::from_str_radix(&digits, 10).map_err(|e| e.to_string())?;
        Ok(Self::new(TokenAmount::new(raw), TokenDecimals::new(decimals)))
    }
}

/// Which way a token moved for the swap's recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaSign {
    /// Token was spent
    Negative,
    /// Token side was not used
    Zero,
    /// Token was received
    Positive,
}

/// Signed holdings delta: a magnitude plus a sign
///
/// Renders as `-x`, `+x` or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedAmount {
    magnitude: NormalizedAmount,
    sign: DeltaSign,
}

impl SignedAmount {
    /// `received - spent`, both in the same precision
    pub fn delta(spent: NormalizedAmount, received: NormalizedAmount) -> Self {
        let decimals = spent.decimals();
        let (spent, received) = (spent.raw().as_u256(), received.raw().as_u256());
        let (sign, magnitude) = match received.cmp(&spent) {
            Ordering::Greater => (DeltaSign::Positive, received - spent),
            Ordering::Less => (DeltaSign::Negative, spent - received),
            Ordering::Equal => (DeltaSign::Zero, U256::ZERO),
        };
        Self {
            magnitude: NormalizedAmount::new(TokenAmount::new(magnitude), decimals),
            sign,
        }
    }

    /// Absolute value
    pub const fn magnitude(&self) -> NormalizedAmount {
        self.magnitude
    }

    /// Sign of the delta
    pub const fn sign(&self) -> DeltaSign {
        self.sign
    }

    /// Whether the token was spent
    pub fn is_negative(&self) -> bool {
        self.sign == DeltaSign::Negative
    }

    /// Whether the token was received
    pub fn is_positive(&self) -> bool {
        self.sign == DeltaSign::Positive
    }

    /// Exact signed value
    pub fn to_big_decimal(&self) -> BigDecimal {
        match self.sign {
            DeltaSign::Negative => -self.magnitude.to_big_decimal(),
            _ => self.magnitude.to_big_decimal(),
        }
    }
}

impl std::fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sign {
            DeltaSign::Negative => write!(f, "-{}", self.magnitude),
            DeltaSign::Zero => write!(f, "0"),
            DeltaSign::Positive => write!(f, "+{}", self.magnitude),
        }
    }
}
