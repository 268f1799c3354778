// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token-related types
//!
//! - [`TokenDecimals`]: decimal precision
//! - [`TokenAmount`]: raw on-chain amount
//! - [`NormalizedAmount`] and [`SignedAmount`]: exact human-scale values
//! - [`TokenMetadata`]: symbol and precision of a token contract

mod amount;
mod decimals;
mod metadata;
mod normalized;

pub use amount::TokenAmount;
pub use decimals::TokenDecimals;
pub use metadata::TokenMetadata;
pub use normalized::{DeltaSign, NormalizedAmount, SignedAmount};
