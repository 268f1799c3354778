// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Decimal normalization of decoded events
//!
//! Raw integer amounts become exact [`NormalizedAmount`]s scaled by the
//! resolved token's decimals. Swaps additionally get per-token signed
//! deltas (`out - in`): negative for the spent token, positive for the
//! received one, zero for an unused side.

use std::sync::Arc;

use alloy_primitives::Address;

use super::decoder::{DecodedEvent, DecodedLog, EventLocation, SwapDirection, SwapEvent, TransferEvent};
use crate::metadata::{ContractReader, TokenMetadataResolver};
use crate::types::tokens::{NormalizedAmount, SignedAmount, TokenAmount, TokenDecimals, TokenMetadata};

/// Transfer classification from its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferKind {
    /// Sent from the zero address
    Mint,
    /// Sent to the zero address
    Burn,
    /// Between two accounts
    Transfer,
}

impl TransferKind {
    /// Classify by the zero address on either side
    pub fn classify(from: Address, to: Address) -> Self {
        if from == Address::ZERO {
            Self::Mint
        } else if to == Address::ZERO {
            Self::Burn
        } else {
            Self::Transfer
        }
    }

    /// Report label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mint => "MINT",
            Self::Burn => "BURN",
            Self::Transfer => "TRANSFER",
        }
    }
}

/// Transfer with its amount in human scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTransfer {
    /// Emission site
    pub location: EventLocation,
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Address,
    /// Token moved (the emitting contract)
    pub token: TokenMetadata,
    /// Amount moved
    pub value: NormalizedAmount,
    /// Mint, burn or plain transfer
    pub kind: TransferKind,
}

/// Swap with its amounts in human scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSwap {
    /// Emission site (the pool)
    pub location: EventLocation,
    /// Caller of `swap`
    pub sender: Address,
    /// Recipient of the output
    pub recipient: Address,
    /// Pool token0
    pub token0: TokenMetadata,
    /// Pool token1
    pub token1: TokenMetadata,
    /// token0 paid in
    pub amount0_in: NormalizedAmount,
    /// token1 paid in
    pub amount1_in: NormalizedAmount,
    /// token0 paid out
    pub amount0_out: NormalizedAmount,
    /// token1 paid out
    pub amount1_out: NormalizedAmount,
    /// Which token was sold
    pub direction: SwapDirection,
    /// Net token0 change for the recipient
    pub delta0: SignedAmount,
    /// Net token1 change for the recipient
    pub delta1: SignedAmount,
}

impl NormalizedSwap {
    /// Per-token signed deltas in pool order
    pub fn deltas(&self) -> [(&TokenMetadata, SignedAmount); 2] {
        [(&self.token0, self.delta0), (&self.token1, self.delta1)]
    }

    /// `(spent, sold token, received, bought token)` for a directional swap
    pub fn trade(&self) -> Option<(NormalizedAmount, &TokenMetadata, NormalizedAmount, &TokenMetadata)> {
        match self.direction {
            SwapDirection::Token0ToToken1 => Some((
                self.delta0.magnitude(),
                &self.token0,
                self.delta1.magnitude(),
                &self.token1,
            )),
            SwapDirection::Token1ToToken0 => Some((
                self.delta1.magnitude(),
                &self.token1,
                self.delta0.magnitude(),
                &self.token0,
            )),
            SwapDirection::Indeterminate => None,
        }
    }
}

/// A decoded event ready for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedEvent {
    /// ERC-20 Transfer
    Transfer(NormalizedTransfer),
    /// Uniswap V2-style Swap
    Swap(NormalizedSwap),
}

impl NormalizedEvent {
    /// Emission site
    pub fn location(&self) -> &EventLocation {
        match self {
            Self::Transfer(transfer) => &transfer.location,
            Self::Swap(swap) => &swap.location,
        }
    }

    /// Event kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transfer(_) => "Transfer",
            Self::Swap(_) => "Swap",
        }
    }
}

/// Scales decoded events using resolved token metadata.
#[derive(Debug)]
pub struct AmountNormalizer<R> {
    resolver: Arc<TokenMetadataResolver<R>>,
}

impl<R> Clone for AmountNormalizer<R> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<R: ContractReader> AmountNormalizer<R> {
    /// Create a normalizer backed by a shared resolver
    pub fn new(resolver: Arc<TokenMetadataResolver<R>>) -> Self {
        Self { resolver }
    }

    /// `raw / 10^decimals`, exact
    pub fn normalize(raw: TokenAmount, decimals: TokenDecimals) -> NormalizedAmount {
        raw.normalize(decimals)
    }

    /// Resolve token metadata and scale every amount of `decoded`.
    pub async fn normalize_event(&self, decoded: DecodedLog) -> NormalizedEvent {
        match decoded.event {
            DecodedEvent::Transfer(transfer) => {
                NormalizedEvent::Transfer(self.normalize_transfer(decoded.location, transfer).await)
            }
            DecodedEvent::Swap(swap) => {
                NormalizedEvent::Swap(self.normalize_swap(decoded.location, swap).await)
            }
        }
    }

    async fn normalize_transfer(
        &self,
        location: EventLocation,
        transfer: TransferEvent,
    ) -> NormalizedTransfer {
        let token = self.resolver.resolve(location.contract).await;
        NormalizedTransfer {
            location,
            from: transfer.from,
            to: transfer.to,
            value: Self::normalize(transfer.value, token.decimals),
            kind: TransferKind::classify(transfer.from, transfer.to),
            token,
        }
    }

    async fn normalize_swap(&self, location: EventLocation, swap: SwapEvent) -> NormalizedSwap {
        let tokens = self.resolver.resolve_pool(location.contract).await;
        let (decimals0, decimals1) = (tokens.token0.decimals, tokens.token1.decimals);

        let amount0_in = Self::normalize(swap.amount0_in, decimals0);
        let amount1_in = Self::normalize(swap.amount1_in, decimals1);
        let amount0_out = Self::normalize(swap.amount0_out, decimals0);
        let amount1_out = Self::normalize(swap.amount1_out, decimals1);

        NormalizedSwap {
            location,
            sender: swap.sender,
            recipient: swap.recipient,
            token0: tokens.token0,
            token1: tokens.token1,
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
            direction: swap.direction,
            delta0: SignedAmount::delta(amount0_in, amount0_out),
            delta1: SignedAmount::delta(amount1_in, amount1_out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, Bytes, U256};
    use alloy_sol_types::{sol_data, SolType, SolValue};
    use async_trait::async_trait;

    use crate::errors::MetadataError;
    use crate::metadata::calls::MetadataCall;

    const POOL: Address = address!("0x88A43bbDF9D098eEC7bCEda4e2494615dfD9bB9C");
    const WETH: Address = address!("0x4200000000000000000000000000000000000006");
    const USDC: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

    struct PoolReader;

    fn answer(contract: Address, function: &str) -> Option<Vec<u8>> {
        if contract == POOL {
            match function {
                "token0" => return Some((WETH,).abi_encode_params()),
                "token1" => return Some((USDC,).abi_encode_params()),
                _ => {}
            }
        }
        let tokens = [(POOL, "UNI-V2", 18u8), (WETH, "WETH", 18), (USDC, "USDC", 6)];
        let (_, symbol, decimals) = tokens.into_iter().find(|(token, ..)| *token == contract)?;
        match function {
            "decimals" => Some(<(sol_data::Uint<8>,) as SolType>::abi_encode_params(&(decimals,))),
            "symbol" => Some((symbol.to_string(),).abi_encode_params()),
            _ => None,
        }
    }

    #[async_trait]
    impl ContractReader for PoolReader {
        async fn call(&self, contract: Address, call: &MetadataCall) -> Result<Bytes, MetadataError> {
            answer(contract, call.function)
                .map(Bytes::from)
                .ok_or_else(|| MetadataError::call_failed(contract, call.function, "no code"))
        }
    }

    fn normalizer() -> AmountNormalizer<PoolReader> {
        AmountNormalizer::new(Arc::new(TokenMetadataResolver::new(PoolReader)))
    }

    fn location() -> EventLocation {
        EventLocation {
            tx_hash: b256!("0x00000000000000000000000000000000000000000000000000000000000000aa"),
            block_number: 23071608,
            log_index: 3,
            contract: POOL,
        }
    }

    fn raw(value: u128) -> TokenAmount {
        TokenAmount::new(U256::from(value))
    }

    #[tokio::test]
    async fn test_normalize_transfer_and_kind() {
        let event = normalizer()
            .normalize_event(DecodedLog {
                location: location(),
                event: DecodedEvent::Transfer(TransferEvent {
                    from: Address::ZERO,
                    to: WETH,
                    value: raw(185_875_827_271_336_738_996),
                }),
            })
            .await;

        let NormalizedEvent::Transfer(transfer) = event else {
            panic!("expected a transfer");
        };
        assert_eq!(transfer.value.to_string(), "185.875827271336738996");
        assert_eq!(transfer.token.symbol, "UNI-V2");
        assert_eq!(transfer.kind, TransferKind::Mint);
    }

    #[tokio::test]
    async fn test_normalize_swap_uses_each_token_precision() {
        let swap = SwapEvent {
            sender: WETH,
            recipient: WETH,
            amount0_in: raw(0),
            amount1_in: raw(2_500_000),
            amount0_out: raw(1_000_000_000_000_000),
            amount1_out: raw(0),
            direction: SwapDirection::Token1ToToken0,
        };
        let event = normalizer()
            .normalize_event(DecodedLog {
                location: location(),
                event: DecodedEvent::Swap(swap),
            })
            .await;

        let NormalizedEvent::Swap(swap) = event else {
            panic!("expected a swap");
        };
        assert_eq!(swap.amount1_in.to_string(), "2.5");
        assert_eq!(swap.amount0_out.to_string(), "0.001");
        assert_eq!(swap.delta0.to_string(), "+0.001");
        assert_eq!(swap.delta1.to_string(), "-2.5");

        let (spent, sold, received, bought) = swap.trade().unwrap();
        assert_eq!((spent.to_string(), sold.symbol.as_str()), ("2.5".into(), "USDC"));
        assert_eq!((received.to_string(), bought.symbol.as_str()), ("0.001".into(), "WETH"));
    }

    #[test]
    fn test_transfer_kind() {
        assert_eq!(TransferKind::classify(WETH, Address::ZERO), TransferKind::Burn);
        assert_eq!(TransferKind::classify(WETH, USDC).label(), "TRANSFER");
    }
}
