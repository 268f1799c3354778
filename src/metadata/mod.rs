// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token metadata resolution
//!
//! [`TokenMetadataResolver`] answers "what is this token's symbol and
//! precision" and "which tokens does this pool trade", reading the chain
//! through a [`ContractReader`] the first time and serving the process-wide
//! cache afterwards. It never fails: contracts that do not answer as ERC-20
//! tokens get fallback metadata (symbol = address, 18 decimals) flagged as
//! unresolved. That fallback is cached when the contract itself answered
//! (revert, bad return data) and retried on the next lookup when the read
//! never reached it.

pub mod calls;

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn, Instrument};

use crate::errors::MetadataError;
use crate::spans;
use crate::types::tokens::TokenMetadata;
use calls::{decode_address, decode_decimals, decode_symbol, MetadataCall};

/// Read-only contract calls (`eth_call` at the latest block).
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Execute `call` against `contract` and return the raw return data.
    async fn call(&self, contract: Address, call: &MetadataCall) -> Result<Bytes, MetadataError>;
}

#[async_trait]
impl<T: ContractReader + ?Sized> ContractReader for Arc<T> {
    async fn call(&self, contract: Address, call: &MetadataCall) -> Result<Bytes, MetadataError> {
        (**self).call(contract, call).await
    }
}

/// The two tokens traded by a pool, in pool order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTokens {
    /// token0 metadata
    pub token0: TokenMetadata,
    /// token1 metadata
    pub token1: TokenMetadata,
}

/// Result of a metadata read.
enum Lookup<T> {
    /// The contract's own answer, cached for the run
    Settled(T),
    /// Stand-in after a transient failure, not cached
    Provisional(T),
}

/// Cached token and pool metadata lookups.
///
/// The caches are owned by the resolver and live as long as it does; they
/// are never invalidated because token decimals and pool tokens do not change.
#[derive(Debug)]
pub struct TokenMetadataResolver<R> {
    reader: R,
    tokens: RwLock<HashMap<Address, TokenMetadata>>,
    pools: RwLock<HashMap<Address, Option<(Address, Address)>>>,
}

impl<R: ContractReader> TokenMetadataResolver<R> {
    /// Create a resolver with empty caches
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tokens: RwLock::new(HashMap::new()),
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Symbol and decimals for `token`.
    ///
    /// On a cache miss, reads `decimals()` and `symbol()`. If `decimals()`
    /// fails the token gets [`TokenMetadata::fallback`]. If only `symbol()`
    /// fails the real decimals are kept with the address as symbol.
    ///
    /// Only the contract's own answers are cached. A read that did not reach
    /// the contract returns the fallback for this call and is retried on the
    /// next one.
    pub async fn resolve(&self, token: Address) -> TokenMetadata {
        if let Some(cached) = self.tokens.read().await.get(&token) {
            return cached.clone();
        }

        let lookup = self
            .fetch_token(token)
            .instrument(spans::resolve_token(token))
            .await;

        match lookup {
            Lookup::Settled(metadata) => self
                .tokens
                .write()
                .await
                .entry(token)
                .or_insert(metadata)
                .clone(),
            Lookup::Provisional(metadata) => metadata,
        }
    }

    /// Metadata for both tokens of a Uniswap V2-style pool.
    ///
    /// If the pool does not answer `token0()`/`token1()`, both sides get
    /// unresolved `token0`/`token1` placeholders with 18 decimals.
    pub async fn resolve_pool(&self, pool: Address) -> PoolTokens {
        let cached = self.pools.read().await.get(&pool).copied();
        let addresses = match cached {
            Some(addresses) => addresses,
            None => match self.fetch_pool(pool).await {
                Lookup::Settled(fetched) => *self.pools.write().await.entry(pool).or_insert(fetched),
                Lookup::Provisional(fetched) => fetched,
            },
        };

        match addresses {
            Some((token0, token1)) => PoolTokens {
                token0: self.resolve(token0).await,
                token1: self.resolve(token1).await,
            },
            None => PoolTokens {
                token0: TokenMetadata::unknown_pool_side(pool, 0),
                token1: TokenMetadata::unknown_pool_side(pool, 1),
            },
        }
    }

    /// Number of cached token records
    pub async fn cached_tokens(&self) -> usize {
        self.tokens.read().await.len()
    }

    async fn fetch_token(&self, token: Address) -> Lookup<TokenMetadata> {
        let decimals = self
            .read(token, MetadataCall::decimals())
            .await
            .and_then(|data| decode_decimals(token, &data));
        let decimals = match decimals {
            Ok(decimals) => decimals,
            Err(e) if e.is_transient() => {
                warn!(token = %token, error = %e, "Token metadata temporarily unavailable, using fallback");
                return Lookup::Provisional(TokenMetadata::fallback(token));
            }
            Err(e) => {
                warn!(token = %token, error = %e, "Token metadata unavailable, using fallback");
                return Lookup::Settled(TokenMetadata::fallback(token));
            }
        };

        let symbol = self
            .read(token, MetadataCall::symbol())
            .await
            .and_then(|data| decode_symbol(token, &data));
        match symbol {
            Ok(symbol) => {
                debug!(token = %token, symbol = %symbol, decimals = decimals.as_u8(), "Resolved token metadata");
                Lookup::Settled(TokenMetadata::resolved(token, symbol, decimals))
            }
            Err(e) => {
                warn!(token = %token, error = %e, "Token symbol unavailable, using address");
                let metadata = TokenMetadata {
                    decimals,
                    ..TokenMetadata::fallback(token)
                };
                if e.is_transient() {
                    Lookup::Provisional(metadata)
                } else {
                    Lookup::Settled(metadata)
                }
            }
        }
    }

    async fn fetch_pool(&self, pool: Address) -> Lookup<Option<(Address, Address)>> {
        let token0 = self.read_address(pool, MetadataCall::token0()).await;
        let token1 = self.read_address(pool, MetadataCall::token1()).await;
        match (token0, token1) {
            (Ok(token0), Ok(token1)) => {
                debug!(pool = %pool, token0 = %token0, token1 = %token1, "Resolved pool tokens");
                Lookup::Settled(Some((token0, token1)))
            }
            (Err(e), _) | (_, Err(e)) if e.is_transient() => {
                warn!(pool = %pool, error = %e, "Pool tokens temporarily unavailable, using placeholders");
                Lookup::Provisional(None)
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(pool = %pool, error = %e, "Pool tokens unavailable, using placeholders");
                Lookup::Settled(None)
            }
        }
    }

    async fn read_address(&self, pool: Address, call: MetadataCall) -> Result<Address, MetadataError> {
        let data = self.read(pool, call.clone()).await?;
        decode_address(pool, call.function, &data)
    }

    async fn read(&self, contract: Address, call: MetadataCall) -> Result<Bytes, MetadataError> {
        self.reader.call(contract, &call).await
    }
}
