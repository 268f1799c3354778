// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Log sources
//!
//! A [`LogSource`] answers two questions: what is the chain head, and which
//! logs did a contract emit in an inclusive block range. Pagination inside
//! that range is the source's concern. Chunking the range and retrying
//! failures belong to the caller.
//!
//! - [`ExplorerClient`]: Etherscan-compatible explorer API
//! - [`RpcClient`]: JSON-RPC node through an Alloy provider

pub mod explorer;
pub mod rpc;

use std::sync::Arc;

use alloy_primitives::{Address, BlockNumber};
use async_trait::async_trait;

use crate::errors::FetchError;
use crate::types::log::RawLogEntry;

pub use explorer::ExplorerClient;
pub use rpc::RpcClient;

/// Source of raw logs and the chain head.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Current chain head block number.
    async fn latest_block(&self) -> Result<BlockNumber, FetchError>;

    /// All logs emitted by `contract` in `from_block..=to_block`, in chain order.
    async fn fetch_logs(
        &self,
        contract: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<RawLogEntry>, FetchError>;
}

#[async_trait]
impl<T: LogSource + ?Sized> LogSource for Arc<T> {
    async fn latest_block(&self) -> Result<BlockNumber, FetchError> {
        (**self).latest_block().await
    }

    async fn fetch_logs(
        &self,
        contract: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<RawLogEntry>, FetchError> {
        (**self).fetch_logs(contract, from_block, to_block).await
    }
}
