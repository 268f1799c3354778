// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC log source
//!
//! Logs come from `eth_getLogs` and metadata from `eth_call` through an
//! Alloy provider. Transient transport failures are retried by the
//! provider's [`crate::transport::RetryLayer`], so errors surfacing here
//! are reported as [`FetchError::Rpc`] and not retried again.

use alloy_network::{AnyNetwork, Network, TransactionBuilder};
use alloy_primitives::{Address, BlockNumber, Bytes};
use alloy_provider::Provider;
use alloy_rpc_types::{Filter, Log};
use async_trait::async_trait;
use tracing::debug;

use crate::errors::{FetchError, MetadataError};
use crate::metadata::{calls::MetadataCall, ContractReader};
use crate::source::LogSource;
use crate::types::log::RawLogEntry;

const GET_LOGS: &str = "eth_getLogs";
const ETH_CALL: &str = "eth_call";

/// [`LogSource`] and [`ContractReader`] backed by an Alloy provider.
#[derive(Debug, Clone)]
pub struct RpcClient<P> {
    provider: P,
}

impl<P> RpcClient<P> {
    /// Wrap `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> LogSource for RpcClient<P>
where
    P: Provider<AnyNetwork> + Send + Sync,
{
    async fn latest_block(&self) -> Result<BlockNumber, FetchError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|source| FetchError::Rpc {
                operation: "eth_blockNumber",
                source,
            })
    }

    async fn fetch_logs(
        &self,
        contract: Address,
        from_block: BlockNumber,
        to_block: BlockNumber,
    ) -> Result<Vec<RawLogEntry>, FetchError> {
        let filter = Filter::new()
            .address(contract)
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|source| FetchError::Rpc {
                operation: GET_LOGS,
                source,
            })?;

        debug!(%contract, from_block, to_block, count = logs.len(), "Fetched logs from RPC");
        logs.into_iter().map(raw_entry).collect()
    }
}

#[async_trait]
impl<P> ContractReader for RpcClient<P>
where
    P: Provider<AnyNetwork> + Send + Sync,
{
    async fn call(&self, contract: Address, call: &MetadataCall) -> Result<Bytes, MetadataError> {
        let tx = <AnyNetwork as Network>::TransactionRequest::default()
            .with_to(contract)
            .with_input(call.calldata.clone());

        self.provider
            .call(tx)
            .await
            .map_err(|e| {
                // an error response is the node's answer; anything else never reached it
                if e.as_error_resp().is_some() {
                    MetadataError::call_failed(contract, call.function, e)
                } else {
                    MetadataError::unavailable(
                        contract,
                        call.function,
                        FetchError::Rpc {
                            operation: ETH_CALL,
                            source: e,
                        },
                    )
                }
            })
    }
}

/// Convert an RPC log into a [`RawLogEntry`]. Pending logs lack a block
/// position and are rejected.
fn raw_entry(log: Log) -> Result<RawLogEntry, FetchError> {
    let missing = |field: &str| FetchError::malformed(GET_LOGS, format!("log without {field}"));

    Ok(RawLogEntry {
        tx_hash: log.transaction_hash.ok_or_else(|| missing("transaction hash"))?,
        block_number: log.block_number.ok_or_else(|| missing("block number"))?,
        log_index: log.log_index.ok_or_else(|| missing("log index"))?,
        address: log.address(),
        topics: log.topics().to_vec(),
        data: log.data().data.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, LogData, B256};

    fn rpc_log(block_number: Option<u64>) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: address!("88A43bbDF9D098eEC7bCEda4e2494615dfD9bB9C"),
                data: LogData::new_unchecked(
                    vec![b256!(
                        "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
                    )],
                    Bytes::from_static(&[1, 2, 3]),
                ),
            },
            block_hash: None,
            block_number,
            block_timestamp: None,
            transaction_hash: Some(B256::repeat_byte(0xab)),
            transaction_index: Some(0),
            log_index: Some(4),
            removed: false,
        }
    }

    #[test]
    fn converts_mined_logs() {
        let entry = raw_entry(rpc_log(Some(23071608))).unwrap();
        assert_eq!(entry.block_number, 23071608);
        assert_eq!(entry.log_index, 4);
        assert_eq!(entry.tx_hash, B256::repeat_byte(0xab));
        assert_eq!(entry.topics.len(), 1);
        assert_eq!(entry.data.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn rejects_pending_logs() {
        assert!(matches!(
            raw_entry(rpc_log(None)),
            Err(FetchError::Malformed { .. })
        ));
    }
}
