// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Validated run settings
//!
//! Endpoints and credentials arrive from CLI flags or the environment (the
//! binary loads `.env` first). Everything is checked here so a bad value
//! fails before the first request.

use std::str::FromStr;

use alloy_primitives::Address;
use clap::{Args, ValueEnum};
use url::Url;

use super::constants::{env, DEFAULT_EXPLORER_URL, EXPLORER_API_PATH};
use crate::errors::ConfigError;

/// Where logs, head block and contract calls come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    /// Etherscan-compatible explorer API
    #[default]
    Explorer,
    /// JSON-RPC node
    Rpc,
}

/// Endpoint flags shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct EndpointArgs {
    /// Explorer API key
    #[arg(long, env = env::API_KEY, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Explorer base URL; `/api` is appended when missing
    #[arg(long, env = env::EXPLORER_URL, global = true)]
    pub explorer_url: Option<String>,

    /// JSON-RPC endpoint, required with `--source rpc`
    #[arg(long, env = env::RPC_URL, global = true)]
    pub rpc_url: Option<String>,

    /// Chain id sent to multichain explorer endpoints
    #[arg(long, env = env::CHAIN_ID, global = true)]
    pub chain_id: Option<u64>,

    /// Backend used for logs and token metadata
    #[arg(long, value_enum, default_value_t = SourceKind::Explorer, global = true)]
    pub source: SourceKind,
}

/// Explorer endpoint and credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ExplorerEndpoint {
    /// Full API URL, ending in `/api`
    pub api_url: Url,
    /// API key sent as `apikey`
    pub api_key: String,
    /// Optional `chainid` parameter
    pub chain_id: Option<u64>,
}

impl std::fmt::Debug for ExplorerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerEndpoint")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"<redacted>")
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Backend selected for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Explorer API
    Explorer(ExplorerEndpoint),
    /// JSON-RPC node
    Rpc(Url),
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Contract whose logs are watched
    pub contract: Address,
    /// Log and metadata backend
    pub backend: Backend,
}

impl Settings {
    /// Validate the contract address and endpoint flags.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidContractAddress`] if the address does not parse
    /// - [`ConfigError::MissingApiKey`] if the explorer backend has no key
    /// - [`ConfigError::MissingRpcUrl`] if the RPC backend has no URL
    /// - [`ConfigError::InvalidUrl`] for unparsable endpoints
    pub fn resolve(contract: &str, endpoints: &EndpointArgs) -> Result<Self, ConfigError> {
        let contract = parse_contract_address(contract)?;

        let backend = match endpoints.source {
            SourceKind::Explorer => {
                let api_key = endpoints
                    .api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .ok_or(ConfigError::MissingApiKey)?
                    .to_string();
                let base = endpoints
                    .explorer_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .unwrap_or(DEFAULT_EXPLORER_URL);
                Backend::Explorer(ExplorerEndpoint {
                    api_url: explorer_api_url(base)?,
                    api_key,
                    chain_id: endpoints.chain_id,
                })
            }
            SourceKind::Rpc => {
                let raw = endpoints
                    .rpc_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .ok_or(ConfigError::MissingRpcUrl)?;
                let url = Url::parse(raw).map_err(|e| ConfigError::invalid_url("rpc_url", e))?;
                Backend::Rpc(url)
            }
        };

        Ok(Self { contract, backend })
    }
}

/// Parse a `0x`-prefixed 20-byte contract address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidContractAddress`] for anything else.
pub fn parse_contract_address(raw: &str) -> Result<Address, ConfigError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(ConfigError::invalid_contract_address(raw, "missing 0x prefix"));
    }
    Address::from_str(trimmed).map_err(|e| ConfigError::invalid_contract_address(raw, e))
}

fn explorer_api_url(base: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(base).map_err(|e| ConfigError::invalid_url("explorer_url", e))?;
    let path = url.path().trim_end_matches('/').to_string();
    if !path.ends_with(EXPLORER_API_PATH) {
        url.set_path(&format!("{path}{EXPLORER_API_PATH}"));
    }
    Ok(url)
}
