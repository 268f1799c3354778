// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! ABI definitions and decoding for metadata contract calls.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall, SolValue};

use crate::errors::MetadataError;
use crate::types::tokens::TokenDecimals;

sol! {
    /// ERC-20 optional metadata extension
    interface IERC20Metadata {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }

    /// Legacy tokens (MKR, SAI) that return the symbol as bytes32
    interface IERC20MetadataBytes32 {
        function symbol() external view returns (bytes32);
    }

    /// Uniswap V2 pair token getters
    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

/// A metadata call: target function name plus calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCall {
    /// Function name for logs and errors
    pub function: &'static str,
    /// ABI-encoded calldata
    pub calldata: Bytes,
}

impl MetadataCall {
    fn encode<C: SolCall>(function: &'static str, call: C) -> Self {
        Self {
            function,
            calldata: Bytes::from(call.abi_encode()),
        }
    }

    /// `decimals()`
    pub fn decimals() -> Self {
        Self::encode("decimals", IERC20Metadata::decimalsCall {})
    }

    /// `symbol()`
    pub fn symbol() -> Self {
        Self::encode("symbol", IERC20Metadata::symbolCall {})
    }

    /// `token0()`
    pub fn token0() -> Self {
        Self::encode("token0", IUniswapV2Pair::token0Call {})
    }

    /// `token1()`
    pub fn token1() -> Self {
        Self::encode("token1", IUniswapV2Pair::token1Call {})
    }
}

/// Decode a `decimals()` result.
pub fn decode_decimals(contract: Address, data: &[u8]) -> Result<TokenDecimals, MetadataError> {
    IERC20Metadata::decimalsCall::abi_decode_returns(data)
        .map(TokenDecimals::new)
        .map_err(|e| MetadataError::invalid_return(contract, "decimals", e))
}

/// Decode a `symbol()` result, accepting both `string` and `bytes32` encodings.
pub fn decode_symbol(contract: Address, data: &[u8]) -> Result<String, MetadataError> {
    let symbol = match IERC20Metadata::symbolCall::abi_decode_returns(data) {
        Ok(symbol) => symbol,
        Err(string_err) => {
            // a bytes32 return is exactly one word
            if data.len() != 32 {
                return Err(MetadataError::invalid_return(contract, "symbol", string_err));
            }
            let word = IERC20MetadataBytes32::symbolCall::abi_decode_returns(data)
                .map_err(|e| MetadataError::invalid_return(contract, "symbol", e))?;
            let trimmed: Vec<u8> = word.iter().copied().take_while(|b| *b != 0).collect();
            String::from_utf8_lossy(&trimmed).into_owned()
        }
    };

    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(MetadataError::invalid_return(contract, "symbol", "empty symbol"));
    }
    Ok(symbol.to_string())
}

/// Decode a single `address` return, as given by `token0()` and `token1()`.
pub fn decode_address(
    contract: Address,
    function: &'static str,
    data: &[u8],
) -> Result<Address, MetadataError> {
    Address::abi_decode(data).map_err(|e| MetadataError::invalid_return(contract, function, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::{sol_data, SolType};
    use alloy_primitives::{address, hex, FixedBytes};

    const TOKEN: Address = address!("0x4200000000000000000000000000000000000006");

    #[test]
    fn test_calldata_selectors() {
        assert_eq!(MetadataCall::decimals().calldata.as_ref(), hex!("313ce567"));
        assert_eq!(MetadataCall::symbol().calldata.as_ref(), hex!("95d89b41"));
        assert_eq!(MetadataCall::token0().calldata.as_ref(), hex!("0dfe1681"));
        assert_eq!(MetadataCall::token1().calldata.as_ref(), hex!("d21220a7"));
    }

    #[test]
    fn test_decode_decimals() {
        let data = <(sol_data::Uint<8>,) as SolType>::abi_encode_params(&(6u8,));
        assert_eq!(decode_decimals(TOKEN, &data).unwrap(), TokenDecimals::USDC);
        assert!(decode_decimals(TOKEN, &[]).is_err());
    }

    #[test]
    fn test_decode_string_symbol() {
        let data = ("WETH".to_string(),).abi_encode_params();
        assert_eq!(decode_symbol(TOKEN, &data).unwrap(), "WETH");
    }

    #[test]
    fn test_decode_bytes32_symbol() {
        let mut word = [0u8; 32];
        word[..3].copy_from_slice(b"MKR");
        let data = (FixedBytes::<32>::from(word),).abi_encode_params();
        assert_eq!(decode_symbol(TOKEN, &data).unwrap(), "MKR");
    }

    #[test]
    fn test_empty_return_is_an_error() {
        // calls to accounts without code return no data
        assert!(decode_symbol(TOKEN, &[]).is_err());
        assert!(decode_address(TOKEN, "token0", &[]).is_err());
    }

    #[test]
    fn test_decode_address() {
        let data = (TOKEN,).abi_encode_params();
        assert_eq!(decode_address(TOKEN, "token0", &data).unwrap(), TOKEN);
    }

    #[test]
    fn test_decode_token1_reply() {
        const PAIR: Address = address!("0x88A43bbDF9D098eEC7bCEda4e2494615dfD9bB9C");
        const TKN: Address = address!("0x1111111111111111111111111111111111111111");

        let pair = IUniswapV2Pair::token1Call::abi_encode_returns(&TKN);
        assert_eq!(decode_address(PAIR, "token1", &pair).unwrap(), TKN);

        let error = decode_address(PAIR, "token1", &pair[..31]).unwrap_err();
        assert!(error.to_string().contains("token1"));
    }
}
