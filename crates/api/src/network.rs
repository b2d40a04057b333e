//! Supported networks and their 0x API hosts.

use crate::ZrxApiError;
use serde::{Deserialize, Serialize};

/// Ethereum mainnet chain ID.
pub const ETHEREUM_CHAIN_ID: u64 = 1;

/// Polygon PoS chain ID.
pub const POLYGON_CHAIN_ID: u64 = 137;

/// Prefix for API hosts serving gated (API-key) features.
const GATED_PREFIX: &str = "gated.";

/// An EVM network the wallet can be pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmNetwork {
    /// Chain ID
    pub chain_id: u64,
    /// Human-readable name
    pub name: String,
    /// Native asset symbol (e.g., "ETH", "MATIC")
    pub native_symbol: String,
}

impl EvmNetwork {
    pub fn new(chain_id: u64, name: impl Into<String>, native_symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            native_symbol: native_symbol.into(),
        }
    }

    pub fn ethereum() -> Self {
        Self::new(ETHEREUM_CHAIN_ID, "Ethereum", "ETH")
    }

    pub fn polygon() -> Self {
        Self::new(POLYGON_CHAIN_ID, "Polygon", "MATIC")
    }

    /// Known network for a chain ID.
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            ETHEREUM_CHAIN_ID => Some(Self::ethereum()),
            POLYGON_CHAIN_ID => Some(Self::polygon()),
            _ => None,
        }
    }

    /// Whether `token` names this network's native asset.
    pub fn is_native_token(&self, token: &str) -> bool {
        token.eq_ignore_ascii_case(&self.native_symbol)
    }
}

/// Resolve the 0x API host for a network.
///
/// Gated hosts are used when an API key is available.
pub fn api_host(network: &EvmNetwork, gated: bool) -> Result<String, ZrxApiError> {
    let base = match network.chain_id {
        ETHEREUM_CHAIN_ID => "api.0x.org",
        POLYGON_CHAIN_ID => "polygon.api.0x.org",
        chain_id => {
            return Err(ZrxApiError::UnsupportedNetwork {
                chain_id,
                name: network.name.clone(),
            })
        }
    };

    let prefix = if gated { GATED_PREFIX } else { "" };
    Ok(format!("{prefix}{base}"))
}
