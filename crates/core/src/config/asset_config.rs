//! Swappable asset configuration.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use zrx_swap_api::SwapAsset;

/// Individual asset configuration (TOML-loadable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Asset symbol (e.g., "ETH", "USDC")
    pub symbol: String,
    /// Token decimals
    pub decimals: u8,
    /// Token contract address (as hex string); omitted for the native asset
    #[serde(default)]
    pub token: Option<String>,
}

impl AssetConfig {
    fn new(symbol: &str, decimals: u8, token: Option<Address>) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
            token: token.map(|t| t.to_string()),
        }
    }

    /// Parse token address, if any.
    pub fn token_address(&self) -> anyhow::Result<Option<Address>> {
        self.token
            .as_deref()
            .map(|token| {
                token
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid token address '{}': {}", token, e))
            })
            .transpose()
    }

    /// Convert into a swap asset.
    pub fn to_swap_asset(&self) -> anyhow::Result<SwapAsset> {
        Ok(SwapAsset {
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            contract_address: self.token_address()?,
        })
    }

    /// Mainnet assets available without a config file.
    pub fn mainnet_defaults() -> Vec<Self> {
        vec![
            Self::new("ETH", 18, None),
            Self::new("WETH", 18, Some(address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"))),
            Self::new("USDC", 6, Some(address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"))),
            Self::new("USDT", 6, Some(address!("dAC17F958D2ee523a2206206994597C13D831ec7"))),
            Self::new("DAI", 18, Some(address!("6B175474E89094C44Da98b954EedeAC495271d0F"))),
        ]
    }
}
