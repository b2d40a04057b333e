//! Top-level swap configuration with file and environment loading.

use super::chain::expand_env;
use super::{AssetConfig, ChainConfig};
use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use zrx_swap_api::{AffiliateParams, ApiCredentials, SwapAsset, DEFAULT_SWAP_FEE};

/// Community multisig receiving affiliate fees.
pub const DEFAULT_AFFILIATE_ADDRESS: Address = address!("99b36fDbC582D113aF36A21EBa06BFEAb7b9bE12");

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwapConfig {
    /// 0x API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Active chain
    #[serde(default)]
    pub chain: ChainConfig,

    /// Swap defaults
    #[serde(default)]
    pub swap: SwapDefaults,

    /// Assets swappable by symbol; mainnet defaults when empty
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
}

/// 0x API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key for gated endpoints (supports ${VAR} expansion)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Affiliate address reported to the API
    #[serde(default = "default_affiliate")]
    pub affiliate_address: Address,

    /// Fee recipient (defaults to the affiliate address)
    #[serde(default)]
    pub fee_recipient: Option<Address>,

    /// Fraction of the buy amount taken as fee
    #[serde(default = "default_swap_fee")]
    pub buy_token_percentage_fee: f64,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_affiliate() -> Address {
    DEFAULT_AFFILIATE_ADDRESS
}
fn default_swap_fee() -> f64 {
    DEFAULT_SWAP_FEE
}
fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            affiliate_address: default_affiliate(),
            fee_recipient: None,
            buy_token_percentage_fee: default_swap_fee(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Credentials handed to the API client.
    pub fn credentials(&self) -> ApiCredentials {
        ApiCredentials {
            api_key: self.api_key.clone(),
            affiliate: Some(AffiliateParams {
                affiliate_address: self.affiliate_address,
                fee_recipient: self.fee_recipient.unwrap_or(self.affiliate_address),
                buy_token_percentage_fee: self.buy_token_percentage_fee,
            }),
        }
    }

    /// Get request timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults applied to swap requests built from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapDefaults {
    /// Slippage tolerance as a fraction (0.01 = 1%)
    #[serde(default = "default_slippage")]
    pub slippage_tolerance: f64,
}

fn default_slippage() -> f64 {
    0.01
}

impl Default for SwapDefaults {
    fn default() -> Self {
        Self {
            slippage_tolerance: default_slippage(),
        }
    }
}

impl SwapConfig {
    /// Load config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: SwapConfig = toml::from_str(&content)?;
        config.expand_env_vars();
        Ok(config)
    }

    /// Load config from `SWAP_CONFIG` (if set), then apply environment overrides:
    /// `ZEROX_API_KEY`, `RPC_URL`, `CHAIN_ID`.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = match std::env::var("SWAP_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => {
                let mut config = Self::default();
                config.expand_env_vars();
                config
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply overrides looked up by variable name.
    ///
    /// `CHAIN_ID` must name a known network; its name and native symbol
    /// replace the configured ones.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(api_key) = lookup("ZEROX_API_KEY") {
            self.api.api_key = Some(api_key);
        }
        if let Some(rpc_url) = lookup("RPC_URL") {
            self.chain.rpc_url = rpc_url;
        }
        if let Some(chain_id) = lookup("CHAIN_ID") {
            let chain_id = chain_id
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid CHAIN_ID '{}': {}", chain_id, e))?;
            self.chain.select_chain(chain_id)?;
        }

        Ok(())
    }

    /// Expand environment variables in config values.
    pub fn expand_env_vars(&mut self) {
        self.chain.expand_env_vars();
        if let Some(ref mut api_key) = self.api.api_key {
            *api_key = expand_env(api_key);
        }
    }

    /// Configured assets, or the mainnet defaults when none are listed.
    pub fn assets(&self) -> Vec<AssetConfig> {
        if self.assets.is_empty() {
            AssetConfig::mainnet_defaults()
        } else {
            self.assets.clone()
        }
    }

    /// Look up an asset by symbol (case-insensitive).
    pub fn find_asset(&self, symbol: &str) -> anyhow::Result<SwapAsset> {
        self.assets()
            .iter()
            .find(|asset| asset.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| anyhow::anyhow!("Unknown asset: {}", symbol))?
            .to_swap_asset()
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::info!(
            chain_id = self.chain.chain_id,
            network = %self.chain.name,
            native = %self.chain.native_symbol,
            "Chain configuration loaded"
        );
        tracing::info!(
            gated = self.api.credentials().is_gated(),
            affiliate = %self.api.affiliate_address,
            fee = self.api.buy_token_percentage_fee,
            timeout_secs = self.api.request_timeout_secs,
            "0x API configuration"
        );
        tracing::info!(
            slippage = self.swap.slippage_tolerance,
            assets = self.assets().len(),
            "Swap defaults"
        );
    }
}
