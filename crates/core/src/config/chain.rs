//! Chain configuration for the active network.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use zrx_swap_api::EvmNetwork;

/// Chain details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain ID
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Human-readable name
    #[serde(default = "default_name")]
    pub name: String,
    /// Native token symbol (e.g., "ETH", "MATIC")
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    /// HTTP RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Interval between receipt polls (milliseconds)
    #[serde(default = "default_receipt_poll_interval")]
    pub receipt_poll_interval_ms: u64,
}

fn default_chain_id() -> u64 {
    1
}
fn default_name() -> String {
    "Ethereum".to_string()
}
fn default_native_symbol() -> String {
    "ETH".to_string()
}
fn default_rpc_url() -> String {
    "${RPC_URL}".to_string()
}
fn default_receipt_poll_interval() -> u64 {
    2000
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            name: default_name(),
            native_symbol: default_native_symbol(),
            rpc_url: default_rpc_url(),
            receipt_poll_interval_ms: default_receipt_poll_interval(),
        }
    }
}

impl ChainConfig {
    /// Network identity used for API host selection.
    pub fn network(&self) -> EvmNetwork {
        EvmNetwork::new(self.chain_id, &self.name, &self.native_symbol)
    }

    /// Switch to a known network, taking its name and native symbol with it.
    pub fn select_chain(&mut self, chain_id: u64) -> anyhow::Result<()> {
        let network = EvmNetwork::from_chain_id(chain_id)
            .ok_or_else(|| anyhow::anyhow!("Unknown chain ID {}", chain_id))?;
        self.chain_id = network.chain_id;
        self.name = network.name;
        self.native_symbol = network.native_symbol;
        Ok(())
    }

    /// Get receipt poll interval as Duration.
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// Expand environment variables in config values.
    pub fn expand_env_vars(&mut self) {
        self.rpc_url = expand_env(&self.rpc_url);
    }
}

/// Expand ${VAR_NAME} patterns with environment variable values.
pub(crate) fn expand_env(s: &str) -> String {
    let mut result = s.to_string();
    let re = match regex_lite::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return result,
    };

    for cap in re.captures_iter(s) {
        if let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) {
            if let Ok(value) = std::env::var(var_match.as_str()) {
                result = result.replace(full_match.as_str(), &value);
            }
        }
    }

    result
}
