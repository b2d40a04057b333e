//! Configuration for the swap orchestrator.
//!
//! This module provides:
//! - API configuration (key, affiliate/fee parameters, timeouts)
//! - Chain configuration (network identity, RPC endpoint, receipt polling)
//! - Asset configuration (tokens that can be swapped by symbol)
//! - Swap defaults (slippage)

mod asset_config;
mod chain;
mod swap;

pub use asset_config::AssetConfig;
pub use chain::ChainConfig;
pub use swap::{ApiConfig, SwapConfig, SwapDefaults, DEFAULT_AFFILIATE_ADDRESS};
