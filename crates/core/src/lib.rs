//! Swap orchestration core.
//!
//! This crate provides:
//! - `SwapOrchestrator`: price, approval, quote and execution sequencing
//! - `SwapStore`: observable swap state with a single-writer discipline
//! - Configuration loading (TOML + environment)

pub mod config;
mod error;
mod orchestrator;
mod store;

pub use config::{ApiConfig, AssetConfig, ChainConfig, SwapConfig, SwapDefaults};
pub use error::SwapError;
pub use orchestrator::{PriceOutcome, SwapOrchestrator};
pub use store::{SwapState, SwapStore};
