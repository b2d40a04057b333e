//! 0x swap API client.
//!
//! This crate provides:
//! - Chain id to API host mapping (`/swap/v1` on Ethereum and Polygon)
//! - Swap quote request model with a tagged sell/buy amount
//! - URL construction for the `/price` and `/quote` endpoints
//! - Strict validation of price and quote responses
//! - An HTTP client over a pluggable JSON transport

mod client;
mod error;
mod network;
mod request;
mod response;

pub use reqwest::Url;

pub use client::{ApiCredentials, HttpTransport, JsonTransport, ZrxClient};
pub use error::{ValidationError, ZrxApiError};
pub use network::{api_host, EvmNetwork, ETHEREUM_CHAIN_ID, POLYGON_CHAIN_ID};
pub use request::{
    build_request_url, AffiliateParams, SwapAmount, SwapAsset, SwapEndpoint, SwapQuoteRequest,
    DEFAULT_SWAP_FEE,
};
pub use response::{validate_price, validate_quote, PriceSource, ZrxPrice, ZrxQuote};
