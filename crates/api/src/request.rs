//! Swap quote requests and 0x API URL construction.

use crate::network::{api_host, EvmNetwork};
use crate::ZrxApiError;
use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{Address, U256};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Default affiliate fee taken on the buy token (0.5%).
pub const DEFAULT_SWAP_FEE: f64 = 0.005;

/// An asset on one side of a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapAsset {
    /// Ticker symbol (e.g., "ETH", "USDC")
    pub symbol: String,
    /// Token decimals
    pub decimals: u8,
    /// ERC-20 contract address; `None` for the network's native asset
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl SwapAsset {
    /// A native (non-contract) asset such as ETH.
    pub fn native(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            contract_address: None,
        }
    }

    /// An ERC-20 token.
    pub fn token(symbol: impl Into<String>, decimals: u8, contract_address: Address) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            contract_address: Some(contract_address),
        }
    }

    /// Identifier used in API requests: contract address when known, symbol otherwise.
    pub fn api_identifier(&self) -> String {
        match self.contract_address {
            Some(address) => address.to_string(),
            None => self.symbol.clone(),
        }
    }
}

/// The fixed side of a swap, as a human-readable decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapAmount {
    /// Sell exactly this much of the sell asset.
    Sell(String),
    /// Buy exactly this much of the buy asset.
    Buy(String),
}

impl SwapAmount {
    /// Query parameter naming the fixed side.
    pub fn field(&self) -> &'static str {
        match self {
            SwapAmount::Sell(_) => "sellAmount",
            SwapAmount::Buy(_) => "buyAmount",
        }
    }

    /// The human-readable amount.
    pub fn value(&self) -> &str {
        match self {
            SwapAmount::Sell(value) | SwapAmount::Buy(value) => value,
        }
    }
}

/// A request for an indicative price or firm quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuoteRequest {
    pub sell_asset: SwapAsset,
    pub buy_asset: SwapAsset,
    pub amount: SwapAmount,
    /// Slippage tolerance as a fraction (0.01 = 1%)
    pub slippage_tolerance: f64,
    /// Gas price in wei
    pub gas_price: u128,
}

impl SwapQuoteRequest {
    /// Asset whose decimals govern the fixed amount.
    pub fn amount_asset(&self) -> &SwapAsset {
        match self.amount {
            SwapAmount::Sell(_) => &self.sell_asset,
            SwapAmount::Buy(_) => &self.buy_asset,
        }
    }

    /// Fixed amount converted to the smallest unit of its asset.
    pub fn trade_amount(&self) -> Result<U256, ZrxApiError> {
        let value = self.amount.value();
        let invalid = |reason: String| ZrxApiError::InvalidAmount {
            field: self.amount.field(),
            value: value.to_string(),
            reason,
        };

        let decimals = self.amount_asset().decimals;
        if let Some((_, fraction)) = value.trim().split_once('.') {
            if fraction.len() > usize::from(decimals) {
                return Err(invalid(format!(
                    "fractional component exceeds {decimals} decimals"
                )));
            }
        }

        match parse_units(value, decimals) {
            Ok(ParseUnits::U256(amount)) => Ok(amount),
            Ok(ParseUnits::I256(_)) => Err(invalid("amount must not be negative".to_string())),
            Err(e) => Err(invalid(e.to_string())),
        }
    }
}

/// Swap API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapEndpoint {
    /// Indicative price (`/price`)
    Price,
    /// Firm, fillable quote (`/quote`)
    Quote,
}

impl SwapEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            SwapEndpoint::Price => "price",
            SwapEndpoint::Quote => "quote",
        }
    }
}

/// Affiliate and fee parameters attached to every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateParams {
    pub affiliate_address: Address,
    pub fee_recipient: Address,
    /// Fraction of the buy amount taken as fee
    pub buy_token_percentage_fee: f64,
}

impl AffiliateParams {
    /// Affiliate, recipient and fee all pointing at one address.
    pub fn new(recipient: Address) -> Self {
        Self {
            affiliate_address: recipient,
            fee_recipient: recipient,
            buy_token_percentage_fee: DEFAULT_SWAP_FEE,
        }
    }
}

/// Build a 0x API URL for a swap quote request.
///
/// Usable for both the `/price` and `/quote` endpoints. `extra_params` are
/// applied last and replace any base parameter with the same name. Fee
/// parameters are dropped when buying the native asset, since the API
/// rejects `buyTokenPercentageFee` for it.
pub fn build_request_url(
    endpoint: SwapEndpoint,
    request: &SwapQuoteRequest,
    network: &EvmNetwork,
    gated: bool,
    affiliate: Option<&AffiliateParams>,
    extra_params: &[(&str, String)],
) -> Result<Url, ZrxApiError> {
    let host = api_host(network, gated)?;
    let mut url = Url::parse(&format!("https://{host}/swap/v1/{}", endpoint.path()))
        .map_err(|e| ZrxApiError::InvalidUrl(e.to_string()))?;

    let trade_amount = request.trade_amount()?;
    let sell_token = request.sell_asset.api_identifier();
    let buy_token = request.buy_asset.api_identifier();
    let buying_native = network.is_native_token(&buy_token);

    let mut params: Vec<(&str, String)> = vec![
        ("sellToken", sell_token),
        ("buyToken", buy_token),
        ("gasPrice", request.gas_price.to_string()),
        ("slippagePercentage", request.slippage_tolerance.to_string()),
        (request.amount.field(), trade_amount.to_string()),
    ];

    if let Some(affiliate) = affiliate {
        params.push(("affiliateAddress", affiliate.affiliate_address.to_string()));
        if !buying_native {
            params.push(("feeRecipient", affiliate.fee_recipient.to_string()));
            params.push((
                "buyTokenPercentageFee",
                affiliate.buy_token_percentage_fee.to_string(),
            ));
        }
    }

    for (name, value) in extra_params {
        match params.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = value.clone(),
            None => params.push((*name, value.clone())),
        }
    }

    url.query_pairs_mut().extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    fn usdc() -> SwapAsset {
        SwapAsset::token("USDC", 6, USDC.parse().unwrap())
    }

    fn eth_to_usdc(amount: SwapAmount) -> SwapQuoteRequest {
        SwapQuoteRequest {
            sell_asset: SwapAsset::native("ETH", 18),
            buy_asset: usdc(),
            amount,
            slippage_tolerance: 0.01,
            gas_price: 30_000_000_000,
        }
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn affiliate() -> AffiliateParams {
        AffiliateParams::new(Address::repeat_byte(0x99))
    }

    #[test]
    fn test_sell_eth_for_usdc_on_mainnet() {
        let request = eth_to_usdc(SwapAmount::Sell("1.0".to_string()));
        let url = build_request_url(
            SwapEndpoint::Price,
            &request,
            &EvmNetwork::ethereum(),
            false,
            Some(&affiliate()),
            &[],
        )
        .unwrap();

        assert_eq!(url.host_str(), Some("api.0x.org"));
        assert_eq!(url.path(), "/swap/v1/price");

        let params = query(&url);
        assert_eq!(params["sellToken"], "ETH");
        assert_eq!(params["buyToken"], USDC);
        assert_eq!(params["sellAmount"], "1000000000000000000");
        assert_eq!(params["slippagePercentage"], "0.01");
        assert_eq!(params["gasPrice"], "30000000000");
        assert!(!params.contains_key("buyAmount"));
        assert!(params.contains_key("feeRecipient"));
        assert_eq!(params["buyTokenPercentageFee"], "0.005");
    }

    #[test]
    fn test_buy_amount_uses_buy_asset_decimals() {
        let request = eth_to_usdc(SwapAmount::Buy("250.5".to_string()));
        let url = build_request_url(
            SwapEndpoint::Quote,
            &request,
            &EvmNetwork::ethereum(),
            false,
            None,
            &[],
        )
        .unwrap();

        let params = query(&url);
        assert_eq!(url.path(), "/swap/v1/quote");
        assert_eq!(params["buyAmount"], "250500000");
        assert!(!params.contains_key("sellAmount"));
    }

    #[test]
    fn test_fee_params_dropped_when_buying_native() {
        let request = SwapQuoteRequest {
            sell_asset: usdc(),
            buy_asset: SwapAsset::native("ETH", 18),
            amount: SwapAmount::Sell("100".to_string()),
            slippage_tolerance: 0.005,
            gas_price: 1,
        };
        let url = build_request_url(
            SwapEndpoint::Price,
            &request,
            &EvmNetwork::ethereum(),
            false,
            Some(&affiliate()),
            &[],
        )
        .unwrap();

        let params = query(&url);
        assert_eq!(params["sellAmount"], "100000000");
        assert!(params.contains_key("affiliateAddress"));
        assert!(!params.contains_key("feeRecipient"));
        assert!(!params.contains_key("buyTokenPercentageFee"));
    }

    #[test]
    fn test_unsupported_chain_fails_before_amount_parsing() {
        let request = eth_to_usdc(SwapAmount::Sell("not a number".to_string()));
        let err = build_request_url(
            SwapEndpoint::Price,
            &request,
            &EvmNetwork::new(10, "Optimism", "ETH"),
            false,
            None,
            &[],
        )
        .unwrap_err();

        assert!(matches!(err, ZrxApiError::UnsupportedNetwork { chain_id: 10, .. }));
    }

    #[test]
    fn test_gated_host_and_extra_params() {
        let request = eth_to_usdc(SwapAmount::Sell("0.25".to_string()));
        let taker = Address::repeat_byte(0x11);
        let url = build_request_url(
            SwapEndpoint::Quote,
            &request,
            &EvmNetwork::polygon(),
            true,
            None,
            &[
                ("intentOnFilling", "true".to_string()),
                ("takerAddress", taker.to_string()),
            ],
        )
        .unwrap();

        assert_eq!(url.host_str(), Some("gated.polygon.api.0x.org"));
        let params = query(&url);
        assert_eq!(params["intentOnFilling"], "true");
        assert_eq!(params["takerAddress"], taker.to_string());
        assert_eq!(params["sellAmount"], "250000000000000000");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let request = eth_to_usdc(SwapAmount::Sell("-1".to_string()));
        let err = request.trade_amount().unwrap_err();
        assert!(matches!(
            err,
            ZrxApiError::InvalidAmount { field: "sellAmount", .. }
        ));
    }

    #[test]
    fn test_excess_fraction_digits_rejected() {
        let request = eth_to_usdc(SwapAmount::Buy("1.1234567".to_string()));
        let err = request.trade_amount().unwrap_err();
        assert!(matches!(
            err,
            ZrxApiError::InvalidAmount { field: "buyAmount", .. }
        ));

        let request = eth_to_usdc(SwapAmount::Buy("1.123456".to_string()));
        assert_eq!(request.trade_amount().unwrap(), U256::from(1_123_456u64));
    }

    #[test]
    fn test_api_identifier() {
        assert_eq!(SwapAsset::native("ETH", 18).api_identifier(), "ETH");
        assert_eq!(usdc().api_identifier(), USDC);
    }
}
