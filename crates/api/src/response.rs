//! 0x price and quote response schemas.
//!
//! Responses are only trusted after passing [`validate_price`] or
//! [`validate_quote`]: every required field must be present and typed,
//! addresses must parse, and amounts must be base-10 unsigned integers.

use crate::ValidationError;
use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer};

/// Liquidity source contributing to a price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceSource {
    pub name: String,
    /// Share of the fill routed through this source ("0".."1")
    pub proportion: String,
}

/// Indicative price from `/swap/v1/price`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZrxPrice {
    pub chain_id: u64,
    pub price: String,
    pub sell_token_address: Address,
    #[serde(deserialize_with = "decimal_u256")]
    pub sell_amount: U256,
    pub buy_token_address: Address,
    #[serde(deserialize_with = "decimal_u256")]
    pub buy_amount: U256,
    /// Spender that must be approved for the sell token (zero address for native sells)
    pub allowance_target: Address,
    #[serde(deserialize_with = "decimal_u256")]
    pub gas_price: U256,
    #[serde(deserialize_with = "decimal_u256")]
    pub estimated_gas: U256,
    #[serde(deserialize_with = "decimal_u256")]
    pub value: U256,
    pub sources: Vec<PriceSource>,
}

impl ZrxPrice {
    /// Whether the sell side needs an ERC-20 allowance at all.
    pub fn requires_allowance(&self) -> bool {
        self.allowance_target != Address::ZERO
    }

    /// Sources actually used (non-zero proportion).
    pub fn active_sources(&self) -> impl Iterator<Item = &PriceSource> {
        self.sources
            .iter()
            .filter(|s| s.proportion.parse::<f64>().map(|p| p > 0.0).unwrap_or(false))
    }
}

/// Firm, fillable quote from `/swap/v1/quote`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZrxQuote {
    #[serde(flatten)]
    pub price: ZrxPrice,
    /// Transaction destination (the 0x exchange proxy)
    pub to: Address,
    /// Transaction calldata
    pub data: Bytes,
    /// Gas limit for the swap transaction
    #[serde(deserialize_with = "decimal_u256")]
    pub gas: U256,
    pub guaranteed_price: String,
}

/// Validate a `/price` response body.
pub fn validate_price(body: serde_json::Value) -> Result<ZrxPrice, ValidationError> {
    serde_json::from_value(body).map_err(|e| ValidationError::new("price", e.to_string()))
}

/// Validate a `/quote` response body.
pub fn validate_quote(body: serde_json::Value) -> Result<ZrxQuote, ValidationError> {
    let quote: ZrxQuote =
        serde_json::from_value(body).map_err(|e| ValidationError::new("quote", e.to_string()))?;

    if quote.gas.is_zero() {
        return Err(ValidationError::new("quote", "gas limit is zero"));
    }
    if quote.gas > U256::from(u64::MAX) {
        return Err(ValidationError::new("quote", "gas limit exceeds u64"));
    }

    Ok(quote)
}

fn decimal_u256<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(serde::de::Error::custom(format!(
            "expected decimal integer string, got {raw:?}"
        )));
    }
    U256::from_str_radix(&raw, 10).map_err(serde::de::Error::custom)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_validate_price() {
        let price = validate_price(price_json()).unwrap();

        assert_eq!(price.chain_id, 1);
        assert_eq!(price.sell_amount, U256::from(1_850_000_000_000_000_000_000u128));
        assert_eq!(price.buy_amount, U256::from(1_850_120_000u64));
        assert!(price.requires_allowance());
        assert_eq!(price.active_sources().count(), 2);
    }

    #[test]
    fn test_price_missing_field_rejected() {
        let mut body = price_json();
        body.as_object_mut().unwrap().remove("allowanceTarget");

        let err = validate_price(body).unwrap_err();
        assert_eq!(err.kind, "price");
        assert!(err.reason.contains("allowanceTarget"));
    }

    #[test]
    fn test_price_hex_amount_rejected() {
        let mut body = price_json();
        body["sellAmount"] = "0x1bc16d674ec80000".into();

        assert!(validate_price(body).is_err());
    }

    #[test]
    fn test_price_numeric_amount_rejected() {
        let mut body = price_json();
        body["buyAmount"] = serde_json::json!(1850120000u64);

        assert!(validate_price(body).is_err());
    }

    #[test]
    fn test_validate_quote() {
        let quote = validate_quote(quote_json()).unwrap();

        assert_eq!(quote.gas, U256::from(180_000u64));
        assert_eq!(quote.data.as_ref(), &[0xd9, 0x62, 0x7a, 0xa4]);
        assert_eq!(quote.price.chain_id, 1);
        assert_eq!(quote.guaranteed_price, "1831.6");
    }

    #[test]
    fn test_price_is_not_a_quote() {
        let err = validate_quote(price_json()).unwrap_err();
        assert_eq!(err.kind, "quote");
    }

    #[test]
    fn test_native_sell_needs_no_allowance() {
        let mut body = price_json();
        body["allowanceTarget"] = "0x0000000000000000000000000000000000000000".into();

        let price = validate_price(body).unwrap();
        assert!(!price.requires_allowance());
    }
}
