//! Error types for the 0x API client.

use thiserror::Error;

/// Errors raised while building or issuing a swap API request.
#[derive(Error, Debug)]
pub enum ZrxApiError {
    #[error("Swaps not supported on {name} (chain id {chain_id})")]
    UnsupportedNetwork { chain_id: u64, name: String },

    #[error("Invalid {field} amount {value:?}: {reason}")]
    InvalidAmount {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Swap API transport error: {0}")]
    Transport(#[source] anyhow::Error),
}

/// A swap API response did not match the expected schema.
///
/// Non-fatal: callers log it and treat the response as absent.
#[derive(Error, Debug)]
#[error("{kind} response failed validation: {reason}")]
pub struct ValidationError {
    /// Which response was being validated ("price" or "quote").
    pub kind: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}
