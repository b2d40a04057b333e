//! Errors surfaced by the swap orchestrator.

use thiserror::Error;
use zrx_swap_api::ZrxApiError;

/// Failures that reach the caller.
///
/// Response validation failures and approval failures are not here: they
/// are logged and degrade to "no result" / "not approving".
#[derive(Error, Debug)]
pub enum SwapError {
    #[error(transparent)]
    Api(#[from] ZrxApiError),

    #[error("Signer error: {0}")]
    Signer(#[source] anyhow::Error),

    #[error("Quote field {field} out of range: {value}")]
    QuoteOutOfRange { field: &'static str, value: String },
}

impl SwapError {
    /// Whether the active network has no swap API.
    pub fn is_unsupported_network(&self) -> bool {
        matches!(self, SwapError::Api(ZrxApiError::UnsupportedNetwork { .. }))
    }
}
