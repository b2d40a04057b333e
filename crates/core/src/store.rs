//! Observable swap state.
//!
//! The orchestrator is the only writer. Presentation code subscribes and
//! sees every transition as a fresh [`SwapState`] snapshot.

use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::watch;
use zrx_swap_api::{SwapQuoteRequest, ZrxQuote};

/// Swap workflow state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwapState {
    /// Request behind the most recent successful price fetch
    pub latest_quote_request: Option<SwapQuoteRequest>,
    /// Firm quote awaiting execution
    pub final_quote: Option<ZrxQuote>,
    /// Token contract with an approval in flight (one at a time)
    pub in_progress_approval_contract: Option<Address>,
}

/// Shared handle to the swap state.
#[derive(Debug, Clone)]
pub struct SwapStore {
    state: Arc<watch::Sender<SwapState>>,
}

impl Default for SwapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SwapState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Receive a snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<SwapState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> SwapState {
        self.state.borrow().clone()
    }

    pub fn latest_quote_request(&self) -> Option<SwapQuoteRequest> {
        self.state.borrow().latest_quote_request.clone()
    }

    pub fn final_quote(&self) -> Option<ZrxQuote> {
        self.state.borrow().final_quote.clone()
    }

    pub fn in_progress_approval_contract(&self) -> Option<Address> {
        self.state.borrow().in_progress_approval_contract
    }

    pub fn set_final_quote(&self, quote: ZrxQuote) {
        self.state.send_modify(|state| state.final_quote = Some(quote));
    }

    pub fn set_latest_quote_request(&self, request: SwapQuoteRequest) {
        self.state
            .send_modify(|state| state.latest_quote_request = Some(request));
    }

    /// Mark `contract` as being approved, replacing any earlier marker.
    pub fn set_approval_in_progress(&self, contract: Address) {
        self.state
            .send_modify(|state| state.in_progress_approval_contract = Some(contract));
    }

    pub fn clear_approval_in_progress(&self) {
        self.state
            .send_modify(|state| state.in_progress_approval_contract = None);
    }

    /// Drop both the final quote and the latest request.
    pub fn clear_swap_quote(&self) {
        self.state.send_modify(|state| {
            state.final_quote = None;
            state.latest_quote_request = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zrx_swap_api::{SwapAmount, SwapAsset};

    fn request() -> SwapQuoteRequest {
        SwapQuoteRequest {
            sell_asset: SwapAsset::native("ETH", 18),
            buy_asset: SwapAsset::token("USDC", 6, Address::repeat_byte(0xa0)),
            amount: SwapAmount::Sell("1".to_string()),
            slippage_tolerance: 0.01,
            gas_price: 1,
        }
    }

    #[test]
    fn test_approval_slot_is_single() {
        let store = SwapStore::new();
        store.set_approval_in_progress(Address::repeat_byte(1));
        store.set_approval_in_progress(Address::repeat_byte(2));
        assert_eq!(
            store.in_progress_approval_contract(),
            Some(Address::repeat_byte(2))
        );

        store.clear_approval_in_progress();
        assert_eq!(store.in_progress_approval_contract(), None);
    }

    #[test]
    fn test_clear_swap_quote_keeps_approval() {
        let store = SwapStore::new();
        store.set_latest_quote_request(request());
        store.set_approval_in_progress(Address::repeat_byte(1));

        store.clear_swap_quote();

        let state = store.snapshot();
        assert_eq!(state.latest_quote_request, None);
        assert_eq!(state.final_quote, None);
        assert_eq!(
            state.in_progress_approval_contract,
            Some(Address::repeat_byte(1))
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let store = SwapStore::new();
        let mut rx = store.subscribe();

        store.set_latest_quote_request(request());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().latest_quote_request, Some(request()));

        store.clear_swap_quote();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().latest_quote_request, None);
    }
}
