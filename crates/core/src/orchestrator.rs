//! Swap orchestration: price, approve, quote, execute.
//!
//! State machine over [`SwapState`](crate::SwapState):
//!
//! ```text
//! idle -> priced (needs approval?) -> [approving -> approved] -> quoted -> executing -> idle
//! ```
//!
//! A response that fails validation leaves the state untouched.

use crate::error::SwapError;
use crate::store::SwapStore;
use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::AccessList;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use zrx_swap_api::{api_host, EvmNetwork, SwapQuoteRequest, ZrxClient, ZrxPrice, ZrxQuote};
use zrx_swap_chain::erc20::unlimited_approval;
use zrx_swap_chain::{SwapSigner, SwapTransaction};

/// Result of a successful price fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceOutcome {
    pub quote: ZrxPrice,
    /// Whether the taker's allowance for the sell token is below the sell amount
    pub needs_approval: bool,
}

/// Clears the approval marker however the approval future ends.
struct ApprovalGuard<'a> {
    store: &'a SwapStore,
}

impl Drop for ApprovalGuard<'_> {
    fn drop(&mut self) {
        self.store.clear_approval_in_progress();
    }
}

/// Sequences swap API calls and signer interactions.
pub struct SwapOrchestrator {
    client: ZrxClient,
    signer: Arc<dyn SwapSigner>,
    store: SwapStore,
    network: RwLock<EvmNetwork>,
}

impl std::fmt::Debug for SwapOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapOrchestrator")
            .field("client", &self.client)
            .field("signer", &self.signer)
            .field("network", &*self.network.read())
            .finish()
    }
}

impl SwapOrchestrator {
    pub fn new(
        client: ZrxClient,
        signer: Arc<dyn SwapSigner>,
        store: SwapStore,
        network: EvmNetwork,
    ) -> Self {
        Self {
            client,
            signer,
            store,
            network: RwLock::new(network),
        }
    }

    pub fn store(&self) -> &SwapStore {
        &self.store
    }

    /// Currently selected network.
    pub fn network(&self) -> EvmNetwork {
        self.network.read().clone()
    }

    /// Switch the active network. In-flight requests keep the network they started with.
    pub fn select_network(&self, network: EvmNetwork) {
        info!(chain_id = network.chain_id, name = %network.name, "Network selected");
        *self.network.write() = network;
    }

    /// Network for a new request, rejected early when the API does not serve it.
    fn swap_network(&self) -> Result<EvmNetwork, SwapError> {
        let network = self.network();
        api_host(&network, false)?;
        Ok(network)
    }

    async fn taker(&self) -> Result<Address, SwapError> {
        self.signer.resolve_address().await.map_err(SwapError::Signer)
    }

    /// Fetch an indicative price and check whether the sell token needs approval.
    ///
    /// Returns `Ok(None)` when the API response fails validation.
    #[instrument(skip_all, fields(sell = %request.sell_asset.symbol, buy = %request.buy_asset.symbol))]
    pub async fn fetch_price(
        &self,
        request: &SwapQuoteRequest,
    ) -> Result<Option<PriceOutcome>, SwapError> {
        let network = self.swap_network()?;
        let taker = self.taker().await?;

        let quote = match self.client.fetch_price(request, &network, taker).await? {
            Ok(quote) => quote,
            Err(e) => {
                warn!(error = %e, "Swap price API call didn't validate, did the 0x API change?");
                return Ok(None);
            }
        };

        let mut needs_approval = false;
        if quote.requires_allowance() {
            let allowance = self
                .signer
                .read_allowance(quote.sell_token_address, taker, quote.allowance_target)
                .await
                .map_err(SwapError::Signer)?;
            needs_approval = allowance < quote.sell_amount;

            debug!(
                token = %quote.sell_token_address,
                spender = %quote.allowance_target,
                allowance = %allowance,
                sell_amount = %quote.sell_amount,
                needs_approval,
                "Checked sell token allowance"
            );
        }

        self.store.set_latest_quote_request(request.clone());

        Ok(Some(PriceOutcome {
            quote,
            needs_approval,
        }))
    }

    /// Fetch a firm quote and store it as the final quote.
    ///
    /// Returns `Ok(None)` when the API response fails validation.
    #[instrument(skip_all, fields(sell = %request.sell_asset.symbol, buy = %request.buy_asset.symbol))]
    pub async fn fetch_quote(
        &self,
        request: &SwapQuoteRequest,
    ) -> Result<Option<ZrxQuote>, SwapError> {
        let network = self.swap_network()?;
        let taker = self.taker().await?;

        match self.client.fetch_quote(request, &network, taker).await? {
            Ok(quote) => {
                self.store.set_final_quote(quote.clone());
                Ok(Some(quote))
            }
            Err(e) => {
                warn!(error = %e, "Swap quote API call didn't validate, did the 0x API change?");
                Ok(None)
            }
        }
    }

    /// Grant `approval_target` an unlimited allowance on `asset_contract` and
    /// wait for it to be mined.
    ///
    /// Failures are logged, not returned. The in-progress marker is set
    /// before any I/O and cleared however this future ends, cancellation
    /// included.
    #[instrument(skip(self))]
    pub async fn approve_transfer(&self, asset_contract: Address, approval_target: Address) {
        self.store.set_approval_in_progress(asset_contract);
        let _guard = ApprovalGuard { store: &self.store };

        if let Err(e) = self.run_approval(asset_contract, approval_target).await {
            error!(error = %e, "Approval transaction failed");
        }
    }

    async fn run_approval(&self, asset_contract: Address, approval_target: Address) -> anyhow::Result<()> {
        let tx = unlimited_approval(asset_contract, approval_target);

        debug!(token = %asset_contract, spender = %approval_target, "Issuing approval transaction");
        let tx_hash = self.signer.submit_unconfirmed_transaction(tx).await?;

        let outcome = self.signer.await_confirmation(tx_hash).await?;
        if !outcome.success {
            anyhow::bail!("approval transaction {} reverted", tx_hash);
        }

        debug!(
            tx_hash = %tx_hash,
            block = outcome.block_number.unwrap_or(0),
            gas_used = outcome.gas_used,
            "Approval transaction mined"
        );
        Ok(())
    }

    /// Clear the stored quote, then sign and broadcast the quote's transaction.
    ///
    /// Does not wait for the swap to be mined.
    #[instrument(skip_all, fields(to = %quote.to, chain_id = quote.price.chain_id))]
    pub async fn execute_swap(&self, quote: &ZrxQuote) -> Result<B256, SwapError> {
        self.store.clear_swap_quote();

        let tx = swap_transaction(quote)?;
        let tx_hash = self
            .signer
            .submit_transaction(tx)
            .await
            .map_err(SwapError::Signer)?;

        info!(tx_hash = %tx_hash, "Swap transaction submitted");
        Ok(tx_hash)
    }

    /// Forget the latest request and any final quote.
    pub fn reset(&self) {
        self.store.clear_swap_quote();
    }
}

/// Type 1 (access-list, gas-priced) transaction carrying a firm quote.
fn swap_transaction(quote: &ZrxQuote) -> Result<SwapTransaction, SwapError> {
    let out_of_range = |field: &'static str, value: U256| SwapError::QuoteOutOfRange {
        field,
        value: value.to_string(),
    };

    if quote.gas > U256::from(u64::MAX) {
        return Err(out_of_range("gas", quote.gas));
    }
    if quote.price.gas_price > U256::from(u128::MAX) {
        return Err(out_of_range("gasPrice", quote.price.gas_price));
    }

    Ok(SwapTransaction {
        to: quote.to,
        data: quote.data.clone(),
        value: quote.price.value,
        gas_limit: Some(quote.gas.to::<u64>()),
        gas_price: Some(quote.price.gas_price.to::<u128>()),
        chain_id: Some(quote.price.chain_id),
        access_list: Some(AccessList::default()),
    })
}
