//! Local-key wallet implementing [`SwapSigner`] over an HTTP RPC endpoint.
//! Uses Alloy providers for type-safe RPC interactions.

use crate::erc20::IERC20;
use crate::signer::{SwapSigner, SwapTransaction, TransactionOutcome};
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default interval between receipt polls.
const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Builder for [`WalletSigner`].
pub struct WalletSignerBuilder {
    rpc_url: String,
    chain_id: u64,
    poll_interval: Option<Duration>,
}

impl WalletSignerBuilder {
    /// Create a new builder.
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            poll_interval: None,
        }
    }

    /// Set the receipt polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Build the signer, verifying the endpoint serves the configured chain.
    pub async fn build(self, private_key: &str) -> Result<WalletSigner> {
        // Parse private key (with or without 0x prefix)
        let key_str = private_key.trim_start_matches("0x");
        let signer: PrivateKeySigner = key_str.parse()?;
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let remote_chain_id = provider.get_chain_id().await?;
        if remote_chain_id != self.chain_id {
            anyhow::bail!(
                "RPC endpoint serves chain {} but chain {} is configured",
                remote_chain_id,
                self.chain_id
            );
        }

        info!(
            address = %address,
            chain_id = self.chain_id,
            "Wallet signer initialized"
        );

        Ok(WalletSigner {
            rpc_url: self.rpc_url,
            wallet,
            address,
            chain_id: self.chain_id,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_RECEIPT_POLL_INTERVAL),
        })
    }
}

/// Wallet backed by a local private key.
pub struct WalletSigner {
    rpc_url: String,
    wallet: EthereumWallet,
    address: Address,
    chain_id: u64,
    poll_interval: Duration,
}

impl WalletSigner {
    /// Create a signer with the default receipt polling interval.
    pub async fn new(private_key: &str, rpc_url: &str, chain_id: u64) -> Result<Self> {
        WalletSignerBuilder::new(rpc_url, chain_id)
            .build(private_key)
            .await
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Current legacy gas price in wei.
    pub async fn gas_price(&self) -> Result<u128> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        Ok(provider.get_gas_price().await?)
    }

    async fn broadcast(&self, tx: SwapTransaction) -> Result<B256> {
        debug!(
            to = %tx.to,
            calldata_len = tx.data.len(),
            value = %tx.value,
            "Preparing transaction"
        );

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .on_http(self.rpc_url.parse()?);

        let pending = provider.send_transaction(tx.into_request(self.address)).await?;
        Ok(*pending.tx_hash())
    }
}

#[async_trait]
impl SwapSigner for WalletSigner {
    async fn resolve_address(&self) -> Result<Address> {
        Ok(self.address)
    }

    #[instrument(skip(self, tx), fields(to = %tx.to))]
    async fn submit_transaction(&self, tx: SwapTransaction) -> Result<B256> {
        let tx_hash = self.broadcast(tx).await?;

        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        if provider.get_transaction_by_hash(tx_hash).await?.is_none() {
            warn!(tx_hash = %tx_hash, "Submitted transaction not yet visible on node");
        }

        info!(tx_hash = %tx_hash, "Transaction submitted");
        Ok(tx_hash)
    }

    #[instrument(skip(self, tx), fields(to = %tx.to))]
    async fn submit_unconfirmed_transaction(&self, tx: SwapTransaction) -> Result<B256> {
        let tx_hash = self.broadcast(tx).await?;
        info!(tx_hash = %tx_hash, "Transaction submitted (unchecked)");
        Ok(tx_hash)
    }

    async fn await_confirmation(&self, hash: B256) -> Result<TransactionOutcome> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            interval.tick().await;

            if let Some(receipt) = provider.get_transaction_receipt(hash).await? {
                let outcome = TransactionOutcome {
                    hash,
                    success: receipt.status(),
                    block_number: receipt.block_number,
                    gas_used: u128::from(receipt.gas_used),
                };
                debug!(
                    tx_hash = %hash,
                    success = outcome.success,
                    block = outcome.block_number.unwrap_or(0),
                    "Transaction mined"
                );
                return Ok(outcome);
            }
        }
    }

    async fn read_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.parse()?);
        let contract = IERC20::new(token, &provider);
        let allowance = contract.allowance(owner, spender).call().await?;
        Ok(allowance._0)
    }
}

impl std::fmt::Debug for WalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSigner")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_signer_creation() {
        let signer = WalletSigner::new(TEST_KEY, "https://eth.llamarpc.com", 1)
            .await
            .unwrap();

        assert_eq!(
            format!("{:?}", signer.address()).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(signer.resolve_address().await.unwrap(), signer.address());
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_read_allowance() {
        let signer = WalletSigner::new(TEST_KEY, "https://eth.llamarpc.com", 1)
            .await
            .unwrap();
        let usdc: Address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse().unwrap();

        let allowance = signer
            .read_allowance(usdc, signer.address(), Address::repeat_byte(0xde))
            .await
            .unwrap();
        assert!(allowance.is_zero());
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_chain_mismatch_rejected() {
        let result = WalletSigner::new(TEST_KEY, "https://eth.llamarpc.com", 137).await;
        assert!(result.is_err());
    }
}
