//! Signer/provider capability used by the swap orchestrator.
//!
//! The orchestrator never talks to a node directly. Everything it needs from
//! a wallet (the active address, transaction submission, receipts, and the
//! one read-only call it makes) goes through [`SwapSigner`], so tests can
//! substitute a fake and other wallets can plug in their own backend.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::rpc::types::{AccessList, TransactionRequest};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// EIP-2930 access-list transaction type.
pub const EIP2930_TX_TYPE: u8 = 1;

/// Transaction fields the orchestrator asks a signer to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTransaction {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    /// Gas limit; filled by the provider when absent
    pub gas_limit: Option<u64>,
    /// Gas price in wei; filled by the provider when absent
    pub gas_price: Option<u128>,
    pub chain_id: Option<u64>,
    /// Sent as an EIP-2930 (type 1) transaction when set together with `gas_price`
    pub access_list: Option<AccessList>,
}

impl SwapTransaction {
    /// A zero-value contract call.
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            data,
            value: U256::ZERO,
            gas_limit: None,
            gas_price: None,
            chain_id: None,
            access_list: None,
        }
    }

    /// Convert into an alloy request sent from `from`.
    pub fn into_request(self, from: Address) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_to(self.to)
            .with_input(self.data)
            .with_value(self.value);

        if let Some(gas_limit) = self.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }
        if let Some(gas_price) = self.gas_price {
            tx = tx.with_gas_price(gas_price);
        }
        if let Some(chain_id) = self.chain_id {
            tx = tx.with_chain_id(chain_id);
        }
        if let Some(access_list) = self.access_list {
            tx = tx.with_access_list(access_list);
            if tx.gas_price.is_some() {
                tx.transaction_type = Some(EIP2930_TX_TYPE);
            }
        }

        tx
    }
}

/// A mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub hash: B256,
    /// Whether execution succeeded (receipt status)
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u128,
}

/// Wallet capabilities needed to price, approve and execute swaps.
#[async_trait]
pub trait SwapSigner: Send + Sync + Debug {
    /// Address of the active account.
    async fn resolve_address(&self) -> Result<Address>;

    /// Sign and broadcast, confirming the node accepted the transaction.
    async fn submit_transaction(&self, tx: SwapTransaction) -> Result<B256>;

    /// Sign and broadcast, returning the hash without checking it back.
    async fn submit_unconfirmed_transaction(&self, tx: SwapTransaction) -> Result<B256>;

    /// Wait until `hash` is mined. No timeout is applied.
    async fn await_confirmation(&self, hash: B256) -> Result<TransactionOutcome>;

    /// Read-only `allowance(owner, spender)` call on an ERC-20 token.
    async fn read_allowance(&self, token: Address, owner: Address, spender: Address)
        -> Result<U256>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_request_sets_optional_fields() {
        let tx = SwapTransaction {
            to: Address::repeat_byte(1),
            data: Bytes::from(vec![0xde, 0xad]),
            value: U256::from(5u64),
            gas_limit: Some(210_000),
            gas_price: Some(30_000_000_000),
            chain_id: Some(137),
            access_list: None,
        };

        let request = tx.into_request(Address::repeat_byte(2));
        assert_eq!(request.from, Some(Address::repeat_byte(2)));
        assert_eq!(request.gas, Some(210_000));
        assert_eq!(request.gas_price, Some(30_000_000_000));
        assert_eq!(request.chain_id, Some(137));
        assert_eq!(request.value, Some(U256::from(5u64)));
        assert_eq!(request.transaction_type, None);
    }

    #[test]
    fn test_access_list_with_gas_price_is_type_one() {
        let tx = SwapTransaction {
            gas_price: Some(30_000_000_000),
            access_list: Some(AccessList::default()),
            ..SwapTransaction::call(Address::repeat_byte(1), Bytes::new())
        };

        let request = tx.into_request(Address::repeat_byte(2));
        assert_eq!(request.transaction_type, Some(EIP2930_TX_TYPE));
        assert_eq!(request.access_list, Some(AccessList::default()));
        assert_eq!(request.gas_price, Some(30_000_000_000));
    }

    #[test]
    fn test_call_leaves_gas_to_provider() {
        let request = SwapTransaction::call(Address::ZERO, Bytes::new()).into_request(Address::ZERO);
        assert_eq!(request.gas, None);
        assert_eq!(request.gas_price, None);
        assert_eq!(request.value, Some(U256::ZERO));
    }
}
