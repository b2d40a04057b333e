//! Chain interaction layer for swaps.
//!
//! This crate provides:
//! - The `SwapSigner` capability trait the orchestrator depends on
//! - A local-key Alloy wallet implementing it
//! - ERC-20 bindings for allowance reads and approvals
//! - A request/response channel for EIP-712 signing prompts

pub mod erc20;
mod signer;
mod signing;
mod wallet;

pub use signer::{SwapSigner, SwapTransaction, TransactionOutcome, EIP2930_TX_TYPE};
pub use signing::{
    signing_channel, Eip712Domain, PendingSignature, SignTypedDataRequest, SigningClient,
    SigningError, SigningInbox, TypedData, TypedDataField,
};
pub use wallet::{WalletSigner, WalletSignerBuilder};
