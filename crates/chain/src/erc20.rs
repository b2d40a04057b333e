//! ERC-20 bindings used by the swap flow.

use crate::signer::SwapTransaction;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    /// Standard ERC20 interface (subset for swap approvals)
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Encode `approve(spender, amount)` calldata.
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    Bytes::from(IERC20::approveCall { spender, amount }.abi_encode())
}

/// Transaction granting `spender` an unlimited allowance on `token`.
pub fn unlimited_approval(token: Address, spender: Address) -> SwapTransaction {
    SwapTransaction::call(token, encode_approve(spender, U256::MAX))
}
