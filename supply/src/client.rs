//! The network seam the deposit workflow talks through.

use crate::{
    abi::{self, MethodSpec, IERC20, IPool},
    error::ChainResult,
};
use alloy::{
    primitives::{Address, B256, U256},
    sol_types::SolCall,
};
use async_trait::async_trait;

/// Read-only token queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewCall {
    Decimals,
    BalanceOf { account: Address },
    Allowance { owner: Address, spender: Address },
}

impl ViewCall {
    pub fn method(&self) -> &'static MethodSpec {
        match self {
            ViewCall::Decimals => &abi::ERC20_DECIMALS,
            ViewCall::BalanceOf { .. } => &abi::ERC20_BALANCE_OF,
            ViewCall::Allowance { .. } => &abi::ERC20_ALLOWANCE,
        }
    }
}

/// State-changing calls, each signed by the wallet and mined before returning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteCall {
    Approve {
        spender: Address,
        amount: U256,
    },
    Supply {
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    },
}

impl WriteCall {
    pub fn method(&self) -> &'static MethodSpec {
        match self {
            WriteCall::Approve { .. } => &abi::ERC20_APPROVE,
            WriteCall::Supply { .. } => &abi::POOL_SUPPLY,
        }
    }

    pub fn calldata(&self) -> Vec<u8> {
        match *self {
            WriteCall::Approve { spender, amount } => {
                IERC20::approveCall { spender, amount }.abi_encode()
            }
            WriteCall::Supply {
                asset,
                amount,
                on_behalf_of,
                referral_code,
            } => IPool::supplyCall {
                asset,
                amount,
                onBehalfOf: on_behalf_of,
                referralCode: referral_code,
            }
            .abi_encode(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

/// Resolves contract calls and submits signed transactions.
///
/// Views return their single output widened to `U256`; callers narrow it
/// against the method's declared return type.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn call_view(&self, contract: Address, call: &ViewCall) -> ChainResult<U256>;

    async fn estimate_gas(
        &self,
        contract: Address,
        call: &WriteCall,
        from: Address,
    ) -> ChainResult<u64>;

    /// Signs, submits and waits for the receipt. A mined but reverted
    /// transaction is an error.
    async fn send_signed(
        &self,
        contract: Address,
        call: &WriteCall,
        from: Address,
        gas_limit: u64,
    ) -> ChainResult<TxReceipt>;
}
