//! In-memory chain used by the workflow tests.

use crate::{
    client::{ChainClient, TxReceipt, ViewCall, WriteCall},
    error::{ChainError, ChainResult},
};
use alloy::{
    primitives::{Address, B256, U256},
    transports::TransportErrorKind,
};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Recorded {
    View(Address, ViewCall),
    Estimate(Address, WriteCall, Address),
    Send(Address, WriteCall, Address, u64),
}

/// How a write method should misbehave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Fault {
    #[default]
    None,
    /// The dry run fails with a transport error.
    EstimateNetwork,
    /// The transaction is mined but reverts.
    SendReverts,
}

#[derive(Debug)]
pub(crate) struct StubChain {
    pub decimals: U256,
    pub balance: U256,
    pub approve_estimate: u64,
    pub supply_estimate: u64,
    pub approve_fault: Fault,
    pub supply_fault: Fault,
    pub decimals_unreachable: bool,
    allowance: Mutex<U256>,
    supplied: Mutex<U256>,
    calls: Mutex<Vec<Recorded>>,
}

impl StubChain {
    pub(crate) fn new(decimals: u8, balance: u64) -> Self {
        Self {
            decimals: U256::from(decimals),
            balance: U256::from(balance),
            approve_estimate: 46_117,
            supply_estimate: 213_450,
            approve_fault: Fault::None,
            supply_fault: Fault::None,
            decimals_unreachable: false,
            allowance: Mutex::new(U256::ZERO),
            supplied: Mutex::new(U256::ZERO),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn allowance(&self) -> U256 {
        *self.allowance.lock().unwrap()
    }

    pub(crate) fn supplied(&self) -> U256 {
        *self.supplied.lock().unwrap()
    }

    /// Write calls seen by `estimate_gas` or `send_signed`.
    pub(crate) fn write_calls(&self) -> Vec<Recorded> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Recorded::View(..)))
            .collect()
    }

    pub(crate) fn sent(&self) -> Vec<(WriteCall, u64)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::Send(_, call, _, gas_limit) => Some((call, gas_limit)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Recorded) {
        self.calls.lock().unwrap().push(call);
    }

    fn fault_for(&self, call: &WriteCall) -> Fault {
        match call {
            WriteCall::Approve { .. } => self.approve_fault,
            WriteCall::Supply { .. } => self.supply_fault,
        }
    }

    fn tx_hash(&self) -> B256 {
        B256::with_last_byte(self.calls.lock().unwrap().len() as u8)
    }
}

#[async_trait]
impl ChainClient for StubChain {
    async fn call_view(&self, contract: Address, call: &ViewCall) -> ChainResult<U256> {
        self.record(Recorded::View(contract, call.clone()));
        match call {
            ViewCall::Decimals if self.decimals_unreachable => {
                Err(TransportErrorKind::custom_str("connection refused").into())
            }
            ViewCall::Decimals => Ok(self.decimals),
            ViewCall::BalanceOf { .. } => Ok(self.balance),
            ViewCall::Allowance { .. } => Ok(self.allowance()),
        }
    }

    async fn estimate_gas(
        &self,
        contract: Address,
        call: &WriteCall,
        from: Address,
    ) -> ChainResult<u64> {
        self.record(Recorded::Estimate(contract, call.clone(), from));
        if self.fault_for(call) == Fault::EstimateNetwork {
            return Err(TransportErrorKind::custom_str("connection reset by peer").into());
        }
        Ok(match call {
            WriteCall::Approve { .. } => self.approve_estimate,
            WriteCall::Supply { .. } => self.supply_estimate,
        })
    }

    async fn send_signed(
        &self,
        contract: Address,
        call: &WriteCall,
        from: Address,
        gas_limit: u64,
    ) -> ChainResult<TxReceipt> {
        self.record(Recorded::Send(contract, call.clone(), from, gas_limit));
        let transaction_hash = self.tx_hash();
        if self.fault_for(call) == Fault::SendReverts {
            return Err(ChainError::Reverted {
                tx_hash: transaction_hash,
            });
        }
        match call {
            // approve overwrites, it does not add
            WriteCall::Approve { amount, .. } => *self.allowance.lock().unwrap() = *amount,
            WriteCall::Supply { amount, .. } => {
                let mut allowance = self.allowance.lock().unwrap();
                *allowance = allowance.saturating_sub(*amount);
                *self.supplied.lock().unwrap() += *amount;
            }
        }
        Ok(TxReceipt {
            transaction_hash,
            block_number: Some(1),
            gas_used: Some(gas_limit / 2),
        })
    }
}
