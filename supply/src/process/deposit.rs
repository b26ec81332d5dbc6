//! Handles the approve-then-supply deposit.
//!
//! The run is strictly linear: decimals, amount, balance, approve, supply.
//! Each stage only starts after the previous one fully resolved, and the first
//! failure ends the run without touching later stages. In particular `supply`
//! is never submitted unless this same run mined an `approve` for the amount.
use crate::{
    abi,
    client::{ChainClient, TxReceipt, ViewCall, WriteCall},
    config::DepositParams,
    error::{ChainError, Stage, SupplyError},
    math::{GasPlan, TokenAmount},
};
use alloy::primitives::Address;
use tracing::{info, warn};

/// A mined transaction together with the gas it was submitted with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedTx {
    pub gas: GasPlan,
    pub receipt: TxReceipt,
}

/// Everything a completed run learned and did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    pub wallet: Address,
    pub decimals: u8,
    pub amount: TokenAmount,
    pub balance: TokenAmount,
    pub approval: SubmittedTx,
    pub supply: SubmittedTx,
}

/// Read-only view of the wallet's standing with the token and the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenPosition {
    pub decimals: u8,
    pub balance: TokenAmount,
    pub allowance: TokenAmount,
}

#[derive(Debug)]
pub struct DepositWorkflow<C> {
    client: C,
    params: DepositParams,
    wallet: Address,
}

impl<C: ChainClient> DepositWorkflow<C> {
    pub fn new(client: C, params: DepositParams, wallet: Address) -> Result<Self, SupplyError> {
        abi::validate_bindings()?;
        params.validate()?;
        Ok(Self {
            client,
            params,
            wallet,
        })
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn params(&self) -> &DepositParams {
        &self.params
    }

    pub async fn run(&self) -> Result<DepositReceipt, SupplyError> {
        info!(wallet = %self.wallet, "Starting approval and deposit process");

        let decimals = self.resolve_decimals().await?;
        info!(decimals, "Token decimals resolved");

        let amount = self.target_amount(decimals)?;
        info!(raw = %amount.raw(), amount = %amount, "Deposit amount computed");

        let balance = self.check_balance(&amount).await?;

        info!(
            amount = %amount,
            pool = %self.params.pool_address,
            "Approving pool to spend tokens"
        );
        let approval = self
            .submit(
                self.params.token_address,
                WriteCall::Approve {
                    spender: self.params.pool_address,
                    amount: amount.raw(),
                },
            )
            .await
            .map_err(SupplyError::ApprovalFailed)?;
        info!(tx = %approval.receipt.transaction_hash, "Approval transaction successful");

        info!(amount = %amount, "Supplying tokens to pool");
        let supply = self
            .submit(
                self.params.pool_address,
                WriteCall::Supply {
                    asset: self.params.token_address,
                    amount: amount.raw(),
                    on_behalf_of: self.wallet,
                    referral_code: self.params.referral_code,
                },
            )
            .await
            .map_err(SupplyError::SupplyFailed)?;
        info!(tx = %supply.receipt.transaction_hash, "Deposit transaction successful");

        info!("Process completed successfully");
        Ok(DepositReceipt {
            wallet: self.wallet,
            decimals,
            amount,
            balance,
            approval,
            supply,
        })
    }

    /// Decimals, balance and the allowance currently granted to the pool.
    pub async fn position(&self) -> Result<TokenPosition, SupplyError> {
        let decimals = self.resolve_decimals().await?;
        let balance = self
            .client
            .call_view(
                self.params.token_address,
                &ViewCall::BalanceOf {
                    account: self.wallet,
                },
            )
            .await
            .map_err(SupplyError::unexpected(Stage::Balance))?;
        let allowance = self
            .client
            .call_view(
                self.params.token_address,
                &ViewCall::Allowance {
                    owner: self.wallet,
                    spender: self.params.pool_address,
                },
            )
            .await
            .map_err(SupplyError::unexpected(Stage::Allowance))?;
        Ok(TokenPosition {
            decimals,
            balance: TokenAmount::from_raw(balance, decimals),
            allowance: TokenAmount::from_raw(allowance, decimals),
        })
    }

    async fn resolve_decimals(&self) -> Result<u8, SupplyError> {
        let value = self
            .client
            .call_view(self.params.token_address, &ViewCall::Decimals)
            .await
            .map_err(SupplyError::unexpected(Stage::Decimals))?;
        match u8::try_from(value) {
            Ok(decimals) if decimals <= self.params.max_decimals => Ok(decimals),
            _ => Err(SupplyError::DecimalsOutOfRange {
                decimals: value,
                max: self.params.max_decimals,
            }),
        }
    }

    fn target_amount(&self, decimals: u8) -> Result<TokenAmount, SupplyError> {
        TokenAmount::from_whole_units(self.params.target_whole_units, decimals).ok_or(
            SupplyError::AmountOverflow {
                whole_units: self.params.target_whole_units,
                decimals,
            },
        )
    }

    async fn check_balance(&self, required: &TokenAmount) -> Result<TokenAmount, SupplyError> {
        let raw = self
            .client
            .call_view(
                self.params.token_address,
                &ViewCall::BalanceOf {
                    account: self.wallet,
                },
            )
            .await
            .map_err(SupplyError::unexpected(Stage::Balance))?;
        let balance = TokenAmount::from_raw(raw, required.decimals());
        info!(balance = %balance, "Token balance");

        if balance < *required {
            let shortfall = balance.shortfall(required);
            warn!(
                balance = %balance,
                required = %required,
                shortfall = %TokenAmount::from_raw(shortfall, required.decimals()),
                "Insufficient token balance for the deposit"
            );
            return Err(SupplyError::InsufficientFunds {
                required: required.raw(),
                available: balance.raw(),
                shortfall,
            });
        }
        Ok(balance)
    }

    async fn submit(&self, contract: Address, call: WriteCall) -> Result<SubmittedTx, ChainError> {
        let method = call.method().name;
        let estimate = self
            .client
            .estimate_gas(contract, &call, self.wallet)
            .await?;
        let gas = GasPlan::new(estimate, self.params.gas_multiplier);
        info!(
            method,
            estimate = gas.estimate,
            limit = gas.limit,
            multiplier = %self.params.gas_multiplier,
            "Gas estimated"
        );

        let receipt = self
            .client
            .send_signed(contract, &call, self.wallet, gas.limit)
            .await?;
        Ok(SubmittedTx { gas, receipt })
    }
}
