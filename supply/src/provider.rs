//! [`ChainClient`] backed by an alloy HTTP provider with the wallet attached.

use crate::{
    abi::IERC20,
    client::{ChainClient, TxReceipt, ViewCall, WriteCall},
    config::DepositParams,
    error::{ChainError, ChainResult, Stage, SupplyError},
    process::constants::{SEPOLIA_CHAIN_ID, SEPOLIA_USDC},
    wallet::Wallet,
};
use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Clone, Debug)]
pub struct AlloyChainClient {
    provider: DynProvider,
}

impl AlloyChainClient {
    /// Nonce, fees and chain id are filled in by the provider; the gas limit
    /// always comes from the workflow.
    pub fn connect(rpc_url: Url, wallet: &Wallet) -> Self {
        let provider = ProviderBuilder::new()
            .wallet(wallet.to_ethereum_wallet())
            .connect_http(rpc_url)
            .erased();
        Self { provider }
    }

    /// Confirms the endpoint answers and both contracts are deployed.
    pub async fn preflight(&self, params: &DepositParams) -> Result<u64, SupplyError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| SupplyError::UnexpectedFailure {
                stage: Stage::Startup,
                source: e.into(),
            })?;
        info!(chain_id, "Connected to network");
        if params.token_address == SEPOLIA_USDC && chain_id != SEPOLIA_CHAIN_ID {
            warn!(
                chain_id,
                expected = SEPOLIA_CHAIN_ID,
                "Endpoint is not Sepolia but the Sepolia token address is configured"
            );
        }

        for address in [params.token_address, params.pool_address] {
            self.ensure_deployed(address)
                .await
                .map_err(SupplyError::unexpected(Stage::Startup))?;
        }
        Ok(chain_id)
    }

    async fn ensure_deployed(&self, address: Address) -> ChainResult<()> {
        let code = self.provider.get_code_at(address).await?;
        if code.is_empty() {
            return Err(ChainError::NoCode { address });
        }
        debug!(%address, code_len = code.len(), "Contract code found");
        Ok(())
    }

    fn request(contract: Address, call: &WriteCall, from: Address) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(from)
            .with_to(contract)
            .with_input(call.calldata())
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn call_view(&self, contract: Address, call: &ViewCall) -> ChainResult<U256> {
        let token = IERC20::new(contract, &self.provider);
        let value = match *call {
            ViewCall::Decimals => U256::from(token.decimals().call().await?),
            ViewCall::BalanceOf { account } => token.balanceOf(account).call().await?,
            ViewCall::Allowance { owner, spender } => {
                token.allowance(owner, spender).call().await?
            }
        };
        Ok(value)
    }

    async fn estimate_gas(
        &self,
        contract: Address,
        call: &WriteCall,
        from: Address,
    ) -> ChainResult<u64> {
        let tx = Self::request(contract, call, from);
        Ok(self.provider.estimate_gas(tx).await?)
    }

    async fn send_signed(
        &self,
        contract: Address,
        call: &WriteCall,
        from: Address,
        gas_limit: u64,
    ) -> ChainResult<TxReceipt> {
        let tx = Self::request(contract, call, from).with_gas_limit(gas_limit);
        let pending = self.provider.send_transaction(tx).await?;
        debug!(tx = %pending.tx_hash(), method = call.method().name, "Transaction submitted");

        settle(pending.get_receipt().await?)
    }
}

/// A mined transaction only counts when its status is 1.
fn settle(receipt: TransactionReceipt) -> ChainResult<TxReceipt> {
    if !receipt.status() {
        return Err(ChainError::Reverted {
            tx_hash: receipt.transaction_hash,
        });
    }
    Ok(TxReceipt {
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: Some(receipt.gas_used),
    })
}
