// #![deny(missing_docs)]

//! Approve-then-supply deposit into an Aave V3 lending pool.
//!
//! The crate is split the same way the workflow is: [`abi`] describes the two
//! contracts, [`client`] is the seam to the network, [`process`] drives the
//! ordered deposit and [`config`]/[`wallet`] build what it needs.
pub mod abi;
pub mod client;
pub mod config;
pub mod error;
pub mod math;
pub mod process;
pub mod provider;
pub mod secret;
pub mod wallet;

#[cfg(test)]
mod mock;

pub use client::{ChainClient, TxReceipt, ViewCall, WriteCall};
pub use config::{DepositParams, Endpoint, SupplyConfig, SupplyConfigBuilder};
pub use error::{ChainError, ErrorKind, Stage, SupplyError};
pub use math::{GasMultiplier, GasPlan, TokenAmount};
pub use process::deposit::{DepositReceipt, DepositWorkflow, SubmittedTx, TokenPosition};
pub use provider::AlloyChainClient;
pub use secret::SecretString;
pub use wallet::Wallet;

// Export the alloy version used for addresses and amounts so callers stay in sync
pub use alloy;
