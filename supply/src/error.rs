//! Error types for the deposit workflow

use alloy::primitives::{Address, B256, U256};
use std::fmt;
use thiserror::Error;

/// Failures coming back from the network collaborator.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("transport error: {0}")]
    Transport(#[from] alloy::transports::TransportError),

    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("transaction was not confirmed: {0}")]
    Pending(#[from] alloy::providers::PendingTransactionError),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    #[error("no contract code deployed at {address}")]
    NoCode { address: Address },
}

pub type ChainResult<T> = Result<T, ChainError>;

/// The step of the workflow an error was raised in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Startup,
    Decimals,
    Amount,
    Balance,
    Allowance,
    Approval,
    Supply,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Startup => "startup checks",
            Stage::Decimals => "decimals lookup",
            Stage::Amount => "amount computation",
            Stage::Balance => "balance check",
            Stage::Allowance => "allowance lookup",
            Stage::Approval => "approval",
            Stage::Supply => "supply",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`SupplyError`], stable enough to pick an exit
/// code from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationMissing,
    InvalidConfiguration,
    InsufficientFunds,
    ApprovalFailed,
    SupplyFailed,
    UnexpectedFailure,
}

#[derive(Debug, Error)]
pub enum SupplyError {
    #[error("required configuration `{name}` is not set")]
    ConfigurationMissing { name: &'static str },

    #[error("invalid configuration `{name}`: {reason}")]
    InvalidConfiguration { name: &'static str, reason: String },

    #[error("insufficient token balance: need {required}, have {available} (short by {shortfall})")]
    InsufficientFunds {
        required: U256,
        available: U256,
        shortfall: U256,
    },

    #[error("approval failed: {0}")]
    ApprovalFailed(#[source] ChainError),

    #[error("supply failed: {0}")]
    SupplyFailed(#[source] ChainError),

    #[error("token reports {decimals} decimals, more than the accepted {max}")]
    DecimalsOutOfRange { decimals: U256, max: u8 },

    #[error("{whole_units} whole tokens at {decimals} decimals does not fit in 256 bits")]
    AmountOverflow { whole_units: u64, decimals: u8 },

    #[error("{contract}.{method} binding does not match its descriptor: expected {expected}, got {actual}")]
    BindingMismatch {
        contract: &'static str,
        method: &'static str,
        expected: String,
        actual: String,
    },

    #[error("unexpected failure during {stage}: {source}")]
    UnexpectedFailure {
        stage: Stage,
        #[source]
        source: ChainError,
    },
}

impl SupplyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SupplyError::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            SupplyError::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
            SupplyError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            SupplyError::ApprovalFailed(_) => ErrorKind::ApprovalFailed,
            SupplyError::SupplyFailed(_) => ErrorKind::SupplyFailed,
            SupplyError::DecimalsOutOfRange { .. }
            | SupplyError::AmountOverflow { .. }
            | SupplyError::BindingMismatch { .. }
            | SupplyError::UnexpectedFailure { .. } => ErrorKind::UnexpectedFailure,
        }
    }

    /// Workflow stage the error belongs to; `None` for pre-flight configuration errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SupplyError::ConfigurationMissing { .. } | SupplyError::InvalidConfiguration { .. } => {
                None
            }
            SupplyError::BindingMismatch { .. } => Some(Stage::Startup),
            SupplyError::DecimalsOutOfRange { .. } => Some(Stage::Decimals),
            SupplyError::AmountOverflow { .. } => Some(Stage::Amount),
            SupplyError::InsufficientFunds { .. } => Some(Stage::Balance),
            SupplyError::ApprovalFailed(_) => Some(Stage::Approval),
            SupplyError::SupplyFailed(_) => Some(Stage::Supply),
            SupplyError::UnexpectedFailure { stage, .. } => Some(*stage),
        }
    }

    pub(crate) fn unexpected(stage: Stage) -> impl FnOnce(ChainError) -> Self {
        move |source| SupplyError::UnexpectedFailure { stage, source }
    }
}

/// Parse errors for [`crate::GasMultiplier`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultiplierError {
    #[error("`{0}` is not a decimal number")]
    Malformed(String),

    #[error("at most 4 fractional digits are supported")]
    TooPrecise,

    #[error("multiplier must be at least 1.0")]
    BelowOne,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_stage_follow_variant() {
        let err = SupplyError::ApprovalFailed(ChainError::Reverted { tx_hash: B256::ZERO });
        assert_eq!(err.kind(), ErrorKind::ApprovalFailed);
        assert_eq!(err.stage(), Some(Stage::Approval));

        let err = SupplyError::ConfigurationMissing { name: "PRIVATE_KEY" };
        assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
        assert_eq!(err.stage(), None);

        let err = SupplyError::DecimalsOutOfRange {
            decimals: U256::from(80),
            max: 36,
        };
        assert_eq!(err.kind(), ErrorKind::UnexpectedFailure);
        assert_eq!(err.stage(), Some(Stage::Decimals));
    }

    #[test]
    fn test_insufficient_funds_message_names_shortfall() {
        let err = SupplyError::InsufficientFunds {
            required: U256::from(10_000_000u64),
            available: U256::from(5_000_000u64),
            shortfall: U256::from(5_000_000u64),
        };
        assert_eq!(
            err.to_string(),
            "insufficient token balance: need 10000000, have 5000000 (short by 5000000)"
        );
    }
}
