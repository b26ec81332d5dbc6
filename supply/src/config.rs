//! Run configuration.
//!
//! Everything the workflow needs is resolved into one [`SupplyConfig`] before
//! any chain call is made. The endpoint credential and wallet secret are
//! mandatory; a missing one fails here with
//! [`SupplyError::ConfigurationMissing`].

use crate::{
    error::SupplyError,
    math::{GasMultiplier, MAX_U256_DECIMALS},
    process::constants::{
        DEFAULT_DEPOSIT_UNITS, DEFAULT_REFERRAL_CODE, INFURA_SEPOLIA_ENDPOINT, MAX_TOKEN_DECIMALS,
        SEPOLIA_AAVE_POOL, SEPOLIA_USDC,
    },
    secret::SecretString,
};
use alloy::primitives::Address;
use serde::Deserialize;
use std::{fmt, str::FromStr};
use url::Url;

/// Where JSON-RPC requests go.
#[derive(Clone, Debug)]
pub enum Endpoint {
    /// Infura's Sepolia endpoint with the given project key.
    Infura { api_key: SecretString },
    /// Any other JSON-RPC URL.
    Url(Url),
}

impl Endpoint {
    pub fn rpc_url(&self) -> Result<Url, SupplyError> {
        match self {
            Endpoint::Infura { api_key } => {
                let raw = format!("{INFURA_SEPOLIA_ENDPOINT}{}", api_key.expose_secret().trim());
                Url::parse(&raw).map_err(|_| SupplyError::InvalidConfiguration {
                    name: "INFURA_API_KEY",
                    reason: "does not form a valid endpoint URL".to_string(),
                })
            }
            Endpoint::Url(url) => Ok(url.clone()),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Infura { api_key } => write!(f, "{INFURA_SEPOLIA_ENDPOINT}{api_key}"),
            Endpoint::Url(url) => {
                write!(f, "{}://{}", url.scheme(), url.host_str().unwrap_or(""))?;
                match url.port() {
                    Some(port) => write!(f, ":{port}"),
                    None => Ok(()),
                }
            }
        }
    }
}

/// The part of the configuration the workflow itself consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositParams {
    pub token_address: Address,
    pub pool_address: Address,
    pub target_whole_units: u64,
    pub referral_code: u16,
    pub gas_multiplier: GasMultiplier,
    pub max_decimals: u8,
}

impl Default for DepositParams {
    fn default() -> Self {
        Self {
            token_address: SEPOLIA_USDC,
            pool_address: SEPOLIA_AAVE_POOL,
            target_whole_units: DEFAULT_DEPOSIT_UNITS,
            referral_code: DEFAULT_REFERRAL_CODE,
            gas_multiplier: GasMultiplier::DEFAULT,
            max_decimals: MAX_TOKEN_DECIMALS,
        }
    }
}

impl DepositParams {
    pub fn validate(&self) -> Result<(), SupplyError> {
        if self.target_whole_units == 0 {
            return Err(SupplyError::InvalidConfiguration {
                name: "DEPOSIT_UNITS",
                reason: "must be at least one whole token".to_string(),
            });
        }
        if self.token_address.is_zero() || self.pool_address.is_zero() {
            return Err(SupplyError::InvalidConfiguration {
                name: "TOKEN_ADDRESS/POOL_ADDRESS",
                reason: "the zero address is not a contract".to_string(),
            });
        }
        if self.token_address == self.pool_address {
            return Err(SupplyError::InvalidConfiguration {
                name: "TOKEN_ADDRESS/POOL_ADDRESS",
                reason: "token and pool must be different contracts".to_string(),
            });
        }
        if self.max_decimals > MAX_U256_DECIMALS {
            return Err(SupplyError::InvalidConfiguration {
                name: "MAX_DECIMALS",
                reason: format!("cannot exceed {MAX_U256_DECIMALS}"),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SupplyConfig {
    pub endpoint: Endpoint,
    pub wallet_secret: SecretString,
    pub deposit: DepositParams,
}

impl SupplyConfig {
    pub fn builder() -> SupplyConfigBuilder {
        SupplyConfigBuilder::default()
    }
}

/// Collects optional inputs and checks them all at once in [`Self::build`].
#[derive(Debug, Default)]
pub struct SupplyConfigBuilder {
    infura_api_key: Option<SecretString>,
    rpc_url: Option<String>,
    wallet_secret: Option<SecretString>,
    deposit: DepositParams,
}

impl SupplyConfigBuilder {
    pub fn infura_api_key(mut self, key: impl Into<SecretString>) -> Self {
        self.infura_api_key = Some(key.into());
        self
    }

    /// Takes precedence over the Infura key when both are set.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    pub fn wallet_secret(mut self, secret: impl Into<SecretString>) -> Self {
        self.wallet_secret = Some(secret.into());
        self
    }

    /// Token and pool are only ever replaced as a pair.
    pub fn network(mut self, token_address: Address, pool_address: Address) -> Self {
        self.deposit.token_address = token_address;
        self.deposit.pool_address = pool_address;
        self
    }

    pub fn target_whole_units(mut self, units: u64) -> Self {
        self.deposit.target_whole_units = units;
        self
    }

    pub fn referral_code(mut self, code: u16) -> Self {
        self.deposit.referral_code = code;
        self
    }

    pub fn gas_multiplier(mut self, multiplier: GasMultiplier) -> Self {
        self.deposit.gas_multiplier = multiplier;
        self
    }

    pub fn max_decimals(mut self, max: u8) -> Self {
        self.deposit.max_decimals = max;
        self
    }

    pub fn build(self) -> Result<SupplyConfig, SupplyError> {
        let endpoint = match (self.rpc_url, self.infura_api_key) {
            (Some(url), _) if !url.trim().is_empty() => {
                let url = Url::parse(url.trim()).map_err(|e| SupplyError::InvalidConfiguration {
                    name: "RPC_URL",
                    reason: e.to_string(),
                })?;
                Endpoint::Url(url)
            }
            (_, Some(api_key)) if !api_key.is_blank() => Endpoint::Infura { api_key },
            _ => return Err(SupplyError::ConfigurationMissing { name: "INFURA_API_KEY" }),
        };
        // Fails early for a malformed key as well as an absent one.
        endpoint.rpc_url()?;

        let wallet_secret = self
            .wallet_secret
            .filter(|secret| !secret.is_blank())
            .ok_or(SupplyError::ConfigurationMissing { name: "PRIVATE_KEY" })?;

        self.deposit.validate()?;
        Ok(SupplyConfig {
            endpoint,
            wallet_secret,
            deposit: self.deposit,
        })
    }
}

/// Parses a hex address, naming the setting it came from on failure.
pub fn parse_address(name: &'static str, value: &str) -> Result<Address, SupplyError> {
    Address::from_str(value.trim()).map_err(|e| SupplyError::InvalidConfiguration {
        name,
        reason: e.to_string(),
    })
}

/// Network description loaded from a JSON file:
/// `{ "rpc_url": "...", "token_address": "0x...", "pool_address": "0x..." }`.
#[derive(Clone, Debug, Deserialize)]
pub struct NetworkFile {
    #[serde(default)]
    pub rpc_url: Option<String>,
    pub token_address: String,
    pub pool_address: String,
}

impl NetworkFile {
    pub fn from_json(json: &str) -> Result<Self, SupplyError> {
        serde_json::from_str(json).map_err(|e| SupplyError::InvalidConfiguration {
            name: "network file",
            reason: e.to_string(),
        })
    }

    pub fn addresses(&self) -> Result<(Address, Address), SupplyError> {
        Ok((
            parse_address("token_address", &self.token_address)?,
            parse_address("pool_address", &self.pool_address)?,
        ))
    }
}
