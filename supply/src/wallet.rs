use crate::{error::SupplyError, secret::SecretString};
use alloy::{
    network::EthereumWallet,
    primitives::Address,
    signers::local::PrivateKeySigner,
};
use std::{fmt, str::FromStr};

/// The single signing account the workflow acts for.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Builds the wallet from a hex private key, with or without `0x`.
    pub fn from_secret(secret: &SecretString) -> Result<Self, SupplyError> {
        if secret.is_blank() {
            return Err(SupplyError::ConfigurationMissing { name: "PRIVATE_KEY" });
        }
        let signer = PrivateKeySigner::from_str(secret.expose_secret().trim()).map_err(|_| {
            SupplyError::InvalidConfiguration {
                name: "PRIVATE_KEY",
                reason: "not a 32-byte hex secp256k1 key".to_string(),
            }
        })?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn to_ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
