use alloy::primitives::{address, Address};

// Sepolia deployment. Both addresses must be swapped together when moving networks.
pub const SEPOLIA_USDC: Address = address!("94a9D9AC8a22534E3FaCa9F4e7F2E2cf85d5E4C8");
pub const SEPOLIA_AAVE_POOL: Address = address!("6Ae43d3271ff6888e7Fc43Fd7321a503ff738951");
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

pub const INFURA_SEPOLIA_ENDPOINT: &str = "https://sepolia.infura.io/v3/";

pub const DEFAULT_DEPOSIT_UNITS: u64 = 10;
pub const DEFAULT_REFERRAL_CODE: u16 = 0;

/// Decimals accepted from the token before the amount is computed.
pub const MAX_TOKEN_DECIMALS: u8 = 36;
