//! Token amounts and gas limits.
//!
//! Both are plain integer arithmetic. Amounts live in 256 bits and are scaled
//! by the token's own `decimals`; gas multipliers are fixed-point basis points
//! so the submitted limit is an exact ceiling of the estimate.

use crate::error::MultiplierError;
use alloy::primitives::{utils::format_units, U256};
use std::{cmp::Ordering, fmt, str::FromStr};

/// Largest power of ten that still fits in a `U256`.
pub const MAX_U256_DECIMALS: u8 = 77;

const BASIS_POINTS: u32 = 10_000;

/// An integer quantity in the token's smallest unit, tagged with the decimals
/// used to display it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    pub fn from_raw(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// `whole_units * 10^decimals`, or `None` if it does not fit in 256 bits.
    pub fn from_whole_units(whole_units: u64, decimals: u8) -> Option<Self> {
        let scale = U256::from(10u8).checked_pow(U256::from(decimals))?;
        let raw = U256::from(whole_units).checked_mul(scale)?;
        Some(Self { raw, decimals })
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// How much `self` falls short of `required`, zero when it covers it.
    pub fn shortfall(&self, required: &TokenAmount) -> U256 {
        required.raw.saturating_sub(self.raw)
    }
}

// Amounts at different decimals are not comparable.
impl PartialOrd for TokenAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.decimals == other.decimals).then(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_units(self.raw, self.decimals) {
            Ok(human) => f.write_str(&human),
            Err(_) => write!(f, "{}", self.raw),
        }
    }
}

/// Safety factor applied to gas estimates, stored as basis points (`1.2` is `12_000`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasMultiplier {
    basis_points: u32,
}

impl GasMultiplier {
    pub const DEFAULT: Self = Self {
        basis_points: 12_000,
    };

    pub fn from_basis_points(basis_points: u32) -> Result<Self, MultiplierError> {
        if basis_points < BASIS_POINTS {
            return Err(MultiplierError::BelowOne);
        }
        Ok(Self { basis_points })
    }

    pub fn basis_points(&self) -> u32 {
        self.basis_points
    }

    /// `ceil(estimate * multiplier)`, saturating at `u64::MAX`.
    pub fn apply(&self, estimate: u64) -> u64 {
        let scaled = (u128::from(estimate) * u128::from(self.basis_points))
            .div_ceil(u128::from(BASIS_POINTS));
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

impl Default for GasMultiplier {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for GasMultiplier {
    type Err = MultiplierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || MultiplierError::Malformed(s.to_string());
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        if fraction.len() > 4 {
            return Err(MultiplierError::TooPrecise);
        }

        let whole: u32 = whole.parse().map_err(|_| malformed())?;
        let fraction_points = fraction
            .bytes()
            .zip([1_000u32, 100, 10, 1])
            .map(|(digit, weight)| u32::from(digit - b'0') * weight)
            .sum::<u32>();
        let basis_points = whole
            .checked_mul(BASIS_POINTS)
            .and_then(|points| points.checked_add(fraction_points))
            .ok_or_else(malformed)?;
        Self::from_basis_points(basis_points)
    }
}

impl fmt::Display for GasMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.basis_points / BASIS_POINTS;
        let fraction = self.basis_points % BASIS_POINTS;
        if fraction == 0 {
            return write!(f, "{whole}.0");
        }
        let fraction = format!("{fraction:04}");
        write!(f, "{whole}.{}", fraction.trim_end_matches('0'))
    }
}

/// The estimate returned for a call and the limit actually submitted with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasPlan {
    pub estimate: u64,
    pub limit: u64,
}

impl GasPlan {
    pub fn new(estimate: u64, multiplier: GasMultiplier) -> Self {
        Self {
            estimate,
            limit: multiplier.apply(estimate),
        }
    }
}
