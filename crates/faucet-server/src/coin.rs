//! Token amounts and coins.

use crate::error::FaucetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exact token amount in base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = FaucetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FaucetError::InvalidCoin(format!("invalid amount {:?}", s)));
        }
        s.parse::<u128>()
            .map(Amount)
            .map_err(|e| FaucetError::InvalidCoin(format!("invalid amount {:?}: {}", s, e)))
    }
}

/// Check a denomination against the Cosmos SDK pattern
/// `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), FaucetError> {
    let mut chars = denom.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));

    if starts_with_letter && rest_ok && (3..=128).contains(&denom.len()) {
        Ok(())
    } else {
        Err(FaucetError::InvalidCoin(format!("invalid denom {:?}", denom)))
    }
}

/// An amount of a single denomination, written as `10uatom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coin {
    pub amount: Amount,
    pub denom: String,
}

impl Coin {
    pub fn new(amount: impl Into<Amount>, denom: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            denom: denom.into(),
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = FaucetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| FaucetError::InvalidCoin(format!("missing denom in {:?}", s)))?;
        let (amount, denom) = s.split_at(split);

        validate_denom(denom)?;
        Ok(Coin {
            amount: amount.parse()?,
            denom: denom.to_string(),
        })
    }
}

/// Render coins the way chain CLIs expect them: `10uatom,5stake`.
pub fn format_coins(coins: &[Coin]) -> String {
    coins
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
