//! Options accepted by the faucet engine factory.

use crate::coin::Amount;
use crate::sdk::SdkVersion;

/// Key name used when no account is configured.
pub const DEFAULT_ACCOUNT_NAME: &str = "faucet";

/// Denomination distributed when no coin is configured.
pub const DEFAULT_DENOM: &str = "uatom";

/// Amount credited per request when no coin is configured.
pub const DEFAULT_AMOUNT: u64 = 10_000_000;

/// Lifetime credit per account when no coin is configured.
pub const DEFAULT_MAX_AMOUNT: u64 = 100_000_000;

/// Default BIP-0044 coin type (Cosmos Hub).
pub const DEFAULT_COIN_TYPE: &str = "118";

/// One setting of the faucet engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetOption {
    /// SDK version of the target chain
    Version(SdkVersion),

    /// Key used to sign transfers, restored from `mnemonic` when given
    Account {
        name: String,
        mnemonic: Option<String>,
        coin_type: String,
    },

    /// Fee attached to every transfer
    FeeAmount { amount: Amount, denom: String },

    /// A distributed denomination with its per-request and lifetime amounts
    Coin {
        amount: Amount,
        max_amount: Amount,
        denom: String,
    },
}

/// Ordered denominations of the coin options.
pub fn denoms(options: &[FaucetOption]) -> Vec<&str> {
    options
        .iter()
        .filter_map(|option| match option {
            FaucetOption::Coin { denom, .. } => Some(denom.as_str()),
            _ => None,
        })
        .collect()
}

/// Denomination of the fee option, if any.
pub fn fee_denom(options: &[FaucetOption]) -> Option<&str> {
    options.iter().find_map(|option| match option {
        FaucetOption::FeeAmount { denom, .. } => Some(denom.as_str()),
        _ => None,
    })
}
