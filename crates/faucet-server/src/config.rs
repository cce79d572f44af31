//! Configuration management for the faucet server.
//!
//! [`FaucetConfig`] is the flat record filled from flags and environment
//! variables; [`compile`] turns it into chain runner settings and the option
//! list taken by [`Faucet::new`](crate::engine::Faucet::new).

use crate::chain::ChainCmdOption;
use crate::coin::{validate_denom, Amount};
use crate::error::{FaucetError, FaucetResult};
use crate::keyring::KeyringBackend;
use crate::options::{
    FaucetOption, DEFAULT_ACCOUNT_NAME, DEFAULT_AMOUNT, DEFAULT_COIN_TYPE, DEFAULT_DENOM,
    DEFAULT_MAX_AMOUNT,
};
use crate::sdk::{SdkVersion, LATEST_SDK_VERSION};
use clap::Args;
use std::path::PathBuf;

/// Separator of the `--denoms` list.
pub const DENOM_SEPARATOR: char = ',';

/// Raw faucet settings, each flag falling back to its uppercase env variable
#[derive(Debug, Clone, Args)]
pub struct FaucetConfig {
    /// TCP port where the faucet listens for requests
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Keyring backend to be used
    #[arg(long, env = "KEYRING_BACKEND", default_value = "")]
    pub keyring_backend: String,

    /// Version of the Cosmos SDK the chain is built with
    #[arg(long, env = "SDK_VERSION", default_value = LATEST_SDK_VERSION)]
    pub sdk_version: String,

    /// Name of the account used by the faucet
    #[arg(long, env = "ACCOUNT_NAME", default_value = DEFAULT_ACCOUNT_NAME)]
    pub account_name: String,

    /// Mnemonic for restoring the account
    #[arg(long, env = "MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Password for accessing the keyring
    #[arg(long, env = "KEYRING_PASSWORD", hide_env_values = true)]
    pub keyring_password: Option<String>,

    /// Name of the chain CLI executable
    #[arg(long, env = "CLI_NAME", default_value = "gaiad")]
    pub cli_name: String,

    /// Comma separated denominations to distribute; the first one pays fees
    #[arg(long, env = "DENOMS", default_value = DEFAULT_DENOM)]
    pub denoms: String,

    /// Amount credited on each request
    #[arg(long, env = "CREDIT_AMOUNT", default_value_t = DEFAULT_AMOUNT)]
    pub credit_amount: u64,

    /// Maximum credit per account
    #[arg(long, env = "MAX_CREDIT", default_value_t = DEFAULT_MAX_AMOUNT)]
    pub max_credit: u64,

    /// Fee paid along with each transaction
    #[arg(long, env = "FEE_AMOUNT", default_value_t = 0)]
    pub fee_amount: u64,

    /// Address of the Tendermint RPC endpoint of the chain
    #[arg(long, env = "NODE")]
    pub node: Option<String>,

    /// Registered coin type number for HD derivation (BIP-0044)
    #[arg(long, env = "COIN_TYPE", default_value = DEFAULT_COIN_TYPE)]
    pub coin_type: String,

    /// Replaces the default home used by the chain CLI.
    ///
    /// Falls back to `$HOME`, so on most systems the CLI is pointed at the
    /// user's home directory instead of its own default (such as `~/.gaia`).
    #[arg(long, env = "HOME")]
    pub home: Option<PathBuf>,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            keyring_backend: String::new(),
            sdk_version: LATEST_SDK_VERSION.to_string(),
            account_name: DEFAULT_ACCOUNT_NAME.to_string(),
            mnemonic: None,
            keyring_password: None,
            cli_name: "gaiad".to_string(),
            denoms: DEFAULT_DENOM.to_string(),
            credit_amount: DEFAULT_AMOUNT,
            max_credit: DEFAULT_MAX_AMOUNT,
            fee_amount: 0,
            node: None,
            coin_type: DEFAULT_COIN_TYPE.to_string(),
            home: None,
        }
    }
}

/// Everything needed to build the runner and the faucet engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledConfig {
    pub port: u16,
    pub cli_name: String,
    pub chain_options: Vec<ChainCmdOption>,
    pub options: Vec<FaucetOption>,
}

/// Split the denomination list, rejecting empty entries.
///
/// A blank input or a stray comma yields empty denominations; those are
/// configuration errors rather than coins named "".
pub fn split_denoms(denoms: &str) -> FaucetResult<Vec<String>> {
    if denoms.is_empty() {
        return Err(FaucetError::InvalidConfig("empty denoms".to_string()));
    }

    let coins: Vec<String> = denoms.split(DENOM_SEPARATOR).map(str::to_string).collect();

    for denom in &coins {
        if denom.is_empty() {
            return Err(FaucetError::InvalidConfig(format!(
                "empty denomination in {:?}",
                denoms
            )));
        }
        validate_denom(denom).map_err(|e| FaucetError::InvalidConfig(e.to_string()))?;
    }

    Ok(coins)
}

/// Compile raw settings into runner options and faucet options.
///
/// Pure: nothing is executed and no file is touched.
pub fn compile(config: &FaucetConfig) -> FaucetResult<CompiledConfig> {
    let keyring_backend: KeyringBackend = config.keyring_backend.parse()?;
    let version: SdkVersion = config.sdk_version.parse()?;
    let coins = split_denoms(&config.denoms)?;

    let mut chain_options = Vec::new();
    if let Some(password) = &config.keyring_password {
        chain_options.push(ChainCmdOption::KeyringPassword(password.clone()));
    }
    chain_options.push(ChainCmdOption::KeyringBackend(keyring_backend));
    chain_options.push(ChainCmdOption::AutoChainIdDetection);
    if let Some(node) = config.node.as_ref().filter(|node| !node.is_empty()) {
        chain_options.push(ChainCmdOption::NodeAddress(node.clone()));
    }
    chain_options.push(ChainCmdOption::Version(version.clone()));
    if let Some(home) = config.home.as_ref().filter(|home| !home.as_os_str().is_empty()) {
        chain_options.push(ChainCmdOption::Home(home.clone()));
    }

    let credit_amount = Amount::from(config.credit_amount);
    let max_credit = Amount::from(config.max_credit);

    let mut options = vec![
        FaucetOption::Version(version),
        FaucetOption::Account {
            name: config.account_name.clone(),
            mnemonic: config.mnemonic.clone().filter(|m| !m.is_empty()),
            coin_type: config.coin_type.clone(),
        },
        // fees are paid in the first denomination
        FaucetOption::FeeAmount {
            amount: Amount::from(config.fee_amount),
            denom: coins[0].clone(),
        },
    ];
    options.extend(coins.into_iter().map(|denom| FaucetOption::Coin {
        amount: credit_amount,
        max_amount: max_credit,
        denom,
    }));

    Ok(CompiledConfig {
        port: config.port,
        cli_name: config.cli_name.clone(),
        chain_options,
        options,
    })
}
