//! The faucet engine: account setup and transfers.

use crate::chain::{Account, ChainRunner};
use crate::coin::{Amount, Coin};
use crate::error::{FaucetError, FaucetResult};
use crate::options::{
    FaucetOption, DEFAULT_ACCOUNT_NAME, DEFAULT_AMOUNT, DEFAULT_COIN_TYPE, DEFAULT_DENOM,
    DEFAULT_MAX_AMOUNT,
};
use crate::sdk::SdkVersion;
use crate::state::CreditLedger;
use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// How long credited amounts count against an account's max credit.
pub fn default_refresh_window() -> Duration {
    Duration::hours(24)
}

/// A denomination handed out by the faucet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinLimit {
    pub denom: String,
    /// Credited per request when the request does not name an amount
    pub amount: Amount,
    /// Lifetime credit per account within the refresh window
    pub max_amount: Amount,
}

/// Public facts about a running faucet
#[derive(Debug, Clone, Serialize)]
pub struct FaucetInfo {
    pub is_a_faucet: bool,
    pub chain_id: String,
    pub address: String,
    pub denoms: Vec<String>,
}

/// Distributes coins from a single chain account.
pub struct Faucet {
    runner: Arc<dyn ChainRunner>,
    account: Account,
    coins: Vec<CoinLimit>,
    fee: Option<Coin>,
    version: SdkVersion,
    chain_id: String,
    ledger: CreditLedger,
}

impl std::fmt::Debug for Faucet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Faucet")
            .field("account", &self.account)
            .field("coins", &self.coins)
            .field("fee", &self.fee)
            .field("version", &self.version)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

impl Faucet {
    /// Build a faucet from its options and make sure its account exists.
    ///
    /// Without coin options the faucet distributes the default denomination.
    /// An account with a mnemonic is imported when missing from the keyring,
    /// otherwise an existing key is reused or a fresh one is created.
    pub async fn new(
        runner: Arc<dyn ChainRunner>,
        options: Vec<FaucetOption>,
    ) -> FaucetResult<Self> {
        let mut account_name = DEFAULT_ACCOUNT_NAME.to_string();
        let mut mnemonic = None;
        let mut coin_type = DEFAULT_COIN_TYPE.to_string();
        let mut coins: Vec<CoinLimit> = Vec::new();
        let mut fee = None;
        let mut version = SdkVersion::latest();

        for option in options {
            match option {
                FaucetOption::Version(v) => version = v,
                FaucetOption::Account {
                    name,
                    mnemonic: phrase,
                    coin_type: ct,
                } => {
                    account_name = name;
                    mnemonic = phrase.filter(|p| !p.trim().is_empty());
                    coin_type = ct;
                }
                FaucetOption::FeeAmount { amount, denom } => fee = Some(Coin { amount, denom }),
                FaucetOption::Coin {
                    amount,
                    max_amount,
                    denom,
                } => match coins.iter_mut().find(|c| c.denom == denom) {
                    Some(existing) => {
                        existing.amount = amount;
                        existing.max_amount = max_amount;
                    }
                    None => coins.push(CoinLimit {
                        denom,
                        amount,
                        max_amount,
                    }),
                },
            }
        }

        if coins.is_empty() {
            coins.push(CoinLimit {
                denom: DEFAULT_DENOM.to_string(),
                amount: Amount::from(DEFAULT_AMOUNT),
                max_amount: Amount::from(DEFAULT_MAX_AMOUNT),
            });
        }

        let chain_id = runner.chain_id().await?;
        let account =
            Self::ensure_account(runner.as_ref(), &account_name, mnemonic, &coin_type).await?;

        info!(
            "Faucet account {} ({}) ready on chain {}",
            account.name, account.address, chain_id
        );

        Ok(Self {
            runner,
            account,
            coins,
            fee,
            version,
            chain_id,
            ledger: CreditLedger::new(default_refresh_window()),
        })
    }

    async fn ensure_account(
        runner: &dyn ChainRunner,
        name: &str,
        mnemonic: Option<String>,
        coin_type: &str,
    ) -> FaucetResult<Account> {
        if let Some(account) = runner.show_account(name).await? {
            if mnemonic.is_some() {
                warn!("Account {} already exists, ignoring the configured mnemonic", name);
            }
            return Ok(account);
        }

        if mnemonic.is_some() {
            info!("Importing account {} from mnemonic", name);
        } else {
            info!("Creating new account {}", name);
        }
        runner.add_account(name, mnemonic, coin_type).await
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn coins(&self) -> &[CoinLimit] {
        &self.coins
    }

    pub fn fee(&self) -> Option<&Coin> {
        self.fee.as_ref()
    }

    pub fn version(&self) -> &SdkVersion {
        &self.version
    }

    pub fn ledger(&self) -> &CreditLedger {
        &self.ledger
    }

    pub fn info(&self) -> FaucetInfo {
        FaucetInfo {
            is_a_faucet: true,
            chain_id: self.chain_id.clone(),
            address: self.account.address.clone(),
            denoms: self.coins.iter().map(|c| c.denom.clone()).collect(),
        }
    }

    /// Send `requested` coins to `address`, or every configured coin at its
    /// default amount when nothing is requested. Returns the tx hash.
    pub async fn transfer(&self, address: &str, requested: Vec<Coin>) -> FaucetResult<String> {
        validate_address(address)?;

        let coins = if requested.is_empty() {
            self.coins
                .iter()
                .map(|limit| Coin::new(limit.amount, limit.denom.clone()))
                .collect()
        } else {
            requested
        };

        let mut reserved: Vec<&Coin> = Vec::with_capacity(coins.len());
        for coin in &coins {
            let reservation = self.limit_for(&coin.denom).and_then(|limit| {
                self.ledger
                    .reserve(address, &coin.denom, coin.amount, limit.max_amount)
            });

            if let Err(e) = reservation {
                self.release_all(address, &reserved);
                return Err(e);
            }
            reserved.push(coin);
        }

        match self
            .runner
            .bank_send(&self.account.name, address, &coins, self.fee.clone())
            .await
        {
            Ok(txhash) => {
                info!("Sent {:?} to {} (tx: {})", coins, address, txhash);
                Ok(txhash)
            }
            Err(e) => {
                warn!("Transfer to {} failed: {}", address, e);
                self.release_all(address, &reserved);
                Err(e)
            }
        }
    }

    fn limit_for(&self, denom: &str) -> FaucetResult<&CoinLimit> {
        self.coins
            .iter()
            .find(|limit| limit.denom == denom)
            .ok_or_else(|| FaucetError::UnknownDenom(denom.to_string()))
    }

    fn release_all(&self, address: &str, coins: &[&Coin]) {
        for coin in coins {
            self.ledger.release(address, &coin.denom, coin.amount);
        }
    }
}

/// Basic bech32 shape check: `hrp1data`, lowercase alphanumerics only.
pub fn validate_address(address: &str) -> FaucetResult<()> {
    let valid = match address.rfind('1') {
        Some(separator) => {
            separator > 0
                && address.len() - separator > 6
                && address
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FaucetError::InvalidAddress(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainRunner;
    use mockall::predicate::{always, eq};

    const DEST: &str = "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu";

    fn faucet_account() -> Account {
        Account {
            name: "faucet".to_string(),
            address: "cosmos1faucetfaucetfaucet".to_string(),
        }
    }

    fn coin_option(denom: &str, amount: u64, max: u64) -> FaucetOption {
        FaucetOption::Coin {
            amount: Amount::from(amount),
            max_amount: Amount::from(max),
            denom: denom.to_string(),
        }
    }

    fn existing_account_runner() -> MockChainRunner {
        let mut runner = MockChainRunner::new();
        runner
            .expect_chain_id()
            .returning(|| Ok("test-chain-1".to_string()));
        runner
            .expect_show_account()
            .returning(|_| Ok(Some(faucet_account())));
        runner.expect_add_account().never();
        runner
    }

    #[tokio::test]
    async fn test_defaults_without_options() {
        let faucet = Faucet::new(Arc::new(existing_account_runner()), Vec::new())
            .await
            .unwrap();

        assert_eq!(
            faucet.coins(),
            &[CoinLimit {
                denom: "uatom".to_string(),
                amount: Amount::from(DEFAULT_AMOUNT),
                max_amount: Amount::from(DEFAULT_MAX_AMOUNT),
            }]
        );
        assert_eq!(faucet.fee(), None);
        assert_eq!(faucet.version(), &SdkVersion::latest());

        let info = faucet.info();
        assert!(info.is_a_faucet);
        assert_eq!(info.chain_id, "test-chain-1");
        assert_eq!(info.address, "cosmos1faucetfaucetfaucet");
    }

    #[tokio::test]
    async fn test_imports_account_from_mnemonic() {
        let mut runner = MockChainRunner::new();
        runner.expect_chain_id().returning(|| Ok("c".to_string()));
        runner
            .expect_show_account()
            .with(eq("alice"))
            .returning(|_| Ok(None));
        runner
            .expect_add_account()
            .withf(|name, mnemonic, coin_type| {
                name == "alice" && mnemonic.as_deref() == Some("abandon art") && coin_type == "529"
            })
            .times(1)
            .returning(|name, _, _| {
                Ok(Account {
                    name: name.to_string(),
                    address: "cosmos1alice".to_string(),
                })
            });

        let options = vec![FaucetOption::Account {
            name: "alice".to_string(),
            mnemonic: Some("abandon art".to_string()),
            coin_type: "529".to_string(),
        }];
        let faucet = Faucet::new(Arc::new(runner), options).await.unwrap();
        assert_eq!(faucet.account().address, "cosmos1alice");
    }

    #[tokio::test]
    async fn test_creates_missing_account_without_mnemonic() {
        let mut runner = MockChainRunner::new();
        runner.expect_chain_id().returning(|| Ok("c".to_string()));
        runner.expect_show_account().returning(|_| Ok(None));
        runner
            .expect_add_account()
            .withf(|_, mnemonic, _| mnemonic.is_none())
            .times(1)
            .returning(|_, _, _| Ok(faucet_account()));

        let options = vec![FaucetOption::Account {
            name: "faucet".to_string(),
            mnemonic: Some("   ".to_string()),
            coin_type: "118".to_string(),
        }];
        assert!(Faucet::new(Arc::new(runner), options).await.is_ok());
    }

    #[tokio::test]
    async fn test_chain_failure_aborts_construction() {
        let mut runner = MockChainRunner::new();
        runner
            .expect_chain_id()
            .returning(|| Err(FaucetError::Chain("connection refused".to_string())));

        assert!(Faucet::new(Arc::new(runner), Vec::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_transfer_default_coins() {
        let mut runner = existing_account_runner();
        runner
            .expect_bank_send()
            .withf(|from, to, coins, fee| {
                from == "faucet"
                    && to == DEST
                    && coins == [Coin::new(100u64, "uatom"), Coin::new(100u64, "stake")]
                    && fee.as_ref() == Some(&Coin::new(2u64, "uatom"))
            })
            .times(1)
            .returning(|_, _, _, _| Ok("TXHASH".to_string()));

        let options = vec![
            FaucetOption::FeeAmount {
                amount: Amount::from(2u64),
                denom: "uatom".to_string(),
            },
            coin_option("uatom", 100, 1000),
            coin_option("stake", 100, 1000),
        ];
        let faucet = Faucet::new(Arc::new(runner), options).await.unwrap();

        assert_eq!(faucet.transfer(DEST, Vec::new()).await.unwrap(), "TXHASH");
        assert_eq!(faucet.ledger().credited(DEST, "uatom"), Amount::new(100));
        assert_eq!(faucet.ledger().credited(DEST, "stake"), Amount::new(100));
    }

    #[tokio::test]
    async fn test_transfer_enforces_max_credit() {
        let mut runner = existing_account_runner();
        runner
            .expect_bank_send()
            .times(2)
            .returning(|_, _, _, _| Ok("TXHASH".to_string()));

        let faucet = Faucet::new(Arc::new(runner), vec![coin_option("uatom", 50, 100)])
            .await
            .unwrap();

        faucet.transfer(DEST, Vec::new()).await.unwrap();
        faucet.transfer(DEST, Vec::new()).await.unwrap();
        let err = faucet.transfer(DEST, Vec::new()).await.unwrap_err();
        assert!(matches!(err, FaucetError::MaxCreditReached { .. }));
    }

    #[tokio::test]
    async fn test_transfer_rejects_unknown_denom() {
        let mut runner = existing_account_runner();
        runner.expect_bank_send().never();

        let faucet = Faucet::new(Arc::new(runner), vec![coin_option("uatom", 50, 100)])
            .await
            .unwrap();

        let requested = vec![Coin::new(10u64, "uatom"), Coin::new(10u64, "ujuno")];
        let err = faucet.transfer(DEST, requested).await.unwrap_err();
        assert!(matches!(err, FaucetError::UnknownDenom(d) if d == "ujuno"));

        // the uatom reservation made before the failure was given back
        assert_eq!(faucet.ledger().credited(DEST, "uatom"), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_failed_send_releases_credit() {
        let mut runner = existing_account_runner();
        runner
            .expect_bank_send()
            .with(always(), always(), always(), always())
            .returning(|_, _, _, _| Err(FaucetError::Chain("insufficient fees".to_string())));

        let faucet = Faucet::new(Arc::new(runner), vec![coin_option("uatom", 50, 100)])
            .await
            .unwrap();

        assert!(faucet.transfer(DEST, Vec::new()).await.is_err());
        assert_eq!(faucet.ledger().credited(DEST, "uatom"), Amount::ZERO);
    }

    #[tokio::test]
    async fn test_transfer_rejects_bad_address() {
        let mut runner = existing_account_runner();
        runner.expect_bank_send().never();
        let faucet = Faucet::new(Arc::new(runner), Vec::new()).await.unwrap();

        let err = faucet.transfer("not an address", Vec::new()).await.unwrap_err();
        assert!(matches!(err, FaucetError::InvalidAddress(_)));
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address(DEST).is_ok());
        assert!(validate_address("osmo1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5").is_ok());
        assert!(validate_address("").is_err());
        assert!(validate_address("cosmos").is_err());
        assert!(validate_address("1qypqxpq9").is_err());
        assert!(validate_address("COSMOS1QYPQXPQ9QCRS").is_err());
        assert!(validate_address("cosmos1abc").is_err());
    }
}
