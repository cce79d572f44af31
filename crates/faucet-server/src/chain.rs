//! Chain CLI integration for the faucet server.
//!
//! Every chain interaction goes through the node's own command line binary
//! (`gaiad`, `simd`, ...), configured once through [`ChainCmd`].

use crate::coin::{format_coins, Coin};
use crate::error::{FaucetError, FaucetResult};
use crate::keyring::KeyringBackend;
use crate::sdk::SdkVersion;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Setting applied to every chain command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCmdOption {
    KeyringPassword(String),
    KeyringBackend(KeyringBackend),
    /// Ask the node for its chain id instead of requiring one
    AutoChainIdDetection,
    ChainId(String),
    NodeAddress(String),
    Version(SdkVersion),
    Home(PathBuf),
}

/// Chain CLI binary plus the flags shared by all of its invocations.
#[derive(Debug, Clone, Default)]
pub struct ChainCmd {
    binary: String,
    keyring_password: Option<String>,
    keyring_backend: KeyringBackend,
    auto_chain_id: bool,
    chain_id: Option<String>,
    node_address: Option<String>,
    version: SdkVersion,
    home: Option<PathBuf>,
}

impl ChainCmd {
    pub fn new(binary: impl Into<String>, options: Vec<ChainCmdOption>) -> Self {
        let mut cmd = Self {
            binary: binary.into(),
            ..Default::default()
        };

        for option in options {
            match option {
                ChainCmdOption::KeyringPassword(password) => cmd.keyring_password = Some(password),
                ChainCmdOption::KeyringBackend(backend) => cmd.keyring_backend = backend,
                ChainCmdOption::AutoChainIdDetection => cmd.auto_chain_id = true,
                ChainCmdOption::ChainId(id) => cmd.chain_id = Some(id),
                ChainCmdOption::NodeAddress(node) => cmd.node_address = Some(node),
                ChainCmdOption::Version(version) => cmd.version = version,
                ChainCmdOption::Home(home) => cmd.home = Some(home),
            }
        }

        cmd
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn version(&self) -> &SdkVersion {
        &self.version
    }

    pub fn home(&self) -> Option<&PathBuf> {
        self.home.as_ref()
    }

    fn keyring_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(backend) = self.keyring_backend.flag_value() {
            args.extend(["--keyring-backend".to_string(), backend.to_string()]);
        }
        args.extend(self.home_args());
        args
    }

    fn home_args(&self) -> Vec<String> {
        match &self.home {
            Some(home) => vec!["--home".to_string(), home.display().to_string()],
            None => Vec::new(),
        }
    }

    fn node_args(&self) -> Vec<String> {
        match &self.node_address {
            Some(node) => vec!["--node".to_string(), node.clone()],
            None => Vec::new(),
        }
    }

    fn broadcast_mode(&self) -> &'static str {
        if self.version.supports_block_broadcast() {
            "block"
        } else {
            "sync"
        }
    }
}

/// Key held in the chain CLI keyring
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub name: String,
    pub address: String,
}

/// Chain operations the faucet engine depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainRunner: Send + Sync {
    /// Chain id of the network the node belongs to.
    async fn chain_id(&self) -> FaucetResult<String>;

    /// Look up a key by name, `None` when the keyring does not hold it.
    async fn show_account(&self, name: &str) -> FaucetResult<Option<Account>>;

    /// Create a key, restoring it from `mnemonic` when one is given.
    async fn add_account(
        &self,
        name: &str,
        mnemonic: Option<String>,
        coin_type: &str,
    ) -> FaucetResult<Account>;

    /// Send `coins` from the `from` key to `to`, returning the tx hash.
    async fn bank_send(
        &self,
        from: &str,
        to: &str,
        coins: &[Coin],
        fee: Option<Coin>,
    ) -> FaucetResult<String>;
}

/// [`ChainRunner`] that shells out to the chain CLI binary.
#[derive(Debug, Clone)]
pub struct CliRunner {
    cmd: ChainCmd,
    /// Chain id reported by the node, detected once
    detected_chain_id: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    txhash: String,
    #[serde(default)]
    code: u32,
    #[serde(default)]
    raw_log: String,
}

impl CliRunner {
    pub fn new(cmd: ChainCmd) -> Self {
        Self {
            cmd,
            detected_chain_id: OnceCell::new(),
        }
    }

    pub fn cmd(&self) -> &ChainCmd {
        &self.cmd
    }

    async fn exec(&self, args: &[String], stdin: Option<String>) -> FaucetResult<Output> {
        let subcommand = args
            .iter()
            .take_while(|arg| !arg.starts_with('-'))
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        debug!("Running {} {}", self.cmd.binary, subcommand);

        let mut child = Command::new(&self.cmd.binary)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FaucetError::Chain(format!("failed to run {}: {}", self.cmd.binary, e))
            })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(FaucetError::Chain(format!(
                "{} {}: {}",
                self.cmd.binary,
                subcommand,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(output)
    }

    fn password_input(&self, repeat: usize) -> Option<String> {
        self.cmd
            .keyring_password
            .as_ref()
            .map(|password| format!("{}\n", password).repeat(repeat))
    }
}

/// Some SDK versions print JSON to stderr instead of stdout.
fn json_output(output: &Output) -> FaucetResult<Value> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if stdout.trim().is_empty() {
        String::from_utf8_lossy(&output.stderr)
    } else {
        stdout
    };

    serde_json::from_str(text.trim())
        .map_err(|e| FaucetError::Chain(format!("unexpected chain output: {}", e)))
}

fn network_of(status: &Value) -> Option<String> {
    ["node_info", "NodeInfo"]
        .iter()
        .find_map(|key| status.get(key)?.get("network")?.as_str())
        .map(str::to_string)
}

fn account_of(value: Value) -> FaucetResult<Account> {
    serde_json::from_value(value)
        .map_err(|e| FaucetError::Chain(format!("unexpected key output: {}", e)))
}

#[async_trait]
impl ChainRunner for CliRunner {
    async fn chain_id(&self) -> FaucetResult<String> {
        if let Some(chain_id) = &self.cmd.chain_id {
            return Ok(chain_id.clone());
        }
        if !self.cmd.auto_chain_id {
            return Err(FaucetError::Chain("chain id is not configured".to_string()));
        }

        self.detected_chain_id
            .get_or_try_init(|| async {
                let mut args = vec!["status".to_string()];
                args.extend(self.cmd.node_args());
                let output = self.exec(&args, None).await?;

                network_of(&json_output(&output)?).ok_or_else(|| {
                    FaucetError::Chain("node status did not report a network".to_string())
                })
            })
            .await
            .cloned()
    }

    async fn show_account(&self, name: &str) -> FaucetResult<Option<Account>> {
        let mut args = vec![
            "keys".to_string(),
            "show".to_string(),
            name.to_string(),
            "--output".to_string(),
            "json".to_string(),
        ];
        args.extend(self.cmd.keyring_args());

        match self.exec(&args, self.password_input(1)).await {
            Ok(output) => Ok(Some(account_of(json_output(&output)?)?)),
            Err(FaucetError::Chain(message)) if message.contains("not found") => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn add_account(
        &self,
        name: &str,
        mnemonic: Option<String>,
        coin_type: &str,
    ) -> FaucetResult<Account> {
        let mut args = vec![
            "keys".to_string(),
            "add".to_string(),
            name.to_string(),
            "--output".to_string(),
            "json".to_string(),
            "--coin-type".to_string(),
            coin_type.to_string(),
        ];

        let mut input = String::new();
        if let Some(mnemonic) = mnemonic {
            args.push("--recover".to_string());
            input.push_str(mnemonic.trim());
            input.push('\n');
        }
        input.push_str(&self.password_input(2).unwrap_or_default());
        args.extend(self.cmd.keyring_args());

        let output = self
            .exec(&args, (!input.is_empty()).then_some(input))
            .await?;
        let account = account_of(json_output(&output)?)?;

        info!("Added account {} ({})", account.name, account.address);
        Ok(account)
    }

    async fn bank_send(
        &self,
        from: &str,
        to: &str,
        coins: &[Coin],
        fee: Option<Coin>,
    ) -> FaucetResult<String> {
        let chain_id = self.chain_id().await?;

        let mut args = vec![
            "tx".to_string(),
            "bank".to_string(),
            "send".to_string(),
            from.to_string(),
            to.to_string(),
            format_coins(coins),
            "--yes".to_string(),
            "--output".to_string(),
            "json".to_string(),
            "--chain-id".to_string(),
            chain_id,
            "--broadcast-mode".to_string(),
            self.cmd.broadcast_mode().to_string(),
        ];
        if let Some(fee) = fee.filter(|fee| !fee.amount.is_zero()) {
            args.extend(["--fees".to_string(), fee.to_string()]);
        }
        args.extend(self.cmd.node_args());
        args.extend(self.cmd.keyring_args());

        let output = self.exec(&args, self.password_input(1)).await?;
        let response: TxResponse = serde_json::from_value(json_output(&output)?)
            .map_err(|e| FaucetError::Chain(format!("unexpected tx output: {}", e)))?;

        if response.code != 0 {
            return Err(FaucetError::Chain(format!(
                "tx {} failed with code {}: {}",
                response.txhash, response.code, response.raw_log
            )));
        }

        Ok(response.txhash)
    }
}
