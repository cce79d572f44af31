//! Main entry point for the faucet server.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use faucet_server::{config::FaucetConfig, http::start_server};
use faucet_version::{
    check_new_version, BuildInfoCollector, GithubReleases, ReleaseRegistry, VersionReport,
    VersionTag, CHECK_VERSION_TIMEOUT,
};
use std::{io, sync::Arc};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const RELEASES_URL: &str = "https://github.com/ignite/faucet/releases";

#[derive(Debug, Parser)]
#[command(name = "faucet", about = "Token faucet for Cosmos SDK chains")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    config: FaucetConfig,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the current build information
    Version,
    /// Generate the autocompletion script for the specified shell
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let registry: Arc<dyn ReleaseRegistry> = Arc::new(GithubReleases::new()?);

    if should_check_for_update(&cli.command) {
        if let Some(tag) =
            check_new_version(registry.as_ref(), &VersionTag::current(), CHECK_VERSION_TIMEOUT)
                .await
        {
            println!("{}", upgrade_advisory(&tag));
        }
    }

    match cli.command {
        Some(Commands::Version) => {
            let report = VersionReport::collect(
                registry.as_ref(),
                &BuildInfoCollector::default(),
                &VersionTag::current(),
            )
            .await?;
            print!("{}", report.long());
        }
        Some(Commands::Completion { shell }) => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
        }
        None => start_server(&cli.config, registry).await?,
    }

    Ok(())
}

/// Commands whose stdout is consumed by tools skip the release lookup.
fn should_check_for_update(command: &Option<Commands>) -> bool {
    !matches!(
        command,
        Some(Commands::Version) | Some(Commands::Completion { .. })
    )
}

fn upgrade_advisory(tag: &str) -> String {
    format!(
        "⬆️ Faucet {} is available! To upgrade: {}/{}",
        tag, RELEASES_URL, tag
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["faucet", "--port", "9000", "--denoms", "uatom,stake"])
            .unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.config.port, 9000);
        assert_eq!(cli.config.denoms, "uatom,stake");
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["faucet", "version"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Version)));

        let cli = Cli::try_parse_from(["faucet", "completion", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Completion { shell: Shell::Bash })
        ));

        assert!(Cli::try_parse_from(["faucet", "completion", "cmd"]).is_err());
    }

    #[test]
    fn test_update_check_skip_policy() {
        assert!(should_check_for_update(&None));
        assert!(!should_check_for_update(&Some(Commands::Version)));
        assert!(!should_check_for_update(&Some(Commands::Completion {
            shell: Shell::Zsh
        })));
    }

    #[test]
    fn test_upgrade_advisory() {
        assert_eq!(
            upgrade_advisory("v0.2.0"),
            "⬆️ Faucet v0.2.0 is available! To upgrade: https://github.com/ignite/faucet/releases/v0.2.0"
        );
    }
}
