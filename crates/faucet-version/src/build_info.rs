//! Provenance of the running binary.

use crate::error::{VersionError, VersionResult};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Placeholder for provenance facts that were not embedded at build time.
pub const UNDEFINED: &str = "undefined";

/// Embedded source revision, set by the build script when git is available.
const GIT_REVISION: Option<&str> = option_env!("FAUCET_GIT_REVISION");
const GIT_COMMIT_DATE: Option<&str> = option_env!("FAUCET_GIT_COMMIT_DATE");
const GIT_DIRTY: Option<&str> = option_env!("FAUCET_GIT_DIRTY");

/// Snapshot of build and host facts, captured once per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    /// Source revision, suffixed with `*` when built from a modified tree
    pub revision: String,
    pub build_date: String,
    pub toolchain_version: String,
    pub os: String,
    pub arch: String,
    pub host_descriptor: Option<String>,
    pub working_directory: Option<PathBuf>,
}

/// Collects [`BuildInfo`] by combining embedded metadata with local probes.
#[derive(Debug, Clone)]
pub struct BuildInfoCollector {
    toolchain_probe: Vec<String>,
    host_probe: Vec<String>,
}

impl Default for BuildInfoCollector {
    fn default() -> Self {
        Self {
            toolchain_probe: vec!["rustc".to_string(), "--version".to_string()],
            host_probe: vec!["uname".to_string(), "-a".to_string()],
        }
    }
}

impl BuildInfoCollector {
    /// Collector running custom probe commands instead of `rustc` and `uname`.
    pub fn with_probes(toolchain_probe: Vec<String>, host_probe: Vec<String>) -> Self {
        Self {
            toolchain_probe,
            host_probe,
        }
    }

    /// Gather build info.
    ///
    /// Fails only when the toolchain probe cannot run. A host probe binary
    /// missing from `PATH` just leaves the descriptor empty.
    pub async fn collect(&self) -> VersionResult<BuildInfo> {
        let revision = embedded_revision(GIT_REVISION, GIT_DIRTY);
        let build_date = GIT_COMMIT_DATE.unwrap_or(UNDEFINED).to_string();

        let toolchain_version = run_probe(&self.toolchain_probe).await?;

        let host_descriptor = match self.host_probe.first() {
            Some(program) if is_command_available(program) => {
                Some(run_probe(&self.host_probe).await?)
            }
            _ => {
                debug!("Host probe unavailable, skipping host descriptor");
                None
            }
        };

        Ok(BuildInfo {
            revision,
            build_date,
            toolchain_version,
            os: env::consts::OS.to_string(),
            arch: env::consts::ARCH.to_string(),
            host_descriptor,
            working_directory: env::current_dir().ok(),
        })
    }
}

fn embedded_revision(revision: Option<&str>, dirty: Option<&str>) -> String {
    match revision {
        Some(head) if dirty == Some("true") => format!("{}*", head),
        Some(head) => head.to_string(),
        None => UNDEFINED.to_string(),
    }
}

/// Run a probe command and return its trimmed standard output.
async fn run_probe(command: &[String]) -> VersionResult<String> {
    let (program, args) = command.split_first().ok_or_else(|| {
        VersionError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty probe command",
        ))
    })?;

    let output = Command::new(program).args(args).output().await?;
    if !output.status.success() {
        return Err(VersionError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{} exited with {}", program, output.status),
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Whether `program` resolves to a file, either directly or through `PATH`.
pub fn is_command_available(program: &str) -> bool {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file();
    }

    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
