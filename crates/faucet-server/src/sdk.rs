//! Cosmos SDK versions targeted by the chain CLI.

use crate::error::FaucetError;
use faucet_version::parse_tolerant;
use semver::Version;
use std::fmt;
use std::str::FromStr;

/// Most recent SDK line known to the faucet, used when none is configured.
pub const LATEST_SDK_VERSION: &str = "v0.50.1";

/// Version of the Cosmos SDK the target chain is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkVersion(Version);

impl SdkVersion {
    pub fn latest() -> Self {
        Self(Version::new(0, 50, 1))
    }

    pub fn version(&self) -> &Version {
        &self.0
    }

    /// `tx` commands stopped supporting `--broadcast-mode block` in v0.47.
    pub fn supports_block_broadcast(&self) -> bool {
        (self.0.major, self.0.minor) < (0, 47)
    }
}

impl Default for SdkVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for SdkVersion {
    type Err = FaucetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tolerant(s)
            .map(SdkVersion)
            .map_err(|e| FaucetError::InvalidConfig(format!("invalid sdk version: {}", e)))
    }
}
