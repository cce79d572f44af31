//! # Faucet Version
//!
//! Runtime metadata for the faucet binary:
//!
//! - [`build_info`]: provenance of the running binary (revision, build date,
//!   toolchain, host)
//! - [`tag`]: the build tag, its two sentinels and tolerant semver parsing
//! - [`resolve`]: the display version, expanded from the latest release for
//!   sentinel builds
//! - [`update`]: best-effort checks for a newer published release
//! - [`registry`]: where the latest release comes from (GitHub releases)
//! - [`report`]: the multi-line report printed by `faucet version`

pub mod build_info;
pub mod error;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod tag;
pub mod update;

#[cfg(test)]
mod test_support;

pub use build_info::{BuildInfo, BuildInfoCollector};
pub use error::{VersionError, VersionResult};
pub use registry::{GithubReleases, ReleaseRegistry};
pub use report::VersionReport;
pub use resolve::resolve;
pub use tag::{parse_tolerant, VersionTag};
pub use update::{check_new_version, check_next, NextVersion, CHECK_VERSION_TIMEOUT};
