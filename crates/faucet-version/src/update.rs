//! Upgrade availability checks.

use crate::error::VersionResult;
use crate::registry::ReleaseRegistry;
use crate::tag::{parse_tolerant, VersionTag};
use semver::Version;
use std::cmp::Ordering;
use std::time::Duration;
use tracing::debug;

/// Upper bound for the advisory check run before each command.
pub const CHECK_VERSION_TIMEOUT: Duration = Duration::from_millis(600);

/// Outcome of comparing the running tag with the latest release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextVersion {
    pub available: bool,
    /// Latest published tag, empty when nothing was compared
    pub tag: String,
}

/// Check whether a release newer than `current` has been published.
///
/// Sentinel builds already track the tip of the source tree, so they are
/// never offered an upgrade and the registry is not contacted.
pub async fn check_next(
    registry: &dyn ReleaseRegistry,
    current: &VersionTag,
) -> VersionResult<NextVersion> {
    let current = match current {
        VersionTag::Release(tag) => tag,
        VersionTag::Development | VersionTag::Nightly => return Ok(NextVersion::default()),
    };

    let latest_tag = match registry.latest_release_tag().await? {
        Some(tag) => tag,
        None => return Ok(NextVersion::default()),
    };

    let current_version = parse_tolerant(current)?;
    let latest_version = parse_tolerant(&latest_tag)?;

    Ok(NextVersion {
        available: precedence(&latest_version, &current_version) == Ordering::Greater,
        tag: latest_tag,
    })
}

/// Semver precedence: build metadata does not participate.
fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Best-effort variant of [`check_next`] bounded by `limit`.
///
/// Returns the newer tag when one exists. Errors and timeouts are swallowed;
/// dropping the pending lookup leaves nothing behind.
pub async fn check_new_version(
    registry: &dyn ReleaseRegistry,
    current: &VersionTag,
    limit: Duration,
) -> Option<String> {
    match tokio::time::timeout(limit, check_next(registry, current)).await {
        Ok(Ok(next)) if next.available => Some(next.tag),
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            debug!("Update check failed: {}", e);
            None
        }
        Err(_) => {
            debug!("Update check abandoned after {:?}", limit);
            None
        }
    }
}
