//! Display version resolution.

use crate::registry::ReleaseRegistry;
use crate::tag::VersionTag;
use tracing::debug;

/// Turn a build tag into the version shown to users.
///
/// Release tags are returned as-is. Sentinel tags are expanded to the latest
/// published release suffixed with `-dev` or `-nightly`. Lookup failures fall
/// back to the raw sentinel, so this never fails.
pub async fn resolve(registry: &dyn ReleaseRegistry, tag: &VersionTag) -> String {
    let suffix = match tag {
        VersionTag::Release(release) => return release.clone(),
        VersionTag::Development => "dev",
        VersionTag::Nightly => "nightly",
    };

    match registry.latest_release_tag().await {
        Ok(Some(latest)) => format!("{}-{}", latest, suffix),
        Ok(None) => tag.to_string(),
        Err(e) => {
            debug!("Falling back to raw version {}: {}", tag, e);
            tag.to_string()
        }
    }
}
