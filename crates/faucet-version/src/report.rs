//! Human readable version report.

use crate::build_info::{BuildInfo, BuildInfoCollector};
use crate::error::VersionResult;
use crate::registry::ReleaseRegistry;
use crate::resolve::resolve;
use crate::tag::VersionTag;
use serde::Serialize;

const TAB_WIDTH: usize = 8;

/// Everything printed by `faucet version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionReport {
    pub version: String,
    pub build_from_source: bool,
    #[serde(flatten)]
    pub build: BuildInfo,
}

impl VersionReport {
    /// Collect build info and resolve the display version of `tag`.
    pub async fn collect(
        registry: &dyn ReleaseRegistry,
        collector: &BuildInfoCollector,
        tag: &VersionTag,
    ) -> VersionResult<Self> {
        let build = collector.collect().await?;
        let version = resolve(registry, tag).await;

        Ok(Self {
            version,
            build_from_source: tag.from_source(),
            build,
        })
    }

    /// Tab-aligned, one fact per line.
    pub fn long(&self) -> String {
        let mut rows = vec![
            ("Version", self.version.clone()),
            ("Build date", self.build.build_date.clone()),
            ("Source hash", self.build.revision.clone()),
            ("Your OS", self.build.os.clone()),
            ("Your arch", self.build.arch.clone()),
            ("Your rust version", self.build.toolchain_version.clone()),
            (
                "Your uname -a",
                self.build.host_descriptor.clone().unwrap_or_default(),
            ),
        ];

        if let Some(cwd) = &self.build.working_directory {
            rows.push(("Your cwd", cwd.display().to_string()));
        }

        align(&rows)
    }
}

/// Pad `key:` cells with tabs so every value starts on the same tab stop.
fn align(rows: &[(&str, String)]) -> String {
    let widest = rows.iter().map(|(key, _)| key.len() + 1).max().unwrap_or(0);
    let column = (widest / TAB_WIDTH + 1) * TAB_WIDTH;

    let mut out = String::new();
    for (key, value) in rows {
        let cell = key.len() + 1;
        let tabs = (column - cell).div_ceil(TAB_WIDTH);
        out.push_str(key);
        out.push(':');
        out.push_str(&"\t".repeat(tabs));
        out.push_str(value);
        out.push('\n');
    }
    out
}
