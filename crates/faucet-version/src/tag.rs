//! Version tags of the running binary and tolerant semver parsing.

use crate::error::{VersionError, VersionResult};
use semver::Version;
use std::fmt;

/// Raw tag used when the binary was built from an untagged source tree.
pub const VERSION_DEV: &str = "development";

/// Raw tag used for nightly builds.
pub const VERSION_NIGHTLY: &str = "nightly";

/// Raw tag baked in at compile time through `FAUCET_VERSION`.
pub const VERSION: &str = match option_env!("FAUCET_VERSION") {
    Some(version) => version,
    None => VERSION_DEV,
};

/// Build tag of a faucet binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionTag {
    /// A published release such as `v0.2.1`
    Release(String),
    /// Built from source without a tag
    Development,
    /// Built by the nightly pipeline
    Nightly,
}

impl VersionTag {
    /// Tag of the running binary.
    pub fn current() -> Self {
        Self::from_raw(VERSION)
    }

    /// Classify a raw tag string, mapping the two sentinels.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            VERSION_DEV => Self::Development,
            VERSION_NIGHTLY => Self::Nightly,
            tag => Self::Release(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Release(tag) => tag,
            Self::Development => VERSION_DEV,
            Self::Nightly => VERSION_NIGHTLY,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Self::Release(_))
    }

    /// True when the binary was built from source rather than released.
    pub fn from_source(&self) -> bool {
        *self == Self::Development
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a version leniently.
///
/// Accepts surrounding whitespace, an optional `v` prefix, leading zeros in
/// numeric components and shortened forms like `1` or `1.2`, which are padded
/// with zeros. Shortened forms may not carry pre-release or build metadata.
pub fn parse_tolerant(input: &str) -> VersionResult<Version> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let mut parts: Vec<String> = trimmed
        .splitn(3, '.')
        .map(|part| {
            if part.len() > 1 {
                let stripped = part.trim_start_matches('0');
                if stripped.starts_with(|c: char| c.is_ascii_digit()) {
                    stripped.to_string()
                } else {
                    format!("0{}", stripped)
                }
            } else {
                part.to_string()
            }
        })
        .collect();

    if parts.len() < 3 {
        let short_with_meta = parts
            .last()
            .map(|last| last.contains(&['+', '-'][..]))
            .unwrap_or(false);
        if short_with_meta {
            // strict parsing rejects the shortened form and says why
            return Version::parse(trimmed).map_err(|source| VersionError::Parse {
                input: input.to_string(),
                source,
            });
        }
        while parts.len() < 3 {
            parts.push("0".to_string());
        }
    }

    Version::parse(&parts.join(".")).map_err(|source| VersionError::Parse {
        input: input.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_sentinels() {
        assert_eq!(VersionTag::from_raw("development"), VersionTag::Development);
        assert_eq!(VersionTag::from_raw("nightly"), VersionTag::Nightly);
        assert_eq!(
            VersionTag::from_raw("v0.2.1"),
            VersionTag::Release("v0.2.1".to_string())
        );
    }

    #[test]
    fn test_as_str_round_trips_raw() {
        for raw in ["development", "nightly", "v1.0.0", "0.3.0-rc1"] {
            assert_eq!(VersionTag::from_raw(raw).as_str(), raw);
        }
    }

    #[test]
    fn test_sentinel_flags() {
        assert!(VersionTag::Development.is_sentinel());
        assert!(VersionTag::Nightly.is_sentinel());
        assert!(!VersionTag::Release("v1.0.0".into()).is_sentinel());

        assert!(VersionTag::Development.from_source());
        assert!(!VersionTag::Nightly.from_source());
    }

    #[test]
    fn test_parse_tolerant_prefix_and_whitespace() {
        assert_eq!(parse_tolerant("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_tolerant(" 1.2.3\n").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_tolerant_short_forms() {
        assert_eq!(parse_tolerant("v1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(parse_tolerant("1.4").unwrap(), Version::new(1, 4, 0));
    }

    #[test]
    fn test_parse_tolerant_leading_zeros() {
        assert_eq!(parse_tolerant("v01.002.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_tolerant("0.00.1").unwrap(), Version::new(0, 0, 1));
    }

    #[test]
    fn test_parse_tolerant_pre_release() {
        let version = parse_tolerant("v0.50.1-rc.2").unwrap();
        assert_eq!(version.pre.as_str(), "rc.2");
    }

    #[test]
    fn test_parse_tolerant_rejects_garbage() {
        assert!(parse_tolerant("").is_err());
        assert!(parse_tolerant("latest").is_err());
        assert!(parse_tolerant("v1.2-beta").is_err());
        assert!(parse_tolerant("1.x.3").is_err());
    }
}
