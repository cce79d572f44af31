//! Error types for version resolution and build info collection.

use thiserror::Error;

/// Errors raised while collecting build info or checking for releases.
#[derive(Error, Debug)]
pub enum VersionError {
    /// The release registry could not be reached
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The release registry answered with something unusable
    #[error("Registry error: {0}")]
    Registry(String),

    /// A tag could not be parsed as a semantic version
    #[error("Invalid version {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: semver::Error,
    },

    /// A local probe command could not be executed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for version results.
pub type VersionResult<T> = Result<T, VersionError>;
