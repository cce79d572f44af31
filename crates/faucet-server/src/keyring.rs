//! Keyring backends understood by Cosmos SDK chain CLIs.

use crate::error::FaucetError;
use std::fmt;
use std::str::FromStr;

/// Storage used by the chain CLI to hold signing keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyringBackend {
    /// Leave the choice to the chain CLI
    #[default]
    Unspecified,
    Os,
    File,
    Pass,
    Test,
    Kwallet,
    Memory,
}

impl KeyringBackend {
    pub const ALL: [KeyringBackend; 7] = [
        KeyringBackend::Unspecified,
        KeyringBackend::Os,
        KeyringBackend::File,
        KeyringBackend::Pass,
        KeyringBackend::Test,
        KeyringBackend::Kwallet,
        KeyringBackend::Memory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KeyringBackend::Unspecified => "",
            KeyringBackend::Os => "os",
            KeyringBackend::File => "file",
            KeyringBackend::Pass => "pass",
            KeyringBackend::Test => "test",
            KeyringBackend::Kwallet => "kwallet",
            KeyringBackend::Memory => "memory",
        }
    }

    /// Value for `--keyring-backend`, if one should be passed at all.
    pub fn flag_value(self) -> Option<&'static str> {
        match self {
            KeyringBackend::Unspecified => None,
            backend => Some(backend.as_str()),
        }
    }
}

impl fmt::Display for KeyringBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyringBackend {
    type Err = FaucetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyringBackend::ALL
            .into_iter()
            .find(|backend| backend.as_str() == s)
            .ok_or_else(|| FaucetError::InvalidConfig(format!("unknown keyring backend {:?}", s)))
    }
}
