//! Faucet server for Cosmos SDK chains.
//!
//! The server drives a chain's command line binary (`gaiad`, `simd`, ...)
//! to hand out tokens:
//! 1. Flags and environment variables are compiled into chain and faucet options
//! 2. The faucet account is looked up, imported or created through the chain CLI
//! 3. `POST /` credits an address, bounded by a per-account max credit
//! 4. `GET /` and `GET /info` describe the faucet, `GET /version` the build

pub mod chain;
pub mod coin;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod keyring;
pub mod options;
pub mod sdk;
pub mod state;

pub use config::{compile, CompiledConfig, FaucetConfig};
pub use engine::Faucet;
pub use error::{FaucetError, FaucetResult};
pub use options::FaucetOption;
