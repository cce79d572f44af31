//! Error handling for the faucet server.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Faucet server error types
#[derive(Error, Debug)]
pub enum FaucetError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid account address: {0}")]
    InvalidAddress(String),

    #[error("Invalid coin: {0}")]
    InvalidCoin(String),

    #[error("Denomination {0:?} is not distributed by this faucet")]
    UnknownDenom(String),

    #[error("Account has reached the maximum allowed amount ({max}) for {denom:?} denom")]
    MaxCreditReached { max: String, denom: String },

    #[error("Chain command failed: {0}")]
    Chain(String),

    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Version error: {0}")]
    Version(#[from] faucet_version::VersionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl FaucetError {
    /// HTTP status reported to clients for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            FaucetError::InvalidRequest(_)
            | FaucetError::InvalidAddress(_)
            | FaucetError::InvalidCoin(_)
            | FaucetError::UnknownDenom(_)
            | FaucetError::Version(_) => StatusCode::BAD_REQUEST,
            FaucetError::MaxCreditReached { .. } => StatusCode::TOO_MANY_REQUESTS,
            FaucetError::InvalidConfig(_)
            | FaucetError::Chain(_)
            | FaucetError::Bind { .. }
            | FaucetError::Io(_)
            | FaucetError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FaucetError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error_message = if status.is_server_error() {
            match self {
                FaucetError::Chain(_) => "Transaction failed".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for faucet operations
pub type FaucetResult<T> = Result<T, FaucetError>;
