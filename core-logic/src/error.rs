//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid proxy line '{line}': {reason}")]
    InvalidProxy { line: String, reason: String },
}

/// Wallet and key loading errors
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("No wallet source found: provide {key_file} or set {env_key}")]
    NoWalletSource { key_file: String, env_key: String },

    #[error("Invalid private key format in {source_name}: expected 64 hex characters")]
    InvalidKeyFormat { source_name: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },
}

/// Network and RPC-related errors.
///
/// Every variant is recoverable at the call site: callers log it against the
/// wallet in question and move on.
#[derive(Error, Debug, Clone)]
pub enum RpcError {
    #[error("RPC request timeout to {endpoint}")]
    Timeout { endpoint: String },

    #[error("Connection refused to {endpoint}: {reason}")]
    ConnectionRefused { endpoint: String, reason: String },

    #[error("Execution reverted: {reason}")]
    Reverted { reason: String },

    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Invalid private key: {reason}")]
    InvalidKey { reason: String },

    #[error("{0}")]
    Transport(String),
}

impl RpcError {
    /// Classifies a transport/provider error message into a typed variant.
    pub fn from_message(endpoint: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("timed out") || lower.contains("timeout") {
            RpcError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if lower.contains("connection refused") || lower.contains("error trying to connect")
        {
            RpcError::ConnectionRefused {
                endpoint: endpoint.to_string(),
                reason: message,
            }
        } else if lower.contains("revert") {
            RpcError::Reverted { reason: message }
        } else {
            RpcError::Transport(message)
        }
    }
}
