//! # Core Logic - Shared Utilities for Testnet Framework
//!
//! This crate provides shared utilities used across all chain implementations.
//! It includes wallet key loading, proxy handling, configuration, and logging.
//!
//! ## Modules
//!
//! - [`config`] - Proxy descriptors and wallet source descriptions
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Log sink trait and the closed severity set
//! - [`utils`] - Utility modules (wallet, proxy, pacing, logger)

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod error;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{ProxyCredentials, ProxyDescriptor, WalletSource};
pub use error::{ConfigError, RpcError, WalletError};
pub use traits::{LogSink, Severity, TracingSink};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    format_cooldown, format_wait, setup_logger, wait_with_cancel, DelayRange, LoadedKeys,
    ProxyAgent, ProxyRegistry, SecretKey, WalletManager, WorkerRunner, DASHBOARD_TARGET,
};
