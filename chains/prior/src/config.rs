use crate::contracts::{ContractsConfig, SWAP_GAS_LIMIT};
use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::{ConfigError, DelayRange, WalletManager};
use serde::Deserialize;

pub const DEFAULT_RPC_URL: &str = "https://rpc.testnet.prior.network";
pub const DEFAULT_PROXY_FILE: &str = "proxies.txt";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PriorConfig {
    pub rpc_url: String,
    /// Queried from the node when unset.
    pub chain_id: Option<u64>,
    pub request_timeout_secs: u64,
    pub wallet_file: String,
    pub proxy_file: String,
    pub contracts: ContractsConfig,
    pub swap: SwapConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SwapConfig {
    /// PRIOR per swap, lower bound.
    pub min_amount: f64,
    pub max_amount: f64,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
    pub gas_limit: u64,
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: None,
            request_timeout_secs: 30,
            wallet_file: WalletManager::WALLET_FILE.to_string(),
            proxy_file: DEFAULT_PROXY_FILE.to_string(),
            contracts: ContractsConfig::default(),
            swap: SwapConfig::default(),
        }
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            min_amount: 0.001,
            max_amount: 0.01,
            min_delay_secs: 30,
            max_delay_secs: 60,
            gas_limit: SWAP_GAS_LIMIT,
        }
    }
}

impl SwapConfig {
    pub fn delay(&self) -> DelayRange {
        DelayRange::from_secs(self.min_delay_secs, self.max_delay_secs)
    }
}

impl PriorConfig {
    /// Loads `path` if present, then `PRIOR__*` environment overrides, then
    /// the bare `RPC_URL` variable.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("PRIOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: PriorConfig = settings.try_deserialize()?;
        if let Some(url) = std::env::var("RPC_URL").ok().filter(|u| !u.trim().is_empty()) {
            config.rpc_url = url.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_url.clone(),
            });
        }

        let swap = &self.swap;
        if !(swap.min_amount > 0.0) || !(swap.max_amount > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "swap.min_amount".to_string(),
                reason: "swap amounts must be positive".to_string(),
            });
        }
        if swap.min_amount > swap.max_amount {
            return Err(ConfigError::InvalidValue {
                field: "swap.max_amount".to_string(),
                reason: format!(
                    "max_amount {} is below min_amount {}",
                    swap.max_amount, swap.min_amount
                ),
            });
        }
        if swap.gas_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "swap.gas_limit".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
