//! Prior testnet contract addresses, token scales and call encoding.

use core_logic::ConfigError;
use ethers::abi::Token;
use ethers::types::{Address, Bytes, U256};
use serde::Deserialize;

pub const PRIOR_ADDRESS: &str = "0xc19Ec2EEBB009b2422514C51F9118026f1cD89ba";
pub const USDC_ADDRESS: &str = "0x109694D75363A75317A8136D80f50F871E81044e";
pub const USDT_ADDRESS: &str = "0x014397DaEa96CaC46DbEdcbce50A42D5e0152B2E";
pub const ROUTER_ADDRESS: &str = "0x0f1DADEcc263eB79AE3e4db0d57c49a8b6178B0B";
pub const FAUCET_ADDRESS: &str = "0xCa602D9E45E1Ed25105Ee43643ea936B8e2Fd6B7";

pub const NETWORK_NAME: &str = "PRIOR TESTNET";

pub const NATIVE_DECIMALS: u32 = 18;
pub const PRIOR_DECIMALS: u32 = 18;
pub const STABLE_DECIMALS: u32 = 6;

pub const SWAP_GAS_LIMIT: u64 = 500_000;

// Function signatures used with `encode_call`
pub const BALANCE_OF: &str = "balanceOf(address)";
pub const APPROVE: &str = "approve(address,uint256)";
pub const LAST_CLAIM_TIME: &str = "lastClaimTime(address)";
pub const CLAIM_COOLDOWN: &str = "claimCooldown()";
pub const CLAIM_TOKENS: &str = "claimTokens()";

/// Token the router swaps PRIOR into. Alternates by cycle parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapTarget {
    Usdc,
    Usdt,
}

impl SwapTarget {
    /// Odd cycles swap to USDC, even cycles to USDT (cycles are 1-based).
    pub fn for_cycle(cycle: u32) -> Self {
        if cycle % 2 == 1 {
            SwapTarget::Usdc
        } else {
            SwapTarget::Usdt
        }
    }

    /// Router selector: `swapPriorToUSDC(uint256)` / `swapPriorToUSDT(uint256)`.
    pub fn selector(&self) -> [u8; 4] {
        match self {
            SwapTarget::Usdc => [0xf3, 0xb6, 0x80, 0x02],
            SwapTarget::Usdt => [0x03, 0xb5, 0x30, 0xa3],
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SwapTarget::Usdc => "USDC",
            SwapTarget::Usdt => "USDT",
        }
    }
}

/// Router calldata: selector followed by the amount as one 32-byte
/// big-endian word.
pub fn encode_swap_call(target: SwapTarget, amount: U256) -> Bytes {
    let mut word = [0u8; 32];
    amount.to_big_endian(&mut word);

    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&target.selector());
    data.extend_from_slice(&word);
    data.into()
}

/// Standard ABI call: `keccak(signature)[..4] ++ abi.encode(args)`.
pub fn encode_call(signature: &str, args: &[Token]) -> Bytes {
    let mut data = ethers::utils::id(signature).to_vec();
    data.extend(ethers::abi::encode(args));
    data.into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    pub prior: String,
    pub usdc: String,
    pub usdt: String,
    pub router: String,
    pub faucet: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            prior: PRIOR_ADDRESS.to_string(),
            usdc: USDC_ADDRESS.to_string(),
            usdt: USDT_ADDRESS.to_string(),
            router: ROUTER_ADDRESS.to_string(),
            faucet: FAUCET_ADDRESS.to_string(),
        }
    }
}

/// Parsed contract addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contracts {
    pub prior: Address,
    pub usdc: Address,
    pub usdt: Address,
    pub router: Address,
    pub faucet: Address,
}

impl Contracts {
    pub fn from_config(config: &ContractsConfig) -> Result<Self, ConfigError> {
        let parse = |field: &str, value: &str| {
            value
                .parse::<Address>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: format!("contracts.{}", field),
                    reason: e.to_string(),
                })
        };

        Ok(Self {
            prior: parse("prior", &config.prior)?,
            usdc: parse("usdc", &config.usdc)?,
            usdt: parse("usdt", &config.usdt)?,
            router: parse("router", &config.router)?,
            faucet: parse("faucet", &config.faucet)?,
        })
    }

    pub fn token_for(&self, target: SwapTarget) -> Address {
        match target {
            SwapTarget::Usdc => self.usdc,
            SwapTarget::Usdt => self.usdt,
        }
    }
}
