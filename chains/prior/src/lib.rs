//! Prior testnet automation: faucet claims and approve+swap cycles across a
//! set of wallets, each optionally behind its own proxy.

pub mod app;
pub mod client;
pub mod config;
pub mod contracts;
pub mod dashboard;
pub mod faucet;
pub mod menu;
pub mod refresher;
pub mod swap;
pub mod wallet;

pub use app::{PriorApp, PriorContext};
pub use client::{ChainClient, Connector, EthersConnector, TransactionOutcome, TxStatus};
pub use dashboard::{Dashboard, EventLog};
pub use faucet::{ClaimReport, FaucetClaimer};
pub use refresher::BalanceRefresher;
pub use swap::{SwapOrchestrator, SwapRunReport, SwapSettings};
pub use wallet::{WalletRecord, WalletSet, WalletTable};
