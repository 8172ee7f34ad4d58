use crate::client::{ChainClient, Connector};
use crate::contracts::Contracts;
use crate::dashboard::Dashboard;
use crate::faucet::FaucetClaimer;
use crate::refresher::BalanceRefresher;
use crate::swap::{SwapOrchestrator, SwapSettings};
use crate::wallet::{WalletRecord, WalletTable};
use core_logic::{ProxyRegistry, RpcError};
use std::sync::Arc;

/// Everything a worker needs: the wallet table, a way to reach the chain
/// and somewhere to report.
#[derive(Clone)]
pub struct PriorContext {
    pub wallets: WalletTable,
    pub connector: Arc<dyn Connector>,
    pub dashboard: Arc<dyn Dashboard>,
    pub contracts: Contracts,
}

impl PriorContext {
    pub fn new(
        wallets: WalletTable,
        connector: Arc<dyn Connector>,
        dashboard: Arc<dyn Dashboard>,
        contracts: Contracts,
    ) -> Self {
        Self {
            wallets,
            connector,
            dashboard,
            contracts,
        }
    }

    /// Connects `record` through its own proxy, if it has one.
    pub async fn connect(&self, record: &WalletRecord) -> Result<Arc<dyn ChainClient>, RpcError> {
        let agent = ProxyRegistry::build_agent(record.proxy.as_ref(), &*self.dashboard);
        self.connector.connect(record, agent.as_ref()).await
    }

    /// Pushes a fresh copy of the wallet table to the dashboard.
    pub async fn publish(&self) {
        let rows = self.wallets.snapshot().await;
        self.dashboard.publish_wallet_table(&rows);
    }
}

/// The three workers sharing one context.
pub struct PriorApp {
    pub ctx: PriorContext,
    pub refresher: BalanceRefresher,
    pub faucet: FaucetClaimer,
    pub swap: Arc<SwapOrchestrator>,
}

impl PriorApp {
    pub fn new(ctx: PriorContext, settings: SwapSettings) -> Self {
        let refresher = BalanceRefresher::new(ctx.clone());
        let faucet = FaucetClaimer::new(ctx.clone(), refresher.clone());
        let swap = Arc::new(SwapOrchestrator::new(ctx.clone(), refresher.clone(), settings));

        Self {
            ctx,
            refresher,
            faucet,
            swap,
        }
    }
}
