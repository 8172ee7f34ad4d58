use prior_project::config::PriorConfig;
use prior_project::contracts::Contracts;
use prior_project::{
    menu, Dashboard, EthersConnector, EventLog, PriorApp, PriorContext, SwapSettings, WalletSet,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use core_logic::{setup_logger, LogSink, ProxyRegistry, Severity, WalletManager, WorkerRunner};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu,
    /// Run approve+swap cycles on every wallet
    Swap {
        #[arg(short, long)]
        cycles: String,
    },
    /// Claim the PRIOR faucet for every wallet
    Faucet,
    /// Print current balances
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep guard alive for file logging
    let log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = PriorConfig::load(&args.config)
        .inspect_err(|e| error!("Failed to load config: {:#}", e))
        .context("Failed to load config")?;
    let contracts = Contracts::from_config(&config.contracts)?;

    let dashboard = Arc::new(EventLog::console());
    let proxies = ProxyRegistry::load(&config.proxy_file, dashboard.as_ref());

    let fallback_key = std::env::var(WalletManager::ENV_KEY).ok();
    let wallets = match WalletSet::load(
        &config.wallet_file,
        fallback_key.as_deref(),
        &proxies,
        dashboard.as_ref(),
    ) {
        Ok(w) => w,
        Err(e) => {
            dashboard.emit(Severity::Error, &e.to_string());
            drop(log_guard);
            std::process::exit(1);
        }
    };

    let connector = Arc::new(EthersConnector::new(
        config.rpc_url.clone(),
        config.chain_id,
        Duration::from_secs(config.request_timeout_secs),
    ));
    let sink: Arc<dyn Dashboard> = dashboard;
    let ctx = PriorContext::new(wallets, connector, sink, contracts);
    let app = PriorApp::new(ctx, SwapSettings::from(&config.swap));

    app.refresher.refresh().await;

    match args.command.unwrap_or(Command::Menu) {
        Command::Menu => menu::run(&app).await?,
        Command::Swap { cycles } => {
            let swap = Arc::clone(&app.swap);
            let stopper = Arc::clone(&app.swap);
            let signal = WorkerRunner::on_ctrl_c(move || stopper.request_stop());

            if let Ok(handle) = swap.start(&cycles) {
                let report = handle.await?;
                info!(
                    "Swaps: {} ok, {} failed, {} approvals failed",
                    report.swaps_succeeded, report.swaps_failed, report.approvals_failed
                );
            }
            signal.abort();
        }
        Command::Faucet => {
            let report = app.faucet.claim_all().await;
            info!(
                "Faucet: {} claimed, {} skipped, {} failed",
                report.claimed, report.skipped, report.failed
            );
        }
        Command::Refresh => {}
    }

    drop(log_guard);
    Ok(())
}
