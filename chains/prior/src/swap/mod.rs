//! Approve-and-swap runs across all wallets.

mod control;

pub use control::{parse_cycles, MenuState, RunControl, RunGuard, StartError};

use crate::app::PriorContext;
use crate::client::ChainClient;
use crate::config::SwapConfig;
use crate::contracts::{encode_swap_call, SwapTarget, APPROVE, PRIOR_DECIMALS};
use crate::refresher::BalanceRefresher;
use crate::wallet::{short_address, short_hash, STATUS_SWAPPING};
use core_logic::{format_wait, wait_with_cancel, DelayRange, Severity};
use ethers::abi::Token;
use ethers::types::U256;
use rand::Rng;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Amount and pacing policy for a run.
#[derive(Debug, Clone, Copy)]
pub struct SwapSettings {
    pub amount_min: f64,
    pub amount_max: f64,
    pub delay: DelayRange,
    pub gas_limit: u64,
}

impl From<&SwapConfig> for SwapSettings {
    fn from(config: &SwapConfig) -> Self {
        Self {
            amount_min: config.min_amount,
            amount_max: config.max_amount,
            delay: config.delay(),
            gas_limit: config.gas_limit,
        }
    }
}

impl SwapSettings {
    /// Uniform draw in `[amount_min, amount_max]` at 6 decimal places,
    /// returned in 18-decimal base units.
    pub fn draw_amount(&self) -> U256 {
        let lo = (self.amount_min * 1e6).round().max(1.0) as u64;
        let hi = ((self.amount_max * 1e6).round() as u64).max(lo);
        let micros = rand::thread_rng().gen_range(lo..=hi);
        U256::from(micros) * U256::exp10(12)
    }
}

/// One planned approve+swap attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapCycle {
    pub cycle: u32,
    pub target: SwapTarget,
    pub amount: U256,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapRunReport {
    pub wallets_processed: usize,
    pub cycles_attempted: u32,
    pub approvals_failed: u32,
    pub swaps_succeeded: u32,
    pub swaps_failed: u32,
    pub cancelled: bool,
}

pub struct SwapOrchestrator {
    ctx: PriorContext,
    refresher: BalanceRefresher,
    settings: SwapSettings,
    control: RunControl,
}

impl SwapOrchestrator {
    pub fn new(ctx: PriorContext, refresher: BalanceRefresher, settings: SwapSettings) -> Self {
        Self {
            ctx,
            refresher,
            settings,
            control: RunControl::new(),
        }
    }

    fn log(&self, severity: Severity, text: &str) {
        self.ctx.dashboard.emit(severity, text);
    }

    /// Validates `cycles_input` and spawns a run over every wallet.
    ///
    /// Rejected input or an active run leaves all state untouched.
    pub fn start(
        self: &Arc<Self>,
        cycles_input: &str,
    ) -> Result<JoinHandle<SwapRunReport>, StartError> {
        let cycles = match parse_cycles(cycles_input) {
            Ok(n) => n,
            Err(e) => {
                self.log(Severity::Error, "Input must be a number");
                return Err(e);
            }
        };

        let Some(token) = self.control.try_begin() else {
            self.log(
                Severity::Warning,
                "Transaction already running. Stop it first.",
            );
            return Err(StartError::AlreadyRunning);
        };

        self.log(
            Severity::Swap,
            &format!("Set to run {} swaps per wallet.", cycles),
        );

        let this = Arc::clone(self);
        Ok(tokio::spawn(async move { this.run(cycles, token).await }))
    }

    /// Cooperative stop. In-flight transactions are still awaited.
    pub fn request_stop(&self) {
        if self.control.request_stop() {
            self.log(Severity::Warning, "Stop All Transactions command received.");
        } else {
            self.log(Severity::Info, "No transactions running.");
        }
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn menu_state(&self) -> MenuState {
        MenuState {
            running: self.is_running(),
        }
    }

    async fn run(&self, cycles: u32, token: CancellationToken) -> SwapRunReport {
        let guard = RunGuard::new(&self.control);
        let mut report = SwapRunReport::default();
        let count = self.ctx.wallets.len().await;

        for index in 0..count {
            if token.is_cancelled() {
                break;
            }
            let Some(record) = self.ctx.wallets.get(index).await else {
                continue;
            };
            report.wallets_processed += 1;
            self.ctx.wallets.set_status(index, STATUS_SWAPPING).await;

            match self.ctx.connect(&record).await {
                Ok(client) => {
                    self.ctx
                        .wallets
                        .update(index, |r| r.set_address(client.address()))
                        .await;
                    self.run_wallet(client.as_ref(), cycles, &token, &mut report)
                        .await;
                }
                Err(e) => self.log(
                    Severity::Error,
                    &format!("Wallet {}: Failed to connect: {}", record.label(), e),
                ),
            }

            self.refresher.refresh().await;
        }

        report.cancelled = token.is_cancelled();
        drop(guard);

        self.log(Severity::Swap, "Auto swap completed.");
        tracing::debug!(
            "Swap run finished: {} wallets, {} cycles, {} swaps ok, {} swaps failed, {} approvals failed",
            report.wallets_processed,
            report.cycles_attempted,
            report.swaps_succeeded,
            report.swaps_failed,
            report.approvals_failed
        );
        report
    }

    async fn run_wallet(
        &self,
        client: &dyn ChainClient,
        cycles: u32,
        token: &CancellationToken,
        report: &mut SwapRunReport,
    ) {
        let label = short_address(&client.address());

        for cycle in 1..=cycles {
            if token.is_cancelled() {
                self.log(
                    Severity::Warning,
                    &format!("Wallet {}: Auto swap stopped at cycle {}.", label, cycle),
                );
                break;
            }
            report.cycles_attempted += 1;

            let plan = SwapCycle {
                cycle,
                target: SwapTarget::for_cycle(cycle),
                amount: self.settings.draw_amount(),
            };
            let amount = crate::refresher::format_amount(plan.amount, PRIOR_DECIMALS)
                .unwrap_or_else(|_| plan.amount.to_string());

            self.log(
                Severity::Swap,
                &format!(
                    "Wallet {}: Cycle {}/{}: Swap {} PRIOR to {}",
                    label,
                    cycle,
                    cycles,
                    amount,
                    plan.target.symbol()
                ),
            );

            if !self.approve(client, &label, plan.amount).await {
                report.approvals_failed += 1;
                self.pause(token).await;
                continue;
            }

            if self.swap(client, &label, &plan).await {
                report.swaps_succeeded += 1;
            } else {
                report.swaps_failed += 1;
            }

            if cycle < cycles {
                self.pause(token).await;
            }
        }
    }

    /// `approve(router, amount)` on PRIOR. `true` once the approval is mined.
    async fn approve(&self, client: &dyn ChainClient, label: &str, amount: U256) -> bool {
        let contracts = &self.ctx.contracts;
        let args = [Token::Address(contracts.router), Token::Uint(amount)];

        let hash = match client.call_write(contracts.prior, APPROVE, &args).await {
            Ok(hash) => hash,
            Err(e) => {
                self.log(
                    Severity::Error,
                    &format!("Wallet {}: Error approving PRIOR: {}", label, e),
                );
                return false;
            }
        };
        self.log(
            Severity::Swap,
            &format!(
                "Wallet {}: Approval Tx Sent. Hash: {}",
                label,
                short_hash(&hash)
            ),
        );

        let outcome = client.await_receipt(hash).await;
        if outcome.is_success() {
            self.log(
                Severity::Success,
                &format!("Wallet {}: Approval Successful!", label),
            );
            true
        } else {
            self.log(
                Severity::Error,
                &format!(
                    "Wallet {}: Approval failed. {}",
                    label,
                    outcome.error.unwrap_or_default()
                ),
            );
            false
        }
    }

    /// Raw router call with the fixed gas ceiling. `true` once mined successfully.
    async fn swap(&self, client: &dyn ChainClient, label: &str, plan: &SwapCycle) -> bool {
        let data = encode_swap_call(plan.target, plan.amount);
        let symbol = plan.target.symbol();

        let hash = match client
            .send_raw(self.ctx.contracts.router, data, self.settings.gas_limit)
            .await
        {
            Ok(hash) => hash,
            Err(e) => {
                self.log(
                    Severity::Error,
                    &format!("Wallet {}: Error swapping PRIOR to {}: {}", label, symbol, e),
                );
                return false;
            }
        };
        self.log(
            Severity::Swap,
            &format!("Wallet {}: Tx Sent. Hash: {}", label, short_hash(&hash)),
        );

        let outcome = client.await_receipt(hash).await;
        if outcome.is_success() {
            self.log(
                Severity::Success,
                &format!("Wallet {}: Swap PRIOR to {} Successful!", label, symbol),
            );
            true
        } else {
            self.log(
                Severity::Error,
                &format!(
                    "Wallet {}: Swap PRIOR to {} Failed. {}",
                    label,
                    symbol,
                    outcome.error.unwrap_or_default()
                ),
            );
            false
        }
    }

    /// Random inter-cycle wait that ends early on stop.
    async fn pause(&self, token: &CancellationToken) {
        let delay = self.settings.delay.sample();
        self.log(
            Severity::Swap,
            &format!("Waiting {} before next swap", format_wait(delay)),
        );
        wait_with_cancel(delay, token).await;
    }
}
