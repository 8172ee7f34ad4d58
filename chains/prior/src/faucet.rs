use crate::app::PriorContext;
use crate::contracts::{CLAIM_COOLDOWN, CLAIM_TOKENS, LAST_CLAIM_TIME};
use crate::refresher::BalanceRefresher;
use crate::wallet::{short_hash, WalletRecord, STATUS_ACTIVE, STATUS_CLAIMING, STATUS_ERROR};
use core_logic::{format_cooldown, RpcError, Severity};
use ethers::abi::Token;
use ethers::types::U256;

/// Tally of one `claim_all` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimReport {
    pub claimed: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum ClaimResult {
    Claimed,
    Skipped,
    Failed,
}

/// Seconds left before `last + cooldown`, or `None` once eligible.
pub fn cooldown_remaining(last_claim: u64, cooldown: u64, now: u64) -> Option<u64> {
    let next = last_claim.saturating_add(cooldown);
    (now < next).then(|| next - now)
}

#[derive(Clone)]
pub struct FaucetClaimer {
    ctx: PriorContext,
    refresher: BalanceRefresher,
}

impl FaucetClaimer {
    pub fn new(ctx: PriorContext, refresher: BalanceRefresher) -> Self {
        Self { ctx, refresher }
    }

    /// Claims for every wallet in order, then refreshes balances.
    ///
    /// A wallet still in cooldown is skipped without submitting anything.
    /// Errors stay scoped to the wallet that raised them.
    pub async fn claim_all(&self) -> ClaimReport {
        let mut report = ClaimReport::default();
        let count = self.ctx.wallets.len().await;

        for index in 0..count {
            let Some(record) = self.ctx.wallets.get(index).await else {
                continue;
            };

            self.ctx.wallets.set_status(index, STATUS_CLAIMING).await;
            let result = self.claim(&record).await;

            let status = match result {
                Ok(ClaimResult::Claimed) => {
                    report.claimed += 1;
                    STATUS_ACTIVE
                }
                Ok(ClaimResult::Skipped) => {
                    report.skipped += 1;
                    STATUS_ACTIVE
                }
                Ok(ClaimResult::Failed) => {
                    report.failed += 1;
                    STATUS_ACTIVE
                }
                Err(e) => {
                    report.failed += 1;
                    self.ctx.dashboard.emit(
                        Severity::Error,
                        &format!("Wallet {}: Error claiming faucet: {}", record.label(), e),
                    );
                    STATUS_ERROR
                }
            };
            self.ctx.wallets.set_status(index, status).await;
        }

        tracing::debug!(
            "Faucet pass done: {} claimed, {} skipped, {} failed",
            report.claimed,
            report.skipped,
            report.failed
        );

        self.refresher.refresh().await;
        report
    }

    async fn claim(&self, record: &WalletRecord) -> Result<ClaimResult, RpcError> {
        let client = self.ctx.connect(record).await?;
        let address = client.address();
        let faucet = self.ctx.contracts.faucet;
        let sink = &self.ctx.dashboard;

        self.ctx
            .wallets
            .update(record.index, |r| r.set_address(address))
            .await;
        let label = crate::wallet::short_address(&address);

        let last_claim = client
            .read_uint(faucet, LAST_CLAIM_TIME, &[Token::Address(address)])
            .await?;
        let cooldown = client.read_uint(faucet, CLAIM_COOLDOWN, &[]).await?;
        let now = chrono::Utc::now().timestamp().max(0) as u64;

        if let Some(remaining) = cooldown_remaining(as_secs(last_claim), as_secs(cooldown), now) {
            sink.emit(
                Severity::Warning,
                &format!(
                    "Wallet {}: Wait {} before next claim.",
                    label,
                    format_cooldown(remaining)
                ),
            );
            return Ok(ClaimResult::Skipped);
        }

        sink.emit(
            Severity::Info,
            &format!("Wallet {}: Starting Claim Faucet PRIOR...", label),
        );
        let hash = client.call_write(faucet, CLAIM_TOKENS, &[]).await?;
        sink.emit(
            Severity::Info,
            &format!("Wallet {}: Tx Sent. Hash: {}", label, short_hash(&hash)),
        );

        let outcome = client.await_receipt(hash).await;
        if outcome.is_success() {
            sink.emit(
                Severity::Success,
                &format!("Wallet {}: Claim Faucet Successful!", label),
            );
            Ok(ClaimResult::Claimed)
        } else {
            sink.emit(
                Severity::Error,
                &format!(
                    "Wallet {}: Claim Faucet Failed. {}",
                    label,
                    outcome.error.unwrap_or_default()
                ),
            );
            Ok(ClaimResult::Failed)
        }
    }
}

/// Timestamps and cooldowns beyond `u64` saturate; such a wallet just waits.
fn as_secs(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.as_u64()
    }
}
