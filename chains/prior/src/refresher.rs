use crate::app::PriorContext;
use crate::contracts::{NATIVE_DECIMALS, PRIOR_DECIMALS, STABLE_DECIMALS};
use crate::wallet::{Balances, WalletRecord, STATUS_ACTIVE, STATUS_ERROR};
use core_logic::{RpcError, Severity};
use ethers::types::U256;
use ethers::utils::format_units;

/// Re-reads every wallet's balances and republishes the table.
#[derive(Clone)]
pub struct BalanceRefresher {
    ctx: PriorContext,
}

impl BalanceRefresher {
    pub fn new(ctx: PriorContext) -> Self {
        Self { ctx }
    }

    /// Sequential over wallets. A failing wallet keeps its previous balances.
    pub async fn refresh(&self) {
        let count = self.ctx.wallets.len().await;

        for index in 0..count {
            let Some(record) = self.ctx.wallets.get(index).await else {
                continue;
            };

            match self.fetch(&record).await {
                Ok((address, balances)) => {
                    self.ctx
                        .wallets
                        .update(index, |r| {
                            r.set_address(address);
                            r.balances = balances;
                            r.status = STATUS_ACTIVE.to_string();
                        })
                        .await;
                }
                Err(e) => {
                    self.ctx.dashboard.emit(
                        Severity::Error,
                        &format!("Wallet {}: Failed to update data: {}", record.label(), e),
                    );
                    self.ctx.wallets.set_status(index, STATUS_ERROR).await;
                }
            }
        }

        self.ctx.publish().await;
        self.ctx
            .dashboard
            .emit(Severity::Success, "Wallet balances updated!");
    }

    async fn fetch(
        &self,
        record: &WalletRecord,
    ) -> Result<(ethers::types::Address, Balances), RpcError> {
        let client = self.ctx.connect(record).await?;
        let owner = client.address();
        let contracts = &self.ctx.contracts;

        let (native, prior, usdc, usdt) = tokio::try_join!(
            client.native_balance(owner),
            client.token_balance(contracts.prior, owner),
            client.token_balance(contracts.usdc, owner),
            client.token_balance(contracts.usdt, owner),
        )?;

        let balances = Balances {
            native: format_amount(native, NATIVE_DECIMALS)?,
            prior: format_amount(prior, PRIOR_DECIMALS)?,
            usdc: format_amount(usdc, STABLE_DECIMALS)?,
            usdt: format_amount(usdt, STABLE_DECIMALS)?,
        };
        Ok((owner, balances))
    }
}

/// Base units to a decimal string, e.g. `1500000` at 6 decimals is `1.500000`.
pub fn format_amount(value: U256, decimals: u32) -> Result<String, RpcError> {
    format_units(value, decimals).map_err(|e| RpcError::InvalidResponse {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(U256::from(1_500_000u64), 6).unwrap(), "1.500000");
        assert_eq!(
            format_amount(U256::exp10(18), 18).unwrap(),
            "1.000000000000000000"
        );
    }
}
