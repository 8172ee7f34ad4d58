//! Interactive prompt loop. Actions that hit the chain run in the
//! background so the prompt stays responsive.

use crate::app::PriorApp;
use crate::swap::MenuState;
use anyhow::Result;
use core_logic::Severity;
use dialoguer::{theme::ColorfulTheme, Input, Select};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    StopAll,
    PriorSwap,
    ClaimFaucet,
    ClearLogs,
    Refresh,
    Exit,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::StopAll => "Stop All Transactions",
            MenuAction::PriorSwap => "Prior Swap",
            MenuAction::ClaimFaucet => "Claim Faucet",
            MenuAction::ClearLogs => "Clear Transaction Logs",
            MenuAction::Refresh => "Refresh",
            MenuAction::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMenuAction {
    AutoSwap,
    StopTransaction,
    ClearLogs,
    Back,
    Refresh,
}

impl SwapMenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            SwapMenuAction::AutoSwap => "Auto Swap Prior & USDC/USDT",
            SwapMenuAction::StopTransaction => "Stop Transaction",
            SwapMenuAction::ClearLogs => "Clear Transaction Logs",
            SwapMenuAction::Back => "Back To Main Menu",
            SwapMenuAction::Refresh => "Refresh",
        }
    }
}

/// "Stop All Transactions" leads the list only while a run is active.
pub fn main_menu_items(state: MenuState) -> Vec<MenuAction> {
    let mut items = vec![
        MenuAction::PriorSwap,
        MenuAction::ClaimFaucet,
        MenuAction::ClearLogs,
        MenuAction::Refresh,
        MenuAction::Exit,
    ];
    if state.running {
        items.insert(0, MenuAction::StopAll);
    }
    items
}

pub fn swap_menu_items(state: MenuState) -> Vec<SwapMenuAction> {
    let mut items = vec![
        SwapMenuAction::AutoSwap,
        SwapMenuAction::ClearLogs,
        SwapMenuAction::Back,
        SwapMenuAction::Refresh,
    ];
    if state.running {
        items.insert(1, SwapMenuAction::StopTransaction);
    }
    items
}

async fn select(prompt: &'static str, labels: Vec<&'static str>) -> Result<usize> {
    let index = tokio::task::spawn_blocking(move || {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(0)
            .items(&labels)
            .interact()
    })
    .await??;
    Ok(index)
}

async fn ask_cycles() -> Result<String> {
    let input = tokio::task::spawn_blocking(|| {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Enter number of swaps per wallet")
            .allow_empty(true)
            .interact_text()
    })
    .await??;
    Ok(input)
}

fn spawn_refresh(app: &PriorApp) {
    let refresher = app.refresher.clone();
    tokio::spawn(async move { refresher.refresh().await });
    app.ctx.dashboard.emit(Severity::System, "Refreshed");
}

pub async fn run(app: &PriorApp) -> Result<()> {
    loop {
        let items = main_menu_items(app.swap.menu_state());
        let labels = items.iter().map(MenuAction::label).collect();

        match items[select("Main Menu", labels).await?] {
            MenuAction::StopAll => app.swap.request_stop(),
            MenuAction::PriorSwap => run_swap_menu(app).await?,
            MenuAction::ClaimFaucet => {
                let faucet = app.faucet.clone();
                tokio::spawn(async move { faucet.claim_all().await });
            }
            MenuAction::ClearLogs => app.ctx.dashboard.clear(),
            MenuAction::Refresh => spawn_refresh(app),
            MenuAction::Exit => {
                app.swap.request_stop();
                return Ok(());
            }
        }
    }
}

async fn run_swap_menu(app: &PriorApp) -> Result<()> {
    loop {
        let items = swap_menu_items(app.swap.menu_state());
        let labels = items.iter().map(SwapMenuAction::label).collect();

        match items[select("Prior Swap", labels).await?] {
            SwapMenuAction::AutoSwap => {
                let input = ask_cycles().await?;
                // Rejections are already on the log.
                let _ = app.swap.start(&input);
            }
            SwapMenuAction::StopTransaction => app.swap.request_stop(),
            SwapMenuAction::ClearLogs => app.ctx.dashboard.clear(),
            SwapMenuAction::Back => return Ok(()),
            SwapMenuAction::Refresh => spawn_refresh(app),
        }
    }
}
