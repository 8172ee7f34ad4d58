//! Output surface: the event log plus wallet-table publishing.

use crate::contracts::NETWORK_NAME;
use crate::wallet::{short_address, WalletRecord, STATUS_ACTIVE, STATUS_ERROR};
use chrono::{DateTime, Local};
use colored::*;
use core_logic::{LogSink, Severity, TracingSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A log sink that can also show the wallet table.
pub trait Dashboard: LogSink {
    /// Replaces the displayed table with `rows`. Callers pass a snapshot.
    fn publish_wallet_table(&self, rows: &[WalletRecord]);
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub text: String,
}

/// In-memory event log.
///
/// Entries are kept in order until [`LogSink::clear`]. The console variant
/// also forwards every line to `tracing` and prints each published table.
pub struct EventLog {
    entries: Mutex<Vec<LogEntry>>,
    table: Mutex<Vec<WalletRecord>>,
    publishes: AtomicUsize,
    console: bool,
}

impl EventLog {
    pub fn console() -> Self {
        Self::with_console(true)
    }

    /// Records only. Used by tests and non-interactive embedding.
    pub fn silent() -> Self {
        Self::with_console(false)
    }

    fn with_console(console: bool) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            table: Mutex::new(Vec::new()),
            publishes: AtomicUsize::new(0),
            console,
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Texts of every entry, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.text).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.text.contains(needle))
    }

    pub fn last_table(&self) -> Vec<WalletRecord> {
        self.table.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }

    fn push(&self, severity: Severity, text: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                timestamp: Local::now(),
                severity,
                text: text.to_string(),
            });
        }
    }
}

impl LogSink for EventLog {
    fn emit(&self, severity: Severity, text: &str) {
        self.push(severity, text);
        if self.console {
            TracingSink.emit(severity, text);
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
        self.emit(Severity::Success, "Transaction logs cleared.");
    }
}

impl Dashboard for EventLog {
    fn publish_wallet_table(&self, rows: &[WalletRecord]) {
        if let Ok(mut table) = self.table.lock() {
            *table = rows.to_vec();
        }
        self.publishes.fetch_add(1, Ordering::SeqCst);

        if self.console {
            println!("{}", render_table(rows));
        }
    }
}

fn fixed(value: &str, places: usize) -> String {
    match value.parse::<f64>() {
        Ok(v) => format!("{:.*}", places, v),
        Err(_) => value.to_string(),
    }
}

/// Renders the wallet table for a terminal.
pub fn render_table(rows: &[WalletRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        format!("Wallet Information [{}]", NETWORK_NAME).bold()
    ));
    out.push_str(&format!(
        "{:<4} {:<14} {:>10} {:>10} {:>10} {:>10} {:<22} {}\n",
        "#", "Address", "ETH", "PRIOR", "USDC", "USDT", "Proxy", "Status"
    ));

    for row in rows {
        let address = row
            .address()
            .map(|a| short_address(&a))
            .unwrap_or_else(|| "-".to_string());
        let proxy = row
            .proxy
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "none".to_string());
        let status = match row.status.as_str() {
            STATUS_ACTIVE => row.status.green(),
            STATUS_ERROR => row.status.red(),
            _ => row.status.yellow(),
        };

        out.push_str(&format!(
            "{:<4} {:<14} {:>10} {:>10} {:>10} {:>10} {:<22} {}\n",
            row.index + 1,
            address,
            fixed(&row.balances.native, 4),
            fixed(&row.balances.prior, 2),
            fixed(&row.balances.usdc, 2),
            fixed(&row.balances.usdt, 2),
            proxy,
            status
        ));
    }

    out
}
