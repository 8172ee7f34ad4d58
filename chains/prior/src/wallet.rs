//! Per-wallet runtime records and the shared table the workers update.

use core_logic::{
    LogSink, ProxyDescriptor, ProxyRegistry, SecretKey, Severity, WalletError, WalletManager,
};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const STATUS_INITIALIZING: &str = "Initializing";
pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_SWAPPING: &str = "Swapping";
pub const STATUS_CLAIMING: &str = "Claiming";
pub const STATUS_ERROR: &str = "Error";

/// Display balances, already formatted from on-chain base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balances {
    pub native: String,
    pub prior: String,
    pub usdc: String,
    pub usdt: String,
}

impl Default for Balances {
    fn default() -> Self {
        Self {
            native: "0".to_string(),
            prior: "0".to_string(),
            usdc: "0".to_string(),
            usdt: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalletRecord {
    pub index: usize,
    key: SecretKey,
    address: Option<Address>,
    pub balances: Balances,
    pub proxy: Option<ProxyDescriptor>,
    pub status: String,
}

impl WalletRecord {
    pub fn new(index: usize, key: SecretKey, proxy: Option<ProxyDescriptor>) -> Self {
        Self {
            index,
            key,
            address: None,
            balances: Balances::default(),
            proxy,
            status: STATUS_INITIALIZING.to_string(),
        }
    }

    pub fn key(&self) -> &SecretKey {
        &self.key
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Records the derived address. Later calls with a different value are
    /// ignored; the address never changes once known.
    pub fn set_address(&mut self, address: Address) {
        if self.address.is_none() {
            self.address = Some(address);
        }
    }

    /// Short address once known, otherwise `#<index+1>`.
    pub fn label(&self) -> String {
        match self.address {
            Some(address) => short_address(&address),
            None => format!("#{}", self.index + 1),
        }
    }
}

/// Address for a private key, or `None` if the key is not a valid secp256k1 scalar.
pub fn derive_address(key: &SecretKey) -> Option<Address> {
    key.expose()
        .parse::<LocalWallet>()
        .ok()
        .map(|wallet| wallet.address())
}

/// `0x1234...abcd`
pub fn short_address(address: &Address) -> String {
    shorten(&format!("{:?}", address))
}

pub fn short_hash(hash: &H256) -> String {
    shorten(&format!("{:?}", hash))
}

fn shorten(full: &str) -> String {
    if full.len() <= 10 {
        return full.to_string();
    }
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Shared wallet table.
///
/// Every read returns a copy so a table publish never observes a row
/// half-way through an update.
#[derive(Debug, Clone, Default)]
pub struct WalletTable {
    inner: Arc<RwLock<Vec<WalletRecord>>>,
}

impl WalletTable {
    pub fn new(records: Vec<WalletRecord>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn get(&self, index: usize) -> Option<WalletRecord> {
        self.inner.read().await.get(index).cloned()
    }

    pub async fn snapshot(&self) -> Vec<WalletRecord> {
        self.inner.read().await.clone()
    }

    /// Applies `f` to the record at `index`. Returns `false` for an unknown index.
    pub async fn update<F>(&self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut WalletRecord),
    {
        let mut guard = self.inner.write().await;
        match guard.get_mut(index) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    pub async fn set_status(&self, index: usize, status: &str) {
        self.update(index, |r| r.status = status.to_string()).await;
    }
}

pub struct WalletSet;

impl WalletSet {
    /// Resolves keys (file first, then the fallback key) and pairs each with
    /// its round-robin proxy.
    pub fn load(
        key_file: impl AsRef<Path>,
        fallback_key: Option<&str>,
        proxies: &ProxyRegistry,
        sink: &(impl LogSink + ?Sized),
    ) -> Result<WalletTable, WalletError> {
        let loaded = WalletManager::load_keys(key_file, fallback_key, sink)?;
        sink.emit(
            Severity::System,
            &format!("Using wallets from {}", loaded.source),
        );
        Ok(Self::from_keys(loaded.keys, proxies, sink))
    }

    /// Addresses are derived up front so every log line can name the wallet,
    /// even when its first connection fails.
    pub fn from_keys(
        keys: Vec<SecretKey>,
        proxies: &ProxyRegistry,
        sink: &(impl LogSink + ?Sized),
    ) -> WalletTable {
        if !proxies.is_empty() && proxies.len() < keys.len() {
            sink.emit(
                Severity::Warning,
                &format!(
                    "Only {} proxies for {} wallets. Some wallets will reuse proxies.",
                    proxies.len(),
                    keys.len()
                ),
            );
        }

        let records = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                let address = derive_address(&key);
                let mut record = WalletRecord::new(i, key, proxies.assign(i).cloned());
                if let Some(address) = address {
                    record.set_address(address);
                }
                record
            })
            .collect();

        WalletTable::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_set_once() {
        let mut record = WalletRecord::new(0, SecretKey::new("ab"), None);
        assert_eq!(record.label(), "#1");

        let first = Address::from_low_u64_be(1);
        record.set_address(first);
        record.set_address(Address::from_low_u64_be(2));
        assert_eq!(record.address(), Some(first));
    }

    #[test]
    fn test_short_forms() {
        let address: Address = "0x0f1DADEcc263eB79AE3e4db0d57c49a8b6178B0B"
            .parse()
            .unwrap();
        assert_eq!(short_address(&address), "0x0f1d...8b0b");
        assert_eq!(short_hash(&H256::zero()), "0x0000...0000");
    }

    #[test]
    fn test_from_keys_labels_by_address() {
        let key = SecretKey::new(format!("0x{}", "01".repeat(32)));
        let expected = derive_address(&key).unwrap();
        let table = WalletSet::from_keys(vec![key], &ProxyRegistry::default(), &NoopSink);

        let record = table.inner.try_read().unwrap()[0].clone();
        assert_eq!(record.address(), Some(expected));
        assert_eq!(record.label(), short_address(&expected));
    }

    #[test]
    fn test_derive_address_rejects_zero_key() {
        assert!(derive_address(&SecretKey::new("00".repeat(32))).is_none());
        assert!(derive_address(&SecretKey::new("ab")).is_none());
    }

    struct NoopSink;

    impl LogSink for NoopSink {
        fn emit(&self, _severity: Severity, _text: &str) {}
        fn clear(&self) {}
    }

    #[tokio::test]
    async fn test_table_update_unknown_index() {
        let table = WalletTable::new(vec![WalletRecord::new(0, SecretKey::new("ab"), None)]);
        assert!(table.update(0, |r| r.status = STATUS_ACTIVE.to_string()).await);
        assert!(!table.update(5, |_| {}).await);
        assert_eq!(table.get(0).await.unwrap().status, STATUS_ACTIVE);
    }
}
