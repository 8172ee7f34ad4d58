use core_logic::{ProxyRegistry, TracingSink, WalletError};
use prior_project::wallet::{derive_address, short_address};
use prior_project::{EventLog, WalletSet};
use std::io::Write;

fn key(n: u8) -> String {
    format!("0x{}", hex::encode([n; 32]))
}

fn proxies(lines: &str) -> ProxyRegistry {
    ProxyRegistry::from_lines(lines, &TracingSink)
}

#[tokio::test]
async fn test_file_beats_fallback_key() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# wallets\n{}\n\n{}\n", key(1), key(2)).unwrap();

    let table = WalletSet::load(file.path(), Some(key(9).as_str()), &proxies(""), &TracingSink).unwrap();

    let rows = table.snapshot().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].key().expose(), hex::encode([1u8; 32]));
    assert_eq!(rows[1].key().expose(), hex::encode([2u8; 32]));
}

#[tokio::test]
async fn test_fallback_key_when_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("wallets.txt");

    let table = WalletSet::load(&missing, Some(key(7).as_str()), &proxies(""), &TracingSink).unwrap();
    assert_eq!(table.len().await, 1);
}

#[test]
fn test_no_source_is_fatal_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("wallets.txt");

    let err = WalletSet::load(&missing, None, &proxies(""), &TracingSink).unwrap_err();
    assert!(matches!(err, WalletError::NoWalletSource { .. }));

    let err = WalletSet::load(&missing, Some("   "), &proxies(""), &TracingSink).unwrap_err();
    assert!(matches!(err, WalletError::NoWalletSource { .. }));
}

#[tokio::test]
async fn test_round_robin_is_deterministic() {
    let list = "a.example:1\nb.example:2\n# spare\nc.example:3\n";
    let keys = (1..=7).map(key).collect::<Vec<_>>().join("\n");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", keys).unwrap();

    let log = EventLog::silent();
    let first = WalletSet::load(file.path(), None, &proxies(list), &log)
        .unwrap()
        .snapshot()
        .await;
    let second = WalletSet::load(file.path(), None, &proxies(list), &log)
        .unwrap()
        .snapshot()
        .await;

    let hosts = ["a.example", "b.example", "c.example"];
    for (i, row) in first.iter().enumerate() {
        assert_eq!(row.proxy.as_ref().unwrap().host, hosts[i % 3]);
        assert_eq!(row.proxy, second[i].proxy);
    }
    assert!(log.contains("Only 3 proxies for 7 wallets. Some wallets will reuse proxies."));
}

#[tokio::test]
async fn test_enough_proxies_no_warning() {
    let log = EventLog::silent();
    let keys = vec![core_logic::SecretKey::new(key(1))];
    let table = WalletSet::from_keys(keys, &proxies("a.example:1\nb.example:2"), &log);

    assert_eq!(table.len().await, 1);
    assert!(!log.contains("reuse proxies"));
}

#[tokio::test]
async fn test_addresses_known_after_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}\n{}", key(1), key(2)).unwrap();

    let log = EventLog::silent();
    let rows = WalletSet::load(file.path(), None, &proxies(""), &log)
        .unwrap()
        .snapshot()
        .await;

    for row in &rows {
        let expected = derive_address(row.key()).unwrap();
        assert_eq!(row.address(), Some(expected));
        assert_eq!(row.label(), short_address(&expected));
    }
    assert_ne!(rows[0].address(), rows[1].address());
    assert!(log.contains("Using wallets from file"));
}

#[test]
fn test_malformed_fallback_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("wallets.txt");

    let err = WalletSet::load(&missing, Some("0x1234"), &proxies(""), &TracingSink).unwrap_err();
    assert!(matches!(err, WalletError::InvalidKeyFormat { .. }));
}
