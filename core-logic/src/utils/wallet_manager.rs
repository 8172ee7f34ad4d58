use crate::config::WalletSource;
use crate::error::WalletError;
use crate::traits::{LogSink, Severity};
use std::fmt;
use std::fs;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A raw private key. Wiped on drop, never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Hex key with an optional `0x` prefix stripped.
    pub fn expose(&self) -> &str {
        self.0.strip_prefix("0x").unwrap_or(&self.0)
    }

    /// Cheap shape check before the key ever reaches a signer.
    pub fn is_well_formed(&self) -> bool {
        let raw = self.expose();
        raw.len() == 64 && hex::decode(raw).is_ok()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***REDACTED***)")
    }
}

/// Keys loaded for a run, with the source they came from.
#[derive(Debug)]
pub struct LoadedKeys {
    pub source: WalletSource,
    pub keys: Vec<SecretKey>,
}

pub struct WalletManager;

impl WalletManager {
    pub const WALLET_FILE: &'static str = "wallets.txt";
    pub const ENV_KEY: &'static str = "PRIVATE_KEY";

    /// Resolves wallet keys.
    ///
    /// The key file always wins when it exists, whether or not a fallback key
    /// is configured. Without a file the single fallback key is used. Neither
    /// is [`WalletError::NoWalletSource`]. Malformed file lines are skipped
    /// with a warning; a source with nothing usable left is
    /// [`WalletError::InvalidKeyFormat`].
    pub fn load_keys(
        key_file: impl AsRef<Path>,
        fallback_key: Option<&str>,
        sink: &(impl LogSink + ?Sized),
    ) -> Result<LoadedKeys, WalletError> {
        let path = key_file.as_ref();

        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| WalletError::IoError {
                path: path.display().to_string(),
                msg: e.to_string(),
            })?;
            let parsed = Self::parse_keys(&content);
            let total = parsed.len();

            let mut keys = Vec::with_capacity(total);
            for (i, key) in parsed.into_iter().enumerate() {
                if key.is_well_formed() {
                    keys.push(key);
                } else {
                    sink.emit(
                        Severity::Warning,
                        &format!("Skipping malformed key #{} in {}", i + 1, path.display()),
                    );
                }
            }

            if !keys.is_empty() {
                sink.emit(
                    Severity::System,
                    &format!("Loaded {} wallets from {}", keys.len(), path.display()),
                );
                return Ok(LoadedKeys {
                    source: WalletSource::File {
                        path: path.display().to_string(),
                    },
                    keys,
                });
            }
            if total > 0 {
                return Err(WalletError::InvalidKeyFormat {
                    source_name: path.display().to_string(),
                });
            }
            sink.emit(
                Severity::Warning,
                &format!("{} contains no keys", path.display()),
            );
        } else if let Some(key) = fallback_key.map(str::trim).filter(|k| !k.is_empty()) {
            let key = SecretKey::new(key);
            if !key.is_well_formed() {
                return Err(WalletError::InvalidKeyFormat {
                    source_name: Self::ENV_KEY.to_string(),
                });
            }
            sink.emit(
                Severity::System,
                &format!("Using single wallet from {}", Self::ENV_KEY),
            );
            return Ok(LoadedKeys {
                source: WalletSource::Env {
                    key: Self::ENV_KEY.to_string(),
                },
                keys: vec![key],
            });
        }

        Err(WalletError::NoWalletSource {
            key_file: path.display().to_string(),
            env_key: Self::ENV_KEY.to_string(),
        })
    }

    /// One key per line; blank lines and `#` comments are ignored.
    pub fn parse_keys(content: &str) -> Vec<SecretKey> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(SecretKey::new)
            .collect()
    }
}
