#![allow(dead_code)]

use async_trait::async_trait;
use core_logic::{ProxyAgent, ProxyRegistry, RpcError, SecretKey};
use ethers::abi::Token;
use ethers::types::{Address, Bytes, TxHash, U256};
use prior_project::client::{ChainClient, Connector, TransactionOutcome};
use prior_project::contracts::{
    Contracts, ContractsConfig, APPROVE, BALANCE_OF, CLAIM_COOLDOWN, CLAIM_TOKENS,
    LAST_CLAIM_TIME,
};
use prior_project::wallet::{derive_address, short_address};
use prior_project::{
    Dashboard, EventLog, PriorApp, PriorContext, SwapSettings, WalletRecord, WalletSet,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { wallet: usize, has_agent: bool },
    Read { wallet: usize, signature: String },
    Approve { wallet: usize, spender: Address, amount: U256 },
    Claim { wallet: usize },
    Swap { wallet: usize, to: Address, data: Bytes, gas_limit: u64 },
    Receipt { wallet: usize, hash: TxHash },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxKind {
    Approve,
    Claim,
    Swap,
}

#[derive(Debug, Clone)]
pub struct Behaviour {
    pub fail_connect: HashSet<usize>,
    pub fail_balance: HashSet<usize>,
    pub approve_submit_error: bool,
    pub approve_receipt_fail: bool,
    pub swap_submit_error: bool,
    pub swap_receipt_fail: bool,
    pub claim_receipt_fail: bool,
    pub fail_claim_read: HashSet<usize>,
    pub native: U256,
    pub token: U256,
    pub last_claim: u64,
    pub cooldown: u64,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            fail_connect: HashSet::new(),
            fail_balance: HashSet::new(),
            approve_submit_error: false,
            approve_receipt_fail: false,
            swap_submit_error: false,
            swap_receipt_fail: false,
            claim_receipt_fail: false,
            fail_claim_read: HashSet::new(),
            native: U256::exp10(18),
            token: U256::from(2_000_000u64),
            last_claim: 0,
            cooldown: 0,
        }
    }
}

type Hook = Box<dyn Fn(&Call) + Send + Sync>;

#[derive(Default)]
struct MockState {
    behaviour: Mutex<Behaviour>,
    calls: Mutex<Vec<Call>>,
    kinds: Mutex<HashMap<TxHash, TxKind>>,
    nonce: AtomicU64,
    gate: Mutex<Option<Arc<Semaphore>>>,
    hook: Mutex<Option<Hook>>,
}

impl MockState {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(&call);
        }
    }

    fn next_hash(&self, kind: TxKind) -> TxHash {
        let n = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
        let hash = TxHash::from_low_u64_be(n);
        self.kinds.lock().unwrap().insert(hash, kind);
        hash
    }
}

/// Scriptable chain shared by every client it hands out.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<MockState>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, f: impl FnOnce(&mut Behaviour)) {
        f(&mut self.state.behaviour.lock().unwrap());
    }

    /// Receipts block until [`Self::open_gate`].
    pub fn close_gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.state.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn open_gate(&self) {
        if let Some(gate) = self.state.gate.lock().unwrap().as_ref() {
            gate.add_permits(1);
        }
    }

    pub fn on_call(&self, hook: impl Fn(&Call) + Send + Sync + 'static) {
        *self.state.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn approvals(&self, wallet: usize) -> Vec<U256> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Approve { wallet: w, amount, .. } if w == wallet => Some(amount),
                _ => None,
            })
            .collect()
    }

    pub fn swaps(&self, wallet: usize) -> Vec<Bytes> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Swap { wallet: w, data, .. } if w == wallet => Some(data),
                _ => None,
            })
            .collect()
    }

    pub fn claims(&self, wallet: usize) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Claim { wallet: w } if *w == wallet))
            .count()
    }

    pub fn connects(&self) -> Vec<(usize, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Connect { wallet, has_agent } => Some((wallet, has_agent)),
                _ => None,
            })
            .collect()
    }

    pub fn receipts(&self) -> Vec<TxHash> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Receipt { hash, .. } => Some(hash),
                _ => None,
            })
            .collect()
    }

    pub fn behaviour(&self) -> Behaviour {
        self.state.behaviour.lock().unwrap().clone()
    }
}

/// The address a real signer derives from `test_key(index)`.
pub fn wallet_address(index: usize) -> Address {
    derive_address(&test_key(index)).unwrap()
}

pub fn wallet_label(index: usize) -> String {
    short_address(&wallet_address(index))
}

struct MockClient {
    wallet: usize,
    state: Arc<MockState>,
}

#[async_trait]
impl ChainClient for MockClient {
    fn address(&self) -> Address {
        wallet_address(self.wallet)
    }

    async fn native_balance(&self, _owner: Address) -> Result<U256, RpcError> {
        let b = self.state.behaviour.lock().unwrap().clone();
        if b.fail_balance.contains(&self.wallet) {
            return Err(RpcError::Timeout {
                endpoint: "mock".to_string(),
            });
        }
        Ok(b.native)
    }

    async fn read_uint(
        &self,
        _contract: Address,
        signature: &str,
        _args: &[Token],
    ) -> Result<U256, RpcError> {
        self.state.record(Call::Read {
            wallet: self.wallet,
            signature: signature.to_string(),
        });
        let b = self.state.behaviour.lock().unwrap().clone();

        match signature {
            BALANCE_OF if b.fail_balance.contains(&self.wallet) => Err(RpcError::Timeout {
                endpoint: "mock".to_string(),
            }),
            BALANCE_OF => Ok(b.token),
            LAST_CLAIM_TIME | CLAIM_COOLDOWN if b.fail_claim_read.contains(&self.wallet) => {
                Err(RpcError::Reverted {
                    reason: "faucet paused".to_string(),
                })
            }
            LAST_CLAIM_TIME => Ok(U256::from(b.last_claim)),
            CLAIM_COOLDOWN => Ok(U256::from(b.cooldown)),
            other => Err(RpcError::InvalidResponse {
                reason: format!("unexpected read {}", other),
            }),
        }
    }

    async fn call_write(
        &self,
        _contract: Address,
        signature: &str,
        args: &[Token],
    ) -> Result<TxHash, RpcError> {
        let b = self.state.behaviour.lock().unwrap().clone();

        match signature {
            APPROVE => {
                let (spender, amount) = match args {
                    [Token::Address(s), Token::Uint(a)] => (*s, *a),
                    _ => panic!("bad approve args"),
                };
                self.state.record(Call::Approve {
                    wallet: self.wallet,
                    spender,
                    amount,
                });
                if b.approve_submit_error {
                    return Err(RpcError::Transport("nonce too low".to_string()));
                }
                Ok(self.state.next_hash(TxKind::Approve))
            }
            CLAIM_TOKENS => {
                self.state.record(Call::Claim {
                    wallet: self.wallet,
                });
                Ok(self.state.next_hash(TxKind::Claim))
            }
            other => panic!("unexpected write {}", other),
        }
    }

    async fn send_raw(
        &self,
        to: Address,
        data: Bytes,
        gas_limit: u64,
    ) -> Result<TxHash, RpcError> {
        self.state.record(Call::Swap {
            wallet: self.wallet,
            to,
            data,
            gas_limit,
        });
        if self.state.behaviour.lock().unwrap().swap_submit_error {
            return Err(RpcError::Reverted {
                reason: "insufficient allowance".to_string(),
            });
        }
        Ok(self.state.next_hash(TxKind::Swap))
    }

    async fn await_receipt(&self, hash: TxHash) -> TransactionOutcome {
        let gate = self.state.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }

        self.state.record(Call::Receipt {
            wallet: self.wallet,
            hash,
        });

        let b = self.state.behaviour.lock().unwrap().clone();
        let kind = self.state.kinds.lock().unwrap().get(&hash).copied();
        let failed = match kind {
            Some(TxKind::Approve) => b.approve_receipt_fail,
            Some(TxKind::Swap) => b.swap_receipt_fail,
            Some(TxKind::Claim) => b.claim_receipt_fail,
            None => true,
        };

        if failed {
            TransactionOutcome::failed(hash, "status 0")
        } else {
            TransactionOutcome::success(hash)
        }
    }
}

pub struct MockConnector {
    chain: MockChain,
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        wallet: &WalletRecord,
        agent: Option<&ProxyAgent>,
    ) -> Result<Arc<dyn ChainClient>, RpcError> {
        self.chain.state.record(Call::Connect {
            wallet: wallet.index,
            has_agent: agent.is_some(),
        });
        if self
            .chain
            .state
            .behaviour
            .lock()
            .unwrap()
            .fail_connect
            .contains(&wallet.index)
        {
            return Err(RpcError::ConnectionRefused {
                endpoint: "mock".to_string(),
                reason: "refused".to_string(),
            });
        }
        Ok(Arc::new(MockClient {
            wallet: wallet.index,
            state: self.chain.state.clone(),
        }))
    }
}

pub fn test_key(index: usize) -> SecretKey {
    SecretKey::new(format!("0x{:064x}", index + 1))
}

pub fn contracts() -> Contracts {
    Contracts::from_config(&ContractsConfig::default()).unwrap()
}

pub fn instant_settings() -> SwapSettings {
    SwapSettings {
        amount_min: 0.001,
        amount_max: 0.01,
        delay: core_logic::DelayRange::from_secs(0, 0),
        gas_limit: 500_000,
    }
}

pub struct Harness {
    pub app: PriorApp,
    pub log: Arc<EventLog>,
    pub chain: MockChain,
}

impl Harness {
    pub fn new(wallets: usize, proxy_lines: &str) -> Self {
        Self::with_settings(wallets, proxy_lines, instant_settings())
    }

    pub fn with_settings(wallets: usize, proxy_lines: &str, settings: SwapSettings) -> Self {
        let log = Arc::new(EventLog::silent());
        let chain = MockChain::new();

        let proxies = ProxyRegistry::from_lines(proxy_lines, log.as_ref());
        let keys = (0..wallets).map(test_key).collect();
        let table = WalletSet::from_keys(keys, &proxies, log.as_ref());

        let connector = Arc::new(MockConnector {
            chain: chain.clone(),
        });
        let sink: Arc<dyn Dashboard> = log.clone();
        let ctx = PriorContext::new(table, connector, sink, contracts());

        Self {
            app: PriorApp::new(ctx, settings),
            log,
            chain,
        }
    }

    /// Polls until `pred` holds or a second passes.
    pub async fn wait_for(&self, pred: impl Fn(&Self) -> bool) -> bool {
        for _ in 0..200 {
            if pred(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        pred(self)
    }
}
