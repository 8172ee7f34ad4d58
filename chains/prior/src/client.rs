//! Chain access seam.
//!
//! Workers only ever talk to the chain through [`ChainClient`]; a
//! [`Connector`] builds one per wallet, optionally tunnelled through that
//! wallet's proxy.

use crate::contracts::{encode_call, BALANCE_OF};
use crate::wallet::WalletRecord;
use async_trait::async_trait;
use core_logic::{ProxyAgent, RpcError};
use ethers::abi::Token;
use ethers::prelude::*;
use ethers::signers::WalletError;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
}

/// Final state of a submitted transaction.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    pub hash: TxHash,
    pub status: TxStatus,
    pub error: Option<String>,
}

impl TransactionOutcome {
    pub fn success(hash: TxHash) -> Self {
        Self {
            hash,
            status: TxStatus::Success,
            error: None,
        }
    }

    pub fn failed(hash: TxHash, error: impl Into<String>) -> Self {
        Self {
            hash,
            status: TxStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address derived from the wallet key this client signs with.
    fn address(&self) -> Address;

    async fn native_balance(&self, owner: Address) -> Result<U256, RpcError>;

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, RpcError> {
        self.read_uint(token, BALANCE_OF, &[Token::Address(owner)])
            .await
    }

    /// Read-only call returning a single `uint256`.
    async fn read_uint(
        &self,
        contract: Address,
        signature: &str,
        args: &[Token],
    ) -> Result<U256, RpcError>;

    /// Signs and submits `signature(args)` on `contract`. Returns as soon as
    /// the node accepts it.
    async fn call_write(
        &self,
        contract: Address,
        signature: &str,
        args: &[Token],
    ) -> Result<TxHash, RpcError>;

    /// Submits prebuilt calldata with an explicit gas ceiling.
    async fn send_raw(&self, to: Address, data: Bytes, gas_limit: u64)
        -> Result<TxHash, RpcError>;

    /// Waits for one confirmation. Never fails: transport problems and
    /// reverts both come back as [`TxStatus::Failed`].
    async fn await_receipt(&self, hash: TxHash) -> TransactionOutcome;
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        wallet: &WalletRecord,
        agent: Option<&ProxyAgent>,
    ) -> Result<Arc<dyn ChainClient>, RpcError>;
}

/// Connector for a live JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct EthersConnector {
    rpc_url: String,
    chain_id: Option<u64>,
    timeout: Duration,
}

impl EthersConnector {
    pub fn new(rpc_url: impl Into<String>, chain_id: Option<u64>, timeout: Duration) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            timeout,
        }
    }

    fn rpc_error(&self, e: impl ToString) -> RpcError {
        RpcError::from_message(&self.rpc_url, e.to_string())
    }
}

#[async_trait]
impl Connector for EthersConnector {
    async fn connect(
        &self,
        wallet: &WalletRecord,
        agent: Option<&ProxyAgent>,
    ) -> Result<Arc<dyn ChainClient>, RpcError> {
        let signer: LocalWallet =
            wallet
                .key()
                .expose()
                .parse()
                .map_err(|e: WalletError| RpcError::InvalidKey {
                    reason: e.to_string(),
                })?;

        let mut client_builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout);
        if let Some(agent) = agent {
            client_builder = client_builder.proxy(agent.proxy());
        }
        let http = client_builder.build().map_err(|e| self.rpc_error(e))?;

        let url = reqwest::Url::parse(&self.rpc_url).map_err(|_| RpcError::InvalidResponse {
            reason: format!("bad RPC url {}", self.rpc_url),
        })?;
        let provider = Provider::new(Http::new_with_client(url, http))
            .interval(Duration::from_secs(2));

        let chain_id = match self.chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .map_err(|e| self.rpc_error(e))?
                .as_u64(),
        };

        let address = signer.address();
        let signer = SignerMiddleware::new(provider.clone(), signer.with_chain_id(chain_id));

        Ok(Arc::new(EthersClient {
            endpoint: self.rpc_url.clone(),
            provider,
            signer,
            address,
        }))
    }
}

pub struct EthersClient {
    endpoint: String,
    provider: Provider<Http>,
    signer: SignerMiddleware<Provider<Http>, LocalWallet>,
    address: Address,
}

impl EthersClient {
    fn rpc_error(&self, e: impl ToString) -> RpcError {
        RpcError::from_message(&self.endpoint, e.to_string())
    }

    async fn submit(
        &self,
        to: Address,
        data: Bytes,
        gas_limit: Option<u64>,
    ) -> Result<TxHash, RpcError> {
        let mut tx = TransactionRequest::new()
            .from(self.address)
            .to(to)
            .data(data);
        if let Some(gas) = gas_limit {
            tx = tx.gas(gas);
        }

        let pending = self
            .signer
            .send_transaction(tx, None)
            .await
            .map_err(|e| self.rpc_error(e))?;
        Ok(*pending)
    }
}

#[async_trait]
impl ChainClient for EthersClient {
    fn address(&self) -> Address {
        self.address
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, RpcError> {
        self.provider
            .get_balance(owner, None)
            .await
            .map_err(|e| self.rpc_error(e))
    }

    async fn read_uint(
        &self,
        contract: Address,
        signature: &str,
        args: &[Token],
    ) -> Result<U256, RpcError> {
        let tx: TypedTransaction = TransactionRequest::new()
            .from(self.address)
            .to(contract)
            .data(encode_call(signature, args))
            .into();
        let raw = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| self.rpc_error(e))?;
        decode_uint(&raw)
    }

    async fn call_write(
        &self,
        contract: Address,
        signature: &str,
        args: &[Token],
    ) -> Result<TxHash, RpcError> {
        self.submit(contract, encode_call(signature, args), None)
            .await
    }

    async fn send_raw(
        &self,
        to: Address,
        data: Bytes,
        gas_limit: u64,
    ) -> Result<TxHash, RpcError> {
        self.submit(to, data, Some(gas_limit)).await
    }

    async fn await_receipt(&self, hash: TxHash) -> TransactionOutcome {
        match PendingTransaction::new(hash, &self.provider).await {
            Ok(Some(receipt)) if receipt.status == Some(U64::from(1)) => {
                TransactionOutcome::success(hash)
            }
            Ok(Some(_)) => TransactionOutcome::failed(hash, "transaction reverted"),
            Ok(None) => TransactionOutcome::failed(hash, "transaction dropped from mempool"),
            Err(e) => TransactionOutcome::failed(hash, self.rpc_error(e).to_string()),
        }
    }
}

/// First 32-byte word of an `eth_call` result.
pub fn decode_uint(raw: &[u8]) -> Result<U256, RpcError> {
    if raw.len() < 32 {
        return Err(RpcError::InvalidResponse {
            reason: format!("expected a 32-byte word, got {} bytes", raw.len()),
        });
    }
    Ok(U256::from_big_endian(&raw[..32]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_uint() {
        let mut word = [0u8; 32];
        word[31] = 42;
        assert_eq!(decode_uint(&word).unwrap(), U256::from(42));

        let mut long = word.to_vec();
        long.extend_from_slice(&[0xff; 32]);
        assert_eq!(decode_uint(&long).unwrap(), U256::from(42));

        assert!(matches!(
            decode_uint(&[0u8; 4]),
            Err(RpcError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_outcome_helpers() {
        let ok = TransactionOutcome::success(TxHash::zero());
        assert!(ok.is_success());
        let failed = TransactionOutcome::failed(TxHash::zero(), "boom");
        assert!(!failed.is_success());
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
