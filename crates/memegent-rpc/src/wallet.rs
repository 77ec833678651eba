//! Node-backed wallet
//!
//! Accounts are whatever the node reports. Signing happens on the node side
//! through `eth_sendTransaction`.

use crate::client::JsonRpcClient;
use crate::error::RpcError;
use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use memegent_launch::{
    LaunchConfig, LogEntry, Signer, TransactionReceipt, WalletError, WalletProvider,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Wallet provider over JSON-RPC
#[derive(Debug, Clone)]
pub struct RpcWallet {
    client: Arc<JsonRpcClient>,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl RpcWallet {
    /// Create a wallet for `url` with default receipt timing
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let defaults = LaunchConfig::default();
        Self {
            client: Arc::new(JsonRpcClient::new(url)),
            poll_interval: defaults.receipt_poll_interval(),
            receipt_timeout: defaults.receipt_timeout(),
        }
    }

    /// Create from launch configuration
    #[must_use]
    pub fn from_config(config: &LaunchConfig) -> Self {
        Self::new(config.rpc_url.clone())
            .with_poll_interval(config.receipt_poll_interval())
            .with_receipt_timeout(config.receipt_timeout())
    }

    /// With receipt polling interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// With receipt wait limit
    #[inline]
    #[must_use]
    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Signer for `account` without going through the provider port
    #[must_use]
    pub fn signer_for(&self, account: Address) -> RpcSigner {
        RpcSigner {
            client: Arc::clone(&self.client),
            account,
            poll_interval: self.poll_interval,
            receipt_timeout: self.receipt_timeout,
        }
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let accounts = match self
            .client
            .request::<Vec<Address>>("eth_requestAccounts", json!([]))
            .await
        {
            Err(e) if e.is_method_not_found() => {
                tracing::debug!("node lacks eth_requestAccounts, using eth_accounts");
                self.client.request("eth_accounts", json!([])).await
            }
            other => other,
        };

        accounts.map_err(|e| match e {
            RpcError::Transport(source) => {
                tracing::warn!(url = %self.client.url(), error = %source, "node unreachable");
                WalletError::Unavailable
            }
            other => other.into(),
        })
    }

    async fn signer(&self, account: Address) -> Result<Arc<dyn Signer>, WalletError> {
        Ok(Arc::new(self.signer_for(account)))
    }
}

/// Account managed by the node
#[derive(Debug, Clone)]
pub struct RpcSigner {
    client: Arc<JsonRpcClient>,
    account: Address,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl RpcSigner {
    async fn poll_receipt(&self, tx_hash: B256) -> Result<RpcReceipt, WalletError> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;
            let receipt: Option<RpcReceipt> = self
                .client
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }
            tracing::trace!(%tx_hash, "receipt pending");
        }
    }
}

#[async_trait]
impl Signer for RpcSigner {
    fn address(&self) -> Address {
        self.account
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError> {
        let tx = json!({ "from": self.account, "to": to, "data": data });
        Ok(self.client.request("eth_call", json!([tx, "latest"])).await?)
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<B256, WalletError> {
        let tx = json!({ "from": self.account, "to": to, "data": data });
        Ok(self.client.request("eth_sendTransaction", json!([tx])).await?)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, WalletError> {
        let receipt = tokio::time::timeout(self.receipt_timeout, self.poll_receipt(tx_hash))
            .await
            .map_err(|_| WalletError::Timeout(format!("receipt of {tx_hash}")))??;
        Ok(receipt.into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    #[serde(default)]
    block_number: Option<U64>,
    // absent before Byzantium
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

#[derive(Debug, Deserialize)]
struct RpcLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

impl From<RpcReceipt> for TransactionReceipt {
    fn from(receipt: RpcReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.to::<u64>()),
            status: receipt.status.map_or(true, |s| s == U64::from(1)),
            logs: receipt
                .logs
                .into_iter()
                .map(|log| LogEntry {
                    address: log.address,
                    topics: log.topics,
                    data: log.data,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_decodes_from_node_json() {
        let receipt: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "blockNumber": "0x1b4",
            "status": "0x0",
            "logs": [{
                "address": "0x1111111111111111111111111111111111111111",
                "topics": [format!("0x{}", "01".repeat(32))],
                "data": "0x",
                "logIndex": "0x0"
            }]
        }))
        .unwrap();

        let receipt = TransactionReceipt::from(receipt);
        assert_eq!(receipt.transaction_hash, B256::repeat_byte(0xab));
        assert_eq!(receipt.block_number, Some(436));
        assert!(!receipt.status);
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].address, Address::repeat_byte(0x11));
    }

    #[test]
    fn missing_status_counts_as_success() {
        let receipt: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "00".repeat(32)),
            "blockNumber": null
        }))
        .unwrap();
        let receipt = TransactionReceipt::from(receipt);
        assert!(receipt.status);
        assert_eq!(receipt.block_number, None);
        assert!(receipt.logs.is_empty());
    }

    #[test]
    fn config_timing_is_carried_to_signers() {
        let config = LaunchConfig::default().with_rpc_url("http://127.0.0.1:8545");
        let wallet = RpcWallet::from_config(&config);
        let signer = wallet.signer_for(Address::repeat_byte(0x01));
        assert_eq!(signer.poll_interval, config.receipt_poll_interval());
        assert_eq!(signer.receipt_timeout, config.receipt_timeout());
        assert_eq!(signer.client.url(), "http://127.0.0.1:8545");
    }
}
